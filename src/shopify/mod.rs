//! Shopify Storefront API integration: wire types, the GraphQL client,
//! and the checkout-time reconciliation service.

pub mod client;
pub mod error;
pub mod sync;
pub mod types;
