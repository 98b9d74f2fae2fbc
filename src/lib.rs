//! Storefront Cart
//!
//! The stateful core of a headless storefront: a persisted local cart
//! with derived totals, and a checkout-time reconciliation service that
//! projects the cart onto a Shopify Storefront API cart.
//!
//! ## Features
//! - Line merging keyed on (product, variant)
//! - Totals recomputed from scratch after every mutation
//! - Durable line-list persistence with rehydration
//! - Sequential checkout hand-off yielding a hosted-checkout URL

pub mod checkout;
pub mod domain;
pub mod shopify;
pub mod store;

pub use checkout::{submit_cart, CheckoutError, CheckoutOutcome};
pub use domain::aggregates::cart::{Cart, CartLine, CartTotals, LineOutcome};
pub use domain::aggregates::product::{Product, ProductImage, Variant};
pub use domain::value_objects::{Money, MoneyError};
pub use shopify::client::StorefrontClient;
pub use shopify::error::StorefrontError;
pub use shopify::sync::CartSync;
pub use shopify::types::{LineInput, RemoteCart};
pub use store::storage::{CartStorage, JsonFileStorage, StorageError, DEFAULT_STORE_KEY};
pub use store::CartStore;
