//! Wire types for the Shopify Storefront GraphQL API.
//!
//! Field names follow the provider's camelCase convention; money amounts
//! arrive as decimal strings. The remote cart is keyed by its own opaque
//! id and remote line ids, distinct from any local identifier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level GraphQL envelope. `errors` here and `userErrors` inside a
/// mutation payload both arrive in an HTTP 200 response; neither implies
/// the other.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// The provider-owned cart aggregate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    pub id: String,
    pub checkout_url: String,
    pub total_quantity: u32,
    pub cost: RemoteCartCost,
    pub lines: RemoteLineConnection,
}

impl RemoteCart {
    /// Flattens the connection edges into the line nodes.
    pub fn line_nodes(&self) -> impl Iterator<Item = &RemoteCartLine> {
        self.lines.edges.iter().map(|e| &e.node)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteLineConnection {
    pub edges: Vec<RemoteLineEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteLineEdge {
    pub node: RemoteCartLine,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartLine {
    pub id: String,
    pub quantity: u32,
    pub merchandise: RemoteMerchandise,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMerchandise {
    pub id: String,
    pub title: String,
    pub price: MoneyV2,
    pub product: RemoteMerchandiseProduct,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMerchandiseProduct {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartCost {
    pub subtotal_amount: MoneyV2,
    pub total_tax_amount: Option<MoneyV2>,
    pub total_amount: MoneyV2,
}

/// Application-level validation error reported inside a 200 envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUserError {
    pub field: Option<Vec<String>>,
    pub message: String,
    pub code: Option<String>,
}

/// A line request sent to the provider: merchandise id plus quantity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineInput {
    pub merchandise_id: String,
    pub quantity: u32,
}

impl LineInput {
    pub fn new(merchandise_id: impl Into<String>, quantity: u32) -> Self {
        Self { merchandise_id: merchandise_id.into(), quantity }
    }
}

/// Shared payload shape of every cart mutation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutationPayload {
    pub cart: Option<RemoteCart>,
    #[serde(default)]
    pub user_errors: Vec<CartUserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCreateData {
    pub cart_create: CartMutationPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesAddData {
    pub cart_lines_add: CartMutationPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesUpdateData {
    pub cart_lines_update: CartMutationPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesRemoveData {
    pub cart_lines_remove: CartMutationPayload,
}

/// A null cart on fetch means the remote cart expired.
#[derive(Debug, Deserialize)]
pub struct CartQueryData {
    pub cart: Option<RemoteCart>,
}
