//! HTTP client for the Shopify Storefront GraphQL API.
//!
//! Wraps `reqwest` with the storefront access-token header, typed response
//! deserialization, and envelope checking. Every call inspects both the
//! top-level GraphQL `errors` array and the mutation's `userErrors` list,
//! because the provider reports business failures inside HTTP 200
//! responses.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::shopify::error::StorefrontError;
use crate::shopify::types::{
    CartCreateData, CartLinesAddData, CartLinesRemoveData, CartLinesUpdateData,
    CartMutationPayload, CartQueryData, GraphQlResponse, LineInput, RemoteCart,
};

const API_VERSION: &str = "2024-01";

/// Cart selection shared by every query and mutation.
const CART_FIELDS: &str = r#"fragment CartFields on Cart {
  id
  checkoutUrl
  totalQuantity
  cost {
    subtotalAmount { amount currencyCode }
    totalTaxAmount { amount currencyCode }
    totalAmount { amount currencyCode }
  }
  lines(first: 100) {
    edges {
      node {
        id
        quantity
        merchandise {
          ... on ProductVariant {
            id
            title
            price { amount currencyCode }
            product { id title }
          }
        }
      }
    }
  }
}"#;

const CART_CREATE: &str = r#"mutation CartCreate($input: CartInput!) {
  cartCreate(input: $input) {
    cart { ...CartFields }
    userErrors { field message code }
  }
}"#;

const CART_LINES_ADD: &str = r#"mutation CartLinesAdd($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { field message code }
  }
}"#;

const CART_LINES_UPDATE: &str = r#"mutation CartLinesUpdate($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { field message code }
  }
}"#;

const CART_LINES_REMOVE: &str = r#"mutation CartLinesRemove($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...CartFields }
    userErrors { field message code }
  }
}"#;

const CART_QUERY: &str = r#"query GetCart($id: ID!) {
  cart(id: $id) { ...CartFields }
}"#;

/// Client for the Storefront API's cart resource.
///
/// Use [`StorefrontClient::new`] with a shop domain for production or
/// [`StorefrontClient::with_base_url`] to point at a mock server in tests.
#[derive(Clone)]
pub struct StorefrontClient {
    client: Client,
    endpoint: Url,
    token: String,
}

impl StorefrontClient {
    /// Creates a client for `https://<shop_domain>`.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StorefrontError::Api`] if the domain does
    /// not form a valid URL.
    pub fn new(shop_domain: &str, token: &str, timeout_secs: u64) -> Result<Self, StorefrontError> {
        Self::with_base_url(&format!("https://{shop_domain}"), token, timeout_secs)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontClient::new`].
    pub fn with_base_url(base_url: &str, token: &str, timeout_secs: u64) -> Result<Self, StorefrontError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("storefront-cart/0.1")
            .build()?;

        let endpoint = format!("{}/api/{API_VERSION}/graphql.json", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| StorefrontError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self { client, endpoint, token: token.to_owned() })
    }

    /// Creates a remote cart, optionally pre-seeded with lines.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Http`] on network failure or non-2xx status.
    /// - [`StorefrontError::Api`] / [`StorefrontError::UserErrors`] when the
    ///   provider rejects the mutation inside a 200 envelope.
    /// - [`StorefrontError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn create_cart(&self, lines: &[LineInput]) -> Result<RemoteCart, StorefrontError> {
        let variables = json!({"input": {"lines": lines}});
        let data: CartCreateData = self.post(CART_CREATE, variables, "cartCreate").await?;
        Self::unwrap_payload(data.cart_create, "cartCreate")
    }

    /// Fetches a remote cart by id. `Ok(None)` means the cart has expired
    /// on the provider side.
    ///
    /// # Errors
    ///
    /// Same classes as [`StorefrontClient::create_cart`].
    pub async fn fetch_cart(&self, cart_id: &str) -> Result<Option<RemoteCart>, StorefrontError> {
        let data: CartQueryData = self.post(CART_QUERY, json!({"id": cart_id}), "cart").await?;
        Ok(data.cart)
    }

    /// Appends or increments lines on an existing remote cart.
    ///
    /// # Errors
    ///
    /// Same classes as [`StorefrontClient::create_cart`].
    pub async fn add_lines(&self, cart_id: &str, lines: &[LineInput]) -> Result<RemoteCart, StorefrontError> {
        let variables = json!({"cartId": cart_id, "lines": lines});
        let data: CartLinesAddData = self.post(CART_LINES_ADD, variables, "cartLinesAdd").await?;
        Self::unwrap_payload(data.cart_lines_add, "cartLinesAdd")
    }

    /// Sets the quantity of one remote line.
    ///
    /// # Errors
    ///
    /// Same classes as [`StorefrontClient::create_cart`].
    pub async fn update_line(&self, cart_id: &str, line_id: &str, quantity: u32) -> Result<RemoteCart, StorefrontError> {
        let variables = json!({"cartId": cart_id, "lines": [{"id": line_id, "quantity": quantity}]});
        let data: CartLinesUpdateData = self.post(CART_LINES_UPDATE, variables, "cartLinesUpdate").await?;
        Self::unwrap_payload(data.cart_lines_update, "cartLinesUpdate")
    }

    /// Deletes remote lines by id.
    ///
    /// # Errors
    ///
    /// Same classes as [`StorefrontClient::create_cart`].
    pub async fn remove_lines(&self, cart_id: &str, line_ids: &[String]) -> Result<RemoteCart, StorefrontError> {
        let variables = json!({"cartId": cart_id, "lineIds": line_ids});
        let data: CartLinesRemoveData = self.post(CART_LINES_REMOVE, variables, "cartLinesRemove").await?;
        Self::unwrap_payload(data.cart_lines_remove, "cartLinesRemove")
    }

    /// Posts one GraphQL document (with the shared cart fragment appended),
    /// asserts a 2xx status, and parses the envelope. Top-level `errors`
    /// become [`StorefrontError::Api`].
    async fn post<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        context: &str,
    ) -> Result<T, StorefrontError> {
        let body = json!({"query": format!("{query}\n{CART_FIELDS}"), "variables": variables});
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("X-Shopify-Storefront-Access-Token", &self.token)
            .json(&body)
            .send()
            .await?;
        let response = response.error_for_status()?;
        let text = response.text().await?;

        let envelope: GraphQlResponse<T> =
            serde_json::from_str(&text).map_err(|e| StorefrontError::Deserialize {
                context: context.to_string(),
                source: e,
            })?;

        if let Some(errors) = envelope.errors {
            if !errors.is_empty() {
                let msg = errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
                return Err(StorefrontError::Api(msg));
            }
        }

        envelope.data.ok_or_else(|| StorefrontError::MissingData(context.to_string()))
    }

    /// Checks the mutation's `userErrors` list and unwraps the cart.
    fn unwrap_payload(payload: CartMutationPayload, context: &str) -> Result<RemoteCart, StorefrontError> {
        if !payload.user_errors.is_empty() {
            return Err(StorefrontError::UserErrors(payload.user_errors));
        }
        payload.cart.ok_or_else(|| StorefrontError::MissingData(context.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_includes_the_api_version_path() {
        let client = StorefrontClient::new("demo.myshopify.com", "tok", 30)
            .expect("client construction should not fail");
        assert_eq!(
            client.endpoint.as_str(),
            "https://demo.myshopify.com/api/2024-01/graphql.json"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = StorefrontClient::with_base_url("http://127.0.0.1:9999/", "tok", 30)
            .expect("client construction should not fail");
        assert_eq!(
            client.endpoint.as_str(),
            "http://127.0.0.1:9999/api/2024-01/graphql.json"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = StorefrontClient::with_base_url("not a url", "tok", 30);
        assert!(matches!(result, Err(StorefrontError::Api(_))));
    }
}
