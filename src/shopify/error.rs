use thiserror::Error;

use crate::shopify::types::CartUserError;

/// Errors returned by the Storefront API client and the reconciliation
/// service. Transport failures and application-level error lists inside
/// a 200 envelope are deliberately siblings here: callers treat both as
/// "the remote call failed".
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Network or TLS failure from the underlying HTTP client, or a
    /// non-2xx status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned top-level GraphQL errors.
    #[error("Storefront API error: {0}")]
    Api(String),

    /// The mutation was rejected with `userErrors` in a 200 envelope.
    #[error("cart mutation rejected: {}", join_messages(.0))]
    UserErrors(Vec<CartUserError>),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A 200 envelope with neither errors nor the requested cart payload.
    #[error("response for {0} contained no cart data")]
    MissingData(String),

    /// A line mutation was attempted before any remote cart existed.
    #[error("no remote cart to mutate")]
    NoActiveCart,
}

fn join_messages(errors: &[CartUserError]) -> String {
    errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; ")
}
