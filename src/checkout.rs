//! Checkout hand-off: the ordered pipeline that projects the local cart
//! onto the remote one and surfaces the hosted-checkout URL.

use thiserror::Error;
use tracing::{info, warn};

use crate::shopify::error::StorefrontError;
use crate::shopify::sync::CartSync;
use crate::shopify::types::RemoteCart;
use crate::store::CartStore;

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A remote call failed; the remaining sequence was aborted.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// No line produced a remote cart, so there is nothing to hand off.
    /// The local cart is left untouched.
    #[error("no checkout URL obtained")]
    NoCheckoutUrl,
}

#[derive(Debug)]
pub struct CheckoutOutcome {
    pub checkout_url: String,
    pub remote_cart_id: String,
    pub submitted_lines: usize,
    pub skipped_lines: usize,
}

/// Submits the local cart for checkout, one remote call per line.
///
/// The calls run strictly in sequence: each depends on the remote cart id
/// established or extended by the previous one, and concurrent creates
/// would orphan remote carts. Lines without a resolvable merchandise id
/// are skipped with a warning; a failed remote call aborts the remaining
/// sequence. The local cart is cleared only after a checkout URL is in
/// hand, so an abandoned or failed attempt never loses items.
///
/// # Errors
///
/// - [`CheckoutError::Storefront`] when a remote call fails (transport or
///   application-level); the local cart is untouched and the remote cart
///   id stays cached in `sync` for a retry.
/// - [`CheckoutError::NoCheckoutUrl`] when no line could be submitted.
pub async fn submit_cart(store: &mut CartStore, sync: &mut CartSync) -> Result<CheckoutOutcome, CheckoutError> {
    let lines = store.cart().lines().to_vec();
    let mut submitted = 0usize;
    let mut skipped = 0usize;
    let mut last_cart: Option<RemoteCart> = None;

    for line in &lines {
        let Some(merchandise_id) = line.merchandise_id() else {
            warn!(line_id = %line.id, product = %line.product.name, "line has no resolvable variant, skipping at checkout");
            skipped += 1;
            continue;
        };
        let cart = sync.add_line(merchandise_id, line.quantity).await?;
        submitted += 1;
        last_cart = Some(cart);
    }

    let Some(cart) = last_cart else {
        return Err(CheckoutError::NoCheckoutUrl);
    };

    store.clear();
    sync.detach();
    info!(cart_id = %cart.id, submitted, skipped, "checkout hand-off ready");

    Ok(CheckoutOutcome {
        checkout_url: cart.checkout_url,
        remote_cart_id: cart.id,
        submitted_lines: submitted,
        skipped_lines: skipped,
    })
}
