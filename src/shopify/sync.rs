//! Cart reconciliation service.
//!
//! Projects local cart lines onto the provider's cart resource at
//! checkout time. Holds at most one remote cart id, either resumed from
//! a prior attempt or recorded when a cart is created; local and remote
//! carts are never kept continuously in sync.

use tracing::{debug, warn};

use crate::shopify::client::StorefrontClient;
use crate::shopify::error::StorefrontError;
use crate::shopify::types::{LineInput, RemoteCart};

pub struct CartSync {
    client: StorefrontClient,
    cart_id: Option<String>,
}

impl CartSync {
    pub fn new(client: StorefrontClient) -> Self {
        Self { client, cart_id: None }
    }

    /// Resumes with a remote cart id cached from an earlier attempt, so a
    /// retry extends the same remote cart instead of creating a duplicate.
    pub fn resume(client: StorefrontClient, cart_id: Option<String>) -> Self {
        Self { client, cart_id }
    }

    pub fn cart_id(&self) -> Option<&str> { self.cart_id.as_deref() }

    /// Drops the active remote cart id, returning it. Called after a
    /// successful hand-off so a later checkout cannot extend an
    /// already-purchased cart.
    pub fn detach(&mut self) -> Option<String> {
        self.cart_id.take()
    }

    /// Fetches the known remote cart, or creates a fresh empty one when no
    /// id is known, the cart expired, or the fetch failed.
    ///
    /// # Errors
    ///
    /// Propagates [`StorefrontError`] from the creation call only; fetch
    /// failures fall through to creation.
    pub async fn get_or_create_cart(&mut self) -> Result<RemoteCart, StorefrontError> {
        if let Some(id) = self.cart_id.clone() {
            match self.client.fetch_cart(&id).await {
                Ok(Some(cart)) => {
                    debug!(cart_id = %id, "resumed remote cart");
                    return Ok(cart);
                }
                Ok(None) => {
                    warn!(cart_id = %id, "remote cart expired, creating a fresh one");
                    self.cart_id = None;
                }
                Err(e) => {
                    warn!(cart_id = %id, error = %e, "failed to fetch remote cart, creating a fresh one");
                    self.cart_id = None;
                }
            }
        }
        self.create_cart(&[]).await
    }

    /// Creates a remote cart, optionally pre-seeded with lines, and records
    /// its id for subsequent calls. Nothing is recorded on failure.
    ///
    /// # Errors
    ///
    /// Propagates [`StorefrontError`] from the provider call.
    pub async fn create_cart(&mut self, initial_lines: &[LineInput]) -> Result<RemoteCart, StorefrontError> {
        let cart = self.client.create_cart(initial_lines).await?;
        debug!(cart_id = %cart.id, "created remote cart");
        self.cart_id = Some(cart.id.clone());
        Ok(cart)
    }

    /// Appends or increments a line, creating the remote cart first if none
    /// exists yet.
    ///
    /// # Errors
    ///
    /// Propagates [`StorefrontError`] from either the ensure step or the
    /// line mutation.
    pub async fn add_line(&mut self, merchandise_id: &str, quantity: u32) -> Result<RemoteCart, StorefrontError> {
        if self.cart_id.is_none() {
            self.get_or_create_cart().await?;
        }
        let id = self.cart_id.clone().ok_or(StorefrontError::NoActiveCart)?;
        self.client.add_lines(&id, &[LineInput::new(merchandise_id, quantity)]).await
    }

    /// Sets a remote line's quantity.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::NoActiveCart`] when no remote cart is known yet,
    /// otherwise whatever the provider call returns.
    pub async fn update_line_quantity(&self, remote_line_id: &str, quantity: u32) -> Result<RemoteCart, StorefrontError> {
        let id = self.cart_id.as_deref().ok_or(StorefrontError::NoActiveCart)?;
        self.client.update_line(id, remote_line_id, quantity).await
    }

    /// Deletes a remote line.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::NoActiveCart`] when no remote cart is known yet,
    /// otherwise whatever the provider call returns.
    pub async fn remove_line(&self, remote_line_id: &str) -> Result<RemoteCart, StorefrontError> {
        let id = self.cart_id.as_deref().ok_or(StorefrontError::NoActiveCart)?;
        self.client.remove_lines(id, &[remote_line_id.to_owned()]).await
    }
}
