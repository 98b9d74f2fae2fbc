//! Local cart store: the constructed state container the UI mutates.

pub mod storage;

use tracing::{debug, warn};

use crate::domain::aggregates::cart::{Cart, LineOutcome};
use crate::domain::aggregates::product::Product;
use self::storage::CartStorage;

/// Wires the cart aggregate to a storage port. Every line mutation is
/// written through; storage failures degrade to logged warnings so a
/// broken disk never takes the cart down with it.
pub struct CartStore {
    cart: Cart,
    storage: Box<dyn CartStorage>,
}

impl CartStore {
    /// Rehydrates from storage. Totals are always recomputed from the
    /// restored lines; any totals a storage backend might carry are stale
    /// by definition and ignored.
    pub fn open(storage: Box<dyn CartStorage>) -> Self {
        let mut cart = Cart::new();
        match storage.load() {
            Ok(Some(lines)) => {
                debug!(lines = lines.len(), "rehydrated cart from storage");
                cart.restore_lines(lines);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not load persisted cart, starting empty"),
        }
        Self { cart, storage }
    }

    pub fn cart(&self) -> &Cart { &self.cart }

    pub fn add_item(&mut self, product: Product, quantity: u32, variant_id: Option<String>) {
        self.cart.add_item(product, quantity, variant_id);
        self.persist();
    }

    pub fn update_quantity(&mut self, line_id: &str, quantity: u32) -> LineOutcome {
        let outcome = self.cart.update_quantity(line_id, quantity);
        if outcome != LineOutcome::NotFound {
            self.persist();
        }
        outcome
    }

    pub fn remove_item(&mut self, line_id: &str) -> LineOutcome {
        let outcome = self.cart.remove_item(line_id);
        if outcome != LineOutcome::NotFound {
            self.persist();
        }
        outcome
    }

    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    // Drawer visibility is transient UI state and never touches storage.
    pub fn open_cart(&mut self) { self.cart.open(); }
    pub fn close_cart(&mut self) { self.cart.close(); }
    pub fn toggle_cart(&mut self) { self.cart.toggle(); }

    fn persist(&self) {
        if let Err(e) = self.storage.save(self.cart.lines()) {
            warn!(error = %e, "failed to persist cart lines");
        }
    }
}
