//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::product::Product;
use crate::domain::value_objects::Money;

/// Sales-tax rate applied to the subtotal (8.5%).
fn tax_rate() -> Decimal { Decimal::new(85, 3) }
/// Carts at or above this subtotal ship free.
fn free_shipping_threshold() -> Decimal { Decimal::new(100, 0) }
/// Flat shipping fee below the threshold.
fn flat_shipping_fee() -> Decimal { Decimal::new(10, 0) }

/// One distinct purchasable entry: a product snapshot plus the chosen
/// variant and a quantity. `id` is the local mutation key, stable for
/// the life of the line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub product: Product,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

impl CartLine {
    /// The merchandise id sent to the commerce provider at checkout.
    pub fn merchandise_id(&self) -> Option<&str> { self.variant_id.as_deref() }
    pub fn line_total(&self) -> Money { self.product.price.multiply(self.quantity) }
}

/// Result of a mutation addressed at an existing line. `NotFound` is an
/// expected outcome (the UI may race an independent removal), never an
/// error and never a panic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineOutcome { Updated, Removed, NotFound }

/// Derived totals, recomputed from the line list after every mutation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
}

impl CartTotals {
    pub fn empty() -> Self {
        Self { item_count: 0, subtotal: Money::default(), tax: Money::default(), shipping: Money::default(), total: Money::default() }
    }

    /// Pure function from the line list; holds no state of its own.
    /// Subtotal, tax, and shipping are each rounded to cents before the
    /// total is summed, so the figures a shopper sees always add up.
    pub fn from_lines(lines: &[CartLine]) -> Self {
        if lines.is_empty() { return Self::empty(); }
        let currency = lines[0].product.price.currency().to_string();
        let item_count = lines.iter().map(|l| l.quantity).sum();
        let raw_subtotal: Decimal = lines.iter().map(|l| l.product.price.amount() * Decimal::from(l.quantity)).sum();
        let subtotal = Money::new(raw_subtotal, &currency).round_to_cents();
        let tax = Money::new(subtotal.amount() * tax_rate(), &currency).round_to_cents();
        let shipping_amount = if subtotal.amount() >= free_shipping_threshold() { Decimal::ZERO } else { flat_shipping_fee() };
        let shipping = Money::new(shipping_amount, &currency).round_to_cents();
        let total = Money::new(subtotal.amount() + tax.amount() + shipping.amount(), &currency);
        Self { item_count, subtotal, tax, shipping, total }
    }
}

/// The local cart: an ordered line list, a transient drawer flag, and
/// totals derived from the lines. Only the lines are ever persisted.
#[derive(Clone, Debug)]
pub struct Cart {
    lines: Vec<CartLine>,
    is_open: bool,
    totals: CartTotals,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        Self {
            lines: vec![], is_open: false, totals: CartTotals::empty(),
            created_at: Utc::now(), updated_at: Utc::now(),
        }
    }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn totals(&self) -> &CartTotals { &self.totals }
    pub fn is_open(&self) -> bool { self.is_open }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn item_count(&self) -> u32 { self.totals.item_count }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Merge-or-append. Two adds are the same line iff the product id and
    /// the resolved variant id both match; the variant defaults to the
    /// product's first one. A requested quantity of 0 degrades to 1, so a
    /// line below quantity 1 is never created.
    pub fn add_item(&mut self, product: Product, quantity: u32, variant_id: Option<String>) {
        let quantity = quantity.max(1);
        let variant_id = variant_id.or_else(|| product.default_variant_id().map(str::to_owned));
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id && l.variant_id == variant_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine { id: Uuid::now_v7().to_string(), product, quantity, variant_id });
        }
        self.recalculate();
    }

    /// Absolute set, not a delta. Zero removes the line; an unknown id
    /// reports `NotFound` and changes nothing.
    pub fn update_quantity(&mut self, line_id: &str, quantity: u32) -> LineOutcome {
        let Some(idx) = self.lines.iter().position(|l| l.id == line_id) else { return LineOutcome::NotFound; };
        let outcome = if quantity == 0 {
            self.lines.remove(idx);
            LineOutcome::Removed
        } else {
            self.lines[idx].quantity = quantity;
            LineOutcome::Updated
        };
        self.recalculate();
        outcome
    }

    pub fn remove_item(&mut self, line_id: &str) -> LineOutcome {
        let Some(idx) = self.lines.iter().position(|l| l.id == line_id) else { return LineOutcome::NotFound; };
        self.lines.remove(idx);
        self.recalculate();
        LineOutcome::Removed
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.recalculate();
    }

    // Drawer visibility: UI-only state with no effect on lines or totals.
    pub fn open(&mut self) { self.is_open = true; }
    pub fn close(&mut self) { self.is_open = false; }
    pub fn toggle(&mut self) { self.is_open = !self.is_open; }

    /// Replaces the line list from persisted storage. Lines that lost the
    /// quantity >= 1 invariant in storage are dropped rather than revived.
    pub(crate) fn restore_lines(&mut self, lines: Vec<CartLine>) {
        self.lines = lines.into_iter().filter(|l| l.quantity > 0).collect();
        self.recalculate();
    }

    fn recalculate(&mut self) {
        self.totals = CartTotals::from_lines(&self.lines);
        self.updated_at = Utc::now();
    }
}

impl Default for Cart { fn default() -> Self { Self::new() } }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::Variant;

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.into(),
            name: format!("Product {id}"),
            price: Money::usd(Decimal::new(price_cents, 2)),
            images: vec![],
            in_stock: true,
            low_stock: None,
            variants: vec![],
        }
    }

    fn with_variant(mut p: Product, variant_id: &str) -> Product {
        let price = p.price.clone();
        p.variants.push(Variant { id: variant_id.into(), name: "Default".into(), price, compare_at_price: None, available: true });
        p
    }

    fn cents(c: i64) -> Decimal { Decimal::new(c, 2) }

    #[test]
    fn add_merges_lines_with_same_product_and_variant() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 5000), 1, Some("v1".into()));
        cart.add_item(product("p1", 5000), 2, Some("v1".into()));
        assert_eq!(cart.lines().len(), 1, "same (product, variant) must merge, never duplicate");
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn add_keeps_distinct_variants_on_separate_lines() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 5000), 1, Some("v1".into()));
        cart.add_item(product("p1", 5000), 1, Some("v2".into()));
        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn add_resolves_default_variant_and_merges_with_explicit_match() {
        let p = with_variant(product("p1", 5000), "v1");
        let mut cart = Cart::new();
        cart.add_item(p.clone(), 1, None);
        cart.add_item(p, 1, Some("v1".into()));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].variant_id.as_deref(), Some("v1"));
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn add_with_zero_quantity_degrades_to_one() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 5000), 0, None);
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn update_sets_absolute_quantity() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 5000), 2, None);
        let id = cart.lines()[0].id.clone();
        assert_eq!(cart.update_quantity(&id, 5), LineOutcome::Updated);
        assert_eq!(cart.lines()[0].quantity, 5, "update is a set, not an increment");
    }

    #[test]
    fn update_to_zero_removes_the_line() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 3000), 1, None);
        let id = cart.lines()[0].id.clone();
        assert_eq!(cart.update_quantity(&id, 0), LineOutcome::Removed);
        assert!(cart.is_empty());
        assert_eq!(*cart.totals(), CartTotals::empty());
    }

    #[test]
    fn update_unknown_line_is_not_found_and_changes_nothing() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 5000), 2, None);
        let before = cart.totals().clone();
        assert_eq!(cart.update_quantity("missing", 7), LineOutcome::NotFound);
        assert_eq!(*cart.totals(), before);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn remove_unknown_line_is_not_found() {
        let mut cart = Cart::new();
        assert_eq!(cart.remove_item("missing"), LineOutcome::NotFound);
    }

    #[test]
    fn every_surviving_line_keeps_quantity_of_at_least_one() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 1000), 0, None);
        cart.add_item(product("p2", 2000), 3, None);
        let id = cart.lines()[1].id.clone();
        cart.update_quantity(&id, 0);
        assert!(cart.lines().iter().all(|l| l.quantity >= 1));
    }

    #[test]
    fn totals_are_a_pure_function_of_the_lines() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 5000), 2, Some("v1".into()));
        cart.add_item(product("p2", 1999), 1, None);
        let id = cart.lines()[0].id.clone();
        cart.update_quantity(&id, 4);
        cart.add_item(product("p3", 999), 3, None);
        let second = cart.lines()[1].id.clone();
        cart.remove_item(&second);
        assert_eq!(CartTotals::from_lines(cart.lines()), *cart.totals());
    }

    #[test]
    fn shipping_is_free_at_exactly_the_threshold() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 10000), 1, None);
        assert_eq!(cart.totals().subtotal.amount(), cents(10000));
        assert_eq!(cart.totals().shipping.amount(), Decimal::ZERO);
    }

    #[test]
    fn shipping_applies_one_cent_below_the_threshold() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 9999), 1, None);
        assert_eq!(cart.totals().shipping.amount(), cents(1000));
    }

    #[test]
    fn clear_resets_lines_and_totals() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 5000), 2, None);
        cart.add_item(product("p2", 1999), 1, None);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.totals().subtotal.amount(), Decimal::ZERO);
        assert_eq!(cart.totals().tax.amount(), Decimal::ZERO);
        assert_eq!(cart.totals().shipping.amount(), Decimal::ZERO);
        assert_eq!(cart.totals().total.amount(), Decimal::ZERO);
    }

    #[test]
    fn drawer_toggles_do_not_touch_lines_or_totals() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 5000), 1, None);
        let totals = cart.totals().clone();
        assert!(!cart.is_open());
        cart.open();
        assert!(cart.is_open());
        cart.toggle();
        assert!(!cart.is_open());
        cart.close();
        assert!(!cart.is_open());
        assert_eq!(*cart.totals(), totals);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn two_adds_of_a_fifty_dollar_product_cross_the_free_shipping_threshold() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 5000), 1, Some("v1".into()));
        cart.add_item(product("p1", 5000), 1, Some("v1".into()));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.totals().subtotal.amount(), cents(10000));
        assert_eq!(cart.totals().tax.amount(), cents(850));
        assert_eq!(cart.totals().shipping.amount(), Decimal::ZERO);
        assert_eq!(cart.totals().total.amount(), cents(10850));
    }

    #[test]
    fn driving_the_only_line_to_zero_empties_the_cart() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 3000), 1, None);
        let id = cart.lines()[0].id.clone();
        cart.update_quantity(&id, 0);
        assert!(cart.is_empty());
        assert_eq!(*cart.totals(), CartTotals::empty());
    }

    #[test]
    fn two_small_products_pay_flat_shipping() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 2000), 1, None);
        cart.add_item(product("p2", 2000), 1, None);
        assert_eq!(cart.totals().subtotal.amount(), cents(4000));
        assert_eq!(cart.totals().shipping.amount(), cents(1000));
        assert_eq!(cart.totals().tax.amount(), cents(340));
        assert_eq!(cart.totals().total.amount(), cents(5340));
    }
}
