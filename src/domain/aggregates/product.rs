//! Product snapshot embedded in cart lines

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Money;

/// Read-only product data captured at the moment an item enters the cart.
/// Catalogue changes after that moment never alter a line that already
/// holds a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock: Option<bool>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Money>,
    pub available: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl Product {
    /// Id of the first listed variant, if the product has any.
    pub fn default_variant_id(&self) -> Option<&str> {
        self.variants.first().map(|v| v.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_default_variant() {
        let mut p = Product {
            id: "p1".into(), name: "Widget".into(), price: Money::usd(Decimal::new(1999, 2)),
            images: vec![], in_stock: true, low_stock: None, variants: vec![],
        };
        assert_eq!(p.default_variant_id(), None);
        p.variants.push(Variant { id: "v1".into(), name: "Small".into(), price: p.price.clone(), compare_at_price: None, available: true });
        p.variants.push(Variant { id: "v2".into(), name: "Large".into(), price: p.price.clone(), compare_at_price: None, available: true });
        assert_eq!(p.default_variant_id(), Some("v1"));
    }
}
