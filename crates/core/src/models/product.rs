//! Catalog products and their purchasable variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId, VariantId};

/// A purchasable SKU of a product, distinguished by package weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: VariantId,
    /// Package label such as `250g` or `1kg`.
    pub weight: String,
    pub price: Price,
    /// Units on hand. Signed because stock is decremented after payment
    /// without reservation, so two racing checkouts can oversell.
    pub stock: i64,
    #[serde(default)]
    pub sku: String,
}

impl Variant {
    /// Whether `quantity` units can be sold right now.
    #[must_use]
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock >= i64::from(quantity)
    }
}

/// Optional nutrition facts shown on the product page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<String>,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    pub category_id: CategoryId,
    /// Paths relative to the public root, e.g. `/images/products/almonds.png`.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<NutritionalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Find a variant by id.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// Find a variant by id, mutably.
    pub fn variant_mut(&mut self, id: &VariantId) -> Option<&mut Variant> {
        self.variants.iter_mut().find(|v| &v.id == id)
    }

    /// Case-insensitive match of `needle` against name and description.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn almonds() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "California Almonds".to_string(),
            slug: "california-almonds".to_string(),
            description: "Crunchy, raw and unsalted".to_string(),
            short_description: String::new(),
            category_id: CategoryId::new("c1"),
            images: vec![],
            variants: vec![Variant {
                id: VariantId::new("v250"),
                weight: "250g".to_string(),
                price: Price::from_rupees(299),
                stock: 3,
                sku: "ALM-250".to_string(),
            }],
            featured: false,
            nutritional_info: None,
            benefits: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_variant_lookup() {
        let product = almonds();
        assert!(product.variant(&VariantId::new("v250")).is_some());
        assert!(product.variant(&VariantId::new("v1kg")).is_none());
    }

    #[test]
    fn test_has_stock_for() {
        let product = almonds();
        let variant = product.variant(&VariantId::new("v250")).unwrap();
        assert!(variant.has_stock_for(3));
        assert!(!variant.has_stock_for(4));
    }

    #[test]
    fn test_matches_search() {
        let product = almonds();
        assert!(product.matches_search("almond"));
        assert!(product.matches_search("unsalted"));
        assert!(!product.matches_search("cashew"));
    }

    #[test]
    fn test_optional_fields_omitted() {
        let json = serde_json::to_value(almonds()).unwrap();
        assert!(json.get("nutritionalInfo").is_none());
        assert!(json.get("shortDescription").is_some());
        assert_eq!(json["variants"][0]["weight"], "250g");
    }
}
