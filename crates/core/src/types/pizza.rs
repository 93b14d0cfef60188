//! Menu items.

use serde::{Deserialize, Serialize};

use super::{PizzaId, Price, SpiceLevel};

/// A pizza on the menu.
///
/// Owned by the catalog API; the storefront never mutates one. Only `id`,
/// `name` and `price` are required on the wire so that carts persisted by
/// older clients (which stored a slimmer record) still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pizza {
    pub id: PizzaId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    /// Image URL or path.
    #[serde(default)]
    pub image: String,
    /// Menu category tag such as `classic` or `vegetarian`.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_veg: bool,
    #[serde(default)]
    pub toppings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spice_level: Option<SpiceLevel>,
}

/// Body for creating a pizza (admin only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPizza {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    pub category: String,
    pub is_veg: bool,
    pub toppings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spice_level: Option<SpiceLevel>,
}

/// Partial update for a pizza (admin only). Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PizzaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_veg: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toppings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spice_level: Option<SpiceLevel>,
}

impl PizzaPatch {
    /// True when the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_api_record() {
        let json = r#"{
            "id": 3,
            "name": "Supreme",
            "description": "Pepperoni, sausage, bell peppers",
            "price": 18.99,
            "image": "/img/supreme.png",
            "category": "premium",
            "isVeg": false,
            "toppings": ["pepperoni", "sausage"],
            "spiceLevel": "medium"
        }"#;
        let pizza: Pizza = serde_json::from_str(json).unwrap();
        assert_eq!(pizza.id, PizzaId::new(3));
        assert_eq!(pizza.price, Price::from_cents(1899));
        assert_eq!(pizza.spice_level, Some(SpiceLevel::Medium));
        assert_eq!(pizza.toppings.len(), 2);
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let pizza: Pizza =
            serde_json::from_str(r#"{"id": 1, "name": "Margherita", "price": 12.99}"#).unwrap();
        assert_eq!(pizza.category, "");
        assert!(!pizza.is_veg);
        assert!(pizza.spice_level.is_none());
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = PizzaPatch {
            price: Some(Price::from_cents(1399)),
            ..PizzaPatch::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"price":13.99}"#);
        assert!(!patch.is_empty());
        assert!(PizzaPatch::default().is_empty());
    }
}
