//! Cart lines.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::{Pizza, Price};

/// One pizza and how many of it the customer wants.
///
/// The quantity is never zero: a line that would drop to zero is removed
/// from the cart instead. Older clients stored the pizza under a `pizza`
/// field, which is still accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(alias = "pizza")]
    pub item: Pizza,
    pub quantity: NonZeroU32,
}

impl CartLine {
    /// Create a line for `quantity` units of `item`.
    #[must_use]
    pub const fn new(item: Pizza, quantity: NonZeroU32) -> Self {
        Self { item, quantity }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.item.price.times(self.quantity.get())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::PizzaId;

    fn margherita() -> Pizza {
        serde_json::from_str(r#"{"id": 1, "name": "Margherita", "price": 12.99}"#).unwrap()
    }

    #[test]
    fn test_line_total() {
        let line = CartLine::new(margherita(), NonZeroU32::new(3).unwrap());
        assert_eq!(line.line_total(), Price::from_cents(3897));
    }

    #[test]
    fn test_reads_legacy_pizza_field() {
        let json = r#"{"pizza": {"id": 1, "name": "Margherita", "price": 12.99}, "quantity": 2}"#;
        let line: CartLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.item.id, PizzaId::new(1));
        assert_eq!(line.quantity.get(), 2);
    }

    #[test]
    fn test_writes_item_field() {
        let line = CartLine::new(margherita(), NonZeroU32::MIN);
        let value = serde_json::to_value(&line).unwrap();
        assert!(value.get("item").is_some());
        assert!(value.get("pizza").is_none());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let json = r#"{"item": {"id": 1, "name": "Margherita", "price": 12.99}, "quantity": 0}"#;
        assert!(serde_json::from_str::<CartLine>(json).is_err());
    }
}
