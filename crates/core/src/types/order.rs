//! Orders as submitted to and returned by the order API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CartLine, OrderId, OrderStatus, PaymentMethod, Pizza, PizzaId, Price, UserId};

/// One line of an order: which pizza, how many, and the unit price charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub pizza_id: PizzaId,
    pub quantity: u32,
    pub price: Price,
    /// Expanded pizza record; the server may include it when listing orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pizza: Option<Pizza>,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            pizza_id: line.item.id,
            quantity: line.quantity.get(),
            price: line.item.price,
            pizza: None,
        }
    }
}

/// An order owned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(alias = "items")]
    pub pizza_items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub total_amount: Price,
    pub delivery_address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total number of pizzas across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.pizza_items.iter().map(|item| item.quantity).sum()
    }
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub user_id: UserId,
    pub pizza_items: Vec<OrderItem>,
    pub total_amount: Price,
    pub delivery_address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    /// Always [`OrderStatus::Pending`] for new orders.
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_order() {
        let json = r#"{
            "id": 11,
            "userId": 5,
            "pizzaItems": [
                {"pizzaId": 1, "quantity": 2, "price": 12.99},
                {"pizzaId": 2, "quantity": 1, "price": 15.49}
            ],
            "status": "in-delivery",
            "createdAt": "2024-01-15T10:30:00Z",
            "totalAmount": 48.78,
            "deliveryAddress": "123 Main St",
            "phone": "+1234567890",
            "paymentMethod": "cash"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::InDelivery);
        assert_eq!(order.item_count(), 3);
        assert_eq!(
            order.pizza_items.first().unwrap().line_total(),
            Price::from_cents(2598)
        );
        assert!(order.updated_at.is_none());
    }

    #[test]
    fn test_payload_field_names() {
        let payload = CreateOrderPayload {
            user_id: UserId::new(5),
            pizza_items: vec![OrderItem {
                pizza_id: PizzaId::new(1),
                quantity: 2,
                price: Price::from_cents(1299),
                pizza: None,
            }],
            total_amount: Price::from_cents(3206),
            delivery_address: "123 Main St".to_string(),
            phone: "555-0100".to_string(),
            payment_method: PaymentMethod::Card,
            status: OrderStatus::Pending,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["userId"], 5);
        assert_eq!(value["pizzaItems"][0]["pizzaId"], 1);
        assert_eq!(value["totalAmount"], 32.06);
        assert_eq!(value["status"], "pending");
        assert_eq!(value["paymentMethod"], "card");
        assert!(value["pizzaItems"][0].get("pizza").is_none());
    }
}
