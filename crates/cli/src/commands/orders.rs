//! Checkout and order history.

use pizzeria_core::{Order, PaymentMethod};
use pizzeria_storefront::checkout::{self, CheckoutForm};
use pizzeria_storefront::orders;
use pizzeria_storefront::state::StorefrontState;

use super::CommandError;

/// Submit the cart as an order.
pub async fn checkout(
    state: &StorefrontState,
    address: String,
    phone: String,
    payment_method: PaymentMethod,
) -> Result<(), CommandError> {
    let form = CheckoutForm {
        address,
        phone,
        payment_method,
    };
    let order = checkout::place_order(
        state.api(),
        state.cart(),
        state.session(),
        state.notifier(),
        &form,
    )
    .await
    .ok_or(CommandError::Failed("Checkout"))?;

    print_order(&order);
    Ok(())
}

/// Print the logged-in user's orders.
pub async fn history(state: &StorefrontState) {
    if !state.session().is_authenticated() {
        tracing::info!("Log in to see your orders");
        return;
    }

    let orders = orders::user_order_history(state.api(), state.session(), state.notifier()).await;
    if orders.is_empty() {
        tracing::info!("No orders yet");
    }
    for order in &orders {
        print_order(order);
    }
}

pub fn print_order(order: &Order) {
    tracing::info!(
        "Order #{} [{}] {} - {} pizza(s), {}",
        order.id,
        order.status,
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.item_count(),
        order.total_amount
    );
    for item in &order.pizza_items {
        let name = item
            .pizza
            .as_ref()
            .map_or_else(|| format!("pizza {}", item.pizza_id), |p| p.name.clone());
        tracing::info!("    {} x{} @ {}", name, item.quantity, item.price);
    }
    tracing::info!(
        "    Deliver to {} ({}), paying by {}",
        order.delivery_address,
        order.phone,
        order.payment_method
    );
}
