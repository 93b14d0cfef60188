//! Cart commands.

use std::num::NonZeroU32;

use pizzeria_core::PizzaId;
use pizzeria_storefront::api::PizzaFilters;
use pizzeria_storefront::catalog;
use pizzeria_storefront::checkout::CheckoutTotals;
use pizzeria_storefront::state::StorefrontState;

use super::CommandError;

/// Print every cart line followed by the checkout totals.
pub fn show(state: &StorefrontState) {
    let lines = state.cart().lines();
    if lines.is_empty() {
        tracing::info!("Your cart is empty");
        return;
    }

    for line in &lines {
        tracing::info!(
            "{:>4}  {:<20} x{:<3} {:>8}",
            line.item.id,
            line.item.name,
            line.quantity,
            line.line_total().to_string()
        );
    }

    let totals = CheckoutTotals::for_lines(&lines);
    tracing::info!("Items:        {}", state.cart().total_item_count());
    tracing::info!("Subtotal:     {}", totals.subtotal);
    tracing::info!("Delivery fee: {}", totals.delivery_fee);
    tracing::info!("Tax:          {}", totals.tax);
    tracing::info!("Total:        {}", totals.total);
}

/// Look `pizza_id` up on the menu and add it to the cart.
pub async fn add(
    state: &StorefrontState,
    pizza_id: PizzaId,
    quantity: u32,
) -> Result<(), CommandError> {
    let quantity = NonZeroU32::new(quantity).ok_or(CommandError::ZeroQuantity)?;
    let menu =
        catalog::load_catalog(state.api(), state.notifier(), &PizzaFilters::default()).await;
    let pizza = menu
        .pizzas
        .into_iter()
        .find(|pizza| pizza.id == pizza_id)
        .ok_or(CommandError::UnknownPizza(pizza_id))?;

    state.cart().add_item(pizza, quantity);
    Ok(())
}
