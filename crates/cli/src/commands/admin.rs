//! Shop management commands.
//!
//! # Usage
//!
//! ```bash
//! pizzeria admin orders --status pending
//! pizzeria admin set-status 12 in-delivery
//! pizzeria admin pizza create --name Hawaiian --price 14.99 --topping ham --topping pineapple
//! pizzeria admin pizza update 5 --price 15.49
//! pizzeria admin pizza delete 5
//! ```
//!
//! The server enforces admin rights; the CLI checks the session first so
//! customers get a clear message instead of a rejected request.

use pizzeria_core::{NewPizza, OrderId, OrderStatus, PizzaId, PizzaPatch};
use pizzeria_storefront::catalog;
use pizzeria_storefront::orders::{self, StatusFilter};
use pizzeria_storefront::state::StorefrontState;

use super::CommandError;
use super::menu::print_pizza;
use super::orders::print_order;

/// Fail unless the session belongs to an admin.
pub fn require_admin(state: &StorefrontState) -> Result<(), CommandError> {
    if state.session().is_admin() {
        Ok(())
    } else {
        Err(CommandError::NotAdmin)
    }
}

/// Print every order matching `filter`.
pub async fn orders(state: &StorefrontState, filter: StatusFilter) {
    let all = orders::all_orders(state.api(), state.notifier()).await;
    let matching = orders::filter_by_status(&all, filter);

    tracing::info!("{} of {} orders", matching.len(), all.len());
    for order in matching {
        print_order(order);
    }
}

/// Move an order to a new status.
pub async fn set_status(
    state: &StorefrontState,
    order_id: OrderId,
    status: OrderStatus,
) -> Result<(), CommandError> {
    let mut all = orders::all_orders(state.api(), state.notifier()).await;
    if !orders::update_status(state.api(), state.notifier(), &mut all, order_id, status).await {
        return Err(CommandError::Failed("Status update"));
    }
    if let Some(order) = all.iter().find(|order| order.id == order_id) {
        print_order(order);
    }
    Ok(())
}

pub async fn create_pizza(state: &StorefrontState, pizza: &NewPizza) -> Result<(), CommandError> {
    let created = catalog::add_pizza(state.api(), state.notifier(), pizza)
        .await
        .ok_or(CommandError::Failed("Adding pizza"))?;
    print_pizza(&created);
    Ok(())
}

pub async fn update_pizza(
    state: &StorefrontState,
    id: PizzaId,
    patch: &PizzaPatch,
) -> Result<(), CommandError> {
    if patch.is_empty() {
        tracing::info!("Nothing to change");
        return Ok(());
    }
    let updated = catalog::edit_pizza(state.api(), state.notifier(), id, patch)
        .await
        .ok_or(CommandError::Failed("Updating pizza"))?;
    print_pizza(&updated);
    Ok(())
}

pub async fn delete_pizza(state: &StorefrontState, id: PizzaId) -> Result<(), CommandError> {
    if catalog::remove_pizza(state.api(), state.notifier(), id).await {
        Ok(())
    } else {
        Err(CommandError::Failed("Deleting pizza"))
    }
}
