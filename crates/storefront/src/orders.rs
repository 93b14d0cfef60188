//! Order history and order management.

use std::str::FromStr;

use pizzeria_core::{Order, OrderId, OrderStatus, ParseStatusError};

use crate::api::OrderApi;
use crate::notify::{Notification, Notifier};
use crate::session::SessionStore;

/// Status filter value that matches every order.
pub const ALL_STATUSES: &str = "all";

/// Status selector for order lists: one status, or every order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    #[must_use]
    pub fn matches(self, order: &Order) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => order.status == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    /// `all` selects every order; anything else must be a status name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == ALL_STATUSES {
            Ok(Self::All)
        } else {
            s.trim().parse().map(Self::Only)
        }
    }
}

/// Orders placed by the logged-in user, newest first.
///
/// Guests get an empty list. A failed request is reported through the
/// notifier and also yields an empty list.
pub async fn user_order_history<A: OrderApi, S>(
    api: &A,
    session: &SessionStore<S>,
    notifier: &dyn Notifier,
) -> Vec<Order> {
    let Some(user) = session.current_user() else {
        return Vec::new();
    };

    match api.list_orders_for_user(user.id).await {
        Ok(response) => newest_first(response.orders),
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Failed to load order history");
            notifier.notify(Notification::error("Failed to load orders"));
            Vec::new()
        }
    }
}

/// Every order in the system, newest first (admin only).
pub async fn all_orders<A: OrderApi>(api: &A, notifier: &dyn Notifier) -> Vec<Order> {
    match api.list_all_orders().await {
        Ok(response) => newest_first(response.orders),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load orders");
            notifier.notify(Notification::error("Failed to load orders"));
            Vec::new()
        }
    }
}

/// Keep the orders matching `filter`, preserving order.
#[must_use]
pub fn filter_by_status(orders: &[Order], filter: StatusFilter) -> Vec<&Order> {
    orders.iter().filter(|order| filter.matches(order)).collect()
}

/// Move an order to `status` and update the local copy in `orders`.
///
/// Returns `true` on success. The local list is only touched once the server
/// accepted the change.
#[tracing::instrument(skip(api, notifier, orders))]
pub async fn update_status<A: OrderApi>(
    api: &A,
    notifier: &dyn Notifier,
    orders: &mut [Order],
    order_id: OrderId,
    status: OrderStatus,
) -> bool {
    match api.update_order_status(order_id, status).await {
        Ok(updated) => {
            if let Some(local) = orders.iter_mut().find(|order| order.id == order_id) {
                *local = updated;
            }
            notifier.notify(Notification::success("Order status updated successfully!"));
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update order status");
            notifier.notify(Notification::error("Failed to update order status"));
            false
        }
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}
