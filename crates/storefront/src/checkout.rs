//! Checkout: order totals, form validation and order submission.

use pizzeria_core::{
    CartLine, CreateOrderPayload, Order, OrderItem, OrderStatus, PaymentMethod, Price, User,
};
use rust_decimal::Decimal;

use crate::api::OrderApi;
use crate::cart::CartStore;
use crate::error::ValidationError;
use crate::notify::{Notification, Notifier};
use crate::session::SessionStore;

/// Flat delivery charge added to every order.
#[must_use]
pub fn delivery_fee() -> Price {
    Price::from_cents(399)
}

/// Sales tax rate applied to the subtotal.
#[must_use]
pub fn tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// Breakdown of what the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: Price,
    pub delivery_fee: Price,
    /// Unrounded; displays round to cents.
    pub tax: Price,
    /// Subtotal plus fee plus tax, exact. Round with
    /// [`Price::round_to_cents`] before sending or showing it.
    pub total: Price,
}

impl CheckoutTotals {
    #[must_use]
    pub fn for_subtotal(subtotal: Price) -> Self {
        let delivery_fee = delivery_fee();
        let tax = subtotal.scaled_by(tax_rate());
        Self {
            subtotal,
            delivery_fee,
            tax,
            total: subtotal + delivery_fee + tax,
        }
    }

    /// Totals for a set of cart lines.
    #[must_use]
    pub fn for_lines(lines: &[CartLine]) -> Self {
        Self::for_subtotal(lines.iter().map(CartLine::line_total).sum())
    }
}

/// Delivery details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
}

/// Check that an order can be placed, returning the ordering user.
///
/// # Errors
///
/// Returns the first problem found: empty cart, no logged-in user, blank
/// address, blank phone.
pub fn validate<A>(
    form: &CheckoutForm,
    cart: &CartStore,
    session: &SessionStore<A>,
) -> Result<User, ValidationError> {
    if cart.is_empty() {
        return Err(ValidationError::EmptyCart);
    }
    let user = session.current_user().ok_or(ValidationError::GuestCheckout)?;
    if form.address.trim().is_empty() {
        return Err(ValidationError::MissingAddress);
    }
    if form.phone.trim().is_empty() {
        return Err(ValidationError::MissingPhone);
    }
    Ok(user)
}

/// Build the order body for `lines`.
#[must_use]
pub fn build_payload(user: &User, lines: &[CartLine], form: &CheckoutForm) -> CreateOrderPayload {
    CreateOrderPayload {
        user_id: user.id,
        pizza_items: lines.iter().map(OrderItem::from).collect(),
        total_amount: CheckoutTotals::for_lines(lines).total.round_to_cents(),
        delivery_address: form.address.trim().to_string(),
        phone: form.phone.trim().to_string(),
        payment_method: form.payment_method,
        status: OrderStatus::Pending,
    }
}

/// Submit the cart as an order.
///
/// On success the cart is cleared and the created order returned. On any
/// failure the cart is left untouched and the user is notified.
#[tracing::instrument(skip_all)]
pub async fn place_order<A: OrderApi, S>(
    api: &A,
    cart: &CartStore,
    session: &SessionStore<S>,
    notifier: &dyn Notifier,
    form: &CheckoutForm,
) -> Option<Order> {
    let user = match validate(form, cart, session) {
        Ok(user) => user,
        Err(e) => {
            notifier.notify(Notification::error(e.to_string()));
            return None;
        }
    };

    let payload = build_payload(&user, &cart.lines(), form);
    match api.create_order(&payload).await {
        Ok(order) => {
            tracing::info!(order_id = %order.id, total = %payload.total_amount, "Order placed");
            cart.clear();
            notifier.notify(Notification::success("Order placed successfully!"));
            Some(order)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to place order");
            notifier.notify(Notification::error(
                "Failed to place order. Please try again.",
            ));
            None
        }
    }
}
