//! CLI command implementations.

use pizzeria_core::PizzaId;
use thiserror::Error;

pub mod account;
pub mod admin;
pub mod cart;
pub mod menu;
pub mod orders;

/// Errors that make a command exit unsuccessfully.
///
/// The storefront already told the user what went wrong through its
/// notifier; these only carry enough to set the exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The pizza is not on the current menu.
    #[error("No pizza with id {0} on the menu")]
    UnknownPizza(PizzaId),

    /// Quantity must be at least one.
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    /// The command needs a logged-in admin.
    #[error("Admin rights required; log in with an admin account")]
    NotAdmin,

    /// The storefront rejected or could not complete the operation.
    #[error("{0} failed")]
    Failed(&'static str),
}
