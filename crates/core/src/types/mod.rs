//! Core types for Pizzeria.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod pizza;
pub mod price;
pub mod status;
pub mod user;

pub use cart::CartLine;
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{CreateOrderPayload, Order, OrderItem};
pub use pizza::{NewPizza, Pizza, PizzaPatch};
pub use price::{Price, PriceError};
pub use status::*;
pub use user::User;
