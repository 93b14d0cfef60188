//! Pizzeria storefront client library.
//!
//! Client-side core of the pizza ordering storefront: the cart and session
//! stores, the remote API client, catalog filtering, checkout and order
//! management. Front ends (the `pizzeria` CLI, tests) drive it through
//! [`state::StorefrontState`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notify;
pub mod orders;
pub mod session;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;
