//! Pizzeria Core - Shared types library.
//!
//! This crate provides common types used across all Pizzeria components:
//! - `storefront` - Client-side cart, session, catalog and checkout state
//! - `cli` - Command-line front end over the storefront
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses,
//!   plus the pizza, cart, user and order records exchanged with the API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
