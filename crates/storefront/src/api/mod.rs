//! Remote storefront API.
//!
//! # Architecture
//!
//! - One trait per capability group ([`AuthApi`], [`CatalogApi`],
//!   [`OrderApi`], [`PizzaAdminApi`]) so stores depend only on what they call
//!   and tests can substitute small fakes
//! - [`HttpApiClient`] implements all four over `reqwest`
//! - The bearer token is read from durable storage on every request, so the
//!   client never needs to be told about logins or logouts
//!
//! # Endpoints
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | POST | `/api/auth/login` | `{email,password}` | `{token,user}` |
//! | POST | `/api/auth/register` | `{email,password}` | `{token,user}` |
//! | GET | `/api/pizzas[?filters]` | | `{count,pizzas,filters}` |
//! | POST | `/api/pizzas` | new pizza | pizza |
//! | PUT | `/api/pizzas/:id` | partial pizza | pizza |
//! | DELETE | `/api/pizzas/:id` | | |
//! | POST | `/api/orders` | order payload | order |
//! | GET | `/api/orders/:userId` | | `{orders}` |
//! | GET | `/api/orders` | | `{orders}` |
//! | PATCH | `/api/orders/:id` | `{status}` | order |

mod client;
pub mod types;

use std::future::Future;

use pizzeria_core::{
    CreateOrderPayload, NewPizza, Order, OrderId, OrderStatus, Pizza, PizzaId, PizzaPatch, UserId,
};
use thiserror::Error;

pub use client::HttpApiClient;
pub use types::*;

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Login or registration was rejected (bad credentials, duplicate account).
    #[error("authentication rejected: {}", .message.as_deref().unwrap_or("no details"))]
    Auth {
        /// Human-readable reason supplied by the server, if any.
        message: Option<String>,
    },

    /// The server answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// The server's explanation, when it sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Auth { message } => message.as_deref(),
            Self::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// Whether this is a rejection of credentials rather than a transport
    /// or server failure.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

/// Login and registration.
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// Create an account and receive a token for it.
    fn register(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;
}

/// Menu reads.
pub trait CatalogApi: Send + Sync {
    /// List pizzas, narrowed server-side by `filters`.
    fn list_pizzas(
        &self,
        filters: &PizzaFilters,
    ) -> impl Future<Output = Result<PizzasResponse, ApiError>> + Send;
}

/// Order submission and tracking.
pub trait OrderApi: Send + Sync {
    /// Submit a new order.
    fn create_order(
        &self,
        payload: &CreateOrderPayload,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;

    /// Orders placed by one user.
    fn list_orders_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<OrdersResponse, ApiError>> + Send;

    /// Every order (admin only).
    fn list_all_orders(&self) -> impl Future<Output = Result<OrdersResponse, ApiError>> + Send;

    /// Move an order to a new status (admin only).
    fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;
}

/// Menu management (admin only).
pub trait PizzaAdminApi: Send + Sync {
    fn create_pizza(
        &self,
        pizza: &NewPizza,
    ) -> impl Future<Output = Result<Pizza, ApiError>> + Send;

    fn update_pizza(
        &self,
        id: PizzaId,
        patch: &PizzaPatch,
    ) -> impl Future<Output = Result<Pizza, ApiError>> + Send;

    fn delete_pizza(&self, id: PizzaId) -> impl Future<Output = Result<(), ApiError>> + Send;
}
