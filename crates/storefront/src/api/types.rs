//! Request and response bodies of the storefront API.

use pizzeria_core::{Order, OrderStatus, Pizza, Price, SpiceLevel, User};
use serde::{Deserialize, Serialize};

/// Body of the login and register calls.
#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login or registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Server-side narrowing of the menu. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PizzaFilters {
    pub category: Option<String>,
    pub is_veg: Option<bool>,
    pub spice_level: Option<SpiceLevel>,
    pub max_price: Option<Price>,
    pub search: Option<String>,
}

impl PizzaFilters {
    /// True when no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Query parameters for the set filters, in a stable order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(is_veg) = self.is_veg {
            pairs.push(("isVeg", is_veg.to_string()));
        }
        if let Some(spice_level) = self.spice_level {
            pairs.push(("spiceLevel", spice_level.to_string()));
        }
        if let Some(max_price) = self.max_price {
            pairs.push(("maxPrice", max_price.amount().normalize().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

/// Response of `GET /api/pizzas`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PizzasResponse {
    #[serde(default)]
    pub count: usize,
    pub pizzas: Vec<Pizza>,
    #[serde(default)]
    pub filters: Option<CatalogFacets>,
}

/// Filter values the server reports as available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFacets {
    #[serde(default)]
    pub available_categories: Vec<String>,
    #[serde(default)]
    pub available_spice_levels: Vec<String>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
}

/// Cheapest and dearest pizza on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

/// Response of the order listing endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count: usize,
    pub orders: Vec<Order>,
}

/// Body of `PATCH /api/orders/:id`.
#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdate {
    pub status: OrderStatus,
}

/// Error body the server sends alongside 4xx/5xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
