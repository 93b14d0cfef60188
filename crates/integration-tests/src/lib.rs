//! Integration test support for the Pizzeria storefront.
//!
//! Runs an in-process mock of the storefront API (`axum`, bound to an
//! ephemeral port) so the real `reqwest` client and the stores built on it
//! can be exercised end to end without any external services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pizzeria-integration-tests
//! ```
//!
//! # Seeded Data
//!
//! | Account | Password | Admin |
//! |---------|----------|-------|
//! | `admin@pizza.com` | `admin123` | yes |
//! | `owner@pizza.com` | `owner123` | no |
//! | `diner@example.com` | `hunter2` | no |
//!
//! The menu starts as the storefront's placeholder menu (ids 1-4).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use pizzeria_core::{
    CreateOrderPayload, Email, NewPizza, Order, OrderId, OrderStatus, Pizza, PizzaId, PizzaPatch,
    Price, SpiceLevel, User, UserId,
};
use pizzeria_storefront::api::{
    AuthResponse, CatalogFacets, OrdersResponse, PizzasResponse, PriceRange,
};
use pizzeria_storefront::catalog::placeholder_menu;
use pizzeria_storefront::config::{StorefrontConfig, parse_base_url};
use serde::Deserialize;
use serde_json::json;

/// A registered account on the mock server.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub password: String,
}

/// One request as seen by the mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

/// Everything the mock server knows.
#[derive(Debug, Default)]
pub struct MockData {
    pub accounts: Vec<Account>,
    pub pizzas: Vec<Pizza>,
    pub orders: Vec<Order>,
    pub requests: Vec<RecordedRequest>,
    /// When set, `GET /api/pizzas` answers 500.
    pub menu_outage: bool,
}

/// Shared handle to the mock server's data.
#[derive(Debug, Clone, Default)]
pub struct MockState {
    inner: Arc<Mutex<MockData>>,
}

impl MockState {
    /// State with the seeded accounts and menu.
    #[must_use]
    pub fn seeded() -> Self {
        let accounts = [
            (1, "admin@pizza.com", "admin123", true),
            (2, "owner@pizza.com", "owner123", false),
            (3, "diner@example.com", "hunter2", false),
        ]
        .into_iter()
        .map(|(id, email, password, is_admin)| Account {
            user: User {
                id: UserId::new(id),
                email: Email::parse(email).expect("seeded email is valid"),
                is_admin,
            },
            password: password.to_string(),
        })
        .collect();

        let pizzas = placeholder_menu()
            .into_iter()
            .map(|mut pizza| {
                pizza.spice_level = Some(if pizza.name == "Pepperoni" {
                    SpiceLevel::Hot
                } else {
                    SpiceLevel::Mild
                });
                pizza
            })
            .collect();

        Self {
            inner: Arc::new(Mutex::new(MockData {
                accounts,
                pizzas,
                ..MockData::default()
            })),
        }
    }

    /// Run `f` with exclusive access to the data.
    pub fn with<T>(&self, f: impl FnOnce(&mut MockData) -> T) -> T {
        let mut data = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut data)
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.with(|data| data.requests.clone())
    }

    /// Requests received for `method` and `path`.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.with(|data| {
            data.requests
                .iter()
                .filter(|r| r.method == method && r.path == path)
                .cloned()
                .collect()
        })
    }

    pub fn set_menu_outage(&self, outage: bool) {
        self.with(|data| data.menu_outage = outage);
    }

    /// Every order stored on the server.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.with(|data| data.orders.clone())
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<User> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let id: i32 = token.strip_prefix("token-")?.parse().ok()?;
        self.with(|data| {
            data.accounts
                .iter()
                .find(|account| account.user.id.as_i32() == id)
                .map(|account| account.user.clone())
        })
    }
}

/// A running mock server.
#[derive(Debug)]
pub struct MockServer {
    pub base_url: String,
    pub state: MockState,
}

impl MockServer {
    /// Start a mock server with seeded data on an ephemeral port.
    pub async fn start() -> Self {
        let state = MockState::seeded();
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API server");
        let addr = listener.local_addr().expect("Mock server has no address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock API server failed");
        });

        Self {
            base_url: format!("http://{addr}/"),
            state,
        }
    }

    /// Storefront configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig {
            api_base_url: parse_base_url(&self.base_url).expect("Mock server URL is valid"),
            ..StorefrontConfig::default()
        }
    }
}

/// Build the mock API router.
pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/pizzas", get(list_pizzas).post(create_pizza))
        .route("/api/pizzas/{id}", put(update_pizza).delete(delete_pizza))
        .route("/api/orders", get(all_orders).post(create_order))
        .route("/api/orders/{id}", get(user_orders).patch(update_status))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_owned),
        authorization: request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    };
    state.with(|data| data.requests.push(recorded));
    next.run(request).await
}

// =============================================================================
// Handlers
// =============================================================================

/// Error response carrying `{"message": ...}`.
struct Failure(StatusCode, &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "message": self.1 }))).into_response()
    }
}

type Handled<T> = Result<T, Failure>;

#[derive(Deserialize)]
struct CredentialsBody {
    email: String,
    password: String,
}

fn auth_body(user: User) -> Json<AuthResponse> {
    Json(AuthResponse {
        token: format!("token-{}", user.id),
        user,
    })
}

fn require_user(state: &MockState, headers: &HeaderMap) -> Handled<User> {
    state
        .user_for(headers)
        .ok_or(Failure(StatusCode::UNAUTHORIZED, "Authentication required"))
}

fn require_admin(state: &MockState, headers: &HeaderMap) -> Handled<User> {
    let user = require_user(state, headers)?;
    if user.is_admin {
        Ok(user)
    } else {
        Err(Failure(StatusCode::FORBIDDEN, "Admin access required"))
    }
}

async fn login(
    State(state): State<MockState>,
    Json(body): Json<CredentialsBody>,
) -> Handled<Json<AuthResponse>> {
    state
        .with(|data| {
            data.accounts
                .iter()
                .find(|a| a.user.email.as_str() == body.email && a.password == body.password)
                .map(|a| a.user.clone())
        })
        .map(auth_body)
        .ok_or(Failure(StatusCode::UNAUTHORIZED, "Invalid credentials"))
}

async fn register(
    State(state): State<MockState>,
    Json(body): Json<CredentialsBody>,
) -> Handled<(StatusCode, Json<AuthResponse>)> {
    let email = Email::parse(&body.email)
        .map_err(|_| Failure(StatusCode::BAD_REQUEST, "Invalid email"))?;
    let user = state.with(|data| {
        if data.accounts.iter().any(|a| a.user.email == email) {
            return Err(Failure(StatusCode::BAD_REQUEST, "User already exists"));
        }
        let next_id = data
            .accounts
            .iter()
            .map(|a| a.user.id.as_i32())
            .max()
            .unwrap_or(0)
            + 1;
        let user = User {
            id: UserId::new(next_id),
            email,
            is_admin: false,
        };
        data.accounts.push(Account {
            user: user.clone(),
            password: body.password,
        });
        Ok(user)
    })?;
    Ok((StatusCode::CREATED, auth_body(user)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuQuery {
    category: Option<String>,
    is_veg: Option<bool>,
    spice_level: Option<SpiceLevel>,
    max_price: Option<String>,
    search: Option<String>,
}

async fn list_pizzas(
    State(state): State<MockState>,
    Query(query): Query<MenuQuery>,
) -> Handled<Json<PizzasResponse>> {
    let max_price = query
        .max_price
        .as_deref()
        .map(Price::parse)
        .transpose()
        .map_err(|_| Failure(StatusCode::BAD_REQUEST, "Invalid maxPrice"))?;
    let needle = query.search.as_deref().map(str::to_lowercase);

    state.with(|data| {
        if data.menu_outage {
            return Err(Failure(StatusCode::INTERNAL_SERVER_ERROR, "Menu unavailable"));
        }

        let pizzas: Vec<Pizza> = data
            .pizzas
            .iter()
            .filter(|p| query.category.as_ref().is_none_or(|c| &p.category == c))
            .filter(|p| query.is_veg.is_none_or(|veg| p.is_veg == veg))
            .filter(|p| query.spice_level.is_none_or(|s| p.spice_level == Some(s)))
            .filter(|p| max_price.is_none_or(|max| p.price <= max))
            .filter(|p| {
                needle.as_ref().is_none_or(|n| {
                    p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
                })
            })
            .cloned()
            .collect();

        let mut categories: Vec<String> = data.pizzas.iter().map(|p| p.category.clone()).collect();
        categories.sort();
        categories.dedup();
        let mut spice_levels: Vec<String> = data
            .pizzas
            .iter()
            .filter_map(|p| p.spice_level)
            .map(|s| s.to_string())
            .collect();
        spice_levels.sort();
        spice_levels.dedup();
        let price_range = data
            .pizzas
            .iter()
            .map(|p| p.price)
            .min()
            .zip(data.pizzas.iter().map(|p| p.price).max())
            .map(|(min, max)| PriceRange { min, max });

        Ok(Json(PizzasResponse {
            count: pizzas.len(),
            pizzas,
            filters: Some(CatalogFacets {
                available_categories: categories,
                available_spice_levels: spice_levels,
                price_range,
            }),
        }))
    })
}

async fn create_pizza(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<NewPizza>,
) -> Handled<(StatusCode, Json<Pizza>)> {
    require_admin(&state, &headers)?;
    let pizza = state.with(|data| {
        let next_id = data.pizzas.iter().map(|p| p.id.as_i32()).max().unwrap_or(0) + 1;
        let pizza = Pizza {
            id: PizzaId::new(next_id),
            name: body.name,
            price: body.price,
            description: body.description,
            image: body.image,
            category: body.category,
            is_veg: body.is_veg,
            toppings: body.toppings,
            spice_level: body.spice_level,
        };
        data.pizzas.push(pizza.clone());
        pizza
    });
    Ok((StatusCode::CREATED, Json(pizza)))
}

async fn update_pizza(
    State(state): State<MockState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(patch): Json<PizzaPatch>,
) -> Handled<Json<Pizza>> {
    require_admin(&state, &headers)?;
    state.with(|data| {
        let pizza = data
            .pizzas
            .iter_mut()
            .find(|p| p.id.as_i32() == id)
            .ok_or(Failure(StatusCode::NOT_FOUND, "Pizza not found"))?;
        if let Some(name) = patch.name {
            pizza.name = name;
        }
        if let Some(description) = patch.description {
            pizza.description = description;
        }
        if let Some(price) = patch.price {
            pizza.price = price;
        }
        if let Some(image) = patch.image {
            pizza.image = image;
        }
        if let Some(category) = patch.category {
            pizza.category = category;
        }
        if let Some(is_veg) = patch.is_veg {
            pizza.is_veg = is_veg;
        }
        if let Some(toppings) = patch.toppings {
            pizza.toppings = toppings;
        }
        if patch.spice_level.is_some() {
            pizza.spice_level = patch.spice_level;
        }
        Ok(Json(pizza.clone()))
    })
}

async fn delete_pizza(
    State(state): State<MockState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Handled<StatusCode> {
    require_admin(&state, &headers)?;
    state.with(|data| {
        let before = data.pizzas.len();
        data.pizzas.retain(|p| p.id.as_i32() != id);
        if data.pizzas.len() == before {
            Err(Failure(StatusCode::NOT_FOUND, "Pizza not found"))
        } else {
            Ok(StatusCode::NO_CONTENT)
        }
    })
}

async fn create_order(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(payload): Json<CreateOrderPayload>,
) -> Handled<(StatusCode, Json<Order>)> {
    let user = require_user(&state, &headers)?;
    if user.id != payload.user_id {
        return Err(Failure(StatusCode::FORBIDDEN, "Cannot order for another user"));
    }
    if payload.pizza_items.is_empty() {
        return Err(Failure(StatusCode::BAD_REQUEST, "Order has no items"));
    }

    let order = state.with(|data| {
        let next_id = data.orders.iter().map(|o| o.id.as_i32()).max().unwrap_or(0) + 1;
        let order = Order {
            id: OrderId::new(next_id),
            user_id: payload.user_id,
            pizza_items: payload.pizza_items,
            status: payload.status,
            created_at: Utc::now(),
            total_amount: payload.total_amount,
            delivery_address: payload.delivery_address,
            phone: payload.phone,
            payment_method: payload.payment_method,
            updated_at: None,
        };
        data.orders.push(order.clone());
        order
    });
    Ok((StatusCode::CREATED, Json(order)))
}

fn orders_body(orders: Vec<Order>) -> Json<OrdersResponse> {
    Json(OrdersResponse {
        message: Some("Orders retrieved successfully".to_string()),
        count: orders.len(),
        orders,
    })
}

async fn user_orders(
    State(state): State<MockState>,
    Path(user_id): Path<i32>,
    headers: HeaderMap,
) -> Handled<Json<OrdersResponse>> {
    let user = require_user(&state, &headers)?;
    if user.id.as_i32() != user_id && !user.is_admin {
        return Err(Failure(StatusCode::FORBIDDEN, "Not your orders"));
    }
    let orders = state.with(|data| {
        data.orders
            .iter()
            .filter(|o| o.user_id.as_i32() == user_id)
            .cloned()
            .collect()
    });
    Ok(orders_body(orders))
}

async fn all_orders(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> Handled<Json<OrdersResponse>> {
    require_admin(&state, &headers)?;
    Ok(orders_body(state.orders()))
}

#[derive(Deserialize)]
struct StatusBody {
    status: OrderStatus,
}

async fn update_status(
    State(state): State<MockState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(body): Json<StatusBody>,
) -> Handled<Json<Order>> {
    require_admin(&state, &headers)?;
    state.with(|data| {
        let order = data
            .orders
            .iter_mut()
            .find(|o| o.id.as_i32() == id)
            .ok_or(Failure(StatusCode::NOT_FOUND, "Order not found"))?;
        order.status = body.status;
        order.updated_at = Some(Utc::now());
        Ok(Json(order.clone()))
    })
}
