//! Scriptable fakes for the API traits.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use pizzeria_core::{
    CreateOrderPayload, Email, NewPizza, Order, OrderId, OrderItem, OrderStatus, PaymentMethod,
    Pizza, PizzaId, PizzaPatch, Price, User, UserId,
};
use tokio::sync::Notify;

use crate::api::{
    ApiError, AuthApi, AuthResponse, CatalogApi, OrderApi, OrdersResponse, PizzaAdminApi,
    PizzaFilters, PizzasResponse,
};

/// Queue of canned results for one endpoint.
pub struct Script<T> {
    steps: Mutex<VecDeque<(Option<Arc<Notify>>, Result<T, ApiError>)>>,
    calls: AtomicUsize,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<T> Script<T> {
    pub fn push(&self, result: Result<T, ApiError>) {
        self.steps.lock().unwrap().push_back((None, result));
    }

    /// Queue a result that is only returned once `gate` is notified.
    pub fn push_gated(&self, gate: Arc<Notify>, result: Result<T, ApiError>) {
        self.steps.lock().unwrap().push_back((Some(gate), result));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<T, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some((gate, result)) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                result
            }
            None => Err(ApiError::Status {
                status: 500,
                message: "unscripted call".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct FakeState {
    pub login: Script<AuthResponse>,
    pub register: Script<AuthResponse>,
    pub list_pizzas: Script<PizzasResponse>,
    pub create_order: Script<Order>,
    pub list_orders: Script<OrdersResponse>,
    pub update_status: Script<Order>,
    pub pizza_writes: Script<Pizza>,
    pub deletes: Script<()>,
    pub submitted_orders: Mutex<Vec<CreateOrderPayload>>,
    pub login_emails: Mutex<Vec<String>>,
}

/// Fake remote API. Clones share the same scripts.
#[derive(Clone, Default)]
pub struct FakeApi {
    pub state: Arc<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthApi for FakeApi {
    async fn login(&self, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        self.state.login_emails.lock().unwrap().push(email.to_string());
        self.state.login.next().await
    }

    async fn register(&self, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        self.state.login_emails.lock().unwrap().push(email.to_string());
        self.state.register.next().await
    }
}

impl CatalogApi for FakeApi {
    async fn list_pizzas(&self, _filters: &PizzaFilters) -> Result<PizzasResponse, ApiError> {
        self.state.list_pizzas.next().await
    }
}

impl OrderApi for FakeApi {
    async fn create_order(&self, payload: &CreateOrderPayload) -> Result<Order, ApiError> {
        self.state
            .submitted_orders
            .lock()
            .unwrap()
            .push(payload.clone());
        self.state.create_order.next().await
    }

    async fn list_orders_for_user(&self, _user_id: UserId) -> Result<OrdersResponse, ApiError> {
        self.state.list_orders.next().await
    }

    async fn list_all_orders(&self) -> Result<OrdersResponse, ApiError> {
        self.state.list_orders.next().await
    }

    async fn update_order_status(
        &self,
        _order_id: OrderId,
        _status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.state.update_status.next().await
    }
}

impl PizzaAdminApi for FakeApi {
    async fn create_pizza(&self, _pizza: &NewPizza) -> Result<Pizza, ApiError> {
        self.state.pizza_writes.next().await
    }

    async fn update_pizza(&self, _id: PizzaId, _patch: &PizzaPatch) -> Result<Pizza, ApiError> {
        self.state.pizza_writes.next().await
    }

    async fn delete_pizza(&self, _id: PizzaId) -> Result<(), ApiError> {
        self.state.deletes.next().await
    }
}

pub fn user(id: i32, email: &str, is_admin: bool) -> User {
    User {
        id: UserId::new(id),
        email: Email::parse(email).unwrap(),
        is_admin,
    }
}

pub fn auth_response(id: i32, email: &str, is_admin: bool) -> AuthResponse {
    AuthResponse {
        token: format!("token-{id}"),
        user: user(id, email, is_admin),
    }
}

pub fn auth_rejected(message: &str) -> ApiError {
    ApiError::Auth {
        message: Some(message.to_string()),
    }
}

pub fn server_down() -> ApiError {
    ApiError::Status {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

/// An order for `user_id` created `day` days into 2026.
pub fn order(id: i32, user_id: i32, status: OrderStatus, day: u32) -> Order {
    Order {
        id: OrderId::new(id),
        user_id: UserId::new(user_id),
        pizza_items: vec![OrderItem {
            pizza_id: PizzaId::new(1),
            quantity: 2,
            price: Price::from_cents(1299),
            pizza: None,
        }],
        status,
        created_at: Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap(),
        total_amount: Price::from_cents(3205),
        delivery_address: "1 Main St".to_string(),
        phone: "555-0100".to_string(),
        payment_method: PaymentMethod::Card,
        updated_at: None,
    }
}
