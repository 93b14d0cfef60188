//! `reqwest` implementation of the storefront API traits.
//!
//! Menu reads are cached using `moka` (5-minute TTL) and invalidated by any
//! menu write made through this client.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use pizzeria_core::{
    CreateOrderPayload, NewPizza, Order, OrderId, OrderStatus, Pizza, PizzaId, PizzaPatch, UserId,
};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::types::{Credentials, ErrorBody, StatusUpdate};
use super::{
    ApiError, AuthApi, AuthResponse, CatalogApi, OrderApi, OrdersResponse, PizzaAdminApi,
    PizzaFilters, PizzasResponse,
};
use crate::config::StorefrontConfig;
use crate::storage::{KeyValueStore, keys};

/// Longest slice of a response body kept in logs and error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// HTTP client for the storefront API.
///
/// Cheap to clone; clones share the connection pool and menu cache.
#[derive(Clone)]
pub struct HttpApiClient {
    inner: Arc<HttpApiClientInner>,
}

struct HttpApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    storage: Arc<dyn KeyValueStore>,
    menu_cache: Cache<String, PizzasResponse>,
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpApiClient {
    /// Create a client for the API at `config.api_base_url`.
    ///
    /// `storage` is consulted for the `authToken` key on every request.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        config: &StorefrontConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let menu_cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(HttpApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                storage,
                menu_cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached menu response.
    pub fn invalidate_menu_cache(&self) {
        self.inner.menu_cache.invalidate_all();
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Token of the current session, read fresh from storage.
    fn bearer_token(&self) -> Option<String> {
        match self.inner.storage.get(keys::AUTH_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read auth token from storage");
                None
            }
        }
    }

    /// Send a request and return the status and raw body.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(StatusCode, String), ApiError> {
        tracing::debug!(%method, %url, "Making request");

        let mut request = self.inner.client.request(method.clone(), url.clone());
        if let Some(token) = self.bearer_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.inspect_err(|e| {
            tracing::error!(%method, %url, error = %e, "API request failed");
        })?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                %method,
                %url,
                status = %status,
                body = %preview(&text),
                "API returned non-success status"
            );
        }

        Ok((status, text))
    }

    /// Send a request, failing on non-success statuses, and decode the body.
    async fn call<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (status, text) = self.execute(method, url, body).await?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        decode(&text)
    }

    async fn authenticate(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint(path)?;
        let (status, text) = self
            .execute(Method::POST, url, Some(&Credentials { email, password }))
            .await?;

        if status.is_client_error() {
            return Err(ApiError::Auth {
                message: server_message(&text),
            });
        }
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        decode(&text)
    }
}

impl AuthApi for HttpApiClient {
    #[instrument(skip_all)]
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.authenticate("api/auth/login", email, password).await
    }

    #[instrument(skip_all)]
    async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.authenticate("api/auth/register", email, password)
            .await
    }
}

impl CatalogApi for HttpApiClient {
    #[instrument(skip(self))]
    async fn list_pizzas(&self, filters: &PizzaFilters) -> Result<PizzasResponse, ApiError> {
        let mut url = self.endpoint("api/pizzas")?;
        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let key = url.to_string();
        if let Some(cached) = self.inner.menu_cache.get(&key).await {
            tracing::debug!(%url, "Menu cache hit");
            return Ok(cached);
        }

        let response: PizzasResponse = self.call::<(), _>(Method::GET, url, None).await?;
        self.inner.menu_cache.insert(key, response.clone()).await;
        Ok(response)
    }
}

impl OrderApi for HttpApiClient {
    #[instrument(skip_all, fields(user_id = %payload.user_id))]
    async fn create_order(&self, payload: &CreateOrderPayload) -> Result<Order, ApiError> {
        let url = self.endpoint("api/orders")?;
        self.call(Method::POST, url, Some(payload)).await
    }

    #[instrument(skip(self))]
    async fn list_orders_for_user(&self, user_id: UserId) -> Result<OrdersResponse, ApiError> {
        let url = self.endpoint(&format!("api/orders/{user_id}"))?;
        self.call::<(), _>(Method::GET, url, None).await
    }

    #[instrument(skip(self))]
    async fn list_all_orders(&self) -> Result<OrdersResponse, ApiError> {
        let url = self.endpoint("api/orders")?;
        self.call::<(), _>(Method::GET, url, None).await
    }

    #[instrument(skip(self))]
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("api/orders/{order_id}"))?;
        self.call(Method::PATCH, url, Some(&StatusUpdate { status }))
            .await
    }
}

impl PizzaAdminApi for HttpApiClient {
    #[instrument(skip_all, fields(name = %pizza.name))]
    async fn create_pizza(&self, pizza: &NewPizza) -> Result<Pizza, ApiError> {
        let url = self.endpoint("api/pizzas")?;
        let created = self.call(Method::POST, url, Some(pizza)).await?;
        self.invalidate_menu_cache();
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    async fn update_pizza(&self, id: PizzaId, patch: &PizzaPatch) -> Result<Pizza, ApiError> {
        let url = self.endpoint(&format!("api/pizzas/{id}"))?;
        let updated = self.call(Method::PUT, url, Some(patch)).await?;
        self.invalidate_menu_cache();
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_pizza(&self, id: PizzaId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("api/pizzas/{id}"))?;
        let (status, text) = self.execute::<()>(Method::DELETE, url, None).await?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        self.invalidate_menu_cache();
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %preview(text),
            "Failed to parse API response"
        );
        ApiError::Parse(e)
    })
}

/// Pull the human-readable message out of an error body, if there is one.
fn server_message(text: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(text).ok()?;
    body.message
        .or(body.error)
        .filter(|message| !message.trim().is_empty())
}

fn status_error(status: StatusCode, text: &str) -> ApiError {
    ApiError::Status {
        status: status.as_u16(),
        message: server_message(text).unwrap_or_else(|| preview(text)),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(BODY_PREVIEW_CHARS).collect()
}
