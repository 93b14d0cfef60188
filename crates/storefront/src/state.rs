//! Storefront state shared by every front end.

use std::sync::Arc;

use crate::api::HttpApiClient;
use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore};

/// Everything a front end needs to drive the storefront.
///
/// This struct is cheaply cloneable via `Arc`. The cart and session stores
/// are created once, seeded from durable storage, and shared by all clones.
#[derive(Clone)]
pub struct StorefrontState {
    inner: Arc<StorefrontStateInner>,
}

struct StorefrontStateInner {
    config: StorefrontConfig,
    storage: Arc<dyn KeyValueStore>,
    api: HttpApiClient,
    notifier: Arc<dyn Notifier>,
    cart: CartStore,
    session: SessionStore<HttpApiClient>,
}

impl StorefrontState {
    /// Create the state on top of an existing storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let api = HttpApiClient::new(&config, Arc::clone(&storage))?;
        let cart = CartStore::load(Arc::clone(&storage), Arc::clone(&notifier));
        let session = SessionStore::load(
            api.clone(),
            Arc::clone(&storage),
            Arc::clone(&notifier),
            config.admin_override_email.clone(),
        );

        Ok(Self {
            inner: Arc::new(StorefrontStateInner {
                config,
                storage,
                api,
                notifier,
                cart,
                session,
            }),
        })
    }

    /// Create the state with a [`FileStore`] at `config.storage_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file exists but cannot be read, or if
    /// the HTTP client cannot be built.
    pub fn open(config: StorefrontConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let storage = FileStore::open(&config.storage_path)?;
        tracing::debug!(path = %storage.path().display(), "Opened storage");
        Self::new(config, Arc::new(storage), notifier)
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the durable storage backend.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.storage
    }

    /// Get a reference to the remote API client.
    #[must_use]
    pub fn api(&self) -> &HttpApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore<HttpApiClient> {
        &self.inner.session
    }
}
