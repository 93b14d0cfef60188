//! Session store.
//!
//! Tracks who is logged in. A session is the pair of bearer token and user
//! record; both are mirrored to durable storage (`authToken`, `userData`) so
//! the next process start resumes it.
//!
//! # Overlapping requests
//!
//! Every login, registration and logout takes a ticket from a monotonic
//! counter. A login or registration response is applied only if its ticket
//! is still the newest when it arrives, so a slow response can never
//! overwrite the outcome of a later request or resurrect a logged-out
//! session.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use pizzeria_core::{Email, User};
use secrecy::{ExposeSecret, SecretString};

use crate::api::{ApiError, AuthApi, AuthResponse};
use crate::error::ValidationError;
use crate::notify::{Notification, Notifier};
use crate::storage::{KeyValueStore, StorageError, keys};

const LOGIN_FAILED: &str = "Invalid email or password";
const REGISTRATION_FAILED: &str = "Registration failed";

/// An authenticated session.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    token: SecretString,
}

impl Session {
    fn new(user: User, token: String) -> Self {
        Self {
            user,
            token: SecretString::from(token),
        }
    }

    /// Bearer token of this session.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

#[derive(Debug, Clone, Copy)]
enum AuthKind {
    Login,
    Register,
}

impl AuthKind {
    const fn fallback_message(self) -> &'static str {
        match self {
            Self::Login => LOGIN_FAILED,
            Self::Register => REGISTRATION_FAILED,
        }
    }

    const fn success_message(self) -> &'static str {
        match self {
            Self::Login => "Login successful!",
            Self::Register => "Registration successful!",
        }
    }
}

/// Shared handle to the session.
///
/// Cheap to clone; clones observe the same session.
pub struct SessionStore<A> {
    inner: Arc<SessionStoreInner<A>>,
}

impl<A> Clone for SessionStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionStoreInner<A> {
    api: A,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    admin_override: Option<Email>,
    session: RwLock<Option<Session>>,
    in_flight: AtomicUsize,
    latest_ticket: AtomicU64,
}

/// Marks a login or registration as in flight until dropped.
struct InFlight<'a> {
    counter: &'a AtomicUsize,
    ticket: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<A: AuthApi> SessionStore<A> {
    /// Create the store, resuming any session found in durable storage.
    ///
    /// Logins made with `admin_override` as the email are granted admin
    /// rights regardless of what the server reports.
    pub fn load(
        api: A,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        admin_override: Option<Email>,
    ) -> Self {
        let session = read_persisted_session(storage.as_ref());
        if let Some(session) = &session {
            tracing::info!(user_id = %session.user.id, "Resumed session");
        }

        Self {
            inner: Arc::new(SessionStoreInner {
                api,
                storage,
                notifier,
                admin_override,
                session: RwLock::new(session),
                in_flight: AtomicUsize::new(0),
                latest_ticket: AtomicU64::new(0),
            }),
        }
    }

    /// The API this store authenticates against.
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// Log in with email and password.
    ///
    /// Returns `true` if a session was established. Failures are reported
    /// through the notifier.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.authenticate(AuthKind::Login, email, password).await
    }

    /// Create an account and log into it.
    ///
    /// New accounts never have admin rights.
    pub async fn register(&self, email: &str, password: &str) -> bool {
        self.authenticate(AuthKind::Register, email, password).await
    }

    #[tracing::instrument(skip_all, fields(kind = ?kind))]
    async fn authenticate(&self, kind: AuthKind, email: &str, password: &str) -> bool {
        let email = match validate_credentials(email, password) {
            Ok(email) => email,
            Err(e) => {
                self.inner.notifier.notify(Notification::error(e.to_string()));
                return false;
            }
        };

        let result = {
            let guard = self.begin_request();
            let result = match kind {
                AuthKind::Login => self.inner.api.login(email.as_str(), password).await,
                AuthKind::Register => self.inner.api.register(email.as_str(), password).await,
            };
            if !self.is_latest(guard.ticket) {
                tracing::debug!(ticket = guard.ticket, "Discarding stale auth response");
                return false;
            }
            result
        };

        match result {
            Ok(AuthResponse { token, mut user }) => {
                user.is_admin = match kind {
                    AuthKind::Login => user.is_admin || self.is_override(&email),
                    AuthKind::Register => false,
                };
                tracing::info!(user_id = %user.id, is_admin = user.is_admin, "Session established");
                self.establish(Session::new(user, token));
                self.inner
                    .notifier
                    .notify(Notification::success(kind.success_message()));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Authentication failed");
                self.inner
                    .notifier
                    .notify(Notification::error(failure_message(&e, kind)));
                false
            }
        }
    }

    /// End the session. Always succeeds.
    pub fn logout(&self) {
        // Invalidate any login still in flight.
        self.inner.latest_ticket.fetch_add(1, Ordering::SeqCst);

        clear_persisted_session(self.inner.storage.as_ref());
        let previous = self.write_session(None);
        if let Some(previous) = previous {
            tracing::info!(user_id = %previous.user.id, "Logged out");
        }
        self.inner
            .notifier
            .notify(Notification::success("Logged out successfully"));
    }

    fn begin_request(&self) -> InFlight<'_> {
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        let ticket = self.inner.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        InFlight {
            counter: &self.inner.in_flight,
            ticket,
        }
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.inner.latest_ticket.load(Ordering::SeqCst) == ticket
    }

    fn is_override(&self, email: &Email) -> bool {
        self.inner
            .admin_override
            .as_ref()
            .is_some_and(|admin| admin == email)
    }

    fn establish(&self, session: Session) {
        if let Err(e) = persist_session(self.inner.storage.as_ref(), &session) {
            tracing::warn!(error = %e, "Failed to persist session, next start will be a guest");
            clear_persisted_session(self.inner.storage.as_ref());
        }
        self.write_session(Some(session));
    }
}

impl<A> SessionStore<A> {
    fn write_session(&self, session: Option<Session>) -> Option<Session> {
        let mut slot = self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, session)
    }

    fn with_session<T>(&self, f: impl FnOnce(Option<&Session>) -> T) -> T {
        let slot = self
            .inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(slot.as_ref())
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.with_session(|session| session.map(|s| s.user.clone()))
    }

    /// Bearer token of the current session, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.with_session(|session| {
            session.map(|s| SecretString::from(s.token.expose_secret().to_owned()))
        })
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.with_session(|session| session.is_some())
    }

    /// Whether the current user may use the admin operations.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.with_session(|session| session.is_some_and(|s| s.user.is_admin))
    }

    /// True while a login or registration is waiting for the server.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }
}

impl<A> std::fmt::Debug for SessionStore<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_session(|session| {
            f.debug_struct("SessionStore")
                .field("session", &session)
                .field("loading", &self.is_loading())
                .finish_non_exhaustive()
        })
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<Email, ValidationError> {
    let email = Email::parse(email)?;
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(email)
}

/// What to tell the user when authentication fails.
fn failure_message(error: &ApiError, kind: AuthKind) -> String {
    match error {
        ApiError::Auth {
            message: Some(message),
        } => message.clone(),
        _ => kind.fallback_message().to_string(),
    }
}

/// Write the user record, then the token.
///
/// A token is only ever stored next to the record it was issued for; on a
/// partial failure the caller clears both keys.
fn persist_session(storage: &dyn KeyValueStore, session: &Session) -> Result<(), StorageError> {
    let user = serde_json::to_string(&session.user)?;
    storage.set(keys::USER_DATA, &user)?;
    storage.set(keys::AUTH_TOKEN, session.token.expose_secret())
}

fn clear_persisted_session(storage: &dyn KeyValueStore) {
    for key in [keys::AUTH_TOKEN, keys::USER_DATA] {
        if let Err(e) = storage.remove(key) {
            tracing::warn!(key, error = %e, "Failed to remove session key");
        }
    }
}

/// Read a session from storage.
///
/// A user record that does not parse removes both keys.
fn read_persisted_session(storage: &dyn KeyValueStore) -> Option<Session> {
    match (storage.get(keys::AUTH_TOKEN), storage.get(keys::USER_DATA)) {
        (Ok(Some(token)), Ok(Some(raw))) => match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(Session::new(user, token)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupt persisted session");
                clear_persisted_session(storage);
                None
            }
        },
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Failed to read session from storage");
            None
        }
        _ => None,
    }
}
