//! Login, registration and identity.

use pizzeria_storefront::state::StorefrontState;

use super::CommandError;

pub async fn login(
    state: &StorefrontState,
    email: &str,
    password: &str,
) -> Result<(), CommandError> {
    if state.session().login(email, password).await {
        Ok(())
    } else {
        Err(CommandError::Failed("Login"))
    }
}

pub async fn register(
    state: &StorefrontState,
    email: &str,
    password: &str,
) -> Result<(), CommandError> {
    if state.session().register(email, password).await {
        Ok(())
    } else {
        Err(CommandError::Failed("Registration"))
    }
}

/// Print who is logged in.
pub fn whoami(state: &StorefrontState) {
    match state.session().current_user() {
        Some(user) => {
            let role = if user.is_admin { "admin" } else { "customer" };
            tracing::info!("{} (id {}, {})", user.email, user.id, role);
        }
        None => tracing::info!("Not logged in"),
    }
}
