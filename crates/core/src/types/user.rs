//! Authenticated user record.

use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// The user behind a session, as returned by the auth endpoints and as
/// persisted under the `userData` storage key (`{"id","email","isAdmin"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    /// Grants access to the pizza and order management operations.
    #[serde(default)]
    pub is_admin: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_shape() {
        let user = User {
            id: UserId::new(5),
            email: Email::parse("diner@example.com").unwrap(),
            is_admin: true,
        };
        assert_eq!(
            serde_json::to_string(&user).unwrap(),
            r#"{"id":5,"email":"diner@example.com","isAdmin":true}"#
        );
    }

    #[test]
    fn test_missing_admin_flag_defaults_false() {
        let user: User = serde_json::from_str(r#"{"id":5,"email":"diner@example.com"}"#).unwrap();
        assert!(!user.is_admin);
    }
}
