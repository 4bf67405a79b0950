//! Authenticated callers.

use serde::{Deserialize, Serialize};

/// Permission level attached to an API token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// The user behind a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    /// Restaurant the user belongs to, if any.
    pub restaurant_id: Option<String>,
    pub role: Role,
}

impl AuthUser {
    /// Whether this user may create invites for a restaurant.
    pub fn can_invite_to(&self, restaurant_id: &str) -> bool {
        self.role == Role::Admin || self.restaurant_id.as_deref() == Some(restaurant_id)
    }
}
