//! Single-use invite codes.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Length of generated invite codes.
const INVITE_CODE_LEN: usize = 20;

/// An invite that lets a new user join a restaurant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCode {
    pub code: String,
    pub restaurant_id: String,
    pub created_by: String,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl InviteCode {
    pub fn new(restaurant_id: String, created_by: String) -> Self {
        Self {
            code: generate_invite_code(),
            restaurant_id,
            created_by,
            used: false,
            used_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of marking an invite as used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkUsed {
    /// The invite was unused and is now marked.
    Marked,
    /// The invite had already been used; nothing changed.
    AlreadyUsed,
    NotFound,
}

/// Generate a random invite code.
pub fn generate_invite_code() -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string();
    raw[..INVITE_CODE_LEN].to_string()
}
