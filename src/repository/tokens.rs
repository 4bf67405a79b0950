//! API token repository.
//!
//! Tokens are random strings handed to the client once; only their SHA-256
//! hash is stored.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use sha2::{Digest, Sha256};

use super::models::{ApiTokenRecord, NewApiToken};
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::{AuthUser, Role};
use crate::schema::api_tokens;

/// Prefix on issued tokens, so they are recognizable in logs and config.
pub const TOKEN_PREFIX: &str = "sb_";

/// Hash a bearer token for storage.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_token() -> String {
    format!(
        "{}{}{}",
        TOKEN_PREFIX,
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

#[derive(Clone)]
pub struct TokenRepository {
    pool: AsyncSqlitePool,
}

impl TokenRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Issue a new token for a user. Returns the plaintext token.
    pub async fn issue(
        &self,
        user_id: &str,
        restaurant_id: Option<&str>,
        role: Role,
    ) -> Result<String, DieselError> {
        let token = generate_token();
        let token_hash = hash_token(&token);
        let now = Utc::now().to_rfc3339();

        let mut conn = self.pool.get().await?;
        diesel::insert_into(api_tokens::table)
            .values(&NewApiToken {
                token_hash: &token_hash,
                user_id,
                restaurant_id,
                role: role.as_str(),
                created_at: &now,
            })
            .execute(&mut conn)
            .await?;

        Ok(token)
    }

    /// Resolve a bearer token to its user.
    pub async fn resolve(&self, token: &str) -> Result<Option<AuthUser>, DieselError> {
        let mut conn = self.pool.get().await?;
        let record = api_tokens::table
            .find(hash_token(token))
            .select(ApiTokenRecord::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(record.map(|r| AuthUser {
            user_id: r.user_id,
            restaurant_id: r.restaurant_id,
            role: Role::from_str(&r.role).unwrap_or(Role::Member),
        }))
    }

    /// Revoke a token. Returns whether it existed.
    pub async fn revoke(&self, token: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(api_tokens::table.find(hash_token(token)))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }
}
