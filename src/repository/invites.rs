//! Invite code repository.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use super::models::{InviteCodeRecord, NewInviteCode};
use super::pool::{AsyncSqlitePool, DieselError};
use super::{parse_datetime, parse_datetime_opt};
use crate::models::{InviteCode, MarkUsed};
use crate::schema::invite_codes;

impl From<InviteCodeRecord> for InviteCode {
    fn from(record: InviteCodeRecord) -> Self {
        InviteCode {
            code: record.code,
            restaurant_id: record.restaurant_id,
            created_by: record.created_by,
            used: record.used,
            used_at: parse_datetime_opt(record.used_at.as_deref()),
            created_at: parse_datetime(&record.created_at),
        }
    }
}

#[derive(Clone)]
pub struct InviteRepository {
    pool: AsyncSqlitePool,
}

impl InviteRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Create and store a fresh invite for a restaurant.
    pub async fn create(
        &self,
        restaurant_id: &str,
        created_by: &str,
    ) -> Result<InviteCode, DieselError> {
        let invite = InviteCode::new(restaurant_id.to_string(), created_by.to_string());
        let created_at = invite.created_at.to_rfc3339();

        let mut conn = self.pool.get().await?;
        diesel::insert_into(invite_codes::table)
            .values(&NewInviteCode {
                code: &invite.code,
                restaurant_id: &invite.restaurant_id,
                created_by: &invite.created_by,
                used: false,
                used_at: None,
                created_at: &created_at,
            })
            .execute(&mut conn)
            .await?;

        debug!("Created invite {} for {}", invite.code, restaurant_id);
        Ok(invite)
    }

    /// Look up an invite by code.
    pub async fn get(&self, code: &str) -> Result<Option<InviteCode>, DieselError> {
        let mut conn = self.pool.get().await?;
        invite_codes::table
            .find(code)
            .select(InviteCodeRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(InviteCode::from))
    }

    /// Mark an invite as used.
    ///
    /// The update only matches unused rows, so of two concurrent calls at
    /// most one reports `Marked`.
    pub async fn mark_used(&self, code: &str) -> Result<MarkUsed, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        let updated = diesel::update(
            invite_codes::table
                .filter(invite_codes::code.eq(code))
                .filter(invite_codes::used.eq(false)),
        )
        .set((
            invite_codes::used.eq(true),
            invite_codes::used_at.eq(Some(now.as_str())),
        ))
        .execute(&mut conn)
        .await?;

        if updated > 0 {
            return Ok(MarkUsed::Marked);
        }

        let exists: i64 = invite_codes::table
            .filter(invite_codes::code.eq(code))
            .count()
            .get_result(&mut conn)
            .await?;

        Ok(if exists > 0 {
            MarkUsed::AlreadyUsed
        } else {
            MarkUsed::NotFound
        })
    }

    /// All invites for a restaurant, newest first.
    pub async fn list_for_restaurant(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<InviteCode>, DieselError> {
        let mut conn = self.pool.get().await?;
        invite_codes::table
            .filter(invite_codes::restaurant_id.eq(restaurant_id))
            .order(invite_codes::created_at.desc())
            .select(InviteCodeRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(InviteCode::from).collect())
    }
}
