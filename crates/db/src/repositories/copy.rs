//! Copy repository.

use std::sync::Arc;

use crate::entities::{Copy, copy};
use chrono::{DateTime, Utc};
use redeemly_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};

/// Copy repository for database operations.
#[derive(Clone)]
pub struct CopyRepository {
    db: Arc<DatabaseConnection>,
}

impl CopyRepository {
    /// Create a new copy repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a copy record by user and code.
    pub async fn find_by_user_and_code(
        &self,
        user_id: &str,
        code_id: &str,
    ) -> AppResult<Option<copy::Model>> {
        Copy::find()
            .filter(copy::Column::UserId.eq(user_id))
            .filter(copy::Column::CodeId.eq(code_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a user has already copied a code.
    pub async fn has_copied(&self, user_id: &str, code_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_code(user_id, code_id)
            .await?
            .is_some())
    }

    /// Create a new copy record.
    ///
    /// The `(user_id, code_id)` unique index is the authoritative guard
    /// against double copies; a violation is surfaced as [`AppError::Conflict`]
    /// so concurrent duplicate attempts fail at the constraint instead of
    /// silently succeeding twice.
    pub async fn create(&self, model: copy::ActiveModel) -> AppResult<copy::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// A user's most recent copy records since the given instant, newest
    /// first. This is the rapid-copy detector's input window.
    pub async fn find_recent_by_user(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
        limit: u64,
    ) -> AppResult<Vec<copy::Model>> {
        Copy::find()
            .filter(copy::Column::UserId.eq(user_id))
            .filter(copy::Column::CreatedAt.gte(since))
            .order_by_desc(copy::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's most recent copies regardless of age, newest first.
    pub async fn find_by_user(&self, user_id: &str, limit: u64) -> AppResult<Vec<copy::Model>> {
        Copy::find()
            .filter(copy::Column::UserId.eq(user_id))
            .order_by_desc(copy::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of all codes a user has copied.
    pub async fn find_code_ids_by_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        let copies = Copy::find()
            .filter(copy::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(copies.into_iter().map(|c| c.code_id).collect())
    }

    /// Count a user's copies.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Copy::find()
            .filter(copy::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
