//! Redeem code repository.

use std::sync::Arc;

use crate::entities::{RedeemCode, redeem_code};
use redeemly_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};

/// Copies at which a code is considered exhausted and auto-archived.
pub const ARCHIVE_THRESHOLD: i32 = 5;

/// Redeem code repository for database operations.
#[derive(Clone)]
pub struct RedeemCodeRepository {
    db: Arc<DatabaseConnection>,
}

impl RedeemCodeRepository {
    /// Create a new redeem code repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a code by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<redeem_code::Model>> {
        RedeemCode::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a code by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<redeem_code::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CodeNotFound(id.to_string()))
    }

    /// Find codes by a set of IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<redeem_code::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        RedeemCode::find()
            .filter(redeem_code::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new code.
    pub async fn create(&self, model: redeem_code::ActiveModel) -> AppResult<redeem_code::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a code.
    pub async fn update(&self, model: redeem_code::ActiveModel) -> AppResult<redeem_code::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a code by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        RedeemCode::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Codes visible in the general listing: not archived and still under
    /// the archive threshold, least-copied first.
    pub async fn find_listable(&self) -> AppResult<Vec<redeem_code::Model>> {
        RedeemCode::find()
            .filter(redeem_code::Column::IsArchived.eq(false))
            .filter(redeem_code::Column::CopyCount.lt(ARCHIVE_THRESHOLD))
            .order_by_asc(redeem_code::Column::CopyCount)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's archived codes, newest first.
    pub async fn find_archived_by_user(&self, user_id: &str) -> AppResult<Vec<redeem_code::Model>> {
        RedeemCode::find()
            .filter(redeem_code::Column::UserId.eq(user_id))
            .filter(redeem_code::Column::IsArchived.eq(true))
            .order_by_desc(redeem_code::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All of a user's codes, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<redeem_code::Model>> {
        RedeemCode::find()
            .filter(redeem_code::Column::UserId.eq(user_id))
            .order_by_desc(redeem_code::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's most recently added codes.
    pub async fn find_recent_by_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<redeem_code::Model>> {
        use sea_orm::QuerySelect;

        RedeemCode::find()
            .filter(redeem_code::Column::UserId.eq(user_id))
            .order_by_desc(redeem_code::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's codes.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        RedeemCode::find()
            .filter(redeem_code::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the copy counter atomically (single UPDATE query, no fetch).
    ///
    /// Avoids lost updates when multiple users copy the same code
    /// concurrently.
    pub async fn increment_copy_count(&self, code_id: &str) -> AppResult<()> {
        RedeemCode::update_many()
            .col_expr(
                redeem_code::Column::CopyCount,
                Expr::col(redeem_code::Column::CopyCount).add(1),
            )
            .filter(redeem_code::Column::Id.eq(code_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Set the archived flag (single UPDATE query, no fetch).
    pub async fn set_archived(&self, code_id: &str, archived: bool) -> AppResult<()> {
        RedeemCode::update_many()
            .col_expr(redeem_code::Column::IsArchived, Expr::value(archived))
            .filter(redeem_code::Column::Id.eq(code_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
