//! Suspension repository.

use std::sync::Arc;

use crate::entities::{Suspension, suspension};
use redeemly_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

/// Suspension repository for database operations.
#[derive(Clone)]
pub struct SuspensionRepository {
    db: Arc<DatabaseConnection>,
}

impl SuspensionRepository {
    /// Create a new suspension repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new suspension record.
    pub async fn create(&self, model: suspension::ActiveModel) -> AppResult<suspension::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The most recent active, unexpired suspension for a user, if any.
    pub async fn find_active_by_user(
        &self,
        user_id: &str,
    ) -> AppResult<Option<suspension::Model>> {
        let now = chrono::Utc::now();

        Suspension::find()
            .filter(suspension::Column::UserId.eq(user_id))
            .filter(suspension::Column::IsActive.eq(true))
            .filter(suspension::Column::SuspendedUntil.gt(now))
            .order_by_desc(suspension::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Deactivate all of a user's active suspensions (single UPDATE).
    ///
    /// Used both for lazy expiry and to enforce the single-active-suspension
    /// policy when a new record is created.
    pub async fn deactivate_for_user(&self, user_id: &str) -> AppResult<()> {
        Suspension::update_many()
            .col_expr(suspension::Column::IsActive, Expr::value(false))
            .filter(suspension::Column::UserId.eq(user_id))
            .filter(suspension::Column::IsActive.eq(true))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
