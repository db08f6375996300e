//! Misuse log repository.

use std::sync::Arc;

use crate::entities::{MisuseLog, misuse_log};
use redeemly_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Misuse log repository for database operations. The log is append-only;
/// there are no update or delete operations.
#[derive(Clone)]
pub struct MisuseLogRepository {
    db: Arc<DatabaseConnection>,
}

impl MisuseLogRepository {
    /// Create a new misuse log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a misuse log entry.
    pub async fn create(&self, model: misuse_log::ActiveModel) -> AppResult<misuse_log::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's misuse history, newest first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<misuse_log::Model>> {
        MisuseLog::find()
            .filter(misuse_log::Column::UserId.eq(user_id))
            .order_by_desc(misuse_log::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::misuse_log::ActionType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_log(id: &str, user_id: &str) -> misuse_log::Model {
        misuse_log::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            action_type: ActionType::RapidCopying,
            details: "User made 5 copies in the last 2 minutes with rapid sequences detected."
                .to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let l1 = create_test_log("m1", "u1");
        let l2 = create_test_log("m2", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[l1, l2]])
                .into_connection(),
        );

        let repo = MisuseLogRepository::new(db);
        let result = repo.find_by_user("u1", 10).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].action_type, ActionType::RapidCopying);
    }
}
