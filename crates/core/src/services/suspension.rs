//! Suspension enforcement.
//!
//! Gates every sensitive action behind current suspension status and applies
//! new suspensions as a side effect of rapid-copy detection. The user row's
//! `is_suspended`/`suspended_until` fields are a read-through cache of the
//! suspension store; stale flags self-correct on the next check.

use chrono::{DateTime, Duration, Utc};
use redeemly_common::{format_suspension_expiry, AppError, AppResult, IdGenerator};
use redeemly_db::{
    entities::{misuse_log, misuse_log::ActionType, suspension, user},
    repositories::{MisuseLogRepository, SuspensionRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

use crate::services::abuse::SUSPENSION_MINUTES;

/// Reason recorded when the rapid-copy detector fires.
const RAPID_COPYING_REASON: &str = "Rapid copying pattern detected";

/// Fallback reason when no active suspension record is found.
const DEFAULT_REASON: &str = "Violation of platform rules";

/// Current suspension status for a user.
#[derive(Debug, Clone, Serialize)]
pub struct SuspensionStatus {
    pub is_suspended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Suspension enforcer service.
#[derive(Clone)]
pub struct SuspensionService {
    user_repo: UserRepository,
    suspension_repo: SuspensionRepository,
    misuse_log_repo: MisuseLogRepository,
    id_gen: IdGenerator,
}

impl SuspensionService {
    /// Create a new suspension service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        suspension_repo: SuspensionRepository,
        misuse_log_repo: MisuseLogRepository,
    ) -> Self {
        Self {
            user_repo,
            suspension_repo,
            misuse_log_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Check phase: runs before any protected action.
    ///
    /// Rejects with [`AppError::Suspended`] while an unexpired suspension is
    /// in effect. An expired suspension is cleared lazily; that clear is
    /// best-effort and never blocks the action it escorts.
    pub async fn check(&self, user: &user::Model) -> AppResult<()> {
        if !user.is_suspended {
            return Ok(());
        }

        match user.suspended_until {
            Some(until) if until.with_timezone(&Utc) > Utc::now() => {
                let reason = self.active_reason(&user.id).await;
                Err(AppError::Suspended {
                    until: format_suspension_expiry(until.with_timezone(&Utc)),
                    reason,
                })
            }
            _ => {
                // Expired (or flag without expiry): clear and let the
                // action proceed. Stale flags self-correct on a later check
                // if this write fails.
                if let Err(e) = self.clear(&user.id).await {
                    tracing::warn!(
                        user_id = %user.id,
                        error = %e,
                        "Failed to clear expired suspension, allowing action"
                    );
                }
                Ok(())
            }
        }
    }

    /// Apply phase: suspend a user after the rapid-copy detector fired.
    ///
    /// Writes the misuse log entry, supersedes prior active suspensions,
    /// creates the new suspension record, and updates the user's flags
    /// *last* so a concurrent check never observes a half-applied suspension
    /// lacking its record trail. Returns the error that terminates the
    /// in-flight action; write failures are logged but never prevent the
    /// rejection from being surfaced.
    pub async fn apply_rapid_copying(&self, user_id: &str, event_count: usize) -> AppError {
        let until = Utc::now() + Duration::minutes(SUSPENSION_MINUTES);

        let log_model = misuse_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            action_type: Set(ActionType::RapidCopying),
            details: Set(format!(
                "User made {event_count} copies in the last 2 minutes with rapid sequences detected."
            )),
            created_at: Set(Utc::now().into()),
        };
        if let Err(e) = self.misuse_log_repo.create(log_model).await {
            tracing::warn!(user_id, error = %e, "Failed to record misuse log entry");
        }

        // Single-active-suspension policy: a new record supersedes the rest.
        if let Err(e) = self.suspension_repo.deactivate_for_user(user_id).await {
            tracing::error!(user_id, error = %e, "Failed to deactivate prior suspensions");
        }

        let suspension_model = suspension::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            reason: Set(RAPID_COPYING_REASON.to_string()),
            suspended_until: Set(until.into()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };
        if let Err(e) = self.suspension_repo.create(suspension_model).await {
            tracing::error!(user_id, error = %e, "Failed to create suspension record");
        }

        // User flags last: the fast-path gate must not become visible before
        // the record trail exists.
        if let Err(e) = self.user_repo.set_suspension_flags(user_id, until).await {
            tracing::error!(user_id, error = %e, "Failed to set user suspension flags");
        }

        tracing::info!(user_id, until = %until, "Suspended user for rapid copying");

        AppError::AbuseDetected {
            until: format_suspension_expiry(until),
        }
    }

    /// Current suspension status, with the same lazy expiry clearing as the
    /// check phase.
    pub async fn status(&self, user_id: &str) -> AppResult<SuspensionStatus> {
        let user = self.user_repo.get_by_id(user_id).await?;

        if user.is_suspended {
            if let Some(until) = user.suspended_until {
                let until = until.with_timezone(&Utc);
                if until > Utc::now() {
                    let reason = self.active_reason(&user.id).await;
                    return Ok(SuspensionStatus {
                        is_suspended: true,
                        suspended_until: Some(until),
                        reason: Some(reason),
                    });
                }
            }

            if let Err(e) = self.clear(&user.id).await {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to clear expired suspension");
            }
        }

        Ok(SuspensionStatus {
            is_suspended: false,
            suspended_until: None,
            reason: None,
        })
    }

    /// Reason from the most recent active suspension record, falling back to
    /// a generic message. Read failures fall back too; the reason is
    /// informational.
    async fn active_reason(&self, user_id: &str) -> String {
        match self.suspension_repo.find_active_by_user(user_id).await {
            Ok(Some(s)) => s.reason,
            Ok(None) => DEFAULT_REASON.to_string(),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to load suspension reason");
                DEFAULT_REASON.to_string()
            }
        }
    }

    /// Clear the user's flags and deactivate their suspension records.
    async fn clear(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.clear_suspension_flags(user_id).await?;
        self.suspension_repo.deactivate_for_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_user(id: &str, suspended_until: Option<DateTime<Utc>>) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            name: None,
            email: None,
            password_hash: "hash".to_string(),
            token: Some("token".to_string()),
            is_suspended: suspended_until.is_some(),
            suspended_until: suspended_until.map(Into::into),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_suspension(user_id: &str, until: DateTime<Utc>) -> suspension::Model {
        suspension::Model {
            id: "s1".to_string(),
            user_id: user_id.to_string(),
            reason: RAPID_COPYING_REASON.to_string(),
            suspended_until: until.into(),
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    fn empty_db() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn exec_ok(n: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: n,
        }
    }

    fn service(
        user_db: Arc<sea_orm::DatabaseConnection>,
        susp_db: Arc<sea_orm::DatabaseConnection>,
        log_db: Arc<sea_orm::DatabaseConnection>,
    ) -> SuspensionService {
        SuspensionService::new(
            UserRepository::new(user_db),
            SuspensionRepository::new(susp_db),
            MisuseLogRepository::new(log_db),
        )
    }

    #[tokio::test]
    async fn test_check_passes_for_unsuspended_user() {
        let svc = service(empty_db(), empty_db(), empty_db());
        let user = test_user("u1", None);

        assert!(svc.check(&user).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_rejects_active_suspension_with_reason() {
        let until = Utc::now() + Duration::minutes(10);
        let susp_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_suspension("u1", until)]])
                .into_connection(),
        );
        let svc = service(empty_db(), susp_db, empty_db());
        let user = test_user("u1", Some(until));

        let err = svc.check(&user).await.unwrap_err();
        match err {
            AppError::Suspended { reason, .. } => {
                assert_eq!(reason, RAPID_COPYING_REASON);
            }
            other => panic!("expected Suspended, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_check_rejects_with_default_reason_when_no_record() {
        let until = Utc::now() + Duration::minutes(10);
        let susp_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<suspension::Model>::new()])
                .into_connection(),
        );
        let svc = service(empty_db(), susp_db, empty_db());
        let user = test_user("u1", Some(until));

        let err = svc.check(&user).await.unwrap_err();
        match err {
            AppError::Suspended { reason, .. } => assert_eq!(reason, DEFAULT_REASON),
            other => panic!("expected Suspended, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_check_clears_expired_suspension_and_allows() {
        let until = Utc::now() - Duration::minutes(10);
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok(1)])
                .into_connection(),
        );
        let susp_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok(1)])
                .into_connection(),
        );
        let svc = service(user_db, susp_db, empty_db());
        let user = test_user("u1", Some(until));

        assert!(svc.check(&user).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_allows_even_when_lazy_clear_fails() {
        // No exec results queued: the clear write errors, the action still
        // proceeds.
        let until = Utc::now() - Duration::minutes(10);
        let svc = service(empty_db(), empty_db(), empty_db());
        let user = test_user("u1", Some(until));

        assert!(svc.check(&user).await.is_ok());
    }

    #[tokio::test]
    async fn test_status_reports_active_suspension() {
        let until = Utc::now() + Duration::minutes(10);
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1", Some(until))]])
                .into_connection(),
        );
        let susp_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_suspension("u1", until)]])
                .into_connection(),
        );
        let svc = service(user_db, susp_db, empty_db());

        let status = svc.status("u1").await.unwrap();
        assert!(status.is_suspended);
        assert!(status.suspended_until.is_some());
        assert_eq!(status.reason.as_deref(), Some(RAPID_COPYING_REASON));
    }

    #[tokio::test]
    async fn test_status_clears_expired_and_reports_clean() {
        let until = Utc::now() - Duration::minutes(10);
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1", Some(until))]])
                .append_exec_results([exec_ok(1)])
                .into_connection(),
        );
        let susp_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok(1)])
                .into_connection(),
        );
        let svc = service(user_db, susp_db, empty_db());

        let status = svc.status("u1").await.unwrap();
        assert!(!status.is_suspended);
        assert!(status.suspended_until.is_none());
    }

    #[tokio::test]
    async fn test_status_repeated_after_expiry_converges() {
        let until = Utc::now() - Duration::minutes(10);
        // First call sees stale flags and clears; second call sees clean
        // flags and touches nothing else.
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1", Some(until))]])
                .append_exec_results([exec_ok(1)])
                .append_query_results([[test_user("u1", None)]])
                .into_connection(),
        );
        let susp_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok(1)])
                .into_connection(),
        );
        let svc = service(user_db, susp_db, empty_db());

        let first = svc.status("u1").await.unwrap();
        let second = svc.status("u1").await.unwrap();
        assert!(!first.is_suspended);
        assert!(!second.is_suspended);
    }

    #[tokio::test]
    async fn test_apply_rapid_copying_returns_abuse_detected() {
        let now = Utc::now();
        let log_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok(1)])
                .append_query_results([[misuse_log::Model {
                    id: "m1".to_string(),
                    user_id: "u1".to_string(),
                    action_type: ActionType::RapidCopying,
                    details: "details".to_string(),
                    created_at: now.into(),
                }]])
                .into_connection(),
        );
        let susp_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok(0), exec_ok(1)])
                .append_query_results([[test_suspension(
                    "u1",
                    now + Duration::minutes(30),
                )]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok(1)])
                .into_connection(),
        );
        let svc = service(user_db, susp_db, log_db);

        let err = svc.apply_rapid_copying("u1", 5).await;
        match err {
            AppError::AbuseDetected { until } => assert!(!until.is_empty()),
            other => panic!("expected AbuseDetected, got {other:?}"),
        }
    }
}
