//! Copy orchestration.
//!
//! The copy request path: suspension gate, rapid-copy detection, duplicate
//! prevention, counter increment and threshold archival, in that order. The
//! detector runs over the copies that already exist, so an abusive request is
//! rejected before it writes anything.

use chrono::{DateTime, Duration, Utc};
use redeemly_common::{AppError, AppResult, IdGenerator};
use redeemly_db::{
    entities::{copy, user},
    repositories::{CopyRepository, RedeemCodeRepository, ARCHIVE_THRESHOLD},
};
use sea_orm::Set;
use serde::Serialize;

use crate::services::abuse::{is_rapid_copying, MAX_RECENT_COPIES, RECENT_WINDOW_SECS};
use crate::services::suspension::SuspensionService;

/// Result of a successful copy.
#[derive(Debug, Clone, Serialize)]
pub struct CopyOutcome {
    /// The code text itself, revealed on copy.
    pub code: String,
    /// The code's copy counter after this copy.
    pub copy_count: i32,
}

/// Copy orchestrator service.
#[derive(Clone)]
pub struct CopyService {
    copy_repo: CopyRepository,
    code_repo: RedeemCodeRepository,
    suspension: SuspensionService,
    id_gen: IdGenerator,
}

impl CopyService {
    /// Create a new copy service.
    #[must_use]
    pub const fn new(
        copy_repo: CopyRepository,
        code_repo: RedeemCodeRepository,
        suspension: SuspensionService,
    ) -> Self {
        Self {
            copy_repo,
            code_repo,
            suspension,
            id_gen: IdGenerator::new(),
        }
    }

    /// Copy a code on behalf of a user.
    ///
    /// Ordering contract:
    /// 1. suspension check (rejects already-suspended users),
    /// 2. rapid-copy detection over the recent window (suspends and rejects
    ///    before any copy-path write),
    /// 3. target code lookup,
    /// 4. duplicate fast path, then insert; the `(user_id, code_id)` unique
    ///    index is the authoritative duplicate guard,
    /// 5. atomic counter increment, refetch, archive at the threshold.
    pub async fn copy(&self, user: &user::Model, code_id: &str) -> AppResult<CopyOutcome> {
        self.suspension.check(user).await?;

        let since = Utc::now() - Duration::seconds(RECENT_WINDOW_SECS);
        let recent = self
            .copy_repo
            .find_recent_by_user(&user.id, since, MAX_RECENT_COPIES)
            .await?;
        let timestamps: Vec<DateTime<Utc>> = recent
            .iter()
            .map(|c| c.created_at.with_timezone(&Utc))
            .collect();
        if is_rapid_copying(&timestamps) {
            return Err(self
                .suspension
                .apply_rapid_copying(&user.id, recent.len())
                .await);
        }

        let code = self.code_repo.get_by_id(code_id).await?;

        if self.copy_repo.has_copied(&user.id, &code.id).await? {
            return Err(AppError::Conflict);
        }

        let model = copy::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user.id.clone()),
            code_id: Set(code.id.clone()),
            created_at: Set(Utc::now().into()),
        };
        self.copy_repo.create(model).await?;

        self.code_repo.increment_copy_count(&code.id).await?;
        let updated = self.code_repo.get_by_id(&code.id).await?;

        if updated.copy_count >= ARCHIVE_THRESHOLD && !updated.is_archived {
            self.code_repo.set_archived(&code.id, true).await?;
            tracing::info!(code_id = %code.id, copy_count = updated.copy_count, "Archived exhausted code");
        }

        Ok(CopyOutcome {
            code: updated.code,
            copy_count: updated.copy_count,
        })
    }
}
