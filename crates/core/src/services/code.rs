//! Redeem code management.

use chrono::Utc;
use redeemly_common::{AppError, AppResult, IdGenerator};
use redeemly_db::{
    entities::redeem_code,
    repositories::{CopyRepository, RedeemCodeRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use validator::Validate;

/// Input for creating a code.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCodeInput {
    #[validate(length(min = 1, message = "Please add a title and code"))]
    pub title: String,
    #[validate(length(min = 1, message = "Please add a title and code"))]
    pub code: String,
}

/// Input for updating a code. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCodeInput {
    pub title: Option<String>,
    pub code: Option<String>,
}

/// Code owner as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct CodeOwner {
    pub id: String,
    pub name: String,
}

/// A code in the general listing, annotated for the calling user.
#[derive(Debug, Clone, Serialize)]
pub struct ListedCode {
    pub id: String,
    pub title: String,
    pub code: String,
    pub user: CodeOwner,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub copy_count: i32,
    pub has_copied: bool,
}

/// Per-user dashboard statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CodeStats {
    pub added_codes: u64,
    pub total_copies: u64,
}

/// Redeem code service.
#[derive(Clone)]
pub struct CodeService {
    code_repo: RedeemCodeRepository,
    copy_repo: CopyRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl CodeService {
    /// Create a new code service.
    #[must_use]
    pub const fn new(
        code_repo: RedeemCodeRepository,
        copy_repo: CopyRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            code_repo,
            copy_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new code owned by the given user.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateCodeInput,
    ) -> AppResult<redeem_code::Model> {
        input.validate()?;

        let model = redeem_code::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(input.title),
            code: Set(input.code),
            copy_count: Set(0),
            is_archived: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        self.code_repo.create(model).await
    }

    /// Update a code. Only the owner may update.
    pub async fn update(
        &self,
        user_id: &str,
        code_id: &str,
        input: UpdateCodeInput,
    ) -> AppResult<redeem_code::Model> {
        let code = self.owned_code(user_id, code_id, "update").await?;

        let mut model: redeem_code::ActiveModel = code.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(code_text) = input.code {
            model.code = Set(code_text);
        }
        model.updated_at = Set(Some(Utc::now().into()));
        self.code_repo.update(model).await
    }

    /// Delete a code. Only the owner may delete.
    pub async fn delete(&self, user_id: &str, code_id: &str) -> AppResult<()> {
        self.owned_code(user_id, code_id, "delete").await?;
        self.code_repo.delete(code_id).await
    }

    /// Archive a code. Only the owner may archive.
    pub async fn archive(&self, user_id: &str, code_id: &str) -> AppResult<()> {
        self.owned_code(user_id, code_id, "archive").await?;
        self.code_repo.set_archived(code_id, true).await
    }

    /// Unarchive a code. Only the owner may unarchive.
    pub async fn unarchive(&self, user_id: &str, code_id: &str) -> AppResult<()> {
        self.owned_code(user_id, code_id, "unarchive").await?;
        self.code_repo.set_archived(code_id, false).await
    }

    /// General listing: non-archived codes still under the archive threshold,
    /// least-copied first, annotated with the owner's display name and
    /// whether the calling user has already copied each code.
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<ListedCode>> {
        let codes = self.code_repo.find_listable().await?;

        let copied: HashSet<String> = self
            .copy_repo
            .find_code_ids_by_user(user_id)
            .await?
            .into_iter()
            .collect();

        let owner_ids: Vec<String> = codes
            .iter()
            .map(|c| c.user_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let owners: HashMap<String, String> = self
            .user_repo
            .find_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|u| {
                let name = u.name.unwrap_or(u.username);
                (u.id, name)
            })
            .collect();

        Ok(codes
            .into_iter()
            .map(|c| {
                let has_copied = copied.contains(&c.id);
                let name = owners.get(&c.user_id).cloned().unwrap_or_default();
                ListedCode {
                    id: c.id,
                    title: c.title,
                    code: c.code,
                    user: CodeOwner {
                        id: c.user_id,
                        name,
                    },
                    created_at: c.created_at,
                    copy_count: c.copy_count,
                    has_copied,
                }
            })
            .collect())
    }

    /// The caller's archived codes, newest first.
    pub async fn archived(&self, user_id: &str) -> AppResult<Vec<redeem_code::Model>> {
        self.code_repo.find_archived_by_user(user_id).await
    }

    /// All of the caller's codes, newest first.
    pub async fn mine(&self, user_id: &str) -> AppResult<Vec<redeem_code::Model>> {
        self.code_repo.find_by_user(user_id).await
    }

    /// Dashboard statistics for the caller.
    pub async fn stats(&self, user_id: &str) -> AppResult<CodeStats> {
        let added_codes = self.code_repo.count_by_user(user_id).await?;
        let total_copies = self.copy_repo.count_by_user(user_id).await?;
        Ok(CodeStats {
            added_codes,
            total_copies,
        })
    }

    /// Fetch a code and enforce that `user_id` owns it.
    async fn owned_code(
        &self,
        user_id: &str,
        code_id: &str,
        action: &str,
    ) -> AppResult<redeem_code::Model> {
        let code = self.code_repo.get_by_id(code_id).await?;
        if code.user_id != user_id {
            return Err(AppError::Forbidden(format!(
                "Not authorized to {action} this code"
            )));
        }
        Ok(code)
    }
}
