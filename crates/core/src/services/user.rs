//! User accounts.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use redeemly_common::{AppError, AppResult, IdGenerator};
use redeemly_db::{
    entities::{redeem_code, user},
    repositories::{CopyRepository, RedeemCodeRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// How many recent copies and codes the activity view shows.
const ACTIVITY_LIMIT: u64 = 10;

/// Input for creating a user account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

/// Input for updating a profile. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

/// A recent copy joined with its code, for the activity view.
#[derive(Debug, Clone, Serialize)]
pub struct RecentCopy {
    pub id: String,
    pub copied_at: sea_orm::prelude::DateTimeWithTimeZone,
    /// None when the copied code has since been deleted.
    pub code: Option<redeem_code::Model>,
}

/// A user's recent activity.
#[derive(Debug, Clone, Serialize)]
pub struct UserActivity {
    pub recent_copies: Vec<RecentCopy>,
    pub recent_codes: Vec<redeem_code::Model>,
}

/// User account service.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    copy_repo: CopyRepository,
    code_repo: RedeemCodeRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        copy_repo: CopyRepository,
        code_repo: RedeemCodeRepository,
    ) -> Self {
        Self {
            user_repo,
            copy_repo,
            code_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and issue its access token.
    pub async fn signup(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(user_id),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            token: Set(Some(token)),
            is_suspended: Set(false),
            suspended_until: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        self.user_repo.create(model).await
    }

    /// Authenticate by username and password.
    ///
    /// Issues a token if the account somehow lacks one; otherwise the stored
    /// token is returned unchanged so other sessions stay valid.
    pub async fn signin(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if user.token.is_some() {
            return Ok(user);
        }

        let token = self.id_gen.generate_token();
        self.user_repo.set_token(&user.id, &token).await?;
        Ok(user::Model {
            token: Some(token),
            ..user
        })
    }

    /// Resolve a bearer token to its user. Drives the auth middleware.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Update profile fields, rehashing the password when it changes.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(Some(name));
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(password) = input.password {
            active.password_hash = Set(hash_password(&password)?);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Recent copies (joined with their codes) and recently added codes.
    pub async fn activity(&self, user_id: &str) -> AppResult<UserActivity> {
        let copies = self.copy_repo.find_by_user(user_id, ACTIVITY_LIMIT).await?;

        let code_ids: Vec<String> = copies.iter().map(|c| c.code_id.clone()).collect();
        let codes: HashMap<String, redeem_code::Model> = self
            .code_repo
            .find_by_ids(&code_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let recent_copies = copies
            .into_iter()
            .map(|c| RecentCopy {
                id: c.id,
                copied_at: c.created_at,
                code: codes.get(&c.code_id).cloned(),
            })
            .collect();

        let recent_codes = self
            .code_repo
            .find_recent_by_user(user_id, ACTIVITY_LIMIT)
            .await?;

        Ok(UserActivity {
            recent_copies,
            recent_codes,
        })
    }
}

/// Hash a password with argon2id and a fresh salt.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use redeemly_db::entities::copy;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_user(id: &str, username: &str, password_hash: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            name: None,
            email: None,
            password_hash: password_hash.to_string(),
            token: Some("token".to_string()),
            is_suspended: false,
            suspended_until: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_code(id: &str, user_id: &str) -> redeem_code::Model {
        redeem_code::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: "Free shipping".to_string(),
            code: "SHIP2026".to_string(),
            copy_count: 0,
            is_archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service(
        user_db: Arc<DatabaseConnection>,
        copy_db: Arc<DatabaseConnection>,
        code_db: Arc<DatabaseConnection>,
    ) -> UserService {
        UserService::new(
            UserRepository::new(user_db),
            CopyRepository::new(copy_db),
            RedeemCodeRepository::new(code_db),
        )
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_signup_rejects_short_password() {
        let svc = service(empty_db(), empty_db(), empty_db());

        let result = svc
            .signup(CreateUserInput {
                username: "alice".to_string(),
                password: "short".to_string(),
                name: None,
                email: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_signup_rejects_taken_username() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1", "alice", "hash")]])
                .into_connection(),
        );
        let svc = service(user_db, empty_db(), empty_db());

        let result = svc
            .signup(CreateUserInput {
                username: "Alice".to_string(),
                password: "long enough password".to_string(),
                name: None,
                email: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_signin_wrong_password_is_unauthorized() {
        let hash = hash_password("the real password").unwrap();
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1", "alice", &hash)]])
                .into_connection(),
        );
        let svc = service(user_db, empty_db(), empty_db());

        let result = svc.signin("alice", "not the password").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_signin_unknown_user_is_unauthorized() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let svc = service(user_db, empty_db(), empty_db());

        let result = svc.signin("ghost", "whatever").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_signin_returns_existing_token() {
        let hash = hash_password("the real password").unwrap();
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1", "alice", &hash)]])
                .into_connection(),
        );
        let svc = service(user_db, empty_db(), empty_db());

        let user = svc.signin("alice", "the real password").await.unwrap();
        assert_eq!(user.token.as_deref(), Some("token"));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token_is_unauthorized() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let svc = service(user_db, empty_db(), empty_db());

        let result = svc.authenticate("bogus").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_invalid_email() {
        let svc = service(empty_db(), empty_db(), empty_db());

        let result = svc
            .update_profile(
                "u1",
                UpdateProfileInput {
                    email: Some("not-an-email".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_profile_sets_name() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1", "alice", "hash")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[user::Model {
                    name: Some("Alice".to_string()),
                    ..test_user("u1", "alice", "hash")
                }]])
                .into_connection(),
        );
        let svc = service(user_db, empty_db(), empty_db());

        let updated = svc
            .update_profile(
                "u1",
                UpdateProfileInput {
                    name: Some("Alice".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_activity_joins_copies_with_codes() {
        let copy_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    copy::Model {
                        id: "cp1".to_string(),
                        user_id: "u1".to_string(),
                        code_id: "c1".to_string(),
                        created_at: Utc::now().into(),
                    },
                    copy::Model {
                        id: "cp2".to_string(),
                        user_id: "u1".to_string(),
                        code_id: "deleted".to_string(),
                        created_at: Utc::now().into(),
                    },
                ]])
                .into_connection(),
        );
        let code_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_code("c1", "owner")]]) // join lookup
                .append_query_results([[test_code("c9", "u1")]]) // recent codes
                .into_connection(),
        );
        let svc = service(empty_db(), copy_db, code_db);

        let activity = svc.activity("u1").await.unwrap();

        assert_eq!(activity.recent_copies.len(), 2);
        assert!(activity.recent_copies[0].code.is_some());
        assert!(activity.recent_copies[1].code.is_none());
        assert_eq!(activity.recent_codes.len(), 1);
    }
}
