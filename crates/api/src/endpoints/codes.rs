//! Redeem code endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use redeemly_common::AppResult;
use redeemly_core::{CreateCodeInput, ListedCode, UpdateCodeInput};
use redeemly_db::entities::redeem_code;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// A code as returned to its owner.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub code: String,
    pub copy_count: i32,
    pub is_archived: bool,
    pub created_at: String,
}

impl From<redeem_code::Model> for CodeResponse {
    fn from(code: redeem_code::Model) -> Self {
        Self {
            id: code.id,
            user_id: code.user_id,
            title: code.title,
            code: code.code,
            copy_count: code.copy_count,
            is_archived: code.is_archived,
            created_at: code.created_at.to_rfc3339(),
        }
    }
}

/// Code owner in the general listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedOwnerResponse {
    pub id: String,
    pub name: String,
}

/// A code in the general listing, annotated for the calling user.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedCodeResponse {
    pub id: String,
    pub title: String,
    pub code: String,
    pub user: ListedOwnerResponse,
    pub created_at: String,
    pub copy_count: i32,
    pub has_copied: bool,
}

impl From<ListedCode> for ListedCodeResponse {
    fn from(code: ListedCode) -> Self {
        Self {
            id: code.id,
            title: code.title,
            code: code.code,
            user: ListedOwnerResponse {
                id: code.user.id,
                name: code.user.name,
            },
            created_at: code.created_at.to_rfc3339(),
            copy_count: code.copy_count,
            has_copied: code.has_copied,
        }
    }
}

/// List copyable codes.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ListedCodeResponse>>> {
    let codes = state.code_service.list(&user.id).await?;
    Ok(ApiResponse::ok(codes.into_iter().map(Into::into).collect()))
}

/// Create request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCodeRequest {
    pub title: String,
    pub code: String,
}

/// Create a new code.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCodeRequest>,
) -> AppResult<ApiResponse<CodeResponse>> {
    let created = state
        .code_service
        .create(
            &user.id,
            CreateCodeInput {
                title: req.title,
                code: req.code,
            },
        )
        .await?;

    Ok(ApiResponse::ok(created.into()))
}

/// The caller's archived codes.
async fn archived(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CodeResponse>>> {
    let codes = state.code_service.archived(&user.id).await?;
    Ok(ApiResponse::ok(codes.into_iter().map(Into::into).collect()))
}

/// All of the caller's codes.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CodeResponse>>> {
    let codes = state.code_service.mine(&user.id).await?;
    Ok(ApiResponse::ok(codes.into_iter().map(Into::into).collect()))
}

/// Stats response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub added_codes: u64,
    pub total_copies: u64,
}

/// Dashboard statistics.
async fn stats(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<StatsResponse>> {
    let stats = state.code_service.stats(&user.id).await?;
    Ok(ApiResponse::ok(StatsResponse {
        added_codes: stats.added_codes,
        total_copies: stats.total_copies,
    }))
}

/// Update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCodeRequest {
    pub title: Option<String>,
    pub code: Option<String>,
}

/// Update a code.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCodeRequest>,
) -> AppResult<ApiResponse<CodeResponse>> {
    let updated = state
        .code_service
        .update(
            &user.id,
            &id,
            UpdateCodeInput {
                title: req.title,
                code: req.code,
            },
        )
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}

/// Delete response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub id: String,
}

/// Delete a code.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeleteResponse>> {
    state.code_service.delete(&user.id, &id).await?;
    Ok(ApiResponse::ok(DeleteResponse { id }))
}

/// Message response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

/// Archive a code.
async fn archive(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.code_service.archive(&user.id, &id).await?;
    Ok(ApiResponse::ok(MessageResponse {
        message: "Code archived successfully".to_string(),
    }))
}

/// Unarchive a code.
async fn unarchive(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.code_service.unarchive(&user.id, &id).await?;
    Ok(ApiResponse::ok(MessageResponse {
        message: "Code unarchived successfully".to_string(),
    }))
}

/// Copy response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyResponse {
    pub message: String,
    pub code: String,
    pub copy_count: i32,
}

/// Copy a code.
async fn copy(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CopyResponse>> {
    let outcome = state.copy_service.copy(&user, &id).await?;

    Ok(ApiResponse::ok(CopyResponse {
        message: "Code copied successfully".to_string(),
        code: outcome.code,
        copy_count: outcome.copy_count,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/archive", get(archived))
        .route("/user", get(mine))
        .route("/stats", get(stats))
        .route("/{id}", put(update).delete(delete))
        .route("/{id}/archive", put(archive))
        .route("/{id}/unarchive", put(unarchive))
        .route("/{id}/copy", post(copy))
}
