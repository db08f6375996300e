//! User profile, activity and suspension endpoints.

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use redeemly_common::AppResult;
use redeemly_core::UpdateProfileInput;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::codes::CodeResponse, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Suspension status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionStatusResponse {
    pub is_suspended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Current suspension status for the caller.
async fn suspension(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SuspensionStatusResponse>> {
    let status = state.suspension_service.status(&user.id).await?;

    Ok(ApiResponse::ok(SuspensionStatusResponse {
        is_suspended: status.is_suspended,
        suspended_until: status.suspended_until.map(|t| t.to_rfc3339()),
        reason: status.reason,
    }))
}

/// Profile update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Update the caller's profile.
async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let updated = state
        .user_service
        .update_profile(
            &user.id,
            UpdateProfileInput {
                name: req.name,
                email: req.email,
                password: req.password,
            },
        )
        .await?;

    Ok(ApiResponse::ok(ProfileResponse {
        id: updated.id,
        name: updated.name,
        email: updated.email,
    }))
}

/// A recent copy joined with its code.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCopyResponse {
    pub id: String,
    pub copied_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeResponse>,
}

/// Activity response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub recent_copies: Vec<RecentCopyResponse>,
    pub recent_codes: Vec<CodeResponse>,
}

/// The caller's recent copies and added codes.
async fn activity(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ActivityResponse>> {
    let activity = state.user_service.activity(&user.id).await?;

    Ok(ApiResponse::ok(ActivityResponse {
        recent_copies: activity
            .recent_copies
            .into_iter()
            .map(|c| RecentCopyResponse {
                id: c.id,
                copied_at: c.copied_at.to_rfc3339(),
                code: c.code.map(Into::into),
            })
            .collect(),
        recent_codes: activity.recent_codes.into_iter().map(Into::into).collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/suspension", get(suspension))
        .route("/profile", put(update_profile))
        .route("/activity", get(activity))
}
