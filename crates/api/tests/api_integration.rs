//! API integration tests.
//!
//! Router-level tests over a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use redeemly_api::{middleware::AppState, router as api_router};
use redeemly_core::{CodeService, CopyService, SuspensionService, UserService};
use redeemly_db::repositories::{
    CopyRepository, MisuseLogRepository, RedeemCodeRepository, SuspensionRepository,
    UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

/// Create a mock database connection.
fn create_mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

/// Create test app state with a mock database.
fn create_test_state() -> AppState {
    let db = Arc::new(create_mock_db());

    let user_repo = UserRepository::new(Arc::clone(&db));
    let code_repo = RedeemCodeRepository::new(Arc::clone(&db));
    let copy_repo = CopyRepository::new(Arc::clone(&db));
    let suspension_repo = SuspensionRepository::new(Arc::clone(&db));
    let misuse_log_repo = MisuseLogRepository::new(Arc::clone(&db));

    let user_service = UserService::new(user_repo.clone(), copy_repo.clone(), code_repo.clone());
    let code_service = CodeService::new(code_repo.clone(), copy_repo.clone(), user_repo.clone());
    let suspension_service =
        SuspensionService::new(user_repo, suspension_repo, misuse_log_repo);
    let copy_service = CopyService::new(copy_repo, code_repo, suspension_service.clone());

    AppState {
        user_service,
        code_service,
        copy_service,
        suspension_service,
    }
}

/// Create the test router with auth middleware, as the server wires it.
fn create_test_router() -> Router {
    let state = create_test_state();
    api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            redeemly_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

#[tokio::test]
async fn test_codes_listing_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/codes")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_copy_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/codes/abc/copy")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_suspension_status_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/suspension")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bogus_bearer_token_is_rejected() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/codes")
                .method("GET")
                .header("Authorization", "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The mock DB yields no user for the token, so the extractor rejects.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_with_invalid_json_returns_error() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/signup")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_signup_with_short_password_is_rejected() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/signup")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"username":"alice","password":"short"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signin_unknown_user_is_unauthorized() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/signin")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"username":"nonexistent","password":"wrongpassword"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    // The mock DB returns no rows for the username lookup.
    let status = response.status();
    assert!(status == StatusCode::UNAUTHORIZED || status == StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
