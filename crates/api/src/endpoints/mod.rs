//! API endpoints.

mod auth;
mod codes;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/codes", codes::router())
        .nest("/users", users::router())
}
