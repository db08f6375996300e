//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use redeemly_core::{CodeService, CopyService, SuspensionService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub code_service: CodeService,
    pub copy_service: CopyService,
    pub suspension_service: SuspensionService,
}

/// Authentication middleware.
///
/// Resolves a bearer token to its user and stashes the model in request
/// extensions; handlers that require auth reject through the `AuthUser`
/// extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
