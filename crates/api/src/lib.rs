//! HTTP API layer for redeemly.
//!
//! - **Endpoints**: auth, redeem codes, user profile and activity
//! - **Extractors**: authenticated user
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
