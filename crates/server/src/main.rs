//! Redeemly server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use redeemly_api::{middleware::AppState, router as api_router};
use redeemly_common::Config;
use redeemly_core::{CodeService, CopyService, SuspensionService, UserService};
use redeemly_db::repositories::{
    CopyRepository, MisuseLogRepository, RedeemCodeRepository, SuspensionRepository,
    UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redeemly=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting redeemly server...");

    let config = Config::load()?;

    let db = redeemly_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    redeemly_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let code_repo = RedeemCodeRepository::new(Arc::clone(&db));
    let copy_repo = CopyRepository::new(Arc::clone(&db));
    let suspension_repo = SuspensionRepository::new(Arc::clone(&db));
    let misuse_log_repo = MisuseLogRepository::new(Arc::clone(&db));

    let user_service = UserService::new(user_repo.clone(), copy_repo.clone(), code_repo.clone());
    let code_service = CodeService::new(code_repo.clone(), copy_repo.clone(), user_repo.clone());
    let suspension_service = SuspensionService::new(user_repo, suspension_repo, misuse_log_repo);
    let copy_service = CopyService::new(copy_repo, code_repo, suspension_service.clone());

    let state = AppState {
        user_service,
        code_service,
        copy_service,
        suspension_service,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            redeemly_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
