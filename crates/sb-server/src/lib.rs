//! # sb-server
//!
//! The skillbench HTTP API: assessment flow, results and recommendations,
//! account settings, the public template catalogue, and integration webhooks.
//!
//! Handlers stay thin. Scoring and benchmarking live in `sb-core`, persistence
//! in `sb-db`, identity in `sb-auth`.

pub mod cli;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use routes::{account, assessment, health, results, templates, webhooks};

pub use error::ApiError;
pub use state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/templates", get(templates::list))
        .route("/api/templates/{template_id}/score-total", get(templates::score_total))
        .layer(templates::cors());

    Router::new()
        .route("/health", get(health::health))
        .route("/api/assessment/benchmark", get(assessment::benchmark))
        .route("/api/assessment/skill-benchmark", get(assessment::skill_benchmark))
        .route("/api/assessment/filter-options", get(assessment::filter_options))
        .route("/api/assessment/overview", get(assessment::overview))
        .route("/api/assessment/save-answer", post(assessment::save_answer))
        .route("/api/assessment/submit", post(assessment::submit))
        .route("/api/assessment/start", post(assessment::start))
        .route("/api/results", get(results::results))
        .route(
            "/api/learning-paths/recommended",
            get(results::recommended_learning_paths),
        )
        .route(
            "/api/account/settings",
            get(account::get_settings).post(account::update_settings),
        )
        .route("/api/account/management", post(account::update_management))
        .route("/api/me", get(account::me))
        .route("/api/webhooks/clerk", post(webhooks::clerk::clerk_webhook))
        .route(
            "/api/webhooks/provision-admin",
            post(webhooks::partner::provision_admin),
        )
        .route("/api/webhooks/payment", post(webhooks::partner::payment))
        .route("/api/webhooks/sanity", post(webhooks::sanity::sanity_webhook))
        .merge(public)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "skillbench API listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("skillbench API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
