use aggate_core::config::MerchantCredential;
use aggate_server::middleware::SignatureGateLayer;
use aggate_server::routes;
use anyhow::Context;
use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct VersionResponse {
    version: &'static str,
    name: &'static str,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn version() -> impl IntoResponse {
    Json(VersionResponse {
        version: aggate_core::VERSION,
        name: "aggated",
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aggate_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let credential =
        MerchantCredential::from_env().context("failed to load merchant credential")?;

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
        .route("/callback/agGame", post(routes::callback::handle_ag_callback))
        .layer(SignatureGateLayer::new(credential))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("aggated listening on http://0.0.0.0:8080");

    axum::serve(listener, app).await?;
    Ok(())
}
