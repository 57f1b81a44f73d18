// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::session::{DashboardSession, SessionCommand, SessionHandle};
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_source::HttpSnapshotSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    blur, current_display, cycle_layout, cycle_metric, focus, health_check, stream_display,
};
use crate::presentation::render_sink::WatchSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let settings = app_config.session_settings()?;
    let addr = app_config.bind_addr()?;

    // Data source and render sink (infrastructure / presentation)
    let source = Arc::new(HttpSnapshotSource::new(app_config.source.url.clone()));
    let (sink, frames) = WatchSink::new();

    // Dashboard session (application layer)
    let (handle, commands) = SessionHandle::channel();
    let session = DashboardSession::new(source, Arc::new(sink), settings);
    let session_task = tokio::spawn(session.run(commands));

    let state = Arc::new(AppState {
        session: handle.clone(),
        frames,
    });

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/display", get(current_display))
        .route("/display/stream", get(stream_display))
        .route("/cycle/metric", post(cycle_metric))
        .route("/cycle/layout", post(cycle_layout))
        .route("/focus", post(focus))
        .route("/blur", post(blur))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(
        "Starting solar-dashboard on {} (source {})",
        addr,
        app_config.source.url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let _ = handle.send(SessionCommand::Shutdown).await;
    session_task.await?;

    Ok(())
}
