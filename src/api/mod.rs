//! HTTP layer exposing extraction, detection and the form page.

pub mod routes;
pub mod types;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{config::Settings, nlp::NerContext, scrape::ContentExtractor};

#[derive(Clone)]
pub struct AppState {
    pub ner: Arc<NerContext>,
    pub extractor: Arc<ContentExtractor>,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            ner: Arc::new(NerContext::from_settings(settings)?),
            extractor: Arc::new(ContentExtractor::from_settings(settings)?),
        })
    }
}

/// All routes, ready to be served or driven directly in tests.
pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(routes::health))
        .route("/api/extract", post(routes::extract))
        .route("/api/detect", post(routes::detect));

    #[cfg(feature = "askama")]
    let router = router.route("/", get(crate::ui::index).post(crate::ui::submit));

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until ctrl-c.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "serving berita-ner");
    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
