// ============================================================================
// Module : web
// ============================================================================
// Interface utilisateur servie en HTTP : une page unique + une petite API JSON
// consommée par cette page.
// ============================================================================

pub mod routes; // Handlers axum

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::Dashboard;

/// Construit le routeur complet
pub fn router(dashboard: Dashboard) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/healthz", get(routes::healthz))
        .route("/api/form", get(routes::form))
        .route("/api/chart", get(routes::chart))
        .route("/api/submit", post(routes::submit))
        .layer(TraceLayer::new_for_http())
        .with_state(dashboard)
}

/// Écoute sur `addr` jusqu'à Ctrl-C
pub async fn serve(addr: SocketAddr, dashboard: Dashboard) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Échec de l'écoute sur {addr}"))?;
    info!(addr = %addr, "Dashboard listening on http://{addr}");

    axum::serve(listener, router(dashboard))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Le serveur HTTP s'est arrêté sur une erreur")
}

async fn shutdown_signal() {
    // Ctrl-C indisponible : on attend indéfiniment
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
