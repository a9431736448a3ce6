// ============================================================================
// Stock Ticker Dashboard - Point d'entrée
// ============================================================================
// 1. Logging (stdout + fichier avec rotation quotidienne)
// 2. Configuration (environnement, .env optionnel)
// 3. Catalogue de symboles : un échec arrête le démarrage, aucune UI servie
// 4. Serveur web local
// ============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use stock_ticker::api::YahooProvider;
use stock_ticker::app::Dashboard;
use stock_ticker::catalog::SymbolCatalog;
use stock_ticker::config::Config;
use stock_ticker::models::FormState;
use stock_ticker::web;

// ============================================================================
// Initialisation du logging
// ============================================================================

/// Initialise le système de logging
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - Layer stdout : lisible dans le terminal qui lance le serveur
/// - Layer fichier : RollingFileAppender, rotation quotidienne
/// - EnvFilter : filtre par niveau (RUST_LOG env var)
///
/// # Utilisation
/// ```bash
/// tail -f logs/stock-ticker.log
/// RUST_LOG=stock_ticker=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = &config.log_dir;
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(env_filter());

    // Sans répertoire de logs, on garde au moins la sortie terminal
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        registry
            .try_init()
            .context("Échec de l'installation du subscriber tracing")?;
        warn!(?log_dir, error = %e, "Cannot create log directory, logging to stdout only");
        return Ok(());
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "stock-ticker.log");

    registry
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .try_init()
        .context("Échec de l'installation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stock_ticker=debug,info".into())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Sans logs on continue quand même
    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without file logging...");
    });

    info!(addr = %config.bind_addr, catalog = %config.catalog, "Stock Ticker Dashboard starting up");

    // Le catalogue doit être chargé avant d'ouvrir le port
    let catalog = match SymbolCatalog::load(&config.catalog).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "Failed to load symbol catalog, aborting startup");
            return Err(e).context("Impossible de charger le catalogue de symboles");
        }
    };

    let provider = YahooProvider::new(config.provider_url.clone())
        .context("Échec de la création du client HTTP")?;
    info!(provider = %provider.base_url(), "Market data provider ready");

    let today = chrono::Local::now().date_naive();
    let form = FormState::initial(&config.form, today);
    let dashboard = Dashboard::new(catalog, Arc::new(provider), config.form.clone(), form);

    let result = web::serve(config.bind_addr, dashboard).await;

    match &result {
        Ok(_) => info!("Server exited normally"),
        Err(e) => error!(error = ?e, "Server exited with error"),
    }

    result
}
