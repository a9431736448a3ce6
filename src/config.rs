// ============================================================================
// Configuration
// ============================================================================
// Lue depuis l'environnement au démarrage (un fichier .env optionnel est
// chargé d'abord). Aucune variable n'est obligatoire.
//
//   STOCK_TICKER_ADDR            adresse d'écoute         (127.0.0.1:8050)
//   STOCK_TICKER_CATALOG         URL ou chemin du CSV     (liste NASDAQ)
//   STOCK_TICKER_PROVIDER_URL    base de l'API Yahoo      (query1.finance.yahoo.com)
//   STOCK_TICKER_DEFAULT_SYMBOL  symbole présélectionné   (TSLA)
//   STOCK_TICKER_DEFAULT_START   date de début par défaut (2018-01-01)
//   STOCK_TICKER_EARLIEST_DATE   date minimale des pickers (2013-01-01)
//   STOCK_TICKER_LOG_DIR         répertoire des logs      (./logs)
// ============================================================================

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::api::yahoo::DEFAULT_BASE_URL;
use crate::catalog::CatalogSource;
use crate::models::FormDefaults;

/// Liste des sociétés du NASDAQ utilisée par défaut
pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/gayatrisood2000/stock-ticker/main/NASDAQcompanylist.csv";

pub const DEFAULT_ADDR: &str = "127.0.0.1:8050";

/// Configuration complète du processus
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub catalog: CatalogSource,
    pub provider_url: String,
    pub form: FormDefaults,
    pub log_dir: PathBuf,
}

impl Config {
    /// Charge .env (s'il existe) puis lit l'environnement du processus
    pub fn from_env() -> Result<Self> {
        // .env absent : pas une erreur
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la config à partir d'une fonction de lecture de variables
    ///
    /// CONCEPT RUST : Injection de dépendance par closure
    /// - En prod : std::env::var
    /// - En test : une HashMap, sans toucher l'environnement global
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = FormDefaults::default();

        let bind_addr = get("STOCK_TICKER_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("STOCK_TICKER_ADDR n'est pas une adresse valide (ex: 127.0.0.1:8050)")?;

        let catalog = CatalogSource::parse(
            &get("STOCK_TICKER_CATALOG").unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
        );

        let provider_url =
            get("STOCK_TICKER_PROVIDER_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let symbols = match get("STOCK_TICKER_DEFAULT_SYMBOL") {
            Some(symbol) => vec![symbol.trim().to_uppercase()],
            None => defaults.symbols,
        };

        let start_date = parse_date_var(&get, "STOCK_TICKER_DEFAULT_START")?
            .unwrap_or(defaults.start_date);
        let earliest_date = parse_date_var(&get, "STOCK_TICKER_EARLIEST_DATE")?
            .unwrap_or(defaults.earliest_date);

        let log_dir = get("STOCK_TICKER_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./logs"));

        Ok(Self {
            bind_addr,
            catalog,
            provider_url,
            form: FormDefaults {
                symbols,
                start_date,
                earliest_date,
            },
            log_dir,
        })
    }
}

fn parse_date_var<G>(get: &G, key: &str) -> Result<Option<NaiveDate>>
where
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|value| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .with_context(|| format!("{key}={value:?} n'est pas une date AAAA-MM-JJ"))
        })
        .transpose()
}
