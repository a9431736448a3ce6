// ============================================================================
// API Client : Yahoo Finance
// ============================================================================
// Récupère l'historique journalier des clôtures ajustées d'un symbole
//
// CONCEPTS RUST :
// 1. async/await : un appel réseau par symbole, sans bloquer le runtime
// 2. Serde : désérialisation du JSON "chart" de Yahoo
// 3. Erreurs typées : FetchError porte le symbole fautif
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::{FetchError, MarketDataProvider};
use crate::models::{PricePoint, SeriesResult};

/// URL publique de l'API chart de Yahoo Finance
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

// User-Agent navigateur pour éviter le blocage par Yahoo
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Structures pour parser la réponse JSON de Yahoo Finance
// ============================================================================
// Seuls les champs utiles sont déclarés ; tout est optionnel car Yahoo omet
// "timestamp" et "adjclose" quand la plage ne contient aucune cotation.
// ============================================================================

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Meta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

/// Métadonnées du ticker
#[derive(Debug, Default, Deserialize)]
struct Meta {
    /// Décalage de la bourse par rapport à UTC, en secondes
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

// ============================================================================
// YahooProvider
// ============================================================================

/// Fournisseur Yahoo Finance (un client HTTP réutilisé pour tous les appels)
#[derive(Debug, Clone)]
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    /// Crée un fournisseur pointant sur `base_url` (ex: DEFAULT_BASE_URL)
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SeriesResult, FetchError> {
        // [start, end) vide : rien à demander
        if start >= end {
            debug!("Empty date range, no request sent");
            return Ok(SeriesResult::new(symbol));
        }

        let url = build_chart_url(&self.base_url, symbol, start, end).ok_or_else(|| {
            FetchError::InvalidUrl {
                symbol: symbol.to_string(),
                url: self.base_url.clone(),
            }
        })?;
        debug!(url = %url, "Built Yahoo Finance chart URL");

        let transport = |source: reqwest::Error| FetchError::Transport {
            symbol: symbol.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            error!(status = %status, "Yahoo Finance returned error status");

            // Yahoo renvoie un chart.error explicite avec ses 404
            if let Ok(YahooResponse {
                chart: Chart {
                    error: Some(err), ..
                },
            }) = serde_json::from_str::<YahooResponse>(&body)
            {
                return Err(provider_error(symbol, err));
            }

            return Err(FetchError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let yahoo_response: YahooResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode {
                symbol: symbol.to_string(),
                message: e.to_string(),
            })?;

        let series = parse_chart_response(yahoo_response, symbol, start, end)?;
        info!(points = series.len(), span = ?series.date_span(), "Fetched adjusted close series");
        Ok(series)
    }
}

/// Construit l'URL de l'API chart
///
/// period1/period2 = minuit UTC des dates de début et de fin ; Yahoo traite
/// period2 comme exclusif, ce qui donne la plage [start, end).
fn build_chart_url(base_url: &str, symbol: &str, start: NaiveDate, end: NaiveDate) -> Option<Url> {
    let mut url = Url::parse(base_url).ok()?;

    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(["v8", "finance", "chart", symbol]);

    url.query_pairs_mut()
        .append_pair("period1", &midnight_timestamp(start).to_string())
        .append_pair("period2", &midnight_timestamp(end).to_string())
        .append_pair("interval", "1d")
        .append_pair("includeAdjustedClose", "true")
        .append_pair("events", "div,splits");

    Some(url)
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn provider_error(symbol: &str, err: ChartError) -> FetchError {
    FetchError::Provider {
        symbol: symbol.to_string(),
        code: err.code,
        description: err.description,
    }
}

/// Convertit la réponse Yahoo en SeriesResult
///
/// - chart.error présent : erreur du fournisseur
/// - pas de résultat ou pas de timestamps : série vide
/// - clôture ajustée nulle : point ignoré
/// - date hors de [start, end) : point ignoré
fn parse_chart_response(
    yahoo_response: YahooResponse,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SeriesResult, FetchError> {
    if let Some(err) = yahoo_response.chart.error {
        return Err(provider_error(symbol, err));
    }

    let mut series = SeriesResult::new(symbol);

    let Some(result) = yahoo_response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
    else {
        warn!("Yahoo returned no chart result, using an empty series");
        return Ok(series);
    };

    let offset = result.meta.gmtoffset;
    let mut indicators = result.indicators;

    let closes = match indicators.adjclose.pop() {
        Some(adj) => adj.adjclose,
        None if result.timestamp.is_empty() => Vec::new(),
        None => {
            warn!("No adjusted close in response, falling back to close");
            indicators
                .quote
                .into_iter()
                .next()
                .map(|quote| quote.close)
                .unwrap_or_default()
        }
    };

    let mut skipped = 0;
    let mut out_of_range = 0;

    for (i, &timestamp) in result.timestamp.iter().enumerate() {
        let Some(adjusted_close) = closes.get(i).copied().flatten() else {
            skipped += 1;
            continue;
        };

        let date = timestamp
            .checked_add(offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .ok_or_else(|| FetchError::Decode {
                symbol: symbol.to_string(),
                message: format!("timestamp invalide {timestamp}"),
            })?
            .date_naive();

        if date < start || date >= end {
            out_of_range += 1;
            continue;
        }

        series.push(PricePoint::new(date, adjusted_close));
    }

    if skipped > 0 {
        warn!(
            skipped,
            total = result.timestamp.len(),
            "Skipped rows with missing adjusted close"
        );
    }

    debug!(
        parsed = series.len(),
        total = result.timestamp.len(),
        skipped,
        out_of_range,
        "Finished parsing chart response"
    );

    Ok(series)
}

// ============================================================================
// Tests unitaires
// ============================================================================
