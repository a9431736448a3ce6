// ============================================================================
// Pipeline de mise à jour
// ============================================================================
// Une soumission = un snapshot du formulaire -> un ChartSpec ou une erreur.
//
// Règles :
// - un fetch par symbole, séquentiel, dans l'ordre de sélection
// - premier échec : les fetchs restants sont abandonnés, rien n'est rendu
// - succès de tous : rendu complet (pas de mise à jour partielle)
// ============================================================================

use tracing::{debug, error, info, instrument};

use crate::api::{FetchError, MarketDataProvider};
use crate::chart;
use crate::models::{ChartSpec, FormState};

/// Fonction de transition du pipeline
#[instrument(skip_all, fields(symbols = ?form.selected_symbols, start = %form.start_date, end = %form.end_date))]
pub async fn update_chart(
    provider: &dyn MarketDataProvider,
    form: &FormState,
) -> Result<ChartSpec, FetchError> {
    let title = chart::title_for(&form.selected_symbols);
    let total = form.selected_symbols.len();
    let mut results = Vec::with_capacity(total);

    if form.is_empty_range() {
        debug!("Empty date range, every series will be empty");
    }

    for (i, symbol) in form.selected_symbols.iter().enumerate() {
        debug!(ticker = %symbol, progress = i + 1, total, "Fetching series");

        match provider.fetch(symbol, form.start_date, form.end_date).await {
            Ok(series) => results.push(series),
            Err(e) => {
                error!(ticker = %symbol, error = %e, remaining = total - i - 1, "Fetch failed, aborting update");
                return Err(e);
            }
        }
    }

    let spec = chart::render(&results, &title);
    info!(lines = spec.lines.len(), "Chart rendered");
    Ok(spec)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn form(symbols: &[&str], start: u32, end: u32) -> FormState {
        FormState::new(
            symbols.iter().map(|s| s.to_string()).collect(),
            day(start),
            day(end),
        )
    }

    fn provider() -> StubProvider {
        StubProvider::default()
            .with_series("TSLA", january(&[(2, 320.53), (3, 317.25), (4, 314.62), (10, 334.8)]))
            .with_series("AAPL", january(&[(2, 41.31), (3, 41.31), (4, 41.50)]))
            .with_series("MSFT", january(&[(2, 80.30), (3, 80.67)]))
    }

    #[tokio::test]
    async fn test_fetches_in_selection_order() {
        let provider = provider();
        let spec = update_chart(&provider, &form(&["MSFT", "TSLA", "AAPL"], 1, 10))
            .await
            .unwrap();

        assert_eq!(provider.calls(), vec!["MSFT", "TSLA", "AAPL"]);
        assert_eq!(spec.title, "MSFT, TSLA, AAPL");
        let labels: Vec<_> = spec.lines.iter().map(|l| l.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["MSFT", "TSLA", "AAPL"]);
    }

    #[tokio::test]
    async fn test_points_stay_inside_half_open_range() {
        let spec = update_chart(&provider(), &form(&["TSLA"], 1, 10)).await.unwrap();

        let line = spec.line("TSLA").unwrap();
        assert_eq!(line.len(), 3);
        assert!(line.dates().all(|d| d >= day(1) && d < day(10)));
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_fetches() {
        let provider = provider().failing_on("TSLA");
        let err = update_chart(&provider, &form(&["AAPL", "TSLA", "MSFT"], 1, 10))
            .await
            .unwrap_err();

        assert_eq!(err.symbol(), "TSLA");
        assert_eq!(provider.calls(), vec!["AAPL", "TSLA"]);
    }

    #[tokio::test]
    async fn test_inverted_range_gives_empty_lines() {
        let spec = update_chart(&provider(), &form(&["TSLA", "AAPL"], 10, 1))
            .await
            .unwrap();

        assert_eq!(spec.title, "TSLA, AAPL");
        assert_eq!(spec.lines.len(), 2);
        assert!(spec.lines.iter().all(|l| l.is_empty()));
    }

    #[tokio::test]
    async fn test_empty_selection() {
        let provider = provider();
        let spec = update_chart(&provider, &form(&[], 1, 10)).await.unwrap();

        assert!(provider.calls().is_empty());
        assert!(spec.lines.is_empty());
        assert_eq!(spec.title, "");
    }
}
