// ============================================================================
// Chart - Rendu du graphique ligne
// ============================================================================
// Transforme les séries récupérées en ChartSpec : une ligne par symbole,
// x = dates, y = clôtures ajustées, légende = symbole.
//
// CONCEPT RUST : Fonction pure
// - Pas d'état caché, pas d'I/O
// - Mêmes entrées => même ChartSpec
// ============================================================================

use crate::models::{AxisValue, ChartLine, ChartSpec, SeriesResult};

/// Titre du graphique : la sélection d'origine jointe par ", "
///
/// Calculé depuis la sélection, pas depuis les séries rendues : le titre
/// reste le même si un symbole revient vide.
pub fn title_for<S: AsRef<str>>(selection: &[S]) -> String {
    selection
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Construit le graphique, une ligne par série dans l'ordre d'entrée
pub fn render(results: &[SeriesResult], title: &str) -> ChartSpec {
    let lines = results.iter().map(series_to_line).collect();

    ChartSpec {
        title: title.to_string(),
        lines,
    }
}

fn series_to_line(series: &SeriesResult) -> ChartLine {
    let (x, y) = series
        .points
        .iter()
        .map(|point| (AxisValue::Date(point.date), point.adjusted_close))
        .unzip();

    ChartLine {
        label: Some(series.symbol.clone()),
        x,
        y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::NaiveDate;

    fn series(symbol: &str, closes: &[(u32, f64)]) -> SeriesResult {
        let points = closes
            .iter()
            .map(|&(day, close)| {
                PricePoint::new(NaiveDate::from_ymd_opt(2018, 1, day).unwrap(), close)
            })
            .collect();
        SeriesResult::with_points(symbol, points)
    }

    #[test]
    fn test_title_joins_selection() {
        assert_eq!(title_for(&["TSLA", "AAPL", "MSFT"]), "TSLA, AAPL, MSFT");
        assert_eq!(title_for(&["TSLA"]), "TSLA");
        assert_eq!(title_for::<String>(&[]), "");
    }

    #[test]
    fn test_one_line_per_series_in_input_order() {
        let results = vec![
            series("AAPL", &[(2, 43.06), (3, 43.06)]),
            series("TSLA", &[(2, 320.53)]),
        ];

        let spec = render(&results, "AAPL, TSLA");

        assert_eq!(spec.title, "AAPL, TSLA");
        assert_eq!(spec.lines.len(), 2);
        assert_eq!(spec.lines[0].label.as_deref(), Some("AAPL"));
        assert_eq!(spec.lines[0].y, vec![43.06, 43.06]);
        assert_eq!(spec.lines[1].label.as_deref(), Some("TSLA"));
    }

    #[test]
    fn test_empty_series_renders_empty_line() {
        let spec = render(&[SeriesResult::new("DELISTED")], "DELISTED");

        assert_eq!(spec.lines.len(), 1);
        assert!(spec.lines[0].is_empty());
        assert_eq!(spec.title, "DELISTED");
    }

    #[test]
    fn test_render_is_pure() {
        let results = vec![series("TSLA", &[(2, 320.53), (3, 317.25)])];
        assert_eq!(render(&results, "TSLA"), render(&results, "TSLA"));
    }
}
