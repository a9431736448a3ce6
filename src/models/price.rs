// ============================================================================
// Structures : PricePoint et SeriesResult
// ============================================================================
// Série journalière de clôtures ajustées pour un symbole
//
// CONCEPTS RUST :
// 1. NaiveDate : date calendaire sans fuseau (les séries sont journalières)
// 2. f64 : précision suffisante pour des prix
// 3. Données transitoires : produites par le fetch, jetées après le rendu
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Un point de la série : date et clôture ajustée
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adjusted_close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, adjusted_close: f64) -> Self {
        Self {
            date,
            adjusted_close,
        }
    }
}

/// Résultat d'un fetch pour un symbole
///
/// Les points sont ordonnés par date croissante, dans l'ordre du fournisseur.
/// Une série vide n'est pas une erreur (plage inversée, période sans cotation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl SeriesResult {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    pub fn with_points(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn push(&mut self, point: PricePoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Première et dernière date de la série
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((first.date, last.date))
    }
}
