// ============================================================================
// Structure : FormState
// ============================================================================
// Les trois champs du formulaire (symboles, date de début, date de fin)
// plus le compteur de soumissions
//
// CONCEPTS RUST :
// 1. Snapshot : le pipeline reçoit une copie figée au moment du clic
// 2. Pas de validation de l'ordre des dates : start > end est une requête
//    normale qui renvoie des séries vides
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbole présélectionné au premier affichage
pub const DEFAULT_SYMBOL: &str = "TSLA";

/// Erreur de saisie d'une date
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("date invalide {value:?} (format attendu : AAAA-MM-JJ)")]
    InvalidDate { value: String },
}

/// Valeurs par défaut du formulaire (issues de la configuration)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefaults {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub earliest_date: NaiveDate,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            symbols: vec![DEFAULT_SYMBOL.to_string()],
            start_date: ymd(2018, 1, 1),
            earliest_date: ymd(2013, 1, 1),
        }
    }
}

/// Bornes des sélecteurs de dates : [earliest, today]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

/// État du formulaire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    /// Symboles sélectionnés, dans l'ordre de sélection (peut être vide)
    pub selected_symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Nombre de soumissions depuis le démarrage
    pub submit_count: u64,
}

impl FormState {
    pub fn new(selected_symbols: Vec<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            selected_symbols,
            start_date,
            end_date,
            submit_count: 0,
        }
    }

    /// État initial : symboles et date de début par défaut, fin = aujourd'hui
    pub fn initial(defaults: &FormDefaults, today: NaiveDate) -> Self {
        Self::new(defaults.symbols.clone(), defaults.start_date, today)
    }

    /// Vrai si la plage [start, end) ne contient aucun jour
    pub fn is_empty_range(&self) -> bool {
        self.start_date >= self.end_date
    }
}

/// Parse une date venant d'un sélecteur
///
/// Seuls les 10 premiers caractères sont lus : les sélecteurs peuvent
/// envoyer "2018-01-01" ou "2018-01-01T00:00:00".
pub fn parse_picker_date(value: &str) -> Result<NaiveDate, FormError> {
    let trimmed = value.trim();
    trimmed
        .get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        .ok_or_else(|| FormError::InvalidDate {
            value: value.to_string(),
        })
}

pub(crate) fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_form() {
        let today = ymd(2024, 6, 14);
        let form = FormState::initial(&FormDefaults::default(), today);

        assert_eq!(form.selected_symbols, vec!["TSLA".to_string()]);
        assert_eq!(form.start_date, ymd(2018, 1, 1));
        assert_eq!(form.end_date, today);
        assert_eq!(form.submit_count, 0);
    }

    #[test]
    fn test_parse_picker_date() {
        assert_eq!(parse_picker_date("2018-01-01"), Ok(ymd(2018, 1, 1)));
        assert_eq!(parse_picker_date("2018-01-10T00:00:00"), Ok(ymd(2018, 1, 10)));
        assert_eq!(parse_picker_date(" 2020-02-29 "), Ok(ymd(2020, 2, 29)));
    }

    #[test]
    fn test_parse_picker_date_rejects_garbage() {
        assert!(parse_picker_date("").is_err());
        assert!(parse_picker_date("2018-1-1").is_err());
        assert!(parse_picker_date("2019-02-29").is_err());
        assert!(parse_picker_date("yesterday!!").is_err());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let form = FormState::new(vec![], ymd(2018, 1, 10), ymd(2018, 1, 1));
        assert!(form.is_empty_range());

        let form = FormState::new(vec![], ymd(2018, 1, 1), ymd(2018, 1, 10));
        assert!(!form.is_empty_range());
    }
}
