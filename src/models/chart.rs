// ============================================================================
// Structure : ChartSpec
// ============================================================================
// Description complète du graphique affiché : un titre et une ligne par
// symbole. Reconstruite entièrement à chaque soumission.
//
// CONCEPT : Spec indépendante du toolkit
// - ChartSpec ne connaît pas Plotly
// - to_figure() la projette vers le JSON attendu par Plotly.js
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Valeur sur l'axe X : une date (séries réelles) ou un nombre (placeholder)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Date(NaiveDate),
    Number(f64),
}

/// Une ligne du graphique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLine {
    /// Légende (le symbole) ; None pour la ligne du placeholder
    pub label: Option<String>,
    pub x: Vec<AxisValue>,
    pub y: Vec<f64>,
}

impl ChartLine {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Dates de l'axe X (ignore les valeurs numériques)
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.x.iter().filter_map(|value| match value {
            AxisValue::Date(date) => Some(*date),
            AxisValue::Number(_) => None,
        })
    }
}

/// Graphique complet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub lines: Vec<ChartLine>,
}

impl ChartSpec {
    /// Graphique affiché avant la première soumission
    pub fn placeholder() -> Self {
        Self {
            title: "Default Value".to_string(),
            lines: vec![ChartLine {
                label: None,
                x: vec![AxisValue::Number(1.0), AxisValue::Number(2.0)],
                y: vec![3.0, 1.0],
            }],
        }
    }

    /// Ligne associée à un symbole
    pub fn line(&self, label: &str) -> Option<&ChartLine> {
        self.lines
            .iter()
            .find(|line| line.label.as_deref() == Some(label))
    }

    /// Projette la spec vers une figure Plotly
    ///
    /// Format :
    /// { "data": [{ "x": [...], "y": [...], "mode": "lines", "name": "TSLA" }],
    ///   "layout": { "title": { "text": "TSLA, AAPL" } } }
    pub fn to_figure(&self) -> Value {
        let data: Vec<Value> = self
            .lines
            .iter()
            .map(|line| {
                let mut trace = json!({
                    "type": "scatter",
                    "mode": "lines",
                    "x": line.x,
                    "y": line.y,
                });
                if let Some(label) = &line.label {
                    trace["name"] = json!(label);
                }
                trace
            })
            .collect();

        json!({
            "data": data,
            "layout": { "title": { "text": self.title } },
        })
    }
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_figure() {
        let figure = ChartSpec::placeholder().to_figure();

        assert_eq!(figure["layout"]["title"]["text"], "Default Value");
        assert_eq!(figure["data"][0]["x"], json!([1.0, 2.0]));
        assert_eq!(figure["data"][0]["y"], json!([3.0, 1.0]));
        assert_eq!(figure["data"][0]["mode"], "lines");
        assert!(figure["data"][0].get("name").is_none());
    }

    #[test]
    fn test_dates_serialize_as_iso_strings() {
        let date = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
        let spec = ChartSpec {
            title: "TSLA".to_string(),
            lines: vec![ChartLine {
                label: Some("TSLA".to_string()),
                x: vec![AxisValue::Date(date)],
                y: vec![320.53],
            }],
        };

        let figure = spec.to_figure();
        assert_eq!(figure["data"][0]["x"], json!(["2018-01-02"]));
        assert_eq!(figure["data"][0]["name"], "TSLA");
        assert_eq!(spec.line("TSLA").map(|l| l.dates().count()), Some(1));
    }
}
