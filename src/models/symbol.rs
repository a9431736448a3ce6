// ============================================================================
// Structure : SymbolEntry
// ============================================================================
// Une ligne du catalogue de symboles : ticker -> nom de la société
//
// CONCEPTS RUST :
// 1. Données immuables : chargées au démarrage, jamais modifiées ensuite
// 2. Serialize : exposées telles quelles à l'interface web
// ============================================================================

use serde::{Deserialize, Serialize};

/// Un symbole boursier du catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    /// Symbole du ticker (clé unique, ex: "TSLA")
    pub symbol: String,

    /// Nom de la société (ex: "Tesla, Inc.")
    pub company_name: String,
}

impl SymbolEntry {
    pub fn new(symbol: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: company_name.into(),
        }
    }

    /// Construit l'option du sélecteur multiple
    ///
    /// Format du label : "<Nom> <Symbole>", ex: "Tesla, Inc. TSLA"
    pub fn to_option(&self) -> SymbolOption {
        SymbolOption {
            label: format!("{} {}", self.company_name, self.symbol),
            value: self.symbol.clone(),
        }
    }
}

/// Option sélectionnable dans l'interface (label affiché, valeur soumise)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolOption {
    pub label: String,
    pub value: String,
}
