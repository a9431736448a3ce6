// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
// ============================================================================

pub mod chart;  // Spécification du graphique (ChartSpec)
pub mod form;   // État du formulaire (FormState)
pub mod price;  // Séries de prix (PricePoint, SeriesResult)
pub mod symbol; // Catalogue de symboles (SymbolEntry)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use stock_ticker::models::price::SeriesResult;
// On peut faire : use stock_ticker::models::SeriesResult;
pub use chart::{AxisValue, ChartLine, ChartSpec};
pub use form::{parse_picker_date, DateBounds, FormDefaults, FormError, FormState};
pub use price::{PricePoint, SeriesResult};
pub use symbol::{SymbolEntry, SymbolOption};
