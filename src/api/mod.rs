// ============================================================================
// Module : api
// ============================================================================
// Clients des fournisseurs de données de marché. Le pipeline ne dépend que du
// trait MarketDataProvider ; YahooProvider en est l'implémentation réseau.
// ============================================================================

pub mod yahoo; // Client API Yahoo Finance

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::SeriesResult;

pub use yahoo::YahooProvider;

/// Échec du fetch d'un symbole
///
/// Chaque variante porte le symbole fautif : le pipeline abandonne la
/// soumission et l'erreur est affichée telle quelle à l'utilisateur.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{symbol}: URL du fournisseur invalide ({url})")]
    InvalidUrl { symbol: String, url: String },

    #[error("{symbol}: échec de la requête HTTP: {source}")]
    Transport {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{symbol}: le fournisseur a retourné HTTP {status}: {message}")]
    Status {
        symbol: String,
        status: u16,
        message: String,
    },

    #[error("{symbol}: erreur du fournisseur ({code}): {description}")]
    Provider {
        symbol: String,
        code: String,
        description: String,
    },

    #[error("{symbol}: réponse illisible: {message}")]
    Decode { symbol: String, message: String },
}

impl FetchError {
    /// Symbole dont le fetch a échoué
    pub fn symbol(&self) -> &str {
        match self {
            Self::InvalidUrl { symbol, .. }
            | Self::Transport { symbol, .. }
            | Self::Status { symbol, .. }
            | Self::Provider { symbol, .. }
            | Self::Decode { symbol, .. } => symbol,
        }
    }
}

/// Source de séries journalières de clôtures ajustées
///
/// CONCEPT RUST : Trait objet async
/// - #[async_trait] rend la méthode async utilisable derrière Arc<dyn ...>
/// - Send + Sync : le provider est partagé entre les tâches tokio
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Série journalière de `symbol` sur [start, end)
    ///
    /// Une plage inversée ou sans cotation donne une série vide, pas une
    /// erreur. Pas de retry, pas de cache.
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SeriesResult, FetchError>;
}
