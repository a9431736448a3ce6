// ============================================================================
// Catalogue de symboles
// ============================================================================
// Charge une seule fois, au démarrage, la table Symbol -> Name et construit
// la liste des options du sélecteur. Lecture seule ensuite.
//
// CONCEPTS RUST :
// 1. thiserror : erreurs typées, une variante par cause d'échec
// 2. csv::ReaderBuilder : lecture tolérante (colonnes en plus, espaces)
// 3. Injection : le catalogue est passé au Dashboard, pas de global
// ============================================================================

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::models::{SymbolEntry, SymbolOption};

/// Erreur de chargement du catalogue (arrête le démarrage)
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalogue injoignable ({url}): {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("le catalogue {url} a retourné HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("lecture du catalogue {path} impossible: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV du catalogue invalide: {0}")]
    Csv(#[from] csv::Error),

    #[error("colonne {0:?} absente du catalogue")]
    MissingColumn(&'static str),

    #[error("ligne {line} du catalogue sans symbole")]
    EmptyRow { line: u64 },

    #[error("le catalogue ne contient aucun symbole")]
    Empty,
}

/// Origine du fichier catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Url(String),
    File(PathBuf),
}

impl CatalogSource {
    /// "http://..." ou "https://..." -> Url, tout le reste -> File
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Catalogue chargé : entrées dans l'ordre du fichier
#[derive(Debug, Clone, Default)]
pub struct SymbolCatalog {
    entries: Vec<SymbolEntry>,
}

impl SymbolCatalog {
    /// Construit un catalogue à partir d'entrées déjà connues (fixtures)
    pub fn from_entries(entries: Vec<SymbolEntry>) -> Self {
        Self { entries }
    }

    /// Charge le catalogue depuis sa source
    #[instrument(skip_all, fields(source = %source))]
    pub async fn load(source: &CatalogSource) -> Result<Self, CatalogError> {
        let text = match source {
            CatalogSource::Url(url) => fetch_text(url).await?,
            CatalogSource::File(path) => read_text(path).await?,
        };

        let catalog = Self::from_csv(&text)?;
        info!(symbols = catalog.len(), "Symbol catalog loaded");
        Ok(catalog)
    }

    /// Parse le CSV (en-têtes obligatoires : Symbol, Name)
    pub fn from_csv(text: &str) -> Result<Self, CatalogError> {
        let text = text.trim_start_matches('\u{feff}');

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or(CatalogError::MissingColumn(name))
        };
        let symbol_col = column("Symbol")?;
        let name_col = column("Name")?;

        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let symbol = record.get(symbol_col).unwrap_or_default();
            if symbol.is_empty() {
                return Err(CatalogError::EmptyRow { line });
            }
            let name = record.get(name_col).unwrap_or_default();

            // Le symbole est la clé : la première ligne gagne
            if !seen.insert(symbol.to_string()) {
                warn!(ticker = %symbol, line, "Duplicate symbol in catalog, keeping first row");
                continue;
            }

            entries.push(SymbolEntry::new(symbol, name));
        }

        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        debug!(symbols = entries.len(), "Parsed symbol catalog");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    /// Options du sélecteur, dans l'ordre du fichier
    pub fn options(&self) -> Vec<SymbolOption> {
        self.entries.iter().map(SymbolEntry::to_option).collect()
    }

    /// Nom de la société pour un symbole
    pub fn get(&self, symbol: &str) -> Option<&SymbolEntry> {
        self.entries.iter().find(|entry| entry.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

async fn fetch_text(url: &str) -> Result<String, CatalogError> {
    debug!(url, "Downloading symbol catalog");
    let unreachable = |source: reqwest::Error| CatalogError::Unreachable {
        url: url.to_string(),
        source,
    };

    let response = reqwest::get(url).await.map_err(unreachable)?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(unreachable)
}

async fn read_text(path: &Path) -> Result<String, CatalogError> {
    debug!(path = %path.display(), "Reading symbol catalog");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })
}
