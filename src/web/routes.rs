// ============================================================================
// Routes HTTP
// ============================================================================
// Handlers axum : la page, les options du formulaire, le graphique courant et
// la soumission. Les handlers ne font que traduire HTTP <-> Dashboard.
// ============================================================================

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::app::{App, Dashboard, Phase, SubmitError};
use crate::models::{parse_picker_date, DateBounds, FormError, FormState, SymbolOption};

const DASHBOARD_PAGE: &str = include_str!("dashboard.html");

// ============================================================================
// Corps de requête / réponse
// ============================================================================

/// Contenu de GET /api/form
#[derive(Debug, Serialize, Deserialize)]
pub struct FormResponse {
    pub options: Vec<SymbolOption>,
    pub defaults: FormState,
    pub bounds: DateBounds,
}

/// Corps de POST /api/submit (dates au format des pickers)
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub symbols: Vec<String>,
    pub start_date: String,
    pub end_date: String,
}

impl SubmitRequest {
    /// Snapshot du formulaire ; le compteur est attribué par l'App
    pub fn into_form(self) -> Result<FormState, FormError> {
        let start = parse_picker_date(&self.start_date)?;
        let end = parse_picker_date(&self.end_date)?;
        Ok(FormState::new(self.symbols, start, end))
    }
}

/// État affiché : phase, compteur, figure Plotly
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub phase: Phase,
    pub error: Option<String>,
    pub submit_count: u64,
    pub figure: Value,
}

impl ChartResponse {
    fn from_app(app: &App) -> Self {
        Self {
            phase: app.phase.clone(),
            error: app.last_error().map(str::to_string),
            submit_count: app.submit_count(),
            figure: app.chart.to_figure(),
        }
    }

    fn with_error(mut self, message: String) -> Self {
        self.error = Some(message);
        self
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn index() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// Options et valeurs par défaut ; "aujourd'hui" = moment de la requête
pub async fn form(State(dashboard): State<Dashboard>) -> Json<FormResponse> {
    let today = today();
    let defaults = dashboard.defaults();

    Json(FormResponse {
        options: dashboard.catalog().options(),
        defaults: FormState::initial(defaults, today),
        bounds: DateBounds {
            earliest: defaults.earliest_date,
            latest: today,
        },
    })
}

pub async fn chart(State(dashboard): State<Dashboard>) -> Json<ChartResponse> {
    Json(ChartResponse::from_app(&dashboard.snapshot()))
}

/// Lance une soumission
///
/// - 200 : nouveau graphique
/// - 400 : date illisible, rien n'est lancé
/// - 409 : une soumission est déjà en vol
/// - 502 : un fetch a échoué, graphique inchangé
/// - 500 : la tâche du pipeline a été interrompue
pub async fn submit(
    State(dashboard): State<Dashboard>,
    Json(request): Json<SubmitRequest>,
) -> Response {
    debug!(symbols = ?request.symbols, start = %request.start_date, end = %request.end_date, "Submit received");

    let snapshot = match request.into_form() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "Rejected submit with malformed date");
            let body = ChartResponse::from_app(&dashboard.snapshot()).with_error(e.to_string());
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let result = dashboard.submit(snapshot).await;
    let body = ChartResponse::from_app(&dashboard.snapshot());

    match result {
        Ok(_) => {
            info!(submit = body.submit_count, "Submit completed");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e @ SubmitError::Busy) => {
            (StatusCode::CONFLICT, Json(body.with_error(e.to_string()))).into_response()
        }
        Err(SubmitError::Fetch(_)) => (StatusCode::BAD_GATEWAY, Json(body)).into_response(),
        Err(SubmitError::Worker(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
