// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global du dashboard
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Enum pour state machine : Idle -> Fetching -> Idle | Failed
// 3. Arc<Mutex<App>> : état partagé entre les requêtes HTTP
//
// PATTERN : "Application State"
// - Le pipeline est le seul à remplacer le graphique affiché
// - Une seule soumission en vol à la fois (single-flight)
// ============================================================================

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::{FetchError, MarketDataProvider};
use crate::catalog::SymbolCatalog;
use crate::models::{ChartSpec, FormDefaults, FormState};
use crate::pipeline;

// ============================================================================
// Enum : Phase
// ============================================================================

/// Phase du pipeline de mise à jour
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum Phase {
    /// En attente d'une soumission (état initial)
    Idle,

    /// Soumission en cours : les fetchs tournent
    Fetching,

    /// La dernière soumission a échoué ; le graphique précédent est conservé
    Failed(String),
}

/// Refus ou échec d'une soumission
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Une soumission est déjà en vol
    #[error("une mise à jour est déjà en cours")]
    Busy,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// La tâche du pipeline a paniqué ou a été annulée
    #[error("la mise à jour a été interrompue: {0}")]
    Worker(String),
}

/// État principal du dashboard
#[derive(Debug, Clone)]
pub struct App {
    /// Dernier formulaire soumis (ou l'état initial)
    pub form: FormState,

    /// Phase courante
    pub phase: Phase,

    /// Graphique affiché ; remplacé uniquement par une soumission réussie
    pub chart: ChartSpec,
}

impl App {
    /// Crée l'état initial avec le graphique placeholder
    pub fn new(form: FormState) -> Self {
        Self {
            form,
            phase: Phase::Idle,
            chart: ChartSpec::placeholder(),
        }
    }

    /// Entre en Fetching avec le snapshot du formulaire
    ///
    /// Refuse si une soumission est déjà en vol. Le compteur de soumissions
    /// est incrémenté et recopié dans le snapshot retourné.
    pub fn begin_submit(&mut self, mut snapshot: FormState) -> Result<FormState, SubmitError> {
        if self.is_fetching() {
            return Err(SubmitError::Busy);
        }

        snapshot.submit_count = self.form.submit_count + 1;
        self.form = snapshot.clone();
        self.phase = Phase::Fetching;
        Ok(snapshot)
    }

    /// Succès : remplace le graphique et repasse en Idle
    pub fn complete_submit(&mut self, chart: ChartSpec) {
        self.chart = chart;
        self.phase = Phase::Idle;
    }

    /// Échec : garde le graphique, mémorise l'erreur
    pub fn fail_submit(&mut self, message: String) {
        self.phase = Phase::Failed(message);
    }

    pub fn is_fetching(&self) -> bool {
        self.phase == Phase::Fetching
    }

    /// Message de la dernière erreur, si la dernière soumission a échoué
    pub fn last_error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn submit_count(&self) -> u64 {
        self.form.submit_count
    }
}

// ============================================================================
// Dashboard : catalogue + fournisseur + état partagé
// ============================================================================
// CONCEPT RUST : Arc pour partage entre tâches
// - Clone bon marché (incrémente un compteur)
// - Le routeur axum en garde une copie par requête
// ============================================================================

/// Point d'entrée du pipeline pour l'interface
#[derive(Clone)]
pub struct Dashboard {
    catalog: Arc<SymbolCatalog>,
    provider: Arc<dyn MarketDataProvider>,
    defaults: Arc<FormDefaults>,
    state: Arc<Mutex<App>>,
}

impl Dashboard {
    /// Construit le dashboard ; `form` est l'état initial du formulaire
    pub fn new(
        catalog: SymbolCatalog,
        provider: Arc<dyn MarketDataProvider>,
        defaults: FormDefaults,
        form: FormState,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            provider,
            defaults: Arc::new(defaults),
            state: Arc::new(Mutex::new(App::new(form))),
        }
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    pub fn defaults(&self) -> &FormDefaults {
        &self.defaults
    }

    /// Copie de l'état courant
    pub fn snapshot(&self) -> App {
        self.app().clone()
    }

    /// Exécute une soumission complète
    ///
    /// Le batch tourne dans sa propre tâche tokio, qui enregistre elle-même
    /// son résultat dans l'App : si la requête HTTP qui l'a déclenché est
    /// abandonnée, les fetchs vont quand même jusqu'au bout et la phase
    /// revient en Idle ou Failed.
    pub async fn submit(&self, snapshot: FormState) -> Result<ChartSpec, SubmitError> {
        let snapshot = {
            let mut app = self.app();
            match app.begin_submit(snapshot) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Submit rejected, an update is already in flight");
                    return Err(e);
                }
            }
        };
        info!(submit = snapshot.submit_count, symbols = ?snapshot.selected_symbols, "Submit started");

        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            let guard = FetchingGuard(Arc::clone(&state));
            let outcome = pipeline::update_chart(provider.as_ref(), &snapshot)
                .await
                .map_err(SubmitError::Fetch);
            record_outcome(&state, &outcome);
            drop(guard);
            outcome
        });

        match task.await {
            Ok(outcome) => outcome,
            // La garde a déjà remis la phase en Failed
            Err(join_error) => Err(SubmitError::Worker(join_error.to_string())),
        }
    }

    fn app(&self) -> MutexGuard<'_, App> {
        lock(&self.state)
    }
}

// Un verrou empoisonné ne contient qu'un état cohérent : on le récupère
fn lock(state: &Mutex<App>) -> MutexGuard<'_, App> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record_outcome(state: &Mutex<App>, outcome: &Result<ChartSpec, SubmitError>) {
    let mut app = lock(state);
    match outcome {
        Ok(chart) => {
            info!(lines = chart.lines.len(), "Chart replaced");
            app.complete_submit(chart.clone());
        }
        Err(e) => {
            error!(error = %e, "Submit failed, keeping previous chart");
            app.fail_submit(e.to_string());
        }
    }
}

/// Sort de Fetching si la tâche du pipeline se termine sans avoir enregistré
/// son résultat (panique, runtime arrêté)
struct FetchingGuard(Arc<Mutex<App>>);

impl Drop for FetchingGuard {
    fn drop(&mut self) {
        let mut app = lock(&self.0);
        if app.is_fetching() {
            error!("Update task ended without a result, leaving Fetching");
            app.fail_submit("la mise à jour a été interrompue".to_string());
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SymbolEntry;
    use crate::pipeline::testing::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tokio::sync::Notify;

    use crate::models::SeriesResult;

    fn form(symbols: &[&str]) -> FormState {
        FormState::new(symbols.iter().map(|s| s.to_string()).collect(), day(1), day(10))
    }

    fn dashboard(provider: StubProvider) -> Dashboard {
        let catalog = SymbolCatalog::from_entries(vec![
            SymbolEntry::new("TSLA", "Tesla"),
            SymbolEntry::new("AAPL", "Apple Inc."),
        ]);
        Dashboard::new(catalog, Arc::new(provider), FormDefaults::default(), form(&["TSLA"]))
    }

    fn stub() -> StubProvider {
        StubProvider::default()
            .with_series("TSLA", january(&[(2, 320.53), (3, 317.25)]))
            .with_series("AAPL", january(&[(2, 41.31)]))
    }

    #[test]
    fn test_app_creation() {
        let app = App::new(form(&["TSLA"]));
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.chart, ChartSpec::placeholder());
        assert_eq!(app.submit_count(), 0);
    }

    #[test]
    fn test_state_transitions() {
        let mut app = App::new(form(&["TSLA"]));

        let snapshot = app.begin_submit(form(&["AAPL"])).unwrap();
        assert_eq!(snapshot.submit_count, 1);
        assert!(app.is_fetching());
        assert!(matches!(app.begin_submit(form(&["AAPL"])), Err(SubmitError::Busy)));

        app.fail_submit("boom".to_string());
        assert_eq!(app.last_error(), Some("boom"));
        assert_eq!(app.chart, ChartSpec::placeholder());

        app.begin_submit(form(&["AAPL"])).unwrap();
        app.complete_submit(ChartSpec {
            title: "AAPL".to_string(),
            lines: vec![],
        });
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.chart.title, "AAPL");
        assert_eq!(app.submit_count(), 2);
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_value(Phase::Failed("down".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "failed", "error": "down" }));

        let json = serde_json::to_value(Phase::Idle).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "idle" }));
    }

    #[tokio::test]
    async fn test_submit_replaces_chart() {
        let dashboard = dashboard(stub());
        let chart = dashboard.submit(form(&["TSLA", "AAPL"])).await.unwrap();

        let app = dashboard.snapshot();
        assert_eq!(app.chart, chart);
        assert_eq!(app.chart.title, "TSLA, AAPL");
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.submit_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_at_any_position_keeps_previous_chart() {
        let symbols = ["TSLA", "AAPL", "MSFT"];

        for failing in symbols {
            let dashboard = dashboard(
                stub()
                    .with_series("MSFT", january(&[(2, 80.30)]))
                    .failing_on(failing),
            );
            let before = dashboard.snapshot().chart;

            let err = dashboard.submit(form(&symbols)).await.unwrap_err();
            assert!(matches!(err, SubmitError::Fetch(ref e) if e.symbol() == failing));

            let after = dashboard.snapshot();
            assert_eq!(after.chart, before);
            assert!(after.last_error().is_some());
        }
    }

    #[tokio::test]
    async fn test_successful_submit_clears_error() {
        let dashboard = dashboard(stub().failing_on("NOPE"));

        assert!(dashboard.submit(form(&["NOPE"])).await.is_err());
        assert!(dashboard.snapshot().last_error().is_some());

        dashboard.submit(form(&["TSLA"])).await.unwrap();
        let app = dashboard.snapshot();
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.submit_count(), 2);
    }

    /// Bloque chaque fetch jusqu'à ce que le test le libère
    struct GatedProvider {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl MarketDataProvider for GatedProvider {
        async fn fetch(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<SeriesResult, FetchError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(SeriesResult::new(symbol))
        }
    }

    #[tokio::test]
    async fn test_second_submit_is_rejected_while_fetching() {
        let provider = Arc::new(GatedProvider {
            started: Notify::new(),
            release: Notify::new(),
        });
        let dashboard = Dashboard::new(
            SymbolCatalog::default(),
            provider.clone(),
            FormDefaults::default(),
            form(&["TSLA"]),
        );

        let first = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move { dashboard.submit(form(&["TSLA"])).await })
        };
        provider.started.notified().await;

        let second = dashboard.submit(form(&["AAPL"])).await;
        assert!(matches!(second, Err(SubmitError::Busy)));
        assert_eq!(dashboard.snapshot().form.selected_symbols, vec!["TSLA"]);

        provider.release.notify_one();
        let chart = first.await.unwrap().unwrap();
        assert_eq!(chart.title, "TSLA");
        assert_eq!(dashboard.snapshot().submit_count(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_request_still_completes_update() {
        let provider = Arc::new(GatedProvider {
            started: Notify::new(),
            release: Notify::new(),
        });
        let dashboard = Dashboard::new(
            SymbolCatalog::default(),
            provider.clone(),
            FormDefaults::default(),
            form(&["TSLA"]),
        );

        let handler = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move { dashboard.submit(form(&["TSLA"])).await })
        };
        provider.started.notified().await;

        // Le client s'est déconnecté : le handler est abandonné en plein fetch
        handler.abort();
        assert!(handler.await.unwrap_err().is_cancelled());
        provider.release.notify_one();

        let mut waited = 0;
        while dashboard.snapshot().is_fetching() {
            assert!(waited < 100, "update never left Fetching");
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            waited += 1;
        }

        let app = dashboard.snapshot();
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.chart.title, "TSLA");

        let next = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move { dashboard.submit(form(&["AAPL"])).await })
        };
        provider.started.notified().await;
        provider.release.notify_one();

        let chart = next.await.unwrap().unwrap();
        assert_eq!(chart.title, "AAPL");
        assert_eq!(dashboard.snapshot().submit_count(), 2);
    }

    #[test]
    fn test_guard_leaves_fetching_when_task_dies() {
        let state = Arc::new(Mutex::new(App::new(form(&["TSLA"]))));
        lock(&state).begin_submit(form(&["AAPL"])).unwrap();

        drop(FetchingGuard(Arc::clone(&state)));

        let app = lock(&state);
        assert!(!app.is_fetching());
        assert!(app.last_error().is_some());
        assert_eq!(app.chart, ChartSpec::placeholder());
    }
}
