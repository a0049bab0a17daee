//! Raíces del Ser Web
//!
//! Login-gated HTML views over the symbolic card network: personal readings
//! with a flow diagram and PDF export, the circle of presences, connection
//! proposals and the report history.

#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod handlers;
pub mod pages;
pub mod session;

use auth::Authenticator;
use config::AppConfig;
use handlers::{create_router, AppState};
use pages::Pages;
use raices_report::{CommandPdfRenderer, PdfRenderer, ReportAssembler, ReportTemplate};
use raices_store::{load_taxonomy, Dataset, ProposalLog, ReportArchive, RetentionWorker};
use session::{SessionManager, SessionStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Dataset, taxonomy or storage error
    #[error("Storage error: {0}")]
    Store(#[from] raices_store::StoreError),

    /// Report template error
    #[error("Report error: {0}")]
    Report(#[from] raices_report::ReportError),

    /// Page template error
    #[error("Page template error: {0}")]
    Pages(#[from] minijinja::Error),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Load everything the handlers need
///
/// Dataset and taxonomy are read here once; a missing or malformed dataset
/// fails startup.
pub fn build_state(config: &AppConfig, renderer: Arc<dyn PdfRenderer>) -> Result<AppState, ServerError> {
    let dataset = Dataset::load(&config.dataset_path)?;
    let taxonomy = load_taxonomy(config.taxonomy_path.as_deref())?;
    let template = ReportTemplate::load(config.template_path.as_deref())?;

    Ok(AppState {
        session_manager: Arc::new(SessionManager::new(
            &config.cookie.key,
            config.session_expiry_secs(),
        )),
        sessions: Arc::new(SessionStore::new()),
        authenticator: Arc::new(Authenticator::new(&config.credentials)),
        dataset: Arc::new(dataset),
        taxonomy: Arc::new(taxonomy),
        proposals: Arc::new(ProposalLog::new(config.proposals_path.clone())),
        reports: Arc::new(ReportArchive::new(
            config.reports_dir.clone(),
            config.retention.clone(),
        )),
        assembler: Arc::new(ReportAssembler::new(
            template,
            renderer,
            config.affirmations.clone(),
        )),
        pages: Arc::new(Pages::new()?),
        cookie_name: config.cookie.name.clone(),
        selection_mode: config.selection_mode,
    })
}

/// Start the HTTP server
///
/// Builds the application state, spawns the report retention worker and
/// serves until the listener fails.
pub async fn start_server(config: AppConfig) -> Result<(), ServerError> {
    info!("Starting Raíces del Ser");
    info!("Bind address: {}", config.bind_addr());
    info!("Session expiry: {} days", config.cookie.expiry_days);
    info!("Registered users: {}", config.credentials.usernames.len());

    let renderer = Arc::new(CommandPdfRenderer::new(config.pdf.clone()));
    let state = build_state(&config, renderer)?;
    info!(
        nodes = state.dataset.graph().len(),
        edges = state.dataset.graph().edge_count(),
        "Graph ready"
    );

    let mut worker = RetentionWorker::new(state.reports.as_ref().clone());
    tokio::spawn(async move { worker.run().await });

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
