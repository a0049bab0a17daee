//! HTTP request handlers.
//!
//! Every view except login and health requires a valid session cookie
//! naming a live session; other requests are redirected to `/login`. Failures of a single
//! action (export, proposal) are shown on the page and leave the session
//! intact.

use crate::auth::{AuthOutcome, Authenticator};
use crate::pages::{Notice, Pages, ReadingView};
use crate::session::{SessionError, SessionManager, SessionStore};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Local;
use raices_domain::{
    draw_reading, select_focus, Category, DomainError, Proposal, Reading, SelectionMode, Taxonomy,
    READING_SIZE,
};
use raices_report::{share_link, FlowDiagram, ReportAssembler, ReportError, ReportRequest, SHARE_MESSAGE};
use raices_store::{Dataset, ProposalLog, ReportArchive, StoreError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Token signing and validation
    pub session_manager: Arc<SessionManager>,
    /// Per-session state
    pub sessions: Arc<SessionStore>,
    /// Credential checks
    pub authenticator: Arc<Authenticator>,
    /// Relationship dataset and its graph
    pub dataset: Arc<Dataset>,
    /// Categorizer lists
    pub taxonomy: Arc<Taxonomy>,
    /// Review log for proposed connections
    pub proposals: Arc<ProposalLog>,
    /// Exported reports
    pub reports: Arc<ReportArchive>,
    /// Report rendering
    pub assembler: Arc<ReportAssembler>,
    /// HTML views
    pub pages: Arc<Pages>,
    /// Session cookie name
    pub cookie_name: String,
    /// How focus edges are emitted
    pub selection_mode: SelectionMode,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// "healthy", or "degraded" when a reading cannot be drawn
    pub status: String,
    /// Distinct nodes in the graph
    pub nodes: usize,
    /// Undirected edges in the graph
    pub edges: usize,
    /// Root cards available for readings
    pub root_cards: usize,
}

/// Handler error
#[derive(Debug, Error)]
pub enum WebError {
    /// Session token could not be issued
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Page failed to render
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Report markup failed to render
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, self.to_string()).into_response()
    }
}

/// The logged-in visitor, taken from the session cookie
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Login name
    pub username: String,
    /// Display name
    pub name: String,
    /// Session id
    pub sid: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(&state.cookie_name) else {
            return Err(Redirect::to("/login"));
        };

        match state.session_manager.validate_token(cookie.value()) {
            Ok(claims) if !state.sessions.contains(&claims.sid) => {
                debug!(sid = %claims.sid, "Session cookie names a closed session");
                Err(Redirect::to("/login"))
            }
            Ok(claims) => Ok(CurrentUser {
                username: claims.sub,
                name: claims.name,
                sid: claims.sid,
            }),
            Err(e) => {
                debug!("Session cookie rejected: {}", e);
                Err(Redirect::to("/login"))
            }
        }
    }
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Login name
    #[serde(default)]
    pub username: String,
    /// Password
    #[serde(default)]
    pub password: String,
}

/// Circle join form
#[derive(Debug, Deserialize)]
pub struct JoinForm {
    /// Chosen card
    pub card: String,
}

/// Proposal form
#[derive(Debug, Deserialize)]
pub struct ProposalForm {
    /// Proposed source
    #[serde(default)]
    pub source: String,
    /// Proposed target
    #[serde(default)]
    pub target: String,
    /// Rationale
    #[serde(default)]
    pub descripcion: String,
}

const LOGIN_PROMPT: &str = "Por favor, ingresa tu nombre de usuario y contraseña";
const LOGIN_FAILED: &str = "Nombre de usuario o contraseña incorrectos";

fn session_cookie(name: &str, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_string(), token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// GET /login
async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Result<Response, WebError> {
    let logged_in = jar.get(&state.cookie_name).is_some_and(|c| {
        state
            .session_manager
            .validate_token(c.value())
            .is_ok_and(|claims| state.sessions.contains(&claims.sid))
    });
    if logged_in {
        return Ok(Redirect::to("/lectura").into_response());
    }

    let html = state.pages.login("", Some(&Notice::warning(LOGIN_PROMPT)))?;
    Ok(Html(html).into_response())
}

/// POST /login
async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let result = state.authenticator.login(&form.username, &form.password);

    match result.outcome {
        AuthOutcome::Success => {
            let name = result.name.unwrap_or_else(|| result.username.clone());
            let (token, claims) = state.session_manager.generate_token(&result.username, &name)?;
            state.sessions.create(&claims.sid, claims.exp);
            info!(username = %result.username, "User logged in");

            let jar = jar.add(session_cookie(&state.cookie_name, token));
            Ok((jar, Redirect::to("/lectura")).into_response())
        }
        AuthOutcome::Failure => {
            let html = state
                .pages
                .login(&result.username, Some(&Notice::error(LOGIN_FAILED)))?;
            Ok((StatusCode::UNAUTHORIZED, Html(html)).into_response())
        }
        AuthOutcome::Pending => {
            let html = state
                .pages
                .login(&result.username, Some(&Notice::warning(LOGIN_PROMPT)))?;
            Ok(Html(html).into_response())
        }
    }
}

/// POST /logout
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(&state.cookie_name) {
        if let Ok(claims) = state.session_manager.validate_token(cookie.value()) {
            state.sessions.remove(&claims.sid);
            info!(username = %claims.sub, "User logged out");
        }
    }

    let mut removal = Cookie::new(state.cookie_name.clone(), "");
    removal.set_path("/");
    (jar.remove(removal), Redirect::to("/login"))
}

/// GET /
async fn index() -> Redirect {
    Redirect::to("/lectura")
}

fn focus_diagram(state: &AppState, cards: &[String]) -> Result<String, ReportError> {
    let edges = select_focus(state.dataset.graph(), cards, state.selection_mode);
    FlowDiagram::from_edges(&edges, &state.taxonomy).to_svg()
}

fn render_reading(state: &AppState, user: &CurrentUser, notice: Option<&Notice>) -> Result<Html<String>, WebError> {
    let session = state.sessions.snapshot(&user.sid);
    let cards = session.reading.as_ref().map(Reading::cards).unwrap_or_default();
    let diagram = if cards.is_empty() {
        String::new()
    } else {
        focus_diagram(state, cards)?
    };

    let view = ReadingView {
        cards,
        diagram,
        download: session.last_report.is_some(),
    };
    Ok(Html(state.pages.reading(&user.name, &state.taxonomy, &view, notice)?))
}

/// GET /lectura
async fn reading_page(State(state): State<AppState>, user: CurrentUser) -> Result<Html<String>, WebError> {
    render_reading(&state, &user, None)
}

/// POST /lectura/tirada - draw once per session until reset
async fn draw(State(state): State<AppState>, user: CurrentUser) -> Result<Response, WebError> {
    let outcome = state.sessions.update(&user.sid, |session| -> Result<bool, DomainError> {
        if session.reading.is_some() {
            return Ok(false);
        }
        let reading = draw_reading(state.dataset.graph(), &state.taxonomy, &mut rand::rng())?;
        session.reading = Some(reading);
        Ok(true)
    });

    match outcome {
        None => Ok(Redirect::to("/login").into_response()),
        Some(Ok(drawn)) => {
            if drawn {
                info!(username = %user.username, "Reading drawn");
            }
            Ok(Redirect::to("/lectura").into_response())
        }
        Some(Err(e)) => {
            error!("Cannot draw a reading: {}", e);
            let notice = Notice::error(format!("No se pudo realizar la tirada: {}", e));
            let page = render_reading(&state, &user, Some(&notice))?;
            Ok((StatusCode::INTERNAL_SERVER_ERROR, page).into_response())
        }
    }
}

/// POST /lectura/reset
async fn reset(State(state): State<AppState>, user: CurrentUser) -> Redirect {
    match state.sessions.update(&user.sid, |session| session.reset_reading()) {
        Some(()) => Redirect::to("/lectura"),
        None => Redirect::to("/login"),
    }
}

async fn export_report(state: &AppState, user: &CurrentUser, reading: &Reading) -> Result<PathBuf, WebError> {
    let diagram = focus_diagram(state, reading.cards())?;
    let output = state.reports.allocate(&user.username)?;
    let request = ReportRequest {
        name: &user.name,
        date: Local::now().date_naive(),
        cards: reading.cards(),
        diagram,
    };

    state.assembler.export(&request, &output).await?;
    Ok(output)
}

/// POST /lectura/informe
async fn export(State(state): State<AppState>, user: CurrentUser) -> Result<Response, WebError> {
    let Some(reading) = state.sessions.snapshot(&user.sid).reading else {
        return Ok(Redirect::to("/lectura").into_response());
    };

    let notice = match export_report(&state, &user, &reading).await {
        Ok(path) => {
            let recorded = state
                .sessions
                .update(&user.sid, |session| session.last_report = Some(path));
            if recorded.is_none() {
                return Ok(Redirect::to("/login").into_response());
            }
            Notice::success("Informe generado exitosamente.")
                .with_link("📤 Enviar por WhatsApp", share_link(SHARE_MESSAGE))
        }
        Err(e) => {
            error!(username = %user.username, "Report export failed: {}", e);
            Notice::error(format!("Error al generar PDF: {}", e))
        }
    };

    Ok(render_reading(&state, &user, Some(&notice))?.into_response())
}

/// GET /circulo
async fn circle_page(State(state): State<AppState>, user: CurrentUser) -> Result<Html<String>, WebError> {
    let session = state.sessions.snapshot(&user.sid);
    let html = state.pages.circle(
        &user.name,
        state.dataset.graph().nodes(),
        &session.circle,
        &state.taxonomy,
        None,
    )?;
    Ok(Html(html))
}

/// POST /circulo
async fn circle_join(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<JoinForm>,
) -> Result<Response, WebError> {
    let graph = state.dataset.graph();
    if !graph.contains(&form.card) {
        warn!(card = %form.card, "Rejected circle entry for unknown card");
        let session = state.sessions.snapshot(&user.sid);
        let notice = Notice::error(format!("La carta «{}» no pertenece al mapa.", form.card));
        let html = state
            .pages
            .circle(&user.name, graph.nodes(), &session.circle, &state.taxonomy, Some(&notice))?;
        return Ok((StatusCode::BAD_REQUEST, Html(html)).into_response());
    }

    let joined = state
        .sessions
        .update(&user.sid, |session| session.circle.join(user.name.clone(), form.card));
    match joined {
        Some(()) => Ok(Redirect::to("/circulo").into_response()),
        None => Ok(Redirect::to("/login").into_response()),
    }
}

/// GET /propuesta
async fn proposal_page(State(state): State<AppState>, user: CurrentUser) -> Result<Html<String>, WebError> {
    let html = state
        .pages
        .proposal(&user.name, state.dataset.graph().nodes(), None)?;
    Ok(Html(html))
}

/// POST /propuesta
async fn proposal_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<ProposalForm>,
) -> Result<Response, WebError> {
    let nodes = state.dataset.graph().nodes();

    if form.source.trim().is_empty() || form.target.trim().is_empty() {
        let notice = Notice::error("Elige un origen y un destino.");
        let html = state.pages.proposal(&user.name, nodes, Some(&notice))?;
        return Ok((StatusCode::BAD_REQUEST, Html(html)).into_response());
    }

    let proposal = Proposal::new(form.source, form.target, user.username.clone(), form.descripcion);
    let log = Arc::clone(&state.proposals);
    let appended = tokio::task::spawn_blocking(move || log.append(&proposal))
        .await
        .map_err(|e| WebError::Internal(e.to_string()))?;

    let notice = match appended {
        Ok(()) => {
            info!(username = %user.username, "Proposal recorded");
            Notice::success("Propuesta enviada. Será revisada por el equipo.")
        }
        Err(e) => {
            error!(username = %user.username, "Failed to record proposal: {}", e);
            Notice::error(format!("No se pudo guardar la propuesta: {}", e))
        }
    };

    let html = state.pages.proposal(&user.name, nodes, Some(&notice))?;
    Ok(Html(html).into_response())
}

/// Last report of the session, if it is still on disk
fn last_report(state: &AppState, user: &CurrentUser) -> Option<PathBuf> {
    state
        .sessions
        .snapshot(&user.sid)
        .last_report
        .filter(|path| state.reports.owns(path) && path.exists())
}

/// GET /historial
async fn history_page(State(state): State<AppState>, user: CurrentUser) -> Result<Html<String>, WebError> {
    let report = last_report(&state, &user);
    let file_name = report
        .as_deref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned());

    Ok(Html(state.pages.history(&user.name, file_name.as_deref())?))
}

/// GET /historial/descargar
async fn download_report(State(state): State<AppState>, user: CurrentUser) -> Result<Response, WebError> {
    let path = last_report(&state, &user).ok_or_else(|| WebError::NotFound("no report generated".to_string()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "informe.pdf".to_string());

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => WebError::NotFound(file_name.clone()),
        _ => WebError::Store(StoreError::from(e)),
    })?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let graph = state.dataset.graph();
    let root_cards = graph.nodes_in(&state.taxonomy, Category::RootCard).len();

    let status = if root_cards < READING_SIZE {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthCheckResponse {
        status: status.to_string(),
        nodes: graph.len(),
        edges: graph.edge_count(),
        root_cards,
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", post(logout))
        .route("/lectura", get(reading_page))
        .route("/lectura/tirada", post(draw))
        .route("/lectura/reset", post(reset))
        .route("/lectura/informe", post(export))
        .route("/circulo", get(circle_page).post(circle_join))
        .route("/propuesta", get(proposal_page).post(proposal_submit))
        .route("/historial", get(history_page))
        .route("/historial/descargar", get(download_report))
        .route("/health", get(health_check))
        .with_state(state)
}
