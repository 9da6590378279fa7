//!
//! studio HTTP server
//! ------------------
//! Axum application serving the public marketing site and the session-gated
//! control panel.
//!
//! Responsibilities:
//! - Public pages (home, about, blog, case studies).
//! - Login/logout backed by the credential store, with a cookie + CSRF token model.
//! - The session gate in front of everything under `/control`.
//! - Background sweeping of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::content::ContentStore;
use crate::identity::{AuthProvider, CookieSessionLookup, LocalAuthProvider, SessionLookup, SessionManager};
use crate::security::{self, CredentialStore};

pub mod auth;
pub mod control;
pub mod gate;
pub mod public;
pub mod request_tracing;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: SessionManager,
    pub credentials: Arc<CredentialStore>,
    /// Credentials -> session
    pub auth: Arc<dyn AuthProvider>,
    /// Request -> session
    pub lookup: Arc<dyn SessionLookup>,
    pub content: ContentStore,
}

impl AppState {
    pub fn new(config: ServerConfig, credentials: Arc<CredentialStore>, content: ContentStore) -> Self {
        let sessions = SessionManager::new(config.session_ttl);
        let auth: Arc<dyn AuthProvider> = Arc::new(LocalAuthProvider::new(credentials.clone(), sessions.clone()));
        let lookup: Arc<dyn SessionLookup> = Arc::new(CookieSessionLookup::new(sessions.clone()));
        Self { config: Arc::new(config), sessions, credentials, auth, lookup, content }
    }
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    // Everything under /control passes the session gate first, including unknown paths.
    let control = Router::new()
        .route("/", get(control::dashboard))
        .route("/session", get(control::session_info))
        .route("/users", get(control::users))
        .route("/posts", post(control::create_post))
        .route("/posts/{slug}/publish", post(control::publish_post))
        .route("/posts/{slug}/delete", post(control::delete_post))
        .fallback(control::not_found)
        .layer(from_fn_with_state(state.clone(), gate::require_session));

    // The nested wildcard does not match an empty tail, so the trailing-slash
    // form is mounted separately behind the same gate.
    let control_slash = get(control::dashboard).layer(from_fn_with_state(state.clone(), gate::require_session));

    let login_path = state.config.login_path.clone();
    Router::new()
        .route("/", get(public::home))
        .route("/about", get(public::about))
        .route("/blog", get(public::blog_index))
        .route("/blog/{slug}", get(public::blog_post))
        .route("/case-studies", get(public::case_studies))
        .route("/case-studies/{slug}", get(public::case_study))
        .route("/healthz", get(|| async { "ok" }))
        .route(&login_path, get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/control/", control_slash)
        .nest("/control", control)
        .fallback(public::not_found)
        .layer(from_fn(request_tracing::request_tracing))
        .with_state(state)
}

/// Periodically drop expired sessions. A zero interval disables the ticker.
pub fn spawn_session_sweeper(sessions: SessionManager, interval: Duration) {
    if interval.is_zero() {
        info!("session sweeper disabled");
        return;
    }
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = sessions.sweep_expired();
            if removed > 0 { tracing::debug!(removed = removed, "session_sweep"); }
        }
    });
}

fn log_startup(cfg: &ServerConfig) {
    let cwd = std::env::current_dir().ok();
    info!(
        target: "startup",
        "studio starting: cwd={:?}, bind={}, users_file={}, session_ttl_secs={}, sweep_secs={}, login_path={}, secure_cookies={}",
        cwd, cfg.socket_addr(), cfg.users_file.display(), cfg.session_ttl.as_secs(), cfg.sweep_interval.as_secs(), cfg.login_path, cfg.secure_cookies
    );
}

/// Serve the application on an already-bound listener.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Prepare the credential store and content, then serve until ctrl-c.
pub async fn run_with_config(cfg: ServerConfig) -> anyhow::Result<()> {
    log_startup(&cfg);

    security::ensure_default_admin(&cfg.users_file)
        .with_context(|| format!("While ensuring default admin in {}", cfg.users_file.display()))?;
    let credentials = Arc::new(
        CredentialStore::load(&cfg.users_file)
            .with_context(|| format!("While loading users from {}", cfg.users_file.display()))?,
    );

    let addr = cfg.socket_addr();
    let state = AppState::new(cfg, credentials, ContentStore::seeded());
    spawn_session_sweeper(state.sessions.clone(), state.config.sweep_interval);

    let listener = TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind {}", addr))?;
    info!("Starting server on {}", listener.local_addr()?);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
