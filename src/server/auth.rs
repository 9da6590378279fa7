//! Login and logout endpoints.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::identity::{LoginRequest, SESSION_COOKIE};
use crate::views;

use super::AppState;

const DEFAULT_LANDING: &str = "/control";

/// Only same-site absolute paths are honoured as post-login destinations.
/// Browsers drop tabs and newlines from URLs, so any whitespace or control
/// character disqualifies the value.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(n)
            if n.starts_with('/')
                && !n.starts_with("//")
                && !n.contains('\\')
                && !n.chars().any(|c| c.is_control() || c.is_whitespace()) =>
        {
            n.to_string()
        }
        _ => DEFAULT_LANDING.to_string(),
    }
}

pub fn session_cookie(token: &str, cfg: &ServerConfig) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        cfg.session_ttl.as_secs(),
        if cfg.secure_cookies { "; Secure" } else { "" }
    )
}

pub fn cleared_cookie(cfg: &ServerConfig) -> String {
    format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Strict; Path=/{}",
        SESSION_COOKIE,
        if cfg.secure_cookies { "; Secure" } else { "" }
    )
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
}

pub async fn login_page(State(state): State<AppState>, Query(q): Query<LoginQuery>) -> Html<String> {
    Html(views::control::login_form(&state.config.login_path, q.next.as_deref(), None))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

pub async fn login(State(state): State<AppState>, headers: HeaderMap, Form(form): Form<LoginForm>) -> Response {
    let action = state.config.login_path.clone();
    if form.username.trim().is_empty() || form.password.is_empty() {
        let page = views::control::login_form(&action, form.next.as_deref(), Some("Enter a username and password."));
        return (StatusCode::BAD_REQUEST, Html(page)).into_response();
    }

    let dest = safe_next(form.next.as_deref());
    let req = LoginRequest { username: form.username.trim().to_string(), password: form.password, ip: client_ip(&headers) };
    let provider = state.auth.clone();
    let username = req.username.clone();
    // Argon2 verification is CPU bound; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || provider.login(&req)).await;
    match outcome {
        Ok(Ok(resp)) => {
            let cookie = session_cookie(&resp.session.token, &state.config);
            ([(SET_COOKIE, cookie)], Redirect::to(&dest)).into_response()
        }
        Ok(Err(e)) => {
            warn!(target: "auth", user = %username, "login failed: {}", e);
            let page = views::control::login_form(&action, form.next.as_deref(), Some("Invalid username or password."));
            (StatusCode::UNAUTHORIZED, Html(page)).into_response()
        }
        Err(join) => AppError::internal("login_task".to_string(), join.to_string()).into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutForm {
    #[serde(default)]
    pub csrf: Option<String>,
}

impl LogoutForm {
    /// Lenient decode: an unreadable body carries no token.
    pub fn from_body(body: &[u8]) -> Self {
        serde_urlencoded::from_bytes(body).unwrap_or_default()
    }
}

/// Requires the session's CSRF token in `x-csrf-token` or the `csrf` form field.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> AppResult<Response> {
    let Some(session) = state.lookup.lookup(&headers).await else {
        // Nothing to end; just land on the login page with the cookie cleared
        return Ok(([(SET_COOKIE, cleared_cookie(&state.config))], Redirect::to(&state.config.login_path)).into_response());
    };
    let provided = headers
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .or_else(|| LogoutForm::from_body(&body).csrf);
    if provided.as_deref() != Some(session.csrf_token.as_str()) {
        return Err(AppError::csrf("invalid_csrf", "missing or invalid csrf token"));
    }
    state.sessions.logout(&session.token);
    info!(target: "auth", user = %session.principal.user_id, sid = %session.session_id, "logout");
    Ok(([(SET_COOKIE, cleared_cookie(&state.config))], Redirect::to("/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_next_rejects_offsite_targets() {
        assert_eq!(safe_next(Some("/control/users")), "/control/users");
        assert_eq!(safe_next(Some("//evil.example")), "/control");
        assert_eq!(safe_next(Some("https://evil.example")), "/control");
        assert_eq!(safe_next(Some("/\\evil.example")), "/control");
        assert_eq!(safe_next(None), "/control");
    }

    #[test]
    fn safe_next_rejects_whitespace_and_control_characters() {
        assert_eq!(safe_next(Some("/\t/evil.example")), "/control");
        assert_eq!(safe_next(Some("/control\nX")), "/control");
        assert_eq!(safe_next(Some("/control\r\nSet-Cookie: x=y")), "/control");
        assert_eq!(safe_next(Some("/ /evil.example")), "/control");
        assert_eq!(safe_next(Some("/control\u{0}")), "/control");
        assert_eq!(safe_next(Some("/blog?page=2")), "/blog?page=2");
    }

    #[test]
    fn logout_form_decodes_csrf_field() {
        assert_eq!(LogoutForm::from_body(b"a=1&csrf=x%2By+z").csrf.as_deref(), Some("x+y z"));
        assert_eq!(LogoutForm::from_body(b"a=1").csrf, None);
        assert_eq!(LogoutForm::from_body(b"").csrf, None);
    }

    #[test]
    fn cookies_honour_secure_flag() {
        let mut cfg = ServerConfig::default();
        assert!(session_cookie("t", &cfg).ends_with("; Secure"));
        cfg.secure_cookies = false;
        assert!(!session_cookie("t", &cfg).contains("Secure"));
        assert!(cleared_cookie(&cfg).starts_with("studio_session=deleted;"));
    }
}
