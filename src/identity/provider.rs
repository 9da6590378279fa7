use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::http::HeaderMap;
use tracing::info;

use crate::security::CredentialStore;

use super::authorizer::permissions_for;
use super::principal::{Attrs, Principal};
use super::session::{Session, SessionManager};

pub const SESSION_COOKIE: &str = "studio_session";

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub session: Session,
}

/// Turns credentials into a session.
pub trait AuthProvider: Send + Sync {
    fn login(&self, req: &LoginRequest) -> Result<LoginResponse>;
}

pub struct LocalAuthProvider {
    pub store: Arc<CredentialStore>,
    pub sm: SessionManager,
}

impl LocalAuthProvider {
    pub fn new(store: Arc<CredentialStore>, sm: SessionManager) -> Self { Self { store, sm } }
}

impl AuthProvider for LocalAuthProvider {
    fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        let Some(user) = self.store.authenticate(&req.username, &req.password)? else {
            return Err(anyhow!("invalid_credentials"));
        };
        let principal = Principal {
            user_id: user.username.to_lowercase(),
            permissions: permissions_for(&user.roles, &user.permissions),
            roles: user.roles.clone(),
            attrs: Attrs { display_name: user.display_name.clone(), ip: req.ip.clone() },
        };
        let session = self.sm.issue(principal)?;
        info!(target: "auth", user = %session.principal.user_id, sid = %session.session_id, "login");
        Ok(LoginResponse { session })
    }
}

/// Resolves the session for an in-flight request. Returns `None` when the
/// request carries no live session.
#[async_trait]
pub trait SessionLookup: Send + Sync {
    async fn lookup(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Reads the session cookie and validates it against a [`SessionManager`].
pub struct CookieSessionLookup {
    pub sm: SessionManager,
}

impl CookieSessionLookup {
    pub fn new(sm: SessionManager) -> Self { Self { sm } }
}

#[async_trait]
impl SessionLookup for CookieSessionLookup {
    async fn lookup(&self, headers: &HeaderMap) -> Option<Session> {
        let token = parse_cookie(headers, SESSION_COOKIE)?;
        self.sm.validate(&token)
    }
}

pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for cookie in headers.get_all(axum::http::header::COOKIE).iter() {
        let Ok(s) = cookie.to_str() else { continue; };
        for part in s.split(';') {
            let p = part.trim();
            if let Some((k, v)) = p.split_once('=') {
                if k == name && !v.is_empty() { return Some(v.to_string()); }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parse_cookie_finds_named_value() {
        let mut h = HeaderMap::new();
        h.insert("cookie", HeaderValue::from_static("theme=dark; studio_session=abc123; x=y"));
        assert_eq!(parse_cookie(&h, SESSION_COOKIE).as_deref(), Some("abc123"));
        assert_eq!(parse_cookie(&h, "missing"), None);
    }

    #[test]
    fn parse_cookie_ignores_empty_value() {
        let mut h = HeaderMap::new();
        h.insert("cookie", HeaderValue::from_static("studio_session="));
        assert_eq!(parse_cookie(&h, SESSION_COOKIE), None);
    }

    #[tokio::test]
    async fn cookie_lookup_resolves_live_sessions_only() {
        let sm = SessionManager::default();
        let s = sm.issue(Principal { user_id: "ana".into(), ..Default::default() }).unwrap();
        let lookup = CookieSessionLookup::new(sm.clone());

        let mut h = HeaderMap::new();
        assert!(lookup.lookup(&h).await.is_none());

        h.insert("cookie", HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, s.token)).unwrap());
        assert_eq!(lookup.lookup(&h).await.map(|s| s.principal.user_id).as_deref(), Some("ana"));

        sm.logout(&s.token);
        assert!(lookup.lookup(&h).await.is_none());
    }
}
