//! Session gate for the control panel.
//!
//! Runs before any `/control` handler. Without a live session the request is
//! answered with a redirect to the login entry point and nothing below the
//! gate executes. With one, an [`AuthContext`] is attached to the request so
//! handlers and views never resolve the session again.

use axum::extract::{Request, State};
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use crate::identity::AuthContext;

use super::request_tracing::RequestId;
use super::AppState;

/// Login URL carrying the originally requested path as `next`.
pub fn login_redirect_target(login_path: &str, original: &Uri) -> String {
    let wanted = original.path_and_query().map(|pq| pq.as_str()).unwrap_or("/control");
    format!("{}?next={}", login_path, urlencoding::encode(wanted))
}

pub async fn require_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(session) = state.lookup.lookup(req.headers()).await else {
        debug!(target: "gate", path = %req.uri().path(), "no session; redirecting to login");
        return Redirect::to(&login_redirect_target(&state.config.login_path, req.uri())).into_response();
    };
    debug!(target: "gate", path = %req.uri().path(), user = %session.principal.user_id, "session ok");
    let request_id = req.extensions().get::<RequestId>().map(|r| r.0.clone());
    let ctx = AuthContext::authenticated(session).with_request_id(request_id);
    req.extensions_mut().insert(ctx);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_target_preserves_path_and_query() {
        let uri: Uri = "/control/posts?page=2".parse().unwrap();
        assert_eq!(login_redirect_target("/login", &uri), "/login?next=%2Fcontrol%2Fposts%3Fpage%3D2");
    }
}
