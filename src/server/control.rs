//! Control panel handlers. Only reachable through the session gate, which
//! supplies the [`AuthContext`] extension. Mutating actions check CSRF and
//! re-check their permission here.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum::{Extension, Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::access::Requirement;
use crate::error::{AppError, AppResult};
use crate::identity::{perms, AuthContext};
use crate::views;

use super::AppState;

fn authorize(ctx: &AuthContext, required: impl Into<Requirement>) -> AppResult<()> {
    if ctx.can(&required.into()) {
        Ok(())
    } else {
        Err(AppError::forbidden("forbidden", "insufficient permission"))
    }
}

fn check_csrf(ctx: &AuthContext, provided: &str) -> AppResult<()> {
    match ctx.session() {
        Some(s) if !provided.is_empty() && s.csrf_token == provided => Ok(()),
        _ => Err(AppError::csrf("invalid_csrf", "missing or invalid csrf token")),
    }
}

fn actor(ctx: &AuthContext) -> String {
    ctx.principal().map(|p| p.user_id.clone()).unwrap_or_default()
}

pub async fn dashboard(State(state): State<AppState>, Extension(ctx): Extension<AuthContext>) -> Html<String> {
    Html(views::control::dashboard(&ctx, &state.content.all_posts()))
}

pub async fn session_info(Extension(ctx): Extension<AuthContext>) -> Json<Value> {
    let body = match ctx.session() {
        Some(s) => json!({
            "user_id": s.principal.user_id,
            "display_name": s.principal.display_name(),
            "roles": s.principal.roles,
            "permissions": s.principal.permissions,
            "issued_at": s.issued_at,
            "request_id": ctx.request_id,
        }),
        None => json!({ "user_id": null, "permissions": [] }),
    };
    Json(body)
}

pub async fn users(State(state): State<AppState>, Extension(ctx): Extension<AuthContext>) -> AppResult<Html<String>> {
    authorize(&ctx, perms::USERS_MANAGE)?;
    Ok(Html(views::control::users(&ctx, &state.credentials.usernames())))
}

#[derive(Debug, Deserialize)]
pub struct NewPostForm {
    #[serde(default)]
    pub csrf: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: String,
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Form(form): Form<NewPostForm>,
) -> AppResult<Redirect> {
    check_csrf(&ctx, &form.csrf)?;
    authorize(&ctx, perms::BLOG_WRITE)?;
    let post = state.content.create_post(&form.title, &form.summary, &form.body, &actor(&ctx))?;
    info!(target: "control", user = %actor(&ctx), slug = %post.slug, "post created");
    Ok(Redirect::to("/control"))
}

#[derive(Debug, Deserialize)]
pub struct ActionForm {
    #[serde(default)]
    pub csrf: String,
}

pub async fn publish_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(slug): Path<String>,
    Form(form): Form<ActionForm>,
) -> AppResult<Redirect> {
    check_csrf(&ctx, &form.csrf)?;
    authorize(&ctx, perms::BLOG_PUBLISH)?;
    state.content.publish_post(&slug)?;
    info!(target: "control", user = %actor(&ctx), slug = %slug, "post published");
    Ok(Redirect::to("/control"))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(slug): Path<String>,
    Form(form): Form<ActionForm>,
) -> AppResult<Redirect> {
    check_csrf(&ctx, &form.csrf)?;
    authorize(&ctx, [perms::BLOG_DELETE])?;
    state.content.delete_post(&slug)?;
    info!(target: "control", user = %actor(&ctx), slug = %slug, "post deleted");
    Ok(Redirect::to("/control"))
}

pub async fn not_found(Extension(ctx): Extension<AuthContext>) -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(views::control::not_found(&ctx)))
}
