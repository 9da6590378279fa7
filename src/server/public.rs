//! Public site handlers. These never consult the session.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;

use crate::identity::AuthContext;
use crate::views::site;

use super::AppState;

type Page = (StatusCode, Html<String>);

fn missing(ctx: &AuthContext) -> Page { (StatusCode::NOT_FOUND, Html(site::not_found(ctx))) }

pub async fn home(State(state): State<AppState>) -> Html<String> {
    let ctx = AuthContext::anonymous();
    Html(site::home(&ctx, &state.content.published_posts(), &state.content.case_studies()))
}

pub async fn about() -> Html<String> {
    Html(site::about(&AuthContext::anonymous()))
}

pub async fn blog_index(State(state): State<AppState>) -> Html<String> {
    Html(site::blog_index(&AuthContext::anonymous(), &state.content.published_posts()))
}

pub async fn blog_post(State(state): State<AppState>, Path(slug): Path<String>) -> Page {
    let ctx = AuthContext::anonymous();
    match state.content.published_post(&slug) {
        Some(post) => (StatusCode::OK, Html(site::blog_post(&ctx, &post))),
        None => missing(&ctx),
    }
}

pub async fn case_studies(State(state): State<AppState>) -> Html<String> {
    Html(site::case_studies(&AuthContext::anonymous(), &state.content.case_studies()))
}

pub async fn case_study(State(state): State<AppState>, Path(slug): Path<String>) -> Page {
    let ctx = AuthContext::anonymous();
    match state.content.case_study(&slug) {
        Some(item) => (StatusCode::OK, Html(site::case_study(&ctx, &item))),
        None => missing(&ctx),
    }
}

pub async fn not_found() -> Page {
    missing(&AuthContext::anonymous())
}
