//! In-memory site content: blog posts and case studies.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub author: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_published(&self) -> bool { self.published_at.is_some() }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CaseStudy {
    pub slug: String,
    pub client: String,
    pub title: String,
    pub summary: String,
    pub body: String,
}

/// Lowercase ASCII slug with single dashes between words.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') { out.pop(); }
    out
}

#[derive(Clone, Default)]
pub struct ContentStore {
    posts: Arc<RwLock<Vec<Post>>>,
    case_studies: Arc<RwLock<Vec<CaseStudy>>>,
}

impl ContentStore {
    pub fn new() -> Self { Self::default() }

    /// Store preloaded with the launch content.
    pub fn seeded() -> Self {
        let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).single();
        let posts = vec![
            Post {
                slug: "hello-world".into(),
                title: "Hello, world".into(),
                summary: "Why we started the studio.".into(),
                body: "We build fast, accessible sites for teams that care about craft.".into(),
                author: "admin".into(),
                published_at: at(2024, 3, 1),
            },
            Post {
                slug: "shipping-small".into(),
                title: "Shipping small".into(),
                summary: "Small releases, fewer surprises.".into(),
                body: "Every change we make goes out behind a review and a preview deploy.".into(),
                author: "admin".into(),
                published_at: at(2024, 6, 12),
            },
            Post {
                slug: "draft-roadmap".into(),
                title: "Roadmap (draft)".into(),
                summary: "What comes next.".into(),
                body: "Not ready for readers yet.".into(),
                author: "admin".into(),
                published_at: None,
            },
        ];
        let case_studies = vec![
            CaseStudy {
                slug: "northwind-relaunch".into(),
                client: "Northwind".into(),
                title: "Relaunching a 10-year-old storefront".into(),
                summary: "Page weight down 70%, conversions up.".into(),
                body: "We rebuilt the catalogue pages as static documents with server-side search.".into(),
            },
            CaseStudy {
                slug: "harbor-docs".into(),
                client: "Harbor".into(),
                title: "Docs people actually read".into(),
                summary: "A documentation site with versioned content.".into(),
                body: "Versioned docs built from the same repository as the product.".into(),
            },
        ];
        Self { posts: Arc::new(RwLock::new(posts)), case_studies: Arc::new(RwLock::new(case_studies)) }
    }

    /// Published posts, newest first.
    pub fn published_posts(&self) -> Vec<Post> {
        let mut out: Vec<Post> = self.posts.read().iter().filter(|p| p.is_published()).cloned().collect();
        out.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        out
    }

    pub fn all_posts(&self) -> Vec<Post> { self.posts.read().clone() }

    pub fn post(&self, slug: &str) -> Option<Post> {
        self.posts.read().iter().find(|p| p.slug == slug).cloned()
    }

    pub fn published_post(&self, slug: &str) -> Option<Post> {
        self.post(slug).filter(|p| p.is_published())
    }

    /// Add an unpublished post; the slug derives from the title.
    pub fn create_post(&self, title: &str, summary: &str, body: &str, author: &str) -> AppResult<Post> {
        let title = title.trim();
        if title.is_empty() { return Err(AppError::user("title_required", "title must not be empty")); }
        let slug = slugify(title);
        if slug.is_empty() { return Err(AppError::user("title_invalid", "title needs at least one letter or digit")); }
        let mut posts = self.posts.write();
        if posts.iter().any(|p| p.slug == slug) {
            return Err(AppError::conflict("slug_taken".to_string(), format!("a post with slug '{}' already exists", slug)));
        }
        let post = Post {
            slug,
            title: title.to_string(),
            summary: summary.trim().to_string(),
            body: body.to_string(),
            author: author.to_string(),
            published_at: None,
        };
        posts.push(post.clone());
        Ok(post)
    }

    /// Publish a post; already-published posts keep their original date.
    pub fn publish_post(&self, slug: &str) -> AppResult<Post> {
        let mut posts = self.posts.write();
        let Some(post) = posts.iter_mut().find(|p| p.slug == slug) else {
            return Err(AppError::not_found("post_not_found".to_string(), format!("no post '{}'", slug)));
        };
        if post.published_at.is_none() { post.published_at = Some(Utc::now()); }
        Ok(post.clone())
    }

    pub fn delete_post(&self, slug: &str) -> AppResult<Post> {
        let mut posts = self.posts.write();
        let Some(idx) = posts.iter().position(|p| p.slug == slug) else {
            return Err(AppError::not_found("post_not_found".to_string(), format!("no post '{}'", slug)));
        };
        Ok(posts.remove(idx))
    }

    pub fn case_studies(&self) -> Vec<CaseStudy> { self.case_studies.read().clone() }

    pub fn case_study(&self, slug: &str) -> Option<CaseStudy> {
        self.case_studies.read().iter().find(|c| c.slug == slug).cloned()
    }
}
