//! Public marketing pages.

use crate::content::{CaseStudy, Post};
use crate::identity::AuthContext;

use super::markup::{escape, Fragment, Markup, Render};

const NAV: &str = r#"<nav class="site-nav"><a href="/">Home</a> <a href="/about">About</a> <a href="/blog">Blog</a> <a href="/case-studies">Case studies</a></nav>"#;

/// Full HTML document around `body`.
pub fn page<B: Render>(title: &str, ctx: &AuthContext, body: B) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>");
    out.push_str(&escape(title));
    out.push_str(" | Studio</title></head><body>");
    out.push_str(NAV);
    out.push_str("<main>");
    body.render_into(ctx, &mut out);
    out.push_str("</main><footer>&copy; Studio</footer></body></html>");
    out
}

fn post_card(p: &Post) -> Markup {
    let date = p.published_at.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
    Markup::raw(format!(
        "<article><h2><a href=\"/blog/{slug}\">{title}</a></h2><time>{date}</time><p>{summary}</p></article>",
        slug = escape(&p.slug),
        title = escape(&p.title),
        date = date,
        summary = escape(&p.summary),
    ))
}

fn case_card(c: &CaseStudy) -> Markup {
    Markup::raw(format!(
        "<article><h2><a href=\"/case-studies/{slug}\">{title}</a></h2><p class=\"client\">{client}</p><p>{summary}</p></article>",
        slug = escape(&c.slug),
        title = escape(&c.title),
        client = escape(&c.client),
        summary = escape(&c.summary),
    ))
}

pub fn home(ctx: &AuthContext, latest: &[Post], featured: &[CaseStudy]) -> String {
    let mut body = Fragment::new()
        .push(Markup::raw("<section class=\"hero\"><h1>We build fast, accessible websites.</h1><p>Design and engineering for teams who care about craft.</p></section>"))
        .push(Markup::raw("<section><h2>Latest writing</h2>"));
    for p in latest.iter().take(3) { body = body.push(post_card(p)); }
    body = body.push(Markup::raw("</section><section><h2>Selected work</h2>"));
    for c in featured.iter().take(3) { body = body.push(case_card(c)); }
    body = body.push(Markup::raw("</section>"));
    page("Home", ctx, body)
}

pub fn about(ctx: &AuthContext) -> String {
    page(
        "About",
        ctx,
        Markup::raw("<h1>About</h1><p>A small studio of designers and engineers. We ship small, review everything and measure what matters.</p>"),
    )
}

pub fn blog_index(ctx: &AuthContext, posts: &[Post]) -> String {
    let mut body = Fragment::new().push(Markup::raw("<h1>Blog</h1>"));
    if posts.is_empty() { body = body.push(Markup::raw("<p>Nothing here yet.</p>")); }
    for p in posts.iter() { body = body.push(post_card(p)); }
    page("Blog", ctx, body)
}

pub fn blog_post(ctx: &AuthContext, post: &Post) -> String {
    let date = post.published_at.map(|d| d.format("%B %e, %Y").to_string()).unwrap_or_default();
    let body = Markup::raw(format!(
        "<article><h1>{title}</h1><p class=\"byline\">{author} &middot; <time>{date}</time></p><div class=\"body\">{text}</div></article>",
        title = escape(&post.title),
        author = escape(&post.author),
        date = date,
        text = escape(&post.body),
    ));
    page(&post.title, ctx, body)
}

pub fn case_studies(ctx: &AuthContext, items: &[CaseStudy]) -> String {
    let mut body = Fragment::new().push(Markup::raw("<h1>Case studies</h1>"));
    for c in items.iter() { body = body.push(case_card(c)); }
    page("Case studies", ctx, body)
}

pub fn case_study(ctx: &AuthContext, item: &CaseStudy) -> String {
    let body = Markup::raw(format!(
        "<article><h1>{title}</h1><p class=\"client\">{client}</p><div class=\"body\">{text}</div></article>",
        title = escape(&item.title),
        client = escape(&item.client),
        text = escape(&item.body),
    ));
    page(&item.title, ctx, body)
}

pub fn not_found(ctx: &AuthContext) -> String {
    page("Not found", ctx, Markup::raw("<h1>Not found</h1><p>That page does not exist.</p>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentStore;

    #[test]
    fn blog_index_escapes_titles() {
        let store = ContentStore::new();
        store.create_post("<script>x</script> tips", "s", "b", "ana").unwrap();
        store.publish_post("script-x-script-tips").unwrap();
        let html = blog_index(&AuthContext::anonymous(), &store.published_posts());
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt; tips"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn home_lists_seeded_content() {
        let store = ContentStore::seeded();
        let html = home(&AuthContext::anonymous(), &store.published_posts(), &store.case_studies());
        assert!(html.contains("/blog/shipping-small"));
        assert!(html.contains("/case-studies/northwind-relaunch"));
        assert!(!html.contains("draft-roadmap"));
    }
}
