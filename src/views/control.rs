//! Control panel views. Every action control is wrapped in a [`Gate`].

use crate::content::Post;
use crate::identity::{perms, AuthContext};

use super::gate::Gate;
use super::markup::{escape, Fragment, Markup, Render};

fn csrf_field(ctx: &AuthContext) -> String {
    let token = ctx.session().map(|s| s.csrf_token.as_str()).unwrap_or("");
    format!("<input type=\"hidden\" name=\"csrf\" value=\"{}\">", escape(token))
}

fn post_form(ctx: &AuthContext, action: &str, label: &str) -> Markup {
    Markup::raw(format!(
        "<form method=\"post\" action=\"{action}\" class=\"inline\">{csrf}<button type=\"submit\">{label}</button></form>",
        action = escape(action),
        csrf = csrf_field(ctx),
        label = escape(label),
    ))
}

/// Protected layout: header, permission-gated navigation, then `body`.
pub fn layout<B: Render>(title: &str, ctx: &AuthContext, body: B) -> String {
    let who = ctx.principal().map(|p| p.display_name().to_string()).unwrap_or_default();
    let nav = Fragment::new()
        .push(Markup::raw("<nav class=\"control-nav\"><a href=\"/control\">Dashboard</a> "))
        .push(Gate::new(perms::BLOG_WRITE, Markup::raw("<a href=\"#new-post\">New post</a> ")))
        .push(Gate::new(perms::USERS_MANAGE, Markup::raw("<a href=\"/control/users\">Users</a> ")))
        .push(Markup::raw("</nav>"));

    let mut out = String::with_capacity(2048);
    out.push_str("<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>");
    out.push_str(&escape(title));
    out.push_str(" | Control</title></head><body class=\"control\"><header><strong>Control</strong> <span class=\"who\">");
    out.push_str(&escape(&who));
    out.push_str("</span> ");
    out.push_str(post_form(ctx, "/logout", "Sign out").as_str());
    out.push_str("</header>");
    nav.render_into(ctx, &mut out);
    out.push_str("<main>");
    body.render_into(ctx, &mut out);
    out.push_str("</main></body></html>");
    out
}

fn post_row(ctx: &AuthContext, p: &Post) -> Fragment {
    let status = if p.is_published() { "published" } else { "draft" };
    let base = format!("/control/posts/{}", p.slug);
    let publish = if p.is_published() { None } else { Some(Gate::new(perms::BLOG_PUBLISH, post_form(ctx, &format!("{}/publish", base), "Publish"))) };
    Fragment::new()
        .push(Markup::raw(format!(
            "<tr><td>{title}</td><td>{author}</td><td>{status}</td><td>",
            title = escape(&p.title),
            author = escape(&p.author),
            status = status,
        )))
        .push(publish)
        .push(Gate::new([perms::BLOG_DELETE], post_form(ctx, &format!("{}/delete", base), "Delete")))
        .push(Markup::raw("</td></tr>"))
}

pub fn dashboard(ctx: &AuthContext, posts: &[Post]) -> String {
    let mut table = Fragment::new().push(Markup::raw("<h1>Posts</h1><table><thead><tr><th>Title</th><th>Author</th><th>Status</th><th></th></tr></thead><tbody>"));
    for p in posts.iter() { table = table.push(post_row(ctx, p)); }
    table = table.push(Markup::raw("</tbody></table>"));

    let new_post = Gate::new(
        perms::BLOG_WRITE,
        Markup::raw(format!(
            "<section id=\"new-post\"><h2>New post</h2><form method=\"post\" action=\"/control/posts\">{csrf}<label>Title <input name=\"title\" required></label><label>Summary <input name=\"summary\"></label><label>Body <textarea name=\"body\"></textarea></label><button type=\"submit\">Save draft</button></form></section>",
            csrf = csrf_field(ctx),
        )),
    );
    layout("Dashboard", ctx, Fragment::new().push(table).push(new_post))
}

pub fn users(ctx: &AuthContext, names: &[String]) -> String {
    let mut body = Fragment::new().push(Markup::raw("<h1>Users</h1><ul>"));
    for n in names.iter() { body = body.push(Markup::raw(format!("<li>{}</li>", escape(n)))); }
    body = body.push(Markup::raw("</ul>"));
    layout("Users", ctx, body)
}

pub fn not_found(ctx: &AuthContext) -> String {
    layout("Not found", ctx, Markup::raw("<h1>Not found</h1>"))
}

/// Login entry point. Not part of the protected area.
pub fn login_form(action: &str, next: Option<&str>, error: Option<&str>) -> String {
    let next_field = next
        .map(|n| format!("<input type=\"hidden\" name=\"next\" value=\"{}\">", escape(n)))
        .unwrap_or_default();
    let error_html = error.map(|e| format!("<p class=\"error\">{}</p>", escape(e))).unwrap_or_default();
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Sign in | Control</title></head><body class=\"login\"><main><h1>Sign in</h1>{error}<form method=\"post\" action=\"{action}\">{next}<label>Username <input name=\"username\" autocomplete=\"username\" required></label><label>Password <input name=\"password\" type=\"password\" autocomplete=\"current-password\" required></label><button type=\"submit\">Sign in</button></form></main></body></html>",
        error = error_html,
        action = escape(action),
        next = next_field,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentStore;
    use crate::identity::{permissions_for, Principal, SessionManager};

    fn ctx_for(roles: &[&str]) -> AuthContext {
        let roles: Vec<String> = roles.iter().map(|s| s.to_string()).collect();
        let principal = Principal { user_id: "ana".into(), permissions: permissions_for(&roles, &[]), roles, ..Default::default() };
        AuthContext::authenticated(SessionManager::default().issue(principal).unwrap())
    }

    #[test]
    fn author_sees_new_post_but_no_destructive_actions() {
        let store = ContentStore::seeded();
        let html = dashboard(&ctx_for(&["author"]), &store.all_posts());
        assert!(html.contains("id=\"new-post\""));
        assert!(!html.contains(">Delete<"));
        assert!(!html.contains(">Publish<"));
        assert!(!html.contains("/control/users"));
    }

    #[test]
    fn editor_sees_publish_for_drafts_only_and_delete_everywhere() {
        let store = ContentStore::seeded();
        let html = dashboard(&ctx_for(&["editor"]), &store.all_posts());
        assert_eq!(html.matches(">Publish<").count(), 1);
        assert_eq!(html.matches(">Delete<").count(), store.all_posts().len());
        assert!(!html.contains("/control/users"));
    }

    #[test]
    fn admin_sees_users_link_and_csrf_fields() {
        let ctx = ctx_for(&["admin"]);
        let csrf = ctx.session().map(|s| s.csrf_token.clone()).unwrap();
        let html = dashboard(&ctx, &[]);
        assert!(html.contains("/control/users"));
        assert!(html.contains(&csrf));
    }

    #[test]
    fn login_form_escapes_next() {
        let html = login_form("/login", Some("/control?x=\"<b>\""), Some("invalid credentials"));
        assert!(html.contains("&quot;&lt;b&gt;&quot;"));
        assert!(html.contains("invalid credentials"));
    }
}
