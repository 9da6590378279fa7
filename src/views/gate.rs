use crate::access::{has_permission, Requirement};
use crate::identity::AuthContext;

use super::markup::{Markup, Render};

/// Renders `children` only when the actor satisfies `required`, otherwise the
/// fallback (nothing by default).
///
/// A session that is still loading or absent holds no permissions, so the
/// children never render before the session resolves. Denial is silent.
pub struct Gate<C, F = Markup> {
    required: Requirement,
    children: C,
    fallback: Option<F>,
}

impl<C: Render> Gate<C, Markup> {
    pub fn new(required: impl Into<Requirement>, children: C) -> Self {
        Self { required: required.into(), children, fallback: None }
    }
}

impl<C, F> Gate<C, F> {
    pub fn otherwise<G: Render>(self, fallback: G) -> Gate<C, G> {
        Gate { required: self.required, children: self.children, fallback: Some(fallback) }
    }
}

impl<C: Render, F: Render> Render for Gate<C, F> {
    fn render_into(&self, ctx: &AuthContext, out: &mut String) {
        if has_permission(ctx.held_permissions(), &self.required) {
            self.children.render_into(ctx, out);
        } else if let Some(fallback) = &self.fallback {
            fallback.render_into(ctx, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Principal, SessionManager};

    fn ctx_with(perms: &[&str]) -> AuthContext {
        let principal = Principal { user_id: "ana".into(), permissions: perms.iter().collect(), ..Default::default() };
        AuthContext::authenticated(SessionManager::default().issue(principal).unwrap())
    }

    #[test]
    fn renders_children_when_permitted() {
        let g = Gate::new("blog:write", Markup::raw("<button>New</button>"));
        assert_eq!(g.render(&ctx_with(&["blog:write"])), "<button>New</button>");
    }

    #[test]
    fn renders_fallback_when_denied() {
        let g = Gate::new(["blog:delete", "blog:publish"], Markup::raw("<button>Delete</button>"))
            .otherwise(Markup::raw("<span>read only</span>"));
        assert_eq!(g.render(&ctx_with(&["blog:write"])), "<span>read only</span>");
    }

    #[test]
    fn default_fallback_is_nothing() {
        let g = Gate::new("users:manage", Markup::raw("secret"));
        assert_eq!(g.render(&ctx_with(&["blog:write"])), "");
        assert_eq!(g.render(&AuthContext::anonymous()), "");
    }

    #[test]
    fn pending_session_never_renders_children() {
        let g = Gate::new("blog:write", Markup::raw("secret")).otherwise(Markup::raw("wait"));
        assert_eq!(g.render(&AuthContext::pending()), "wait");
    }

    #[test]
    fn gates_nest() {
        let inner = Gate::new("blog:delete", Markup::raw("[delete]"));
        let outer = Gate::new("blog:write", inner).otherwise(Markup::raw("[none]"));
        assert_eq!(outer.render(&ctx_with(&["blog:write", "blog:delete"])), "[delete]");
        assert_eq!(outer.render(&ctx_with(&["blog:write"])), "");
        assert_eq!(outer.render(&ctx_with(&[])), "[none]");
    }
}
