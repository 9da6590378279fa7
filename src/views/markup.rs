use crate::identity::AuthContext;

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Anything that can write HTML for a given request context.
pub trait Render {
    fn render_into(&self, ctx: &AuthContext, out: &mut String);

    fn render(&self, ctx: &AuthContext) -> String {
        let mut out = String::new();
        self.render_into(ctx, &mut out);
        out
    }
}

/// A finished chunk of HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// Trusted HTML, inserted as is.
    pub fn raw<S: Into<String>>(html: S) -> Self { Markup(html.into()) }

    /// Plain text, escaped.
    pub fn text(text: &str) -> Self { Markup(escape(text)) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl Render for Markup {
    fn render_into(&self, _ctx: &AuthContext, out: &mut String) { out.push_str(&self.0); }
}

impl<R: Render + ?Sized> Render for &R {
    fn render_into(&self, ctx: &AuthContext, out: &mut String) { (**self).render_into(ctx, out) }
}

impl<R: Render + ?Sized> Render for Box<R> {
    fn render_into(&self, ctx: &AuthContext, out: &mut String) { (**self).render_into(ctx, out) }
}

impl<R: Render> Render for Option<R> {
    fn render_into(&self, ctx: &AuthContext, out: &mut String) {
        if let Some(r) = self { r.render_into(ctx, out) }
    }
}

/// An ordered list of heterogeneous children.
#[derive(Default)]
pub struct Fragment(Vec<Box<dyn Render + Send + Sync>>);

impl Fragment {
    pub fn new() -> Self { Self::default() }

    pub fn push<R: Render + Send + Sync + 'static>(mut self, child: R) -> Self {
        self.0.push(Box::new(child));
        self
    }
}

impl Render for Fragment {
    fn render_into(&self, ctx: &AuthContext, out: &mut String) {
        for child in self.0.iter() { child.render_into(ctx, out); }
    }
}
