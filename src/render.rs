//! HTML rendering for pages
//!
//! Templates are compiled once at startup into a `minijinja` environment that
//! is never mutated afterwards. Template names end in `.html`, so minijinja's
//! auto-escaping applies to every substituted value.

use std::fmt;
use std::path::Path;

use minijinja::{context, Environment};

use crate::error::RenderError;
use crate::page::Page;

/// Named views a page can be rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    View,
    Edit,
}

impl View {
    pub const ALL: [Self; 2] = [Self::View, Self::Edit];

    pub const fn name(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }

    pub fn template_name(self) -> String {
        format!("{}.html", self.name())
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Precompiled template set
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Load `view.html` and `edit.html` from a directory
    pub fn load(dir: &Path) -> Result<Self, RenderError> {
        let mut sources = Vec::with_capacity(View::ALL.len());
        for view in View::ALL {
            let path = dir.join(view.template_name());
            let source = std::fs::read_to_string(&path)
                .map_err(|source| RenderError::Io { path, source })?;
            sources.push((view, source));
        }
        Self::from_sources(sources)
    }

    /// Compile templates from in-memory sources
    pub fn from_sources<I, S>(sources: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = (View, S)>,
        S: Into<String>,
    {
        let mut env = Environment::new();
        for (view, source) in sources {
            env.add_template_owned(view.template_name(), source.into())?;
        }
        Ok(Self { env })
    }

    pub fn render(&self, view: View, page: &Page) -> Result<String, RenderError> {
        let template = self.env.get_template(&view.template_name())?;
        let html = template.render(context! {
            title => page.title.as_str(),
            body => String::from_utf8_lossy(&page.body),
        })?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Title;

    const VIEW: &str = "<h1>{{ title }}</h1><div>{{ body }}</div>";
    const EDIT: &str = "<h1>Editing {{ title }}</h1>\
        <form action=\"/save/{{ title }}\" method=\"POST\">\
        <textarea name=\"body\">{{ body }}</textarea></form>";

    fn renderer() -> Renderer {
        Renderer::from_sources([(View::View, VIEW), (View::Edit, EDIT)]).unwrap()
    }

    fn page(title: &str, body: &str) -> Page {
        Page::new(Title::parse(title).unwrap(), body)
    }

    #[test]
    fn test_render_view() {
        let html = renderer()
            .render(View::View, &page("Test", "Hello World"))
            .unwrap();
        assert_eq!(html, "<h1>Test</h1><div>Hello World</div>");
    }

    #[test]
    fn test_render_edit_blank() {
        let blank = Page::blank(Title::parse("Missing").unwrap());
        let html = renderer().render(View::Edit, &blank).unwrap();
        assert!(html.contains("<h1>Editing Missing</h1>"));
        assert!(html.contains("action=\"/save/Missing\""));
        assert!(html.contains("<textarea name=\"body\"></textarea>"));
    }

    #[test]
    fn test_body_markup_is_escaped() {
        let html = renderer()
            .render(View::View, &page("Xss", "<script>alert(1)</script>"))
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_missing_template_is_render_error() {
        let only_view = Renderer::from_sources([(View::View, VIEW)]).unwrap();
        let err = only_view
            .render(View::Edit, &page("Test", ""))
            .unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
    }

    #[test]
    fn test_invalid_syntax_fails_to_compile() {
        let result = Renderer::from_sources([(View::View, "{% if %}")]);
        assert!(matches!(result, Err(RenderError::Template(_))));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("view.html"), VIEW).unwrap();
        std::fs::write(dir.path().join("edit.html"), EDIT).unwrap();

        let renderer = Renderer::load(dir.path()).unwrap();
        let html = renderer.render(View::View, &page("Home", "hi")).unwrap();
        assert!(html.contains("<h1>Home</h1>"));
    }

    #[test]
    fn test_load_requires_both_templates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("view.html"), VIEW).unwrap();

        let err = Renderer::load(dir.path()).err().unwrap();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
