//! File-backed content items.
//!
//! A [`Page`] reads a Markdown document with optional YAML or TOML front
//! matter each time its context is requested.

use std::{
    fs,
    path::{Path, PathBuf},
};

use pagefeed_core::frontmatter::parse_frontmatter;
use pulldown_cmark::{Options, Parser, html};
use tracing::debug;

use crate::{
    context::{Context, FieldValue},
    error::Result,
    pipeline::Renderer,
    renderable::Renderable,
};

/// A content item backed by a source document.
#[derive(Debug, Clone)]
pub struct Page {
    root: PathBuf,
    path: PathBuf,
}

impl Page {
    /// Create a page for `path`, relative to the content directory `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            path: path.into(),
        }
    }

    /// Source path relative to the content directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Output URL: the source path with an `.html` extension.
    #[must_use]
    pub fn url(&self) -> String {
        let url = self.path.with_extension("html");
        url.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Renderable for Page {
    /// Fields: `path`, `url`, the front matter fields, then `body`.
    ///
    /// Front matter may override `path` and `url`. The Markdown body is only
    /// converted to HTML when `body` is used.
    fn context(&self, _renderer: &Renderer) -> Result<Context> {
        let full_path = self.root.join(&self.path);
        debug!(path = %full_path.display(), "reading page");

        let source = fs::read_to_string(&full_path)?;
        let (frontmatter, body) = parse_frontmatter(&source, &self.path)?;

        let mut context = Context::new()
            .with("path", self.path.to_string_lossy().into_owned())
            .with("url", self.url());
        context.merge(frontmatter.into_fields());
        context.insert(
            "body",
            FieldValue::deferred(move |_| Ok(markdown_to_html(&body))),
        );

        Ok(context)
    }
}

/// Render Markdown to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::RenderError, template::TemplateRegistry};

    fn renderer() -> Renderer {
        Renderer::new(TemplateRegistry::empty(), "https://example.com")
    }

    fn literal(context: &Context, key: &str) -> Option<String> {
        context
            .force(key, &renderer())
            .unwrap()
            .map(str::to_string)
    }

    #[test]
    fn test_page_url() {
        assert_eq!(Page::new("content", "posts/hello.md").url(), "posts/hello.html");
        assert_eq!(Page::new("content", "about.markdown").url(), "about.html");
    }

    #[test]
    fn test_page_context() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("posts")).unwrap();
        std::fs::write(
            dir.path().join("posts/hello.md"),
            "---\ntitle: Hello\ndescription: First post\ntimestamp: 2020-01-01\n---\n\n*Hi* there\n",
        )
        .unwrap();

        let page = Page::new(dir.path(), "posts/hello.md");
        let ctx = page.context(&renderer()).unwrap();

        assert_eq!(
            ctx.keys().collect::<Vec<_>>(),
            vec!["path", "url", "title", "description", "timestamp", "body"]
        );
        assert_eq!(literal(&ctx, "url").as_deref(), Some("posts/hello.html"));
        assert_eq!(literal(&ctx, "title").as_deref(), Some("Hello"));
        assert_eq!(literal(&ctx, "timestamp").as_deref(), Some("2020-01-01"));
        assert!(ctx.get("body").and_then(FieldValue::as_literal).is_none());
        assert_eq!(
            literal(&ctx, "body").as_deref(),
            Some("<p><em>Hi</em> there</p>\n")
        );
    }

    #[test]
    fn test_front_matter_overrides_url() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.md"), "+++\nurl = \"custom/\"\n+++\nBody").unwrap();

        let ctx = Page::new(dir.path(), "page.md").context(&renderer()).unwrap();
        assert_eq!(literal(&ctx, "url").as_deref(), Some("custom/"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Page::new(dir.path(), "missing.md")
            .context(&renderer())
            .unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }

    #[test]
    fn test_empty_front_matter_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("p.md"), "---\ntitle: T\n\"\": oops\n---\nBody\n").unwrap();

        let err = Page::new(dir.path(), "p.md")
            .context(&renderer())
            .unwrap_err();
        assert!(matches!(err, RenderError::Core(_)));
    }

    #[test]
    fn test_markdown_to_html() {
        assert_eq!(markdown_to_html("# Title"), "<h1>Title</h1>\n");
        assert!(markdown_to_html("~~gone~~").contains("<del>gone</del>"));
    }
}
