//! Template system.
//!
//! Templates use string interpolation: `{{ name }}` inserts a context field
//! and fails if it is missing, `{{ name? }}` inserts an empty string instead.
//! Templates are resolved by id through a [`TemplateLoader`].
//!
//! Values are inserted verbatim. The built-in feed templates wrap free text
//! (titles, descriptions, author names) in CDATA sections; URLs must already
//! be valid inside an XML attribute.

use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::{context::Context, error::Result, pipeline::Renderer};

/// Template lookup and application errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Template file could not be read.
    #[error("failed to read template {id}: {source}")]
    Read {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid template syntax.
    #[error("invalid template syntax in {template}: {message}")]
    InvalidSyntax { template: String, message: String },

    /// Missing required variable.
    #[error("missing required variable `{variable}` in template {template}")]
    MissingVariable { template: String, variable: String },

    /// A listing was given no item template to choose from.
    #[error("no item template to choose from")]
    NoCandidate,
}

/// A template supporting variable interpolation.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context.
    ///
    /// Deferred fields are evaluated when a placeholder refers to them.
    /// Fields the context lacks are looked up in the renderer's globals.
    pub fn render(&self, context: &Context, renderer: &Renderer) -> Result<String> {
        let mut output = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| TemplateError::InvalidSyntax {
                template: self.name.clone(),
                message: "unclosed {{ delimiter".to_string(),
            })?;

            let var_name = after[..end].trim();
            let (var_name, optional) = match var_name.strip_suffix('?') {
                Some(stripped) => (stripped.trim_end(), true),
                None => (var_name, false),
            };

            if var_name.is_empty() {
                return Err(TemplateError::InvalidSyntax {
                    template: self.name.clone(),
                    message: "empty placeholder".to_string(),
                }
                .into());
            }

            match context.get(var_name) {
                Some(value) => output.push_str(value.force(renderer)?),
                None => match renderer.global(var_name) {
                    Some(value) => output.push_str(value),
                    None if optional => {}
                    None => {
                        return Err(TemplateError::MissingVariable {
                            template: self.name.clone(),
                            variable: var_name.to_string(),
                        }
                        .into());
                    }
                },
            }

            rest = &after[end + 2..];
        }

        output.push_str(rest);
        Ok(output)
    }
}

/// Resolves template ids to templates.
pub trait TemplateLoader: Send + Sync {
    /// Load the template with the given id.
    fn load(&self, id: &str) -> std::result::Result<Template, TemplateError>;
}

/// In-memory registry of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create a new registry with the built-in feed templates.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    /// Create a registry without any template.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register the built-in feed templates.
    fn register_defaults(&mut self) {
        self.register(Template::new("rss.xml", DEFAULT_RSS_TEMPLATE));
        self.register(Template::new("rss-item.xml", DEFAULT_RSS_ITEM_TEMPLATE));
        self.register(Template::new("atom.xml", DEFAULT_ATOM_TEMPLATE));
        self.register(Template::new("atom-item.xml", DEFAULT_ATOM_ITEM_TEMPLATE));
    }

    /// Register a template.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.register(Template::new(name, content));
        self
    }

    /// Get a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }
}

impl TemplateLoader for TemplateRegistry {
    fn load(&self, id: &str) -> std::result::Result<Template, TemplateError> {
        self.get(id)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }
}

/// Loads templates from a directory, falling back to a registry.
#[derive(Debug, Clone)]
pub struct FileTemplateLoader {
    dir: PathBuf,
    fallback: TemplateRegistry,
}

impl FileTemplateLoader {
    /// Create a loader over `dir` with the built-in templates as fallback.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_fallback(dir, TemplateRegistry::new())
    }

    /// Create a loader over `dir` with a custom fallback registry.
    #[must_use]
    pub fn with_fallback(dir: impl Into<PathBuf>, fallback: TemplateRegistry) -> Self {
        Self {
            dir: dir.into(),
            fallback,
        }
    }

    /// Template directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TemplateLoader for FileTemplateLoader {
    fn load(&self, id: &str) -> std::result::Result<Template, TemplateError> {
        let relative = Path::new(id);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(TemplateError::NotFound(id.to_string()));
        }

        let path = self.dir.join(relative);
        if path.is_file() {
            debug!(path = %path.display(), "loading template file");
            let content = std::fs::read_to_string(&path).map_err(|source| TemplateError::Read {
                id: id.to_string(),
                source,
            })?;
            return Ok(Template::new(id, content));
        }

        self.fallback.load(id)
    }
}

/// Default RSS 2.0 feed template.
pub const DEFAULT_RSS_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
    <channel>
        <title><![CDATA[{{ title }}]]></title>
        <link>{{ absolute }}/</link>
        <description><![CDATA[{{ description }}]]></description>
        <managingEditor><![CDATA[{{ authorName }}]]></managingEditor>
        <atom:link href="{{ absolute }}/{{ url }}" rel="self" type="application/rss+xml" />
        <lastBuildDate>{{ timestamp }}</lastBuildDate>
        {{ body }}
    </channel>
</rss>
"#;

/// Default RSS 2.0 item template.
pub const DEFAULT_RSS_ITEM_TEMPLATE: &str = r#"<item>
            <title><![CDATA[{{ title }}]]></title>
            <link>{{ absolute }}/{{ url }}</link>
            <description><![CDATA[{{ description }}]]></description>
            <pubDate>{{ timestamp }}</pubDate>
            <guid>{{ absolute }}/{{ url }}</guid>
        </item>
        "#;

/// Default Atom feed template.
pub const DEFAULT_ATOM_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title><![CDATA[{{ title }}]]></title>
    <subtitle><![CDATA[{{ description }}]]></subtitle>
    <link href="{{ absolute }}/{{ url }}" rel="self" />
    <link href="{{ absolute }}" />
    <id>{{ absolute }}/{{ url }}</id>
    <author>
        <name><![CDATA[{{ authorName }}]]></name>
    </author>
    <updated>{{ timestamp }}</updated>
    {{ body }}
</feed>
"#;

/// Default Atom entry template.
pub const DEFAULT_ATOM_ITEM_TEMPLATE: &str = r#"<entry>
        <title><![CDATA[{{ title }}]]></title>
        <link href="{{ absolute }}/{{ url }}" />
        <id>{{ absolute }}/{{ url }}</id>
        <updated>{{ timestamp }}</updated>
        <summary type="html"><![CDATA[{{ description }}]]></summary>
    </entry>
    "#;
