//! Render pipeline.
//!
//! The [`Renderer`] applies templates to renderables. A [`Chain`] runs a
//! renderable through an ordered list of [`Step`]s, each step seeing the
//! context produced by the previous one. [`Renderer::render_chain`] runs a
//! chain and hands the final `body` to an [`OutputWriter`].

use std::{fmt, sync::Arc};

use pagefeed_core::Config;
use tracing::{debug, info};

use crate::{
    context::Context,
    error::{RenderError, Result},
    manipulation::ContextManipulation,
    output::OutputWriter,
    renderable::Renderable,
    template::{FileTemplateLoader, Template, TemplateLoader, TemplateRegistry},
};

/// Applies templates to contexts.
#[derive(Clone)]
pub struct Renderer {
    templates: Arc<dyn TemplateLoader>,
    absolute: String,
}

impl Renderer {
    /// Create a renderer resolving templates through `templates`.
    ///
    /// `base_url` is exposed to every template as the `absolute` field.
    pub fn new(templates: impl TemplateLoader + 'static, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            templates: Arc::new(templates),
            absolute: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a renderer from the site configuration.
    ///
    /// Templates come from `build.templates_dir` when set, with the built-in
    /// feed templates as fallback.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        match &config.build.templates_dir {
            Some(dir) => Self::new(FileTemplateLoader::new(dir), &config.site.base_url),
            None => Self::new(TemplateRegistry::new(), &config.site.base_url),
        }
    }

    /// Site base URL, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.absolute
    }

    /// Value of a site-global field, used when a context lacks it.
    #[must_use]
    pub fn global(&self, name: &str) -> Option<&str> {
        match name {
            "absolute" => Some(&self.absolute),
            _ => None,
        }
    }

    /// Resolve a template.
    pub fn template(&self, id: &str) -> Result<Template> {
        debug!(template = id, "resolving template");
        Ok(self.templates.load(id)?)
    }

    /// Apply a template to a context, returning the text.
    pub fn render_context(&self, template_id: &str, context: &Context) -> Result<String> {
        self.template(template_id)?.render(context, self)
    }

    /// Apply a template to a renderable, returning the text.
    pub fn render(&self, template_id: &str, renderable: &dyn Renderable) -> Result<String> {
        let context = renderable.context(self)?;
        self.render_context(template_id, &context)
    }

    /// Apply a template to a context; the output replaces its `body`.
    pub fn apply_template(&self, template_id: &str, context: Context) -> Result<Context> {
        let body = self.render_context(template_id, &context)?;
        Ok(context.with("body", body))
    }

    /// Run `steps` after `action` and write the resulting `body` at its `url`.
    ///
    /// Nothing is written if any step fails.
    pub fn render_chain(
        &self,
        steps: &[Step],
        action: &dyn Renderable,
        writer: &dyn OutputWriter,
    ) -> Result<()> {
        let mut context = action.context(self)?;
        for step in steps {
            context = step.run(context, self)?;
        }

        let url = context
            .force("url", self)?
            .ok_or_else(|| RenderError::MissingOutputField("url".to_string()))?;
        let body = context
            .force("body", self)?
            .ok_or_else(|| RenderError::MissingOutputField("body".to_string()))?;

        writer.write(url, body)?;
        info!(url, bytes = body.len(), "rendered chain");
        Ok(())
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("absolute", &self.absolute)
            .finish_non_exhaustive()
    }
}

/// A pipeline step.
#[derive(Debug, Clone)]
pub enum Step {
    /// Transform the context.
    Manipulate(ContextManipulation),
    /// Apply a template; its output becomes the `body` field.
    Template(String),
}

impl Step {
    /// Run the step on a context.
    pub fn run(&self, context: Context, renderer: &Renderer) -> Result<Context> {
        match self {
            Self::Manipulate(manipulation) => Ok(manipulation.apply(context)),
            Self::Template(id) => renderer.apply_template(id, context),
        }
    }
}

/// A renderable followed by pipeline steps.
#[derive(Clone)]
pub struct Chain {
    source: Arc<dyn Renderable>,
    steps: Vec<Step>,
}

impl Chain {
    /// Start a chain from a renderable.
    pub fn new(source: impl Renderable + 'static) -> Self {
        Self::from_arc(Arc::new(source))
    }

    /// Start a chain from a shared renderable.
    pub fn from_arc(source: Arc<dyn Renderable>) -> Self {
        Self {
            source,
            steps: Vec::new(),
        }
    }

    /// Append a step.
    #[must_use]
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a template application.
    #[must_use]
    pub fn template(self, id: impl Into<String>) -> Self {
        self.then(Step::Template(id.into()))
    }

    /// Append a manipulation.
    #[must_use]
    pub fn manipulate(self, manipulation: ContextManipulation) -> Self {
        self.then(Step::Manipulate(manipulation))
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl Renderable for Chain {
    fn context(&self, renderer: &Renderer) -> Result<Context> {
        let mut context = self.source.context(renderer)?;
        for step in &self.steps {
            context = step.run(context, renderer)?;
        }
        Ok(context)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}
