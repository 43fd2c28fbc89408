//! Listings.
//!
//! A [`Listing`] is a synthetic renderable aggregating member renderables: each
//! member is rendered with an item template and the fragments are
//! concatenated into the listing's `body`, next to collection-level fields.

use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    context::{Context, FieldValue},
    error::Result,
    manipulation::ContextManipulation,
    pipeline::Renderer,
    renderable::Renderable,
    template::TemplateError,
};

/// A renderable built from an ordered list of other renderables.
#[derive(Clone)]
pub struct Listing {
    url: String,
    item_templates: Vec<String>,
    items: Vec<Arc<dyn Renderable>>,
    manipulation: ContextManipulation,
    additional_fields: Vec<(String, FieldValue)>,
}

/// Create a listing at `url`.
///
/// Each item's context goes through `manipulation` before it is rendered with
/// its item template. `additional_fields` are merged over `url` and `body`,
/// later entries winning.
pub fn create_listing_with<T, F, K>(
    manipulation: ContextManipulation,
    url: impl Into<String>,
    item_templates: T,
    items: Vec<Arc<dyn Renderable>>,
    additional_fields: F,
) -> Listing
where
    T: IntoIterator,
    T::Item: Into<String>,
    F: IntoIterator<Item = (K, FieldValue)>,
    K: Into<String>,
{
    Listing {
        url: url.into(),
        item_templates: item_templates.into_iter().map(Into::into).collect(),
        items,
        manipulation,
        additional_fields: additional_fields
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect(),
    }
}

/// Create a listing without item manipulation.
pub fn create_listing<T, F, K>(
    url: impl Into<String>,
    item_templates: T,
    items: Vec<Arc<dyn Renderable>>,
    additional_fields: F,
) -> Listing
where
    T: IntoIterator,
    T::Item: Into<String>,
    F: IntoIterator<Item = (K, FieldValue)>,
    K: Into<String>,
{
    create_listing_with(
        ContextManipulation::identity(),
        url,
        item_templates,
        items,
        additional_fields,
    )
}

impl Listing {
    /// Listing URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Members in rendering order.
    #[must_use]
    pub fn items(&self) -> &[Arc<dyn Renderable>] {
        &self.items
    }

    /// Candidate item templates.
    #[must_use]
    pub fn item_templates(&self) -> &[String] {
        &self.item_templates
    }

    /// Choose the item template for a member context.
    ///
    /// A literal `template` field naming one of the candidates selects it;
    /// otherwise the first candidate is used.
    fn select_template(&self, context: &Context) -> Result<&str> {
        let requested = context.get("template").and_then(FieldValue::as_literal);
        if let Some(requested) = requested
            && let Some(found) = self.item_templates.iter().find(|t| *t == requested)
        {
            return Ok(found.as_str());
        }

        self.item_templates
            .first()
            .map(String::as_str)
            .ok_or_else(|| TemplateError::NoCandidate.into())
    }

    /// Render every member and concatenate the results, in order.
    pub fn render_items(&self, renderer: &Renderer) -> Result<String> {
        let mut body = String::new();
        for item in &self.items {
            let context = self.manipulation.apply(item.context(renderer)?);
            let template = self.select_template(&context)?;
            body.push_str(&renderer.render_context(template, &context)?);
        }

        debug!(url = %self.url, items = self.items.len(), "rendered listing");
        Ok(body)
    }
}

impl Renderable for Listing {
    fn context(&self, renderer: &Renderer) -> Result<Context> {
        let body = self.render_items(renderer)?;
        let mut context = Context::new()
            .with("url", self.url.clone())
            .with("body", body);
        context.merge(self.additional_fields.iter().cloned());
        Ok(context)
    }
}

impl fmt::Debug for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listing")
            .field("url", &self.url)
            .field("item_templates", &self.item_templates)
            .field("items", &self.items.len())
            .field("additional_fields", &self.additional_fields)
            .finish_non_exhaustive()
    }
}
