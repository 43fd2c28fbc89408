//! RSS and Atom feeds.
//!
//! A feed is a [`Listing`] of the site's items, rendered with the format's
//! item template, merged with the [`FeedConfiguration`] fields and rendered
//! once more with the format's feed template. Items must be ordered most
//! recent first: the first one provides the feed's `timestamp`.

use std::sync::Arc;

use pagefeed_core::{Config, FeedConfiguration, FeedKind};
use tracing::{info, warn};

use crate::{
    context::FieldValue,
    error::Result,
    listing::{Listing, create_listing_with},
    manipulation::{ContextManipulation, default_value, format_date, relative_url},
    output::OutputWriter,
    pipeline::{Chain, Renderer},
    renderable::Renderable,
};

/// Item date used when an item has no usable `timestamp`.
pub const DATE_FALLBACK: &str = "No date found.";

/// Feed `timestamp` used when the first item has no `timestamp` field.
pub const TIMESTAMP_FALLBACK: &str = "foo";

/// Render an RSS feed of `items` at `config.url`.
pub fn render_rss(
    config: &FeedConfiguration,
    items: Vec<Arc<dyn Renderable>>,
    renderer: &Renderer,
    writer: &dyn OutputWriter,
) -> Result<()> {
    render_rss_with(ContextManipulation::identity(), config, items, renderer, writer)
}

/// Render an RSS feed, applying `manipulation` to every item first.
pub fn render_rss_with(
    manipulation: ContextManipulation,
    config: &FeedConfiguration,
    items: Vec<Arc<dyn Renderable>>,
    renderer: &Renderer,
    writer: &dyn OutputWriter,
) -> Result<()> {
    render_kind_with(FeedKind::Rss, manipulation, config, items, renderer, writer)
}

/// Render an Atom feed of `items` at `config.url`.
pub fn render_atom(
    config: &FeedConfiguration,
    items: Vec<Arc<dyn Renderable>>,
    renderer: &Renderer,
    writer: &dyn OutputWriter,
) -> Result<()> {
    render_atom_with(ContextManipulation::identity(), config, items, renderer, writer)
}

/// Render an Atom feed, applying `manipulation` to every item first.
pub fn render_atom_with(
    manipulation: ContextManipulation,
    config: &FeedConfiguration,
    items: Vec<Arc<dyn Renderable>>,
    renderer: &Renderer,
    writer: &dyn OutputWriter,
) -> Result<()> {
    render_kind_with(FeedKind::Atom, manipulation, config, items, renderer, writer)
}

/// Render every feed declared in the configuration from the same items.
///
/// Returns the number of feeds written.
pub fn render_feeds(
    config: &Config,
    items: &[Arc<dyn Renderable>],
    renderer: &Renderer,
    writer: &dyn OutputWriter,
) -> Result<usize> {
    for entry in &config.feeds {
        render_kind_with(
            entry.kind,
            ContextManipulation::identity(),
            &entry.feed,
            items.to_vec(),
            renderer,
            writer,
        )?;
    }
    Ok(config.feeds.len())
}

fn render_kind_with(
    kind: FeedKind,
    manipulation: ContextManipulation,
    config: &FeedConfiguration,
    items: Vec<Arc<dyn Renderable>>,
    renderer: &Renderer,
    writer: &dyn OutputWriter,
) -> Result<()> {
    let manipulation = manipulation.then(&format_date(
        "timestamp",
        kind.date_format(),
        DATE_FALLBACK,
    ));
    render_feed_with(
        manipulation,
        config,
        items,
        kind.feed_template(),
        kind.item_template(),
        renderer,
        writer,
    )
}

/// Render a feed with explicit templates.
///
/// `manipulation` is applied to every item before it is rendered and before
/// the feed `timestamp` is read from the first item. Items that still lack a
/// `timestamp` afterwards render with [`DATE_FALLBACK`]; the feed itself then
/// uses [`TIMESTAMP_FALLBACK`].
pub fn render_feed_with(
    manipulation: ContextManipulation,
    config: &FeedConfiguration,
    items: Vec<Arc<dyn Renderable>>,
    feed_template: &str,
    item_template: &str,
    renderer: &Renderer,
    writer: &dyn OutputWriter,
) -> Result<()> {
    if items.is_empty() {
        warn!(url = %config.url, "rendering a feed without items, it will not validate");
    }

    let count = items.len();
    let listing = create_feed(config, items, manipulation, item_template);
    let action = Chain::new(listing).template(feed_template);
    renderer.render_chain(&[], &action, writer)?;

    info!(url = %config.url, items = count, template = feed_template, "rendered feed");
    Ok(())
}

/// Build the listing behind a feed, before the feed template is applied.
///
/// Item and feed URLs are made relative to the site root, so that templates
/// can join them to the base URL with a single slash.
pub fn create_feed(
    config: &FeedConfiguration,
    items: Vec<Arc<dyn Renderable>>,
    manipulation: ContextManipulation,
    item_template: &str,
) -> Listing {
    let timestamp = latest_timestamp(items.first().cloned(), manipulation.clone());
    let item_manipulation = manipulation
        .then(&default_value("timestamp", DATE_FALLBACK))
        .then(&relative_url());

    let additional_fields = [
        ("title", FieldValue::literal(&config.title)),
        ("description", FieldValue::literal(&config.description)),
        ("authorName", FieldValue::literal(&config.author_name)),
        ("timestamp", timestamp),
    ];

    create_listing_with(
        item_manipulation,
        config.url.trim_start_matches('/'),
        [item_template],
        items,
        additional_fields,
    )
}

/// Deferred `timestamp` of the first (most recent) item.
fn latest_timestamp(
    first: Option<Arc<dyn Renderable>>,
    manipulation: ContextManipulation,
) -> FieldValue {
    FieldValue::deferred(move |renderer| {
        let Some(first) = &first else {
            return Ok(TIMESTAMP_FALLBACK.to_string());
        };

        let context = manipulation.apply(first.context(renderer)?);
        let timestamp = context.force("timestamp", renderer)?;
        Ok(timestamp.unwrap_or(TIMESTAMP_FALLBACK).to_string())
    })
}
