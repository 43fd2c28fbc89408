//! pagefeed Generator Library
//!
//! Context rendering pipeline for pagefeed: content items expose keyed
//! contexts, manipulations transform them, templates turn them into text, and
//! listings aggregate them into collection pages and RSS/Atom feeds.
//!
//! # Modules
//!
//! - [`context`] - Ordered field maps with lazily computed values
//! - [`manipulation`] - Composable context transforms
//! - [`renderable`] - Items that produce a context on demand
//! - [`template`] - Template system with variable interpolation
//! - [`pipeline`] - Template application and render chains
//! - [`listing`] - Aggregation of renderables into one
//! - [`feed`] - RSS and Atom feed assembly
//! - [`page`] - Markdown documents with front matter
//! - [`output`] - Writing rendered files

pub mod context;
pub mod error;
pub mod feed;
pub mod listing;
pub mod manipulation;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod renderable;
pub mod template;

pub use context::{Context, Deferred, FieldValue};
pub use error::{RenderError, Result};
pub use feed::{
    create_feed, render_atom, render_atom_with, render_feed_with, render_feeds, render_rss,
    render_rss_with,
};
pub use listing::{Listing, create_listing, create_listing_with};
pub use manipulation::ContextManipulation;
pub use output::{DirectoryWriter, OutputWriter};
pub use page::Page;
pub use pipeline::{Chain, Renderer, Step};
pub use renderable::{Manipulated, Renderable, RenderableExt};
pub use template::{FileTemplateLoader, Template, TemplateError, TemplateLoader, TemplateRegistry};
