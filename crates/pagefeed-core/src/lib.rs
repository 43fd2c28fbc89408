//! pagefeed Core Library
//!
//! Configuration, front matter and error handling shared by the pagefeed crates.

pub mod config;
pub mod error;
pub mod frontmatter;

pub use config::{Config, FeedConfiguration, FeedEntry, FeedKind};
pub use error::{CoreError, Result};
pub use frontmatter::Frontmatter;
