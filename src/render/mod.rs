//! Feed renderer: turns fetched posts into RSS 2.0 documents.

pub mod date;
pub mod feed;

pub use feed::{normalize_tags, render_feed, RenderContext, GENERATOR, GUID_NAMESPACE, WEBMASTER};
