//! Feed configuration.
//!
//! Feeds are defined by one JSON file each and loaded once at startup.

pub mod loader;
pub mod types;

pub use loader::{FeedLoader, LoadResult};
pub use types::{FeedConfig, FeedConfigStore, FeedDefinition};
