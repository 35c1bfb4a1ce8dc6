//! Gelbooru RSS Generator
//!
//! Builds per-artist RSS feeds from Gelbooru tag searches and serves them
//! over HTTP, keeping one cached document per feed that is refreshed in the
//! background and on demand.

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod gelbooru;
pub mod logging;
pub mod refresh;
pub mod render;
pub mod web;

pub use cache::{CacheEntry, CacheStore, RefreshPermit};
pub use config::Config;
pub use error::{GelrssError, Result};
pub use feed::{FeedConfig, FeedConfigStore, FeedLoader};
pub use gelbooru::{GelbooruClient, PostRecord, PostSource};
pub use refresh::{RefreshOutcome, RefreshScheduler, Refresher};
pub use render::{render_feed, RenderContext};
pub use web::{AppState, WebServer};
