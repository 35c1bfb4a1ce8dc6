//! Upstream client for the Gelbooru post search API.

pub mod client;
pub mod types;

pub use client::{GelbooruClient, PostSource};
pub use types::{Credentials, PostRecord, DEFAULT_POST_LIMIT, DIAGNOSTIC_POST_LIMIT};
