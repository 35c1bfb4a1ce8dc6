//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gelrss::feed::{FeedConfig, FeedConfigStore, FeedDefinition};
use gelrss::{CacheStore, GelrssError, PostRecord, PostSource, Refresher, RenderContext};
use tokio::sync::Notify;

/// Public URL used by every test feed.
pub const BASE_URL: &str = "http://localhost:3000";

/// Post source with scripted results, a call counter and an optional gate.
pub struct FakeSource {
    result: Mutex<Result<Vec<PostRecord>, String>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
    started: Notify,
}

impl FakeSource {
    /// Source returning the given posts.
    pub fn with_posts(posts: Vec<PostRecord>) -> Arc<Self> {
        Arc::new(Self::new(Ok(posts), None))
    }

    /// Source failing every call.
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self::new(Err(message.to_string()), None))
    }

    /// Source that blocks every call until `gate` is notified.
    pub fn gated(posts: Vec<PostRecord>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self::new(Ok(posts), Some(gate)))
    }

    fn new(result: Result<Vec<PostRecord>, String>, gate: Option<Arc<Notify>>) -> Self {
        Self {
            result: Mutex::new(result),
            calls: AtomicUsize::new(0),
            gate,
            started: Notify::new(),
        }
    }

    /// Replace the scripted result.
    pub fn set_posts(&self, posts: Vec<PostRecord>) {
        *self.result.lock().unwrap() = Ok(posts);
    }

    /// Make subsequent calls fail.
    pub fn set_failing(&self, message: &str) {
        *self.result.lock().unwrap() = Err(message.to_string());
    }

    /// Number of upstream calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Wait until a call has started.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }
}

#[async_trait]
impl PostSource for FakeSource {
    async fn fetch_posts(&self, _tags: &str, limit: u32) -> gelrss::Result<Vec<PostRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let result = self.result.lock().unwrap().clone();
        result
            .map(|posts| posts.into_iter().take(limit as usize).collect())
            .map_err(GelrssError::Upstream)
    }
}

/// A post with every field filled in.
pub fn post(id: u64) -> PostRecord {
    PostRecord::new(id)
        .with_created_at("Sat Jan 13 12:34:56 -0600 2024")
        .with_file_url(format!("https://img.example.com/{id}.jpg"))
        .with_tags(format!("tag_{id}  solo"))
}

/// Feed store containing feeds `foo` and `bar`.
pub fn feeds() -> FeedConfigStore {
    let foo = FeedConfig::resolve("foo", FeedDefinition::new("foo_tag").with_artist_name("Foo"))
        .unwrap();
    let bar = FeedConfig::new("bar", "bar_tag").unwrap();
    [("foo".to_string(), foo), ("bar".to_string(), bar)]
        .into_iter()
        .collect()
}

/// Refresher over [`feeds`] with a ten minute interval.
pub fn refresher(source: Arc<FakeSource>) -> Refresher {
    Refresher::new(
        Arc::new(feeds()),
        Arc::new(CacheStore::new(10)),
        source,
        RenderContext::new(BASE_URL, 10),
    )
}
