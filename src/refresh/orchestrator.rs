//! Refresh orchestration: fetch, render and commit one feed at a time.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStore, RefreshPermit};
use crate::error::{GelrssError, Result};
use crate::feed::{FeedConfig, FeedConfigStore};
use crate::gelbooru::{PostSource, DEFAULT_POST_LIMIT};
use crate::render::{render_feed, RenderContext};

/// Result of one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RefreshOutcome {
    /// A new document was committed.
    #[serde(rename_all = "camelCase")]
    Updated {
        /// Number of posts in the document.
        post_count: usize,
    },
    /// Another cycle already owned the feed; nothing was fetched.
    InProgress,
    /// Upstream returned no posts; the cache was left unchanged.
    NoPosts,
    /// Fetching or rendering failed; the cache was left unchanged.
    Failed {
        /// Failure description.
        error: String,
    },
    /// The feed id is not configured.
    UnknownFeed,
}

impl RefreshOutcome {
    /// Whether a new document was committed.
    pub fn is_updated(&self) -> bool {
        matches!(self, RefreshOutcome::Updated { .. })
    }
}

/// Drives refresh cycles for every configured feed.
///
/// Cheap to clone; all clones share the same feeds, cache and post source.
#[derive(Clone)]
pub struct Refresher {
    feeds: Arc<FeedConfigStore>,
    cache: Arc<CacheStore>,
    source: Arc<dyn PostSource>,
    render: Arc<RenderContext>,
}

impl Refresher {
    /// Create a refresher.
    pub fn new(
        feeds: Arc<FeedConfigStore>,
        cache: Arc<CacheStore>,
        source: Arc<dyn PostSource>,
        render: RenderContext,
    ) -> Self {
        Self {
            feeds,
            cache,
            source,
            render: Arc::new(render),
        }
    }

    /// Configured feeds.
    pub fn feeds(&self) -> &Arc<FeedConfigStore> {
        &self.feeds
    }

    /// Cache store.
    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Post source.
    pub fn source(&self) -> &Arc<dyn PostSource> {
        &self.source
    }

    /// Render settings.
    pub fn render_context(&self) -> &RenderContext {
        &self.render
    }

    /// Run a refresh cycle regardless of staleness.
    ///
    /// Returns [`RefreshOutcome::InProgress`] immediately if another cycle
    /// owns the feed. The cycle itself runs on its own task, so dropping the
    /// returned future does not cancel it. A task that dies without an
    /// outcome is reported as [`RefreshOutcome::Failed`].
    pub async fn refresh(&self, feed_id: &str) -> RefreshOutcome {
        self.try_refresh(feed_id)
            .await
            .unwrap_or_else(|e| RefreshOutcome::Failed {
                error: e.to_string(),
            })
    }

    /// Like [`refresh`](Self::refresh), but a task that panicked or was
    /// cancelled is returned as [`GelrssError::Task`].
    pub async fn try_refresh(&self, feed_id: &str) -> Result<RefreshOutcome> {
        let Some(config) = self.feeds.get(feed_id).cloned() else {
            error!("Configuration not found for feed {}", feed_id);
            return Ok(RefreshOutcome::UnknownFeed);
        };

        let Some(permit) = self.cache.try_begin(feed_id) else {
            info!("Refresh already in progress for {}", feed_id);
            return Ok(RefreshOutcome::InProgress);
        };

        let this = self.clone();
        let task = tokio::spawn(async move { this.run_cycle(permit, config).await });

        task.await.map_err(|e| {
            error!("Refresh task for {} failed: {}", feed_id, e);
            GelrssError::Task(e.to_string())
        })
    }

    /// Run a refresh cycle only if the cached document is missing or stale.
    ///
    /// Returns `None` when the cache was fresh and nothing was attempted.
    pub async fn refresh_if_stale(&self, feed_id: &str) -> Option<RefreshOutcome> {
        if !self.cache.needs_refresh(feed_id) {
            return None;
        }
        debug!("Cache expired for {}, refreshing", feed_id);
        Some(self.refresh(feed_id).await)
    }

    /// Force a refresh of every configured feed, one after another.
    pub async fn refresh_all(&self) -> Vec<(String, RefreshOutcome)> {
        let mut results = Vec::with_capacity(self.feeds.len());
        for feed_id in self.feeds.ids() {
            let outcome = self.refresh(&feed_id).await;
            results.push((feed_id, outcome));
        }
        results
    }

    /// Refresh every feed whose cache is stale.
    pub async fn sweep(&self) -> usize {
        let mut refreshed = 0;
        for feed_id in self.feeds.ids() {
            if let Some(outcome) = self.refresh_if_stale(&feed_id).await {
                if outcome.is_updated() {
                    refreshed += 1;
                }
            }
        }
        refreshed
    }

    /// Populate the cache once for every feed before serving.
    pub async fn warm_up(&self) {
        info!("Initializing caches for {} feed(s)", self.feeds.len());
        let results = self.refresh_all().await;
        let updated = results.iter().filter(|(_, o)| o.is_updated()).count();
        info!("{}/{} feed cache(s) initialized", updated, results.len());
    }

    async fn run_cycle(&self, permit: RefreshPermit, config: FeedConfig) -> RefreshOutcome {
        let feed_id = permit.feed_id().to_string();
        info!("Updating cache for {}", feed_id);

        let posts = match self.source.fetch_posts(&config.tag, DEFAULT_POST_LIMIT).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!("Failed to fetch posts for {}: {}", feed_id, e);
                return RefreshOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        match render_feed(&posts, &config, &feed_id, &self.render) {
            Ok(Some(document)) => {
                let post_count = posts.len();
                permit.commit(document, post_count);
                info!("Cache updated for {}: {} posts", feed_id, post_count);
                RefreshOutcome::Updated { post_count }
            }
            Ok(None) => {
                warn!("No posts found for {}", feed_id);
                RefreshOutcome::NoPosts
            }
            Err(e) => {
                error!("Failed to render feed {}: {}", feed_id, e);
                RefreshOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
