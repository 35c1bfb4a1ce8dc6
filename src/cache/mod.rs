//! Per-feed cache of rendered documents.
//!
//! Each entry doubles as the refresh lock for its feed: the `in_progress`
//! flag is taken with [`CacheStore::begin_refresh`] and released by
//! [`CacheStore::commit`] or [`CacheStore::abort`]. [`RefreshPermit`] wraps
//! that pair so the flag is released on every exit path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Cached state of one feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Last successfully rendered document.
    #[serde(skip)]
    pub content: Option<String>,
    /// Time of the last successful refresh.
    pub last_update: Option<DateTime<Utc>>,
    /// Whether a refresh cycle currently owns this feed.
    #[serde(rename = "isUpdating")]
    pub in_progress: bool,
    /// Number of posts in the cached document.
    pub post_count: usize,
}

impl CacheEntry {
    /// Whether a document has been produced.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }
}

/// Shared store of cache entries keyed by feed id.
#[derive(Debug)]
pub struct CacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    interval: Duration,
}

impl CacheStore {
    /// Create a store whose entries go stale after `interval_minutes`.
    pub fn new(interval_minutes: u64) -> Self {
        let interval = i64::try_from(interval_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .unwrap_or_else(|| Duration::days(365));

        Self {
            entries: Mutex::new(HashMap::new()),
            interval,
        }
    }

    /// Staleness threshold.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the feed has no usable document or it is older than the interval.
    pub fn needs_refresh(&self, feed_id: &str) -> bool {
        self.needs_refresh_at(feed_id, Utc::now())
    }

    /// [`needs_refresh`](Self::needs_refresh) evaluated at `now`.
    pub fn needs_refresh_at(&self, feed_id: &str, now: DateTime<Utc>) -> bool {
        let entries = self.lock();
        match entries.get(feed_id) {
            Some(CacheEntry {
                content: Some(_),
                last_update: Some(last),
                ..
            }) => now.signed_duration_since(*last) >= self.interval,
            _ => true,
        }
    }

    /// Take the refresh lock for a feed.
    ///
    /// Returns `false` if another cycle already holds it; the caller must skip.
    pub fn begin_refresh(&self, feed_id: &str) -> bool {
        let mut entries = self.lock();
        let entry = entries.entry(feed_id.to_string()).or_default();
        if entry.in_progress {
            return false;
        }
        entry.in_progress = true;
        true
    }

    /// Store a rendered document and release the refresh lock.
    pub fn commit(&self, feed_id: &str, content: String, post_count: usize) {
        self.commit_at(feed_id, content, post_count, Utc::now());
    }

    /// [`commit`](Self::commit) with an explicit update time.
    pub fn commit_at(&self, feed_id: &str, content: String, post_count: usize, at: DateTime<Utc>) {
        let mut entries = self.lock();
        let entry = entries.entry(feed_id.to_string()).or_default();
        entry.content = Some(content);
        entry.last_update = Some(at);
        entry.post_count = post_count;
        entry.in_progress = false;
    }

    /// Release the refresh lock, leaving content and timestamp untouched.
    pub fn abort(&self, feed_id: &str) {
        if let Some(entry) = self.lock().get_mut(feed_id) {
            entry.in_progress = false;
        }
    }

    /// Snapshot of a feed's entry.
    pub fn get(&self, feed_id: &str) -> Option<CacheEntry> {
        self.lock().get(feed_id).cloned()
    }

    /// When the cached document goes stale, if there is one.
    pub fn next_update(&self, feed_id: &str) -> Option<DateTime<Utc>> {
        self.lock()
            .get(feed_id)
            .and_then(|entry| entry.last_update)
            .map(|last| last + self.interval)
    }

    /// Take the refresh lock as a guard that releases it when dropped.
    pub fn try_begin(self: &Arc<Self>, feed_id: &str) -> Option<RefreshPermit> {
        self.begin_refresh(feed_id).then(|| RefreshPermit {
            store: Arc::clone(self),
            feed_id: feed_id.to_string(),
            finished: false,
        })
    }
}

/// Ownership of one feed's refresh cycle.
///
/// Dropping the permit without calling [`commit`](Self::commit) aborts the
/// cycle.
#[derive(Debug)]
pub struct RefreshPermit {
    store: Arc<CacheStore>,
    feed_id: String,
    finished: bool,
}

impl RefreshPermit {
    /// Feed this permit belongs to.
    pub fn feed_id(&self) -> &str {
        &self.feed_id
    }

    /// Store the document and release the lock.
    pub fn commit(mut self, content: String, post_count: usize) {
        self.store.commit(&self.feed_id, content, post_count);
        self.finished = true;
    }
}

impl Drop for RefreshPermit {
    fn drop(&mut self) {
        if !self.finished {
            self.store.abort(&self.feed_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_unknown_feed_needs_refresh() {
        let store = CacheStore::new(10);
        assert!(store.needs_refresh("foo"));
        assert!(store.get("foo").is_none());
    }

    #[test]
    fn test_fresh_after_commit() {
        let store = CacheStore::new(10);
        assert!(store.begin_refresh("foo"));
        store.commit("foo", "<rss/>".to_string(), 2);

        assert!(!store.needs_refresh("foo"));
        let entry = store.get("foo").unwrap();
        assert_eq!(entry.content.as_deref(), Some("<rss/>"));
        assert_eq!(entry.post_count, 2);
        assert!(!entry.in_progress);
        assert!(entry.last_update.is_some());
    }

    #[test]
    fn test_stale_at_exact_interval() {
        let store = CacheStore::new(10);
        store.commit_at("foo", "<rss/>".to_string(), 1, t0());

        let just_before = t0() + Duration::minutes(10) - Duration::seconds(1);
        let exactly = t0() + Duration::minutes(10);

        assert!(!store.needs_refresh_at("foo", t0()));
        assert!(!store.needs_refresh_at("foo", just_before));
        assert!(store.needs_refresh_at("foo", exactly));
        assert!(store.needs_refresh_at("foo", exactly + Duration::minutes(5)));
    }

    #[test]
    fn test_entry_without_content_needs_refresh() {
        let store = CacheStore::new(10);
        assert!(store.begin_refresh("foo"));
        store.abort("foo");

        assert!(store.get("foo").is_some());
        assert!(store.needs_refresh("foo"));
    }

    #[test]
    fn test_begin_refresh_is_exclusive() {
        let store = CacheStore::new(10);
        assert!(store.begin_refresh("foo"));
        assert!(!store.begin_refresh("foo"));
        assert!(store.begin_refresh("bar"));

        store.abort("foo");
        assert!(store.begin_refresh("foo"));
        store.commit("foo", "<rss/>".to_string(), 1);
        assert!(store.begin_refresh("foo"));
    }

    #[test]
    fn test_abort_keeps_previous_content() {
        let store = CacheStore::new(10);
        store.commit_at("foo", "old".to_string(), 3, t0());

        assert!(store.begin_refresh("foo"));
        store.abort("foo");

        let entry = store.get("foo").unwrap();
        assert_eq!(entry.content.as_deref(), Some("old"));
        assert_eq!(entry.last_update, Some(t0()));
        assert_eq!(entry.post_count, 3);
        assert!(!entry.in_progress);
    }

    #[test]
    fn test_next_update() {
        let store = CacheStore::new(10);
        assert!(store.next_update("foo").is_none());

        store.commit_at("foo", "<rss/>".to_string(), 1, t0());
        assert_eq!(store.next_update("foo"), Some(t0() + Duration::minutes(10)));
    }

    #[test]
    fn test_permit_drop_aborts() {
        let store = Arc::new(CacheStore::new(10));
        {
            let permit = store.try_begin("foo").unwrap();
            assert_eq!(permit.feed_id(), "foo");
            assert!(store.try_begin("foo").is_none());
        }
        assert!(!store.get("foo").unwrap().in_progress);
        assert!(store.try_begin("foo").is_some());
    }

    #[test]
    fn test_permit_commit() {
        let store = Arc::new(CacheStore::new(10));
        let permit = store.try_begin("foo").unwrap();
        permit.commit("<rss/>".to_string(), 4);

        let entry = store.get("foo").unwrap();
        assert!(!entry.in_progress);
        assert_eq!(entry.post_count, 4);
        assert!(!store.needs_refresh("foo"));
    }

    #[test]
    fn test_concurrent_begin_single_winner() {
        let store = Arc::new(CacheStore::new(10));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.begin_refresh("foo"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
