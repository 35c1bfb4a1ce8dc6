//! Feed handlers: serving, diagnosing and forcing refreshes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feed::FeedConfig;
use crate::gelbooru::{PostRecord, DIAGNOSTIC_POST_LIMIT};
use crate::refresh::RefreshOutcome;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Content type of served feeds.
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

/// Cache status reported by the diagnostic endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    /// Whether a document has been produced.
    pub has_cache: bool,
    /// Time of the last successful refresh.
    pub last_update: Option<DateTime<Utc>>,
    /// Whether the next request would trigger a refresh.
    pub needs_update: bool,
    /// Whether a refresh cycle is running.
    pub is_updating: bool,
    /// Number of posts in the cached document.
    pub post_count: usize,
}

/// Response of `GET /test/:feed_id`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResponse {
    /// Feed id.
    pub artist_id: String,
    /// Resolved feed configuration.
    pub config: FeedConfig,
    /// Current cache status.
    pub cache: CacheStatus,
    /// Number of posts the diagnostic fetch returned.
    pub posts_found: usize,
    /// First fetched post.
    pub first_post: Option<PostRecord>,
    /// Diagnostic fetch failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

/// Response of `GET /refresh/:feed_id`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// Whether a new document was committed.
    pub success: bool,
    /// Feed id.
    pub artist_id: String,
    /// Human-readable summary.
    pub message: String,
    /// Detailed outcome.
    #[serde(flatten)]
    pub outcome: RefreshOutcome,
    /// Time of the last successful refresh.
    pub last_update: Option<DateTime<Utc>>,
    /// When the cached document goes stale.
    pub next_update: Option<DateTime<Utc>>,
}

/// Per-feed entry of `GET /refresh-all`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRefreshResult {
    /// Feed id.
    pub artist_id: String,
    /// Outcome for this feed.
    #[serde(flatten)]
    pub outcome: RefreshOutcome,
}

/// Response of `GET /refresh-all`.
#[derive(Debug, Serialize)]
pub struct RefreshAllResponse {
    /// Always true once every feed has been attempted.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Per-feed outcomes, in feed id order.
    pub results: Vec<FeedRefreshResult>,
}

fn outcome_message(outcome: &RefreshOutcome) -> String {
    match outcome {
        RefreshOutcome::Updated { post_count } => {
            format!("Cache updated successfully ({post_count} posts)")
        }
        RefreshOutcome::InProgress => "Refresh already in progress".to_string(),
        RefreshOutcome::NoPosts => "No posts found; cache left unchanged".to_string(),
        RefreshOutcome::Failed { error } => format!("Refresh failed: {error}"),
        RefreshOutcome::UnknownFeed => "Unknown feed".to_string(),
    }
}

/// GET /rss/:feed_id - Serve a feed, refreshing it first if stale.
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Path(feed_id): Path<String>,
) -> Result<Response, ApiError> {
    if !state.refresher.feeds().contains(&feed_id) {
        return Err(ApiError::UnknownFeed(feed_id));
    }

    if let Some(outcome) = state.refresher.refresh_if_stale(&feed_id).await {
        tracing::debug!("On-demand refresh of {}: {:?}", feed_id, outcome);
    }

    let content = state
        .refresher
        .cache()
        .get(&feed_id)
        .and_then(|entry| entry.content)
        .ok_or_else(|| ApiError::NoContent(feed_id.clone()))?;

    let max_age = state.interval_minutes().saturating_mul(60);
    let headers = [
        (header::CONTENT_TYPE, RSS_CONTENT_TYPE.to_string()),
        (header::CACHE_CONTROL, format!("public, max-age={max_age}")),
    ];

    Ok((headers, content).into_response())
}

/// GET /test/:feed_id - Configuration, cache status and a small upstream fetch.
pub async fn test_feed(
    State(state): State<Arc<AppState>>,
    Path(feed_id): Path<String>,
) -> Result<Json<TestResponse>, ApiError> {
    let refresher = &state.refresher;
    let config = refresher
        .feeds()
        .get(&feed_id)
        .cloned()
        .ok_or_else(|| ApiError::UnknownFeed(feed_id.clone()))?;

    let (posts, fetch_error) = match refresher
        .source()
        .fetch_posts(&config.tag, DIAGNOSTIC_POST_LIMIT)
        .await
    {
        Ok(posts) => (posts, None),
        Err(e) => {
            tracing::warn!("Diagnostic fetch for {} failed: {}", feed_id, e);
            (Vec::new(), Some(e.to_string()))
        }
    };

    let entry = refresher.cache().get(&feed_id).unwrap_or_default();
    let cache = CacheStatus {
        has_cache: entry.has_content(),
        last_update: entry.last_update,
        needs_update: refresher.cache().needs_refresh(&feed_id),
        is_updating: entry.in_progress,
        post_count: entry.post_count,
    };

    Ok(Json(TestResponse {
        artist_id: feed_id,
        config,
        cache,
        posts_found: posts.len(),
        first_post: posts.into_iter().next(),
        fetch_error,
    }))
}

/// GET /refresh/:feed_id - Force a refresh cycle.
pub async fn refresh_feed(
    State(state): State<Arc<AppState>>,
    Path(feed_id): Path<String>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let outcome = state.refresher.try_refresh(&feed_id).await?;
    if outcome == RefreshOutcome::UnknownFeed {
        return Err(ApiError::UnknownFeed(feed_id));
    }

    let cache = state.refresher.cache();
    Ok(Json(RefreshResponse {
        success: outcome.is_updated(),
        message: outcome_message(&outcome),
        last_update: cache.get(&feed_id).and_then(|entry| entry.last_update),
        next_update: cache.next_update(&feed_id),
        artist_id: feed_id,
        outcome,
    }))
}

/// GET /refresh-all - Force a refresh cycle for every feed.
pub async fn refresh_all(State(state): State<Arc<AppState>>) -> Json<RefreshAllResponse> {
    let results = state
        .refresher
        .refresh_all()
        .await
        .into_iter()
        .map(|(artist_id, outcome)| FeedRefreshResult { artist_id, outcome })
        .collect::<Vec<_>>();

    let updated = results.iter().filter(|r| r.outcome.is_updated()).count();
    Json(RefreshAllResponse {
        success: true,
        message: format!(
            "Update of all feeds completed ({updated}/{} updated)",
            results.len()
        ),
        results,
    })
}
