//! HTTP client for the post search endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::types::{Credentials, PostRecord, SearchResponse};
use crate::config::GelbooruConfig;
use crate::error::{GelrssError, Result};

/// User agent string for upstream requests.
const USER_AGENT: &str = "Gelbooru-RSS-Generator/2.0";

/// Source of posts for a tag query.
///
/// One call performs at most one upstream request; callers decide whether
/// and when to try again.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch up to `limit` of the newest posts matching `tags`.
    async fn fetch_posts(&self, tags: &str, limit: u32) -> Result<Vec<PostRecord>>;
}

/// Post source backed by the Gelbooru JSON API.
pub struct GelbooruClient {
    client: Client,
    api_url: url::Url,
    credentials: Option<Credentials>,
}

impl GelbooruClient {
    /// Create a client from the upstream configuration.
    pub fn new(config: &GelbooruConfig) -> Result<Self> {
        let api_url = url::Url::parse(&config.api_url)
            .map_err(|e| GelrssError::Config(format!("invalid API URL: {e}")))?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GelrssError::Upstream(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            credentials: Credentials::from_parts(&config.api_key, &config.user_id),
        })
    }

    /// Whether credentials will be attached to requests.
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Query parameters for a search.
    pub fn query_params(&self, tags: &str, limit: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", "dapi".to_string()),
            ("s", "post".to_string()),
            ("q", "index".to_string()),
            ("json", "1".to_string()),
            ("tags", tags.to_string()),
            ("limit", limit.to_string()),
        ];

        if let Some(credentials) = &self.credentials {
            params.push(("api_key", credentials.api_key.clone()));
            params.push(("user_id", credentials.user_id.clone()));
        }

        params
    }
}

#[async_trait]
impl PostSource for GelbooruClient {
    async fn fetch_posts(&self, tags: &str, limit: u32) -> Result<Vec<PostRecord>> {
        debug!("Searching posts for {:?} (limit {})", tags, limit);

        let response = self
            .client
            .get(self.api_url.clone())
            .query(&self.query_params(tags, limit))
            .send()
            .await
            .map_err(|e| GelrssError::Upstream(format!("failed to fetch posts: {e}")))?;

        if !response.status().is_success() {
            return Err(GelrssError::Upstream(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GelrssError::Upstream(format!("failed to read response: {e}")))?;

        parse_posts(&bytes)
    }
}

/// Decode a search response body. An empty body means no match.
fn parse_posts(bytes: &[u8]) -> Result<Vec<PostRecord>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let response: SearchResponse = serde_json::from_slice(bytes)
        .map_err(|e| GelrssError::Decode(format!("invalid search response: {e}")))?;
    Ok(response.into_posts())
}
