//! Upstream post search types.

use serde::{Deserialize, Deserializer, Serialize};

/// Number of posts fetched per refresh.
pub const DEFAULT_POST_LIMIT: u32 = 20;

/// Number of posts fetched by the diagnostic endpoint.
pub const DIAGNOSTIC_POST_LIMIT: u32 = 5;

/// A post returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostRecord {
    /// Post id.
    pub id: u64,
    /// Creation timestamp as sent by the API (e.g. `Sat Jan 13 12:34:56 -0600 2024`).
    #[serde(default)]
    pub created_at: String,
    /// Full-size image URL.
    #[serde(default)]
    pub file_url: String,
    /// Space-separated tag list.
    #[serde(default)]
    pub tags: String,
    /// Post title; empty titles are treated as absent.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub title: Option<String>,
}

impl PostRecord {
    /// Create a post with the given id and no other data.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            created_at: String::new(),
            file_url: String::new(),
            tags: String::new(),
            title: None,
        }
    }

    /// Set the creation timestamp.
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    /// Set the image URL.
    pub fn with_file_url(mut self, file_url: impl Into<String>) -> Self {
        self.file_url = file_url.into();
        self
    }

    /// Set the tag string.
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Search response body.
///
/// The JSON API wraps posts in an object whose `post` key is missing when
/// nothing matched; some deployments answer with a bare array instead.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchResponse {
    Wrapped {
        #[serde(default)]
        post: Vec<PostRecord>,
    },
    Bare(Vec<PostRecord>),
}

impl SearchResponse {
    pub(crate) fn into_posts(self) -> Vec<PostRecord> {
        match self {
            SearchResponse::Wrapped { post } => post,
            SearchResponse::Bare(posts) => posts,
        }
    }
}

/// API credentials, sent only as a complete pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API key.
    pub api_key: String,
    /// User id.
    pub user_id: String,
}

impl Credentials {
    /// Build credentials if both halves are present and non-empty.
    pub fn from_parts(api_key: &str, user_id: &str) -> Option<Self> {
        let api_key = api_key.trim();
        let user_id = user_id.trim();
        if api_key.is_empty() || user_id.is_empty() {
            return None;
        }
        Some(Self {
            api_key: api_key.to_string(),
            user_id: user_id.to_string(),
        })
    }
}
