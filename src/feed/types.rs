//! Feed configuration types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GelrssError, Result};

/// Listing page used when a feed does not configure its own link.
const LIST_URL: &str = "https://gelbooru.com/index.php?page=post&s=list&tags=";

/// On-disk shape of one feed file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedDefinition {
    /// Upstream tag query (required).
    #[serde(rename = "GELBOORU_TAG", default)]
    pub tag: Option<String>,
    /// Display name of the artist.
    #[serde(rename = "ARTIST_NAME", default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    /// Channel image URL.
    #[serde(rename = "ICON_URL", default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Channel title.
    #[serde(rename = "FEED_TITLE", default, skip_serializing_if = "Option::is_none")]
    pub feed_title: Option<String>,
    /// Channel link.
    #[serde(rename = "FEED_LINK", default, skip_serializing_if = "Option::is_none")]
    pub feed_link: Option<String>,
}

impl FeedDefinition {
    /// Create a definition with only the tag query set.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// Set the artist name.
    pub fn with_artist_name(mut self, name: impl Into<String>) -> Self {
        self.artist_name = Some(name.into());
        self
    }

    /// Set the icon URL.
    pub fn with_icon_url(mut self, url: impl Into<String>) -> Self {
        self.icon_url = Some(url.into());
        self
    }
}

/// Resolved, immutable metadata for one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedConfig {
    /// Display name of the artist, used as item author.
    #[serde(rename = "ARTIST_NAME")]
    pub artist_name: String,
    /// Upstream tag query. Never empty.
    #[serde(rename = "GELBOORU_TAG")]
    pub tag: String,
    /// Channel image URL, if any.
    #[serde(rename = "ICON_URL")]
    pub icon_url: Option<String>,
    /// Channel title.
    #[serde(rename = "FEED_TITLE")]
    pub feed_title: String,
    /// Channel link.
    #[serde(rename = "FEED_LINK")]
    pub feed_link: String,
}

impl FeedConfig {
    /// Resolve a definition into a config, filling defaults from the feed id and tag.
    pub fn resolve(feed_id: &str, definition: FeedDefinition) -> Result<Self> {
        let tag = definition
            .tag
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GelrssError::Config("GELBOORU_TAG is required".to_string()))?;

        let artist_name = non_empty(definition.artist_name).unwrap_or_else(|| feed_id.to_string());
        let feed_title = non_empty(definition.feed_title)
            .unwrap_or_else(|| format!("Posts of {artist_name} from Gelbooru"));
        let feed_link = non_empty(definition.feed_link)
            .unwrap_or_else(|| format!("{LIST_URL}{}+", tag.replace(' ', "+")));

        Ok(Self {
            artist_name,
            icon_url: non_empty(definition.icon_url),
            feed_title,
            feed_link,
            tag,
        })
    }

    /// Shorthand for a config with only the tag query set.
    pub fn new(feed_id: &str, tag: impl Into<String>) -> Result<Self> {
        Self::resolve(feed_id, FeedDefinition::new(tag))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Read-only mapping from feed id to feed metadata.
#[derive(Debug, Clone, Default)]
pub struct FeedConfigStore {
    feeds: BTreeMap<String, FeedConfig>,
}

impl FeedConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a feed by id.
    pub fn get(&self, feed_id: &str) -> Option<&FeedConfig> {
        self.feeds.get(feed_id)
    }

    /// Whether a feed id is configured.
    pub fn contains(&self, feed_id: &str) -> bool {
        self.feeds.contains_key(feed_id)
    }

    /// All feed ids, in order.
    pub fn ids(&self) -> Vec<String> {
        self.feeds.keys().cloned().collect()
    }

    /// Iterate over `(id, config)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FeedConfig)> {
        self.feeds.iter()
    }

    /// Number of configured feeds.
    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    /// Whether no feed is configured.
    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}

impl FromIterator<(String, FeedConfig)> for FeedConfigStore {
    fn from_iter<I: IntoIterator<Item = (String, FeedConfig)>>(iter: I) -> Self {
        Self {
            feeds: iter.into_iter().collect(),
        }
    }
}
