//! RSS 2.0 document generation.

use chrono::Utc;
use rss::extension::atom::{AtomExtension, Link};
use rss::{Channel, Guid, Image, Item};

use super::date::{parse_created_at, to_rfc822};
use crate::error::{GelrssError, Result};
use crate::feed::FeedConfig;
use crate::gelbooru::PostRecord;

/// Prefix of every item guid.
pub const GUID_NAMESPACE: &str = "gelbooru";

/// Channel generator string.
pub const GENERATOR: &str = "Gelbooru RSS Generator v2.0";

/// Channel webmaster contact.
pub const WEBMASTER: &str = "admin@example.com (RSS Generator)";

/// Post page on the image board.
const POST_VIEW_URL: &str = "https://gelbooru.com/index.php?page=post&s=view&id=";

/// Settings shared by every rendered feed.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Public URL prefix, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Cache lifetime, published as the channel `ttl`.
    pub interval_minutes: u64,
}

impl RenderContext {
    /// Create a new render context.
    pub fn new(base_url: impl Into<String>, interval_minutes: u64) -> Self {
        Self {
            base_url: base_url.into(),
            interval_minutes,
        }
    }

    /// Self link of a feed.
    pub fn feed_url(&self, feed_id: &str) -> String {
        format!("{}/rss/{}", self.base_url.trim_end_matches('/'), feed_id)
    }
}

/// Render posts into an RSS document.
///
/// Returns `Ok(None)` for an empty post list: an empty feed is never produced.
pub fn render_feed(
    posts: &[PostRecord],
    config: &FeedConfig,
    feed_id: &str,
    ctx: &RenderContext,
) -> Result<Option<String>> {
    if posts.is_empty() {
        return Ok(None);
    }

    let items: Vec<Item> = posts
        .iter()
        .map(|post| render_item(post, config, feed_id))
        .collect();

    let mut self_link = Link::default();
    self_link.set_href(ctx.feed_url(feed_id));
    self_link.set_rel("self");
    self_link.set_mime_type(Some("application/rss+xml".to_string()));
    let mut atom = AtomExtension::default();
    atom.set_links(vec![self_link]);

    let mut channel = Channel::default();
    channel.set_title(config.feed_title.clone());
    channel.set_link(config.feed_link.clone());
    channel.set_description(format!(
        "{} - Powered by Gelbooru RSS Generator",
        config.feed_title
    ));
    channel.set_atom_ext(Some(atom));
    channel.set_generator(Some(GENERATOR.to_string()));
    channel.set_webmaster(Some(WEBMASTER.to_string()));
    channel.set_language(Some("en".to_string()));
    if let Some(icon_url) = &config.icon_url {
        let mut image = Image::default();
        image.set_url(icon_url.clone());
        image.set_title(config.feed_title.clone());
        image.set_link(config.feed_link.clone());
        channel.set_image(Some(image));
    }
    channel.set_last_build_date(Some(to_rfc822(&Utc::now())));
    channel.set_ttl(Some(ctx.interval_minutes.to_string()));
    channel.set_items(items);

    let bytes = channel
        .write_to(Vec::new())
        .map_err(|e| GelrssError::Render(format!("failed to write feed: {e}")))?;
    let xml = String::from_utf8(bytes)
        .map_err(|e| GelrssError::Render(format!("feed is not UTF-8: {e}")))?;

    Ok(Some(xml))
}

fn render_item(post: &PostRecord, config: &FeedConfig, feed_id: &str) -> Item {
    let title = post
        .title
        .clone()
        .unwrap_or_else(|| format!("Post {}", post.id));

    let mut guid = Guid::default();
    guid.set_value(format!("{GUID_NAMESPACE}:{feed_id}:{}", post.id));
    guid.set_permalink(false);

    let mut item = Item::default();
    item.set_title(Some(title));
    item.set_description(Some(format!(
        r#"<img src="{}" referrerpolicy="no-referrer"><br/>Tags: {}"#,
        post.file_url,
        normalize_tags(&post.tags)
    )));
    item.set_link(Some(format!("{POST_VIEW_URL}{}", post.id)));
    item.set_guid(Some(guid));
    item.set_pub_date(parse_created_at(&post.created_at).map(|dt| to_rfc822(&dt)));
    item.set_author(Some(config.artist_name.clone()));
    item
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn normalize_tags(tags: &str) -> String {
    tags.split_whitespace().collect::<Vec<_>>().join(" ")
}
