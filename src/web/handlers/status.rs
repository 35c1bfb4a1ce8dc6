//! Human-readable status page.

use std::fmt::Write;
use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::render::GENERATOR;
use crate::web::handlers::AppState;

/// Escape text for inclusion in HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn configured(flag: bool) -> &'static str {
    if flag {
        "Configured"
    } else {
        "Not configured"
    }
}

/// GET / - Global status and the list of configured feeds.
pub async fn status_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_status(&state))
}

fn render_status(state: &AppState) -> String {
    let feeds = state.refresher.feeds();
    let cache = state.refresher.cache();

    let mut rows = String::new();
    for (feed_id, config) in feeds.iter() {
        let entry = cache.get(feed_id).unwrap_or_default();
        let last_update = entry
            .last_update
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "Never".to_string());
        let next_update = cache
            .next_update(feed_id)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        let id = escape_html(feed_id);

        let _ = write!(
            rows,
            "<tr><td><strong>{name}</strong></td><td><code>{tag}</code></td>\
             <td>{cached}</td><td>{posts}</td><td>{last}</td><td>{next}</td><td>{status}</td>\
             <td><a href=\"/rss/{id}\">RSS</a> | <a href=\"/test/{id}\">Test</a> | \
             <a href=\"/refresh/{id}\">Refresh</a></td></tr>\n",
            name = escape_html(&config.artist_name),
            tag = escape_html(&config.tag),
            cached = if entry.has_content() { "yes" } else { "no" },
            posts = entry.post_count,
            last = last_update,
            next = next_update,
            status = if entry.in_progress { "updating" } else { "idle" },
        );
    }

    let feed_section = if feeds.is_empty() {
        "<p>No feeds configured. Add JSON files to the feed configuration directory.</p>".to_string()
    } else {
        format!(
            "<table>\n<thead><tr><th>Artist</th><th>Tag</th><th>Cache</th><th>Posts</th>\
             <th>Last Update</th><th>Next Update</th><th>Status</th><th>Actions</th></tr></thead>\n\
             <tbody>\n{rows}</tbody>\n</table>\n<p><a href=\"/refresh-all\">Update all feeds</a></p>"
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 40px; }}
table {{ border-collapse: collapse; width: 100%; margin: 20px 0; }}
th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
th {{ background-color: #f2f2f2; }}
</style>
</head>
<body>
<h1>{title}</h1>
<h2>Global Status</h2>
<p><strong>Configured Feeds:</strong> {count}</p>
<p><strong>Base URL:</strong> {base_url}</p>
<p><strong>Update Interval:</strong> {interval} minutes</p>
<p><strong>API Key:</strong> {api_key}</p>
<p><strong>User ID:</strong> {user_id}</p>
<h2>Available Feeds</h2>
{feed_section}
<h2>Adding a Feed</h2>
<p>Create <code>&lt;feed-id&gt;.json</code> in the feed configuration directory:</p>
<pre>{{
  "ARTIST_NAME": "Artist Name",
  "GELBOORU_TAG": "artist_tag",
  "ICON_URL": "https://example.com/icon.png",
  "FEED_TITLE": "Posts of Artist from Gelbooru"
}}</pre>
<p>Restart the server, then open <code>/rss/&lt;feed-id&gt;</code>.</p>
</body>
</html>
"#,
        title = escape_html(GENERATOR),
        count = feeds.len(),
        base_url = escape_html(state.base_url()),
        interval = state.interval_minutes(),
        api_key = configured(state.api_key_configured),
        user_id = configured(state.user_id_configured),
    )
}
