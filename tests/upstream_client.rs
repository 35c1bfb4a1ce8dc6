//! Upstream client tests against a mock search endpoint.

use gelrss::config::GelbooruConfig;
use gelrss::gelbooru::{GelbooruClient, PostSource, DEFAULT_POST_LIMIT, DIAGNOSTIC_POST_LIMIT};
use gelrss::GelrssError;
use mockito::{Matcher, Server};
use serde_json::json;

fn client_for(server: &Server, api_key: &str, user_id: &str) -> GelbooruClient {
    let config = GelbooruConfig {
        api_url: format!("{}/index.php", server.url()),
        api_key: api_key.to_string(),
        user_id: user_id.to_string(),
        request_timeout_secs: Some(5),
    };
    GelbooruClient::new(&config).expect("Failed to create client")
}

#[tokio::test]
async fn test_fetch_posts_decodes_wrapped_response() {
    let mut server = Server::new_async().await;
    let body = json!({
        "@attributes": {"limit": 20, "offset": 0, "count": 2},
        "post": [
            {
                "id": 101,
                "created_at": "Sat Jan 13 12:34:56 -0600 2024",
                "file_url": "https://img.example.com/101.jpg",
                "tags": "foo_tag  solo",
                "title": "",
                "score": 12
            },
            {
                "id": 100,
                "created_at": "Fri Jan 12 08:00:00 -0600 2024",
                "file_url": "https://img.example.com/100.png",
                "tags": "foo_tag",
                "title": "Sketch"
            }
        ]
    });
    let mock = server
        .mock("GET", "/index.php")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "dapi".into()),
            Matcher::UrlEncoded("s".into(), "post".into()),
            Matcher::UrlEncoded("q".into(), "index".into()),
            Matcher::UrlEncoded("json".into(), "1".into()),
            Matcher::UrlEncoded("tags".into(), "foo_tag rating:general".into()),
            Matcher::UrlEncoded("limit".into(), DEFAULT_POST_LIMIT.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = client_for(&server, "", "");
    let posts = client
        .fetch_posts("foo_tag rating:general", DEFAULT_POST_LIMIT)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, 101);
    assert_eq!(posts[0].title, None);
    assert_eq!(posts[0].file_url, "https://img.example.com/101.jpg");
    assert_eq!(posts[1].title.as_deref(), Some("Sketch"));
}

#[tokio::test]
async fn test_anonymous_query_has_no_credentials() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/index.php")
        .match_query(Matcher::Exact(
            "page=dapi&s=post&q=index&json=1&tags=foo&limit=5".into(),
        ))
        .with_status(200)
        .with_body(json!({"post": []}).to_string())
        .create_async()
        .await;

    // A lone user id is not sent.
    let client = client_for(&server, "", "12345");
    assert!(!client.has_credentials());
    let posts = client.fetch_posts("foo", DIAGNOSTIC_POST_LIMIT).await.unwrap();

    mock.assert_async().await;
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_credentials_are_sent_together() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/index.php")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api_key".into(), "secret".into()),
            Matcher::UrlEncoded("user_id".into(), "12345".into()),
            Matcher::UrlEncoded("tags".into(), "foo".into()),
        ]))
        .with_status(200)
        .with_body(json!([{"id": 1, "tags": "foo"}]).to_string())
        .create_async()
        .await;

    let client = client_for(&server, "secret", "12345");
    assert!(client.has_credentials());
    let posts = client.fetch_posts("foo", DEFAULT_POST_LIMIT).await.unwrap();

    mock.assert_async().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, 1);
}

#[tokio::test]
async fn test_missing_post_list_is_empty() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/index.php")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"@attributes": {"count": 0}}).to_string())
        .create_async()
        .await;

    let posts = client_for(&server, "", "")
        .fetch_posts("nobody", DEFAULT_POST_LIMIT)
        .await
        .unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_empty_body_is_empty() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/index.php")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let posts = client_for(&server, "", "")
        .fetch_posts("nobody", DEFAULT_POST_LIMIT)
        .await
        .unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_http_error_is_upstream_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/index.php")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("oops")
        .create_async()
        .await;

    let err = client_for(&server, "", "")
        .fetch_posts("foo", DEFAULT_POST_LIMIT)
        .await
        .unwrap_err();
    assert!(matches!(err, GelrssError::Upstream(ref msg) if msg.contains("500")));
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/index.php")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let err = client_for(&server, "", "")
        .fetch_posts("foo", DEFAULT_POST_LIMIT)
        .await
        .unwrap_err();
    assert!(matches!(err, GelrssError::Decode(_)));
}
