use castquiz_backend::config::{DirectoryConfig, SocialConfig};
use castquiz_backend::services::FriendDirectory;
use castquiz_backend::social::{NeynarClient, SocialError, SocialGraph};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_test::{assert_err, assert_ok};

/// Canned HTTP response
struct Reply {
    status: u16,
    body: String,
}

impl Reply {
    fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Serve one reply per connection, in order; resolves to the raw request heads
async fn stub_server(replies: Vec<Reply>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for reply in replies {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            requests.push(String::from_utf8_lossy(&head).to_string());

            let response = format!(
                "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                reply.status,
                reply.body.len(),
                reply.body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        requests
    });

    (format!("http://{}", addr), handle)
}

fn client(base_url: &str) -> NeynarClient {
    let config = SocialConfig {
        api_key: "NEYNAR_TEST_KEY".to_string(),
        base_url: base_url.to_string(),
        request_timeout_secs: 1,
    };
    NeynarClient::new(&config).unwrap()
}

const FOLLOWING_PAGE: &str = r#"{
    "users": [
        {"object": "follow", "user": {"fid": 3, "username": "dwr", "display_name": "Dan Romero", "pfp_url": "https://img/3.png"}},
        {"object": "follow", "user": {"fid": 2, "username": "v", "display_name": "Varun"}}
    ],
    "next": {"cursor": "eyJwYWdlIjoyfQ"}
}"#;

#[tokio::test]
async fn test_list_friends_sends_key_and_parses_page() {
    let (url, server) = stub_server(vec![Reply::ok(FOLLOWING_PAGE)]).await;

    let page = assert_ok!(client(&url).list_friends(194, Some("abc"), 50).await);
    assert_eq!(page.friends.len(), 2);
    assert_eq!(page.friends[0].username, "dwr");
    assert_eq!(page.friends[0].avatar_url, "https://img/3.png");
    assert_eq!(page.next_cursor.as_deref(), Some("eyJwYWdlIjoyfQ"));

    let requests = server.await.unwrap();
    let head = requests[0].to_lowercase();
    assert!(head.starts_with("get /v2/farcaster/following?"));
    assert!(head.contains("fid=194"));
    assert!(head.contains("limit=50"));
    assert!(head.contains("cursor=abc"));
    assert!(head.contains("x-api-key: neynar_test_key"));
}

#[tokio::test]
async fn test_list_friends_without_cursor_ends_pagination() {
    let body = r#"{"users": [{"user": {"fid": 9, "username": "nine"}}], "next": {"cursor": null}}"#;
    let (url, _server) = stub_server(vec![Reply::ok(body)]).await;

    let page = assert_ok!(client(&url).list_friends(1, None, 100).await);
    assert_eq!(page.friends[0].display_name, "nine");
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_list_posts_parses_casts() {
    let body = r#"{"casts": [
        {"hash": "0xfeed", "text": "shipping a new frame today, come try it", "timestamp": "2024-05-01T12:00:00.000Z", "author": {"fid": 3}},
        {"hash": "0xbeef", "text": "gm", "timestamp": "2024-05-02T08:30:00Z"}
    ]}"#;
    let (url, server) = stub_server(vec![Reply::ok(body)]).await;

    let posts = assert_ok!(client(&url).list_posts(3, 10).await);
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "0xfeed");
    assert_eq!(posts[1].text, "gm");

    let requests = server.await.unwrap();
    assert!(requests[0].contains("/v2/farcaster/feed/user/casts?"));
    assert!(requests[0].contains("include_replies=false"));
}

#[tokio::test]
async fn test_error_status_is_transport_failure() {
    let (url, _server) = stub_server(vec![Reply::status(500, r#"{"message":"boom"}"#)]).await;

    let err = assert_err!(client(&url).list_posts(3, 10).await);
    match err {
        SocialError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_key_is_config_error() {
    let (url, _server) = stub_server(vec![Reply::status(401, "{}")]).await;

    let err = assert_err!(client(&url).list_friends(1, None, 10).await);
    assert!(matches!(err, SocialError::Config(_)));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let (url, _server) = stub_server(vec![Reply::ok("not json")]).await;

    let err = assert_err!(client(&url).list_posts(3, 10).await);
    assert!(matches!(err, SocialError::Decode(_)));
}

#[tokio::test]
async fn test_unresponsive_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let _hold = tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let err = assert_err!(client(&url).list_posts(3, 10).await);
    assert!(matches!(err, SocialError::Timeout));
}

#[tokio::test]
async fn test_directory_over_http() {
    let second_page = r#"{"users": [
        {"user": {"fid": 2, "username": "v", "display_name": "Varun"}},
        {"user": {"fid": 5, "username": "ted", "display_name": "Ted"}}
    ], "next": {"cursor": ""}}"#;
    let (url, server) = stub_server(vec![Reply::ok(FOLLOWING_PAGE), Reply::ok(second_page)]).await;

    let directory = FriendDirectory::new(
        Arc::new(client(&url)),
        &DirectoryConfig::default(),
        &SocialConfig::default(),
    );

    let friends = assert_ok!(directory.load_friends(194, None).await);
    let ids: Vec<u64> = friends.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![3, 2, 5]);

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].contains("cursor=eyJwYWdlIjoyfQ"));
}
