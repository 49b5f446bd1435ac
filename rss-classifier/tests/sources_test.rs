mod common;

use common::init_tracing;
use rss_classifier::types::{AggregatorError, FetchConfig, LiveSourceSpec};
use rss_classifier::{FeedSource, Fetcher, HttpFeedSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Local</title>
<item><title>Markets rally</title><link>http://local.test/1</link><description>Body</description></item>
<item><title>Cup match</title><link>http://local.test/2</link></item>
</channel></rss>"#;

/// Serve `status` + `body` to every connection on an ephemeral port.
async fn serve(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}/feed.xml", addr)
}

/// Raw HTTP/1.1 response. Without `Content-Length` the body is delimited by
/// closing the connection.
fn raw_response(status: &str, body: &[u8], content_length: bool) -> Vec<u8> {
    let mut head = format!("HTTP/1.1 {}\r\nContent-Type: application/rss+xml\r\n", status);
    if content_length {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    head.push_str("Connection: close\r\n\r\n");

    let mut response = head.into_bytes();
    response.extend_from_slice(body);
    response
}

/// Serve `responses` in order, one per connection; the last one repeats.
/// Returns the URL and a counter of connections accepted.
async fn serve_sequence(responses: Vec<Vec<u8>>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let response = &responses[n.min(responses.len() - 1)];
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}/feed.xml", addr), hits)
}

/// A valid RSS document padded past `bytes` with an XML comment.
fn oversized_feed(bytes: usize) -> Vec<u8> {
    let head = RSS.trim_end_matches("</channel></rss>");
    let mut body = head.as_bytes().to_vec();
    body.extend_from_slice(b"<!--");
    body.extend(std::iter::repeat(b'x').take(bytes));
    body.extend_from_slice(b"-->\n</channel></rss>");
    body
}

fn config() -> FetchConfig {
    FetchConfig {
        user_agent: "RSS-Classifier-Test/1.0".to_string(),
        timeout_seconds: 5,
        ..FetchConfig::default()
    }
}

#[tokio::test]
async fn pulls_and_parses_a_served_feed() {
    init_tracing();
    let url = serve("200 OK", RSS).await;

    let source = HttpFeedSource::new(config()).unwrap();
    let entries = source.pull(&LiveSourceSpec::new(url)).await.unwrap();

    let titles: Vec<_> = entries.iter().filter_map(|e| e.title.as_deref()).collect();
    assert_eq!(titles, vec!["Markets rally", "Cup match"]);
}

#[tokio::test]
async fn http_error_status_is_a_fetch_failure() {
    init_tracing();
    let url = serve("404 Not Found", "gone").await;

    let source = HttpFeedSource::new(config()).unwrap();
    let err = source.pull(&LiveSourceSpec::new(url)).await.unwrap_err();
    assert!(matches!(err, AggregatorError::FetchFailed { .. }), "{}", err);
}

#[tokio::test]
async fn unreachable_host_is_a_fetch_failure() {
    init_tracing();
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let source = HttpFeedSource::new(config()).unwrap();
    let err = source
        .pull(&LiveSourceSpec::new(format!("http://127.0.0.1:{}/rss", port)))
        .await
        .unwrap_err();
    assert!(matches!(err, AggregatorError::FetchFailed { .. }), "{}", err);
}

#[tokio::test]
async fn non_feed_body_is_a_parse_error() {
    init_tracing();
    let url = serve("200 OK", "<html><body>maintenance</body></html>").await;

    let source = HttpFeedSource::new(config()).unwrap();
    let err = source.pull(&LiveSourceSpec::new(url)).await.unwrap_err();
    assert!(matches!(err, AggregatorError::Parse(_)), "{}", err);
}

#[tokio::test]
async fn body_without_content_length_is_capped_while_streaming() {
    init_tracing();
    let body = oversized_feed(3 * 1024 * 1024);
    let (url, _) = serve_sequence(vec![raw_response("200 OK", &body, false)]).await;

    let source = HttpFeedSource::new(FetchConfig {
        max_feed_size_mb: 1,
        ..config()
    })
    .unwrap();
    let err = source.pull(&LiveSourceSpec::new(url)).await.unwrap_err();
    match err {
        AggregatorError::FetchFailed { reason, .. } => {
            assert!(reason.contains("too large"), "{}", reason)
        }
        other => panic!("expected FetchFailed, got {}", other),
    }
}

#[tokio::test]
async fn content_length_one_byte_over_the_limit_is_rejected() {
    init_tracing();
    let body = vec![b' '; 1024 * 1024 + 1];
    let (url, _) = serve_sequence(vec![raw_response("200 OK", &body, true)]).await;

    let fetcher = Fetcher::new(FetchConfig {
        max_feed_size_mb: 1,
        ..config()
    })
    .unwrap();
    let result = fetcher.fetch_feed(&url).await.unwrap();
    assert!(!result.success);
    assert!(result.content.is_none());
    assert!(result.error.unwrap().contains("too large"));
}

#[tokio::test]
async fn body_under_the_limit_without_content_length_is_read_in_full() {
    init_tracing();
    let (url, _) = serve_sequence(vec![raw_response("200 OK", RSS.as_bytes(), false)]).await;

    let fetcher = Fetcher::new(config()).unwrap();
    let result = fetcher.fetch_feed(&url).await.unwrap();
    assert!(result.success);
    assert_eq!(result.http_status, Some(200));
    assert_eq!(result.content.as_deref(), Some(RSS.as_bytes()));
}

#[tokio::test]
async fn retry_recovers_from_a_transient_server_error() {
    init_tracing();
    let (url, hits) = serve_sequence(vec![
        raw_response("503 Service Unavailable", b"busy", true),
        raw_response("200 OK", RSS.as_bytes(), true),
    ])
    .await;

    let source = HttpFeedSource::new(FetchConfig {
        max_retries: 1,
        retry_delay_ms: 10,
        ..config()
    })
    .unwrap();
    let entries = source.pull(&LiveSourceSpec::new(url)).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn without_retries_a_transient_error_fails_the_source() {
    init_tracing();
    let (url, hits) = serve_sequence(vec![
        raw_response("503 Service Unavailable", b"busy", true),
        raw_response("200 OK", RSS.as_bytes(), true),
    ])
    .await;

    let source = HttpFeedSource::new(config()).unwrap();
    let err = source.pull(&LiveSourceSpec::new(url)).await.unwrap_err();

    match err {
        AggregatorError::FetchFailed { reason, .. } => {
            assert!(reason.contains("last status 503"), "{}", reason)
        }
        other => panic!("expected FetchFailed, got {}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn only_http_urls_are_accepted() {
    assert!(Fetcher::validate_url("https://feeds.bbci.co.uk/news/rss.xml").is_ok());
    assert!(matches!(
        Fetcher::validate_url("ftp://example.com/feed"),
        Err(AggregatorError::UnsupportedUrl { .. })
    ));
    assert!(matches!(
        Fetcher::validate_url("not a url"),
        Err(AggregatorError::InvalidUrl(_))
    ));
}
