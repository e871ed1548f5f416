use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use phishguard::config::{GenerativeConfig, RemoteMlConfig, ReputationConfig};
use phishguard::models::Subject;
use phishguard::signals::{GenerativeSource, RemoteMlSource, ReputationSource, SignalSource};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve the given HTTP responses to sequential connections, then stop
/// accepting. Returns the base URL and a counter of connections served.
async fn serve(responses: Vec<String>) -> (String, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicU32::new(0));

    let served = hits.clone();
    tokio::spawn(async move {
        for response in responses {
            let (mut stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            served.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf).await;
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (base_url, hits)
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

fn reputation_source(base_url: &str) -> ReputationSource {
    ReputationSource::new(&ReputationConfig {
        api_key: "vt-test-key".into(),
        base_url: Some(base_url.to_string()),
    })
}

fn generative_source(base_url: &str) -> GenerativeSource {
    GenerativeSource::new(&GenerativeConfig {
        api_key: "secret-key-123".into(),
        model: None,
        base_url: Some(base_url.to_string()),
    })
}

#[tokio::test]
async fn reputation_maps_submit_error_to_unavailable() {
    let (base_url, hits) = serve(vec![http_response("500 Internal Server Error", "{}")]).await;
    let source = reputation_source(&base_url);

    let outcome = source.query(&Subject::url("https://example.com")).await;

    let reason = outcome.unwrap_err().reason;
    assert!(reason.contains("500"), "got: {}", reason);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reputation_maps_analysis_error_to_unavailable() {
    let (base_url, hits) = serve(vec![
        http_response("200 OK", r#"{"data":{"id":"abc123"}}"#),
        http_response("503 Service Unavailable", "{}"),
    ])
    .await;
    let source = reputation_source(&base_url);

    let outcome = source.query(&Subject::url("https://example.com")).await;

    let reason = outcome.unwrap_err().reason;
    assert!(reason.contains("503"), "got: {}", reason);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reputation_two_leg_lookup_yields_signal() {
    let analysis = r#"{"data":{"attributes":{"stats":{"malicious":2,"suspicious":1}}}}"#;
    let (base_url, hits) = serve(vec![
        http_response("200 OK", r#"{"data":{"id":"abc123"}}"#),
        http_response("200 OK", analysis),
    ])
    .await;
    let source = reputation_source(&base_url);

    let result = source.query(&Subject::url("https://example.com")).await.unwrap();

    assert!(result.is_phishing);
    // 0.6 + 2*0.1 + 1*0.05
    assert!((result.confidence - 0.85).abs() < 1e-9);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reputation_declines_non_url_subjects() {
    // No server at all: the subject is rejected before any request
    let source = reputation_source("http://127.0.0.1:9");
    let outcome = source.query(&Subject::text("some page text")).await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn generative_maps_http_error_to_unavailable() {
    let (base_url, _) = serve(vec![http_response("503 Service Unavailable", "{}")]).await;
    let source = generative_source(&base_url);

    let outcome = source.query(&Subject::url("https://example.com")).await;

    let reason = outcome.unwrap_err().reason;
    assert!(reason.contains("503"), "got: {}", reason);
}

#[tokio::test]
async fn generative_connection_failure_redacts_credential() {
    // Bind to learn a free port, then drop the listener so connects fail
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let source = generative_source(&base_url);
    let outcome = source.query(&Subject::url("https://example.com")).await;

    let reason = outcome.unwrap_err().reason;
    assert!(!reason.contains("secret-key-123"), "credential leaked: {}", reason);
}

#[tokio::test]
async fn generative_parses_reply_over_http() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"isPhishing\": true, \"confidence\": 0.8, \"reason\": \"fake login\"}"}]}}]}"#;
    let (base_url, _) = serve(vec![http_response("200 OK", body)]).await;
    let source = generative_source(&base_url);

    let result = source.query(&Subject::url("https://example.com")).await.unwrap();

    assert!(result.is_phishing);
    assert_eq!(result.confidence, 0.8);
    assert_eq!(result.details.as_deref(), Some("fake login"));
}

#[tokio::test]
async fn remote_ml_retries_server_error_then_reports_unavailable() {
    let (base_url, hits) = serve(vec![
        http_response("500 Internal Server Error", "{}"),
        http_response("500 Internal Server Error", "{}"),
    ])
    .await;
    let source = RemoteMlSource::new(&RemoteMlConfig { endpoint: base_url });

    let outcome = source.query(&Subject::url("https://example.com")).await;

    let reason = outcome.unwrap_err().reason;
    assert!(reason.contains("500"), "got: {}", reason);
    // One retry before giving up
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn remote_ml_malformed_payload_is_unavailable_without_retry() {
    let (base_url, hits) = serve(vec![http_response("200 OK", "not json at all")]).await;
    let source = RemoteMlSource::new(&RemoteMlConfig { endpoint: base_url });

    let outcome = source.query(&Subject::url("https://example.com")).await;

    let reason = outcome.unwrap_err().reason;
    assert!(reason.contains("malformed"), "got: {}", reason);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
