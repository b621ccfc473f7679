//! Rate ceiling and retry behavior of the shared request path
//!
//! Every E-utilities call passes through one token bucket and one retry
//! policy. These tests drive them against a wiremock server.

mod common;

use std::time::{Duration, Instant};

use pubmed_network::{ClientConfig, PubMedClient, PubMedError, RateLimiter, RetryPolicy};
use tracing_test::traced_test;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{esearch_body, mock_client};

fn client_with_rate(server: &MockServer, rate: f64) -> PubMedClient {
    let config = ClientConfig::new()
        .with_base_url(server.uri())
        .with_rate_limit(rate)
        .with_retry_policy(RetryPolicy::no_retry());
    PubMedClient::with_config(config)
}

#[tokio::test]
#[traced_test]
async fn test_concurrent_calls_share_one_ceiling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_body(&["1"])))
        .mount(&server)
        .await;

    // Bucket starts full with 5 tokens; 8 calls need 3 refills at 5/s
    let client = client_with_rate(&server, 5.0);
    let start = Instant::now();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .search_articles(&format!("query {i}"), 5)
                    .await
            })
        })
        .collect();

    for handle in handles {
        let ids = handle.await.expect("task should not panic").expect("search should succeed");
        assert_eq!(ids, vec!["1".to_string()]);
    }

    assert!(
        start.elapsed() >= Duration::from_millis(500),
        "8 calls at 5 req/s must wait for refills, took {:?}",
        start.elapsed()
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 8);
}

#[tokio::test]
async fn test_rate_limiter_defaults() {
    assert_eq!(RateLimiter::ncbi_default().rate().await, 3.0);
    assert_eq!(RateLimiter::ncbi_with_key().rate().await, 10.0);

    let keyed = ClientConfig::new().with_api_key("key");
    assert_eq!(keyed.effective_rate_limit(), 10.0);
    assert_eq!(ClientConfig::new().effective_rate_limit(), 3.0);
}

#[tokio::test]
#[traced_test]
async fn test_server_errors_exhaust_retries_into_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let result = client.search_articles("cancer", 10).await;

    match result {
        Err(PubMedError::UpstreamUnavailable { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected UpstreamUnavailable, got {other:?}"),
    }
}

#[tokio::test]
#[traced_test]
async fn test_throttled_request_recovers_on_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_body(&["42"])))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let ids = client.search_articles("cancer", 10).await.unwrap();

    assert_eq!(ids, vec!["42".to_string()]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let result = client.search_articles("cancer", 10).await;

    assert!(matches!(
        result,
        Err(PubMedError::ApiError { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_timeout_counts_as_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(esearch_body(&["1"]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let policy = RetryPolicy::default()
        .with_max_retries(1)
        .with_initial_delay(Duration::from_millis(10))
        .with_jitter(false)
        .with_timeout(Duration::from_millis(200));
    let client = PubMedClient::with_config(
        ClientConfig::new()
            .with_base_url(server.uri())
            .with_rate_limit(100.0)
            .with_retry_policy(policy),
    );

    let result = client.search_articles("cancer", 10).await;
    assert!(matches!(
        result,
        Err(PubMedError::UpstreamUnavailable { attempts: 2, .. })
    ));
}
