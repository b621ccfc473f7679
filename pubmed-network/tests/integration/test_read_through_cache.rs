//! Only complete, successful results are served from the cache

mod common;

use pubmed_network::network::RelationSelector;
use tracing_test::traced_test;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{article_xml, efetch_body, mock_service, mount_efetch, mount_elink};

const SOURCE: &str = "29622564";

#[tokio::test]
#[traced_test]
async fn test_cache_hit_makes_no_upstream_call() {
    let server = MockServer::start().await;
    mount_efetch(&server, SOURCE, efetch_body(&[article_xml(SOURCE, "Source", 2018, &[])])).await;
    mount_elink(&server, SOURCE, "pubmed_pubmed_citedin", &[]).await;

    let service = mock_service(&server);
    let first = service
        .citation_lookup(SOURCE, RelationSelector::Citations, Some(20))
        .await
        .unwrap();
    let calls_after_first = server.received_requests().await.unwrap().len();

    let second = service
        .citation_lookup(SOURCE, RelationSelector::Citations, Some(20))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        calls_after_first
    );
}

#[tokio::test]
#[traced_test]
async fn test_failed_lookup_is_retried_on_next_request() {
    let server = MockServer::start().await;

    // First request: the record does not resolve yet
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_body(&[])))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_efetch(&server, SOURCE, efetch_body(&[article_xml(SOURCE, "Source", 2018, &[])])).await;
    mount_elink(&server, SOURCE, "pubmed_pubmed_citedin", &[]).await;

    let service = mock_service(&server);
    let first = service
        .citation_lookup(SOURCE, RelationSelector::Citations, Some(20))
        .await
        .unwrap();
    assert!(first.fallback);

    let second = service
        .citation_lookup(SOURCE, RelationSelector::Citations, Some(20))
        .await
        .unwrap();
    assert!(!second.fallback);
    assert_eq!(second.source_article.record.title, "Source");
}

#[tokio::test]
async fn test_different_parameters_are_separate_entries() {
    let server = MockServer::start().await;
    mount_efetch(&server, SOURCE, efetch_body(&[article_xml(SOURCE, "Source", 2018, &[])])).await;
    mount_elink(&server, SOURCE, "pubmed_pubmed_citedin", &[]).await;
    mount_elink(&server, SOURCE, "pubmed_pubmed", &[]).await;

    let service = mock_service(&server);
    service
        .citation_lookup(SOURCE, RelationSelector::Citations, Some(20))
        .await
        .unwrap();
    let before = server.received_requests().await.unwrap().len();

    service
        .citation_lookup(SOURCE, RelationSelector::Similar, Some(20))
        .await
        .unwrap();
    assert!(server.received_requests().await.unwrap().len() > before);
}
