//! EFetch batch fetching and tolerant record parsing over HTTP

mod common;

use pubmed_network::PubMedError;
use tracing_test::traced_test;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{article_xml, efetch_body, mock_client, mount_efetch};

#[tokio::test]
#[traced_test]
async fn test_batch_fetch_parses_every_record() {
    let server = MockServer::start().await;
    let body = efetch_body(&[
        article_xml("31978945", "A pneumonia outbreak", 2020, &["Pneumonia", "Humans"]),
        article_xml("33515491", "Cancer treatment advances", 2021, &[]),
    ]);
    mount_efetch(&server, "31978945,33515491", body).await;

    let client = mock_client(&server);
    let records = client
        .fetch_records(&["31978945", "33515491"])
        .await
        .expect("batch fetch should succeed");

    assert_eq!(records.len(), 2);
    let first = &records[0];
    assert_eq!(first.pmid, "31978945");
    assert_eq!(first.title, "A pneumonia outbreak");
    assert_eq!(first.journal, "Test Journal");
    assert_eq!(first.year, Some(2020));
    assert_eq!(first.authors, vec!["Jane Doe".to_string()]);
    assert_eq!(first.mesh_terms, vec!["Pneumonia", "Humans"]);
}

#[tokio::test]
#[traced_test]
async fn test_malformed_fragment_dropped_from_batch() {
    let server = MockServer::start().await;
    let broken = r#"<PubmedArticle>
    <MedlineCitation>
        <PMID Version="1">2</PMID>
        <Article>
            <Journal><Title>Broken</Title></Journal>
        </Article>
    </MedlineCitation>
</PubmedArticle>"#
        .to_string();
    let body = efetch_body(&[
        article_xml("1", "First", 2019, &[]),
        broken,
        article_xml("3", "Third", 2020, &[]),
    ]);
    mount_efetch(&server, "1,2,3", body).await;

    let client = mock_client(&server);
    let records = client.fetch_records(&["1", "2", "3"]).await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.pmid.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_empty_body_yields_no_records() {
    let server = MockServer::start().await;
    mount_efetch(&server, "1", String::new()).await;

    let client = mock_client(&server);
    let records = client.fetch_records(&["1"]).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_fetch_record_not_found() {
    let server = MockServer::start().await;
    mount_efetch(&server, "1", efetch_body(&[])).await;

    let client = mock_client(&server);
    let result = client.fetch_record("1").await;
    assert!(matches!(result, Err(PubMedError::RecordNotFound { pmid }) if pmid == "1"));
}

#[tokio::test]
async fn test_empty_input_makes_no_request() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    let records = client.fetch_records::<&str>(&[]).await.unwrap();
    assert!(records.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_pmid_rejects_whole_batch() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    let result = client.fetch_records(&["1", "not_a_number"]).await;
    assert!(matches!(result, Err(PubMedError::InvalidPmid { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_large_batches_are_split() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_body(&[])))
        .expect(2)
        .mount(&server)
        .await;

    let ids: Vec<String> = (1..=250).map(|i| i.to_string()).collect();
    let client = mock_client(&server);
    client.fetch_records(&ids).await.unwrap();
}

#[tokio::test]
async fn test_search_then_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::esearch_body(&["7"])))
        .mount(&server)
        .await;
    mount_efetch(&server, "7", efetch_body(&[article_xml("7", "Seven", 2022, &[])])).await;

    let client = mock_client(&server);
    let records = client
        .search()
        .query("seven")
        .limit(5)
        .search_and_fetch(&client)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Seven");
}

#[tokio::test]
async fn test_esearch_error_field_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"esearchresult":{"ERROR":"Invalid query syntax"}}"#),
        )
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let result = client.search_articles("((", 5).await;
    assert!(matches!(result, Err(PubMedError::ApiError { status: 200, .. })));
}
