//! Later-work discovery against a mocked E-utilities server

mod common;

use pubmed_network::network::MatchKind;
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    CURRENT_YEAR, article_xml, efetch_body, esearch_body, mock_service, mount_efetch, mount_elink,
};

#[tokio::test]
#[traced_test]
async fn test_later_work_is_strictly_after_source_year() {
    let server = MockServer::start().await;
    mount_efetch(
        &server,
        "100",
        efetch_body(&[article_xml("100", "Source", 2018, &["Neoplasms", "Mice"])]),
    )
    .await;
    mount_elink(&server, "100", "pubmed_pubmed_citedin", &["201", "202", "203"]).await;
    mount_efetch(
        &server,
        "201,202,203",
        efetch_body(&[
            article_xml("201", "Same year citation", 2018, &[]),
            article_xml("202", "Later citation", 2020, &[]),
            article_xml("203", "Older citation", 2015, &[]),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param(
            "term",
            "(\"Neoplasms\"[MeSH Terms] OR \"Mice\"[MeSH Terms]) AND 2019:2024[pdat]",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_body(&["301", "302"])))
        .expect(1)
        .mount(&server)
        .await;
    mount_efetch(
        &server,
        "301,302",
        efetch_body(&[
            article_xml("301", "Topic match", 2022, &[]),
            article_xml("302", "Date filter leak", 2018, &[]),
        ]),
    )
    .await;

    let service = mock_service(&server);
    let lookup = service.later_work("100", Some(10)).await.unwrap();

    let got: Vec<(&str, MatchKind)> = lookup
        .later_articles
        .iter()
        .map(|a| (a.record.pmid.as_str(), a.match_type))
        .collect();
    assert_eq!(got, vec![("301", MatchKind::Topic), ("202", MatchKind::Citation)]);
    assert!(
        lookup
            .later_articles
            .iter()
            .all(|a| a.record.year.is_some_and(|y| y > 2018))
    );
    assert_eq!(lookup.same_year_citations, 1);
    assert_eq!(lookup.total_count, 2);
    assert!(!lookup.partial);
    assert!(!lookup.fallback);
}

#[tokio::test]
async fn test_current_year_source_issues_no_search() {
    let server = MockServer::start().await;
    mount_efetch(
        &server,
        "100",
        efetch_body(&[article_xml("100", "Fresh", CURRENT_YEAR, &["Mice"])]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_body(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let service = mock_service(&server);
    let lookup = service.later_work("100", None).await.unwrap();

    assert!(lookup.later_articles.is_empty());
    assert_eq!(lookup.total_count, 0);
    assert!(lookup.search_skipped);
}

#[tokio::test]
async fn test_enough_citations_skip_topic_search() {
    let server = MockServer::start().await;
    mount_efetch(&server, "100", efetch_body(&[article_xml("100", "Source", 2010, &[])])).await;
    mount_elink(&server, "100", "pubmed_pubmed_citedin", &["201", "202"]).await;
    mount_efetch(
        &server,
        "201,202",
        efetch_body(&[
            article_xml("201", "A", 2011, &[]),
            article_xml("202", "B", 2013, &[]),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_body(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let service = mock_service(&server);
    let lookup = service.later_work("100", Some(2)).await.unwrap();

    let ids: Vec<&str> = lookup.later_articles.iter().map(|a| a.record.pmid.as_str()).collect();
    assert_eq!(ids, vec!["202", "201"]);
    assert_eq!(lookup.citation_matches, 2);
}

#[tokio::test]
#[traced_test]
async fn test_topic_search_failure_returns_partial_result() {
    let server = MockServer::start().await;
    mount_efetch(&server, "100", efetch_body(&[article_xml("100", "Source", 2010, &[])])).await;
    mount_elink(&server, "100", "pubmed_pubmed_citedin", &["201"]).await;
    mount_efetch(&server, "201", efetch_body(&[article_xml("201", "A", 2012, &[])])).await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = mock_service(&server);
    let lookup = service.later_work("100", Some(10)).await.unwrap();

    assert!(lookup.partial);
    assert_eq!(lookup.later_articles.len(), 1);
    assert!(lookup.message.is_some());
}
