//! Shared fixtures for the mocked E-utilities tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use pubmed_network::{
    CacheConfig, ClientConfig, NetworkConfig, NetworkService, PubMedClient, RetryPolicy,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Year the services under test treat as "now"
pub const CURRENT_YEAR: i32 = 2024;

/// Client pointed at the mock server, with a high rate ceiling and fast retries
pub fn mock_client(server: &MockServer) -> PubMedClient {
    let policy = RetryPolicy::default()
        .with_max_retries(2)
        .with_initial_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_millis(50))
        .with_jitter(false)
        .with_timeout(Duration::from_secs(5));
    let config = ClientConfig::new()
        .with_base_url(server.uri())
        .with_rate_limit(100.0)
        .with_retry_policy(policy);
    PubMedClient::with_config(config)
}

pub fn service_for(client: PubMedClient) -> NetworkService {
    NetworkService::new(
        Arc::new(client),
        &CacheConfig::default(),
        NetworkConfig::default(),
    )
    .with_current_year(CURRENT_YEAR)
}

pub fn mock_service(server: &MockServer) -> NetworkService {
    service_for(mock_client(server))
}

/// One `<PubmedArticle>` element
pub fn article_xml(pmid: &str, title: &str, year: i32, mesh: &[&str]) -> String {
    let mesh_list = if mesh.is_empty() {
        String::new()
    } else {
        let headings: String = mesh
            .iter()
            .map(|term| {
                format!(
                    "<MeshHeading><DescriptorName UI=\"D000001\">{term}</DescriptorName></MeshHeading>"
                )
            })
            .collect();
        format!("<MeshHeadingList>{headings}</MeshHeadingList>")
    };

    format!(
        r#"<PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
        <PMID Version="1">{pmid}</PMID>
        <Article PubModel="Print">
            <Journal>
                <JournalIssue CitedMedium="Internet">
                    <PubDate><Year>{year}</Year></PubDate>
                </JournalIssue>
                <Title>Test Journal</Title>
            </Journal>
            <ArticleTitle>{title}</ArticleTitle>
            <AuthorList CompleteYN="Y">
                <Author ValidYN="Y"><LastName>Doe</LastName><ForeName>Jane</ForeName></Author>
            </AuthorList>
        </Article>
        {mesh_list}
    </MedlineCitation>
</PubmedArticle>"#
    )
}

pub fn efetch_body(articles: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" ?>\n<PubmedArticleSet>\n{}\n</PubmedArticleSet>",
        articles.join("\n")
    )
}

pub fn elink_body(pmid: &str, link_name: &str, ids: &[&str]) -> String {
    serde_json::json!({
        "header": { "type": "elink", "version": "0.3" },
        "linksets": [{
            "dbfrom": "pubmed",
            "ids": [pmid],
            "linksetdbs": [{
                "dbto": "pubmed",
                "linkname": link_name,
                "links": ids,
            }]
        }]
    })
    .to_string()
}

pub fn esearch_body(ids: &[&str]) -> String {
    serde_json::json!({
        "header": { "type": "esearch", "version": "0.3" },
        "esearchresult": {
            "count": ids.len().to_string(),
            "retmax": ids.len().to_string(),
            "retstart": "0",
            "idlist": ids,
        }
    })
    .to_string()
}

/// Serve `body` for an EFetch of exactly `ids` (comma-joined, in order)
pub async fn mount_efetch(server: &MockServer, ids: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", ids))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

/// Serve an ELink result for one PMID and link name
pub async fn mount_elink(server: &MockServer, pmid: &str, link_name: &str, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/elink.fcgi"))
        .and(query_param("id", pmid))
        .and(query_param("linkname", link_name))
        .respond_with(ResponseTemplate::new(200).set_body_string(elink_body(pmid, link_name, ids)))
        .mount(server)
        .await;
}

/// Answer every ELink request not matched by a more specific mock with no links
pub async fn mount_empty_elink_fallback(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/elink.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"linksets":[]}"#))
        .with_priority(10)
        .mount(server)
        .await;
}
