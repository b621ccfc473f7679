//! Hybrid collection networks against a mocked E-utilities server

mod common;

use std::collections::HashSet;

use pubmed_network::network::{NodeType, Relationship};
use pubmed_network::NetworkOptions;
use tracing_test::traced_test;
use wiremock::MockServer;

use common::{
    article_xml, efetch_body, mock_service, mount_efetch, mount_elink, mount_empty_elink_fallback,
};

fn members(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// Collection {11, 12, 13}: 11 cites 12, seen from both directions, plus
/// a handful of external citing and referenced articles
async fn mount_collection(server: &MockServer) {
    mount_efetch(
        server,
        "11,12,13",
        efetch_body(&[
            article_xml("11", "Member A", 2015, &[]),
            article_xml("12", "Member B", 2012, &[]),
            article_xml("13", "Member C", 2018, &[]),
        ]),
    )
    .await;

    mount_elink(server, "11", "pubmed_pubmed_refs", &["12", "901", "902"]).await;
    mount_elink(server, "11", "pubmed_pubmed_citedin", &["951"]).await;
    mount_elink(server, "12", "pubmed_pubmed_citedin", &["11", "951", "952"]).await;
    mount_elink(server, "13", "pubmed_pubmed_refs", &["901"]).await;
    mount_empty_elink_fallback(server).await;
}

#[tokio::test]
#[traced_test]
async fn test_intra_collection_edge_recorded_once() {
    let server = MockServer::start().await;
    mount_collection(&server).await;
    mount_efetch(
        &server,
        "951,901,902,952",
        efetch_body(&[
            article_xml("951", "Citing one", 2020, &[]),
            article_xml("901", "Reference one", 2010, &[]),
            article_xml("902", "Reference two", 2009, &[]),
            article_xml("952", "Citing two", 2021, &[]),
        ]),
    )
    .await;

    let service = mock_service(&server);
    let network = service
        .hybrid_network("c1", &members(&["11", "12", "13"]), NetworkOptions::default())
        .await
        .unwrap();

    let intra: Vec<_> = network
        .edges
        .iter()
        .filter(|e| e.relationship == Relationship::IntraCollectionCitation)
        .collect();
    assert_eq!(intra.len(), 1);
    assert_eq!((intra[0].from.as_str(), intra[0].to.as_str()), ("11", "12"));
    assert_eq!(intra[0].weight, 2.0);

    let node_ids: HashSet<&str> = network.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(node_ids.len(), network.nodes.len(), "duplicate nodes");
    let edge_ids: HashSet<&str> = network.edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(edge_ids.len(), network.edges.len(), "duplicate edges");

    // 951 cites both 11 and 12; 901 is referenced by 11 and 13
    assert!(edge_ids.contains("951->11:citation"));
    assert!(edge_ids.contains("951->12:citation"));
    assert!(edge_ids.contains("11->901:reference"));
    assert!(edge_ids.contains("13->901:reference"));

    let members_typed = network
        .nodes
        .iter()
        .filter(|n| n.metadata.node_type == NodeType::CollectionMember)
        .count();
    assert_eq!(members_typed, 3);

    assert_eq!(network.counts.collection_size, 3);
    assert_eq!(network.counts.external_count, 4);
    assert_eq!(network.counts.intra_collection_edges, 1);
    assert_eq!(network.counts.total_nodes, 7);
    assert_eq!(network.counts.total_edges, network.edges.len());
    assert!(!network.partial);
    assert!(!network.fallback);
}

#[tokio::test]
async fn test_node_budget_bounds_external_nodes() {
    let server = MockServer::start().await;
    mount_collection(&server).await;
    mount_efetch(
        &server,
        "951,901",
        efetch_body(&[
            article_xml("951", "Citing one", 2020, &[]),
            article_xml("901", "Reference one", 2010, &[]),
        ]),
    )
    .await;

    let service = mock_service(&server);
    let options = NetworkOptions {
        limit: Some(2),
        ..Default::default()
    };
    let network = service
        .hybrid_network("c1", &members(&["11", "12", "13"]), options)
        .await
        .unwrap();

    assert!(network.nodes.len() <= 2 + 3);
    assert_eq!(network.counts.external_count, 2);
}

#[tokio::test]
async fn test_intra_links_without_external_expansion() {
    let server = MockServer::start().await;
    mount_collection(&server).await;

    let service = mock_service(&server);
    let options = NetworkOptions {
        include_citations: false,
        include_references: false,
        limit: None,
    };
    let network = service
        .hybrid_network("c1", &members(&["11", "12", "13"]), options)
        .await
        .unwrap();

    assert_eq!(network.nodes.len(), 3);
    assert_eq!(network.edges.len(), 1);
    assert_eq!(network.counts.external_count, 0);
}

#[tokio::test]
async fn test_unavailable_upstream_returns_member_placeholders() {
    let server = MockServer::start().await;
    // No mocks: every request answers 404

    let service = mock_service(&server);
    let network = service
        .hybrid_network("c1", &members(&["11", "12"]), NetworkOptions::default())
        .await
        .unwrap();

    assert!(network.fallback);
    assert_eq!(network.nodes.len(), 2);
    assert!(network.edges.is_empty());
}

#[tokio::test]
async fn test_empty_collection() {
    let server = MockServer::start().await;
    let service = mock_service(&server);

    let network = service
        .hybrid_network("empty", &[], NetworkOptions::default())
        .await
        .unwrap();
    assert!(network.nodes.is_empty());
    assert_eq!(network.counts.collection_size, 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}
