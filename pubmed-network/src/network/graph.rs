//! Node/edge graph assembly with identifier-based deduplication

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::pubmed::models::article_url;
use crate::pubmed::{ArticleRecord, RelationKind};

const MAX_NODE_SIZE: u32 = 45;
const SIZE_PER_EDGE: u32 = 2;

/// Role of a node in an assembled graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Seed,
    CollectionMember,
    CitingExternal,
    ReferencedExternal,
}

impl NodeType {
    fn base_size(&self) -> u32 {
        match self {
            NodeType::Seed => 30,
            NodeType::CollectionMember => 25,
            NodeType::CitingExternal | NodeType::ReferencedExternal => 15,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            NodeType::Seed => "#e74c3c",
            NodeType::CollectionMember => "#3498db",
            NodeType::CitingExternal => "#2ecc71",
            NodeType::ReferencedExternal => "#f39c12",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            NodeType::Seed => "seed",
            NodeType::CollectionMember => "collection",
            NodeType::CitingExternal => "citing",
            NodeType::ReferencedExternal => "referenced",
        }
    }

    /// Node type for an external article reached through `kind`
    pub fn for_external(kind: RelationKind) -> Self {
        match kind {
            RelationKind::CitedBy => NodeType::CitingExternal,
            RelationKind::Cites | RelationKind::Similar => NodeType::ReferencedExternal,
        }
    }
}

/// Edge label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// `from` cites `to`, found through a cited-by query on `to`
    Citation,
    /// `from` cites `to`, found through a cites query on `from`
    Reference,
    Similar,
    /// Both endpoints belong to the same collection
    IntraCollectionCitation,
}

impl Relationship {
    pub fn weight(&self) -> f64 {
        match self {
            Relationship::IntraCollectionCitation => 2.0,
            Relationship::Citation | Relationship::Reference => 1.0,
            Relationship::Similar => 0.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Citation => "citation",
            Relationship::Reference => "reference",
            Relationship::Similar => "similar",
            Relationship::IntraCollectionCitation => "intra_collection_citation",
        }
    }

    /// Label for edges produced from a relation query result
    pub fn for_relation(kind: RelationKind) -> Self {
        match kind {
            RelationKind::CitedBy => Relationship::Citation,
            RelationKind::Cites => Relationship::Reference,
            RelationKind::Similar => Relationship::Similar,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orient a relation result: a cited-by hit `related` of `source` cites it,
/// while cites and similar hits point away from `source`
pub fn oriented<'a>(source: &'a str, related: &'a str, kind: RelationKind) -> (&'a str, &'a str) {
    match kind {
        RelationKind::CitedBy => (related, source),
        RelationKind::Cites | RelationKind::Similar => (source, related),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(flatten)]
    pub record: ArticleRecord,
    pub url: String,
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_relation: Option<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    pub label: String,
    pub size: u32,
    pub color: String,
    pub category: String,
    pub metadata: NodeMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub relationship: Relationship,
    pub weight: f64,
}

impl NetworkEdge {
    /// Deterministic identity of an edge
    pub fn edge_id(from: &str, to: &str, relationship: Relationship) -> String {
        format!("{from}->{to}:{relationship}")
    }
}

/// Collects nodes and edges, keeping the first-seen node per PMID and one
/// edge per `(from, to, relationship)`
///
/// Edges are only recorded between nodes already present, and self-edges
/// are ignored.
#[derive(Debug, Default)]
pub struct GraphAssembler {
    nodes: Vec<NetworkNode>,
    node_index: HashMap<String, usize>,
    edges: Vec<NetworkEdge>,
    edge_ids: HashSet<String>,
}

impl GraphAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node unless the PMID is already present; returns whether it was added
    pub fn add_node(
        &mut self,
        record: ArticleRecord,
        node_type: NodeType,
        source_relation: Option<Relationship>,
    ) -> bool {
        if self.node_index.contains_key(&record.pmid) {
            return false;
        }

        let id = record.pmid.clone();
        let node = NetworkNode {
            id: id.clone(),
            label: record.title.clone(),
            size: node_type.base_size(),
            color: node_type.color().to_string(),
            category: node_type.category().to_string(),
            metadata: NodeMetadata {
                url: article_url(&id),
                record,
                node_type,
                source_relation,
            },
        };
        self.node_index.insert(id, self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn contains_node(&self, pmid: &str) -> bool {
        self.node_index.contains_key(pmid)
    }

    /// Record an edge when both endpoints exist; returns whether it was added
    pub fn add_edge(&mut self, from: &str, to: &str, relationship: Relationship) -> bool {
        if from == to || !self.contains_node(from) || !self.contains_node(to) {
            return false;
        }

        let id = NetworkEdge::edge_id(from, to, relationship);
        if !self.edge_ids.insert(id.clone()) {
            return false;
        }

        self.edges.push(NetworkEdge {
            id,
            from: from.to_string(),
            to: to.to_string(),
            relationship,
            weight: relationship.weight(),
        });
        true
    }

    /// Record the edges of one relation query result; returns how many were new
    pub fn add_relation(&mut self, source: &str, kind: RelationKind, related: &[String]) -> usize {
        let relationship = Relationship::for_relation(kind);
        let mut added = 0;
        for id in related {
            let (from, to) = oriented(source, id, kind);
            if self.add_edge(from, to, relationship) {
                added += 1;
            }
        }
        added
    }

    pub fn count_edges(&self, relationship: Relationship) -> usize {
        self.edges
            .iter()
            .filter(|e| e.relationship == relationship)
            .count()
    }

    /// Finalize node sizes from degree and hand out the graph
    pub fn finish(mut self) -> (Vec<NetworkNode>, Vec<NetworkEdge>) {
        let mut degree: HashMap<&str, u32> = HashMap::new();
        for edge in &self.edges {
            *degree.entry(edge.from.as_str()).or_default() += 1;
            *degree.entry(edge.to.as_str()).or_default() += 1;
        }

        for node in &mut self.nodes {
            let edges = degree.get(node.id.as_str()).copied().unwrap_or(0);
            node.size = (node.metadata.node_type.base_size() + SIZE_PER_EDGE * edges)
                .min(MAX_NODE_SIZE);
        }

        (self.nodes, self.edges)
    }
}
