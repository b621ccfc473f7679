use serde::Deserialize;

use crate::pubmed::RelationKind;

/// Caps and defaults for the network engine
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    /// Upper bound for any caller-supplied result limit
    pub max_limit: usize,
    /// Limit used by the lookups when the caller gives none
    pub default_lookup_limit: usize,
    /// Node budget used by the network builders when the caller gives none
    pub default_network_limit: usize,
    /// Candidates requested per seed and direction
    pub per_seed_fanout: usize,
    /// Collection members that take part in intra-collection linking
    pub max_intra_collection_members: usize,
    /// MeSH terms of the source used to scope the later-work search
    pub mesh_terms_for_search: usize,
    /// Authors kept per record in every handler response
    pub author_cap: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_limit: 100,
            default_lookup_limit: 20,
            default_network_limit: 50,
            per_seed_fanout: 50,
            max_intra_collection_members: 50,
            mesh_terms_for_search: 3,
            author_cap: 10,
        }
    }
}

impl NetworkConfig {
    /// Clamp a requested limit into `1..=max_limit`, using `default` when absent
    pub fn clamp_limit(&self, requested: Option<usize>, default: usize) -> usize {
        let max = self.max_limit.max(1);
        requested.unwrap_or(default).clamp(1, max)
    }
}

/// Expansion switches shared by the network builders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkOptions {
    /// Expand with articles citing the seeds
    pub include_citations: bool,
    /// Expand with articles the seeds cite
    pub include_references: bool,
    /// Node budget for external articles
    pub limit: Option<usize>,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            include_citations: true,
            include_references: true,
            limit: None,
        }
    }
}

impl NetworkOptions {
    /// Relation queries the external expansion issues, in order
    pub fn relation_kinds(&self) -> Vec<RelationKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.include_citations {
            kinds.push(RelationKind::CitedBy);
        }
        if self.include_references {
            kinds.push(RelationKind::Cites);
        }
        kinds
    }
}
