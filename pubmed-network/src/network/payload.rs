//! Response payloads of the request handlers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::graph::{NetworkEdge, NetworkNode};
use crate::cache::Cacheable;
use crate::error::PubMedError;
use crate::pubmed::{ArticleRecord, RelationKind};

/// Title used when a record could not be resolved
pub const PLACEHOLDER_TITLE: &str = "Article information unavailable";

/// Stand-in record for an unresolvable PMID
pub(crate) fn placeholder_record(pmid: &str) -> ArticleRecord {
    ArticleRecord {
        pmid: pmid.to_string(),
        title: PLACEHOLDER_TITLE.to_string(),
        authors: Vec::new(),
        journal: String::new(),
        year: None,
        abstract_text: None,
        doi: None,
        mesh_terms: Vec::new(),
    }
}

/// Which related articles a citation lookup returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelationSelector {
    /// Articles citing the source
    #[default]
    Citations,
    /// Articles the source cites
    References,
    /// Articles PubMed considers similar
    Similar,
}

impl RelationSelector {
    pub fn kind(&self) -> RelationKind {
        match self {
            RelationSelector::Citations => RelationKind::CitedBy,
            RelationSelector::References => RelationKind::Cites,
            RelationSelector::Similar => RelationKind::Similar,
        }
    }

    /// Fixed relevance reported for every article found through this selector
    pub fn relevance(&self) -> f64 {
        self.match_kind().relevance()
    }

    pub fn match_kind(&self) -> MatchKind {
        match self {
            RelationSelector::Citations => MatchKind::Citation,
            RelationSelector::References => MatchKind::Reference,
            RelationSelector::Similar => MatchKind::Similar,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationSelector::Citations => "citations",
            RelationSelector::References => "references",
            RelationSelector::Similar => "similar",
        }
    }
}

impl fmt::Display for RelationSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationSelector {
    type Err = PubMedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "citations" | "cited-by" | "cited_by" => Ok(RelationSelector::Citations),
            "references" | "cites" | "refs" => Ok(RelationSelector::References),
            "similar" => Ok(RelationSelector::Similar),
            other => Err(PubMedError::InvalidQuery(format!(
                "unknown relation type '{other}'"
            ))),
        }
    }
}

/// How a related article was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Citation,
    Reference,
    Similar,
    /// Subject and date search
    Topic,
}

impl MatchKind {
    /// Coarse heuristic, fixed per match kind
    pub fn relevance(&self) -> f64 {
        match self {
            MatchKind::Citation => 0.9,
            MatchKind::Reference => 0.8,
            MatchKind::Similar | MatchKind::Topic => 0.75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceArticle {
    #[serde(flatten)]
    pub record: ArticleRecord,
    pub url: String,
}

impl From<ArticleRecord> for SourceArticle {
    fn from(record: ArticleRecord) -> Self {
        Self {
            url: record.url(),
            record,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedArticle {
    #[serde(flatten)]
    pub record: ArticleRecord,
    pub url: String,
    pub relevance: f64,
    pub match_type: MatchKind,
}

impl RelatedArticle {
    pub fn new(record: ArticleRecord, match_type: MatchKind) -> Self {
        Self {
            url: record.url(),
            record,
            relevance: match_type.relevance(),
            match_type,
        }
    }
}

/// Result of a citation lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationLookup {
    pub source_article: SourceArticle,
    pub citations: Vec<RelatedArticle>,
    pub total_count: usize,
    pub relation: RelationSelector,
    /// Set when upstream data was missing and placeholders were returned
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CitationLookup {
    pub(crate) fn fallback(
        source: ArticleRecord,
        relation: RelationSelector,
        message: String,
    ) -> Self {
        Self {
            source_article: source.into(),
            citations: Vec::new(),
            total_count: 0,
            relation,
            fallback: true,
            message: Some(message),
        }
    }
}

impl Cacheable for CitationLookup {
    fn should_cache(&self) -> bool {
        !self.fallback
    }
}

/// Result of a later-work lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaterWorkLookup {
    pub source_article: SourceArticle,
    /// Year descending, then relevance descending
    pub later_articles: Vec<RelatedArticle>,
    pub total_count: usize,
    pub citation_matches: usize,
    pub topic_matches: usize,
    /// Citing articles from the source's own year, excluded from the results
    pub same_year_citations: usize,
    /// Set when no later year exists yet and nothing was searched
    pub search_skipped: bool,
    /// Set when a later step failed after earlier steps produced data
    pub partial: bool,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LaterWorkLookup {
    pub(crate) fn fallback(source: ArticleRecord, message: String) -> Self {
        Self {
            source_article: source.into(),
            later_articles: Vec::new(),
            total_count: 0,
            citation_matches: 0,
            topic_matches: 0,
            same_year_citations: 0,
            search_skipped: false,
            partial: false,
            fallback: true,
            message: Some(message),
        }
    }
}

impl Cacheable for LaterWorkLookup {
    fn should_cache(&self) -> bool {
        !self.fallback && !self.partial
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HybridCounts {
    pub collection_size: usize,
    pub external_count: usize,
    pub intra_collection_edges: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
}

/// A collection's internal citation structure plus external expansion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridNetwork {
    pub collection_id: String,
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub counts: HybridCounts,
    pub partial: bool,
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Cacheable for HybridNetwork {
    fn should_cache(&self) -> bool {
        !self.fallback && !self.partial
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CitationNetworkCounts {
    pub citing_count: usize,
    pub referenced_count: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
}

/// One seed article with its citing and referenced articles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationNetwork {
    pub source_pmid: String,
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub counts: CitationNetworkCounts,
    pub partial: bool,
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Cacheable for CitationNetwork {
    fn should_cache(&self) -> bool {
        !self.fallback && !self.partial
    }
}
