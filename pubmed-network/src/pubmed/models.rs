use serde::{Deserialize, Serialize};
use std::fmt;

/// Bibliographic metadata for one PubMed article
///
/// Produced fresh per request by the EFetch parser and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// PubMed ID
    pub pmid: String,
    /// Article title
    pub title: String,
    /// Display names, capped per record
    pub authors: Vec<String>,
    /// Journal title (ISO abbreviation when the full title is missing)
    pub journal: String,
    /// Publication year, absent when the record carries no usable date
    pub year: Option<i32>,
    /// Abstract sections joined with spaces
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    /// MeSH descriptor names in record order, without repeats
    pub mesh_terms: Vec<String>,
}

impl ArticleRecord {
    /// Canonical PubMed landing page for this record
    pub fn url(&self) -> String {
        article_url(&self.pmid)
    }
}

pub(crate) fn article_url(pmid: &str) -> String {
    format!("https://pubmed.ncbi.nlm.nih.gov/{pmid}/")
}

/// The relation a link query asks ELink for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    /// Articles the source cites (its references)
    Cites,
    /// Articles citing the source
    CitedBy,
    /// Articles PubMed considers similar to the source
    Similar,
}

impl RelationKind {
    /// ELink `linkname` for this relation
    pub fn link_name(&self) -> &'static str {
        match self {
            RelationKind::Cites => "pubmed_pubmed_refs",
            RelationKind::CitedBy => "pubmed_pubmed_citedin",
            RelationKind::Similar => "pubmed_pubmed",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Cites => "cites",
            RelationKind::CitedBy => "cited-by",
            RelationKind::Similar => "similar",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
