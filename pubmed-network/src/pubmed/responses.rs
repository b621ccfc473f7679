use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESearchResult {
    pub esearchresult: ESearchData,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESearchData {
    #[serde(default, rename = "ERROR")]
    pub error: Option<String>,
    #[serde(default)]
    pub count: Option<String>,
    #[serde(default)]
    pub idlist: Vec<String>,
}

// ELink API response structures
//
// NCBI omits `linksets`, `linksetdbs` or `links` entirely when there is
// nothing to report, so every level defaults to empty.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct ELinkResponse {
    #[serde(rename = "linksets", default)]
    pub linksets: Vec<ELinkSet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ELinkSet {
    #[serde(rename = "dbfrom", default)]
    pub db_from: Option<String>,
    #[serde(rename = "ids", default)]
    pub ids: Vec<LinkId>,
    #[serde(rename = "linksetdbs", default)]
    pub linkset_dbs: Option<Vec<ELinkSetDb>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ELinkSetDb {
    #[serde(rename = "dbto", default)]
    pub db_to: Option<String>,
    #[serde(rename = "linkname", default)]
    pub link_name: String,
    #[serde(rename = "links", default)]
    pub links: Vec<LinkId>,
}

/// One linked identifier in any of the shapes ELink has been seen to emit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum LinkId {
    Text(String),
    Number(u64),
    Scored {
        id: Box<LinkId>,
        #[serde(default)]
        #[allow(dead_code)]
        score: Option<serde_json::Value>,
    },
}

impl LinkId {
    /// The identifier as a decimal string, if it is one
    pub fn to_pmid(&self) -> Option<String> {
        match self {
            LinkId::Text(s) => {
                let s = s.trim();
                (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())).then(|| s.to_string())
            }
            LinkId::Number(n) => Some(n.to_string()),
            LinkId::Scored { id, .. } => id.to_pmid(),
        }
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkId::Text(s) => write!(f, "{s}"),
            LinkId::Number(n) => write!(f, "{n}"),
            LinkId::Scored { id, .. } => write!(f, "{id}"),
        }
    }
}
