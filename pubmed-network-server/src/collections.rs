//! File-backed collection definitions
//!
//! The file maps collection ids to member PMIDs, e.g.
//!
//! ```yaml
//! oncology-reading-list:
//!   - "29622564"
//!   - 31978945
//! ```
//!
//! Files ending in `.json` are read as JSON, anything else as YAML.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use pubmed_network::network::InMemoryCollectionStore;

/// PMIDs may be written as strings or bare numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MemberId {
    Text(String),
    Number(u64),
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        match id {
            MemberId::Text(text) => text.trim().to_string(),
            MemberId::Number(number) => number.to_string(),
        }
    }
}

pub fn parse_collections(content: &str, json: bool) -> Result<InMemoryCollectionStore> {
    let raw: HashMap<String, Vec<MemberId>> = if json {
        serde_json::from_str(content).context("invalid collections JSON")?
    } else {
        serde_yaml::from_str(content).context("invalid collections YAML")?
    };

    let collections = raw
        .into_iter()
        .map(|(id, members)| (id, members.into_iter().map(String::from).collect()))
        .collect();
    Ok(InMemoryCollectionStore::new(collections))
}

pub fn load_collections(path: &Path) -> Result<InMemoryCollectionStore> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read collections file {}", path.display()))?;
    let json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    parse_collections(&content, json)
        .with_context(|| format!("failed to load collections from {}", path.display()))
}
