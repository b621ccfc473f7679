//! Collection membership and intra-collection citation linking

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::frontier::RelationMemo;
use super::source::BibliographicSource;
use crate::error::{PubMedError, Result};
use crate::pubmed::RelationKind;

/// Resolves a collection identifier to its member PMIDs
///
/// Collections are curated and stored elsewhere; the engine only reads them.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Member PMIDs in collection order, or `CollectionNotFound`
    async fn members(&self, collection_id: &str) -> Result<Vec<String>>;
}

/// Fixed collections held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollectionStore {
    collections: HashMap<String, Vec<String>>,
}

impl InMemoryCollectionStore {
    pub fn new(collections: HashMap<String, Vec<String>>) -> Self {
        Self { collections }
    }

    pub fn with_collection<S: Into<String>>(mut self, id: S, members: Vec<String>) -> Self {
        self.collections.insert(id.into(), members);
        self
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

#[async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn members(&self, collection_id: &str) -> Result<Vec<String>> {
        self.collections
            .get(collection_id)
            .cloned()
            .ok_or_else(|| PubMedError::CollectionNotFound {
                collection_id: collection_id.to_string(),
            })
    }
}

/// Outcome of [`IntraCollectionLinker::link`]
#[derive(Debug, Default)]
pub struct IntraCollectionLinks {
    /// Directed `(citing, cited)` pairs, both in the collection, without repeats
    pub edges: Vec<(String, String)>,
    /// Every relation result resolved while linking
    pub memo: RelationMemo,
    /// Members that took part in linking
    pub linked_members: usize,
    /// Set when a relation query failed and linking stopped early
    pub error: Option<String>,
}

/// Discovers which members of a collection cite each other
///
/// Issues two relation queries (cited-by, cites) per member, sequentially.
/// Cost grows with the collection, so only the first `max_members` members
/// are linked.
pub struct IntraCollectionLinker {
    source: Arc<dyn BibliographicSource>,
    fanout: usize,
    max_members: usize,
}

impl IntraCollectionLinker {
    pub fn new(source: Arc<dyn BibliographicSource>, fanout: usize, max_members: usize) -> Self {
        Self {
            source,
            fanout,
            max_members,
        }
    }

    #[instrument(skip(self, members), fields(members = members.len()))]
    pub async fn link(&self, members: &[String]) -> IntraCollectionLinks {
        let member_set: HashSet<&str> = members.iter().map(String::as_str).collect();
        let mut links = IntraCollectionLinks::default();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        if members.len() > self.max_members {
            warn!(
                members = members.len(),
                cap = self.max_members,
                "Collection exceeds linking cap, linking a prefix"
            );
        }

        'members: for member in members.iter().take(self.max_members) {
            for kind in [RelationKind::CitedBy, RelationKind::Cites] {
                let related = match self.source.related_ids(member, kind, self.fanout).await {
                    Ok(ids) => ids,
                    Err(e) => {
                        warn!(pmid = %member, relation = %kind, error = %e, "Intra-collection lookup failed");
                        links.error = Some(format!("{kind} lookup for {member} failed: {e}"));
                        break 'members;
                    }
                };

                for other in related.iter().filter(|id| member_set.contains(id.as_str())) {
                    if other == member {
                        continue;
                    }
                    let pair = match kind {
                        RelationKind::CitedBy => (other.clone(), member.clone()),
                        _ => (member.clone(), other.clone()),
                    };
                    if seen.insert(pair.clone()) {
                        debug!(from = %pair.0, to = %pair.1, "Intra-collection citation");
                        links.edges.push(pair);
                    }
                }

                links.memo.insert((member.clone(), kind), related);
            }
            links.linked_members += 1;
        }

        info!(
            linked = links.linked_members,
            edges = links.edges.len(),
            complete = links.error.is_none(),
            "Intra-collection linking completed"
        );
        links
    }
}
