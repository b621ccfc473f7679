//! Budget-bounded expansion from a set of seeds

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::source::BibliographicSource;
use crate::pubmed::RelationKind;

/// Relation query results already resolved, keyed by `(seed, kind)`
pub type RelationMemo = HashMap<(String, RelationKind), Vec<String>>;

/// New identifiers admitted under a fixed node budget
///
/// Identifiers passed to [`BoundedFrontier::new`] as known (seeds, collection
/// members) are never admitted and do not consume budget.
#[derive(Debug)]
pub struct BoundedFrontier {
    budget: usize,
    seen: HashSet<String>,
    admitted: Vec<(String, RelationKind)>,
}

impl BoundedFrontier {
    pub fn new<I, S>(budget: usize, known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            budget,
            seen: known.into_iter().map(Into::into).collect(),
            admitted: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.budget.saturating_sub(self.admitted.len())
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Admit unseen identifiers in order until the budget runs out
    ///
    /// Returns how many were admitted.
    pub fn admit(&mut self, ids: &[String], via: RelationKind) -> usize {
        let mut count = 0;
        for id in ids {
            if self.is_exhausted() {
                break;
            }
            if self.seen.insert(id.clone()) {
                self.admitted.push((id.clone(), via));
                count += 1;
            }
        }
        count
    }

    /// Admitted identifiers with the relation that first reached them
    pub fn admitted(&self) -> &[(String, RelationKind)] {
        &self.admitted
    }

    pub fn admitted_ids(&self) -> Vec<String> {
        self.admitted.iter().map(|(id, _)| id.clone()).collect()
    }
}

/// Outcome of [`expand`]
#[derive(Debug, Default)]
pub struct Expansion {
    /// Every relation result obtained, including ones whose ids were not admitted
    pub relations: Vec<(String, RelationKind, Vec<String>)>,
    /// Relation queries issued upstream
    pub queries: usize,
    /// Set when a relation query failed and expansion stopped early
    pub error: Option<String>,
}

/// Expand `seeds` through `kinds`, one relation query at a time
///
/// The remaining budget is checked before each query; once it is spent no
/// further queries are issued. Results already present in `memo` are reused
/// without a query. The first upstream failure stops the expansion and keeps
/// what was gathered so far.
pub async fn expand(
    source: &dyn BibliographicSource,
    seeds: &[String],
    kinds: &[RelationKind],
    fanout: usize,
    frontier: &mut BoundedFrontier,
    memo: &RelationMemo,
) -> Expansion {
    let mut expansion = Expansion::default();

    'seeds: for seed in seeds {
        for &kind in kinds {
            if frontier.is_exhausted() {
                debug!(seed = %seed, "Node budget exhausted, stopping expansion");
                break 'seeds;
            }

            let ids = match memo.get(&(seed.clone(), kind)) {
                Some(ids) => ids.clone(),
                None => {
                    expansion.queries += 1;
                    match source.related_ids(seed, kind, fanout).await {
                        Ok(ids) => ids,
                        Err(e) => {
                            warn!(seed = %seed, relation = %kind, error = %e, "Expansion query failed");
                            expansion.error =
                                Some(format!("{kind} lookup for {seed} failed: {e}"));
                            break 'seeds;
                        }
                    }
                }
            };

            let admitted = frontier.admit(&ids, kind);
            debug!(
                seed = %seed,
                relation = %kind,
                found = ids.len(),
                admitted,
                remaining = frontier.remaining(),
                "Expanded seed"
            );
            expansion.relations.push((seed.clone(), kind, ids));
        }
    }

    expansion
}
