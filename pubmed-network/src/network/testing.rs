//! In-process stand-in for the upstream service

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::source::BibliographicSource;
use crate::error::{PubMedError, Result};
use crate::pubmed::{ArticleRecord, RelationKind, SearchQuery};

pub(crate) fn record(pmid: &str, year: Option<i32>) -> ArticleRecord {
    ArticleRecord {
        pmid: pmid.to_string(),
        title: format!("Article {pmid}"),
        authors: vec!["Ada Lovelace".to_string()],
        journal: "Journal".to_string(),
        year,
        abstract_text: None,
        doi: None,
        mesh_terms: vec![],
    }
}

pub(crate) fn unavailable() -> PubMedError {
    PubMedError::UpstreamUnavailable {
        attempts: 4,
        reason: "Server error".to_string(),
    }
}

#[derive(Default)]
pub(crate) struct FakeSource {
    pub records: HashMap<String, ArticleRecord>,
    pub relations: HashMap<(String, RelationKind), Vec<String>>,
    pub search_results: Vec<String>,
    pub fail_fetch: bool,
    /// Fail any batch that asks for one of these PMIDs
    pub fail_fetch_for: Vec<String>,
    pub fail_search: bool,
    pub fail_relations_for: Vec<String>,
    /// Fail only the given `(pmid, kind)` relation queries
    pub fail_relations: Vec<(String, RelationKind)>,
    pub searches: Mutex<Vec<String>>,
    pub relation_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_record(mut self, record: ArticleRecord) -> Self {
        self.records.insert(record.pmid.clone(), record);
        self
    }

    pub fn with_relation(mut self, pmid: &str, kind: RelationKind, ids: &[&str]) -> Self {
        self.relations.insert(
            (pmid.to_string(), kind),
            ids.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn relation_count(&self) -> usize {
        self.relation_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BibliographicSource for FakeSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>> {
        if let Ok(mut searches) = self.searches.lock() {
            searches.push(query.build());
        }
        if self.fail_search {
            return Err(unavailable());
        }
        Ok(self
            .search_results
            .iter()
            .take(query.get_limit())
            .cloned()
            .collect())
    }

    async fn fetch_records(&self, pmids: &[String]) -> Result<Vec<ArticleRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch || pmids.iter().any(|id| self.fail_fetch_for.contains(id)) {
            return Err(unavailable());
        }
        Ok(pmids
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect())
    }

    async fn related_ids(
        &self,
        pmid: &str,
        kind: RelationKind,
        limit: usize,
    ) -> Result<Vec<String>> {
        self.relation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_relations_for.iter().any(|p| p == pmid)
            || self
                .fail_relations
                .iter()
                .any(|(p, k)| p == pmid && *k == kind)
        {
            return Err(unavailable());
        }
        let mut ids = self
            .relations
            .get(&(pmid.to_string(), kind))
            .cloned()
            .unwrap_or_default();
        ids.truncate(limit);
        Ok(ids)
    }
}
