//! Topic-scoped, date-bounded search for work published after a source year

use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use super::source::BibliographicSource;
use crate::error::Result;
use crate::pubmed::{ArticleRecord, SearchQuery};

/// Current calendar year (UTC)
pub fn current_year() -> i32 {
    OffsetDateTime::now_utc().year()
}

/// Whether `record` was published strictly after `source_year`
///
/// Records without a year are never considered later.
pub fn is_later(record: &ArticleRecord, source_year: i32) -> bool {
    record.year.is_some_and(|year| year > source_year)
}

/// Finds records on the same subject published after a reference year
pub struct TemporalExpansionResolver {
    source: Arc<dyn BibliographicSource>,
    mesh_terms_for_search: usize,
}

impl TemporalExpansionResolver {
    pub fn new(source: Arc<dyn BibliographicSource>, mesh_terms_for_search: usize) -> Self {
        Self {
            source,
            mesh_terms_for_search,
        }
    }

    /// The search issued for a later-work lookup
    ///
    /// The leading MeSH terms are OR-combined; without any the date range
    /// stands alone.
    pub fn build_query(
        &self,
        source_year: i32,
        mesh_terms: &[String],
        limit: usize,
        current_year: i32,
    ) -> SearchQuery {
        let top = &mesh_terms[..mesh_terms.len().min(self.mesh_terms_for_search)];
        SearchQuery::new()
            .any_mesh_terms(top)
            .date_range(source_year + 1, current_year)
            .limit(limit)
    }

    /// Records on the source's subject published after `source_year`
    ///
    /// Returns an empty list without searching when `source_year` has not
    /// ended yet. The upstream date filter is advisory, so results are
    /// filtered again on their parsed year.
    #[instrument(skip(self, mesh_terms), fields(mesh_terms = mesh_terms.len()))]
    pub async fn later_work(
        &self,
        source_year: i32,
        mesh_terms: &[String],
        limit: usize,
        current_year: i32,
    ) -> Result<Vec<ArticleRecord>> {
        if source_year >= current_year || limit == 0 {
            debug!("No later year to search");
            return Ok(Vec::new());
        }

        let query = self.build_query(source_year, mesh_terms, limit, current_year);
        let pmids = self.source.search(&query).await?;
        if pmids.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = self.source.fetch_records(&pmids).await?;
        let total = fetched.len();
        let later: Vec<ArticleRecord> = fetched
            .into_iter()
            .filter(|record| is_later(record, source_year))
            .take(limit)
            .collect();

        info!(
            found = pmids.len(),
            fetched = total,
            later = later.len(),
            "Topic search completed"
        );
        Ok(later)
    }
}
