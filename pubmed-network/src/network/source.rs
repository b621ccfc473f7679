use async_trait::async_trait;

use crate::error::Result;
use crate::pubmed::{ArticleRecord, PubMedClient, RelationKind, SearchQuery};

/// The three upstream capabilities the network engine consumes
///
/// [`PubMedClient`] is the production implementation; every call it makes
/// passes through its shared rate limiter and retry policy.
#[async_trait]
pub trait BibliographicSource: Send + Sync {
    /// Search and return matching PMIDs, at most `query.get_limit()`
    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>>;

    /// Fetch records for a batch of PMIDs; unparseable records are omitted
    async fn fetch_records(&self, pmids: &[String]) -> Result<Vec<ArticleRecord>>;

    /// PMIDs related to `pmid` by `kind`, at most `limit`
    async fn related_ids(&self, pmid: &str, kind: RelationKind, limit: usize)
    -> Result<Vec<String>>;
}

#[async_trait]
impl BibliographicSource for PubMedClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>> {
        query.search(self).await
    }

    async fn fetch_records(&self, pmids: &[String]) -> Result<Vec<ArticleRecord>> {
        PubMedClient::fetch_records(self, pmids).await
    }

    async fn related_ids(
        &self,
        pmid: &str,
        kind: RelationKind,
        limit: usize,
    ) -> Result<Vec<String>> {
        PubMedClient::related_ids(self, pmid, kind, limit).await
    }
}
