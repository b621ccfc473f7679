//! Core SearchQuery builder with basic functionality

use crate::error::Result;
use crate::pubmed::{ArticleRecord, PubMedClient};

/// Builder for constructing PubMed search queries
///
/// Free-text terms are space-joined; every filter is AND-combined with them.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub(crate) terms: Vec<String>,
    pub(crate) filters: Vec<String>,
    pub(crate) limit: Option<usize>,
}

impl SearchQuery {
    /// Create a new search query builder
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
            filters: Vec::new(),
            limit: None,
        }
    }

    /// Add search terms
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_network::SearchQuery;
    ///
    /// let query = SearchQuery::new().query("covid-19 treatment");
    /// assert_eq!(query.build(), "covid-19 treatment");
    /// ```
    pub fn query<S: Into<String>>(mut self, terms: S) -> Self {
        self.terms.push(terms.into());
        self
    }

    /// Set the maximum number of results to return
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build the final query string
    pub fn build(&self) -> String {
        let mut parts = Vec::new();

        if !self.terms.is_empty() {
            parts.push(self.terms.join(" "));
        }

        parts.extend(self.filters.iter().cloned());

        parts.join(" AND ")
    }

    /// Get the limit for this query
    pub fn get_limit(&self) -> usize {
        self.limit.unwrap_or(20)
    }

    /// Execute the search and return matching PMIDs
    pub async fn search(&self, client: &PubMedClient) -> Result<Vec<String>> {
        let query_string = self.build();
        client.search_articles(&query_string, self.get_limit()).await
    }

    /// Execute the search and fetch the matching records
    pub async fn search_and_fetch(&self, client: &PubMedClient) -> Result<Vec<ArticleRecord>> {
        let pmids = self.search(client).await?;
        client.fetch_records(&pmids).await
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new()
    }
}
