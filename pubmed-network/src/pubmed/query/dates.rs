//! Publication date filters

use super::SearchQuery;

impl SearchQuery {
    /// Restrict to publication years `start..=end` (`[pdat]`)
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_network::SearchQuery;
    ///
    /// let query = SearchQuery::new().date_range(2019, 2024);
    /// assert_eq!(query.build(), "2019:2024[pdat]");
    /// ```
    pub fn date_range(mut self, start_year: i32, end_year: i32) -> Self {
        self.filters
            .push(format!("{start_year}:{end_year}[pdat]"));
        self
    }
}
