//! Subject-heading filters for PubMed queries

use super::SearchQuery;

impl SearchQuery {
    /// Require at least one of the given MeSH terms (a single OR group)
    ///
    /// Blank terms are ignored; with nothing left no filter is added.
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_network::SearchQuery;
    ///
    /// let query = SearchQuery::new().any_mesh_terms(&["Mice", "Animals"]);
    /// assert_eq!(
    ///     query.build(),
    ///     "(\"Mice\"[MeSH Terms] OR \"Animals\"[MeSH Terms])"
    /// );
    /// assert_eq!(SearchQuery::new().any_mesh_terms::<&str>(&[]).build(), "");
    /// ```
    pub fn any_mesh_terms<S: AsRef<str>>(mut self, mesh_terms: &[S]) -> Self {
        let clauses: Vec<String> = mesh_terms
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(mesh_clause)
            .collect();

        if !clauses.is_empty() {
            self.filters.push(format!("({})", clauses.join(" OR ")));
        }
        self
    }
}

/// Quote the term so multi-word headings stay one phrase
pub(crate) fn mesh_clause(term: &str) -> String {
    format!("\"{}\"[MeSH Terms]", term.trim().replace('"', ""))
}
