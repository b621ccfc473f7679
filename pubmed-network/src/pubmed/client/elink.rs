//! ELink API operations: cites, cited-by and similar-article links

use tracing::{debug, info, instrument};

use crate::common::PubMedId;
use crate::error::Result;
use crate::pubmed::models::RelationKind;
use crate::pubmed::responses::{ELinkResponse, LinkId};

use super::PubMedClient;

impl PubMedClient {
    /// Resolve the PMIDs related to `pmid` by `kind`, in ELink order
    ///
    /// Only the first link set whose `linkname` matches the relation is used.
    /// Repeats and the source itself are removed, then the list is truncated
    /// to `limit`. An upstream answer with no links is `Ok(vec![])`.
    ///
    /// # Citation coverage
    ///
    /// ELink only knows citations between PubMed-indexed articles, so counts
    /// are lower than those of Google Scholar or other broader indexes.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_network::{PubMedClient, RelationKind};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new();
    ///     let citing = client.related_ids("29622564", RelationKind::CitedBy, 20).await?;
    ///     println!("{} citing articles", citing.len());
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(pmid = %pmid, relation = %kind))]
    pub async fn related_ids(
        &self,
        pmid: &str,
        kind: RelationKind,
        limit: usize,
    ) -> Result<Vec<String>> {
        let source = PubMedId::parse(pmid)?.to_string();
        if limit == 0 {
            return Ok(Vec::new());
        }

        let response = self.elink_request(&source, kind.link_name()).await?;
        let ids = extract_link_ids(response, kind, &source, limit);

        info!(related_count = ids.len(), "Related identifiers resolved");
        Ok(ids)
    }

    /// Internal helper method for ELink API requests
    pub(crate) async fn elink_request(&self, pmid: &str, link_name: &str) -> Result<ELinkResponse> {
        let url = format!(
            "{}/elink.fcgi?dbfrom=pubmed&db=pubmed&id={}&linkname={}&retmode=json",
            self.base_url,
            urlencoding::encode(pmid),
            urlencoding::encode(link_name)
        );

        debug!("Making ELink API request");
        let response = self.make_request(&url).await?;
        let body = response.text().await?;

        if body.trim().is_empty() {
            return Ok(ELinkResponse::default());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn extract_link_ids(
    response: ELinkResponse,
    kind: RelationKind,
    source: &str,
    limit: usize,
) -> Vec<String> {
    let link_name = kind.link_name();
    let links: Vec<LinkId> = response
        .linksets
        .into_iter()
        .flat_map(|set| set.linkset_dbs.unwrap_or_default())
        .find(|db| db.link_name == link_name)
        .map(|db| db.links)
        .unwrap_or_default();

    let mut ids: Vec<String> = Vec::with_capacity(links.len().min(limit));
    for id in links.iter().filter_map(LinkId::to_pmid) {
        if ids.len() >= limit {
            break;
        }
        if id != source && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
