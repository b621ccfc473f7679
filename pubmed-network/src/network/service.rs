//! Request handlers of the network engine

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::collection::IntraCollectionLinker;
use super::config::{NetworkConfig, NetworkOptions};
use super::frontier::{BoundedFrontier, RelationMemo, expand};
use super::graph::{GraphAssembler, NodeType, Relationship};
use super::payload::{
    CitationLookup, CitationNetwork, CitationNetworkCounts, HybridCounts, HybridNetwork,
    LaterWorkLookup, MatchKind, RelatedArticle, RelationSelector, placeholder_record,
};
use super::source::BibliographicSource;
use super::temporal::{TemporalExpansionResolver, current_year, is_later};
use crate::cache::{CacheConfig, CacheKey, ReadThroughCache};
use crate::common::PubMedId;
use crate::error::{PubMedError, Result};
use crate::pubmed::{ArticleRecord, RelationKind};

/// Builds citation lookups and networks on top of a [`BibliographicSource`]
///
/// Construct one per process and share it; the caches it owns are shared by
/// every request, as is the source's rate ceiling.
///
/// Well-formed requests never fail on upstream trouble: they answer with a
/// payload flagged `fallback` or `partial` instead. Only malformed input
/// yields an `Err`.
pub struct NetworkService {
    source: Arc<dyn BibliographicSource>,
    config: NetworkConfig,
    temporal: TemporalExpansionResolver,
    linker: IntraCollectionLinker,
    citations: ReadThroughCache<CitationLookup>,
    later_work: ReadThroughCache<LaterWorkLookup>,
    hybrid: ReadThroughCache<HybridNetwork>,
    networks: ReadThroughCache<CitationNetwork>,
    current_year: Option<i32>,
}

impl NetworkService {
    pub fn new(
        source: Arc<dyn BibliographicSource>,
        cache_config: &CacheConfig,
        config: NetworkConfig,
    ) -> Self {
        let temporal = TemporalExpansionResolver::new(source.clone(), config.mesh_terms_for_search);
        let linker = IntraCollectionLinker::new(
            source.clone(),
            config.per_seed_fanout,
            config.max_intra_collection_members,
        );

        Self {
            source,
            temporal,
            linker,
            citations: ReadThroughCache::new(cache_config),
            later_work: ReadThroughCache::new(cache_config),
            hybrid: ReadThroughCache::new(cache_config),
            networks: ReadThroughCache::new(cache_config),
            config,
            current_year: None,
        }
    }

    /// Pin the year later-work lookups treat as "now"
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Drop every cached result
    pub async fn clear_caches(&self) {
        self.citations.clear().await;
        self.later_work.clear().await;
        self.hybrid.clear().await;
        self.networks.clear().await;
    }

    fn current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(current_year)
    }

    // -----------------------------------------------------------------------
    // Citation lookup
    // -----------------------------------------------------------------------

    /// Articles related to `pmid` through `selector`, in upstream order
    #[instrument(skip(self))]
    pub async fn citation_lookup(
        &self,
        pmid: &str,
        selector: RelationSelector,
        limit: Option<usize>,
    ) -> Result<CitationLookup> {
        let pmid = PubMedId::parse(pmid)?.to_string();
        let limit = self
            .config
            .clamp_limit(limit, self.config.default_lookup_limit);
        let key = CacheKey::new("citations")
            .param("pmid", &pmid)
            .param("relation", selector)
            .param("limit", limit);

        let result = self
            .citations
            .get_or_compute(key, || self.resolve_citations(&pmid, selector, limit))
            .await;

        match result {
            Err(e) if e.is_degradable() => {
                warn!(error = %e, "Citation lookup degraded to placeholder");
                Ok(CitationLookup::fallback(
                    placeholder_record(&pmid),
                    selector,
                    unavailable_message(&e),
                ))
            }
            other => other,
        }
    }

    async fn resolve_citations(
        &self,
        pmid: &str,
        selector: RelationSelector,
        limit: usize,
    ) -> Result<CitationLookup> {
        let source = self.fetch_seed(pmid).await?;

        let related = match self.related_records(pmid, selector.kind(), limit).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Related articles unavailable");
                return Ok(CitationLookup::fallback(
                    source,
                    selector,
                    format!("Related articles are temporarily unavailable: {e}"),
                ));
            }
        };

        let citations: Vec<RelatedArticle> = related
            .into_iter()
            .map(|record| RelatedArticle::new(record, selector.match_kind()))
            .collect();
        let message = citations
            .is_empty()
            .then(|| format!("No {selector} found for PMID {pmid}"));

        info!(count = citations.len(), "Citation lookup completed");
        Ok(CitationLookup {
            source_article: source.into(),
            total_count: citations.len(),
            citations,
            relation: selector,
            fallback: false,
            message,
        })
    }

    // -----------------------------------------------------------------------
    // Later work
    // -----------------------------------------------------------------------

    /// Articles published after `pmid`, from its citations and its subject area
    ///
    /// Citing articles are merged with subject/date search results, sorted by
    /// year (newest first) then relevance, and truncated to `limit`. Every
    /// returned article has a year strictly after the source's.
    #[instrument(skip(self))]
    pub async fn later_work(&self, pmid: &str, limit: Option<usize>) -> Result<LaterWorkLookup> {
        let pmid = PubMedId::parse(pmid)?.to_string();
        let limit = self
            .config
            .clamp_limit(limit, self.config.default_lookup_limit);
        let current_year = self.current_year();
        let key = CacheKey::new("later_work")
            .param("pmid", &pmid)
            .param("limit", limit)
            .param("year", current_year);

        let result = self
            .later_work
            .get_or_compute(key, || self.resolve_later_work(&pmid, limit, current_year))
            .await;

        match result {
            Err(e) if e.is_degradable() => {
                warn!(error = %e, "Later-work lookup degraded to placeholder");
                Ok(LaterWorkLookup::fallback(
                    placeholder_record(&pmid),
                    unavailable_message(&e),
                ))
            }
            other => other,
        }
    }

    async fn resolve_later_work(
        &self,
        pmid: &str,
        limit: usize,
        current_year: i32,
    ) -> Result<LaterWorkLookup> {
        let source = self.fetch_seed(pmid).await?;
        let mesh_terms = source.mesh_terms.clone();

        let mut lookup = LaterWorkLookup {
            source_article: source.clone().into(),
            later_articles: Vec::new(),
            total_count: 0,
            citation_matches: 0,
            topic_matches: 0,
            same_year_citations: 0,
            search_skipped: false,
            partial: false,
            fallback: false,
            message: None,
        };

        // The only place a missing year falls back to "now"
        let source_year = match source.year {
            Some(year) => year,
            None => {
                lookup.message = Some(format!(
                    "PMID {pmid} has no publication year; later work cannot be determined"
                ));
                current_year
            }
        };

        if source_year >= current_year {
            debug!(source_year, current_year, "No later year exists yet");
            lookup.search_skipped = true;
            if lookup.message.is_none() {
                lookup.message = Some(format!(
                    "PMID {pmid} was published in {source_year}; no later work exists yet"
                ));
            }
            return Ok(lookup);
        }

        let mut warnings = Vec::new();

        // Citing candidates are admitted from the source year onwards; only
        // strictly later ones are returned.
        let citing = match self
            .related_records(pmid, RelationKind::CitedBy, self.config.per_seed_fanout)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Citing articles unavailable");
                warnings.push(format!("Citing articles unavailable: {e}"));
                Vec::new()
            }
        };
        let candidates: Vec<ArticleRecord> = citing
            .into_iter()
            .filter(|r| r.year.is_some_and(|year| year >= source_year))
            .collect();
        lookup.same_year_citations = candidates
            .iter()
            .filter(|r| r.year == Some(source_year))
            .count();

        let mut merged: Vec<RelatedArticle> = candidates
            .into_iter()
            .filter(|r| is_later(r, source_year))
            .map(|r| RelatedArticle::new(r, MatchKind::Citation))
            .collect();

        if merged.len() < limit {
            match self
                .temporal
                .later_work(source_year, &mesh_terms, limit, current_year)
                .await
            {
                Ok(records) => merged.extend(
                    records
                        .into_iter()
                        .map(|r| RelatedArticle::new(self.cap_authors(r), MatchKind::Topic)),
                ),
                Err(e) => {
                    warn!(error = %e, "Topic search unavailable");
                    warnings.push(format!("Topic search unavailable: {e}"));
                }
            }
        }

        let mut seen = HashSet::new();
        merged.retain(|a| a.record.pmid != pmid && seen.insert(a.record.pmid.clone()));
        merged.sort_by(|a, b| {
            b.record
                .year
                .cmp(&a.record.year)
                .then(b.relevance.total_cmp(&a.relevance))
        });
        merged.truncate(limit);

        lookup.citation_matches = merged
            .iter()
            .filter(|a| a.match_type == MatchKind::Citation)
            .count();
        lookup.topic_matches = merged
            .iter()
            .filter(|a| a.match_type == MatchKind::Topic)
            .count();
        lookup.total_count = merged.len();
        lookup.later_articles = merged;
        if !warnings.is_empty() {
            lookup.partial = true;
            lookup.message = Some(warnings.join("; "));
        }

        info!(
            source_year,
            citation_matches = lookup.citation_matches,
            topic_matches = lookup.topic_matches,
            partial = lookup.partial,
            "Later-work lookup completed"
        );
        Ok(lookup)
    }

    // -----------------------------------------------------------------------
    // Hybrid collection network
    // -----------------------------------------------------------------------

    /// A collection's internal citations plus a bounded external expansion
    ///
    /// Members are resolved by the caller (see
    /// [`CollectionStore`](super::CollectionStore)). Members that are not
    /// valid PMIDs are skipped with a warning. The graph holds at most
    /// `limit` external nodes on top of the members.
    #[instrument(skip(self, members), fields(members = members.len()))]
    pub async fn hybrid_network(
        &self,
        collection_id: &str,
        members: &[String],
        options: NetworkOptions,
    ) -> Result<HybridNetwork> {
        let (members, skipped) = normalize_members(members);
        let budget = self
            .config
            .clamp_limit(options.limit, self.config.default_network_limit);
        let key = CacheKey::new("hybrid_network")
            .param("collection", collection_id)
            .param("members", members.join(","))
            .param("citations", options.include_citations)
            .param("references", options.include_references)
            .param("limit", budget);

        let mut network = self
            .hybrid
            .get_or_compute(key, || {
                self.build_hybrid(collection_id, &members, &options, budget)
            })
            .await?;

        if !skipped.is_empty() {
            network.warnings.push(format!(
                "Skipped malformed member identifiers: {}",
                skipped.join(", ")
            ));
        }
        Ok(network)
    }

    async fn build_hybrid(
        &self,
        collection_id: &str,
        members: &[String],
        options: &NetworkOptions,
        budget: usize,
    ) -> Result<HybridNetwork> {
        let mut graph = GraphAssembler::new();
        let mut warnings = Vec::new();
        let mut partial = false;
        let mut fallback = false;

        let records = if members.is_empty() {
            Vec::new()
        } else {
            match self.fetch_records(members).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, "Collection metadata unavailable");
                    warnings.push(format!("Collection metadata unavailable: {e}"));
                    fallback = true;
                    Vec::new()
                }
            }
        };

        let mut by_id: HashMap<String, ArticleRecord> =
            records.into_iter().map(|r| (r.pmid.clone(), r)).collect();
        let mut missing = 0;
        for member in members {
            let record = by_id.remove(member).unwrap_or_else(|| {
                missing += 1;
                placeholder_record(member)
            });
            graph.add_node(record, NodeType::CollectionMember, None);
        }
        if missing > 0 && !fallback {
            partial = true;
            warnings.push(format!("{missing} collection member(s) without metadata"));
        }

        let mut external_count = 0;
        if !fallback && !members.is_empty() {
            let links = self.linker.link(members).await;
            for (from, to) in &links.edges {
                graph.add_edge(from, to, Relationship::IntraCollectionCitation);
            }

            match links.error {
                Some(error) => {
                    partial = true;
                    warnings.push(error);
                }
                None => {
                    let (added, complete) = self
                        .expand_external(
                            &mut graph,
                            members,
                            options,
                            budget,
                            &links.memo,
                            &mut warnings,
                        )
                        .await;
                    external_count = added;
                    partial |= !complete;
                }
            }
        }

        let intra_collection_edges = graph.count_edges(Relationship::IntraCollectionCitation);
        let (nodes, edges) = graph.finish();
        let counts = HybridCounts {
            collection_size: members.len(),
            external_count,
            intra_collection_edges,
            total_nodes: nodes.len(),
            total_edges: edges.len(),
        };

        info!(
            collection_size = counts.collection_size,
            external = counts.external_count,
            intra_edges = counts.intra_collection_edges,
            partial,
            fallback,
            "Hybrid network assembled"
        );
        Ok(HybridNetwork {
            collection_id: collection_id.to_string(),
            nodes,
            edges,
            counts,
            partial,
            fallback,
            warnings,
        })
    }

    // -----------------------------------------------------------------------
    // Single-article network
    // -----------------------------------------------------------------------

    /// One seed article with its citing and referenced articles
    #[instrument(skip(self))]
    pub async fn citation_network(
        &self,
        pmid: &str,
        options: NetworkOptions,
    ) -> Result<CitationNetwork> {
        let pmid = PubMedId::parse(pmid)?.to_string();
        let budget = self
            .config
            .clamp_limit(options.limit, self.config.default_network_limit);
        let key = CacheKey::new("citation_network")
            .param("pmid", &pmid)
            .param("citations", options.include_citations)
            .param("references", options.include_references)
            .param("limit", budget);

        let result = self
            .networks
            .get_or_compute(key, || self.build_citation_network(&pmid, &options, budget))
            .await;

        match result {
            Err(e) if e.is_degradable() => {
                warn!(error = %e, "Citation network degraded to placeholder");
                let mut graph = GraphAssembler::new();
                graph.add_node(placeholder_record(&pmid), NodeType::Seed, None);
                let (nodes, edges) = graph.finish();
                Ok(CitationNetwork {
                    source_pmid: pmid,
                    counts: CitationNetworkCounts {
                        total_nodes: nodes.len(),
                        ..Default::default()
                    },
                    nodes,
                    edges,
                    partial: false,
                    fallback: true,
                    warnings: vec![unavailable_message(&e)],
                })
            }
            other => other,
        }
    }

    async fn build_citation_network(
        &self,
        pmid: &str,
        options: &NetworkOptions,
        budget: usize,
    ) -> Result<CitationNetwork> {
        let seed = self.fetch_seed(pmid).await?;
        let mut graph = GraphAssembler::new();
        graph.add_node(seed, NodeType::Seed, None);

        let mut warnings = Vec::new();
        let seeds = [pmid.to_string()];
        let (_, complete) = self
            .expand_external(
                &mut graph,
                &seeds,
                options,
                budget,
                &RelationMemo::new(),
                &mut warnings,
            )
            .await;

        let (nodes, edges) = graph.finish();
        let count_type = |node_type: NodeType| {
            nodes
                .iter()
                .filter(|n| n.metadata.node_type == node_type)
                .count()
        };
        let counts = CitationNetworkCounts {
            citing_count: count_type(NodeType::CitingExternal),
            referenced_count: count_type(NodeType::ReferencedExternal),
            total_nodes: nodes.len(),
            total_edges: edges.len(),
        };

        info!(
            citing = counts.citing_count,
            referenced = counts.referenced_count,
            partial = !complete,
            "Citation network assembled"
        );
        Ok(CitationNetwork {
            source_pmid: pmid.to_string(),
            nodes,
            edges,
            counts,
            partial: !complete,
            fallback: false,
            warnings,
        })
    }

    // -----------------------------------------------------------------------
    // Shared steps
    // -----------------------------------------------------------------------

    /// Grow `graph` from `seeds` through the relations `options` enables
    ///
    /// Seeds must already be nodes. Returns the number of external nodes added
    /// and whether every step succeeded. Relation results never add edges
    /// between two seeds.
    async fn expand_external(
        &self,
        graph: &mut GraphAssembler,
        seeds: &[String],
        options: &NetworkOptions,
        budget: usize,
        memo: &RelationMemo,
        warnings: &mut Vec<String>,
    ) -> (usize, bool) {
        let kinds = options.relation_kinds();
        if kinds.is_empty() {
            return (0, true);
        }

        let mut complete = true;
        let mut frontier = BoundedFrontier::new(budget, seeds.iter().cloned());
        let expansion = expand(
            self.source.as_ref(),
            seeds,
            &kinds,
            self.config.per_seed_fanout,
            &mut frontier,
            memo,
        )
        .await;
        if let Some(error) = expansion.error {
            complete = false;
            warnings.push(error);
        }

        let mut added = 0;
        let admitted = frontier.admitted_ids();
        if !admitted.is_empty() {
            match self.fetch_records(&admitted).await {
                Ok(records) => {
                    let mut by_id: HashMap<String, ArticleRecord> =
                        records.into_iter().map(|r| (r.pmid.clone(), r)).collect();
                    for (id, via) in frontier.admitted() {
                        let Some(record) = by_id.remove(id) else {
                            debug!(pmid = %id, "No metadata for external article, skipped");
                            continue;
                        };
                        if graph.add_node(
                            record,
                            NodeType::for_external(*via),
                            Some(Relationship::for_relation(*via)),
                        ) {
                            added += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "External article metadata unavailable");
                    complete = false;
                    warnings.push(format!("External article metadata unavailable: {e}"));
                }
            }
        }

        let seed_set: HashSet<&str> = seeds.iter().map(String::as_str).collect();
        for (seed, kind, ids) in &expansion.relations {
            let external: Vec<String> = ids
                .iter()
                .filter(|id| !seed_set.contains(id.as_str()))
                .cloned()
                .collect();
            graph.add_relation(seed, *kind, &external);
        }

        debug!(
            queries = expansion.queries,
            admitted = admitted.len(),
            added,
            "External expansion finished"
        );
        (added, complete)
    }

    /// Records for `pmids` with author lists cut to the configured cap
    async fn fetch_records(&self, pmids: &[String]) -> Result<Vec<ArticleRecord>> {
        let records = self.source.fetch_records(pmids).await?;
        Ok(records.into_iter().map(|r| self.cap_authors(r)).collect())
    }

    fn cap_authors(&self, mut record: ArticleRecord) -> ArticleRecord {
        record.authors.truncate(self.config.author_cap);
        record
    }

    /// Metadata for a seed PMID, or `RecordNotFound`
    async fn fetch_seed(&self, pmid: &str) -> Result<ArticleRecord> {
        let records = self.fetch_records(&[pmid.to_string()]).await?;
        records
            .into_iter()
            .find(|r| r.pmid == pmid)
            .ok_or_else(|| PubMedError::RecordNotFound {
                pmid: pmid.to_string(),
            })
    }

    /// Records related to `pmid` by `kind`, in link order, without the source
    async fn related_records(
        &self,
        pmid: &str,
        kind: RelationKind,
        limit: usize,
    ) -> Result<Vec<ArticleRecord>> {
        let ids: Vec<String> = self
            .source
            .related_ids(pmid, kind, limit)
            .await?
            .into_iter()
            .filter(|id| id != pmid)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<String, ArticleRecord> = self
            .fetch_records(&ids)
            .await?
            .into_iter()
            .map(|r| (r.pmid.clone(), r))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

/// Valid PMIDs in first-seen order, plus the entries that were not PMIDs
fn normalize_members(members: &[String]) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut valid = Vec::new();
    let mut skipped = Vec::new();
    for member in members {
        match PubMedId::parse(member) {
            Ok(id) => {
                let id = id.to_string();
                if seen.insert(id.clone()) {
                    valid.push(id);
                }
            }
            Err(_) => skipped.push(member.clone()),
        }
    }
    (valid, skipped)
}

fn unavailable_message(error: &PubMedError) -> String {
    match error {
        PubMedError::RecordNotFound { pmid } => {
            format!("No metadata is available for PMID {pmid} yet")
        }
        other => format!("Article data is temporarily unavailable: {other}"),
    }
}
