//! Citation network construction
//!
//! - `source` - the upstream capabilities the engine consumes
//! - `graph` - node/edge assembly and deduplication
//! - `frontier` - node budget and budget-checked expansion
//! - `temporal` - later-work search by subject and date
//! - `collection` - collection membership and intra-collection linking
//! - `service` - the request handlers and their read-through caches
//! - `payload` - handler responses

pub mod collection;
pub mod config;
pub mod frontier;
pub mod graph;
pub mod payload;
pub mod service;
pub mod source;
pub mod temporal;

#[cfg(test)]
pub(crate) mod testing;

pub use collection::{CollectionStore, InMemoryCollectionStore, IntraCollectionLinker};
pub use config::{NetworkConfig, NetworkOptions};
pub use frontier::BoundedFrontier;
pub use graph::{GraphAssembler, NetworkEdge, NetworkNode, NodeType, Relationship};
pub use payload::{
    CitationLookup, CitationNetwork, HybridNetwork, LaterWorkLookup, MatchKind,
    PLACEHOLDER_TITLE, RelatedArticle, RelationSelector,
};
pub use service::NetworkService;
pub use source::BibliographicSource;
pub use temporal::TemporalExpansionResolver;
