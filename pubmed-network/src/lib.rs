//! # PubMed Network
//!
//! Builds the citation neighborhood of PubMed articles: what cites a paper,
//! what it cites, what was published later on the same topic, and which
//! members of a curated collection cite each other.
//!
//! The crate has two layers:
//!
//! - [`pubmed`]: a rate-limited, retrying client for the E-utilities
//!   (ESearch, EFetch, ELink) and a tolerant EFetch XML record parser.
//! - [`network`]: the network-construction engine. It combines records and
//!   link queries into deduplicated, size-bounded graphs and exposes the
//!   request handlers on [`NetworkService`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use pubmed_network::{CacheConfig, NetworkConfig, NetworkService, PubMedClient};
//! use pubmed_network::network::RelationSelector;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = PubMedClient::new();
//!     let service = NetworkService::new(
//!         Arc::new(client),
//!         &CacheConfig::default(),
//!         NetworkConfig::default(),
//!     );
//!
//!     let lookup = service
//!         .citation_lookup("29622564", RelationSelector::Citations, Some(20))
//!         .await
//!         .expect("well-formed PMID");
//!     println!("{} citing articles", lookup.total_count);
//! }
//! ```

pub mod cache;
pub mod common;
pub mod config;
pub mod error;
pub mod network;
pub mod pubmed;
pub mod rate_limit;
pub mod retry;

pub use cache::{CacheConfig, CacheKey, ReadThroughCache};
pub use common::PubMedId;
pub use config::ClientConfig;
pub use error::{PubMedError, Result};
pub use network::{
    BibliographicSource, CollectionStore, NetworkConfig, NetworkOptions, NetworkService,
};
pub use pubmed::{ArticleRecord, PubMedClient, RelationKind, SearchQuery};
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
