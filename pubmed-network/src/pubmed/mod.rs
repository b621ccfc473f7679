//! PubMed E-utilities client and EFetch record parser
//!
//! - `client/mod.rs` - client struct, constructors, ESearch, EFetch and the
//!   shared request path (rate limiter + retry policy)
//! - `client/elink` - cites / cited-by / similar link queries
//! - `parser` - tolerant EFetch XML to [`ArticleRecord`] conversion
//! - `query` - ESearch query builder

pub mod client;
pub mod models;
pub mod parser;
pub mod query;
pub(crate) mod responses;

pub use client::PubMedClient;
pub use models::{ArticleRecord, RelationKind};
pub use parser::parse_records;
pub use query::SearchQuery;
