//! Identifier types shared across the client and the network engine

pub mod ids;

pub use ids::PubMedId;
