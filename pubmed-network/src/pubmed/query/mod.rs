//! ESearch query construction

mod builder;
mod dates;
mod filters;

pub use builder::SearchQuery;
