//! # Search Module
//!
//! Free-text search over firms: a query is normalized, expanded with
//! synonyms and dictionary terms, looked up term by term in a weighted fuzzy
//! index, merged per firm, boosted by rank tier and explained.
//!
//! ## Key Components
//!
//! - [`normalize`] - Case and accent folding shared by every comparison
//! - [`synonyms`] - Static synonym rules and the dictionary term graph
//! - [`expansion`] - Query expansion into candidate terms
//! - [`fuzzy`] - The [`FuzzyEngine`] trait and the default [`FuzzyIndex`]
//! - [`ranker`] - Merging per-term hits and rank-tier ordering
//! - [`explain`] - Matched fields, matched terms and the explanation line
//! - [`cache`] - Query cache keyed by normalized query and limit
//! - [`tags`] - Exact tag search and tag frequencies
//! - [`stats`] - Index statistics
//! - [`engine`] - The [`SearchEngine`] context tying the pieces together
//! - [`tools`] - MCP tool implementations for search operations
//! - [`config`] - Configuration constants and TOML overrides

pub mod cache;
pub mod config;
pub mod engine;
pub mod expansion;
pub mod explain;
pub mod fuzzy;
pub mod normalize;
pub mod outputs;
pub mod ranker;
pub mod stats;
pub mod synonyms;
pub mod tags;
pub mod tools;

pub use config::SearchConfig;
pub use engine::SearchEngine;
pub use expansion::QueryExpander;
pub use fuzzy::{FuzzyEngine, FuzzyHit, FuzzyIndex};
pub use outputs::SearchResult;
pub use tools::SearchTools;
