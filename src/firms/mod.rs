//! # Firms Module
//!
//! Firm records and everything needed to load them: spreadsheet row
//! grouping, the optional auxiliary dictionary, the loaded catalog and the
//! catalog lookups exposed as MCP tools.
//!
//! ## Key Components
//!
//! - [`types`] - The [`Firm`] record and its lenient wire format
//! - [`sheets`] - Grouping sheet rows into firms, tag parsing and merging
//! - [`source`] - Loading from a JSON file, sheet exports or the Sheets API
//! - [`dictionary`] - Per-firm keywords and synonyms feeding query expansion
//! - [`catalog`] - The loaded firm set with id, location and paging lookups
//! - [`tools`] - MCP tool implementations for catalog operations

pub mod catalog;
pub mod dictionary;
pub mod outputs;
pub mod sheets;
pub mod source;
pub mod tools;
pub mod types;

pub use catalog::Catalog;
pub use dictionary::FirmDictionary;
pub use source::FirmSource;
pub use tools::FirmTools;
pub use types::Firm;
