//! Output types for search tools
//!
//! These types are used as the return values from search tool methods.
//! They are serialized to JSON strings for the MCP protocol, and can be
//! deserialized in tests for type-safe validation.

use serde::{Deserialize, Serialize};

use crate::search::cache::CacheStats;
use crate::search::expansion::SynonymStats;
use crate::search::stats::IndexStats;
use crate::search::tags::TagCount;

/// Individual search result item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// Firm id
    pub id: String,
    /// Firm display name
    pub firm: String,
    pub country: String,
    pub region: String,
    pub area: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Rank tier, 0 when unranked
    pub ranked: u32,
    /// Rank-adjusted fuzzy score, lower is better
    pub score: f64,
    /// 0 to 100, higher is better
    pub relevance: u8,
    pub matched_fields: Vec<String>,
    pub matched_terms: Vec<String>,
    pub explanation: String,
}

/// Output from search_firms operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchFirmsOutput {
    pub query: String,
    pub count: usize,
    pub limit: usize,
    pub results: Vec<SearchResult>,
}

impl SearchFirmsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }

    /// Check if there are any results
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }
}

/// Output from expand_query operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExpandQueryOutput {
    pub query: String,
    pub count: usize,
    pub terms: Vec<String>,
}

impl ExpandQueryOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from search_by_tag operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchByTagOutput {
    pub tag: String,
    pub count: usize,
    pub results: Vec<SearchResult>,
}

impl SearchByTagOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from quick_tags operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct QuickTagsOutput {
    pub count: usize,
    pub tags: Vec<TagCount>,
}

impl QuickTagsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from index_stats operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IndexStatsOutput {
    #[serde(flatten)]
    pub stats: IndexStats,
    pub cache: CacheStats,
}

impl IndexStatsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from synonym_stats operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SynonymStatsOutput {
    #[serde(flatten)]
    pub stats: SynonymStats,
}

impl SynonymStatsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Error output for search tools
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchErrorOutput {
    pub error: String,
}

impl SearchErrorOutput {
    /// Create a new error output
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize error"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> SearchResult {
        SearchResult {
            id: "3".to_string(),
            firm: "Environmental Law Experts".to_string(),
            country: "Chile".to_string(),
            region: "LATAM".to_string(),
            area: "Medio Ambiente".to_string(),
            description: String::new(),
            tags: vec!["medio ambiente".to_string()],
            ranked: 1,
            score: 0.25,
            relevance: 75,
            matched_fields: vec!["tags/especialidades".to_string()],
            matched_terms: vec!["medio ambiente".to_string()],
            explanation: "Matches in: tags/especialidades".to_string(),
        }
    }

    #[test]
    fn test_search_output_serialization() {
        let output = SearchFirmsOutput {
            query: "medio ambiente".to_string(),
            count: 1,
            limit: 30,
            results: vec![result()],
        };
        assert!(output.has_results());

        let json = output.to_json();
        let deserialized: SearchFirmsOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output, deserialized);
    }

    #[test]
    fn test_search_error_output() {
        let output = SearchErrorOutput::new("Search index not ready");
        let json = output.to_json();
        assert_eq!(json, r#"{"error":"Search index not ready"}"#);
    }
}
