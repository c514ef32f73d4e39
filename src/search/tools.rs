use std::sync::Arc;

use rmcp::schemars;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::firms::catalog::filter_by_location;
use crate::search::SearchEngine;
use crate::search::config::DEFAULT_QUICK_TAGS;
use crate::search::outputs::{
    ExpandQueryOutput, IndexStatsOutput, QuickTagsOutput, SearchByTagOutput, SearchErrorOutput,
    SearchFirmsOutput, SynonymStatsOutput,
};
use crate::search::tags::quick_tags;

/// Message returned while no search engine is available
pub const INDEX_NOT_READY: &str = "Search index not ready";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchFirmsParams {
    #[schemars(description = "Free-text query, e.g. 'medio ambiente' or 'energía solar'")]
    pub query: Option<String>,
    #[schemars(description = "Maximum number of results (default 30, capped at 100)")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExpandQueryParams {
    #[schemars(description = "Query to expand with synonyms and related terms")]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchByTagParams {
    #[schemars(description = "Tag to match exactly, ignoring case and accents")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuickTagsParams {
    #[schemars(description = "Only count tags of firms in this country (exact name)")]
    pub country: Option<String>,
    #[schemars(description = "Only count tags of firms in this region (exact name)")]
    pub region: Option<String>,
    #[schemars(description = "Maximum number of tags to return (default 40)")]
    pub max_tags: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SearchTools {
    engine: Option<Arc<SearchEngine>>,
}

impl SearchTools {
    pub fn new(engine: Option<Arc<SearchEngine>>) -> Self {
        Self { engine }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    fn engine(&self) -> Result<&SearchEngine, String> {
        self.engine
            .as_deref()
            .ok_or_else(|| SearchErrorOutput::new(INDEX_NOT_READY).to_json())
    }

    /// Fuzzy, synonym-expanded search over firms
    pub async fn search_firms(&self, params: SearchFirmsParams) -> String {
        let engine = match self.engine() {
            Ok(engine) => engine,
            Err(error) => return error,
        };

        let query = params.query.unwrap_or_default();
        let limit = engine.config().effective_limit(params.limit);
        let results = engine.search(&query, params.limit);

        SearchFirmsOutput {
            query,
            count: results.len(),
            limit,
            results: results.as_ref().clone(),
        }
        .to_json()
    }

    /// Terms a query expands to
    pub async fn expand_query(&self, params: ExpandQueryParams) -> String {
        let engine = match self.engine() {
            Ok(engine) => engine,
            Err(error) => return error,
        };

        let query = params.query.unwrap_or_default();
        let terms = engine.expand(&query);
        ExpandQueryOutput {
            query,
            count: terms.len(),
            terms,
        }
        .to_json()
    }

    /// Firms carrying a tag exactly
    pub async fn search_by_tag(&self, params: SearchByTagParams) -> String {
        let engine = match self.engine() {
            Ok(engine) => engine,
            Err(error) => return error,
        };

        let tag = params.tag.unwrap_or_default();
        let results = engine.search_by_tag(&tag);
        SearchByTagOutput {
            tag,
            count: results.len(),
            results,
        }
        .to_json()
    }

    /// Most frequent tags, optionally within one country or region
    pub async fn quick_tags(&self, params: QuickTagsParams) -> String {
        let engine = match self.engine() {
            Ok(engine) => engine,
            Err(error) => return error,
        };

        let max_tags = params.max_tags.unwrap_or(DEFAULT_QUICK_TAGS);
        let tags = if params.country.is_none() && params.region.is_none() {
            engine.quick_tags(max_tags)
        } else {
            let firms = filter_by_location(
                engine.firms(),
                params.country.as_deref(),
                params.region.as_deref(),
            );
            quick_tags(&firms, max_tags)
        };

        QuickTagsOutput {
            count: tags.len(),
            tags,
        }
        .to_json()
    }

    /// Firm counts, tag counts and the rank histogram
    pub async fn index_stats(&self) -> String {
        match self.engine() {
            Ok(engine) => IndexStatsOutput {
                stats: engine.index_stats(),
                cache: engine.cache_stats(),
            }
            .to_json(),
            Err(error) => error,
        }
    }

    /// Loaded synonym groups and dictionary terms
    pub async fn synonym_stats(&self) -> String {
        match self.engine() {
            Ok(engine) => SynonymStatsOutput {
                stats: engine.synonym_stats(),
            }
            .to_json(),
            Err(error) => error,
        }
    }
}
