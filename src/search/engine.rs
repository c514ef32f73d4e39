//! The search context: firms, fuzzy index, expander and cache, built once
//! at startup and shared by every request.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::firms::dictionary::FirmDictionary;
use crate::firms::types::Firm;
use crate::search::cache::{CacheStats, CachedResults, QueryCache};
use crate::search::config::SearchConfig;
use crate::search::expansion::{QueryExpander, SynonymStats};
use crate::search::explain::explain;
use crate::search::fuzzy::{FuzzyEngine, FuzzyIndex};
use crate::search::normalize::normalize;
use crate::search::outputs::SearchResult;
use crate::search::ranker::{merge_term_hits, rank, relevance, round_score};
use crate::search::stats::{IndexStats, index_stats};
use crate::search::synonyms::{TermGraph, default_rules};
use crate::search::tags::{TagCount, quick_tags, search_by_tag};

/// Everything a query needs, immutable apart from the cache
#[derive(Debug)]
pub struct SearchEngine<E: FuzzyEngine = FuzzyIndex> {
    firms: Arc<Vec<Firm>>,
    index: E,
    expander: QueryExpander,
    cache: QueryCache,
    config: SearchConfig,
}

impl<E: FuzzyEngine> SearchEngine<E> {
    /// Build the index and expander over `firms`
    pub fn build(
        firms: Arc<Vec<Firm>>,
        dictionary: &FirmDictionary,
        config: SearchConfig,
    ) -> Result<Self> {
        let started = Instant::now();

        let index = E::build(&firms, &config.fuzzy).context("Failed to build fuzzy index")?;

        let rules = config.synonyms.clone().unwrap_or_else(default_rules);
        let graph = TermGraph::from_dictionary(dictionary);
        let expander = QueryExpander::new(&rules, graph);

        tracing::info!(
            "Search engine ready: {} firms, {} synonym groups, {} dictionary terms in {:?}",
            firms.len(),
            expander.rules().len(),
            expander.graph().len(),
            started.elapsed()
        );

        Ok(Self {
            firms,
            index,
            expander,
            cache: QueryCache::new(),
            config,
        })
    }

    pub fn firms(&self) -> &[Firm] {
        &self.firms
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Ranked, explained results for a free-text query.
    ///
    /// `limit` defaults to the configured default and is clamped into
    /// `0..=max_limit`. Blank queries return an empty list without touching
    /// the cache. Repeated calls with the same normalized query and
    /// effective limit return the same shared list.
    pub fn search(&self, query: &str, limit: Option<i64>) -> CachedResults {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Arc::new(Vec::new());
        }

        let limit = self.config.effective_limit(limit);
        if let Some(cached) = self.cache.get(&normalized, limit) {
            tracing::debug!("Cache hit for {:?} (limit {})", normalized, limit);
            return cached;
        }

        let started = Instant::now();
        let mut terms = self.expander.expand(&normalized);
        if terms.is_empty() {
            terms.push(normalized.clone());
        }

        let merged = merge_term_hits(
            &self.index,
            &self.firms,
            &terms,
            self.config.per_term_limit,
        );
        let results: Vec<SearchResult> = rank(merged, &self.firms, limit)
            .into_iter()
            .filter_map(|ranked| {
                let firm = self.firms.get(ranked.hit.record)?;
                let explained = explain(firm, &ranked.hit.matches, &terms);
                Some(SearchResult {
                    id: firm.id.clone(),
                    firm: firm.display_name().to_string(),
                    country: firm.country.clone(),
                    region: firm.region.clone(),
                    area: firm.area.clone(),
                    description: firm.description.clone(),
                    tags: firm.tags.clone(),
                    ranked: firm.ranked,
                    score: round_score(ranked.adjusted_score),
                    relevance: relevance(ranked.adjusted_score),
                    matched_fields: explained.matched_fields,
                    matched_terms: explained.matched_terms,
                    explanation: explained.explanation,
                })
            })
            .collect();

        tracing::debug!(
            "Search {:?} -> {} results from {} terms in {:?}",
            normalized,
            results.len(),
            terms.len(),
            started.elapsed()
        );

        let results = Arc::new(results);
        self.cache.insert(&normalized, limit, Arc::clone(&results));
        results
    }

    /// Expanded terms for a query
    pub fn expand(&self, query: &str) -> Vec<String> {
        self.expander.expand(query)
    }

    pub fn search_by_tag(&self, tag: &str) -> Vec<SearchResult> {
        search_by_tag(&self.firms, tag)
    }

    pub fn quick_tags(&self, max_tags: usize) -> Vec<TagCount> {
        quick_tags(&self.firms, max_tags)
    }

    pub fn index_stats(&self) -> IndexStats {
        index_stats(&self.firms)
    }

    pub fn synonym_stats(&self) -> SynonymStats {
        self.expander.stats()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
