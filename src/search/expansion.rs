//! Query expansion: turning one free-text query into the ordered list of
//! terms looked up in the fuzzy index.
//!
//! Expansion order is fixed and the first occurrence of a term wins:
//! 1. the normalized query itself,
//! 2. the `expand` entries of every static rule whose `match` entries occur
//!    in the query,
//! 3. graph links of the whole query,
//! 4. graph links of each query token of at least three characters,
//! 5. a de-pluralized variant of every token.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::search::config::MIN_GRAPH_TOKEN_CHARS;
use crate::search::normalize::normalize;
use crate::search::synonyms::{SynonymRule, TermGraph};

/// Query used to illustrate expansion in [`SynonymStats`]
pub const SAMPLE_EXPANSION_QUERY: &str = "energia";

/// Expands queries with static synonym rules and the dictionary term graph
#[derive(Debug, Clone, Default)]
pub struct QueryExpander {
    rules: Vec<SynonymRule>,
    graph: TermGraph,
}

/// Summary of the loaded expansion sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymStats {
    pub manual_synonym_groups: usize,
    pub dictionary_terms: usize,
    pub sample_expansion: Vec<String>,
}

impl QueryExpander {
    /// Create an expander; rules are normalized once here
    pub fn new(rules: &[SynonymRule], graph: TermGraph) -> Self {
        Self {
            rules: rules.iter().map(SynonymRule::normalized).collect(),
            graph,
        }
    }

    pub fn rules(&self) -> &[SynonymRule] {
        &self.rules
    }

    pub fn graph(&self) -> &TermGraph {
        &self.graph
    }

    /// Expand `query` into normalized, deduplicated terms, original first.
    ///
    /// Blank queries expand to nothing.
    pub fn expand(&self, query: &str) -> Vec<String> {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut terms = vec![normalized.clone()];

        for rule in &self.rules {
            if rule.matches(&normalized) {
                terms.extend(rule.expand.iter().cloned());
            }
        }

        terms.extend(self.graph.related(&normalized).iter().cloned());

        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        for token in tokens
            .iter()
            .filter(|t| t.chars().count() >= MIN_GRAPH_TOKEN_CHARS)
        {
            terms.extend(self.graph.related(token).iter().cloned());
        }

        terms.extend(tokens.iter().map(|t| stem(t).to_string()));

        dedupe(terms)
    }

    /// Counts of loaded rules and graph terms, plus a sample expansion
    pub fn stats(&self) -> SynonymStats {
        SynonymStats {
            manual_synonym_groups: self.rules.len(),
            dictionary_terms: self.graph.len(),
            sample_expansion: self.expand(SAMPLE_EXPANSION_QUERY),
        }
    }
}

/// Strip a plural suffix: `es`, else `s`, only from tokens longer than three
/// characters
pub fn stem(token: &str) -> &str {
    if token.chars().count() <= 3 {
        return token;
    }
    token
        .strip_suffix("es")
        .or_else(|| token.strip_suffix('s'))
        .unwrap_or(token)
}

fn dedupe(terms: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .map(|t| normalize(&t))
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}
