//! Synonym rules and the term equivalence graph used by query expansion.
//!
//! Two sources feed expansion:
//! - [`SynonymRule`]s: hand-written `match -> expand` groups, applied when the
//!   query contains any `match` entry as a substring.
//! - [`TermGraph`]: links between terms that appear together in one group of
//!   the auxiliary firm dictionary (keywords, synonyms and categories of a
//!   single firm).
//!
//! The graph links only terms that co-occur in some group. Overlapping groups
//! are not merged, so `a~b` and `b~c` do not make `a~c`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::firms::dictionary::FirmDictionary;
use crate::search::normalize::normalize;

/// A static expansion rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymRule {
    #[serde(rename = "match")]
    pub match_terms: Vec<String>,
    pub expand: Vec<String>,
}

impl SynonymRule {
    pub fn new(match_terms: &[&str], expand: &[&str]) -> Self {
        Self {
            match_terms: match_terms.iter().map(|s| s.to_string()).collect(),
            expand: expand.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Copy of this rule with every entry normalized and empty entries dropped
    pub fn normalized(&self) -> Self {
        let norm = |terms: &[String]| -> Vec<String> {
            terms
                .iter()
                .map(|t| normalize(t))
                .filter(|t| !t.is_empty())
                .collect()
        };
        Self {
            match_terms: norm(&self.match_terms),
            expand: norm(&self.expand),
        }
    }

    /// Whether an already normalized query triggers this (normalized) rule
    pub fn matches(&self, normalized_query: &str) -> bool {
        self.match_terms
            .iter()
            .any(|m| normalized_query.contains(m.as_str()))
    }
}

/// The built-in rule table
pub fn default_rules() -> Vec<SynonymRule> {
    vec![
        SynonymRule::new(
            &["ciclo integral de inversion de riesgo", "venture capital", "capital de riesgo"],
            &[
                "venture capital",
                "private equity",
                "financiamiento",
                "early stage",
                "growth capital",
                "inversion",
                "capital emprendedor",
            ],
        ),
        SynonymRule::new(
            &["tecnologia", "tecnología", "tech", "software", "computador"],
            &[
                "technology",
                "it",
                "digital",
                "software",
                "data",
                "cybersecurity",
                "fintech",
                "informática",
                "computer",
                "sistemas",
            ],
        ),
        SynonymRule::new(
            &["medio ambiente", "ambiental", "sostenible", "sustentable", "ecologia"],
            &[
                "environment",
                "environmental",
                "esg",
                "sustainability",
                "ecology",
                "climate",
                "green",
                "renewable",
            ],
        ),
        SynonymRule::new(
            &["banca", "banco", "financiero", "finance"],
            &[
                "banking",
                "finance",
                "financial services",
                "bank",
                "credit",
                "loans",
                "credito",
            ],
        ),
        SynonymRule::new(
            &["extractivos", "mineria", "minería", "mining"],
            &[
                "mining",
                "natural resources",
                "project finance",
                "oil",
                "gas",
                "petroleum",
                "petroleo",
            ],
        ),
        SynonymRule::new(
            &["criminal", "penal", "delito"],
            &[
                "criminal law",
                "criminal defense",
                "penal",
                "delitos",
                "litigation",
                "white collar",
            ],
        ),
        SynonymRule::new(
            &["energia", "energía", "energy", "electricidad", "electric"],
            &[
                "energy",
                "power",
                "electricity",
                "renewable",
                "oil",
                "gas",
                "utilities",
                "grid",
                "solar",
                "wind",
            ],
        ),
        SynonymRule::new(
            &["laboral", "trabajo", "employment", "labor"],
            &[
                "labor",
                "employment",
                "workplace",
                "hr",
                "human resources",
                "trabajadores",
                "sindical",
            ],
        ),
        SynonymRule::new(
            &["propiedad intelectual", "ip", "intellectual property", "patentes"],
            &[
                "intellectual property",
                "ip",
                "patents",
                "trademark",
                "copyright",
                "marca",
                "patente",
            ],
        ),
        SynonymRule::new(
            &["impuestos", "tributario", "tax", "fiscal"],
            &["tax", "taxation", "fiscal", "impuestos", "tributario", "iva", "vat"],
        ),
    ]
}

/// Undirected term links built group by group
#[derive(Debug, Clone, Default)]
pub struct TermGraph {
    links: HashMap<String, Vec<String>>,
}

impl TermGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from every entry of the auxiliary dictionary.
    ///
    /// Each entry contributes one group made of its keywords, synonyms and
    /// categories, with `/` and `,` separated values split into pieces.
    pub fn from_dictionary(dictionary: &FirmDictionary) -> Self {
        let mut graph = Self::new();
        for entry in dictionary.values() {
            let group = entry.group_terms();
            if !group.is_empty() {
                graph.add_group(&group);
            }
        }
        graph
    }

    /// Link every term of `terms` to every other term of the group and to
    /// itself. Terms are normalized; empty ones are ignored.
    pub fn add_group<S: AsRef<str>>(&mut self, terms: &[S]) {
        let normalized: Vec<String> = terms
            .iter()
            .map(|t| normalize(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();

        for term in &normalized {
            let linked = self.links.entry(term.clone()).or_default();
            for other in &normalized {
                if !linked.contains(other) {
                    linked.push(other.clone());
                }
            }
        }
    }

    /// Terms linked to `term`, in insertion order. `term` must be normalized.
    pub fn related(&self, term: &str) -> &[String] {
        self.links.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct terms in the graph
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firms::dictionary::DictionaryEntry;

    #[test]
    fn test_rule_matching_is_substring_on_normalized() {
        let rule = SynonymRule::new(&["Medio Ambiente"], &["Environment"]).normalized();
        assert_eq!(rule.match_terms, vec!["medio ambiente"]);
        assert!(rule.matches("derecho medio ambiente chile"));
        assert!(!rule.matches("ambiente"));
    }

    #[test]
    fn test_default_rules_cover_energy() {
        let rules: Vec<_> = default_rules().iter().map(SynonymRule::normalized).collect();
        assert_eq!(rules.len(), 10);
        assert!(rules.iter().any(|r| r.matches("energia") && r.expand.contains(&"power".to_string())));
    }

    #[test]
    fn test_group_links_are_symmetric_within_group() {
        let mut graph = TermGraph::new();
        graph.add_group(&["Arbitraje", "arbitration", ""]);

        assert_eq!(graph.related("arbitraje"), ["arbitraje", "arbitration"]);
        assert_eq!(graph.related("arbitration"), ["arbitraje", "arbitration"]);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_graph_is_not_transitively_closed() {
        let mut graph = TermGraph::new();
        graph.add_group(&["a1", "b1"]);
        graph.add_group(&["b1", "c1"]);

        assert_eq!(graph.related("a1"), ["a1", "b1"]);
        assert_eq!(graph.related("b1"), ["a1", "b1", "c1"]);
        assert!(!graph.related("a1").contains(&"c1".to_string()));
        assert!(!graph.related("c1").contains(&"a1".to_string()));
    }

    #[test]
    fn test_from_dictionary_splits_compound_values() {
        let mut dictionary = FirmDictionary::new();
        dictionary.insert(
            "chile::verde".to_string(),
            DictionaryEntry {
                keywords: vec!["litio/cobre".to_string()],
                synonyms: vec!["lithium, copper".to_string()],
                categories: vec!["Minería".to_string()],
            },
        );

        let graph = TermGraph::from_dictionary(&dictionary);
        let related = graph.related("litio");
        assert!(related.contains(&"copper".to_string()));
        assert!(related.contains(&"mineria".to_string()));
        assert_eq!(graph.len(), 5);
    }

    #[test]
    fn test_unknown_term_has_no_links() {
        assert!(TermGraph::new().related("nada").is_empty());
    }
}
