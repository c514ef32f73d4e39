//! Merging per-term hits and ordering them by rank tier and score.

use std::collections::HashMap;

use crate::firms::types::Firm;
use crate::search::config::MIN_TERM_CHARS;
use crate::search::fuzzy::{FieldMatch, FuzzyEngine};

/// Best hit seen for one firm across all expanded terms
#[derive(Debug, Clone, PartialEq)]
pub struct MergedHit {
    /// Position of the firm in the indexed slice
    pub record: usize,
    /// Raw fuzzy score, lower is better
    pub score: f64,
    pub matches: Vec<FieldMatch>,
    /// Expanded term that produced `score`
    pub term: String,
}

/// A merged hit after the rank boost
#[derive(Debug, Clone, PartialEq)]
pub struct RankedHit {
    pub hit: MergedHit,
    pub adjusted_score: f64,
}

/// Score multiplier for a rank tier
pub fn rank_factor(ranked: u32) -> f64 {
    match ranked {
        0 => 1.0,
        1 => 0.7,
        2 => 0.9,
        3 => 0.95,
        _ => 1.1,
    }
}

/// Sort position of a rank tier: 1, 2, 3, then 4 and above, then unranked
pub fn rank_order(ranked: u32) -> u32 {
    match ranked {
        0 => 5,
        1..=3 => ranked,
        _ => 4,
    }
}

/// Label of the top three tiers
pub fn rank_label(ranked: u32) -> Option<&'static str> {
    match ranked {
        1 => Some("Excelente"),
        2 => Some("Bueno"),
        3 => Some("Medio"),
        _ => None,
    }
}

/// `round((1 - clamp(score, 0, 1)) * 100)`
pub fn relevance(adjusted_score: f64) -> u8 {
    ((1.0 - adjusted_score.clamp(0.0, 1.0)) * 100.0).round() as u8
}

/// Round a score to six decimals for output
pub fn round_score(score: f64) -> f64 {
    (score * 1_000_000.0).round() / 1_000_000.0
}

/// Look every term up and keep the best hit per firm id.
///
/// Terms shorter than two characters are skipped. A failing lookup is
/// logged and skipped. Firms with an empty id are never merged. Hits keep
/// the order in which their firm was first seen.
pub fn merge_term_hits<E: FuzzyEngine + ?Sized>(
    engine: &E,
    firms: &[Firm],
    terms: &[String],
    per_term_limit: usize,
) -> Vec<MergedHit> {
    let mut merged: Vec<MergedHit> = Vec::new();
    let mut by_id: HashMap<&str, usize> = HashMap::new();

    for term in terms {
        if term.chars().count() < MIN_TERM_CHARS {
            continue;
        }

        let hits = match engine.search(term, per_term_limit) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("Lookup failed for term {:?}: {:#}", term, e);
                continue;
            }
        };

        for hit in hits {
            let Some(firm) = firms.get(hit.record) else {
                continue;
            };
            if firm.id.is_empty() {
                continue;
            }

            match by_id.get(firm.id.as_str()) {
                None => {
                    by_id.insert(firm.id.as_str(), merged.len());
                    merged.push(MergedHit {
                        record: hit.record,
                        score: hit.score,
                        matches: hit.matches,
                        term: term.clone(),
                    });
                }
                Some(&slot) => {
                    let existing = &mut merged[slot];
                    if hit.score < existing.score {
                        existing.score = hit.score;
                        existing.matches = hit.matches;
                        existing.term = term.clone();
                    }
                }
            }
        }
    }

    merged
}

/// Apply rank boosts, sort by tier then adjusted score, and keep `limit` hits
pub fn rank(merged: Vec<MergedHit>, firms: &[Firm], limit: usize) -> Vec<RankedHit> {
    let ranked_of = |hit: &MergedHit| firms.get(hit.record).map_or(0, |f| f.ranked);

    let mut ranked: Vec<RankedHit> = merged
        .into_iter()
        .map(|hit| {
            let adjusted_score = hit.score * rank_factor(ranked_of(&hit));
            RankedHit {
                hit,
                adjusted_score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        rank_order(ranked_of(&a.hit))
            .cmp(&rank_order(ranked_of(&b.hit)))
            .then_with(|| a.adjusted_score.total_cmp(&b.adjusted_score))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::config::FuzzyConfig;
    use crate::search::fuzzy::{FuzzyHit, FuzzyIndex};
    use anyhow::{Result, bail};

    /// Engine returning canned hits per term
    struct Canned(Vec<(&'static str, Vec<(usize, f64)>)>);

    impl FuzzyEngine for Canned {
        fn build(_firms: &[Firm], _config: &FuzzyConfig) -> Result<Self> {
            Ok(Canned(Vec::new()))
        }

        fn search(&self, term: &str, limit: usize) -> Result<Vec<FuzzyHit>> {
            if term == "boom" {
                bail!("engine failure");
            }
            Ok(self
                .0
                .iter()
                .filter(|(t, _)| *t == term)
                .flat_map(|(_, hits)| hits.iter())
                .take(limit)
                .map(|&(record, score)| FuzzyHit {
                    record,
                    score,
                    matches: Vec::new(),
                })
                .collect())
        }

        fn len(&self) -> usize {
            0
        }
    }

    fn firms() -> Vec<Firm> {
        vec![
            Firm::new("a", "Alpha", "Chile").with_rank(3),
            Firm::new("b", "Beta", "Chile").with_rank(1),
            Firm::new("", "No Id", "Chile"),
            Firm::new("d", "Delta", "Chile"),
        ]
    }

    #[test]
    fn test_rank_tables() {
        assert_eq!(rank_factor(1), 0.7);
        assert_eq!(rank_factor(2), 0.9);
        assert_eq!(rank_factor(3), 0.95);
        assert_eq!(rank_factor(7), 1.1);
        assert_eq!(rank_factor(0), 1.0);
        assert_eq!(rank_order(4), 4);
        assert_eq!(rank_order(12), 4);
        assert_eq!(rank_order(0), 5);
        assert_eq!(rank_label(2), Some("Bueno"));
        assert_eq!(rank_label(4), None);
    }

    #[test]
    fn test_relevance_and_rounding() {
        assert_eq!(relevance(0.0), 100);
        assert_eq!(relevance(0.256), 74);
        assert_eq!(relevance(1.7), 0);
        assert_eq!(relevance(-0.5), 100);
        assert_eq!(round_score(0.123_456_789), 0.123457);
    }

    #[test]
    fn test_merge_keeps_strictly_better_score() {
        let engine = Canned(vec![
            ("first", vec![(0, 0.4), (3, 0.2)]),
            ("second", vec![(0, 0.1), (3, 0.2)]),
        ]);
        let terms = vec!["first".to_string(), "second".to_string()];
        let merged = merge_term_hits(&engine, &firms(), &terms, 50);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].record, 0);
        assert_eq!(merged[0].score, 0.1);
        assert_eq!(merged[0].term, "second");
        // equal score does not replace
        assert_eq!(merged[1].term, "first");
    }

    #[test]
    fn test_merge_skips_short_terms_failures_and_blank_ids() {
        let engine = Canned(vec![("x", vec![(0, 0.1)]), ("ok", vec![(2, 0.1), (1, 0.3)])]);
        let terms = vec!["x".to_string(), "boom".to_string(), "ok".to_string()];
        let merged = merge_term_hits(&engine, &firms(), &terms, 50);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].record, 1);
    }

    #[test]
    fn test_rank_tier_beats_score() {
        let merged = vec![
            MergedHit { record: 0, score: 0.01, matches: Vec::new(), term: "t".into() },
            MergedHit { record: 3, score: 0.001, matches: Vec::new(), term: "t".into() },
            MergedHit { record: 1, score: 0.5, matches: Vec::new(), term: "t".into() },
        ];
        let ranked = rank(merged, &firms(), 10);
        let order: Vec<usize> = ranked.iter().map(|r| r.hit.record).collect();
        assert_eq!(order, vec![1, 0, 3]);
        assert!((ranked[0].adjusted_score - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_rank_truncates() {
        let merged = vec![
            MergedHit { record: 0, score: 0.1, matches: Vec::new(), term: "t".into() },
            MergedHit { record: 1, score: 0.1, matches: Vec::new(), term: "t".into() },
        ];
        assert_eq!(rank(merged.clone(), &firms(), 1).len(), 1);
        assert!(rank(merged, &firms(), 0).is_empty());
    }

    #[test]
    fn test_merge_with_real_index() {
        let firms = firms();
        let index = FuzzyIndex::build(&firms, &FuzzyConfig::default()).unwrap();
        let merged = merge_term_hits(&index, &firms, &["delta".to_string()], 50);
        assert_eq!(merged.first().map(|h| h.record), Some(3));
    }
}
