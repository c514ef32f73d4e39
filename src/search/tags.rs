//! Exact tag lookup and tag frequencies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::firms::types::Firm;
use crate::search::normalize::normalize;
use crate::search::outputs::SearchResult;
use crate::search::ranker::rank_order;

/// A normalized tag and the number of firm tags that normalize to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Firms carrying `tag` exactly (after normalization), best rank tier first
pub fn search_by_tag(firms: &[Firm], tag: &str) -> Vec<SearchResult> {
    let target = normalize(tag);
    if target.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<&Firm> = firms
        .iter()
        .filter(|firm| firm.tags_normalized.iter().any(|t| *t == target))
        .collect();
    hits.sort_by_key(|firm| rank_order(firm.ranked));

    hits.into_iter()
        .map(|firm| SearchResult {
            id: firm.id.clone(),
            firm: firm.display_name().to_string(),
            country: firm.country.clone(),
            region: firm.region.clone(),
            area: firm.area.clone(),
            description: firm.description.clone(),
            tags: firm.tags.clone(),
            ranked: firm.ranked,
            score: 0.0,
            relevance: 100,
            matched_fields: vec!["tags".to_string()],
            matched_terms: vec![tag.to_string()],
            explanation: format!("Exact tag match: {tag}"),
        })
        .collect()
}

/// The `max_tags` most frequent normalized tags, most frequent first.
/// Equal counts keep the order in which the tags were first seen.
pub fn quick_tags(firms: &[Firm], max_tags: usize) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for tag in firms.iter().flat_map(|firm| firm.tags.iter()) {
        if tag.trim().is_empty() {
            continue;
        }
        let normalized = normalize(tag);
        match slots.get(&normalized) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                slots.insert(normalized.clone(), counts.len());
                counts.push(TagCount {
                    tag: normalized,
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(max_tags);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firms() -> Vec<Firm> {
        vec![
            Firm::new("1", "Green Energy", "Chile")
                .with_rank(3)
                .with_tags(["energía", "solar", "proyectos"]),
            Firm::new("2", "Mining", "Perú").with_tags(["proyectos", "minería"]),
            Firm::new("3", "Power Co", "Chile")
                .with_rank(1)
                .with_tags(["Energia", " "]),
        ]
    }

    #[test]
    fn test_search_by_tag_accent_insensitive() {
        let firms = firms();
        let with_accent = search_by_tag(&firms, "energía");
        let without = search_by_tag(&firms, "energia");
        assert_eq!(with_accent.len(), 2);
        assert_eq!(with_accent.len(), without.len());
        assert!(with_accent.iter().all(|r| r.relevance == 100 && r.score == 0.0));
    }

    #[test]
    fn test_search_by_tag_sorted_by_rank() {
        let results = search_by_tag(&firms(), "energia");
        assert_eq!(results[0].id, "3");
        assert_eq!(results[1].id, "1");
        assert_eq!(results[0].matched_fields, vec!["tags"]);
        assert_eq!(results[0].explanation, "Exact tag match: energia");
    }

    #[test]
    fn test_search_by_tag_unknown_or_blank() {
        assert!(search_by_tag(&firms(), "nonexistenttag123").is_empty());
        assert!(search_by_tag(&firms(), "  ").is_empty());
        assert!(search_by_tag(&[], "energia").is_empty());
    }

    #[test]
    fn test_quick_tags_ordering() {
        let tags = quick_tags(&firms(), 10);
        assert_eq!(tags[0], TagCount { tag: "energia".to_string(), count: 2 });
        assert_eq!(tags[1], TagCount { tag: "proyectos".to_string(), count: 2 });
        assert_eq!(tags.len(), 4);
        assert!(tags.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_quick_tags_bound() {
        assert_eq!(quick_tags(&firms(), 1).len(), 1);
        assert!(quick_tags(&firms(), 0).is_empty());
        assert!(quick_tags(&[], 5).is_empty());
    }

    #[test]
    fn test_quick_tags_proyectos_before_solar() {
        let tags = quick_tags(&firms(), 10);
        let position = |name: &str| tags.iter().position(|t| t.tag == name).unwrap();
        assert!(position("proyectos") < position("solar"));
    }
}
