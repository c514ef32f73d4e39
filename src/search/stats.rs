//! Read-only statistics over the firm set.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::firms::types::Firm;

/// Key of the unranked bucket in [`IndexStats::ranking_distribution`]
pub const UNRANKED_KEY: &str = "unranked";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_firms: usize,
    pub firms_with_tags: usize,
    pub firms_with_ranking: usize,
    pub unique_tags: usize,
    pub unique_countries: usize,
    pub unique_areas: usize,
    /// Firms per tier `"1"` to `"5"`, plus `"unranked"`
    pub ranking_distribution: BTreeMap<String, usize>,
}

/// Counts over `firms`. Tags, countries and areas are counted as written.
pub fn index_stats(firms: &[Firm]) -> IndexStats {
    let unique_tags: HashSet<&str> = firms
        .iter()
        .flat_map(|f| f.tags.iter().map(String::as_str))
        .collect();
    let unique_countries: HashSet<&str> = firms.iter().map(|f| f.country.as_str()).collect();
    let unique_areas: HashSet<&str> = firms
        .iter()
        .flat_map(|f| f.areas.iter().map(String::as_str))
        .collect();

    let mut ranking_distribution: BTreeMap<String, usize> =
        (1..=5).map(|tier: u32| (tier.to_string(), 0)).collect();
    ranking_distribution.insert(UNRANKED_KEY.to_string(), 0);
    for firm in firms {
        let key = match firm.ranked {
            0 => UNRANKED_KEY.to_string(),
            tier @ 1..=5 => tier.to_string(),
            _ => continue,
        };
        if let Some(count) = ranking_distribution.get_mut(&key) {
            *count += 1;
        }
    }

    IndexStats {
        total_firms: firms.len(),
        firms_with_tags: firms.iter().filter(|f| f.has_tags()).count(),
        firms_with_ranking: firms.iter().filter(|f| f.is_ranked()).count(),
        unique_tags: unique_tags.len(),
        unique_countries: unique_countries.len(),
        unique_areas: unique_areas.len(),
        ranking_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_stats() {
        let firms = vec![
            Firm::new("1", "A", "Chile")
                .with_rank(1)
                .with_areas(vec!["Energía".to_string(), "Minería".to_string()])
                .with_tags(["solar", "Solar"]),
            Firm::new("2", "B", "Chile").with_rank(7).with_tags(["solar"]),
            Firm::new("3", "C", "Perú").with_area("Energía"),
        ];

        let stats = index_stats(&firms);
        assert_eq!(stats.total_firms, 3);
        assert_eq!(stats.firms_with_tags, 2);
        assert_eq!(stats.firms_with_ranking, 2);
        assert_eq!(stats.unique_tags, 2);
        assert_eq!(stats.unique_countries, 2);
        assert_eq!(stats.unique_areas, 2);
        assert_eq!(stats.ranking_distribution["1"], 1);
        assert_eq!(stats.ranking_distribution["5"], 0);
        assert_eq!(stats.ranking_distribution[UNRANKED_KEY], 1);
        assert_eq!(stats.ranking_distribution.len(), 6);
    }

    #[test]
    fn test_empty_stats() {
        let stats = index_stats(&[]);
        assert_eq!(stats.total_firms, 0);
        assert!(stats.ranking_distribution.values().all(|&c| c == 0));
    }
}
