//! The loaded firm set and the lookups that do not need the search index.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::firms::sheets::FormOptions;
use crate::firms::types::Firm;

/// Firms loaded at startup, shared read-only by every handler
#[derive(Debug, Clone)]
pub struct Catalog {
    firms: Arc<Vec<Firm>>,
    form_options: FormOptions,
    loaded_at: DateTime<Utc>,
    source: String,
}

/// A country and one of its regions
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CountryRegion {
    pub country: String,
    pub region: String,
}

/// Values available for location filtering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationFilters {
    pub countries: Vec<String>,
    pub regions: Vec<String>,
    pub mapping: Vec<CountryRegion>,
}

impl Catalog {
    pub fn new(firms: Vec<Firm>, form_options: FormOptions, source: impl Into<String>) -> Self {
        Self {
            firms: Arc::new(firms),
            form_options,
            loaded_at: Utc::now(),
            source: source.into(),
        }
    }

    /// Shared handle to the firm list
    pub fn firms(&self) -> Arc<Vec<Firm>> {
        Arc::clone(&self.firms)
    }

    pub fn len(&self) -> usize {
        self.firms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.firms.is_empty()
    }

    pub fn form_options(&self) -> &FormOptions {
        &self.form_options
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Human-readable description of where the firms came from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Firm whose id equals `id` after trimming
    pub fn find_by_id(&self, id: &str) -> Option<&Firm> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        self.firms.iter().find(|firm| firm.id == id)
    }

    /// Sorted unique countries, regions and country/region pairs
    pub fn filters(&self) -> LocationFilters {
        let mut countries = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut mapping = BTreeSet::new();

        for firm in self.firms.iter() {
            let country = firm.country.trim();
            let region = firm.region.trim();
            if !country.is_empty() {
                countries.insert(country.to_string());
            }
            if !region.is_empty() {
                regions.insert(region.to_string());
            }
            if !country.is_empty() && !region.is_empty() {
                mapping.insert(CountryRegion {
                    country: country.to_string(),
                    region: region.to_string(),
                });
            }
        }

        LocationFilters {
            countries: countries.into_iter().collect(),
            regions: regions.into_iter().collect(),
            mapping: mapping.into_iter().collect(),
        }
    }

    /// Firms located in `country` and `region`; a blank or absent filter
    /// matches everything. Comparison is exact after trimming.
    pub fn filter_by_location(&self, country: Option<&str>, region: Option<&str>) -> Vec<Firm> {
        filter_by_location(&self.firms, country, region)
    }

    /// One page of firms, in load order
    pub fn page(&self, offset: usize, limit: usize) -> &[Firm] {
        let start = offset.min(self.firms.len());
        let end = start.saturating_add(limit).min(self.firms.len());
        &self.firms[start..end]
    }
}

/// Firms matching optional exact country and region filters
pub fn filter_by_location(firms: &[Firm], country: Option<&str>, region: Option<&str>) -> Vec<Firm> {
    let country = country.map(str::trim).filter(|c| !c.is_empty());
    let region = region.map(str::trim).filter(|r| !r.is_empty());

    firms
        .iter()
        .filter(|firm| region.is_none_or(|r| firm.region.trim() == r))
        .filter(|firm| country.is_none_or(|c| firm.country.trim() == c))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                Firm::new("1", "Andes Legal", "Perú").with_region("LATAM"),
                Firm::new("2", "Green Energy", "Chile").with_region("LATAM"),
                Firm::new("3", "Nordic Law", "Noruega").with_region("Europa"),
                Firm::new("4", "Solo", "Chile"),
            ],
            FormOptions::default(),
            "test",
        )
    }

    #[test]
    fn test_find_by_id_trims() {
        let catalog = catalog();
        assert_eq!(catalog.find_by_id(" 3 ").map(|f| f.firm.as_str()), Some("Nordic Law"));
        assert!(catalog.find_by_id("99").is_none());
        assert!(catalog.find_by_id("  ").is_none());
    }

    #[test]
    fn test_filters_sorted_unique() {
        let filters = catalog().filters();
        assert_eq!(filters.countries, vec!["Chile", "Noruega", "Perú"]);
        assert_eq!(filters.regions, vec!["Europa", "LATAM"]);
        assert_eq!(filters.mapping.len(), 3);
        assert_eq!(
            filters.mapping[0],
            CountryRegion {
                country: "Chile".to_string(),
                region: "LATAM".to_string()
            }
        );
    }

    #[test]
    fn test_filter_by_location() {
        let catalog = catalog();
        assert_eq!(catalog.filter_by_location(Some("Chile"), None).len(), 2);
        assert_eq!(catalog.filter_by_location(Some("Chile"), Some("LATAM")).len(), 1);
        assert_eq!(catalog.filter_by_location(None, Some(" LATAM ")).len(), 2);
        assert_eq!(catalog.filter_by_location(Some(""), None).len(), 4);
        assert!(catalog.filter_by_location(Some("chile"), None).is_empty());
    }

    #[test]
    fn test_page_bounds() {
        let catalog = catalog();
        assert_eq!(catalog.page(0, 2).len(), 2);
        assert_eq!(catalog.page(3, 10).len(), 1);
        assert!(catalog.page(10, 10).is_empty());
        assert_eq!(catalog.page(1, usize::MAX).len(), 3);
    }
}
