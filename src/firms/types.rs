//! Firm records as loaded from the spreadsheet.
//!
//! A [`Firm`] is immutable once constructed. Derived fields
//! (`tags_normalized`, `tags_text`) are computed in one place, when the
//! record is built or deserialized, so that every consumer sees the same
//! normalized view.

use serde::{Deserialize, Serialize};

use crate::search::normalize::normalize;
use crate::util::{
    deserialize_rank_from_anything, deserialize_string_list, deserialize_text_from_anything,
};

/// One searchable firm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFirm")]
pub struct Firm {
    pub id: String,
    pub firm: String,
    pub name: String,
    pub country: String,
    pub region: String,
    /// All practice areas joined with `" | "`
    pub area: String,
    pub areas: Vec<String>,
    pub description: String,
    pub tags: Vec<String>,
    /// `normalize(tags[i])` for every tag
    pub tags_normalized: Vec<String>,
    pub tags_text: String,
    /// Rank tier: 1 is best, 0 is unranked
    pub ranked: u32,
    pub testimonials: String,
    pub key_clients: String,
    pub work_highlights: String,
}

impl Firm {
    /// Create a firm with the given identity; other fields start empty
    pub fn new(
        id: impl Into<String>,
        firm: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            firm: firm.into(),
            name: String::new(),
            country: country.into(),
            region: String::new(),
            area: String::new(),
            areas: Vec::new(),
            description: String::new(),
            tags: Vec::new(),
            tags_normalized: Vec::new(),
            tags_text: String::new(),
            ranked: 0,
            testimonials: String::new(),
            key_clients: String::new(),
            work_highlights: String::new(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set a single practice area
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        let area = area.into();
        self.areas = if area.is_empty() {
            Vec::new()
        } else {
            vec![area.clone()]
        };
        self.area = area;
        self
    }

    /// Set several practice areas; `area` becomes their `" | "` join
    pub fn with_areas(mut self, areas: Vec<String>) -> Self {
        self.area = areas.join(" | ");
        self.areas = areas;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rank(mut self, ranked: u32) -> Self {
        self.ranked = ranked;
        self
    }

    /// Set the display tags and recompute the derived tag fields
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self.refresh_tags();
        self
    }

    fn refresh_tags(&mut self) {
        self.tags_normalized = self.tags.iter().map(|t| normalize(t)).collect();
        self.tags_text = self.tags.join(" ");
    }

    /// Firm name for display, falling back to `name`
    pub fn display_name(&self) -> &str {
        if self.firm.is_empty() {
            &self.name
        } else {
            &self.firm
        }
    }

    /// Normalized `country::firm` key used to join sheets and the dictionary
    pub fn group_key(&self) -> String {
        group_key(&self.country, self.display_name())
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    pub fn is_ranked(&self) -> bool {
        self.ranked > 0
    }
}

/// Normalized `country::firm` key
pub fn group_key(country: &str, firm: &str) -> String {
    format!("{}::{}", normalize(country), normalize(firm))
}

/// Lenient wire shape of a firm: any field may be missing or null, ranks
/// may be strings, tags may be a list or a single delimited string
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "snake_case")]
struct RawFirm {
    #[serde(deserialize_with = "deserialize_text_from_anything", alias = "_id")]
    id: String,
    #[serde(deserialize_with = "deserialize_text_from_anything")]
    firm: String,
    #[serde(deserialize_with = "deserialize_text_from_anything")]
    name: String,
    #[serde(deserialize_with = "deserialize_text_from_anything")]
    country: String,
    #[serde(deserialize_with = "deserialize_text_from_anything")]
    region: String,
    #[serde(deserialize_with = "deserialize_text_from_anything")]
    area: String,
    #[serde(deserialize_with = "deserialize_string_list")]
    areas: Vec<String>,
    #[serde(deserialize_with = "deserialize_text_from_anything")]
    description: String,
    #[serde(deserialize_with = "deserialize_string_list")]
    tags: Vec<String>,
    #[serde(deserialize_with = "deserialize_rank_from_anything")]
    ranked: u32,
    #[serde(deserialize_with = "deserialize_text_from_anything")]
    testimonials: String,
    #[serde(deserialize_with = "deserialize_text_from_anything", alias = "keyClients")]
    key_clients: String,
    #[serde(
        deserialize_with = "deserialize_text_from_anything",
        alias = "workHighlights"
    )]
    work_highlights: String,
}

impl From<RawFirm> for Firm {
    fn from(raw: RawFirm) -> Self {
        // A single string of tags is split the same way sheet cells are
        let tags = match raw.tags.as_slice() {
            [single] => crate::firms::sheets::parse_tags(single),
            _ => raw
                .tags
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        };

        let mut areas: Vec<String> = raw
            .areas
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if areas.is_empty() && !raw.area.trim().is_empty() {
            areas = raw
                .area
                .split(" | ")
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
        }

        let mut firm = Firm {
            id: raw.id.trim().to_string(),
            firm: raw.firm.trim().to_string(),
            name: raw.name.trim().to_string(),
            country: raw.country.trim().to_string(),
            region: raw.region.trim().to_string(),
            area: raw.area,
            areas,
            description: raw.description,
            tags,
            tags_normalized: Vec::new(),
            tags_text: String::new(),
            ranked: raw.ranked,
            testimonials: raw.testimonials,
            key_clients: raw.key_clients,
            work_highlights: raw.work_highlights,
        };
        firm.refresh_tags();
        firm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_tag_invariant() {
        let firm = Firm::new("1", "Green Energy Solutions", "Chile")
            .with_tags(["Energía", "Solar", "eólica"]);

        assert_eq!(firm.tags.len(), firm.tags_normalized.len());
        assert_eq!(firm.tags_normalized, vec!["energia", "solar", "eolica"]);
        assert_eq!(firm.tags_text, "Energía Solar eólica");
    }

    #[test]
    fn test_deserialize_derives_normalized_tags() {
        let firm: Firm = serde_json::from_str(
            r#"{
                "id": 7,
                "firm": " Labor Rights Law Firm ",
                "country": "Chile",
                "ranked": "1",
                "tags": ["Laboral", "Negociación Colectiva"],
                "tags_normalized": ["stale"],
                "keyClients": "Sindicato Nacional"
            }"#,
        )
        .unwrap();

        assert_eq!(firm.id, "7");
        assert_eq!(firm.firm, "Labor Rights Law Firm");
        assert_eq!(firm.ranked, 1);
        assert_eq!(firm.tags_normalized, vec!["laboral", "negociacion colectiva"]);
        assert_eq!(firm.key_clients, "Sindicato Nacional");
        assert!(firm.region.is_empty());
    }

    #[test]
    fn test_deserialize_tag_string_and_missing_fields() {
        let firm: Firm =
            serde_json::from_str(r#"{"id": "x", "tags": "solar; wind, hydro", "ranked": null}"#)
                .unwrap();
        assert_eq!(firm.tags, vec!["solar", "wind", "hydro"]);
        assert_eq!(firm.ranked, 0);
        assert!(!firm.is_ranked());
        assert_eq!(firm.display_name(), "");
    }

    #[test]
    fn test_area_split_into_areas() {
        let firm: Firm =
            serde_json::from_str(r#"{"id": "1", "area": "Banca | Finanzas"}"#).unwrap();
        assert_eq!(firm.areas, vec!["Banca", "Finanzas"]);
    }

    #[test]
    fn test_group_key_is_normalized() {
        let firm = Firm::new("1", "Mining Rights Advisors", "Perú");
        assert_eq!(firm.group_key(), "peru::mining rights advisors");
    }

    #[test]
    fn test_serialize_round_trip_preserves_derived_fields() {
        let firm = Firm::new("3", "Environmental Law Experts", "Chile")
            .with_area("Medio Ambiente")
            .with_tags(["medio ambiente", "ecología"])
            .with_rank(1);
        let json = serde_json::to_string(&firm).unwrap();
        let back: Firm = serde_json::from_str(&json).unwrap();
        assert_eq!(firm, back);
    }
}
