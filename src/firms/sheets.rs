//! Spreadsheet ingestion: turning raw sheet rows into [`Firm`] records.
//!
//! The results sheet has one row per (firm, country, practice area). Rows are
//! grouped by the normalized `country::firm` key into a single firm whose
//! areas, descriptions and tags are merged and whose rank is the best
//! (lowest positive) rank seen. A second sheet of concept tags contributes
//! extra tags per `country::firm`.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::firms::types::{Firm, group_key};
use crate::search::normalize::normalize;

/// Range holding the firm rows (country, area, firm, description,
/// testimonials, key clients, work highlights, ranked, tags, region, id)
pub const RESULTS_RANGE: &str = "Results3!A2:K";

/// Range holding the concept tags rows (country, area, firm, tags)
pub const CONCEPT_TAGS_RANGE: &str = "'Tags conceptos'!A2:D";

/// A block of cell values, as returned by the Sheets values API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    pub fn from_rows(rows: Vec<Vec<&str>>) -> Self {
        Self {
            range: None,
            major_dimension: Some("ROWS".to_string()),
            values: rows
                .into_iter()
                .map(|row| row.into_iter().map(serde_json::Value::from).collect())
                .collect(),
        }
    }
}

/// Text of cell `index`, empty for missing cells; numbers are rendered as text
fn cell(row: &[serde_json::Value], index: usize) -> String {
    match row.get(index) {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Parse a tags cell.
///
/// Accepts a JSON-ish array (single quotes allowed) or text separated by
/// `,` or `;`. Surrounding quotes are stripped and empty tags dropped.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    if raw.starts_with('[') && raw.ends_with(']') {
        let json_safe = raw.replace('\'', "\"");
        if let Ok(serde_json::Value::Array(items)) =
            serde_json::from_str::<serde_json::Value>(&json_safe)
        {
            return items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .map(|t| strip_quotes(&t))
                .filter(|t| !t.is_empty())
                .collect();
        }
    }

    raw.replace(['[', ']'], "")
        .split([';', ','])
        .map(strip_quotes)
        .filter(|t| !t.is_empty())
        .collect()
}

fn strip_quotes(tag: &str) -> String {
    tag.trim().trim_matches('"').trim().to_string()
}

/// Concatenate tag lists, dropping blanks and normalized duplicates while
/// keeping the first display form
pub fn merge_tags<'a>(lists: impl IntoIterator<Item = &'a [String]>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for tag in lists.into_iter().flatten() {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(normalize(tag)) {
            merged.push(tag.to_string());
        }
    }

    merged
}

/// Extra tags per normalized `country::firm`, from the concept tags sheet
pub fn concept_tags_by_firm(rows: &ValueRange) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();

    for row in &rows.values {
        let country = cell(row, 0);
        let firm = cell(row, 2);
        if firm.trim().is_empty() {
            continue;
        }
        let tags = parse_tags(&cell(row, 3));
        map.entry(group_key(country.trim(), firm.trim()))
            .or_default()
            .extend(tags);
    }

    map
}

/// Countries and practice areas offered by the intake form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormOptions {
    pub countries: Vec<String>,
    pub areas: Vec<String>,
}

/// Sorted unique countries and areas from the concept tags sheet
pub fn form_options(rows: &ValueRange) -> FormOptions {
    let mut countries = BTreeSet::new();
    let mut areas = BTreeSet::new();

    for row in &rows.values {
        let country = cell(row, 0).trim().to_string();
        let area = cell(row, 1).trim().to_string();
        if !country.is_empty() {
            countries.insert(country);
        }
        if !area.is_empty() {
            areas.insert(area);
        }
    }

    FormOptions {
        countries: countries.into_iter().collect(),
        areas: areas.into_iter().collect(),
    }
}

#[derive(Debug)]
struct FirmGroup {
    id: String,
    firm: String,
    country: String,
    region: String,
    ranks: Vec<u32>,
    tags: Vec<String>,
    areas: Vec<String>,
    descriptions: Vec<String>,
    testimonials: Vec<String>,
    key_clients: Vec<String>,
    work_highlights: Vec<String>,
}

/// Group result rows into firms, in order of first appearance.
///
/// The id comes from the first row of a group (its id column, or its row
/// position when blank). Ids are unique in the output: a firm whose id was
/// already taken gets a `-2`, `-3`... suffix. Rows without a firm name are
/// skipped.
pub fn group_firm_rows(
    results: &ValueRange,
    concept_tags: &HashMap<String, Vec<String>>,
) -> Vec<Firm> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, FirmGroup> = HashMap::new();

    for (index, row) in results.values.iter().enumerate() {
        let country = cell(row, 0).trim().to_string();
        let area = cell(row, 1).trim().to_string();
        let firm = cell(row, 2).trim().to_string();
        if firm.is_empty() {
            continue;
        }

        let key = group_key(&country, &firm);
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            let id = cell(row, 10).trim().to_string();
            FirmGroup {
                id: if id.is_empty() { index.to_string() } else { id },
                firm: firm.clone(),
                country: country.clone(),
                region: cell(row, 9).trim().to_string(),
                ranks: Vec::new(),
                tags: Vec::new(),
                areas: Vec::new(),
                descriptions: Vec::new(),
                testimonials: Vec::new(),
                key_clients: Vec::new(),
                work_highlights: Vec::new(),
            }
        });

        let rank = crate::util::parse_rank(&cell(row, 7));
        if rank > 0 {
            group.ranks.push(rank);
        }
        group.tags.extend(parse_tags(&cell(row, 8)));
        if !area.is_empty() && !group.areas.contains(&area) {
            group.areas.push(area);
        }
        push_nonempty(&mut group.descriptions, cell(row, 3));
        push_nonempty(&mut group.testimonials, cell(row, 4));
        push_nonempty(&mut group.key_clients, cell(row, 5));
        push_nonempty(&mut group.work_highlights, cell(row, 6));
    }

    let mut firms = Vec::with_capacity(order.len());
    let mut used_ids = HashSet::new();
    for key in order {
        let Some(group) = groups.remove(&key) else {
            continue;
        };
        let extra = concept_tags.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        let tags = merge_tags([group.tags.as_slice(), extra]);

        let id = unique_id(group.id, &mut used_ids);
        let mut firm = Firm::new(id, group.firm, group.country)
            .with_region(group.region)
            .with_areas(group.areas)
            .with_description(group.descriptions.join("\n\n").trim())
            .with_rank(group.ranks.iter().copied().min().unwrap_or(0))
            .with_tags(tags);
        firm.testimonials = group.testimonials.join("\n\n").trim().to_string();
        firm.key_clients = group.key_clients.join("\n\n").trim().to_string();
        firm.work_highlights = group.work_highlights.join("\n\n").trim().to_string();
        firms.push(firm);
    }

    tracing::info!("Grouped {} result rows into {} firms", results.values.len(), firms.len());
    firms
}

/// `id`, or the first free `id-N` (N from 2) when `id` is taken
fn unique_id(id: String, used: &mut HashSet<String>) -> String {
    if used.insert(id.clone()) {
        return id;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{id}-{suffix}");
        if used.insert(candidate.clone()) {
            tracing::warn!("Duplicate firm id {:?}, renamed to {:?}", id, candidate);
            return candidate;
        }
        suffix += 1;
    }
}

fn push_nonempty(list: &mut Vec<String>, value: String) {
    if !value.is_empty() {
        list.push(value);
    }
}
