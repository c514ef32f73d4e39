//! Weighted approximate-substring index over firm records.
//!
//! Each record is projected once into normalized field values. A lookup
//! scores every value by its closest window: the substring with the smallest
//! Levenshtein distance to the term, as computed by `strsim`. The field
//! score is `errors / term_len` (lower is better) and accepted field scores
//! combine into one record score:
//!
//! ```text
//! record_score = Π field_score ^ (field_weight × field_norm)
//! field_norm   = 1 / sqrt(word_count(value))
//! ```
//!
//! Weights are normalized to sum to one, so a strong match on a heavy field
//! (tags) pulls the record score down more than the same match on a light
//! field (region).

use std::collections::{HashMap, HashSet};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::firms::types::Firm;
use crate::search::config::{DESCRIPTION_INDEX_CHARS, FuzzyConfig, MAX_PATTERN_CHARS};
use crate::search::normalize::normalize;

/// Lowest score a field match can have
pub const MIN_FIELD_SCORE: f64 = 0.001;

/// A fuzzy lookup capability over a fixed record set
pub trait FuzzyEngine: Send + Sync {
    /// Index `firms`; record positions in hits refer to this slice
    fn build(firms: &[Firm], config: &FuzzyConfig) -> Result<Self>
    where
        Self: Sized;

    /// Best `limit` hits for one term, best first
    fn search(&self, term: &str, limit: usize) -> Result<Vec<FuzzyHit>>;

    /// Number of indexed records
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Searchable fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexedField {
    Name,
    Firm,
    Tags,
    Area,
    Description,
    Country,
    Region,
}

impl IndexedField {
    pub const ALL: [IndexedField; 7] = [
        IndexedField::Name,
        IndexedField::Firm,
        IndexedField::Tags,
        IndexedField::Area,
        IndexedField::Description,
        IndexedField::Country,
        IndexedField::Region,
    ];

    /// Label shown to users in explanations
    pub fn label(self) -> &'static str {
        match self {
            IndexedField::Name => "nombre",
            IndexedField::Firm => "nombre de firma",
            IndexedField::Tags => "tags/especialidades",
            IndexedField::Area => "área de práctica",
            IndexedField::Description => "descripción",
            IndexedField::Country => "país",
            IndexedField::Region => "región",
        }
    }

    fn weight(self, config: &FuzzyConfig) -> f64 {
        let w = &config.weights;
        match self {
            IndexedField::Name => w.name,
            IndexedField::Firm => w.firm,
            IndexedField::Tags => w.tags,
            IndexedField::Area => w.area,
            IndexedField::Description => w.description,
            IndexedField::Country => w.country,
            IndexedField::Region => w.region,
        }
    }
}

/// One accepted field match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub field: IndexedField,
    /// Normalized value that matched
    pub value: String,
    /// Position within an array field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_index: Option<usize>,
    /// Matched character range `[start, end)` within `value`
    pub span: (usize, usize),
    pub score: f64,
}

/// One record returned by a lookup
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyHit {
    /// Position of the record in the indexed slice
    pub record: usize,
    /// Combined score in `(0, 1]`, lower is better
    pub score: f64,
    pub matches: Vec<FieldMatch>,
}

#[derive(Debug, Clone)]
struct IndexedValue {
    text: String,
    norm: f64,
    array_index: Option<usize>,
}

#[derive(Debug, Clone, Default)]
struct IndexedRecord {
    fields: Vec<(IndexedField, Vec<IndexedValue>)>,
}

/// The default [`FuzzyEngine`]
#[derive(Debug, Clone)]
pub struct FuzzyIndex {
    records: Vec<IndexedRecord>,
    /// Normalized weight per field, in [`IndexedField::ALL`] order
    weights: [f64; 7],
    config: FuzzyConfig,
}

impl FuzzyEngine for FuzzyIndex {
    fn build(firms: &[Firm], config: &FuzzyConfig) -> Result<Self> {
        let mut raw_weights = [0.0; 7];
        for (slot, field) in raw_weights.iter_mut().zip(IndexedField::ALL) {
            let weight = field.weight(config);
            if !(weight.is_finite() && weight > 0.0) {
                bail!("Weight of field {:?} must be positive, got {}", field, weight);
            }
            *slot = weight;
        }
        let total: f64 = raw_weights.iter().sum();
        let weights = raw_weights.map(|w| w / total);

        // Only the first record with a given id is searchable
        let mut ids = HashSet::new();
        let records = firms
            .iter()
            .map(|firm| {
                if firm.id.is_empty() || ids.insert(firm.id.as_str()) {
                    project(firm)
                } else {
                    tracing::warn!("Duplicate firm id {:?}, keeping the first record", firm.id);
                    IndexedRecord::default()
                }
            })
            .collect();

        tracing::info!("Built fuzzy index over {} firms", firms.len());
        Ok(Self {
            records,
            weights,
            config: config.clone(),
        })
    }

    fn search(&self, term: &str, limit: usize) -> Result<Vec<FuzzyHit>> {
        let pattern = normalize(term);
        if pattern.is_empty() {
            bail!("Search term is empty");
        }
        if pattern.chars().count() > MAX_PATTERN_CHARS {
            bail!(
                "Search term is longer than {} characters",
                MAX_PATTERN_CHARS
            );
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<FuzzyHit> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(position, record)| self.score_record(position, record, &pattern))
            .collect();

        hits.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a.record.cmp(&b.record))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

impl FuzzyIndex {
    fn score_record(
        &self,
        position: usize,
        record: &IndexedRecord,
        pattern: &str,
    ) -> Option<FuzzyHit> {
        let mut total = 1.0;
        let mut matches = Vec::new();

        for (field, values) in &record.fields {
            let weight = self.weights[*field as usize];
            for value in values {
                let Some((score, span)) = self.score_value(pattern, &value.text) else {
                    continue;
                };
                total *= score.powf(weight * value.norm);
                matches.push(FieldMatch {
                    field: *field,
                    value: value.text.clone(),
                    array_index: value.array_index,
                    span,
                    score,
                });
            }
        }

        if matches.is_empty() {
            None
        } else {
            Some(FuzzyHit {
                record: position,
                score: total,
                matches,
            })
        }
    }

    /// Field score and matched span, if the value is close enough
    fn score_value(&self, pattern: &str, text: &str) -> Option<(f64, (usize, usize))> {
        let config = &self.config;
        let pattern_len = pattern.chars().count();
        let max_errors = ((config.threshold * pattern_len as f64).floor() as usize)
            .min(pattern_len.saturating_sub(1));

        let (errors, start, end) = if config.ignore_location {
            match text.find(pattern) {
                Some(byte) => {
                    let start = text[..byte].chars().count();
                    (0, start, start + pattern_len)
                }
                None => best_window(pattern, text, max_errors, |errors, _| errors as f64)?,
            }
        } else {
            best_window(pattern, text, max_errors, |errors, start| {
                self.location_score(errors, start, pattern_len)
            })?
        };

        if end - start < config.min_match_char_length {
            return None;
        }

        let score = if config.ignore_location {
            errors as f64 / pattern_len as f64
        } else {
            self.location_score(errors, start, pattern_len)
        }
        .max(MIN_FIELD_SCORE);

        (score <= config.threshold).then_some((score, (start, end)))
    }

    fn location_score(&self, errors: usize, start: usize, pattern_len: usize) -> f64 {
        let accuracy = errors as f64 / pattern_len as f64;
        let proximity = start.abs_diff(self.config.location);
        if self.config.distance == 0 {
            return if proximity > 0 { 1.0 } else { accuracy };
        }
        accuracy + proximity as f64 / self.config.distance as f64
    }
}

/// Window of `text` closest to `pattern` by Levenshtein distance, with at
/// most `max_errors` edits.
///
/// Returns `(errors, start, end)` in characters. Windows are at most
/// `max_errors` characters shorter or longer than the pattern, and a start
/// is skipped when its reach shares too few characters with the pattern to
/// stay within `max_errors`. `cost` ranks candidates; ties keep the earliest
/// window.
fn best_window(
    pattern: &str,
    text: &str,
    max_errors: usize,
    cost: impl Fn(usize, usize) -> f64,
) -> Option<(usize, usize, usize)> {
    let pattern_len = pattern.chars().count();
    let chars: Vec<char> = text.chars().collect();
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();
    if pattern_len == 0 || chars.is_empty() {
        return None;
    }

    let mut wanted: HashMap<char, usize> = HashMap::new();
    for c in pattern.chars() {
        *wanted.entry(c).or_default() += 1;
    }
    let shortest = pattern_len.saturating_sub(max_errors).max(1);
    let longest = pattern_len + max_errors;

    let mut best: Option<(f64, usize, usize, usize)> = None;
    for start in 0..chars.len() {
        if chars.len() - start < shortest {
            break;
        }
        let reach = (start + longest).min(chars.len());
        if shared_chars(&wanted, &chars[start..reach]) + max_errors < pattern_len {
            continue;
        }

        for end in (start + shortest)..=reach {
            let errors = strsim::levenshtein(pattern, &text[bounds[start]..bounds[end]]);
            if errors > max_errors {
                continue;
            }
            let candidate = cost(errors, start);
            if best.is_none_or(|(b, ..)| candidate < b) {
                best = Some((candidate, errors, start, end));
            }
        }
    }

    best.map(|(_, errors, start, end)| (errors, start, end))
}

/// Characters of `window` that can be paired with a pattern character
fn shared_chars(wanted: &HashMap<char, usize>, window: &[char]) -> usize {
    let mut remaining = wanted.clone();
    window
        .iter()
        .filter(|c| match remaining.get_mut(*c) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
        .count()
}

/// `1 / sqrt(word_count)` rounded to three decimals
fn field_norm(value: &str) -> f64 {
    let words = value.split(' ').count() as f64;
    (1000.0 / words.sqrt()).round() / 1000.0
}

fn indexed(text: String, array_index: Option<usize>) -> Option<IndexedValue> {
    if text.trim().is_empty() {
        return None;
    }
    Some(IndexedValue {
        norm: field_norm(&text),
        text,
        array_index,
    })
}

fn project(firm: &Firm) -> IndexedRecord {
    let name = if firm.name.is_empty() { &firm.firm } else { &firm.name };
    let description: String = normalize(&firm.description)
        .chars()
        .take(DESCRIPTION_INDEX_CHARS)
        .collect();

    let single = |text: String| indexed(text, None).into_iter().collect::<Vec<_>>();
    let tags = firm
        .tags
        .iter()
        .enumerate()
        .filter_map(|(i, tag)| indexed(normalize(tag), Some(i)))
        .collect();

    IndexedRecord {
        fields: vec![
            (IndexedField::Name, single(normalize(name))),
            (IndexedField::Firm, single(normalize(firm.display_name()))),
            (IndexedField::Tags, tags),
            (IndexedField::Area, single(normalize(&firm.area))),
            (IndexedField::Description, single(description)),
            (IndexedField::Country, single(normalize(&firm.country))),
            (IndexedField::Region, single(normalize(&firm.region))),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firms() -> Vec<Firm> {
        vec![
            Firm::new("1", "Green Energy Solutions", "Chile")
                .with_area("Energía Renovable")
                .with_tags(["energía", "solar"]),
            Firm::new("2", "Tech Innovators Law", "España")
                .with_area("Tecnología / Software")
                .with_tags(["software", "startups"]),
            Firm::new("3", "Mining Rights Advisors", "Perú")
                .with_description("Asesoría legal en proyectos mineros")
                .with_tags(["minería"]),
        ]
    }

    fn index() -> FuzzyIndex {
        FuzzyIndex::build(&firms(), &FuzzyConfig::default()).unwrap()
    }

    #[test]
    fn test_best_window_exact_and_approximate() {
        let text = "energia renovable";
        assert_eq!(
            best_window("renovable", text, 3, |e, _| e as f64),
            Some((0, 8, 17))
        );
        assert_eq!(
            best_window("renewable", text, 3, |e, _| e as f64),
            Some((2, 8, 17))
        );
        assert_eq!(best_window("renewable", text, 1, |e, _| e as f64), None);
    }

    #[test]
    fn test_best_window_counts_characters_not_bytes() {
        assert_eq!(
            best_window("mineria", "asesoría en minería", 2, |e, _| e as f64),
            Some((1, 12, 19))
        );
    }

    #[test]
    fn test_shared_chars_respects_multiplicity() {
        let wanted: HashMap<char, usize> = [('a', 2), ('b', 1)].into_iter().collect();
        assert_eq!(shared_chars(&wanted, &['a', 'a', 'a', 'b', 'b']), 3);
        assert_eq!(shared_chars(&wanted, &['x', 'y']), 0);
    }

    #[test]
    fn test_field_norm() {
        assert_eq!(field_norm("solar"), 1.0);
        assert_eq!(field_norm("medio ambiente"), 0.707);
        assert_eq!(field_norm("a b c d"), 0.5);
    }

    #[test]
    fn test_exact_tag_match_ranks_first() {
        let hits = index().search("software", 10).unwrap();
        assert_eq!(hits[0].record, 1);
        assert!(hits[0]
            .matches
            .iter()
            .any(|m| m.field == IndexedField::Tags && m.array_index == Some(0)));
    }

    #[test]
    fn test_accents_and_typos_match() {
        let index = index();
        let hits = index.search("Minería", 10).unwrap();
        assert_eq!(hits.first().map(|h| h.record), Some(2));

        let hits = index.search("energ´a", 10).unwrap();
        assert!(hits.iter().any(|h| h.record == 0));
    }

    #[test]
    fn test_nonsense_term_has_no_hits() {
        assert!(index().search("xyzqwv", 10).unwrap().is_empty());
    }

    #[test]
    fn test_single_char_rejected_by_min_span() {
        assert!(index().search("s", 10).unwrap().is_empty());
    }

    #[test]
    fn test_hits_sorted_and_limited() {
        let hits = index().search("so", 10).unwrap();
        assert!(hits.windows(2).all(|w| w[0].score <= w[1].score));
        assert!(index().search("so", 1).unwrap().len() <= 1);
        assert!(index().search("so", 0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_terms_are_errors() {
        let index = index();
        assert!(index.search("   ", 10).is_err());
        assert!(index.search(&"a".repeat(MAX_PATTERN_CHARS + 1), 10).is_err());
    }

    #[test]
    fn test_duplicate_ids_keep_first_record() {
        let duplicate = vec![
            Firm::new("1", "Solar Uno", "Chile"),
            Firm::new("1", "Solar Dos", "Chile"),
        ];
        let index = FuzzyIndex::build(&duplicate, &FuzzyConfig::default()).unwrap();
        assert_eq!(index.len(), 2);

        let hits = index.search("solar", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record, 0);
    }

    #[test]
    fn test_build_rejects_bad_weights() {
        let blank_ids = vec![Firm::new("", "A", "Chile"), Firm::new("", "B", "Chile")];
        assert!(FuzzyIndex::build(&blank_ids, &FuzzyConfig::default()).is_ok());

        let mut config = FuzzyConfig::default();
        config.weights.region = 0.0;
        assert!(FuzzyIndex::build(&firms(), &config).is_err());
    }

    #[test]
    fn test_location_scoring() {
        let config = FuzzyConfig {
            ignore_location: false,
            distance: 10,
            ..FuzzyConfig::default()
        };
        let index = FuzzyIndex::build(&firms(), &config).unwrap();
        let near = index.score_value("sol", "solar").unwrap();
        let far = index.score_value("sol", "energia sol");
        assert_eq!(near.0, MIN_FIELD_SCORE);
        assert!(far.is_none());
    }

    #[test]
    fn test_empty_index() {
        let index = FuzzyIndex::build(&[], &FuzzyConfig::default()).unwrap();
        assert!(index.is_empty());
        assert!(index.search("energia", 10).unwrap().is_empty());
    }
}
