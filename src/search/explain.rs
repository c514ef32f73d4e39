//! Human-readable account of why a firm matched.

use crate::firms::types::Firm;
use crate::search::config::MAX_EXPLANATION_TERMS;
use crate::search::fuzzy::FieldMatch;
use crate::search::normalize::normalize;
use crate::search::ranker::rank_label;

/// Explainability metadata attached to a search result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Explanation {
    pub matched_fields: Vec<String>,
    pub matched_terms: Vec<String>,
    pub explanation: String,
}

/// Labels of the fields the fuzzy engine matched, first seen first
pub fn matched_fields(matches: &[FieldMatch]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for m in matches {
        let label = m.field.label();
        if !fields.iter().any(|f| f == label) {
            fields.push(label.to_string());
        }
    }
    fields
}

/// Expanded terms found verbatim (after normalization) in the firm's own
/// fields, in expansion order
pub fn detect_matched_terms(firm: &Firm, terms: &[String]) -> Vec<String> {
    let haystacks: Vec<String> = [
        firm.firm.as_str(),
        firm.name.as_str(),
        firm.country.as_str(),
        firm.area.as_str(),
        firm.description.as_str(),
        firm.tags_text.as_str(),
    ]
    .into_iter()
    .chain(firm.tags.iter().map(String::as_str))
    .chain(firm.tags_normalized.iter().map(String::as_str))
    .map(normalize)
    .filter(|h| !h.is_empty())
    .collect();

    terms
        .iter()
        .filter(|term| {
            let needle = normalize(term);
            !needle.is_empty() && haystacks.iter().any(|h| h.contains(&needle))
        })
        .cloned()
        .collect()
}

/// Expanded terms contained in the values the fuzzy engine matched
fn terms_in_matches(matches: &[FieldMatch], terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .filter(|term| {
            let needle = normalize(term);
            !needle.is_empty() && matches.iter().any(|m| m.value.contains(&needle))
        })
        .cloned()
        .collect()
}

/// Build the explanation for one merged hit
pub fn explain(firm: &Firm, matches: &[FieldMatch], terms: &[String]) -> Explanation {
    let matched_fields = matched_fields(matches);
    let matched_terms = detect_matched_terms(firm, terms);

    let mut explanation = if matched_fields.is_empty() {
        "Matches in: unspecified field(s)".to_string()
    } else {
        format!("Matches in: {}", matched_fields.join(", "))
    };

    let shown: Vec<String> = terms_in_matches(matches, terms)
        .into_iter()
        .take(MAX_EXPLANATION_TERMS)
        .collect();
    if !shown.is_empty() {
        explanation.push_str(&format!(" | Terms: {}", shown.join(", ")));
    }

    if let Some(label) = rank_label(firm.ranked) {
        explanation.push_str(&format!(" | Ranking: {label}"));
    }

    Explanation {
        matched_fields,
        matched_terms,
        explanation,
    }
}
