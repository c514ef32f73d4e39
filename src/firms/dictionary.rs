//! Auxiliary firm dictionary: per-firm keywords, synonyms and categories.
//!
//! The dictionary is a JSON object keyed by the normalized `country::firm`
//! key of each firm. It is produced offline and is optional; without it,
//! query expansion uses the static synonym rules only.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::deserialize_string_list;

/// Dictionary keyed by normalized `country::firm`
pub type FirmDictionary = BTreeMap<String, DictionaryEntry>;

/// Terms associated with one firm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub synonyms: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub categories: Vec<String>,
}

impl DictionaryEntry {
    /// Keywords, synonyms and categories exploded into individual terms
    pub fn group_terms(&self) -> Vec<String> {
        let mut terms = Vec::new();
        for list in [&self.keywords, &self.synonyms, &self.categories] {
            terms.extend(explode_terms(list));
        }
        terms
    }
}

/// Split every value on `/` and `,` and drop empty pieces
pub fn explode_terms(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(['/', ',']))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a dictionary file
pub fn load_dictionary(path: &Path) -> Result<FirmDictionary> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read firm dictionary: {}", path.display()))?;
    let dictionary: FirmDictionary = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse firm dictionary: {}", path.display()))?;
    Ok(dictionary)
}

/// Load the dictionary if a path is configured, degrading to an empty
/// dictionary when the file cannot be used
pub fn load_dictionary_or_empty(path: Option<&Path>) -> FirmDictionary {
    let Some(path) = path else {
        tracing::info!("No firm dictionary configured, using static synonym rules only");
        return FirmDictionary::new();
    };

    match load_dictionary(path) {
        Ok(dictionary) => {
            tracing::info!("Loaded firm dictionary with {} entries", dictionary.len());
            dictionary
        }
        Err(e) => {
            tracing::warn!(
                "Firm dictionary unavailable, search continues without it: {:#}",
                e
            );
            FirmDictionary::new()
        }
    }
}
