//! # Search Configuration Module
//!
//! Provides configuration constants and the optional TOML overrides for
//! indexing and querying.
//!
//! Every value has a built-in default; a config file only needs to list
//! the settings it changes:
//!
//! ```toml
//! [fuzzy]
//! threshold = 0.3
//!
//! [fuzzy.weights]
//! tags = 1.2
//!
//! [[synonyms]]
//! match = ["arbitraje"]
//! expand = ["arbitration", "disputes"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::search::synonyms::SynonymRule;

/// Default number of results returned by a search
pub const DEFAULT_SEARCH_LIMIT: i64 = 30;

/// Hard cap on the number of results returned by a search
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Maximum hits requested from the fuzzy index for a single expanded term
pub const PER_TERM_LIMIT: usize = 50;

/// Expanded terms shorter than this are never looked up
pub const MIN_TERM_CHARS: usize = 2;

/// Query tokens shorter than this are not looked up in the term graph
pub const MIN_GRAPH_TOKEN_CHARS: usize = 3;

/// Normalized descriptions are truncated to this many characters when indexed
pub const DESCRIPTION_INDEX_CHARS: usize = 300;

/// Longest term the fuzzy index accepts
pub const MAX_PATTERN_CHARS: usize = 256;

/// Maximum number of terms listed in a result explanation
pub const MAX_EXPLANATION_TERMS: usize = 5;

/// Default number of tags returned by `quick_tags`
pub const DEFAULT_QUICK_TAGS: usize = 40;

/// Default location of the optional config file, relative to the home directory
pub const CONFIG_DIR: &str = ".firm-finder";
pub const CONFIG_FILE: &str = "config.toml";

/// Per-field weights of the fuzzy index.
///
/// Weights are relative; the index normalizes them to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub name: f64,
    pub firm: f64,
    pub tags: f64,
    pub area: f64,
    pub description: f64,
    pub country: f64,
    pub region: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            name: 0.6,
            firm: 0.5,
            tags: 1.0,
            area: 0.35,
            description: 0.25,
            country: 0.15,
            region: 0.1,
        }
    }
}

/// Matching parameters of the fuzzy index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Highest accepted field score (0 = exact only, 1 = anything)
    pub threshold: f64,
    /// Distance over which a match drifting from `location` reaches score 1
    pub distance: usize,
    /// Expected match position, only used when `ignore_location` is false
    pub location: usize,
    /// Matched spans shorter than this are discarded
    pub min_match_char_length: usize,
    /// When true, a match anywhere in a field scores the same
    pub ignore_location: bool,
    pub weights: FieldWeights,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.38,
            distance: 120,
            location: 0,
            min_match_char_length: 2,
            ignore_location: true,
            weights: FieldWeights::default(),
        }
    }
}

/// Complete search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub fuzzy: FuzzyConfig,
    pub default_limit: i64,
    pub max_limit: usize,
    pub per_term_limit: usize,
    /// Replaces the built-in synonym table when present
    pub synonyms: Option<Vec<SynonymRule>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy: FuzzyConfig::default(),
            default_limit: DEFAULT_SEARCH_LIMIT,
            max_limit: MAX_SEARCH_LIMIT,
            per_term_limit: PER_TERM_LIMIT,
            synonyms: None,
        }
    }
}

impl SearchConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Failed to parse search config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read search config: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid search config: {}", path.display()))
    }

    /// Load the config from an explicit path, else from the default location
    /// if it exists, else fall back to the built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy.threshold) {
            bail!(
                "fuzzy.threshold must be between 0 and 1, got {}",
                self.fuzzy.threshold
            );
        }
        if self.max_limit == 0 || self.max_limit > MAX_SEARCH_LIMIT {
            bail!(
                "max_limit must be between 1 and {}, got {}",
                MAX_SEARCH_LIMIT,
                self.max_limit
            );
        }
        if self.per_term_limit == 0 {
            bail!("per_term_limit must be positive");
        }
        Ok(())
    }

    /// Clamp a requested limit into `0..=max_limit`
    pub fn effective_limit(&self, requested: Option<i64>) -> usize {
        let requested = requested.unwrap_or(self.default_limit);
        requested.clamp(0, self.max_limit as i64) as usize
    }
}

/// `~/.firm-finder/config.toml`, if a home directory is known
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = SearchConfig::default();
        assert_eq!(config.fuzzy.threshold, 0.38);
        assert_eq!(config.fuzzy.distance, 120);
        assert_eq!(config.fuzzy.min_match_char_length, 2);
        assert!(config.fuzzy.ignore_location);
        assert_eq!(config.fuzzy.weights.tags, 1.0);
        assert_eq!(config.per_term_limit, 50);
    }

    #[test]
    fn test_effective_limit_clamps() {
        let config = SearchConfig::default();
        assert_eq!(config.effective_limit(None), 30);
        assert_eq!(config.effective_limit(Some(-1)), 0);
        assert_eq!(config.effective_limit(Some(5)), 5);
        assert_eq!(config.effective_limit(Some(99_999)), 100);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SearchConfig::from_toml_str(
            r#"
            [fuzzy]
            threshold = 0.25

            [fuzzy.weights]
            tags = 2.0

            [[synonyms]]
            match = ["arbitraje"]
            expand = ["arbitration"]
            "#,
        )
        .unwrap();

        assert_eq!(config.fuzzy.threshold, 0.25);
        assert_eq!(config.fuzzy.distance, 120);
        assert_eq!(config.fuzzy.weights.tags, 2.0);
        assert_eq!(config.fuzzy.weights.name, 0.6);
        let synonyms = config.synonyms.unwrap();
        assert_eq!(synonyms.len(), 1);
        assert_eq!(synonyms[0].expand, vec!["arbitration".to_string()]);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        assert!(SearchConfig::from_toml_str("[fuzzy]\nthreshold = 1.5").is_err());
        assert!(SearchConfig::from_toml_str("max_limit = 0").is_err());
    }
}
