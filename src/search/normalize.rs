//! Text normalization shared by every comparison in the search engine.
//!
//! Keys, tags, query terms and country/region names are all compared in
//! their normalized form: lowercase, diacritics removed, surrounding
//! whitespace trimmed.

use unicode_normalization::UnicodeNormalization;

/// Normalize text for matching.
///
/// Lowercases, decomposes to NFD, drops the combining diacritical marks
/// block (U+0300..=U+036F) and trims. Total and idempotent.
///
/// Lowercasing happens first because some uppercase letters lowercase into
/// a base letter plus a combining mark (`İ` becomes `i` + U+0307).
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect();
    stripped.trim().to_string()
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}
