//! VAT ID format validation.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::{VatFormatError, countries, country};

/// Full-string patterns keyed by VAT prefix, compiled once.
static VAT_PATTERNS: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    countries::countries()
        .iter()
        .map(|c| {
            let re = Regex::new(&format!("^(?:{})$", c.vat_pattern))
                .unwrap_or_else(|e| panic!("bad VAT pattern for {}: {e}", c.code));
            (c.code, re)
        })
        .collect()
});

/// Registry suffixes some countries print after the number.
const REGISTRY_SUFFIXES: &[(&str, &[&str])] = &[("NO", &["MVA"]), ("CH", &["MWST", "TVA", "IVA"])];

/// Strip separators (spaces, dots, dashes, underscores, ...) and uppercase.
///
/// None of the registries accept separators, so this runs before any
/// pattern is applied.
pub fn clean_vat_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Validate a VAT ID by format (no network call).
///
/// The input must include the 2-letter country prefix (e.g. "DE123456789");
/// separators are ignored. Returns the cleaned `(country_code, number)` split
/// on success.
pub fn validate_vat_format(vat_id: &str) -> Result<(String, String), VatFormatError> {
    let cleaned = clean_vat_input(vat_id);
    if cleaned.len() < 3 {
        return Err(VatFormatError::new(
            vat_id.trim(),
            "too short, must be a 2-letter country code followed by the number",
        ));
    }

    let (cc, number) = cleaned.split_at(2);
    let Some(known) = country(cc) else {
        return Err(VatFormatError::new(
            vat_id.trim(),
            format!("unknown country code '{cc}'"),
        ));
    };

    let matches = VAT_PATTERNS
        .get(known.code)
        .is_some_and(|re| re.is_match(number));
    if !matches {
        return Err(VatFormatError::new(
            vat_id.trim(),
            format!(
                "does NOT match the VAT number format for country {} ({})",
                known.code, known.name
            ),
        ));
    }

    Ok((known.code.to_string(), number.to_string()))
}

/// Whether `vat_id` is syntactically valid for its country.
///
/// Unknown country codes are invalid.
pub fn validate(vat_id: &str) -> bool {
    validate_vat_format(vat_id).is_ok()
}

/// The number as the national registry expects it, without a trailing
/// registry suffix such as Norway's `MVA`.
pub fn registry_number<'a>(country_code: &str, number: &'a str) -> &'a str {
    REGISTRY_SUFFIXES
        .iter()
        .find(|(cc, _)| *cc == country_code)
        .and_then(|(_, suffixes)| suffixes.iter().find_map(|s| number.strip_suffix(s)))
        .unwrap_or(number)
}
