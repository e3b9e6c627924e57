//! Inventory identifier extraction from free-form input
//!
//! Users paste numbers, full inventory URLs or whole lists of them. Every
//! maximal run of decimal digits is treated as one identifier.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{MetadataError, MetadataResult};

fn digit_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("digit pattern is valid"))
}

/// Extract identifiers from text, de-duplicated in first-seen order
///
/// ```
/// use eais_fetcher::app::identifiers::extract_identifiers;
///
/// let ids = extract_identifiers("https://eais.archyvai.lt/inventories/355857, 355857 and 12");
/// assert_eq!(ids, vec!["355857", "12"]);
/// ```
pub fn extract_identifiers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    digit_runs()
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Extract identifiers from command-line arguments
pub fn extract_from_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let joined = args
        .iter()
        .map(|a| a.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    extract_identifiers(&joined)
}

/// Check that a single identifier is a plain decimal number
pub fn validate_identifier(identifier: &str) -> MetadataResult<()> {
    if !identifier.is_empty() && identifier.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(MetadataError::InvalidIdentifier {
            input: identifier.to_string(),
        })
    }
}
