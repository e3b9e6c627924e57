//! Folder name derivation for downloaded inventories
//!
//! Builds the deterministic, filesystem-safe folder name an inventory is
//! materialized under:
//!
//! ```text
//! {identifier}_{title} {chronNotes}[ g| m| s]
//! ```
//!
//! Everything here is pure. The orchestrator relies on equal inputs producing
//! equal names for its "already downloaded" check.

use serde::{Deserialize, Serialize};

use crate::constants::naming;

/// Kind of civil register an inventory title describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Birth or baptism register
    Birth,
    /// Death or burial register
    Death,
    /// Marriage register
    Marriage,
}

impl RecordKind {
    /// One-letter folder suffix (Lithuanian initials: gimimas, mirtis, santuoka)
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Birth => "g",
            Self::Death => "m",
            Self::Marriage => "s",
        }
    }
}

/// Classifies an inventory title into a register kind
pub trait TitleClassifier: Send + Sync {
    /// Returns the register kind for `title`, if any
    fn classify(&self, title: &str) -> Option<RecordKind>;
}

/// Classifier that never appends a suffix
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassifier;

impl TitleClassifier for NoClassifier {
    fn classify(&self, _title: &str) -> Option<RecordKind> {
        None
    }
}

/// Keyword lists used by [`KeywordClassifier`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Append the register suffix at all
    pub classify_titles: bool,
    /// Substrings marking a birth register
    pub birth_keywords: Vec<String>,
    /// Substrings marking a death register
    pub death_keywords: Vec<String>,
    /// Substrings marking a marriage register
    pub marriage_keywords: Vec<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            classify_titles: true,
            birth_keywords: owned(naming::BIRTH_KEYWORDS),
            death_keywords: owned(naming::DEATH_KEYWORDS),
            marriage_keywords: owned(naming::MARRIAGE_KEYWORDS),
        }
    }
}

impl NamingConfig {
    /// Build the classifier described by this configuration
    pub fn build_classifier(&self) -> Box<dyn TitleClassifier> {
        if self.classify_titles {
            Box::new(KeywordClassifier::from_config(self))
        } else {
            Box::new(NoClassifier)
        }
    }
}

/// Case-insensitive substring classifier
///
/// Checks birth, death and marriage keywords in that order; the first list
/// with a hit wins.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<(RecordKind, Vec<String>)>,
}

impl KeywordClassifier {
    /// Create a classifier from explicit keyword lists
    pub fn new(birth: &[String], death: &[String], marriage: &[String]) -> Self {
        let lower = |words: &[String]| -> Vec<String> {
            words
                .iter()
                .filter(|w| !w.is_empty())
                .map(|w| w.to_lowercase())
                .collect()
        };
        Self {
            rules: vec![
                (RecordKind::Birth, lower(birth)),
                (RecordKind::Death, lower(death)),
                (RecordKind::Marriage, lower(marriage)),
            ],
        }
    }

    /// Create a classifier from the naming configuration
    pub fn from_config(config: &NamingConfig) -> Self {
        Self::new(
            &config.birth_keywords,
            &config.death_keywords,
            &config.marriage_keywords,
        )
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::from_config(&NamingConfig::default())
    }
}

impl TitleClassifier for KeywordClassifier {
    fn classify(&self, title: &str) -> Option<RecordKind> {
        let title = title.to_lowercase();
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k.as_str())))
            .map(|(kind, _)| *kind)
    }
}

/// Keep only the leading year of a chronological bound (`"1850-03-01"` → `"1850"`)
pub fn trim_year(value: &str) -> &str {
    let trimmed = value.trim();
    match trimmed.split_once('-') {
        Some((year, _)) => year,
        None => trimmed,
    }
}

/// Summarize a chronological range as a year or `"{from}--{to}"`
pub fn chron_notes(from: Option<&str>, to: Option<&str>) -> String {
    let from = from.map(trim_year).filter(|y| !y.is_empty());
    let to = to.map(trim_year).filter(|y| !y.is_empty());

    match (from, to) {
        (Some(from), Some(to)) if from == to => from.to_string(),
        (Some(from), Some(to)) => format!("{}--{}", from, to),
        (Some(year), None) | (None, Some(year)) => year.to_string(),
        (None, None) => String::new(),
    }
}

/// Date label for a folder name
///
/// The chronological bounds win; free-form range notes are only used when
/// both bounds are absent or blank.
pub fn chron_label(from: Option<&str>, to: Option<&str>, notes: Option<&str>) -> String {
    let label = chron_notes(from, to);
    if !label.is_empty() {
        return label;
    }
    notes.map(str::trim).unwrap_or_default().to_string()
}

/// Replace every forbidden filesystem character with `_`
pub fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if naming::FORBIDDEN_CHARS.contains(&c) {
                naming::REPLACEMENT
            } else {
                c
            }
        })
        .collect()
}

/// Derive the final folder name for an inventory
///
/// # Example
///
/// ```
/// use eais_fetcher::app::naming::{derive_folder_name, NoClassifier};
///
/// let name = derive_folder_name("Vilniaus parapija", Some("1850"), Some("1852-12-31"), "355857", &NoClassifier);
/// assert_eq!(name, "355857_Vilniaus parapija 1850--1852");
/// ```
pub fn derive_folder_name(
    title: &str,
    chron_from: Option<&str>,
    chron_to: Option<&str>,
    identifier: &str,
    classifier: &dyn TitleClassifier,
) -> String {
    compose_folder_name(
        identifier,
        title,
        &chron_notes(chron_from, chron_to),
        classifier,
    )
}

/// Build a folder name from an already formatted date label
pub fn compose_folder_name(
    identifier: &str,
    title: &str,
    chron: &str,
    classifier: &dyn TitleClassifier,
) -> String {
    let mut name = format!("{}_{} {}", identifier, title, chron);

    if let Some(kind) = classifier.classify(title) {
        name.push(' ');
        name.push_str(kind.suffix());
    }

    sanitize_component(&name)
}
