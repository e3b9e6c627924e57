//! Data models for EAIS Fetcher
//!
//! This module defines the inventory record and its parts as decoded from the
//! repository API, plus the per-file download task derived from each part.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use url::Url;

use crate::app::naming::{chron_label, sanitize_component};
use crate::constants::eais;
use crate::errors::{DownloadError, DownloadResult, MetadataError, MetadataResult};

/// One downloadable page or image of an inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Logical name, used as the output file stem
    pub name: String,
    /// Opaque resource locator used to build the image URL
    pub resource_uri: String,
}

/// Metadata record for one archival inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    /// Numeric inventory identifier
    pub identifier: String,
    /// Inventory title
    pub title: String,
    /// Start of the chronological range
    pub chron_from: Option<String>,
    /// End of the chronological range
    pub chron_to: Option<String>,
    /// Free-form range notes, used when both bounds are absent
    pub chron_range_notes: Option<String>,
    /// Parts in repository order
    pub parts: Vec<Part>,
}

/// One unit of work for the file downloader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Fully percent-encoded image URL
    pub url: Url,
    /// Staging folder the file is written into
    pub staging_dir: PathBuf,
    /// Logical name of the part
    pub name: String,
}

// Wire format of the inventory endpoint. Everything is optional here so that
// missing fields surface as `MetadataError::MissingField` rather than an
// opaque serde message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInventory {
    title: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    chron_range_from: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    chron_range_to: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    chron_range_notes: Option<String>,
    artifact: Option<RawArtifact>,
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    content: Option<RawContent>,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    parts: Option<Vec<RawPart>>,
}

#[derive(Debug, Deserialize)]
struct RawPart {
    name: Option<String>,
    resource: Option<RawResource>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    uri: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl InventoryRecord {
    /// Decode an inventory record from the endpoint's JSON body
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::JsonParse` for malformed JSON,
    /// `MetadataError::MissingField` when the title or the
    /// `artifact.content.parts` chain is absent, and
    /// `MetadataError::DuplicatePart` when two parts map to the same file.
    pub fn from_json(identifier: &str, body: &str) -> MetadataResult<Self> {
        let raw: RawInventory = serde_json::from_str(body)?;
        Self::from_raw(identifier, raw)
    }

    /// Decode an inventory record from an already-parsed JSON value
    pub fn from_value(identifier: &str, value: serde_json::Value) -> MetadataResult<Self> {
        let raw: RawInventory = serde_json::from_value(value)?;
        Self::from_raw(identifier, raw)
    }

    fn from_raw(identifier: &str, raw: RawInventory) -> MetadataResult<Self> {
        let title = raw.title.ok_or_else(|| MetadataError::missing("title"))?;
        let raw_parts = raw
            .artifact
            .ok_or_else(|| MetadataError::missing("artifact"))?
            .content
            .ok_or_else(|| MetadataError::missing("artifact.content"))?
            .parts
            .ok_or_else(|| MetadataError::missing("artifact.content.parts"))?;

        let mut seen = HashSet::new();
        let mut parts = Vec::with_capacity(raw_parts.len());
        for (index, raw_part) in raw_parts.into_iter().enumerate() {
            let name = raw_part
                .name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| MetadataError::missing(format!("parts[{}].name", index)))?;
            let resource_uri = raw_part
                .resource
                .and_then(|r| r.uri)
                .ok_or_else(|| MetadataError::missing(format!("parts[{}].resource.uri", index)))?;

            let name = sanitize_component(name.trim());
            if !seen.insert(name.clone()) {
                return Err(MetadataError::DuplicatePart { name });
            }

            parts.push(Part { name, resource_uri });
        }

        Ok(Self {
            identifier: identifier.to_string(),
            title,
            chron_from: raw.chron_range_from,
            chron_to: raw.chron_range_to,
            chron_range_notes: raw.chron_range_notes,
            parts,
        })
    }

    /// Date label used in the folder name
    pub fn chron_label(&self) -> String {
        chron_label(
            self.chron_from.as_deref(),
            self.chron_to.as_deref(),
            self.chron_range_notes.as_deref(),
        )
    }
}

/// Build the IIIF download URL for a resource locator
///
/// The whole locator is percent-encoded into a single path segment.
pub fn image_url(image_base: &str, resource_uri: &str) -> DownloadResult<Url> {
    let raw = format!(
        "{}/{}/{}",
        image_base.trim_end_matches('/'),
        urlencoding::encode(resource_uri),
        eais::IMAGE_PATH_SUFFIX
    );
    Url::parse(&raw).map_err(|e| DownloadError::InvalidUrl {
        url: raw.clone(),
        error: e.to_string(),
    })
}
