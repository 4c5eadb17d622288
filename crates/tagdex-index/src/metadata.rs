//! Per-release `metadata.json` decoding.
//!
//! Only the fields the index needs are checked: `name`, `description`,
//! `dependencies.packages`, and optionally `compatibility`. Anything else in
//! the file is ignored, and dependency constraints are stored as declared.

use crate::document::{CompatibilityRange, VersionRecord};
use sonic_rs::{JsonContainerTrait, JsonValueTrait, Value};
use std::collections::BTreeMap;
use tagdex_core::{PackageId, VersionConstraint};
use thiserror::Error;
use tracing::warn;

/// Tool whose declared range decides whether compatibility data is present.
pub const COMPOSE_TOOL: &str = "compose";

/// Range assumed for releases that declare no `compose` compatibility.
pub const DEFAULT_COMPOSE_MINIMUM: &str = "v0.0.0";
/// See [`DEFAULT_COMPOSE_MINIMUM`].
pub const DEFAULT_COMPOSE_MAXIMUM: &str = "v0.9.9";

/// Why a metadata file was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// Body was empty or an empty object.
    #[error("metadata is empty")]
    Empty,
    /// Body is not JSON or lacks a required field.
    #[error("metadata is invalid: {0}")]
    Invalid(String),
}

impl MetadataError {
    fn missing(field: &str) -> Self {
        Self::Invalid(format!("missing or mistyped field `{field}`"))
    }
}

fn required_str(metadata: &Value, field: &str) -> Result<String, MetadataError> {
    metadata
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| MetadataError::missing(field))
}

/// Decoded `metadata.json` of one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Dependency package id -> version constraint.
    pub dependencies: BTreeMap<PackageId, VersionConstraint>,
    /// Declared compatibility, `None` when nothing usable for `compose` was
    /// declared.
    pub compatibility: Option<BTreeMap<String, CompatibilityRange>>,
}

impl PackageMetadata {
    /// Decode a metadata body.
    ///
    /// # Errors
    /// Returns [`MetadataError::Empty`] for an empty body or `{}`, and
    /// [`MetadataError::Invalid`] when it does not decode or a required field
    /// is missing.
    pub fn decode(bytes: &[u8]) -> Result<Self, MetadataError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(MetadataError::Empty);
        }

        let value: Value =
            sonic_rs::from_slice(bytes).map_err(|e| MetadataError::Invalid(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| MetadataError::Invalid("expected a JSON object".to_string()))?;
        if object.is_empty() {
            return Err(MetadataError::Empty);
        }

        let packages = value
            .get("dependencies")
            .and_then(|section| section.get("packages"))
            .and_then(|packages| packages.as_object())
            .ok_or_else(|| MetadataError::missing("dependencies.packages"))?;

        Ok(Self {
            name: required_str(&value, "name")?,
            description: required_str(&value, "description")?,
            dependencies: packages
                .iter()
                .map(|(id, constraint)| {
                    (PackageId::new(id), VersionConstraint::new(constraint.clone()))
                })
                .collect(),
            compatibility: value.get("compatibility").and_then(compatibility_ranges),
        })
    }

    /// The record stored under this release's tag.
    ///
    /// Releases without `compose` compatibility get the default range.
    #[must_use]
    pub fn into_version_record(self) -> VersionRecord {
        VersionRecord {
            compatibility: self.compatibility.unwrap_or_else(default_compatibility),
            dependencies: self.dependencies,
        }
    }
}

/// `{"compose": {"minimum": "v0.0.0", "maximum": "v0.9.9"}}`
#[must_use]
pub fn default_compatibility() -> BTreeMap<String, CompatibilityRange> {
    BTreeMap::from([(
        COMPOSE_TOOL.to_string(),
        CompatibilityRange::new(DEFAULT_COMPOSE_MINIMUM, DEFAULT_COMPOSE_MAXIMUM),
    )])
}

/// Usable ranges from a declared `compatibility` object, or `None` when it
/// has no well-formed `compose` entry.
fn compatibility_ranges(declared: &Value) -> Option<BTreeMap<String, CompatibilityRange>> {
    let object = declared.as_object()?;
    let mut ranges = BTreeMap::new();

    for (tool, range) in object.iter() {
        match parse_range(range) {
            Some(range) => {
                ranges.insert(tool.to_string(), range);
            }
            None => warn!(tool = %tool, "ignoring malformed compatibility range"),
        }
    }

    ranges.contains_key(COMPOSE_TOOL).then_some(ranges)
}

fn parse_range(range: &Value) -> Option<CompatibilityRange> {
    let minimum = range.get("minimum")?.as_str()?;
    let maximum = range.get("maximum")?.as_str()?;
    Some(CompatibilityRange::new(minimum, maximum))
}
