//! The persisted index document.
//!
//! Struct fields are declared in alphabetical order and every map is a
//! `BTreeMap`, so serialization emits sorted keys and two runs over the same
//! data produce identical bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tagdex_core::{PackageDescriptor, PackageId, VersionConstraint};

/// Root of the index file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Package id -> record.
    #[serde(default)]
    pub packages: BTreeMap<PackageId, PackageRecord>,
}

/// Where a package's repository lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCoordinates {
    /// Repository owner.
    pub owner: String,
    /// Provider name as written in the packages file.
    pub provider: String,
    /// Repository name.
    pub repository: String,
}

impl From<&PackageDescriptor> for GitCoordinates {
    fn from(descriptor: &PackageDescriptor) -> Self {
        Self {
            owner: descriptor.owner.clone(),
            provider: descriptor.provider_name.clone(),
            repository: descriptor.repository.clone(),
        }
    }
}

/// One package and every release indexed so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// From the most recently fetched metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Repository coordinates.
    pub git: GitCoordinates,
    /// Icon reference.
    #[serde(default)]
    pub icon: String,
    /// From the most recently fetched metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Release tag -> record. Only ever grows.
    #[serde(default)]
    pub versions: BTreeMap<String, VersionRecord>,
}

impl PackageRecord {
    /// Header-only record for a newly seen package.
    #[must_use]
    pub fn new(descriptor: &PackageDescriptor) -> Self {
        Self {
            description: None,
            git: GitCoordinates::from(descriptor),
            icon: descriptor.icon.clone(),
            name: None,
            versions: BTreeMap::new(),
        }
    }
}

/// What one release declares. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Tool name -> supported range.
    pub compatibility: BTreeMap<String, CompatibilityRange>,
    /// Dependency package id -> version constraint.
    pub dependencies: BTreeMap<PackageId, VersionConstraint>,
}

/// Inclusive range of tool versions a release works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityRange {
    /// Newest supported version.
    pub maximum: String,
    /// Oldest supported version.
    pub minimum: String,
}

impl CompatibilityRange {
    /// Create a range.
    #[must_use]
    pub fn new(minimum: impl Into<String>, maximum: impl Into<String>) -> Self {
        Self {
            maximum: maximum.into(),
            minimum: minimum.into(),
        }
    }
}
