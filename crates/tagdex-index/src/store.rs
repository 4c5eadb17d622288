//! Index store: load, merge and persist the index document.

use crate::document::{GitCoordinates, IndexDocument, PackageRecord};
use crate::error::{IndexError, Result};
use crate::metadata::PackageMetadata;
use std::collections::btree_map::Entry;
use std::path::Path;
use tagdex_core::json::{from_json_slice, to_json_pretty};
use tagdex_core::{PackageDescriptor, PackageId};
use tagdex_platform::{AtomicFile, AtomicWriteResult, read_if_exists};
use tracing::{debug, warn};

/// The in-memory index being built.
#[derive(Debug, Clone, Default)]
pub struct IndexStore {
    document: IndexDocument,
}

impl IndexStore {
    /// Load the previous index from `path`.
    ///
    /// Returns an empty store when `reuse` is false or the file does not
    /// exist yet.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or decoded.
    /// Overwriting it would throw away every release indexed so far.
    pub fn load(path: &Path, reuse: bool) -> Result<Self> {
        if !reuse {
            debug!("ignoring previous index");
            return Ok(Self::default());
        }

        let Some(bytes) = read_if_exists(path)? else {
            debug!(path = %path.display(), "no previous index, starting empty");
            return Ok(Self::default());
        };

        let document: IndexDocument = from_json_slice(&bytes).map_err(|e| IndexError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(
            path = %path.display(),
            packages = document.packages.len(),
            "loaded previous index"
        );
        Ok(Self { document })
    }

    /// The current document.
    #[must_use]
    pub const fn document(&self) -> &IndexDocument {
        &self.document
    }

    /// Whether `tag` of `package` is already indexed.
    #[must_use]
    pub fn has_version(&self, package: &PackageId, tag: &str) -> bool {
        self.document
            .packages
            .get(package)
            .is_some_and(|record| record.versions.contains_key(tag))
    }

    /// Create the package's record if it does not exist yet.
    ///
    /// An existing record, including its versions, is left untouched.
    pub fn upsert_package_header(&mut self, descriptor: &PackageDescriptor) {
        if let Entry::Vacant(slot) = self.document.packages.entry(descriptor.id.clone()) {
            debug!(package = %descriptor.id, "new package");
            slot.insert(PackageRecord::new(descriptor));
        }
    }

    /// Store a release's metadata under `tag`.
    ///
    /// The package header (name, description, git, icon) takes the latest
    /// values; the version record is only inserted if `tag` is new. Returns
    /// whether it was inserted.
    pub fn record_version(
        &mut self,
        descriptor: &PackageDescriptor,
        tag: &str,
        metadata: PackageMetadata,
    ) -> bool {
        let record = self
            .document
            .packages
            .entry(descriptor.id.clone())
            .or_insert_with(|| PackageRecord::new(descriptor));

        record.name = Some(metadata.name.clone());
        record.description = Some(metadata.description.clone());
        record.git = GitCoordinates::from(descriptor);
        record.icon.clone_from(&descriptor.icon);

        match record.versions.entry(tag.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(metadata.into_version_record());
                true
            }
            Entry::Occupied(_) => {
                warn!(package = %descriptor.id, tag = %tag, "version already indexed, keeping existing record");
                false
            }
        }
    }

    /// Write the document to `path`, sorted and pretty-printed.
    ///
    /// # Errors
    /// Returns error if serialization or the atomic write fails.
    pub fn persist(&self, path: &Path) -> Result<AtomicWriteResult> {
        let json = to_json_pretty(&self.document)?;
        let written = AtomicFile::new(path)?.write(json.as_bytes())?;
        debug!(
            path = %written.path.display(),
            bytes = written.bytes_written,
            packages = self.document.packages.len(),
            "persisted index"
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::default_compatibility;
    use std::collections::BTreeMap;
    use tagdex_core::GitProvider;
    use tempfile::TempDir;

    fn descriptor(icon: &str) -> PackageDescriptor {
        PackageDescriptor {
            id: PackageId::new("demoapp"),
            provider: GitProvider::GitHub,
            provider_name: "github".into(),
            owner: "acme".into(),
            repository: "demo".into(),
            icon: icon.into(),
        }
    }

    fn metadata(name: &str) -> PackageMetadata {
        PackageMetadata {
            name: name.into(),
            description: "d".into(),
            dependencies: BTreeMap::new(),
            compatibility: None,
        }
    }

    #[test]
    fn header_upsert_keeps_versions() {
        let mut store = IndexStore::default();
        let pkg = descriptor("box");
        store.upsert_package_header(&pkg);
        assert!(store.record_version(&pkg, "v1.0.0", metadata("Demo")));

        store.upsert_package_header(&pkg);
        assert!(store.has_version(&pkg.id, "v1.0.0"));
        assert!(!store.has_version(&pkg.id, "v1.0.1"));
        assert!(!store.has_version(&PackageId::new("other"), "v1.0.0"));
    }

    #[test]
    fn record_version_updates_header_but_not_versions() {
        let mut store = IndexStore::default();
        store.upsert_package_header(&descriptor("box"));
        store.record_version(&descriptor("box"), "v1.0.0", metadata("Demo"));

        let inserted = store.record_version(&descriptor("star"), "v1.0.0", metadata("Renamed"));
        assert!(!inserted);

        let record = &store.document().packages[&PackageId::new("demoapp")];
        assert_eq!(record.name.as_deref(), Some("Renamed"));
        assert_eq!(record.icon, "star");
        assert_eq!(record.versions.len(), 1);
        assert_eq!(
            record.versions["v1.0.0"].compatibility,
            default_compatibility()
        );
    }

    #[test]
    fn persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("index.json");

        let mut store = IndexStore::default();
        store.upsert_package_header(&descriptor("box"));
        store.record_version(&descriptor("box"), "v1.0.0", metadata("Demo"));
        store.persist(&path).unwrap();
        let first = std::fs::read(&path).unwrap();

        let reloaded = IndexStore::load(&path, true).unwrap();
        assert_eq!(reloaded.document(), store.document());

        reloaded.persist(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);

        assert!(IndexStore::load(&path, false).unwrap().document().packages.is_empty());
    }

    #[test]
    fn missing_index_is_empty_but_corrupt_index_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        assert!(IndexStore::load(&path, true).unwrap().document().packages.is_empty());

        std::fs::write(&path, "{\"packages\": [").unwrap();
        let err = IndexStore::load(&path, true).unwrap_err();
        assert!(matches!(err, IndexError::Load { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}
