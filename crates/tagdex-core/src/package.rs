//! Package descriptors and the packages file.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Stable key naming a package in the index, independent of where it is hosted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    /// Create new package ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PackageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PackageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Registered git hosting providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitProvider {
    /// github.com.
    GitHub,
    /// bitbucket.org.
    Bitbucket,
}

impl GitProvider {
    /// Canonical host name.
    #[must_use]
    pub const fn host(&self) -> &'static str {
        match self {
            Self::GitHub => "github.com",
            Self::Bitbucket => "bitbucket.org",
        }
    }
}

impl fmt::Display for GitProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitHub => write!(f, "GitHub"),
            Self::Bitbucket => write!(f, "Bitbucket"),
        }
    }
}

/// Returned when a provider name is not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl FromStr for GitProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" | "github.com" => Ok(Self::GitHub),
            "bitbucket" | "bitbucket.org" | "bitbucket.com" => Ok(Self::Bitbucket),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// One package to index, as listed in the packages file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Package id.
    pub id: PackageId,
    /// Resolved hosting provider.
    pub provider: GitProvider,
    /// Provider name exactly as written in the packages file.
    pub provider_name: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repository: String,
    /// Icon reference.
    pub icon: String,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    id: String,
    git_provider: String,
    git_owner: String,
    git_repository: String,
    #[serde(default)]
    icon: String,
}

impl TryFrom<RawDescriptor> for PackageDescriptor {
    type Error = Error;

    fn try_from(raw: RawDescriptor) -> Result<Self> {
        if raw.id.trim().is_empty() {
            return Err(Error::MalformedDescriptor {
                package: raw.id,
                message: "empty package id".to_string(),
            });
        }
        if raw.git_owner.trim().is_empty() || raw.git_repository.trim().is_empty() {
            return Err(Error::MalformedDescriptor {
                package: raw.id,
                message: "git_owner and git_repository must not be empty".to_string(),
            });
        }
        let provider = raw
            .git_provider
            .parse::<GitProvider>()
            .map_err(|UnknownProvider(provider)| Error::UnsupportedProvider {
                package: raw.id.clone(),
                provider,
            })?;

        Ok(Self {
            id: PackageId::new(raw.id),
            provider,
            provider_name: raw.git_provider,
            owner: raw.git_owner,
            repository: raw.git_repository,
            icon: raw.icon,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawPackagesFile {
    packages: Vec<RawDescriptor>,
}

/// The validated, ordered list of packages to index.
#[derive(Debug, Clone, Default)]
pub struct PackageList {
    packages: Vec<PackageDescriptor>,
}

impl PackageList {
    /// Read and validate a packages file (`{"packages": [...]}`).
    ///
    /// Every descriptor is checked up front, so a misconfigured entry stops
    /// the run before any network activity.
    ///
    /// # Errors
    /// Returns error if the file is unreadable, malformed, lists a package
    /// twice, or names an unsupported provider.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let list = Self::from_slice(&bytes).map_err(|e| match e {
            Error::Json(err) => Error::InvalidPackages {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
            other => other,
        })?;
        debug!(path = %path.display(), count = list.len(), "loaded packages file");
        Ok(list)
    }

    /// Parse and validate packages file content.
    ///
    /// # Errors
    /// See [`PackageList::load`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: RawPackagesFile = crate::json::from_json_slice(bytes)?;
        let mut seen = HashSet::with_capacity(raw.packages.len());
        let mut packages = Vec::with_capacity(raw.packages.len());

        for entry in raw.packages {
            let descriptor = PackageDescriptor::try_from(entry)?;
            if !seen.insert(descriptor.id.clone()) {
                return Err(Error::DuplicatePackage(descriptor.id.to_string()));
            }
            packages.push(descriptor);
        }

        Ok(Self { packages })
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, PackageDescriptor> {
        self.packages.iter()
    }
}

impl<'a> IntoIterator for &'a PackageList {
    type Item = &'a PackageDescriptor;
    type IntoIter = std::slice::Iter<'a, PackageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
