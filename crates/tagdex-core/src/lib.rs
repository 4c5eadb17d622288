//! Core types and utilities for tagdex.
//!
//! Shared by every other crate in the workspace:
//!
//! - [`Error`] / [`Result`]: the base error type.
//! - [`json`]: sonic-rs backed (de)serialization helpers.
//! - [`version`]: release tag classification.
//! - [`package`]: package descriptors and the packages file.

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod json;
pub mod package;
pub mod version;

pub use error::{Error, Result};
pub use package::{GitProvider, PackageDescriptor, PackageId, PackageList};
pub use version::{VersionConstraint, is_valid_version};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
