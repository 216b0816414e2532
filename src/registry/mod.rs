//! Color registries.
//!
//! This module provides:
//! - A `ColorRegistry` trait for read access to ordered color lists
//! - `ColorManager`, an ordered id-keyed palette with change notifications
//! - `ColorUsageTracker`, a palette that also accounts for which elements use
//!   each color and how heavily
//! - `MetaColorManager`, the set of loaded palettes plus the document-local
//!   swatches
//!
//! Expected failures (duplicate ids, missing ids, colors still in use) are
//! returned as errors and never leave a registry half-modified.

mod manager;
mod meta;
mod traits;
mod usage;

use thiserror::Error;

use crate::color::ColorError;
use crate::stitch::ElementId;

pub use manager::{ColorEvent, ColorManager, ColorRecord, Observer, ObserverId};
pub use meta::{MetaColorManager, LOCAL_SWATCHES_ID};
pub use traits::ColorRegistry;
pub use usage::{BackRefMap, ColorUsage, ColorUsageTracker};

/// Error from a color list mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// A color or palette with this id is already registered
    #[error("'{0}' is already registered")]
    DuplicateKey(String),
    /// No color or palette with this id is registered
    #[error("'{0}' not found")]
    NotFound(String),
    /// The color still has acquired elements
    #[error("color '{id}' is still used by {users} element(s)")]
    InUse { id: String, users: usize },
}

/// Error while loading palette data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// Top-level value was not a list
    #[error("palette data must be a list of color records")]
    NotAList,
    /// An entry is missing fields or has the wrong shape
    #[error("record {index}: {message}")]
    InvalidRecord { index: usize, message: String },
    /// An entry has an unparseable color value
    #[error("color '{id}': {source}")]
    Color {
        id: String,
        #[source]
        source: ColorError,
    },
    /// No built-in catalog has this id
    #[error("unknown built-in palette '{0}'")]
    UnknownCatalog(String),
}

/// Error from usage tracking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum UsageError {
    /// The element is still registered under another color
    #[error("element {element} is still acquired under color '{current}'")]
    AlreadyAcquired { element: ElementId, current: String },
    /// A different color is registered under the same id
    #[error("a different color is already registered as '{0}'")]
    IdConflict(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
