//! modloom - mod discovery, validation, and load-order resolution
//!
//! The pipeline walks a mods directory, reads each folder's manifest,
//! classifies it against a curated compatibility database, validates it, and
//! computes a load order in which every mod appears after the mods it
//! depends on. Mods that fail at any stage stay in the output with a
//! human-readable reason; the host decides how to present them.

pub mod core;
pub mod ops;
pub mod types;

pub use crate::core::compat::{CompatStatus, CompatibilityDatabase, CompatibilityRecord};
pub use crate::core::manifest::{ContentPackFor, Manifest, ManifestDependency, ManifestError};
pub use crate::core::metadata::{ModMetadata, ModStatus};
pub use crate::ops::resolve_load_order;
pub use crate::types::{ModId, SemanticVersion};
