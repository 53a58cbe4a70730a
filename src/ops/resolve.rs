//! The full resolution pipeline: discover folders, load manifests, validate,
//! and sort into load order.

use std::path::Path;

use anyhow::Result;

use crate::core::compat::CompatibilityDatabase;
use crate::core::discovery::discover_mod_folders;
use crate::core::loader::load_mod;
use crate::core::metadata::ModMetadata;
use crate::core::resolver::process_dependencies;
use crate::core::validator::validate_manifests;
use crate::types::SemanticVersion;

/// Run the mod-loading pipeline over a mods directory.
///
/// Every discovered folder produces exactly one record in the returned load
/// order, either ready to load or failed with a human-readable reason. Only
/// a missing or unreadable root directory is an error.
pub fn resolve_load_order(
    root: &Path,
    db: &CompatibilityDatabase,
    api_version: &SemanticVersion,
    update_url_for: impl Fn(&str) -> Option<String>,
) -> Result<Vec<ModMetadata>> {
    let folders = discover_mod_folders(root)?;
    tracing::debug!("Discovered {} candidate mod folders", folders.len());

    let mut mods: Vec<ModMetadata> = folders
        .iter()
        .map(|folder| load_mod(root, folder, db))
        .collect();

    validate_manifests(&mut mods, api_version, update_url_for);
    let failed = mods.iter().filter(|m| !m.is_found()).count();
    tracing::debug!("Validated {} mods ({failed} failed)", mods.len());

    Ok(process_dependencies(mods, db))
}
