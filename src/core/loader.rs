//! Manifest loading stage: turns one discovered folder into a `ModMetadata`.

use std::path::Path;

use crate::core::compat::{CompatibilityDatabase, CompatibilityRecord};
use crate::core::manifest::Manifest;
use crate::core::metadata::ModMetadata;

/// Load the manifest from a mod folder and build its pipeline record.
///
/// This never fails past its boundary: a missing, invalid, or unparseable
/// manifest produces a `Failed` record carrying the reason.
pub fn load_mod(root: &Path, dir: &Path, db: &CompatibilityDatabase) -> ModMetadata {
    let manifest_result = Manifest::from_folder(dir);

    let record = manifest_result
        .as_ref()
        .ok()
        .and_then(|manifest| db.record(&manifest.unique_id))
        .cloned();

    let display_name = derive_display_name(root, dir, manifest_result.as_ref().ok(), record.as_ref());

    match manifest_result {
        Ok(mut manifest) => {
            // The database key replaces the manifest's own update keys, so
            // update checks for legacy mods can be rerouted retroactively.
            if let Some(key) = record.as_ref().and_then(|r| r.update_key.clone()) {
                manifest.update_keys = vec![key];
            }
            tracing::debug!("Loaded manifest for '{display_name}' from {}", dir.display());
            ModMetadata::new(display_name, dir, Some(manifest), record)
        }
        Err(err) => {
            tracing::debug!("Mod folder {} failed to load: {err}", dir.display());
            let mut meta = ModMetadata::new(display_name, dir, None, record);
            meta.fail(err.to_string());
            meta
        }
    }
}

/// First non-blank of: manifest name, curated display name, path relative to
/// the mods root.
fn derive_display_name(
    root: &Path,
    dir: &Path,
    manifest: Option<&Manifest>,
    record: Option<&CompatibilityRecord>,
) -> String {
    if let Some(name) = manifest.map(|m| m.name.trim()).filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    if let Some(name) = record
        .and_then(|r| r.display_name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        return name.to_string();
    }
    dir.strip_prefix(root)
        .unwrap_or(dir)
        .display()
        .to_string()
}
