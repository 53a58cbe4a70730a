//! Manifest validation: every check that doesn't need the dependency graph.
//!
//! Checks run per record in a fixed order and stop at the first failure, so
//! each failed mod reports its most fundamental problem. Records that
//! already failed earlier in the pipeline are left untouched.

use std::collections::HashMap;

use crate::core::compat::CompatStatus;
use crate::core::metadata::ModMetadata;
use crate::types::SemanticVersion;

/// Update URL appended as the last-resort suggestion for broken mods.
pub const FALLBACK_UPDATE_URL: &str = "https://smapi.io/compat";

/// Characters not allowed in an entry assembly filename. Superset of the
/// Windows-invalid set so manifests stay portable.
const INVALID_FILENAME_CHARS: &[char] = &['"', '<', '>', '|', ':', '*', '?', '\\', '/'];

/// Apply all non-topological checks to the loaded mods.
///
/// `update_url_for` maps a `vendor:id` update key to a mod page URL; it is
/// supplied by the host, not hard-coded here.
pub fn validate_manifests(
    mods: &mut [ModMetadata],
    api_version: &SemanticVersion,
    update_url_for: impl Fn(&str) -> Option<String>,
) {
    for meta in mods.iter_mut() {
        if !meta.is_found() {
            continue;
        }
        if let Some(error) = check_mod(meta, api_version, &update_url_for) {
            meta.fail(error);
        }
    }

    check_unique_ids(mods);
}

/// Run the per-record checks in order; returns the first failure.
fn check_mod(
    meta: &ModMetadata,
    api_version: &SemanticVersion,
    update_url_for: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let manifest = meta.manifest()?;

    // compatibility policy
    if let Some(record) = meta.data_record() {
        match record.status {
            CompatStatus::Ok => {}
            CompatStatus::Obsolete => {
                return Some(match &record.reason {
                    Some(reason) => format!("it's obsolete: {reason}"),
                    None => "it's obsolete.".to_string(),
                });
            }
            CompatStatus::AssumeBroken => {
                let mut urls: Vec<String> = manifest
                    .update_keys
                    .iter()
                    .filter_map(|key| update_url_for(key))
                    .collect();
                if let Some(alternative) = &record.alternative_url {
                    urls.push(alternative.clone());
                }
                urls.push(FALLBACK_UPDATE_URL.to_string());

                let reason = record.reason.as_deref().unwrap_or("it's outdated");
                let version_clause = match &record.upper_version {
                    Some(upper) if manifest.version.as_ref() != Some(upper) => {
                        format!("version newer than {upper}")
                    }
                    _ => "newer version".to_string(),
                };
                return Some(format!(
                    "{reason}. Please check for a {version_clause} at {}",
                    urls.join(" or ")
                ));
            }
        }
    }

    // minimum framework version
    if let Some(minimum) = &manifest.minimum_api_version {
        if minimum.is_newer_than(api_version) {
            return Some(format!(
                "it needs Modloom {minimum} or later. Please update Modloom to use this mod."
            ));
        }
    }

    // entry assembly vs content pack
    match (&manifest.entry_dll, &manifest.content_pack_for) {
        (None, None) => {
            return Some("its manifest has no EntryDll or ContentPackFor field.".to_string());
        }
        (Some(_), Some(_)) => {
            return Some(
                "its manifest sets both EntryDll and ContentPackFor, which are mutually exclusive."
                    .to_string(),
            );
        }
        (Some(entry), None) => {
            if entry.contains(INVALID_FILENAME_CHARS) || entry.chars().any(char::is_control) {
                return Some(format!(
                    "its manifest has invalid filename '{entry}' for the EntryDll field."
                ));
            }
            if !meta.directory_path().join(entry).is_file() {
                return Some(format!("its EntryDll '{entry}' doesn't exist."));
            }
        }
        (None, Some(pack)) => {
            if pack.unique_id.as_ref().is_none_or(|id| id.is_blank()) {
                return Some(
                    "its manifest declares ContentPackFor without the required UniqueID field."
                        .to_string(),
                );
            }
        }
    }

    // required fields
    let mut missing = Vec::new();
    if manifest.name.trim().is_empty() {
        missing.push("Name");
    }
    if manifest.version.is_none() {
        missing.push("Version");
    }
    if manifest.unique_id.is_blank() {
        missing.push("UniqueID");
    }
    if !missing.is_empty() {
        return Some(format!(
            "its manifest is missing required fields ({}).",
            missing.join(", ")
        ));
    }

    None
}

/// Fail every still-Found mod whose unique ID is shared with another mod.
/// Mods that already failed keep their earlier error but still count as
/// members of the group.
fn check_unique_ids(mods: &mut [ModMetadata]) {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, meta) in mods.iter().enumerate() {
        if let Some(manifest) = meta.manifest() {
            if !manifest.unique_id.is_blank() {
                groups
                    .entry(manifest.unique_id.folded())
                    .or_default()
                    .push(index);
            }
        }
    }

    for indices in groups.values().filter(|group| group.len() > 1) {
        let names = indices
            .iter()
            .map(|&index| mods[index].display_name().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        for &index in indices {
            if mods[index].is_found() {
                let id = mods[index].manifest().expect("grouped mods have manifests");
                let error = format!(
                    "its unique ID '{}' is used by multiple mods ({names})",
                    id.unique_id.as_str()
                );
                mods[index].fail(error);
            }
        }
    }
}
