//! Mod manifest documents.
//!
//! Each mod folder ships a `manifest.json` describing the mod: identity,
//! version, entry assembly or content-pack binding, and declared
//! dependencies. Field names are matched case-insensitively and unknown
//! fields are ignored, so the loader is tolerant of authoring quirks.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{ModId, SemanticVersion};

/// Manifest filename expected inside each mod folder.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Version string authors use as a placeholder; treated as absent.
const VERSION_SENTINEL: &str = "0.0";

/// Why a manifest could not be read. The display strings are the
/// user-facing failure reasons carried on the mod's metadata.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("it doesn't have a manifest.")]
    Missing,

    #[error("its manifest is invalid.")]
    Invalid,

    #[error("parsing its manifest failed: {0}")]
    Parse(String),
}

/// A dependency declared in a manifest's `Dependencies` list.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ManifestDependency {
    pub unique_id: ModId,
    pub minimum_version: Option<SemanticVersion>,
    pub is_required: bool,
}

/// The `ContentPackFor` block: marks the mod as a content pack bound to a
/// parent code mod. A missing or blank `UniqueID` is caught by validation,
/// not here.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContentPackFor {
    pub unique_id: Option<ModId>,
    pub minimum_version: Option<SemanticVersion>,
}

/// A parsed mod manifest.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Manifest {
    pub name: String,
    pub author: Option<String>,
    pub version: Option<SemanticVersion>,
    pub unique_id: ModId,
    pub minimum_api_version: Option<SemanticVersion>,
    pub entry_dll: Option<String>,
    pub content_pack_for: Option<ContentPackFor>,
    pub dependencies: Vec<ManifestDependency>,
    pub update_keys: Vec<String>,
}

impl Manifest {
    /// Read and parse the manifest from a mod folder.
    pub fn from_folder(dir: &Path) -> Result<Self, ManifestError> {
        let path = dir.join(MANIFEST_FILENAME);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ManifestError::Missing)
            }
            Err(err) => return Err(ManifestError::Parse(err.to_string())),
        };
        Self::parse(&text)
    }

    /// Parse a manifest document from JSON text.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let doc: Value =
            serde_json::from_str(text).map_err(|err| ManifestError::Parse(err.to_string()))?;
        let map = match doc {
            Value::Object(map) => map,
            _ => return Err(ManifestError::Invalid),
        };

        let version = match string_field(&map, "Version")? {
            Some(raw) if raw.trim() == VERSION_SENTINEL => None,
            Some(raw) => Some(parse_version(&raw, "Version")?),
            None => None,
        };

        Ok(Self {
            name: string_field(&map, "Name")?.unwrap_or_default(),
            author: string_field(&map, "Author")?,
            version,
            unique_id: ModId::new(string_field(&map, "UniqueID")?.as_deref().unwrap_or("")),
            minimum_api_version: version_field(&map, "MinimumApiVersion")?,
            entry_dll: string_field(&map, "EntryDll")?,
            content_pack_for: content_pack_field(&map)?,
            dependencies: dependency_entries(&map)?,
            update_keys: update_key_entries(&map)?,
        })
    }
}

/// Case-insensitive field lookup; JSON nulls count as absent.
fn field<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
        .filter(|value| !value.is_null())
}

fn string_field(map: &Map<String, Value>, name: &str) -> Result<Option<String>, ManifestError> {
    match field(map, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ManifestError::Parse(format!(
            "the {name} field must be a string"
        ))),
    }
}

fn bool_field(map: &Map<String, Value>, name: &str) -> Result<Option<bool>, ManifestError> {
    match field(map, name) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ManifestError::Parse(format!(
            "the {name} field must be true or false"
        ))),
    }
}

fn version_field(
    map: &Map<String, Value>,
    name: &str,
) -> Result<Option<SemanticVersion>, ManifestError> {
    match string_field(map, name)? {
        None => Ok(None),
        Some(raw) => Ok(Some(parse_version(&raw, name)?)),
    }
}

fn parse_version(raw: &str, name: &str) -> Result<SemanticVersion, ManifestError> {
    raw.parse()
        .map_err(|err| ManifestError::Parse(format!("invalid {name} '{raw}': {err}")))
}

fn content_pack_field(map: &Map<String, Value>) -> Result<Option<ContentPackFor>, ManifestError> {
    let Some(value) = field(map, "ContentPackFor") else {
        return Ok(None);
    };
    let Value::Object(entry) = value else {
        return Err(ManifestError::Parse(
            "the ContentPackFor field must be an object".to_string(),
        ));
    };
    Ok(Some(ContentPackFor {
        unique_id: string_field(entry, "UniqueID")?.map(|id| ModId::new(&id)),
        minimum_version: version_field(entry, "MinimumVersion")?,
    }))
}

fn dependency_entries(map: &Map<String, Value>) -> Result<Vec<ManifestDependency>, ManifestError> {
    let Some(value) = field(map, "Dependencies") else {
        return Ok(Vec::new());
    };
    let Value::Array(items) = value else {
        return Err(ManifestError::Parse(
            "the Dependencies field must be an array".to_string(),
        ));
    };
    items
        .iter()
        .map(|item| {
            let Value::Object(entry) = item else {
                return Err(ManifestError::Parse(
                    "each Dependencies entry must be an object".to_string(),
                ));
            };
            Ok(ManifestDependency {
                unique_id: ModId::new(string_field(entry, "UniqueID")?.as_deref().unwrap_or("")),
                minimum_version: version_field(entry, "MinimumVersion")?,
                is_required: bool_field(entry, "IsRequired")?.unwrap_or(true),
            })
        })
        .collect()
}

fn update_key_entries(map: &Map<String, Value>) -> Result<Vec<String>, ManifestError> {
    let Some(value) = field(map, "UpdateKeys") else {
        return Ok(Vec::new());
    };
    let Value::Array(items) = value else {
        return Err(ManifestError::Parse(
            "the UpdateKeys field must be an array".to_string(),
        ));
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(key) => Ok(key.clone()),
            _ => Err(ManifestError::Parse(
                "each UpdateKeys entry must be a string".to_string(),
            )),
        })
        .collect()
}
