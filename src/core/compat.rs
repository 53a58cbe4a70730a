//! Compatibility database: a static, case-insensitive lookup from mod ID to
//! a curated compatibility record.
//!
//! The database is built by the host (typically from a bundled JSON document)
//! and borrowed read-only by the pipeline. The update-key → URL mapping is
//! injected at construction; no vendor is hard-coded here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{ModId, SemanticVersion};

/// Curated compatibility status for a known mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompatStatus {
    /// No known issues.
    #[default]
    Ok,
    /// The mod is no longer needed and should be removed.
    Obsolete,
    /// The mod is assumed broken with the current framework.
    AssumeBroken,
}

/// A curated record for a known mod.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityRecord {
    /// The mod's unique ID.
    pub id: ModId,

    #[serde(default)]
    pub status: CompatStatus,

    /// Human-readable reason phrase for a non-Ok status.
    #[serde(default)]
    pub reason: Option<String>,

    /// Versions up to and including this one are covered by `status`.
    #[serde(default)]
    pub upper_version: Option<SemanticVersion>,

    /// Non-standard URL where an update may be found.
    #[serde(default)]
    pub alternative_url: Option<String>,

    /// Display name override for mods with unhelpful manifest names.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Update key which overrides the manifest's own, used to route update
    /// checks for legacy mods.
    #[serde(default)]
    pub update_key: Option<String>,
}

/// Resolves a `vendor:id` update key to a mod page URL. Host-provided.
pub type UpdateUrlFn = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Read-only lookup over the curated records.
pub struct CompatibilityDatabase {
    records: HashMap<ModId, CompatibilityRecord>,
    update_url: Box<UpdateUrlFn>,
}

impl CompatibilityDatabase {
    /// Build a database from records and the host's update-key resolver.
    pub fn new(
        records: impl IntoIterator<Item = CompatibilityRecord>,
        update_url: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
            update_url: Box::new(update_url),
        }
    }

    /// A database with no records; every lookup returns `None`.
    pub fn empty() -> Self {
        Self::new([], |_| None)
    }

    /// Get the record for a mod ID, if any.
    pub fn record(&self, id: &ModId) -> Option<&CompatibilityRecord> {
        self.records.get(id)
    }

    /// Get the curated display name for a mod ID, if any.
    pub fn display_name(&self, id: &ModId) -> Option<&str> {
        self.record(id)?.display_name.as_deref()
    }

    /// Get the canonical mod page URL for a mod ID, if the record carries an
    /// update key the host can resolve.
    pub fn mod_page_url(&self, id: &ModId) -> Option<String> {
        let key = self.record(id)?.update_key.as_deref()?;
        (self.update_url)(key)
    }
}

impl CompatibilityRecord {
    /// A minimal Ok record for the given ID.
    pub fn ok(id: &str) -> Self {
        Self {
            id: ModId::new(id),
            status: CompatStatus::Ok,
            reason: None,
            upper_version: None,
            alternative_url: None,
            display_name: None,
            update_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_db() -> CompatibilityDatabase {
        let mut record = CompatibilityRecord::ok("Example.Mod");
        record.display_name = Some("Example Mod".to_string());
        record.update_key = Some("Nexus:42".to_string());
        CompatibilityDatabase::new([record], |key| {
            key.strip_prefix("Nexus:")
                .map(|id| format!("https://mods.example/nexus/{id}"))
        })
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let db = sample_db();
        assert!(db.record(&ModId::new("EXAMPLE.mod")).is_some());
        assert!(db.record(&ModId::new("other.mod")).is_none());
    }

    #[test]
    fn test_display_name_lookup() {
        let db = sample_db();
        assert_eq!(
            db.display_name(&ModId::new("example.mod")),
            Some("Example Mod")
        );
    }

    #[test]
    fn test_mod_page_url_goes_through_injected_resolver() {
        let db = sample_db();
        assert_eq!(
            db.mod_page_url(&ModId::new("example.mod")),
            Some("https://mods.example/nexus/42".to_string())
        );
        assert_eq!(db.mod_page_url(&ModId::new("other.mod")), None);
    }

    #[test]
    fn test_records_deserialize_from_json() {
        let records: Vec<CompatibilityRecord> = serde_json::from_str(
            r#"[ { "id": "Example.Broken", "status": "assume-broken", "reason": "crashes on load",
                  "upper_version": "2.0.0", "alternative_url": "https://alt.example" } ]"#,
        )
        .expect("records should deserialize");
        assert_eq!(records[0].status, CompatStatus::AssumeBroken);
        assert_eq!(
            records[0].upper_version,
            Some(SemanticVersion::new(2, 0, 0))
        );
    }
}
