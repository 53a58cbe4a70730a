use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use modloom::{
    resolve_load_order, CompatStatus, CompatibilityDatabase, CompatibilityRecord, ModId,
    ModStatus, SemanticVersion,
};

/// Test context owning a temporary mods directory.
struct TestContext {
    _temp_dir: TempDir,
    mods_dir: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let mods_dir = temp_dir.path().join("Mods");
        fs::create_dir_all(&mods_dir).expect("failed to create mods dir");
        Self {
            _temp_dir: temp_dir,
            mods_dir,
        }
    }

    /// Create a mod folder with a manifest and (if named) its entry assembly.
    fn add_mod(&self, folder: &str, manifest_json: &str) {
        let dir = self.mods_dir.join(folder);
        fs::create_dir_all(&dir).expect("failed to create mod dir");
        fs::write(dir.join("manifest.json"), manifest_json).expect("failed to write manifest");
        if let Some(entry) = manifest_json
            .split("\"EntryDll\"")
            .nth(1)
            .and_then(|rest| rest.split('"').nth(1))
        {
            fs::write(dir.join(entry), b"").expect("failed to write entry dll");
        }
    }

    fn resolve(&self, db: &CompatibilityDatabase) -> Vec<modloom::ModMetadata> {
        let api_version = SemanticVersion::new(4, 0, 0);
        resolve_load_order(&self.mods_dir, db, &api_version, test_update_url)
            .expect("pipeline should succeed")
    }
}

fn test_update_url(key: &str) -> Option<String> {
    let (vendor, id) = key.split_once(':')?;
    match vendor.to_lowercase().as_str() {
        "nexus" => Some(format!("https://nexus.example/{id}")),
        _ => None,
    }
}

fn names(mods: &[modloom::ModMetadata]) -> Vec<&str> {
    mods.iter().map(|m| m.display_name()).collect()
}

fn simple_manifest(name: &str, id: &str, extra: &str) -> String {
    format!(
        r#"{{ "Name": "{name}", "Version": "1.0", "UniqueID": "{id}", "EntryDll": "{name}.dll"{extra} }}"#
    )
}

#[test]
fn test_simple_chain_resolves_in_dependency_order() {
    let ctx = TestContext::new();
    ctx.add_mod("AMod", &simple_manifest("A", "example.a", ""));
    ctx.add_mod(
        "BMod",
        &simple_manifest(
            "B",
            "example.b",
            r#", "Dependencies": [ { "UniqueID": "example.a", "MinimumVersion": "1.0" } ]"#,
        ),
    );
    ctx.add_mod(
        "CMod",
        &simple_manifest(
            "C",
            "example.c",
            r#", "Dependencies": [ { "UniqueID": "example.b", "MinimumVersion": "1.0" } ]"#,
        ),
    );

    let mods = ctx.resolve(&CompatibilityDatabase::empty());
    assert_eq!(names(&mods), vec!["A", "B", "C"]);
    assert!(mods.iter().all(|m| m.is_found()));
}

#[test]
fn test_wrapped_mod_folder_is_unwrapped() {
    let ctx = TestContext::new();
    let inner = ctx.mods_dir.join("Zipped").join("ActualMod");
    fs::create_dir_all(&inner).unwrap();
    fs::write(
        inner.join("manifest.json"),
        simple_manifest("Wrapped", "example.wrapped", ""),
    )
    .unwrap();
    fs::write(inner.join("Wrapped.dll"), b"").unwrap();

    let mods = ctx.resolve(&CompatibilityDatabase::empty());
    assert_eq!(names(&mods), vec!["Wrapped"]);
    assert!(mods[0].is_found());
    assert!(mods[0].directory_path().ends_with("ActualMod"));
}

#[test]
fn test_folder_without_manifest_is_reported_not_dropped() {
    let ctx = TestContext::new();
    ctx.add_mod("Good", &simple_manifest("Good", "example.good", ""));
    fs::create_dir_all(ctx.mods_dir.join("Junk")).unwrap();

    let mods = ctx.resolve(&CompatibilityDatabase::empty());
    assert_eq!(mods.len(), 2);

    let junk = mods.iter().find(|m| m.display_name() == "Junk").unwrap();
    assert_eq!(junk.status(), ModStatus::Failed);
    assert_eq!(junk.error(), Some("it doesn't have a manifest."));

    // failed mods come after the load order
    assert_eq!(names(&mods), vec!["Good", "Junk"]);
}

#[test]
fn test_missing_dependency_uses_database_display_name_and_url() {
    let ctx = TestContext::new();
    ctx.add_mod(
        "AMod",
        &simple_manifest(
            "A",
            "example.a",
            r#", "Dependencies": [ { "UniqueID": "example.x" } ]"#,
        ),
    );

    let mut record = CompatibilityRecord::ok("example.x");
    record.display_name = Some("Example Mod".to_string());
    record.update_key = Some("Nexus:42".to_string());
    let db = CompatibilityDatabase::new([record], test_update_url);

    let mods = ctx.resolve(&db);
    assert_eq!(
        mods[0].error(),
        Some("it requires mods which aren't installed (Example Mod: https://nexus.example/42)")
    );
}

#[test]
fn test_assume_broken_mod_gets_update_guidance() {
    let ctx = TestContext::new();
    ctx.add_mod(
        "Broken",
        r#"{ "Name": "Broken", "Version": "1.5", "UniqueID": "example.broken",
             "EntryDll": "Broken.dll", "UpdateKeys": [ "Nexus:42" ] }"#,
    );

    let mut record = CompatibilityRecord::ok("example.broken");
    record.status = CompatStatus::AssumeBroken;
    record.reason = Some("crashes on load".to_string());
    record.upper_version = Some(SemanticVersion::new(2, 0, 0));
    record.alternative_url = Some("https://alt".to_string());
    let db = CompatibilityDatabase::new([record], test_update_url);

    let mods = ctx.resolve(&db);
    assert_eq!(
        mods[0].error(),
        Some(
            "crashes on load. Please check for a version newer than 2.0.0 at \
             https://nexus.example/42 or https://alt or https://smapi.io/compat"
        )
    );
}

#[test]
fn test_duplicate_unique_ids_fail_both_mods() {
    let ctx = TestContext::new();
    ctx.add_mod("First", &simple_manifest("First", "com.example.foo", ""));
    ctx.add_mod("Second", &simple_manifest("Second", "Com.Example.FOO", ""));

    let mods = ctx.resolve(&CompatibilityDatabase::empty());
    assert_eq!(mods.len(), 2);
    for meta in &mods {
        assert_eq!(meta.status(), ModStatus::Failed);
        let error = meta.error().unwrap();
        assert!(error.contains("is used by multiple mods (First, Second)"), "{error}");
    }
}

#[test]
fn test_content_pack_loads_after_parent() {
    let ctx = TestContext::new();
    ctx.add_mod("Parent", &simple_manifest("Parent", "example.parent", ""));
    let pack_dir = ctx.mods_dir.join("Pack");
    fs::create_dir_all(&pack_dir).unwrap();
    fs::write(
        pack_dir.join("manifest.json"),
        r#"{ "Name": "Pack", "Version": "1.0", "UniqueID": "example.pack",
             "ContentPackFor": { "UniqueID": "Example.Parent" } }"#,
    )
    .unwrap();

    let mods = ctx.resolve(&CompatibilityDatabase::empty());
    assert_eq!(names(&mods), vec!["Parent", "Pack"]);
    assert!(mods.iter().all(|m| m.is_found()));
}

#[test]
fn test_cycle_reported_and_pipeline_terminates() {
    let ctx = TestContext::new();
    ctx.add_mod(
        "AMod",
        &simple_manifest(
            "A",
            "example.a",
            r#", "Dependencies": [ { "UniqueID": "example.b" } ]"#,
        ),
    );
    ctx.add_mod(
        "BMod",
        &simple_manifest(
            "B",
            "example.b",
            r#", "Dependencies": [ { "UniqueID": "example.a" } ]"#,
        ),
    );

    let mods = ctx.resolve(&CompatibilityDatabase::empty());
    assert_eq!(mods.len(), 2);
    for meta in &mods {
        assert_eq!(meta.status(), ModStatus::Failed);
        assert!(meta
            .error()
            .unwrap()
            .starts_with("its dependencies have a circular reference:"));
    }
}

#[test]
fn test_transitive_failure_through_broken_dependency() {
    let ctx = TestContext::new();
    // Broken has no entry dll on disk, so validation fails it
    let dir = ctx.mods_dir.join("Broken");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("manifest.json"),
        r#"{ "Name": "Broken", "Version": "1.0", "UniqueID": "example.broken", "EntryDll": "Gone.dll" }"#,
    )
    .unwrap();
    ctx.add_mod(
        "Dependent",
        &simple_manifest(
            "Dependent",
            "example.dependent",
            r#", "Dependencies": [ { "UniqueID": "example.broken" } ]"#,
        ),
    );

    let mods = ctx.resolve(&CompatibilityDatabase::empty());
    let broken = mods.iter().find(|m| m.display_name() == "Broken").unwrap();
    assert_eq!(broken.error(), Some("its EntryDll 'Gone.dll' doesn't exist."));

    let dependent = mods
        .iter()
        .find(|m| m.display_name() == "Dependent")
        .unwrap();
    assert_eq!(
        dependent.error(),
        Some("it needs the 'Broken' mod, which couldn't be loaded.")
    );
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let ctx = TestContext::new();
    ctx.add_mod("Zeta", &simple_manifest("Zeta", "example.zeta", ""));
    ctx.add_mod("Alpha", &simple_manifest("Alpha", "example.alpha", ""));
    ctx.add_mod(
        "Mid",
        &simple_manifest(
            "Mid",
            "example.mid",
            r#", "Dependencies": [ { "UniqueID": "example.zeta" } ]"#,
        ),
    );
    fs::create_dir_all(ctx.mods_dir.join("Empty")).unwrap();

    let db = CompatibilityDatabase::empty();
    let first = ctx.resolve(&db);
    let second = ctx.resolve(&db);

    assert_eq!(names(&first), names(&second));
    let errors = |mods: &[modloom::ModMetadata]| -> Vec<Option<String>> {
        mods.iter().map(|m| m.error().map(str::to_string)).collect()
    };
    assert_eq!(errors(&first), errors(&second));
}

#[test]
fn test_update_keys_rerouted_by_database_record() {
    let ctx = TestContext::new();
    ctx.add_mod(
        "Legacy",
        r#"{ "Name": "Legacy", "Version": "1.0", "UniqueID": "example.legacy",
             "EntryDll": "Legacy.dll", "UpdateKeys": [ "Nexus:1" ] }"#,
    );

    let mut record = CompatibilityRecord::ok("example.legacy");
    record.update_key = Some("Nexus:999".to_string());
    let db = CompatibilityDatabase::new([record], test_update_url);

    let mods = ctx.resolve(&db);
    assert_eq!(
        mods[0].manifest().unwrap().update_keys,
        vec!["Nexus:999".to_string()]
    );
    assert_eq!(
        mods[0].manifest().unwrap().unique_id,
        ModId::new("example.legacy")
    );
}
