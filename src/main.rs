//! modloom CLI - resolve a mods directory into a load order

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use modloom::{
    resolve_load_order, CompatibilityDatabase, CompatibilityRecord, Manifest, ModStatus,
    SemanticVersion,
};

#[derive(Parser)]
#[command(name = "modloom")]
#[command(author, version, about = "modloom - mod discovery and load-order resolution")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a mods directory and print the load order
    Scan {
        /// Root directory containing one folder per mod
        mods_dir: PathBuf,
        /// Compatibility database (JSON array of records)
        #[arg(long)]
        compat: Option<PathBuf>,
        /// Framework version to validate against (defaults to this build)
        #[arg(long)]
        api_version: Option<String>,
    },
    /// Inspect a single mod folder's manifest
    Check {
        /// The mod folder
        mod_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan {
            mods_dir,
            compat,
            api_version,
        } => scan(&mods_dir, compat.as_deref(), api_version.as_deref()),
        Commands::Check { mod_dir } => check(&mod_dir),
    }
}

fn scan(mods_dir: &Path, compat: Option<&Path>, api_version: Option<&str>) -> Result<()> {
    let api_version: SemanticVersion = api_version
        .unwrap_or(env!("CARGO_PKG_VERSION"))
        .parse()
        .context("Invalid --api-version")?;

    let records = match compat {
        Some(path) => load_compat_records(path)?,
        None => Vec::new(),
    };
    let db = CompatibilityDatabase::new(records, update_url);

    let mods = resolve_load_order(mods_dir, &db, &api_version, update_url)?;
    if mods.is_empty() {
        println!("No mods found in {}.", mods_dir.display());
        return Ok(());
    }

    let loaded: Vec<_> = mods.iter().filter(|m| m.is_found()).collect();
    println!("📦 Load order ({} mods):", loaded.len());
    for (position, meta) in loaded.iter().enumerate() {
        let version = meta
            .manifest()
            .and_then(|m| m.version.as_ref())
            .map(|v| format!(" {v}"))
            .unwrap_or_default();
        println!("  {}. {}{version}", position + 1, meta.display_name());
    }

    let skipped: Vec<_> = mods.iter().filter(|m| m.status() == ModStatus::Failed).collect();
    if !skipped.is_empty() {
        println!("\nSkipped mods:");
        for meta in skipped {
            println!(
                "  - {} because {}",
                meta.display_name(),
                meta.error().unwrap_or("of an unknown error.")
            );
        }
    }

    Ok(())
}

fn check(mod_dir: &Path) -> Result<()> {
    match Manifest::from_folder(mod_dir) {
        Ok(manifest) => {
            println!("{} ({})", manifest.name, manifest.unique_id);
            if let Some(version) = &manifest.version {
                println!("  version: {version}");
            }
            if let Some(author) = &manifest.author {
                println!("  author: {author}");
            }
            if let Some(entry) = &manifest.entry_dll {
                println!("  entry: {entry}");
            }
            if let Some(pack) = &manifest.content_pack_for {
                if let Some(parent) = &pack.unique_id {
                    println!("  content pack for: {parent}");
                }
            }
            for dependency in &manifest.dependencies {
                let kind = if dependency.is_required { "requires" } else { "optional" };
                println!("  {kind}: {}", dependency.unique_id);
            }
            Ok(())
        }
        Err(err) => {
            println!("{}: {err}", mod_dir.display());
            Ok(())
        }
    }
}

fn load_compat_records(path: &Path) -> Result<Vec<CompatibilityRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read compatibility database {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse compatibility database {}", path.display()))
}

/// Map a `vendor:id` update key to the vendor's mod page. Unknown vendors
/// yield nothing.
fn update_url(key: &str) -> Option<String> {
    let (vendor, id) = key.split_once(':')?;
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    match vendor.trim().to_lowercase().as_str() {
        "chucklefish" => Some(format!("https://community.playstarbound.com/resources/{id}")),
        "github" => Some(format!("https://github.com/{id}/releases")),
        "nexus" => Some(format!("https://www.nexusmods.com/mods/{id}")),
        _ => None,
    }
}
