//! Dependency resolution: orders mods so every mod loads after the mods it
//! depends on.
//!
//! The resolver builds a directed graph over the loaded mods (manifest
//! dependencies plus the implicit edge from a content pack to its parent)
//! and runs a depth-first topological sort with cycle detection. Mods that
//! already failed pass through untouched and land at the end of the output;
//! a mod whose required dependency fails is itself failed transitively.

use std::collections::HashMap;

use crate::core::compat::CompatibilityDatabase;
use crate::core::metadata::ModMetadata;
use crate::types::{ModId, SemanticVersion};

/// Sort state per mod, kept apart from the metadata so the record itself is
/// only ever touched through its failure transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortState {
    Queued,
    Checking,
    Sorted,
    Failed,
}

/// Outcome of visiting a mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Sorted,
    Failed,
    /// The mod is already being checked further up the call stack, which
    /// means the caller just closed a dependency cycle.
    Cycle,
}

/// A dependency edge, resolved to an index into the mod list up front so
/// recursion never searches by ID.
struct Edge {
    id: ModId,
    minimum_version: Option<SemanticVersion>,
    is_required: bool,
    target: Option<usize>,
}

/// Sort the mods into load order.
///
/// The returned sequence contains every input mod exactly once: `Found` mods
/// in dependency order (dependencies first), then the failed ones. The
/// database supplies display names and mod page URLs for dependencies that
/// aren't installed.
pub fn process_dependencies(
    mods: Vec<ModMetadata>,
    db: &CompatibilityDatabase,
) -> Vec<ModMetadata> {
    let mut mods = mods;
    let count = mods.len();
    let mut sorter = Sorter {
        edges: resolve_edges(&mods),
        states: vec![SortState::Queued; count],
        order: Vec::with_capacity(count),
        cycle_labels: HashMap::new(),
        mods: &mut mods,
        db,
    };

    // Mods that failed loading or validation never enter the sort; they are
    // emitted after every sorted mod.
    let mut prefailed = Vec::new();
    for index in 0..count {
        if !sorter.mods[index].is_found() {
            sorter.states[index] = SortState::Failed;
            prefailed.push(index);
        }
    }

    for index in 0..count {
        let mut chain = Vec::new();
        sorter.visit(index, &mut chain);
    }

    let mut order = sorter.order;
    order.extend(prefailed);

    let mut slots: Vec<Option<ModMetadata>> = mods.into_iter().map(Some).collect();
    order
        .into_iter()
        .map(|index| slots[index].take().expect("each mod is emitted exactly once"))
        .collect()
}

/// Resolve every mod's dependency edges to indices, case-insensitively.
fn resolve_edges(mods: &[ModMetadata]) -> Vec<Vec<Edge>> {
    let mut by_id: HashMap<ModId, usize> = HashMap::new();
    for (index, meta) in mods.iter().enumerate() {
        if let Some(manifest) = meta.manifest() {
            if !manifest.unique_id.is_blank() {
                by_id.entry(manifest.unique_id.clone()).or_insert(index);
            }
        }
    }

    mods.iter()
        .map(|meta| {
            let Some(manifest) = meta.manifest() else {
                return Vec::new();
            };
            let mut edges: Vec<Edge> = manifest
                .dependencies
                .iter()
                .map(|dependency| Edge {
                    id: dependency.unique_id.clone(),
                    minimum_version: dependency.minimum_version.clone(),
                    is_required: dependency.is_required,
                    target: by_id.get(&dependency.unique_id).copied(),
                })
                .collect();

            // A content pack implicitly requires its parent mod.
            if let Some(pack) = &manifest.content_pack_for {
                if let Some(parent) = &pack.unique_id {
                    edges.push(Edge {
                        id: parent.clone(),
                        minimum_version: pack.minimum_version.clone(),
                        is_required: true,
                        target: by_id.get(parent).copied(),
                    });
                }
            }
            edges
        })
        .collect()
}

struct Sorter<'a> {
    mods: &'a mut Vec<ModMetadata>,
    edges: Vec<Vec<Edge>>,
    states: Vec<SortState>,
    /// Mods in the order they finished, dependencies before dependents.
    order: Vec<usize>,
    /// Chain label per mod known to sit on a dependency cycle.
    cycle_labels: HashMap<usize, String>,
    db: &'a CompatibilityDatabase,
}

impl Sorter<'_> {
    /// Depth-first visit. `chain` holds the indices currently being checked,
    /// outermost first; observing `Checking` on entry is the cycle signal.
    fn visit(&mut self, index: usize, chain: &mut Vec<usize>) -> Visit {
        match self.states[index] {
            SortState::Sorted => return Visit::Sorted,
            SortState::Failed => return Visit::Failed,
            SortState::Checking => return Visit::Cycle,
            SortState::Queued => {}
        }

        self.states[index] = SortState::Checking;
        chain.push(index);
        let outcome = self.visit_dependencies(index, chain);
        chain.pop();
        outcome
    }

    fn visit_dependencies(&mut self, index: usize, chain: &mut Vec<usize>) -> Visit {
        if self.edges[index].is_empty() {
            self.finish(index);
            return Visit::Sorted;
        }

        // required dependencies that aren't installed at all
        let mut missing: Vec<(String, String)> = Vec::new();
        for edge in &self.edges[index] {
            if edge.is_required && edge.target.is_none() {
                let name = self
                    .db
                    .display_name(&edge.id)
                    .map(str::to_string)
                    .unwrap_or_else(|| edge.id.to_string());
                let label = match self.db.mod_page_url(&edge.id) {
                    Some(url) => format!("{name}: {url}"),
                    None => name.clone(),
                };
                missing.push((name, label));
            }
        }
        if !missing.is_empty() {
            missing.sort();
            let labels = missing
                .into_iter()
                .map(|(_, label)| label)
                .collect::<Vec<_>>()
                .join(", ");
            self.fail(
                index,
                format!("it requires mods which aren't installed ({labels})"),
            );
            return Visit::Failed;
        }

        // installed dependencies that are older than the declared minimum
        let mut shortfalls = Vec::new();
        for edge in &self.edges[index] {
            let (Some(target), Some(minimum)) = (edge.target, &edge.minimum_version) else {
                continue;
            };
            let target_version = self.mods[target].manifest().and_then(|m| m.version.clone());
            let too_old = match &target_version {
                Some(version) => minimum.is_newer_than(version),
                None => true,
            };
            if too_old {
                shortfalls.push(format!(
                    "{} (needs {minimum} or later)",
                    self.mods[target].display_name()
                ));
            }
        }
        if !shortfalls.is_empty() {
            self.fail(
                index,
                format!(
                    "it needs newer versions of some mods: {}",
                    shortfalls.join(", ")
                ),
            );
            return Visit::Failed;
        }

        // recurse into each installed dependency; optional dependencies that
        // aren't installed were simply skipped above
        for position in 0..self.edges[index].len() {
            let Some(target) = self.edges[index][position].target else {
                continue;
            };
            match self.visit(target, chain) {
                Visit::Sorted => {}
                Visit::Cycle => {
                    let start = chain
                        .iter()
                        .position(|&member| member == target)
                        .unwrap_or(0);
                    let label = self.cycle_label(&chain[start..], target);
                    for &member in &chain[start..] {
                        self.cycle_labels.insert(member, label.clone());
                    }
                    self.fail(
                        index,
                        format!("its dependencies have a circular reference: {label}"),
                    );
                    return Visit::Failed;
                }
                Visit::Failed => {
                    let error = match self.cycle_labels.get(&index) {
                        Some(label) => {
                            format!("its dependencies have a circular reference: {label}")
                        }
                        None => format!(
                            "it needs the '{}' mod, which couldn't be loaded.",
                            self.mods[target].display_name()
                        ),
                    };
                    self.fail(index, error);
                    return Visit::Failed;
                }
            }
        }

        self.finish(index);
        Visit::Sorted
    }

    /// `A => B => A` style label for the cycle members plus the closing mod.
    fn cycle_label(&self, members: &[usize], target: usize) -> String {
        let mut names: Vec<&str> = members
            .iter()
            .map(|&member| self.mods[member].display_name())
            .collect();
        names.push(self.mods[target].display_name());
        names.join(" => ")
    }

    fn finish(&mut self, index: usize) {
        self.states[index] = SortState::Sorted;
        self.order.push(index);
    }

    fn fail(&mut self, index: usize, error: String) {
        self.mods[index].fail(error);
        self.states[index] = SortState::Failed;
        self.order.push(index);
    }
}
