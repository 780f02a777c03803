//! Versification Mapping Registry
//!
//! Indexes mapping tables by system pair and bridges pairs that have no
//! direct table through one intermediate system.
//!
//! Chain resolution is single-hop only: `A -> B -> C` is found, `A -> B -> C -> D`
//! is not. Every public mapping call succeeds; when nothing applies the input
//! reference comes back unchanged.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{IrError, Result};
use crate::mapping::{MappingTable, RefMapping, Resolution, ResolutionKind};
use crate::reference::Ref;
use crate::schema::{Corpus, LossReport};

/// Mapping tables keyed by `(from_system, to_system)`.
///
/// Keys are kept sorted so intermediate-system search visits tables in a
/// stable order. The pair is kept as a tuple because system names may
/// themselves contain `-`.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    tables: BTreeMap<(String, String), MappingTable>,
}

fn pair_key(from_system: &str, to_system: &str) -> (String, String) {
    (from_system.to_string(), to_system.to_string())
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table, replacing any table for the same system pair
    pub fn register_table(&mut self, table: MappingTable) {
        let key = pair_key(&table.from_system, &table.to_system);
        if let Some(previous) = self.tables.get(&key) {
            tracing::warn!(
                key = %table.key(),
                previous = %previous.id,
                replacement = %table.id,
                "replacing mapping table"
            );
        } else {
            tracing::debug!(key = %table.key(), table = %table.id, mappings = table.mappings.len(), "registered mapping table");
        }
        self.tables.insert(key, table);
    }

    /// Exact lookup by system pair
    pub fn get_table(&self, from_system: &str, to_system: &str) -> Option<&MappingTable> {
        self.tables.get(&pair_key(from_system, to_system))
    }

    /// Direct table if registered, otherwise a table composed through one
    /// intermediate system. `None` if neither exists.
    pub fn get_chained_mapping(&self, from_system: &str, to_system: &str) -> Option<Cow<'_, MappingTable>> {
        if let Some(direct) = self.get_table(from_system, to_system) {
            return Some(Cow::Borrowed(direct));
        }

        self.tables
            .values()
            .filter(|first| first.from_system == from_system)
            .find_map(|first| {
                self.get_table(&first.to_system, to_system)
                    .map(|second| Cow::Owned(build_chained_table(first, second)))
            })
    }

    /// Map a reference between systems: direct, then chained, then identity
    pub fn map_ref_between_systems(&self, reference: &Ref, from_system: &str, to_system: &str) -> Ref {
        self.resolve_between_systems(reference, from_system, to_system)
            .target
    }

    /// Like [`map_ref_between_systems`](Self::map_ref_between_systems), but
    /// reports whether the result came from a direct table, a chain, or the
    /// identity fallback
    pub fn resolve_between_systems(&self, reference: &Ref, from_system: &str, to_system: &str) -> Resolution {
        if let Some(direct) = self.get_table(from_system, to_system) {
            if let Some(mapping) = direct.lookup(reference) {
                return Resolution {
                    target: mapping.to.clone(),
                    kind: ResolutionKind::Exact,
                };
            }
            return Resolution::identity(reference);
        }

        match self.get_chained_mapping(from_system, to_system) {
            Some(chained) => match chained.lookup(reference) {
                Some(mapping) => Resolution {
                    target: mapping.to.clone(),
                    kind: ResolutionKind::Chained,
                },
                None => Resolution::identity(reference),
            },
            None => Resolution::identity(reference),
        }
    }

    /// Remap a corpus from its own versification into `to_system`.
    ///
    /// Fails only when no direct or chained table bridges the two systems.
    pub fn apply_to_corpus(&self, corpus: &Corpus, to_system: &str) -> Result<(Corpus, LossReport)> {
        let table = self
            .get_chained_mapping(&corpus.versification, to_system)
            .ok_or_else(|| IrError::TableNotFound {
                from: corpus.versification.clone(),
                to: to_system.to_string(),
            })?;
        Ok(table.apply_to_corpus(corpus))
    }

    /// Register every `*.json` mapping table found under `dir`.
    /// Returns the number of tables loaded.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let mut loaded = 0;

        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path.to_path_buf());
            }
        }
        // Later files win on duplicate pairs, so make "later" deterministic
        paths.sort();

        for path in paths {
            let content = fs::read_to_string(&path)?;
            let table: MappingTable = serde_json::from_str(&content)?;
            tracing::debug!(path = %path.display(), table = %table.id, "loaded mapping table");
            self.register_table(table);
            loaded += 1;
        }

        tracing::info!(dir = %dir.display(), tables = loaded, "loaded mapping tables");
        Ok(loaded)
    }

    /// All registered tables, in key order
    pub fn tables(&self) -> impl Iterator<Item = &MappingTable> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Compose `first` (A -> B) with `second` (B -> C) into an A -> C table.
///
/// Each entry of `first` has its target pushed through `second`, falling back
/// to the intermediate ref when `second` has no entry. The composed entry keeps
/// the mapping type of the first hop only.
fn build_chained_table(first: &MappingTable, second: &MappingTable) -> MappingTable {
    let mappings = first
        .mappings
        .iter()
        .map(|m| RefMapping::new(m.from.clone(), second.map_ref(&m.to), m.mapping_type.clone()))
        .collect();

    MappingTable {
        id: format!("{}+{}", first.id, second.id),
        name: format!("{} via {}", first.from_system, first.to_system),
        from_system: first.from_system.clone(),
        to_system: second.to_system.clone(),
        mappings,
    }
}
