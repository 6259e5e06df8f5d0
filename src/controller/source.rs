// File: source.rs
// Where structures and manifests come from. Pipelines only see this trait,
// so tests can run on in-memory fixtures and no stage depends on the network.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::{LoopwarpError, Result};
use crate::structure::core::Structure;
use crate::structure::io::read_structure;
use crate::utils::loader::structure_file_names;
use crate::utils::log::LogSink;

pub trait StructureSource: Sync {
    /// Load a structure by its name relative to the source. Recoverable
    /// problems inside the structure are reported to `sink`.
    fn load(&self, name: &str, sink: &dyn LogSink) -> Result<Structure>;
    /// Structure names available at the top level of the source
    fn list(&self) -> Result<Vec<String>>;
}

/// Structure files on disk under a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    pub root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirectorySource { root: root.as_ref().to_path_buf() }
    }
}

impl StructureSource for DirectorySource {
    fn load(&self, name: &str, sink: &dyn LogSink) -> Result<Structure> {
        read_structure(self.root.join(name), sink)
    }

    fn list(&self) -> Result<Vec<String>> {
        structure_file_names(&self.root)
    }
}

/// Fixture-backed source keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    structures: FxHashMap<String, Structure>,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource::default()
    }

    pub fn insert(&mut self, name: &str, structure: Structure) {
        self.structures.insert(name.to_string(), structure);
    }

    pub fn with(mut self, name: &str, structure: Structure) -> Self {
        self.insert(name, structure);
        self
    }
}

impl StructureSource for MemorySource {
    fn load(&self, name: &str, _sink: &dyn LogSink) -> Result<Structure> {
        self.structures
            .get(name)
            .cloned()
            .ok_or_else(|| LoopwarpError::InvalidInput(format!("no structure named '{}'", name)))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.structures.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
