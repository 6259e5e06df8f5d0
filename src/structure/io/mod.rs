//! Minimal reader for the ATOM records of PDB files
pub mod parser;
pub mod pdb;

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFileFormat {
    PDB,
    PDBGz,
}

impl StructureFileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => StructureFileFormat::PDBGz,
            _ => StructureFileFormat::PDB,
        }
    }
}

pub use pdb::{read_pdb_str, Reader};

/// Read a `.pdb` or `.pdb.gz` file into a structure
pub fn read_structure<P: AsRef<Path>>(
    path: P, sink: &dyn crate::utils::log::LogSink,
) -> crate::error::Result<crate::structure::core::Structure> {
    Reader::from_file(path)?.read_structure(sink)
}
