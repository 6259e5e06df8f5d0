use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::structure::atom::ResidueKey;
use crate::structure::core::Structure;
use crate::utils::log::LogSink;
use super::parser::{parse_alt_loc, parse_line};
use super::StructureFileFormat;

/// A PDB reader over any byte source
#[derive(Debug)]
pub struct Reader<R: io::Read> {
    pub reader: R,
    pub input_type: StructureFileFormat,
    /// Used in warnings about skipped lines
    pub source_name: String,
}

impl Reader<File> {
    /// Open a file, picking the gzip decoder from a `.gz` suffix
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let input_type = StructureFileFormat::from_path(path.as_ref());
        let source_name = path.as_ref().display().to_string();
        let file = File::open(path)?;
        Ok(Reader { reader: file, input_type, source_name })
    }
}

impl<R: io::Read> Reader<R> {
    pub fn new(reader: R) -> Self {
        Reader { reader, input_type: StructureFileFormat::PDB, source_name: "<input>".to_string() }
    }

    pub fn read_structure(self, sink: &dyn LogSink) -> Result<Structure> {
        match self.input_type {
            StructureFileFormat::PDBGz => {
                read_records(BufReader::new(GzDecoder::new(self.reader)), &self.source_name, sink)
            }
            StructureFileFormat::PDB => read_records(BufReader::new(self.reader), &self.source_name, sink),
        }
    }
}

/// Collect ATOM records of the first model.
///
/// Lines that fail to parse are reported and skipped. Alternate locations
/// are resolved per residue: the first indicator seen for a residue is kept
/// and its other conformers are dropped. Reading stops at the first ENDMDL,
/// so ensembles are reduced to MODEL 1.
fn read_records<B: BufRead>(reader: B, source_name: &str, sink: &dyn LogSink) -> Result<Structure> {
    let mut structure = Structure::new();
    let mut kept_alt_loc: FxHashMap<ResidueKey, u8> = FxHashMap::default();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with("ENDMDL") {
            break;
        }
        if !line.starts_with("ATOM  ") {
            continue;
        }
        let atom = match parse_line(&line) {
            Ok(atom) => atom,
            Err(e) => {
                sink.warn(&format!("{}:{}: skipped ATOM record: {}", source_name, line_no + 1, e));
                continue;
            }
        };
        if let Some(alt) = parse_alt_loc(&line) {
            let kept = *kept_alt_loc.entry(atom.residue_key()).or_insert(alt);
            if kept != alt {
                continue;
            }
        }
        structure.push(atom);
    }
    Ok(structure)
}

/// Parse PDB text already held in memory
pub fn read_pdb_str(contents: &str, sink: &dyn LogSink) -> Result<Structure> {
    read_records(contents.as_bytes(), "<input>", sink)
}
