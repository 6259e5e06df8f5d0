// File: summary.rs
// Manifests that describe a structure collection:
//   - STCRDab `db_summary.dat` (tab separated), one row per TCR entry
//   - apo/holo `*summary.csv`, one row per structure file of a complex

use std::path::Path;

use crate::annotation::ChainIds;
use crate::error::{LoopwarpError, Result};
use crate::utils::loader::find_single_file;

pub const STCRDAB_SUMMARY_FILE: &str = "db_summary.dat";
pub const APO_HOLO_SUMMARY_SUFFIX: &str = "summary.csv";
pub const DEFAULT_RESOLUTION_CUTOFF: f64 = 3.5;
const AB_TCR: &str = "abTCR";

/// Header plus string cells of a delimited text table
#[derive(Debug, Clone)]
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn parse(text: &str, delimiter: char) -> Result<Table> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = match lines.next() {
            Some(line) => split_fields(line, delimiter),
            None => return Err(LoopwarpError::Parse("summary table is empty".to_string())),
        };
        let rows = lines.map(|line| split_fields(line, delimiter)).collect();
        Ok(Table { header, rows })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| LoopwarpError::Parse(format!("summary table has no '{}' column", name)))
    }
}

fn cell(row: &[String], column: Option<usize>) -> &str {
    column.and_then(|c| row.get(c)).map(|s| s.as_str()).unwrap_or("")
}

/// Split one line, honouring double-quoted fields.
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            c if c == delimiter && !quoted => {
                fields.push(std::mem::take(&mut current).trim().to_string());
            }
            c => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

fn optional(value: &str) -> Option<String> {
    match value {
        "" | "NA" | "nan" | "NaN" | "None" => None,
        v => Some(v.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StcrdabEntry {
    pub pdb: String,
    pub alpha_chain: String,
    pub beta_chain: String,
    pub antigen_chain: Option<String>,
    pub mhc_chain1: Option<String>,
    pub mhc_chain2: Option<String>,
    pub tcr_type: String,
    /// `None` when the column does not hold a number
    pub resolution: Option<f64>,
}

impl StcrdabEntry {
    /// `<pdb>_<alpha chain><beta chain>`
    pub fn structure_name(&self) -> String {
        format!("{}_{}{}", self.pdb, self.alpha_chain, self.beta_chain)
    }

    /// Location of the IMGT-numbered file inside the database directory
    pub fn file_name(&self) -> String {
        format!("imgt/{}.pdb", self.pdb)
    }

    pub fn chain_ids(&self) -> ChainIds {
        let parse = |v: &Option<String>| v.as_deref().and_then(ChainIds::parse_chain_id);
        ChainIds {
            alpha: ChainIds::parse_chain_id(&self.alpha_chain),
            beta: ChainIds::parse_chain_id(&self.beta_chain),
            antigen: parse(&self.antigen_chain),
            mhc1: parse(&self.mhc_chain1),
            mhc2: parse(&self.mhc_chain2),
        }
    }
}

pub fn parse_stcrdab_summary(text: &str) -> Result<Vec<StcrdabEntry>> {
    let table = Table::parse(text, '\t')?;
    let pdb = table.require("pdb")?;
    let alpha = table.require("Achain")?;
    let beta = table.require("Bchain")?;
    let tcr_type = table.require("TCRtype")?;
    let resolution = table.require("resolution")?;
    let antigen = table.column("antigen_chain");
    let mhc1 = table.column("mhc_chain1");
    let mhc2 = table.column("mhc_chain2");

    Ok(table
        .rows
        .iter()
        .map(|row| StcrdabEntry {
            pdb: cell(row, Some(pdb)).to_string(),
            alpha_chain: cell(row, Some(alpha)).to_string(),
            beta_chain: cell(row, Some(beta)).to_string(),
            antigen_chain: optional(cell(row, antigen)),
            mhc_chain1: optional(cell(row, mhc1)),
            mhc_chain2: optional(cell(row, mhc2)),
            tcr_type: cell(row, Some(tcr_type)).to_string(),
            resolution: cell(row, Some(resolution)).parse::<f64>().ok().filter(|r| r.is_finite()),
        })
        .collect())
}

/// Inclusive resolution filter. Entries without a numeric resolution never pass.
pub fn within_resolution_cutoff(resolution: Option<f64>, cutoff: f64) -> bool {
    matches!(resolution, Some(r) if r <= cutoff)
}

/// Alpha/beta TCR entries at or below the resolution cutoff, in file order
pub fn select_stcrdab_entries(entries: Vec<StcrdabEntry>, resolution_cutoff: f64) -> Vec<StcrdabEntry> {
    entries
        .into_iter()
        .filter(|e| within_resolution_cutoff(e.resolution, resolution_cutoff))
        .filter(|e| e.tcr_type == AB_TCR)
        .collect()
}

pub fn read_stcrdab_summary<P: AsRef<Path>>(stcrdab_dir: P) -> Result<Vec<StcrdabEntry>> {
    let path = stcrdab_dir.as_ref().join(STCRDAB_SUMMARY_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| LoopwarpError::MissingManifest {
        pattern: STCRDAB_SUMMARY_FILE.to_string(),
        dir: stcrdab_dir.as_ref().display().to_string(),
    })?;
    parse_stcrdab_summary(&text)
}

/// One structure file of an apo/holo collection
#[derive(Debug, Clone, PartialEq)]
pub struct ApoHoloEntry {
    pub file_name: String,
    pub pdb_id: String,
    /// Entity kind of the file: "tcr", "pmhc" or "tcr_pmhc"
    pub structure_type: String,
    /// "apo" or "holo"
    pub state: String,
    pub chains: ChainIds,
}

pub fn parse_apo_holo_summary(text: &str) -> Result<Vec<ApoHoloEntry>> {
    let table = Table::parse(text, ',')?;
    let file_name = table.require("file_name")?;
    let structure_type = table.require("structure_type")?;
    let state = table.require("state")?;
    let pdb_id = table.column("pdb_id");
    let chain = |name: &str| table.column(name);
    let (alpha, beta, antigen, mhc1, mhc2) = (
        chain("alpha_chain"), chain("beta_chain"), chain("antigen_chain"),
        chain("mhc_chain1"), chain("mhc_chain2"),
    );

    Ok(table
        .rows
        .iter()
        .map(|row| ApoHoloEntry {
            file_name: cell(row, Some(file_name)).to_string(),
            pdb_id: cell(row, pdb_id).to_string(),
            structure_type: cell(row, Some(structure_type)).to_string(),
            state: cell(row, Some(state)).to_string(),
            chains: ChainIds {
                alpha: ChainIds::parse_chain_id(cell(row, alpha)),
                beta: ChainIds::parse_chain_id(cell(row, beta)),
                antigen: ChainIds::parse_chain_id(cell(row, antigen)),
                mhc1: ChainIds::parse_chain_id(cell(row, mhc1)),
                mhc2: ChainIds::parse_chain_id(cell(row, mhc2)),
            },
        })
        .collect())
}

/// Read the single `*summary.csv` of an apo/holo collection directory.
pub fn read_apo_holo_summary<P: AsRef<Path>>(dir: P) -> Result<Vec<ApoHoloEntry>> {
    let path = find_single_file(dir.as_ref(), APO_HOLO_SUMMARY_SUFFIX)?;
    parse_apo_holo_summary(&std::fs::read_to_string(path)?)
}
