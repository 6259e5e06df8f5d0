// File: measure.rs
// Apo/holo comparison: pairs of structures of one complex are split into
// entities (CDR loops or pMHC chains) and compared per residue or as a whole.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::annotation::{annotate, AnnotatedAtom, AnnotatedStructure, ChainRole};
use crate::controller::source::{DirectorySource, StructureSource};
use crate::controller::summary::{read_apo_holo_summary, ApoHoloEntry};
use crate::error::{LoopwarpError, Result};
use crate::structure::core::{group_residues, AtomRow, Residue};
use crate::structure::coordinate::Coordinate;
use crate::structure::kabsch::superpose;
use crate::structure::metrics::{ca_distance, chi1_change, com_distance, residue_rmsd, rmsd};
use crate::utils::formatter::{Column, CsvFormatter, Value};
use crate::utils::loader::{list_subdirectories, structure_file_names};
use crate::utils::log::LogSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitySelection {
    /// CDR loops, one entity per (chain, CDR)
    Tcr,
    /// Peptide and MHC chains, one entity per chain
    Pmhc,
}

impl EntitySelection {
    pub fn get_with_str(entity: &str) -> Option<Self> {
        match entity {
            "tcr" => Some(EntitySelection::Tcr),
            "pmhc" => Some(EntitySelection::Pmhc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntitySelection::Tcr => "tcr",
            EntitySelection::Pmhc => "pmhc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measurement {
    Rmsd,
    CaDistance,
    ChiAngleChange,
    ComDistance,
}

impl Measurement {
    pub const ALL: [Measurement; 4] = [
        Measurement::Rmsd,
        Measurement::CaDistance,
        Measurement::ChiAngleChange,
        Measurement::ComDistance,
    ];

    pub fn get_with_str(name: &str) -> Option<Self> {
        match name {
            "rmsd" => Some(Measurement::Rmsd),
            "ca_distance" => Some(Measurement::CaDistance),
            "chi_angle_change" => Some(Measurement::ChiAngleChange),
            "com_distance" => Some(Measurement::ComDistance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Measurement::Rmsd => "rmsd",
            Measurement::CaDistance => "ca_distance",
            Measurement::ChiAngleChange => "chi_angle_change",
            Measurement::ComDistance => "com_distance",
        }
    }

    /// Whether the value changes when one residue is moved rigidly
    pub fn depends_on_position(&self) -> bool {
        !matches!(self, Measurement::ChiAngleChange)
    }

    /// Parse measurement names. `all` expands to every measurement; repeated
    /// names are kept once, in first-seen order.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Measurement>> {
        let mut selected: Vec<Measurement> = Vec::new();
        for name in names {
            let name = name.as_ref();
            let parsed: Vec<Measurement> = if name == "all" {
                Measurement::ALL.to_vec()
            } else {
                vec![Measurement::get_with_str(name).ok_or_else(|| {
                    LoopwarpError::InvalidInput(format!("unknown measurement '{}'", name))
                })?]
            };
            for m in parsed {
                if !selected.contains(&m) {
                    selected.push(m);
                }
            }
        }
        if selected.is_empty() {
            selected = Measurement::ALL.to_vec();
        }
        Ok(selected)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    pub entity: EntitySelection,
    /// Residue codes (`<seq><insert>`) of MHC positions contacted by the
    /// TCR. When set, pMHC entities are split by contact.
    pub tcr_contact_residues: Option<Vec<String>>,
    pub align_entities: bool,
    pub per_residue: bool,
    pub crop_to_abd: bool,
    pub measurements: Vec<Measurement>,
}

impl CompareConfig {
    pub fn new(entity: EntitySelection) -> Self {
        CompareConfig {
            entity,
            tcr_contact_residues: None,
            align_entities: false,
            per_residue: false,
            crop_to_abd: false,
            measurements: Measurement::ALL.to_vec(),
        }
    }

    fn splits_by_contact(&self) -> bool {
        self.entity == EntitySelection::Pmhc && self.tcr_contact_residues.is_some()
    }

    /// Measurements written to the output, in column order
    pub fn output_measurements(&self) -> Vec<Measurement> {
        if self.per_residue {
            self.measurements.clone()
        } else {
            vec![Measurement::Rmsd]
        }
    }
}

/// Group of atoms compared as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub chain_role: ChainRole,
    /// Set in TCR mode
    pub cdr: Option<u8>,
    /// Set in pMHC mode when contact residues were given
    pub tcr_contact: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResidueIdentity {
    pub res_name: String,
    pub seq: i32,
    pub insert_code: Option<char>,
}

impl ResidueIdentity {
    fn of<T: AtomRow>(residue: &Residue<T>) -> Self {
        ResidueIdentity {
            res_name: residue.res_name_str().to_string(),
            seq: residue.key.res_serial,
            insert_code: residue.key.insert_code.map(|c| c as char),
        }
    }

    fn label(&self) -> String {
        match self.insert_code {
            Some(code) => format!("{} {}{}", self.res_name, self.seq, code),
            None => format!("{} {}", self.res_name, self.seq),
        }
    }
}

/// One output row. `residue` is `None` for entity-level rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub complex_id: String,
    pub structure_x_name: String,
    pub structure_y_name: String,
    pub entity: EntityKey,
    pub residue: Option<ResidueIdentity>,
    pub rmsd: Option<f64>,
    pub ca_distance: Option<f64>,
    pub chi_angle_change: Option<f64>,
    pub com_distance: Option<f64>,
}

impl MeasurementRecord {
    fn new(complex_id: &str, x: &str, y: &str, entity: EntityKey, residue: Option<ResidueIdentity>) -> Self {
        MeasurementRecord {
            complex_id: complex_id.to_string(),
            structure_x_name: x.to_string(),
            structure_y_name: y.to_string(),
            entity,
            residue,
            rmsd: None,
            ca_distance: None,
            chi_angle_change: None,
            com_distance: None,
        }
    }

    pub fn value(&self, measurement: Measurement) -> Option<f64> {
        match measurement {
            Measurement::Rmsd => self.rmsd,
            Measurement::CaDistance => self.ca_distance,
            Measurement::ChiAngleChange => self.chi_angle_change,
            Measurement::ComDistance => self.com_distance,
        }
    }

    fn set_value(&mut self, measurement: Measurement, value: Option<f64>) {
        match measurement {
            Measurement::Rmsd => self.rmsd = value,
            Measurement::CaDistance => self.ca_distance = value,
            Measurement::ChiAngleChange => self.chi_angle_change = value,
            Measurement::ComDistance => self.com_distance = value,
        }
    }
}

/// `<seq><insert>` as written in contact residue lists
fn residue_code(row: &AnnotatedAtom) -> String {
    match row.atom.insert_code {
        Some(code) => format!("{}{}", row.atom.res_serial, code as char),
        None => row.atom.res_serial.to_string(),
    }
}

fn entity_of(row: &AnnotatedAtom, config: &CompareConfig) -> Option<EntityKey> {
    let chain_role = row.chain_role?;
    if config.crop_to_abd && chain_role == ChainRole::MhcChain1 && !row.mhc_abd {
        return None;
    }
    match config.entity {
        EntitySelection::Tcr if chain_role.is_tcr() => {
            Some(EntityKey { chain_role, cdr: Some(row.cdr?), tcr_contact: None })
        }
        // Whole chains, TCR chains included when the complex carries one
        EntitySelection::Pmhc => {
            let tcr_contact = config.tcr_contact_residues.as_ref().map(|codes| {
                chain_role == ChainRole::MhcChain1 && codes.contains(&residue_code(row))
            });
            Some(EntityKey { chain_role, cdr: None, tcr_contact })
        }
        _ => None,
    }
}

fn entities(structure: &AnnotatedStructure, config: &CompareConfig) -> BTreeMap<EntityKey, Vec<AnnotatedAtom>> {
    let mut entities: BTreeMap<EntityKey, Vec<AnnotatedAtom>> = BTreeMap::new();
    for row in &structure.rows {
        if let Some(key) = entity_of(row, config) {
            entities.entry(key).or_default().push(row.clone());
        }
    }
    entities
}

type ResiduePair = (Residue<AnnotatedAtom>, Residue<AnnotatedAtom>);

/// Residues present in both entities, matched by name, number and insertion
/// code, in the order of `x`.
fn match_residues(x: &[AnnotatedAtom], y: &[AnnotatedAtom]) -> Vec<ResiduePair> {
    let y_residues = group_residues(y);
    let index: FxHashMap<([u8; 3], i32, Option<u8>), usize> = y_residues
        .iter()
        .enumerate()
        .map(|(i, res)| ((res.res_name, res.key.res_serial, res.key.insert_code), i))
        .collect();
    group_residues(x)
        .into_iter()
        .filter_map(|res| {
            let i = *index.get(&(res.res_name, res.key.res_serial, res.key.insert_code))?;
            Some((res, y_residues[i].clone()))
        })
        .collect()
}

/// Backbone atoms present in both residues of every pair, matched by name.
fn matched_backbone(pairs: &[ResiduePair]) -> (Vec<Coordinate>, Vec<Coordinate>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (rx, ry) in pairs {
        for row in rx.rows.iter().filter(|row| row.atom.is_backbone()) {
            if let Some(atom) = ry.find_atom(&row.atom.atom_name) {
                xs.push(row.atom.coordinate);
                ys.push(atom.coordinate);
            }
        }
    }
    (xs, ys)
}

fn measure(measurement: Measurement, x: &Residue<AnnotatedAtom>, y: &Residue<AnnotatedAtom>) -> Result<Option<f64>> {
    match measurement {
        Measurement::Rmsd => residue_rmsd(x, y).map(Some),
        Measurement::CaDistance => ca_distance(x, y).map(Some),
        Measurement::ChiAngleChange => chi1_change(x, y),
        Measurement::ComDistance => com_distance(x, y).map(Some),
    }
}

/// Compare two annotated structures of one complex. Measurements that fail
/// are reported through `sink` and left missing.
pub fn compare_structures(
    complex_id: &str, x: &AnnotatedStructure, y: &AnnotatedStructure, config: &CompareConfig,
    sink: &dyn LogSink,
) -> Vec<MeasurementRecord> {
    let entities_x = entities(x, config);
    let entities_y = entities(y, config);
    let mut records = Vec::new();

    for (key, rows_x) in &entities_x {
        let Some(rows_y) = entities_y.get(key) else {
            continue;
        };
        let mut pairs = match_residues(rows_x, rows_y);
        if pairs.is_empty() {
            continue;
        }
        let (mut backbone_x, backbone_y) = matched_backbone(&pairs);

        // A failed fit leaves every position-dependent value missing
        let mut unaligned = false;
        if config.align_entities {
            match superpose(&backbone_x, &backbone_y) {
                Ok(fit) => {
                    for (rx, _) in pairs.iter_mut() {
                        fit.transform.apply_rows(&mut rx.rows);
                    }
                    backbone_x = fit.transform.apply_all(&backbone_x);
                }
                Err(e) => {
                    sink.warn(&format!(
                        "{}: could not align {} onto {} for {}, positional values left missing: {}",
                        complex_id, x.name, y.name, key.chain_role, e
                    ));
                    unaligned = true;
                }
            }
        }

        if !config.per_residue {
            let mut record = MeasurementRecord::new(complex_id, &x.name, &y.name, *key, None);
            if !unaligned {
                record.rmsd = match rmsd(&backbone_x, &backbone_y) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        sink.warn(&format!("{}: backbone RMSD of {} failed: {}", complex_id, key.chain_role, e));
                        None
                    }
                };
            }
            records.push(record);
            continue;
        }

        for (rx, ry) in &pairs {
            let identity = ResidueIdentity::of(rx);
            let mut record = MeasurementRecord::new(complex_id, &x.name, &y.name, *key, Some(identity.clone()));
            for &measurement in &config.measurements {
                if unaligned && measurement.depends_on_position() {
                    continue;
                }
                let value = match measure(measurement, rx, ry) {
                    Ok(value) => value,
                    Err(e) => {
                        sink.warn(&format!(
                            "{}: {} failed for residue {} ({} vs {}): {}",
                            complex_id, measurement.as_str(), identity.label(), x.name, y.name, e
                        ));
                        None
                    }
                };
                record.set_value(measurement, value);
            }
            records.push(record);
        }
    }
    records
}

/// Unordered pairs of distinct structures to compare, taken from the manifest
/// rows of files present in the complex directory. A structure takes part if
/// it is of the selected entity type or is a holo structure.
pub fn comparison_pairs<'a>(
    entries: &'a [ApoHoloEntry], available: &[String], entity: EntitySelection,
) -> Vec<(&'a ApoHoloEntry, &'a ApoHoloEntry)> {
    let candidates: Vec<&ApoHoloEntry> = entries
        .iter()
        .filter(|e| available.contains(&e.file_name))
        .filter(|e| e.structure_type == entity.as_str() || e.state == "holo")
        .collect();

    let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
    let mut pairs = Vec::new();
    for (i, x) in candidates.iter().enumerate() {
        for y in &candidates[i + 1..] {
            if x.file_name == y.file_name {
                continue;
            }
            let key = if x.file_name <= y.file_name {
                (x.file_name.clone(), y.file_name.clone())
            } else {
                (y.file_name.clone(), x.file_name.clone())
            };
            if seen.insert(key) {
                pairs.push((*x, *y));
            }
        }
    }
    pairs
}

/// Compare all selected pairs of one complex. Structures are looked up in
/// `source` as `<complex_id>/<file_name>`; a structure that cannot be loaded
/// is reported and its pairs are skipped.
pub fn compare_complex(
    source: &dyn StructureSource, complex_id: &str, available: &[String], entries: &[ApoHoloEntry],
    config: &CompareConfig, sink: &dyn LogSink,
) -> Vec<MeasurementRecord> {
    let pairs = comparison_pairs(entries, available, config.entity);

    let mut needed: Vec<&ApoHoloEntry> = Vec::new();
    for (x, y) in &pairs {
        for entry in [*x, *y] {
            if !needed.iter().any(|e| e.file_name == entry.file_name) {
                needed.push(entry);
            }
        }
    }
    let loaded: FxHashMap<String, AnnotatedStructure> = needed
        .par_iter()
        .filter_map(|entry| {
            let path = format!("{}/{}", complex_id, entry.file_name);
            match source.load(&path, sink) {
                Ok(structure) => Some((entry.file_name.clone(), annotate(&entry.file_name, &structure, &entry.chains))),
                Err(e) => {
                    sink.warn(&format!("{}: could not read {}: {}", complex_id, entry.file_name, e));
                    None
                }
            }
        })
        .collect();

    pairs
        .par_iter()
        .map(|(x, y)| {
            sink.debug(&format!("Computing changes between {} and {}", x.file_name, y.file_name));
            match (loaded.get(&x.file_name), loaded.get(&y.file_name)) {
                (Some(sx), Some(sy)) => compare_structures(complex_id, sx, sy, config, sink),
                _ => Vec::new(),
            }
        })
        .collect::<Vec<Vec<MeasurementRecord>>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Compare every complex of an apo/holo collection. The directory holds one
/// `*summary.csv` manifest and one sub-directory per complex.
pub fn compare_collection(dir: &Path, config: &CompareConfig, sink: &dyn LogSink) -> Result<Vec<MeasurementRecord>> {
    let entries = read_apo_holo_summary(dir)?;
    let complexes = list_subdirectories(dir)?;
    let source = DirectorySource::new(dir);
    let total = complexes.len();
    let mut records = Vec::new();
    for (num, complex_id) in complexes.iter().enumerate() {
        sink.info(&format!("{} - {} of {}", complex_id, num + 1, total));
        let available = structure_file_names(&dir.join(complex_id))?;
        records.extend(compare_complex(&source, complex_id, &available, &entries, config, sink));
    }
    Ok(records)
}

/// Output columns for `config`
pub fn measurement_columns(config: &CompareConfig) -> Vec<Column<MeasurementRecord>> {
    let mut columns: Vec<Column<MeasurementRecord>> = vec![
        Column::new("complex_id", "Complex directory", |r: &MeasurementRecord| Value::from(r.complex_id.as_str())),
        Column::new("structure_x_name", "First structure", |r: &MeasurementRecord| {
            Value::from(r.structure_x_name.as_str())
        }),
        Column::new("structure_y_name", "Second structure", |r: &MeasurementRecord| {
            Value::from(r.structure_y_name.as_str())
        }),
        Column::new("chain_type", "Chain role", |r: &MeasurementRecord| Value::from(r.entity.chain_role.as_str())),
    ];
    match config.entity {
        EntitySelection::Tcr => {
            columns.push(Column::new("cdr", "CDR loop", |r: &MeasurementRecord| Value::from(r.entity.cdr)));
        }
        EntitySelection::Pmhc if config.splits_by_contact() => {
            columns.push(Column::new("tcr_contact", "TCR contact position", |r: &MeasurementRecord| {
                Value::from(r.entity.tcr_contact)
            }));
        }
        EntitySelection::Pmhc => {}
    }
    if config.per_residue {
        columns.push(Column::new("residue_name", "Residue name", |r: &MeasurementRecord| {
            Value::from(r.residue.as_ref().map(|res| res.res_name.clone()))
        }));
        columns.push(Column::new("residue_seq_id", "Residue number", |r: &MeasurementRecord| {
            Value::from(r.residue.as_ref().map(|res| res.seq))
        }));
        columns.push(Column::new("residue_insert_code", "Insertion code", |r: &MeasurementRecord| {
            Value::from(r.residue.as_ref().and_then(|res| res.insert_code).map(|c| c.to_string()))
        }));
    }
    for measurement in config.output_measurements() {
        columns.push(Column::new(measurement.as_str(), "Measured difference", move |r: &MeasurementRecord| {
            Value::from(r.value(measurement))
        }));
    }
    columns
}

pub fn write_measurements<W: Write>(writer: W, records: &[MeasurementRecord], config: &CompareConfig) -> Result<()> {
    CsvFormatter::new(measurement_columns(config)).write_all(writer, records)?;
    Ok(())
}
