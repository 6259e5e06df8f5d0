use rustc_hash::FxHashMap;

use crate::structure::atom::{Atom, ResidueKey};
use crate::structure::coordinate::Coordinate;
use crate::structure::residue::three_to_one;

/// Anything that wraps an atom record. Lets residue grouping work on plain
/// and annotated rows alike.
pub trait AtomRow {
    fn atom(&self) -> &Atom;
    fn atom_mut(&mut self) -> &mut Atom;
}

impl AtomRow for Atom {
    fn atom(&self) -> &Atom { self }
    fn atom_mut(&mut self) -> &mut Atom { self }
}

/// Rows of one residue, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue<T> {
    pub key: ResidueKey,
    pub res_name: [u8; 3],
    pub rows: Vec<T>,
}

impl<T: AtomRow> Residue<T> {
    pub fn res_name_str(&self) -> &str {
        std::str::from_utf8(&self.res_name).unwrap_or("").trim()
    }

    pub fn find_atom(&self, atom_name: &[u8; 4]) -> Option<&Atom> {
        self.rows.iter().map(|r| r.atom()).find(|a| &a.atom_name == atom_name)
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.rows.iter().map(|r| r.atom().coordinate).collect()
    }
}

/// Group rows by residue identity, keeping the order in which residues first
/// appear. Rows of a residue that are split apart in the file are still
/// gathered into the same group.
pub fn group_residues<T: AtomRow + Clone>(rows: &[T]) -> Vec<Residue<T>> {
    let mut index: FxHashMap<ResidueKey, usize> = FxHashMap::default();
    let mut residues: Vec<Residue<T>> = Vec::new();
    for row in rows {
        let atom = row.atom();
        let key = atom.residue_key();
        match index.get(&key) {
            Some(&pos) => residues[pos].rows.push(row.clone()),
            None => {
                index.insert(key, residues.len());
                residues.push(Residue { key, res_name: atom.res_name, rows: vec![row.clone()] });
            }
        }
    }
    residues
}

pub fn row_coordinates<T: AtomRow>(rows: &[T]) -> Vec<Coordinate> {
    rows.iter().map(|r| r.atom().coordinate).collect()
}

/// One-letter sequence of residues in first-appearance order. Residues with
/// no one-letter code are written as `X`.
pub fn residue_sequence<T: AtomRow + Clone>(rows: &[T]) -> String {
    group_residues(rows)
        .iter()
        .map(|res| three_to_one(res.res_name_str()).unwrap_or('X'))
        .collect()
}

/// Structure is the in-memory atom table of one model of a PDB entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    pub atoms: Vec<Atom>,
}

impl Structure {
    pub fn new() -> Structure {
        Structure { atoms: Vec::new() }
    }

    pub fn from_atoms(atoms: Vec<Atom>) -> Structure {
        Structure { atoms }
    }

    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Chain ids in order of first appearance
    pub fn chains(&self) -> Vec<u8> {
        let mut chains: Vec<u8> = Vec::new();
        for atom in &self.atoms {
            if !chains.contains(&atom.chain) {
                chains.push(atom.chain);
            }
        }
        chains
    }

    pub fn residues(&self) -> Vec<Residue<Atom>> {
        group_residues(&self.atoms)
    }

    pub fn num_residues(&self) -> usize {
        self.residues().len()
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        row_coordinates(&self.atoms)
    }
}
