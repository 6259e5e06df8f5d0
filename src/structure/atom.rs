// File: atom.rs
// Atom records and residue identity

use std::fmt;

use crate::structure::coordinate::Coordinate;

pub const BACKBONE_ATOMS: [&[u8; 4]; 4] = [b" N  ", b" CA ", b" C  ", b" O  "];

/// Identity of a residue: chain, sequence number and insertion code.
/// Two atoms belong to the same residue iff their keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueKey {
    pub chain: u8,
    pub res_serial: i32,
    pub insert_code: Option<u8>,
}

impl ResidueKey {
    pub fn new(chain: u8, res_serial: i32, insert_code: Option<u8>) -> Self {
        ResidueKey { chain, res_serial, insert_code }
    }
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain as char, self.res_serial)?;
        if let Some(code) = self.insert_code {
            write!(f, "{}", code as char)?;
        }
        Ok(())
    }
}

/// One ATOM row of a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub coordinate: Coordinate,
    /// Raw 4-column PDB atom name, e.g. `b" CA "`
    pub atom_name: [u8; 4],
    pub res_name: [u8; 3],
    pub res_serial: i32,
    pub insert_code: Option<u8>,
    pub chain: u8,
    /// Right-justified element symbol, e.g. `b" C"`
    pub element: [u8; 2],
}

impl Atom {
    pub fn new(
        coordinate: Coordinate, atom_name: [u8; 4], res_name: [u8; 3],
        res_serial: i32, insert_code: Option<u8>, chain: u8, element: [u8; 2],
    ) -> Atom {
        Atom { coordinate, atom_name, res_name, res_serial, insert_code, chain, element }
    }

    /// Build an atom from trimmed strings. Element is guessed from the
    /// atom name when not given. Mostly useful for tests and fixtures.
    pub fn from_names(
        chain: char, res_name: &str, res_serial: i32, insert_code: Option<char>,
        atom_name: &str, element: Option<&str>, coordinate: Coordinate,
    ) -> Atom {
        let element = element
            .map(pad_element)
            .unwrap_or_else(|| guess_element(atom_name));
        Atom {
            coordinate,
            atom_name: pad_atom_name(atom_name),
            res_name: pad_res_name(res_name),
            res_serial,
            insert_code: insert_code.map(|c| c as u8),
            chain: chain as u8,
            element,
        }
    }

    pub fn residue_key(&self) -> ResidueKey {
        ResidueKey::new(self.chain, self.res_serial, self.insert_code)
    }

    pub fn is_backbone(&self) -> bool {
        BACKBONE_ATOMS.iter().any(|name| **name == self.atom_name)
    }

    pub fn atom_name_str(&self) -> &str {
        std::str::from_utf8(&self.atom_name).unwrap_or("").trim()
    }

    pub fn res_name_str(&self) -> &str {
        std::str::from_utf8(&self.res_name).unwrap_or("").trim()
    }

    pub fn element_str(&self) -> &str {
        std::str::from_utf8(&self.element).unwrap_or("").trim()
    }
}

/// Pad an atom name to the PDB 4-column convention. Names shorter than four
/// characters start in the second column (" CA ", " CG1"), four-character
/// names fill the field.
pub fn pad_atom_name(name: &str) -> [u8; 4] {
    let trimmed = name.trim().as_bytes();
    let mut out = [b' '; 4];
    if trimmed.len() >= 4 {
        out.copy_from_slice(&trimmed[..4]);
    } else {
        out[1..1 + trimmed.len()].copy_from_slice(trimmed);
    }
    out
}

pub fn pad_res_name(name: &str) -> [u8; 3] {
    let trimmed = name.trim().as_bytes();
    let mut out = [b' '; 3];
    let n = trimmed.len().min(3);
    out[3 - n..].copy_from_slice(&trimmed[..n]);
    out
}

pub fn pad_element(symbol: &str) -> [u8; 2] {
    let trimmed = symbol.trim().as_bytes();
    match trimmed.len() {
        0 => [b' ', b' '],
        1 => [b' ', trimmed[0].to_ascii_uppercase()],
        _ => [trimmed[0].to_ascii_uppercase(), trimmed[1].to_ascii_uppercase()],
    }
}

/// First alphabetic character of the atom name, which is the element for
/// every atom of the standard amino acids.
pub fn guess_element(atom_name: &str) -> [u8; 2] {
    match atom_name.trim().chars().find(|c| c.is_ascii_alphabetic()) {
        Some(c) => [b' ', c.to_ascii_uppercase() as u8],
        None => [b' ', b' '],
    }
}
