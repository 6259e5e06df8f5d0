//! Chain roles, CDR membership and MHC binding-domain flags.
//!
//! Annotation never mutates the parsed structure: `annotate` returns new
//! rows that wrap each atom together with its derived labels.

pub mod imgt;

use std::fmt;

use crate::structure::atom::Atom;
use crate::structure::core::{group_residues, residue_sequence, AtomRow, Residue, Structure};
use crate::structure::coordinate::Coordinate;
use imgt::{assign_cdr_number, in_mhc_abd};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainRole {
    AlphaChain,
    BetaChain,
    AntigenChain,
    MhcChain1,
    MhcChain2,
}

impl ChainRole {
    pub const TCR: [ChainRole; 2] = [ChainRole::AlphaChain, ChainRole::BetaChain];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainRole::AlphaChain => "alpha_chain",
            ChainRole::BetaChain => "beta_chain",
            ChainRole::AntigenChain => "antigen_chain",
            ChainRole::MhcChain1 => "mhc_chain1",
            ChainRole::MhcChain2 => "mhc_chain2",
        }
    }

    /// "alpha" / "beta" as used in matrix file names
    pub fn short_name(&self) -> &'static str {
        match self {
            ChainRole::AlphaChain => "alpha",
            ChainRole::BetaChain => "beta",
            ChainRole::AntigenChain => "antigen",
            ChainRole::MhcChain1 => "mhc1",
            ChainRole::MhcChain2 => "mhc2",
        }
    }

    pub fn get_with_str(role: &str) -> Option<Self> {
        match role {
            "alpha_chain" | "alpha" => Some(ChainRole::AlphaChain),
            "beta_chain" | "beta" => Some(ChainRole::BetaChain),
            "antigen_chain" | "antigen" => Some(ChainRole::AntigenChain),
            "mhc_chain1" | "mhc1" => Some(ChainRole::MhcChain1),
            "mhc_chain2" | "mhc2" => Some(ChainRole::MhcChain2),
            _ => None,
        }
    }

    pub fn is_tcr(&self) -> bool {
        matches!(self, ChainRole::AlphaChain | ChainRole::BetaChain)
    }
}

impl fmt::Display for ChainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chain identifiers of each role in one structure. Absent roles are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainIds {
    pub alpha: Option<u8>,
    pub beta: Option<u8>,
    pub antigen: Option<u8>,
    pub mhc1: Option<u8>,
    pub mhc2: Option<u8>,
}

impl ChainIds {
    pub fn tcr(alpha: u8, beta: u8) -> Self {
        ChainIds { alpha: Some(alpha), beta: Some(beta), ..Default::default() }
    }

    /// Parse a chain id column value. Blank or NA-like values mean absent.
    pub fn parse_chain_id(value: &str) -> Option<u8> {
        let value = value.trim();
        match value {
            "" | "NA" | "nan" | "NaN" | "None" => None,
            _ => value.bytes().next(),
        }
    }

    /// Role of a chain id. Roles are tried in the order alpha, beta,
    /// antigen, mhc1, mhc2 and the first match wins.
    pub fn role_of(&self, chain: u8) -> Option<ChainRole> {
        [
            (self.alpha, ChainRole::AlphaChain),
            (self.beta, ChainRole::BetaChain),
            (self.antigen, ChainRole::AntigenChain),
            (self.mhc1, ChainRole::MhcChain1),
            (self.mhc2, ChainRole::MhcChain2),
        ]
        .into_iter()
        .find(|(id, _)| *id == Some(chain))
        .map(|(_, role)| role)
    }
}

/// An atom with the labels derived from its chain and residue number.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedAtom {
    pub atom: Atom,
    pub chain_role: Option<ChainRole>,
    pub cdr: Option<u8>,
    pub mhc_abd: bool,
}

impl AtomRow for AnnotatedAtom {
    fn atom(&self) -> &Atom { &self.atom }
    fn atom_mut(&mut self) -> &mut Atom { &mut self.atom }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedStructure {
    pub name: String,
    pub rows: Vec<AnnotatedAtom>,
}

impl AnnotatedStructure {
    /// Rows of one CDR loop, in file order
    pub fn cdr_rows(&self, role: ChainRole, cdr: u8) -> Vec<AnnotatedAtom> {
        self.rows
            .iter()
            .filter(|r| r.chain_role == Some(role) && r.cdr == Some(cdr))
            .cloned()
            .collect()
    }

    pub fn residues(&self) -> Vec<Residue<AnnotatedAtom>> {
        group_residues(&self.rows)
    }

    /// One-letter sequence of a CDR loop, empty if the loop is absent
    pub fn cdr_sequence(&self, role: ChainRole, cdr: u8) -> String {
        residue_sequence(&self.cdr_rows(role, cdr))
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.rows.iter().map(|r| r.atom.coordinate).collect()
    }
}

/// Label every atom of `structure` with its chain role, CDR loop and MHC
/// binding-domain flag. Chains matching no role stay unassigned.
pub fn annotate(name: &str, structure: &Structure, chains: &ChainIds) -> AnnotatedStructure {
    let rows = structure
        .atoms
        .iter()
        .map(|atom| {
            let chain_role = chains.role_of(atom.chain);
            let cdr = match chain_role {
                Some(role) if role.is_tcr() => assign_cdr_number(atom.res_serial),
                _ => None,
            };
            let mhc_abd = chain_role == Some(ChainRole::MhcChain1) && in_mhc_abd(atom.res_serial);
            AnnotatedAtom { atom: atom.clone(), chain_role, cdr, mhc_abd }
        })
        .collect();
    AnnotatedStructure { name: name.to_string(), rows }
}
