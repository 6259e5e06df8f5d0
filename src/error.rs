// File: error.rs
// Error type shared by every stage of the comparison pipeline

use thiserror::Error;

/// Errors raised while loading, annotating, aligning or measuring structures.
#[derive(Debug, Error)]
pub enum LoopwarpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input text (PDB line, matrix cell, manifest row)
    #[error("parse error: {0}")]
    Parse(String),

    /// Bad argument or unknown selector
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("point set sizes differ: {mobile} mobile vs {target} target")]
    PointCountMismatch { mobile: usize, target: usize },

    /// Anchor residues on each side of two loops, as (start, end)
    #[error("anchor split differs: {mobile:?} mobile vs {target:?} target")]
    AnchorMismatch { mobile: (usize, usize), target: (usize, usize) },

    #[error("cannot superpose an empty point set")]
    EmptyPointSet,

    #[error("loop has no residues")]
    EmptyLoop,

    #[error("residue {0} not found in structure")]
    ResidueNotFound(String),

    #[error("missing atom {atom} in residue {residue}")]
    MissingAtom { atom: String, residue: String },

    #[error("unknown element '{0}'")]
    UnknownElement(String),

    #[error("no file matching {pattern} in {dir}")]
    MissingManifest { pattern: String, dir: String },

    #[error("more than one file matching {pattern} in {dir}")]
    AmbiguousManifest { pattern: String, dir: String },
}

pub type Result<T> = std::result::Result<T, LoopwarpError>;
