//! # About project
//!
//! Loopwarp compares T-cell receptor (TCR) and peptide-MHC structures in
//! their bound (holo) and unbound (apo) forms. It measures CDR loop
//! conformations with anchor-aligned dynamic time warping, clusters them
//! with HDBSCAN and reports per-residue changes between apo and holo
//! structures.

pub mod annotation;
pub mod cli;
pub mod cluster;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod structure;
pub mod utils;

pub mod prelude {
    pub use crate::annotation::{annotate, AnnotatedAtom, AnnotatedStructure, ChainIds, ChainRole};
    pub use crate::cluster::{ClusterAssignment, ClusterLabel, ClusterType, Hdbscan};
    pub use crate::controller::matrix::DistanceMatrix;
    pub use crate::controller::source::{DirectorySource, MemorySource, StructureSource};
    pub use crate::error::{LoopwarpError, Result};
    pub use crate::geometry::anchor::{LoopWithAnchors, DEFAULT_ANCHOR_COUNT};
    pub use crate::structure::atom::{Atom, ResidueKey};
    pub use crate::structure::coordinate::Coordinate;
    pub use crate::structure::core::{Residue, Structure};
    pub use crate::structure::io::pdb::Reader as PDBReader;
    pub use crate::utils::log::{
        log_msg, print_log_msg, LogLevel, LogSink, MemorySink, StderrSink, DBUG, DONE, FAIL, INFO, WARN,
    };
}
