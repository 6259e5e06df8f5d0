//! Atom tables, coordinates and the geometry shared by every stage.

pub mod atom;
pub mod coordinate;
pub mod core;
pub mod io;
pub mod kabsch;
pub mod metrics;
pub mod residue;
