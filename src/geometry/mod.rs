//! Loop geometry: anchor selection and sequence distances.

pub mod anchor;
pub mod dtw;
