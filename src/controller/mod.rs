// File: mod.rs
// Description:
//    pipeline stages that sit on top of the structure and geometry layers:
//    manifests, structure sources, pairwise loop distances, matrix files
//    and apo/holo measurements

pub mod distance;
pub mod matrix;
pub mod measure;
pub mod source;
pub mod summary;

pub use distance::{compute_distance_matrices, loop_distance, pairwise_distance_matrix, GroupMatrix, LOOP_GROUPS};
pub use matrix::DistanceMatrix;
pub use measure::{compare_collection, CompareConfig, EntitySelection, Measurement, MeasurementRecord};
pub use source::{DirectorySource, MemorySource, StructureSource};
