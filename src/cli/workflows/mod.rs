// File: mod.rs

//! # Workflows
//! This module contains the workflows for the CLI:
//! `compute_distances`, `cluster_loops` and `compare_apo_holo`.

pub mod cluster_loops;
pub mod compare_apo_holo;
pub mod compute_distances;
