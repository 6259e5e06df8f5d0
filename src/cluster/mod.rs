//! Density-based clustering of loop conformations and cluster typing.

pub mod cluster_type;
pub mod hdbscan;

use std::fmt;

use crate::annotation::ChainRole;

/// Cluster id of one point, or noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClusterLabel {
    Cluster(usize),
    Noise,
}

impl ClusterLabel {
    pub fn is_noise(&self) -> bool {
        matches!(self, ClusterLabel::Noise)
    }

    /// Integer form with -1 for noise
    pub fn as_i64(&self) -> i64 {
        match self {
            ClusterLabel::Cluster(id) => *id as i64,
            ClusterLabel::Noise => -1,
        }
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterLabel::Cluster(id) => write!(f, "{}", id),
            ClusterLabel::Noise => f.write_str("noise"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterType {
    Canonical,
    Pseudo,
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterType::Canonical => "canonical",
            ClusterType::Pseudo => "pseudo",
        }
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cluster membership of one structure's loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    pub name: String,
    pub chain_role: ChainRole,
    pub cdr: u8,
    pub cluster: ClusterLabel,
    pub sequence: Option<String>,
    pub cluster_type: Option<ClusterType>,
}

impl ClusterAssignment {
    pub fn new(name: &str, chain_role: ChainRole, cdr: u8, cluster: ClusterLabel) -> Self {
        ClusterAssignment {
            name: name.to_string(),
            chain_role,
            cdr,
            cluster,
            sequence: None,
            cluster_type: None,
        }
    }
}

pub use cluster_type::{assign_cluster_types, cluster_types, DEFAULT_MIN_UNIQUE_SEQUENCES};
pub use hdbscan::Hdbscan;
