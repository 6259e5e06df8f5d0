// File: cluster_type.rs
// Canonical vs pseudo clusters. A cluster whose members carry more than
// `min_uniq` distinct loop sequences is canonical: several sequences reach
// the same conformation. Otherwise it is a pseudo cluster.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::annotation::ChainRole;
use crate::cluster::{ClusterAssignment, ClusterLabel, ClusterType};

pub const DEFAULT_MIN_UNIQUE_SEQUENCES: usize = 2;

/// Type of every non-noise (chain role, CDR, cluster) group.
/// Members without a sequence do not count towards distinct sequences.
pub fn cluster_types(
    assignments: &[ClusterAssignment], min_uniq: usize,
) -> FxHashMap<(ChainRole, u8, usize), ClusterType> {
    let mut sequences: FxHashMap<(ChainRole, u8, usize), FxHashSet<&str>> = FxHashMap::default();
    for assignment in assignments {
        let ClusterLabel::Cluster(id) = assignment.cluster else {
            continue;
        };
        let group = sequences.entry((assignment.chain_role, assignment.cdr, id)).or_default();
        if let Some(sequence) = &assignment.sequence {
            group.insert(sequence.as_str());
        }
    }
    sequences
        .into_iter()
        .map(|(key, uniq)| {
            let cluster_type = if uniq.len() > min_uniq { ClusterType::Canonical } else { ClusterType::Pseudo };
            (key, cluster_type)
        })
        .collect()
}

/// Fill `cluster_type` of every assignment. Noise stays `None`.
pub fn assign_cluster_types(assignments: &mut [ClusterAssignment], min_uniq: usize) {
    let types = cluster_types(assignments, min_uniq);
    for assignment in assignments.iter_mut() {
        assignment.cluster_type = match assignment.cluster {
            ClusterLabel::Cluster(id) => types.get(&(assignment.chain_role, assignment.cdr, id)).copied(),
            ClusterLabel::Noise => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, cluster: ClusterLabel, sequence: Option<&str>) -> ClusterAssignment {
        let mut a = ClusterAssignment::new(name, ChainRole::BetaChain, 3, cluster);
        a.sequence = sequence.map(|s| s.to_string());
        a
    }

    #[test]
    fn test_repeated_sequence_is_pseudo() {
        let mut assignments = vec![
            member("a", ClusterLabel::Cluster(0), Some("AAG")),
            member("b", ClusterLabel::Cluster(0), Some("AAG")),
            member("c", ClusterLabel::Cluster(0), Some("AAG")),
        ];
        assign_cluster_types(&mut assignments, DEFAULT_MIN_UNIQUE_SEQUENCES);
        assert!(assignments.iter().all(|a| a.cluster_type == Some(ClusterType::Pseudo)));
    }

    #[test]
    fn test_three_distinct_sequences_is_canonical() {
        let mut assignments = vec![
            member("a", ClusterLabel::Cluster(1), Some("AAG")),
            member("b", ClusterLabel::Cluster(1), Some("AAV")),
            member("c", ClusterLabel::Cluster(1), Some("AAL")),
            member("d", ClusterLabel::Noise, Some("WWW")),
        ];
        assign_cluster_types(&mut assignments, DEFAULT_MIN_UNIQUE_SEQUENCES);
        assert_eq!(assignments[0].cluster_type, Some(ClusterType::Canonical));
        assert_eq!(assignments[3].cluster_type, None);
    }

    #[test]
    fn test_two_distinct_is_pseudo_and_groups_are_separate() {
        let mut assignments = vec![
            member("a", ClusterLabel::Cluster(0), Some("AAG")),
            member("b", ClusterLabel::Cluster(0), Some("AAV")),
            member("c", ClusterLabel::Cluster(0), None),
        ];
        // Same cluster id on another chain is its own group
        let mut alpha = member("d", ClusterLabel::Cluster(0), Some("CCC"));
        alpha.chain_role = ChainRole::AlphaChain;
        assignments.push(alpha);
        let types = cluster_types(&assignments, DEFAULT_MIN_UNIQUE_SEQUENCES);
        assert_eq!(types.len(), 2);
        assert_eq!(types[&(ChainRole::BetaChain, 3, 0)], ClusterType::Pseudo);
        assert_eq!(types[&(ChainRole::AlphaChain, 3, 0)], ClusterType::Pseudo);
    }
}
