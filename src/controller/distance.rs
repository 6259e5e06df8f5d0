// File: distance.rs
// Pairwise loop distances: anchor superposition followed by DTW over loop
// backbone coordinates, for every (chain, CDR) group.

use rayon::prelude::*;

use crate::annotation::{annotate, AnnotatedStructure, ChainIds, ChainRole};
use crate::controller::matrix::DistanceMatrix;
use crate::controller::source::StructureSource;
use crate::controller::summary::StcrdabEntry;
use crate::error::{LoopwarpError, Result};
use crate::geometry::anchor::LoopWithAnchors;
use crate::geometry::dtw::dtw_coordinates;
use crate::structure::kabsch::superpose;
use crate::utils::log::LogSink;

/// Every (chain, CDR) group a distance matrix is computed for, in output order
pub const LOOP_GROUPS: [(ChainRole, u8); 6] = [
    (ChainRole::AlphaChain, 1),
    (ChainRole::AlphaChain, 2),
    (ChainRole::AlphaChain, 3),
    (ChainRole::BetaChain, 1),
    (ChainRole::BetaChain, 2),
    (ChainRole::BetaChain, 3),
];

/// Distance of loop `b` to loop `a`.
///
/// `b` is superposed onto `a` using the anchor backbone atoms, then the loop
/// backbone atoms of both are compared with DTW. Loops whose start and end
/// anchor counts differ cannot be paired and give `AnchorMismatch`.
pub fn loop_distance(a: &LoopWithAnchors, b: &LoopWithAnchors) -> Result<f64> {
    let split_a = (a.num_start_anchors, a.num_end_anchors);
    let split_b = (b.num_start_anchors, b.num_end_anchors);
    if split_a != split_b {
        return Err(LoopwarpError::AnchorMismatch { mobile: split_b, target: split_a });
    }
    let fit = superpose(&b.anchor_coordinates(), &a.anchor_coordinates())?;
    let moved = fit.transform.apply_all(&b.loop_coordinates());
    Ok(dtw_coordinates(&a.loop_coordinates(), &moved))
}

/// Build the loop of one group for every structure. A structure whose loop
/// cannot be built is reported and left as `None`.
pub fn collect_loops(
    structures: &[AnnotatedStructure], chain_role: ChainRole, cdr: u8, anchor_count: usize,
    sink: &dyn LogSink,
) -> Vec<Option<LoopWithAnchors>> {
    structures
        .par_iter()
        .map(|structure| match LoopWithAnchors::build(structure, chain_role, cdr, anchor_count) {
            Ok(l) => Some(l),
            Err(e) => {
                sink.warn(&format!(
                    "{}: could not build CDR{} {} loop: {}", structure.name, cdr, chain_role.short_name(), e
                ));
                None
            }
        })
        .collect()
}

/// Symmetric matrix of `loop_distance` over all pairs `i < j`.
///
/// Pairs run in parallel on the current rayon pool. A pair that fails, or
/// involves a missing loop, is logged with both structure names and keeps
/// the value `+inf`.
pub fn pairwise_distance_matrix(
    loops: &[Option<LoopWithAnchors>], names: &[String], sink: &dyn LogSink,
) -> DistanceMatrix {
    let n = loops.len();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j))).collect();
    let name = |i: usize| names.get(i).map(|s| s.as_str()).unwrap_or("?");

    let results: Vec<(usize, usize, Option<f64>)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let value = match (&loops[i], &loops[j]) {
                (Some(a), Some(b)) => match loop_distance(a, b) {
                    Ok(d) => Some(d),
                    Err(e) => {
                        sink.warn(&format!("Could not compare {} and {}: {}", name(i), name(j), e));
                        None
                    }
                },
                _ => {
                    sink.debug(&format!("Skipping {} and {}: loop missing", name(i), name(j)));
                    None
                }
            };
            (i, j, value)
        })
        .collect();

    let mut matrix = DistanceMatrix::zeros(n);
    for (i, j, value) in results {
        matrix.set_symmetric(i, j, value.unwrap_or(f64::INFINITY));
    }
    matrix
}

/// One computed matrix and the group it belongs to
#[derive(Debug, Clone)]
pub struct GroupMatrix {
    pub chain_role: ChainRole,
    pub cdr: u8,
    pub matrix: DistanceMatrix,
}

/// Distance matrices of all six groups. Groups are processed one after the
/// other, pairs within a group in parallel.
pub fn compute_distance_matrices(
    structures: &[AnnotatedStructure], anchor_count: usize, sink: &dyn LogSink,
) -> Vec<GroupMatrix> {
    let names: Vec<String> = structures.iter().map(|s| s.name.clone()).collect();
    LOOP_GROUPS
        .iter()
        .map(|&(chain_role, cdr)| {
            sink.info(&format!("Computing CDR{} {} distances", cdr, chain_role.short_name()));
            let loops = collect_loops(structures, chain_role, cdr, anchor_count, sink);
            let matrix = pairwise_distance_matrix(&loops, &names, sink);
            GroupMatrix { chain_role, cdr, matrix }
        })
        .collect()
}

/// Load and annotate one named structure from `source`.
pub fn load_annotated(
    source: &dyn StructureSource, file_name: &str, name: &str, chains: &ChainIds, sink: &dyn LogSink,
) -> Result<AnnotatedStructure> {
    let structure = source.load(file_name, sink)?;
    Ok(annotate(name, &structure, chains))
}

/// Load every selected STCRDab entry. Entries whose file cannot be read are
/// reported and skipped, so the returned list may be shorter than `entries`.
pub fn load_stcrdab_structures(
    source: &dyn StructureSource, entries: &[StcrdabEntry], sink: &dyn LogSink,
) -> Vec<AnnotatedStructure> {
    let loaded: Vec<Option<AnnotatedStructure>> = entries
        .par_iter()
        .map(|entry| {
            let name = entry.structure_name();
            match load_annotated(source, &entry.file_name(), &name, &entry.chain_ids(), sink) {
                Ok(structure) => Some(structure),
                Err(e) => {
                    sink.warn(&format!("Skipping {}: {}", name, e));
                    None
                }
            }
        })
        .collect();
    loaded.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::atom::Atom;
    use crate::structure::coordinate::Coordinate;
    use crate::structure::core::Structure;
    use crate::utils::log::MemorySink;

    /// Beta chain with residues 100..=104, 105..=107 (CDR3) and 118..=122.
    /// Loop atoms are shifted by `loop_shift` along z.
    fn structure(name: &str, loop_shift: f32, first: i32) -> AnnotatedStructure {
        let mut atoms = Vec::new();
        let serials: Vec<i32> = (first..=107).chain(118..=122).collect();
        for (k, seq) in serials.iter().enumerate() {
            let shift = if (105..=107).contains(seq) { loop_shift } else { 0.0 };
            for (a, atom_name) in ["N", "CA", "C", "O"].iter().enumerate() {
                let x = k as f32 * 3.8;
                let y = (a as f32) * 1.1 + (k as f32 * 0.7).sin() * 2.0;
                let z = (k as f32 * 0.5).cos() * 1.5 + a as f32 * 0.3 + shift;
                atoms.push(Atom::from_names('E', "GLY", *seq, None, atom_name, None, Coordinate::new(x, y, z)));
            }
        }
        let chains = ChainIds { beta: Some(b'E'), ..Default::default() };
        annotate(name, &Structure::from_atoms(atoms), &chains)
    }

    fn build(s: &AnnotatedStructure, anchors: usize) -> LoopWithAnchors {
        LoopWithAnchors::build(s, ChainRole::BetaChain, 3, anchors).unwrap()
    }

    #[test]
    fn test_self_distance_is_zero() {
        let a = structure("a", 0.0, 100);
        let l = build(&a, 2);
        assert_eq!(loop_distance(&l, &l).unwrap(), 0.0);
    }

    #[test]
    fn test_shifted_loop_is_bounded_by_diagonal_path() {
        let a = build(&structure("a", 0.0, 100), 2);
        let shifted = build(&structure("b", 1.0, 100), 2);
        let d = loop_distance(&a, &shifted).unwrap();
        // 12 loop atoms each 1.0 away along the diagonal warping path
        assert!(d > 0.0);
        assert!(d <= 12f64.sqrt() + 1e-4);
        assert_eq!(loop_distance(&shifted, &a).unwrap() > 0.0, true);
    }

    #[test]
    fn test_anchor_split_must_match() {
        // Two start and two end anchors against one start and three end
        let a = build(&structure("a", 0.0, 102), 2);
        let b = build(&structure("b", 0.0, 104), 3);
        assert_eq!(a.anchor_coordinates().len(), b.anchor_coordinates().len());
        assert_eq!((b.num_start_anchors, b.num_end_anchors), (1, 3));
        let err = loop_distance(&a, &b).unwrap_err();
        assert!(matches!(err, LoopwarpError::AnchorMismatch { mobile: (1, 3), target: (2, 2) }));
    }

    #[test]
    fn test_matrix_is_symmetric_and_reports_failed_pairs() {
        // "short" starts right before the loop, so it only has one start anchor
        let structures = vec![
            structure("a", 0.0, 100),
            structure("b", 2.0, 100),
            structure("short", 0.0, 104),
        ];
        let names: Vec<String> = structures.iter().map(|s| s.name.clone()).collect();
        let sink = MemorySink::new();
        let loops = collect_loops(&structures, ChainRole::BetaChain, 3, 2, &sink);
        assert_eq!(loops[2].as_ref().unwrap().num_start_anchors, 1);

        let m = pairwise_distance_matrix(&loops, &names, &sink);
        assert!(m.is_symmetric());
        assert!(m.get(0, 1).is_finite() && m.get(0, 1) > 0.0);
        assert!(m.get(0, 2).is_infinite());
        assert!(m.get(1, 2).is_infinite());
        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.contains("short")));
        assert!(warnings.iter().any(|w| w.contains("a and short")));
    }

    #[test]
    fn test_missing_loop_is_reported_once() {
        let structures = vec![structure("a", 0.0, 100), structure("b", 0.0, 100)];
        let sink = MemorySink::new();
        // No alpha chain in either structure
        let loops = collect_loops(&structures, ChainRole::AlphaChain, 3, 2, &sink);
        assert!(loops.iter().all(|l| l.is_none()));
        assert_eq!(sink.warnings().len(), 2);
        let groups = compute_distance_matrices(&structures, 2, &MemorySink::new());
        assert_eq!(groups.len(), LOOP_GROUPS.len());
        let beta3 = &groups[5];
        assert_eq!((beta3.chain_role, beta3.cdr), (ChainRole::BetaChain, 3));
        assert_eq!(beta3.matrix.get(0, 1), 0.0);
        assert!(groups[0].matrix.get(0, 1).is_infinite());
    }
}
