// File: end_to_end.rs
// Distance matrices and clustering on a synthetic STCRDab directory

mod common;

use std::path::Path;

use loopwarp::annotation::ChainRole;
use loopwarp::cli::config::{read_distance_config_from_file, ClusterConfig, DistanceConfig, DISTANCE_CONFIG_FILE};
use loopwarp::cli::workflows::cluster_loops::{run_cluster, write_cluster_assignments};
use loopwarp::cli::workflows::compute_distances::run_distances;
use loopwarp::cluster::{ClusterLabel, ClusterType};
use loopwarp::controller::matrix::{matrix_file_name, read_matrix, read_structure_names, STRUCTURE_NAMES_FILE};
use loopwarp::utils::log::MemorySink;

use common::loader::{four_structure_stcrdab, write_stcrdab};

fn all_matrix_paths(dir: &Path, compress: bool) -> Vec<String> {
    let mut paths = Vec::new();
    for role in ChainRole::TCR {
        for cdr in 1..=3 {
            paths.push(dir.join(matrix_file_name(role, cdr, compress)).to_string_lossy().into_owned());
        }
    }
    paths
}

#[test]
fn test_distances_then_clusters() {
    let stcrdab = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_stcrdab(stcrdab.path(), &four_structure_stcrdab());

    let config = DistanceConfig {
        stcrdab_path: stcrdab.path().to_string_lossy().into_owned(),
        ..Default::default()
    };
    let sink = MemorySink::new();
    let names = run_distances(&config, output.path(), &sink).unwrap();
    // gdTCR and the 3.9 Å entry are filtered, 3.5 Å sits on the cutoff
    assert_eq!(names, vec!["1aaa_DE", "2bbb_DE", "3ccc_DE", "4ddd_DE"]);
    assert!(sink.warnings().is_empty(), "{:?}", sink.warnings());
    assert_eq!(read_structure_names(output.path().join(STRUCTURE_NAMES_FILE)).unwrap(), names);
    assert_eq!(read_distance_config_from_file(output.path().join(DISTANCE_CONFIG_FILE)).unwrap(), config);

    for path in all_matrix_paths(output.path(), false) {
        let matrix = read_matrix(&path).unwrap();
        assert_eq!(matrix.size(), 4);
        assert!(matrix.is_symmetric());
        assert!((0..4).all(|i| matrix.get(i, i) == 0.0));
        // Identical structures, then a small and a large loop move
        assert!(matrix.get(0, 1) < 1e-6, "{}: {}", path, matrix.get(0, 1));
        assert!(matrix.get(2, 3) > 0.0 && matrix.get(2, 3) < 5.0, "{}: {}", path, matrix.get(2, 3));
        assert!(matrix.get(0, 2) > 3.0 * matrix.get(2, 3), "{}: {}", path, matrix.get(0, 2));
    }

    let cluster_config = ClusterConfig {
        min_cluster_size: 2,
        // Each group has one neighbour besides the point itself
        min_samples: Some(1),
        assign_cluster_types: true,
        stcrdab_path: Some(stcrdab.path().to_string_lossy().into_owned()),
        ..Default::default()
    };
    let assignments = run_cluster(
        &output.path().join(STRUCTURE_NAMES_FILE),
        &all_matrix_paths(output.path(), false),
        &cluster_config,
        &sink,
    )
    .unwrap();
    assert_eq!(assignments.len(), 24);
    for group in assignments.chunks(4) {
        assert!(group.iter().all(|a| a.cluster != ClusterLabel::Noise));
        assert_eq!(group[0].cluster, group[1].cluster);
        assert_eq!(group[2].cluster, group[3].cluster);
        assert_ne!(group[0].cluster, group[2].cluster);
        // Every loop has the same sequence, so no cluster is canonical
        assert!(group.iter().all(|a| a.cluster_type == Some(ClusterType::Pseudo)));
        assert!(group.iter().all(|a| a.sequence.as_deref().is_some_and(|s| !s.is_empty())));
    }

    let mut csv = Vec::new();
    write_cluster_assignments(&mut csv, &assignments, true).unwrap();
    let text = String::from_utf8(csv).unwrap();
    assert_eq!(text.lines().count(), 25);
    assert!(text.lines().skip(1).all(|line| line.contains("pseudo")));
}

#[test]
fn test_compressed_matrices_cluster_without_types() {
    let stcrdab = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_stcrdab(stcrdab.path(), &four_structure_stcrdab());

    let config = DistanceConfig {
        stcrdab_path: stcrdab.path().to_string_lossy().into_owned(),
        compress_output: true,
        ..Default::default()
    };
    let sink = MemorySink::new();
    run_distances(&config, output.path(), &sink).unwrap();
    let paths = all_matrix_paths(output.path(), true);
    assert!(paths.iter().all(|p| p.ends_with(".gz") && Path::new(p).exists()));

    let cluster_config = ClusterConfig { min_cluster_size: 2, ..Default::default() };
    let assignments =
        run_cluster(&output.path().join(STRUCTURE_NAMES_FILE), &paths[5..], &cluster_config, &sink).unwrap();
    assert_eq!(assignments.len(), 4);
    assert!(assignments.iter().all(|a| a.chain_role == ChainRole::BetaChain && a.cdr == 3));
    assert!(assignments.iter().all(|a| a.cluster_type.is_none() && a.sequence.is_none()));
}

#[test]
fn test_truncated_chain_gives_infinite_distances() {
    let stcrdab = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    // 5sht's beta chain starts two residues before CDR3
    write_stcrdab(
        stcrdab.path(),
        &[("1aaa", 0.0, 20, "abTCR", "2.0"), ("3ccc", 5.0, 20, "abTCR", "2.0"), ("5sht", 0.0, 103, "abTCR", "2.0")],
    );
    let config = DistanceConfig {
        stcrdab_path: stcrdab.path().to_string_lossy().into_owned(),
        ..Default::default()
    };
    let sink = MemorySink::new();
    let names = run_distances(&config, output.path(), &sink).unwrap();
    assert_eq!(names, vec!["1aaa_DE", "3ccc_DE", "5sht_DE"]);

    let cdr3_beta = read_matrix(output.path().join(matrix_file_name(ChainRole::BetaChain, 3, false))).unwrap();
    assert!(cdr3_beta.get(0, 1).is_finite());
    assert!(cdr3_beta.get(0, 2).is_infinite());
    assert!(cdr3_beta.get(2, 1).is_infinite());
    assert_eq!(cdr3_beta.get(2, 2), 0.0);

    let cdr1_beta = read_matrix(output.path().join(matrix_file_name(ChainRole::BetaChain, 1, false))).unwrap();
    assert!(cdr1_beta.get(0, 2).is_infinite());
    let cdr3_alpha = read_matrix(output.path().join(matrix_file_name(ChainRole::AlphaChain, 3, false))).unwrap();
    assert!(cdr3_alpha.get(0, 2) < 1e-6);

    let warnings = sink.warnings();
    assert!(warnings.iter().all(|w| w.contains("5sht_DE")), "{:?}", warnings);
    // Two missing loops plus two failed CDR3 beta comparisons
    assert_eq!(warnings.len(), 4, "{:?}", warnings);
}

#[test]
fn test_missing_summary_is_an_error() {
    let stcrdab = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = DistanceConfig {
        stcrdab_path: stcrdab.path().to_string_lossy().into_owned(),
        ..Default::default()
    };
    assert!(run_distances(&config, output.path(), &MemorySink::new()).is_err());
}

#[test]
fn test_matrix_size_must_match_names() {
    let stcrdab = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_stcrdab(stcrdab.path(), &four_structure_stcrdab());
    let config = DistanceConfig {
        stcrdab_path: stcrdab.path().to_string_lossy().into_owned(),
        ..Default::default()
    };
    run_distances(&config, output.path(), &MemorySink::new()).unwrap();
    let names_path = output.path().join(STRUCTURE_NAMES_FILE);
    std::fs::write(&names_path, "1aaa_DE\n2bbb_DE\n").unwrap();

    let cluster_config = ClusterConfig { min_cluster_size: 2, ..Default::default() };
    let result = run_cluster(&names_path, &all_matrix_paths(output.path(), false), &cluster_config, &MemorySink::new());
    assert!(result.is_err());
}
