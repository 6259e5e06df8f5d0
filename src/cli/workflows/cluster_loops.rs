// File: cluster_loops.rs

//! Workflow for clustering CDR loop conformations.
//! Every distance matrix is clustered with HDBSCAN; optionally the clusters
//! are typed as canonical or pseudo from the loop sequences in the STCRDab.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::annotation::{AnnotatedStructure, ChainIds};
use crate::cli::config::ClusterConfig;
use crate::cli::*;
use crate::cluster::hdbscan::Hdbscan;
use crate::cluster::{assign_cluster_types, ClusterAssignment};
use crate::controller::distance::load_annotated;
use crate::controller::matrix::{parse_matrix_file_name, read_matrix, read_structure_names};
use crate::controller::source::{DirectorySource, StructureSource};
use crate::error::{LoopwarpError, Result};
use crate::utils::formatter::{Column, CsvFormatter, Value};
use crate::utils::log::{print_log_msg, LogSink, DONE};

pub const HELP_CLUSTER: &str = "\
USAGE: loopwarp cluster [OPTIONS] <STRUCTURE_NAMES> <DISTANCE_MATRICES...>
Options:
    -o, --output <OUTPUT_CSV>          Path of the cluster table
    -c, --assign-cluster-types         Label clusters as canonical or pseudo (needs --stcrdab-path)
    -s, --stcrdab-path <STCRDAB_DIR>   STCRDab directory holding imgt/<pdb>.pdb files
    -m, --min-cluster-size <SIZE>      Smallest cluster HDBSCAN reports (default 5)
    --min-samples <SAMPLES>            Neighbourhood size of core distances (default: min cluster size)
    -t, --threads <THREADS>            Number of threads to use (default 1)
    -l, --log-level <LEVEL>            error, warning, info or debug (default warning)
    -h, --help                         Print this help menu
";

/// `<pdb>_<alpha chain><beta chain>` into its parts
pub fn parse_structure_name(name: &str) -> Result<(String, u8, u8)> {
    let invalid = || LoopwarpError::InvalidInput(format!("'{}' is not a <pdb>_<alpha><beta> structure name", name));
    let (pdb, chains) = name.split_once('_').ok_or_else(invalid)?;
    match chains.as_bytes() {
        [alpha, beta] if !pdb.is_empty() => Ok((pdb.to_string(), *alpha, *beta)),
        _ => Err(invalid()),
    }
}

/// Load and annotate the STCRDab structure behind every name. Structures
/// that cannot be loaded are reported and left out.
pub fn load_named_structures(
    source: &dyn StructureSource, names: &[String], sink: &dyn LogSink,
) -> FxHashMap<String, AnnotatedStructure> {
    names
        .par_iter()
        .filter_map(|name| {
            let loaded = parse_structure_name(name).and_then(|(pdb, alpha, beta)| {
                load_annotated(source, &format!("imgt/{}.pdb", pdb), name, &ChainIds::tcr(alpha, beta), sink)
            });
            match loaded {
                Ok(structure) => Some((name.clone(), structure)),
                Err(e) => {
                    sink.warn(&format!("No CDR sequences for {}: {}", name, e));
                    None
                }
            }
        })
        .collect()
}

/// Fill the loop sequence of every assignment. A loop that is absent from
/// its structure keeps `None`.
pub fn attach_sequences(assignments: &mut [ClusterAssignment], structures: &FxHashMap<String, AnnotatedStructure>) {
    for assignment in assignments.iter_mut() {
        assignment.sequence = structures
            .get(&assignment.name)
            .map(|s| s.cdr_sequence(assignment.chain_role, assignment.cdr))
            .filter(|seq| !seq.is_empty());
    }
}

/// Cluster every matrix. Each matrix must have one row per structure name.
pub fn run_cluster(
    names_path: &Path, matrix_paths: &[String], config: &ClusterConfig, sink: &dyn LogSink,
) -> Result<Vec<ClusterAssignment>> {
    config.validate()?;
    sink.info(&format!("Loading structure names from {}", names_path.display()));
    let names = read_structure_names(names_path)?;
    let hdbscan = Hdbscan {
        min_cluster_size: config.min_cluster_size,
        min_samples: config.min_samples.unwrap_or(config.min_cluster_size),
        allow_single_cluster: false,
    };

    let mut assignments = Vec::new();
    for path in matrix_paths {
        let (chain_role, cdr) = parse_matrix_file_name(path)?;
        sink.info(&format!("Loading CDR{} {} distance matrix", cdr, chain_role.short_name()));
        let matrix = read_matrix(path)?;
        if matrix.size() != names.len() {
            return Err(LoopwarpError::InvalidInput(format!(
                "{} has {} rows but there are {} structure names", path, matrix.size(), names.len()
            )));
        }
        sink.info("Clustering loops");
        let labels = hdbscan.fit_precomputed(&matrix);
        assignments.extend(
            names.iter().zip(labels).map(|(name, label)| ClusterAssignment::new(name, chain_role, cdr, label)),
        );
    }

    if config.assign_cluster_types {
        sink.info("Assigning cluster types");
        let stcrdab = config.stcrdab_path.as_deref().unwrap_or_default();
        let structures = load_named_structures(&DirectorySource::new(stcrdab), &names, sink);
        attach_sequences(&mut assignments, &structures);
        assign_cluster_types(&mut assignments, config.min_unique_sequences);
    }
    Ok(assignments)
}

pub fn cluster_columns(with_types: bool) -> Vec<Column<ClusterAssignment>> {
    let mut columns: Vec<Column<ClusterAssignment>> = vec![
        Column::new("name", "Structure name", |a: &ClusterAssignment| Value::from(a.name.as_str())),
        Column::new("cluster", "Cluster id or noise", |a: &ClusterAssignment| Value::from(a.cluster.to_string())),
        Column::new("chain_type", "Chain role", |a: &ClusterAssignment| Value::from(a.chain_role.as_str())),
        Column::new("cdr", "CDR loop", |a: &ClusterAssignment| Value::from(a.cdr)),
    ];
    if with_types {
        columns.push(Column::new("sequence", "Loop sequence", |a: &ClusterAssignment| {
            Value::from(a.sequence.clone())
        }));
        columns.push(Column::new("cluster_type", "Canonical or pseudo", |a: &ClusterAssignment| {
            Value::from(a.cluster_type.map(|t| t.as_str()))
        }));
    }
    columns
}

pub fn write_cluster_assignments<W: Write>(writer: W, assignments: &[ClusterAssignment], with_types: bool) -> Result<()> {
    CsvFormatter::new(cluster_columns(with_types)).write_all(writer, assignments)?;
    Ok(())
}

pub fn cluster_loops(env: AppArgs) {
    match env {
        AppArgs::Cluster {
            structure_names,
            matrices,
            output,
            assign_cluster_types,
            stcrdab_path,
            min_cluster_size,
            min_samples,
            threads,
            log_level,
            help,
        } => {
            if help {
                eprintln!("{}", HELP_CLUSTER);
                std::process::exit(0);
            }
            let Some(structure_names) = structure_names else {
                exit_with_error("Structure names file is not provided", HELP_CLUSTER);
            };
            if matrices.is_empty() {
                exit_with_error("No distance matrices given", HELP_CLUSTER);
            }
            let Some(output) = output else {
                exit_with_error("Output path is not provided", HELP_CLUSTER);
            };
            let sink = sink_from_level(&log_level).unwrap_or_else(|e| exit_with_error(&e.to_string(), HELP_CLUSTER));
            init_thread_pool(threads);

            let config = ClusterConfig {
                min_cluster_size,
                min_samples,
                assign_cluster_types,
                stcrdab_path,
                ..ClusterConfig::default()
            };
            let written = run_cluster(Path::new(&structure_names), &matrices, &config, &sink).and_then(|assignments| {
                sink.info(&format!("Outputting clusters to {}", output));
                let mut writer = BufWriter::new(File::create(&output)?);
                write_cluster_assignments(&mut writer, &assignments, assign_cluster_types)?;
                writer.flush()?;
                Ok(assignments.len())
            });
            match written {
                Ok(n) => print_log_msg(DONE, &format!("{} cluster assignments written to {}", n, output)),
                Err(e) => exit_with_error(&e.to_string(), HELP_CLUSTER),
            }
        }
        _ => {
            exit_with_error("Invalid subcommand", HELP_CLUSTER);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::ChainRole;
    use crate::cluster::{ClusterLabel, ClusterType};

    #[test]
    fn test_parse_structure_name() {
        assert_eq!(parse_structure_name("1abc_DE").unwrap(), ("1abc".to_string(), b'D', b'E'));
        assert!(parse_structure_name("1abc").is_err());
        assert!(parse_structure_name("1abc_DEF").is_err());
        assert!(parse_structure_name("_DE").is_err());
    }

    #[test]
    fn test_write_cluster_assignments() {
        let mut typed = ClusterAssignment::new("1abc_DE", ChainRole::BetaChain, 3, ClusterLabel::Cluster(0));
        typed.sequence = Some("ASSL".to_string());
        typed.cluster_type = Some(ClusterType::Pseudo);
        let noise = ClusterAssignment::new("2bcd_AB", ChainRole::BetaChain, 3, ClusterLabel::Noise);

        let mut out = Vec::new();
        write_cluster_assignments(&mut out, &[typed.clone(), noise.clone()], true).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name,cluster,chain_type,cdr,sequence,cluster_type\n\
             1abc_DE,0,beta_chain,3,ASSL,pseudo\n\
             2bcd_AB,noise,beta_chain,3,,\n"
        );

        let mut out = Vec::new();
        write_cluster_assignments(&mut out, &[noise], false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "name,cluster,chain_type,cdr\n2bcd_AB,noise,beta_chain,3\n");
    }
}
