// File: compute_distances.rs

//! Workflow for the pairwise CDR loop distance matrices.
//! Reads the STCRDab summary, keeps alpha/beta TCRs at or below the
//! resolution cutoff and writes one DTW distance matrix per (chain, CDR)
//! group together with the structure order and the run parameters.

use std::path::Path;

use peak_alloc::PeakAlloc;

use crate::cli::config::{write_distance_config_to_file, DistanceConfig, DISTANCE_CONFIG_FILE};
use crate::cli::*;
use crate::controller::distance::{compute_distance_matrices, load_stcrdab_structures};
use crate::controller::matrix::{matrix_file_name, write_matrix, write_structure_names, STRUCTURE_NAMES_FILE};
use crate::controller::source::DirectorySource;
use crate::controller::summary::{read_stcrdab_summary, select_stcrdab_entries};
use crate::error::Result;
use crate::measure_time;
use crate::utils::log::{print_log_msg, LogSink, DONE};

#[global_allocator]
static PEAK_ALLOC: PeakAlloc = PeakAlloc;

pub const HELP_DISTANCES: &str = "\
USAGE: loopwarp distances [OPTIONS] <STCRDAB_DIR>
Options:
    -o, --output <OUTPUT_DIR>        Directory to write the matrices to
    -r, --resolution-cutoff <RES>    Maximum resolution of the structures (default 3.50)
    -n, --number-of-anchors <NUM>    Anchor residues on each side of a loop (default 5)
    -z, --compress-output            Gzip the output matrices
    -t, --threads <THREADS>          Number of threads to use (default 1)
    -l, --log-level <LEVEL>          error, warning, info or debug (default warning)
    -h, --help                       Print this help menu
";

/// Compute and write the six distance matrices. Returns the names of the
/// structures in matrix order.
pub fn run_distances(config: &DistanceConfig, output: &Path, sink: &dyn LogSink) -> Result<Vec<String>> {
    let stcrdab = Path::new(&config.stcrdab_path);
    let entries = select_stcrdab_entries(read_stcrdab_summary(stcrdab)?, config.resolution_cutoff);
    sink.info(&format!("{} structures pass the resolution cutoff", entries.len()));

    let source = DirectorySource::new(stcrdab);
    let structures = measure_time!(sink, "Loading structures", load_stcrdab_structures(&source, &entries, sink));
    let names: Vec<String> = structures.iter().map(|s| s.name.clone()).collect();
    sink.info(&format!(
        "{} structures loaded (Allocated {}MB)", structures.len(), PEAK_ALLOC.current_usage_as_mb()
    ));

    std::fs::create_dir_all(output)?;
    write_structure_names(output.join(STRUCTURE_NAMES_FILE), &names)?;

    let groups = measure_time!(
        sink, "Computing distances", compute_distance_matrices(&structures, config.anchor_count, sink)
    );
    for group in &groups {
        let path = output.join(matrix_file_name(group.chain_role, group.cdr, config.compress_output));
        sink.info(&format!("Writing {}", path.display()));
        write_matrix(&path, &group.matrix)?;
    }
    write_distance_config_to_file(output.join(DISTANCE_CONFIG_FILE), config)?;
    sink.info(&format!("Peak memory usage: {}MB", PEAK_ALLOC.peak_usage_as_mb()));
    Ok(names)
}

pub fn compute_distances(env: AppArgs) {
    match env {
        AppArgs::Distances {
            stcrdab_path,
            output,
            resolution_cutoff,
            anchor_count,
            compress_output,
            threads,
            log_level,
            help,
        } => {
            if help {
                eprintln!("{}", HELP_DISTANCES);
                std::process::exit(0);
            }
            let Some(stcrdab_path) = stcrdab_path else {
                exit_with_error("Path to the STCRDab is not provided", HELP_DISTANCES);
            };
            let Some(output) = output else {
                exit_with_error("Output directory is not provided", HELP_DISTANCES);
            };
            let sink = sink_from_level(&log_level).unwrap_or_else(|e| exit_with_error(&e.to_string(), HELP_DISTANCES));
            init_thread_pool(threads);

            let config = DistanceConfig::new(&stcrdab_path, resolution_cutoff, anchor_count, compress_output, threads);
            match run_distances(&config, Path::new(&output), &sink) {
                Ok(names) => print_log_msg(DONE, &format!("Distance matrices of {} structures written to {}", names.len(), output)),
                Err(e) => exit_with_error(&e.to_string(), HELP_DISTANCES),
            }
        }
        _ => {
            exit_with_error("Invalid subcommand", HELP_DISTANCES);
        }
    }
}
