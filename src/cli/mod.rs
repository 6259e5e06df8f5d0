//! Command line interface for Loopwarp

// File: mod.rs
// Arguments of CLI app are defined here

pub mod config;
pub mod workflows;

use crate::error::{LoopwarpError, Result};
use crate::utils::log::{print_log_msg, LogLevel, StderrSink, FAIL};

pub enum AppArgs {
    Global {
        help: bool,
    },
    Distances {
        stcrdab_path: Option<String>,
        output: Option<String>,
        resolution_cutoff: f64,
        anchor_count: usize,
        compress_output: bool,
        threads: usize,
        log_level: String,
        help: bool,
    },
    Cluster {
        structure_names: Option<String>,
        matrices: Vec<String>,
        output: Option<String>,
        assign_cluster_types: bool,
        stcrdab_path: Option<String>,
        min_cluster_size: usize,
        min_samples: Option<usize>,
        threads: usize,
        log_level: String,
        help: bool,
    },
    Compare {
        input: Option<String>,
        output: Option<String>,
        select_entities: Option<String>,
        // MHC residue codes contacted by the TCR, e.g. 65, 66, 155A
        tcr_contact_residues: Vec<String>,
        align_entities: bool,
        per_residue: bool,
        crop_to_abd: bool,
        measurements: Vec<String>,
        threads: usize,
        log_level: String,
        help: bool,
    },
}

/// Split comma separated option values, dropping empty items.
pub fn split_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Stderr sink for a `--log-level` value
pub fn sink_from_level(level: &str) -> Result<StderrSink> {
    LogLevel::get_with_str(level)
        .map(StderrSink::new)
        .ok_or_else(|| LoopwarpError::InvalidInput(format!("unknown log level '{}'", level)))
}

/// Print a FAIL line with the help text and exit with status 1.
pub fn exit_with_error(msg: &str, help: &str) -> ! {
    print_log_msg(FAIL, msg);
    eprintln!("{}", help);
    std::process::exit(1);
}

/// Build the global rayon pool. A pool that was already built is kept.
pub fn init_thread_pool(threads: usize) {
    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
        print_log_msg(crate::utils::log::WARN, &format!("Thread pool already initialized: {}", e));
    }
}

pub fn print_logo() {
    let logo = [
        "",
        "\x1b[91m░█░░░█▀█░█▀█░█▀█░\x1b[93m█░█░█▀█░█▀▄░█▀█\x1b[0m",
        "\x1b[91m░█░░░█░█░█░█░█▀▀░\x1b[93m█▄█░█▀█░█▀▄░█▀▀\x1b[0m",
        "\x1b[91m░▀▀▀░▀▀▀░▀▀▀░▀░░░\x1b[93m▀░▀░▀░▀░▀░▀░▀░░\x1b[0m",
        "",
    ];

    for line in &logo {
        eprintln!("{}", line);
    }
}
