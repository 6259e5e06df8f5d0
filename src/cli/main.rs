// File: main.rs
// Entry point of the loopwarp binary

use loopwarp::cli::workflows::cluster_loops::cluster_loops;
use loopwarp::cli::workflows::compare_apo_holo::compare_apo_holo;
use loopwarp::cli::workflows::compute_distances::compute_distances;
use loopwarp::cli::{print_logo, split_list, AppArgs};
use loopwarp::cluster::hdbscan::DEFAULT_MIN_CLUSTER_SIZE;
use loopwarp::controller::summary::DEFAULT_RESOLUTION_CUTOFF;
use loopwarp::geometry::anchor::DEFAULT_ANCHOR_COUNT;
use loopwarp::utils::log::{print_log_msg, FAIL};

const HELP: &str = "\
USAGE: loopwarp distances [OPTIONS] <STCRDAB_DIR>
       loopwarp cluster [OPTIONS] <STRUCTURE_NAMES> <DISTANCE_MATRICES...>
       loopwarp compare [OPTIONS] <INPUT_DIR>

SUBCOMMANDS:
  distances   Pairwise DTW distances between CDR loops of the STCRDab
  cluster     Cluster CDR loops and label canonical or pseudo clusters
  compare     Measure differences between apo and holo structures
OPTIONS:
  -h, --help  Print this help menu
";

const DEFAULT_LOG_LEVEL: &str = "warning";

fn parse_arg() -> Result<AppArgs, Box<dyn std::error::Error>> {
    let mut args = pico_args::Arguments::from_env();
    let subcommand = args.subcommand()?;
    let parsed = match subcommand.as_deref() {
        Some("distances") => AppArgs::Distances {
            output: args.opt_value_from_str(["-o", "--output"])?,
            resolution_cutoff: args
                .opt_value_from_str(["-r", "--resolution-cutoff"])?
                .unwrap_or(DEFAULT_RESOLUTION_CUTOFF),
            anchor_count: args.opt_value_from_str(["-n", "--number-of-anchors"])?.unwrap_or(DEFAULT_ANCHOR_COUNT),
            compress_output: args.contains(["-z", "--compress-output"]),
            threads: args.opt_value_from_str(["-t", "--threads"])?.unwrap_or(1),
            log_level: args
                .opt_value_from_str(["-l", "--log-level"])?
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            help: args.contains(["-h", "--help"]),
            stcrdab_path: args.opt_free_from_str()?,
        },
        Some("cluster") => AppArgs::Cluster {
            output: args.opt_value_from_str(["-o", "--output"])?,
            assign_cluster_types: args.contains(["-c", "--assign-cluster-types"]),
            stcrdab_path: args.opt_value_from_str(["-s", "--stcrdab-path"])?,
            min_cluster_size: args
                .opt_value_from_str(["-m", "--min-cluster-size"])?
                .unwrap_or(DEFAULT_MIN_CLUSTER_SIZE),
            min_samples: args.opt_value_from_str("--min-samples")?,
            threads: args.opt_value_from_str(["-t", "--threads"])?.unwrap_or(1),
            log_level: args
                .opt_value_from_str(["-l", "--log-level"])?
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            help: args.contains(["-h", "--help"]),
            structure_names: args.opt_free_from_str()?,
            matrices: Vec::new(),
        },
        Some("compare") => AppArgs::Compare {
            output: args.opt_value_from_str(["-o", "--output"])?,
            select_entities: args.opt_value_from_str(["-e", "--select-entities"])?,
            tcr_contact_residues: split_list(&args.values_from_str("--pmhc-tcr-contact-residues")?),
            align_entities: args.contains(["-a", "--align-entities"]),
            per_residue: args.contains(["-p", "--per-residue"]),
            crop_to_abd: args.contains("--crop-to-abd"),
            measurements: split_list(&args.values_from_str(["-m", "--per-residue-measurements"])?),
            threads: args.opt_value_from_str(["-t", "--threads"])?.unwrap_or(1),
            log_level: args
                .opt_value_from_str(["-l", "--log-level"])?
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            help: args.contains(["-h", "--help"]),
            input: args.opt_free_from_str()?,
        },
        Some(other) => return Err(format!("Invalid subcommand: {}", other).into()),
        None => AppArgs::Global { help: args.contains(["-h", "--help"]) },
    };

    // Remaining free arguments are the distance matrices of `cluster`
    let rest: Vec<String> = args
        .finish()
        .into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    match parsed {
        AppArgs::Cluster {
            structure_names, output, assign_cluster_types, stcrdab_path, min_cluster_size, min_samples,
            threads, log_level, help, ..
        } => Ok(AppArgs::Cluster {
            structure_names,
            matrices: rest,
            output,
            assign_cluster_types,
            stcrdab_path,
            min_cluster_size,
            min_samples,
            threads,
            log_level,
            help,
        }),
        other => {
            if !rest.is_empty() {
                return Err(format!("Unexpected arguments: {}", rest.join(" ")).into());
            }
            Ok(other)
        }
    }
}

fn main() {
    let parsed_args = parse_arg().unwrap_or_else(|e| {
        print_log_msg(FAIL, &e.to_string());
        eprintln!("{}", HELP);
        std::process::exit(1);
    });
    match parsed_args {
        AppArgs::Global { help } => {
            print_logo();
            if help {
                eprintln!("{}", HELP);
            } else {
                eprintln!("No subcommand specified. Try `loopwarp --help` for more information.");
            }
        }
        args @ AppArgs::Distances { .. } => compute_distances(args),
        args @ AppArgs::Cluster { .. } => cluster_loops(args),
        args @ AppArgs::Compare { .. } => compare_apo_holo(args),
    }
}
