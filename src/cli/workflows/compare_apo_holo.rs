// File: compare_apo_holo.rs

//! Workflow for measuring differences between apo and holo structures of
//! TCRs, pMHCs and TCR-pMHC complexes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cli::*;
use crate::controller::measure::{compare_collection, write_measurements, CompareConfig, EntitySelection, Measurement};
use crate::error::{LoopwarpError, Result};
use crate::utils::log::{print_log_msg, LogSink, DONE};

pub const HELP_COMPARE: &str = "\
USAGE: loopwarp compare [OPTIONS] <INPUT_DIR>
Options:
    -o, --output <OUTPUT_CSV>                 Path of the measurement table
    -e, --select-entities <ENTITY>            tcr or pmhc
    --pmhc-tcr-contact-residues <RESIDUES>    Comma separated MHC residue codes contacted by the TCR
    -a, --align-entities                      Align each entity before measuring
    -p, --per-residue                         Measure every residue instead of whole entities
    --crop-to-abd                             Restrict MHC chain 1 to the antigen binding domain
    -m, --per-residue-measurements <LIST>     Comma separated: rmsd, ca_distance, chi_angle_change, com_distance or all (default all)
    -t, --threads <THREADS>                   Number of threads to use (default 1)
    -l, --log-level <LEVEL>                   error, warning, info or debug (default warning)
    -h, --help                                Print this help menu
";

/// Check selectors and build the comparison settings. Nothing is read
/// before this succeeds.
pub fn build_compare_config(
    select_entities: &str, tcr_contact_residues: &[String], align_entities: bool, per_residue: bool,
    crop_to_abd: bool, measurements: &[String],
) -> Result<CompareConfig> {
    let entity = EntitySelection::get_with_str(select_entities)
        .ok_or_else(|| LoopwarpError::InvalidInput(format!("unknown entity selection '{}'", select_entities)))?;
    let mut config = CompareConfig::new(entity);
    config.tcr_contact_residues = if tcr_contact_residues.is_empty() {
        None
    } else {
        Some(tcr_contact_residues.to_vec())
    };
    config.align_entities = align_entities;
    config.per_residue = per_residue;
    config.crop_to_abd = crop_to_abd;
    config.measurements = Measurement::parse_list(measurements)?;
    Ok(config)
}

/// Compare a collection directory and write the table to `output`.
/// Returns the number of rows written.
pub fn run_compare(input: &Path, output: &Path, config: &CompareConfig, sink: &dyn LogSink) -> Result<usize> {
    let records = compare_collection(input, config, sink)?;
    sink.info("Outputting results...");
    let mut writer = BufWriter::new(File::create(output)?);
    write_measurements(&mut writer, &records, config)?;
    writer.flush()?;
    Ok(records.len())
}

pub fn compare_apo_holo(env: AppArgs) {
    match env {
        AppArgs::Compare {
            input,
            output,
            select_entities,
            tcr_contact_residues,
            align_entities,
            per_residue,
            crop_to_abd,
            measurements,
            threads,
            log_level,
            help,
        } => {
            if help {
                eprintln!("{}", HELP_COMPARE);
                std::process::exit(0);
            }
            let Some(input) = input else {
                exit_with_error("Input directory is not provided", HELP_COMPARE);
            };
            let Some(output) = output else {
                exit_with_error("Output path is not provided", HELP_COMPARE);
            };
            let Some(select_entities) = select_entities else {
                exit_with_error("--select-entities is required (tcr or pmhc)", HELP_COMPARE);
            };
            let sink = sink_from_level(&log_level).unwrap_or_else(|e| exit_with_error(&e.to_string(), HELP_COMPARE));
            let config = build_compare_config(
                &select_entities, &tcr_contact_residues, align_entities, per_residue, crop_to_abd, &measurements,
            )
            .unwrap_or_else(|e| exit_with_error(&e.to_string(), HELP_COMPARE));
            init_thread_pool(threads);

            match run_compare(Path::new(&input), Path::new(&output), &config, &sink) {
                Ok(n) => print_log_msg(DONE, &format!("{} rows written to {}", n, output)),
                Err(e) => exit_with_error(&e.to_string(), HELP_COMPARE),
            }
        }
        _ => {
            exit_with_error("Invalid subcommand", HELP_COMPARE);
        }
    }
}
