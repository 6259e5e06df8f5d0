// File: compare_test.rs
// Apo/holo comparison of structure files in a collection directory

mod common;

use loopwarp::cli::workflows::compare_apo_holo::{build_compare_config, run_compare};
use loopwarp::error::LoopwarpError;
use loopwarp::utils::log::MemorySink;

use common::fixtures::{residue_lines, tcr_pdb};
use common::loader::write_file;

const SUMMARY_HEADER: &str =
    "file_name,pdb_id,structure_type,state,alpha_chain,beta_chain,antigen_chain,mhc_chain1,mhc_chain2";

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn ser_gly_pdb(with_og: bool, gly_shift: f32) -> String {
    let mut serial = 1;
    let mut ser_atoms = vec![
        ("N", [0.0, 0.0, 0.0]),
        ("CA", [1.5, 0.0, 0.0]),
        ("C", [2.0, 1.4, 0.0]),
        ("O", [3.2, 1.5, 0.0]),
        ("CB", [1.9, -0.8, 1.2]),
    ];
    if with_og {
        ser_atoms.push(("OG", [3.0, -1.5, 1.4]));
    }
    let gly_atoms: Vec<(&str, [f32; 3])> = [
        ("N", [3.0, 2.5, 0.0]),
        ("CA", [4.0, 3.5, 0.0]),
        ("C", [5.4, 3.0, 0.0]),
        ("O", [6.0, 2.0, 0.0]),
    ]
    .into_iter()
    .map(|(name, [x, y, z])| (name, [x, y, z + gly_shift]))
    .collect();
    let mut lines = residue_lines('E', "SER", 106, &ser_atoms, &mut serial);
    lines.extend(residue_lines('E', "GLY", 107, &gly_atoms, &mut serial));
    lines.push("END".to_string());
    lines.join("\n") + "\n"
}

#[test]
fn test_entity_rmsd_per_cdr() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_file(
        input.path(),
        "apo_holo_summary.csv",
        &format!(
            "{}\n1abc_DE.pdb,1abc,tcr,apo,D,E,,,\n2def_DE.pdb,2def,tcr_pmhc,holo,D,E,C,A,B\n",
            SUMMARY_HEADER
        ),
    );
    write_file(input.path(), "1abc_2def/1abc_DE.pdb", &tcr_pdb(0.0, 20));
    write_file(input.path(), "1abc_2def/2def_DE.pdb", &tcr_pdb(0.5, 20));

    let config = build_compare_config("tcr", &[], false, false, false, &[]).unwrap();
    let out_path = output.path().join("changes.csv");
    let sink = MemorySink::new();
    assert_eq!(run_compare(input.path(), &out_path, &config, &sink).unwrap(), 6);
    assert!(sink.warnings().is_empty(), "{:?}", sink.warnings());

    let text = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "complex_id,structure_x_name,structure_y_name,chain_type,cdr,rmsd");
    assert_eq!(lines.len(), 7);
    let expected_prefixes = [
        "1abc_2def,1abc_DE.pdb,2def_DE.pdb,alpha_chain,1,",
        "1abc_2def,1abc_DE.pdb,2def_DE.pdb,alpha_chain,2,",
        "1abc_2def,1abc_DE.pdb,2def_DE.pdb,alpha_chain,3,",
        "1abc_2def,1abc_DE.pdb,2def_DE.pdb,beta_chain,1,",
        "1abc_2def,1abc_DE.pdb,2def_DE.pdb,beta_chain,2,",
        "1abc_2def,1abc_DE.pdb,2def_DE.pdb,beta_chain,3,",
    ];
    for (line, prefix) in lines[1..].iter().zip(expected_prefixes) {
        assert!(line.starts_with(prefix), "{}", line);
        // Every loop atom moved by 0.5 along z
        let rmsd: f64 = line[prefix.len()..].parse().unwrap();
        assert!((rmsd - 0.5).abs() < 5e-3, "{}", line);
    }

    let aligned = build_compare_config("tcr", &[], true, false, false, &[]).unwrap();
    run_compare(input.path(), &out_path, &aligned, &sink).unwrap();
    let text = std::fs::read_to_string(&out_path).unwrap();
    for line in text.lines().skip(1) {
        let rmsd: f64 = line.rsplit(',').next().unwrap().parse().unwrap();
        assert!(rmsd < 5e-3, "{}", line);
    }
}

#[test]
fn test_per_residue_mismatch_leaves_cell_empty() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_file(
        input.path(),
        "collection_summary.csv",
        &format!("{}\nx_apo.pdb,1xxx,tcr,apo,,E,,,\ny_holo.pdb,2yyy,tcr_pmhc,holo,,E,,,\n", SUMMARY_HEADER),
    );
    write_file(input.path(), "c2/x_apo.pdb", &ser_gly_pdb(false, 0.0));
    write_file(input.path(), "c2/y_holo.pdb", &ser_gly_pdb(true, 0.5));

    let config = build_compare_config("tcr", &[], false, true, false, &strings(&["all"])).unwrap();
    let out_path = output.path().join("changes.csv");
    let sink = MemorySink::new();
    assert_eq!(run_compare(input.path(), &out_path, &config, &sink).unwrap(), 2);

    let text = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "complex_id,structure_x_name,structure_y_name,chain_type,cdr,residue_name,residue_seq_id,\
         residue_insert_code,rmsd,ca_distance,chi_angle_change,com_distance"
    );
    // 5 atoms against 6: no RMSD, and chi-1 needs OG in both
    assert!(lines[1].starts_with("c2,x_apo.pdb,y_holo.pdb,beta_chain,3,SER,106,,,0,,"), "{}", lines[1]);
    let gly: Vec<&str> = lines[2].split(',').collect();
    assert_eq!(&gly[..7], &["c2", "x_apo.pdb", "y_holo.pdb", "beta_chain", "3", "GLY", "107"]);
    assert!((gly[8].parse::<f64>().unwrap() - 0.5).abs() < 1e-3);
    assert!((gly[9].parse::<f64>().unwrap() - 0.5).abs() < 1e-3);
    assert_eq!(gly[10], "");
    assert!((gly[11].parse::<f64>().unwrap() - 0.5).abs() < 1e-3);

    let warnings = sink.warnings();
    assert_eq!(warnings.len(), 2, "{:?}", warnings);
    assert!(warnings.iter().all(|w| w.contains("SER 106")));
}

#[test]
fn test_missing_manifest() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = build_compare_config("pmhc", &[], false, false, false, &[]).unwrap();
    let err = run_compare(input.path(), &output.path().join("changes.csv"), &config, &MemorySink::new()).unwrap_err();
    assert!(matches!(err, LoopwarpError::MissingManifest { .. }));
    assert!(!output.path().join("changes.csv").exists());
}

#[test]
fn test_bad_selectors_are_rejected() {
    assert!(build_compare_config("mhc", &[], false, false, false, &[]).is_err());
    assert!(build_compare_config("tcr", &[], false, true, false, &strings(&["tm_score"])).is_err());
    let config = build_compare_config("pmhc", &strings(&["65", "66"]), false, false, true, &[]).unwrap();
    assert_eq!(config.tcr_contact_residues, Some(strings(&["65", "66"])));
    assert!(config.crop_to_abd);
}
