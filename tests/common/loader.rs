// File: loader.rs
// Write synthetic STCRDab and apo/holo collections into temporary directories

use std::path::Path;

use super::fixtures::tcr_pdb;

pub const STCRDAB_HEADER: &str = "pdb\tBchain\tAchain\tTCRtype\tantigen_chain\tmhc_chain1\tmhc_chain2\tresolution";

/// (pdb id, loop shift, first residue of the beta chain, TCR type, resolution)
pub type StcrdabFixture<'a> = (&'a str, f32, i32, &'a str, &'a str);

/// Create `db_summary.dat` and `imgt/<pdb>.pdb` for every fixture. Every
/// structure has alpha chain D and beta chain E.
pub fn write_stcrdab(dir: &Path, fixtures: &[StcrdabFixture]) {
    std::fs::create_dir_all(dir.join("imgt")).expect("Unable to create imgt directory");
    let mut summary = vec![STCRDAB_HEADER.to_string()];
    for (pdb, shift, beta_first, tcr_type, resolution) in fixtures {
        summary.push(format!("{}\tE\tD\t{}\tC\tA\tB\t{}", pdb, tcr_type, resolution));
        std::fs::write(dir.join("imgt").join(format!("{}.pdb", pdb)), tcr_pdb(*shift, *beta_first))
            .expect("Unable to write structure");
    }
    std::fs::write(dir.join("db_summary.dat"), summary.join("\n") + "\n").expect("Unable to write summary");
}

/// Four clean structures: `1aaa` and `2bbb` are identical, `3ccc` and `4ddd`
/// have every loop moved by 8.0 and 8.5 along z. Two more entries are
/// filtered out by TCR type and resolution.
pub fn four_structure_stcrdab() -> Vec<StcrdabFixture<'static>> {
    vec![
        ("1aaa", 0.0, 20, "abTCR", "2.10"),
        ("2bbb", 0.0, 20, "abTCR", "2.50"),
        ("9gdt", 0.0, 20, "gdTCR", "1.80"),
        ("3ccc", 8.0, 20, "abTCR", "3.50"),
        ("8low", 0.0, 20, "abTCR", "3.90"),
        ("4ddd", 8.5, 20, "abTCR", "2.90"),
    ]
}

/// Write a PDB text file below `dir`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, text: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Unable to create directory");
    }
    std::fs::write(path, text).expect("Unable to write file");
}
