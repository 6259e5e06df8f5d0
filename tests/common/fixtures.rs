// File: fixtures.rs
// Synthetic TCR structures written as PDB text

const RESIDUE_CYCLE: [&str; 5] = ["ALA", "SER", "GLY", "LEU", "TYR"];
const BACKBONE: [(&str, [f32; 3]); 4] = [
    ("N", [-0.6, 0.4, 0.2]),
    ("CA", [0.0, 0.0, 0.0]),
    ("C", [0.7, 0.5, -0.3]),
    ("O", [0.9, 1.6, -0.2]),
];

/// One ATOM record with PDB column layout
pub fn pdb_line(serial: usize, atom_name: &str, res_name: &str, chain: char, seq: i32, xyz: [f32; 3]) -> String {
    let name = if atom_name.len() < 4 { format!(" {:<3}", atom_name) } else { atom_name.to_string() };
    let element = &atom_name[..1];
    format!(
        "ATOM  {:>5} {:<4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
        serial, name, res_name, chain, seq, xyz[0], xyz[1], xyz[2], 1.0, 0.0, element
    )
}

fn in_cdr(seq: i32) -> bool {
    (27..=38).contains(&seq) || (56..=65).contains(&seq) || (105..=117).contains(&seq)
}

/// Backbone-only chain of residues `first..=last`. Every atom of a CDR
/// residue is moved by `loop_shift` along z; everything else is identical
/// between calls.
pub fn chain_lines(chain: char, first: i32, last: i32, loop_shift: f32, serial: &mut usize) -> Vec<String> {
    let mut lines = Vec::new();
    for seq in first..=last {
        let k = seq as f32;
        let base = [1.5 * k, 3.0 * (0.6 * k).sin(), 3.0 * (0.6 * k).cos()];
        let shift = if in_cdr(seq) { loop_shift } else { 0.0 };
        let res_name = RESIDUE_CYCLE[seq.rem_euclid(RESIDUE_CYCLE.len() as i32) as usize];
        for (atom_name, offset) in BACKBONE {
            let xyz = [base[0] + offset[0], base[1] + offset[1], base[2] + offset[2] + shift];
            lines.push(pdb_line(*serial, atom_name, res_name, chain, seq, xyz));
            *serial += 1;
        }
    }
    lines
}

/// Alpha chain D and beta chain E covering all three CDRs with at least
/// five flanking residues on each side. The beta chain starts at
/// `beta_first`.
pub fn tcr_pdb(loop_shift: f32, beta_first: i32) -> String {
    let mut serial = 1;
    let mut lines = chain_lines('D', 20, 125, loop_shift, &mut serial);
    lines.push("TER".to_string());
    lines.extend(chain_lines('E', beta_first, 125, loop_shift, &mut serial));
    lines.push("TER".to_string());
    lines.push("END".to_string());
    lines.join("\n") + "\n"
}

/// One residue with the given atoms, as PDB text lines
pub fn residue_lines(
    chain: char, res_name: &str, seq: i32, atoms: &[(&str, [f32; 3])], serial: &mut usize,
) -> Vec<String> {
    atoms
        .iter()
        .map(|(name, xyz)| {
            let line = pdb_line(*serial, name, res_name, chain, seq, *xyz);
            *serial += 1;
            line
        })
        .collect()
}
