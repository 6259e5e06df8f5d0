// File: residue.rs
// Residue-level constant tables: one-letter codes, chi-1 atoms, atomic weights

/// One-letter code of a standard amino acid three-letter name.
pub fn three_to_one(res_name: &str) -> Option<char> {
    let code = match res_name {
        "ALA" => 'A',
        "ARG" => 'R',
        "ASN" => 'N',
        "ASP" => 'D',
        "CYS" => 'C',
        "GLN" => 'Q',
        "GLU" => 'E',
        "GLY" => 'G',
        "HIS" => 'H',
        "ILE" => 'I',
        "LEU" => 'L',
        "LYS" => 'K',
        "MET" => 'M',
        "PHE" => 'F',
        "PRO" => 'P',
        "SER" => 'S',
        "THR" => 'T',
        "TRP" => 'W',
        "TYR" => 'Y',
        "VAL" => 'V',
        _ => return None,
    };
    Some(code)
}

/// Atoms defining the chi-1 torsion of a residue, as padded PDB names.
/// `None` for residues without a chi-1 (GLY, ALA) and for unknown residues.
pub fn chi1_atoms(res_name: &str) -> Option<[&'static [u8; 4]; 4]> {
    const N: &[u8; 4] = b" N  ";
    const CA: &[u8; 4] = b" CA ";
    const CB: &[u8; 4] = b" CB ";
    let fourth: &'static [u8; 4] = match res_name {
        "ARG" | "ASN" | "ASP" | "GLN" | "GLU" | "HIS" | "LEU" | "LYS" | "MET" | "PHE"
        | "PRO" | "TRP" | "TYR" => b" CG ",
        "CYS" => b" SG ",
        "SER" => b" OG ",
        "THR" => b" OG1",
        "ILE" | "VAL" => b" CG1",
        _ => return None,
    };
    Some([N, CA, CB, fourth])
}

/// Residues that never carry a chi-1 angle
pub fn has_no_chi1(res_name: &str) -> bool {
    matches!(res_name, "GLY" | "ALA")
}

/// Standard atomic weight (g/mol) of an element symbol.
pub fn atomic_weight(element: &str) -> Option<f64> {
    let weight = match element.to_ascii_uppercase().as_str() {
        "H" => 1.008,
        "D" => 2.014,
        "C" => 12.011,
        "N" => 14.007,
        "O" => 15.999,
        "F" => 18.998,
        "NA" => 22.990,
        "MG" => 24.305,
        "P" => 30.974,
        "S" => 32.06,
        "CL" => 35.45,
        "K" => 39.098,
        "CA" => 40.078,
        "MN" => 54.938,
        "FE" => 55.845,
        "CO" => 58.933,
        "NI" => 58.693,
        "CU" => 63.546,
        "ZN" => 65.38,
        "SE" => 78.971,
        "BR" => 79.904,
        "I" => 126.904,
        _ => return None,
    };
    Some(weight)
}
