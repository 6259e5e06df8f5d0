// File: imgt.rs
// IMGT residue-number tables for TCR CDR loops and the MHC class I
// antigen-binding domain

use std::ops::RangeInclusive;

pub const IMGT_CDR1: RangeInclusive<i32> = 27..=38;
pub const IMGT_CDR2: RangeInclusive<i32> = 56..=65;
pub const IMGT_CDR3: RangeInclusive<i32> = 105..=117;

/// Alpha-1 and alpha-2 helices plus the platform beta sheet of mhc_chain1
pub const IMGT_MHC_ABD: RangeInclusive<i32> = 1..=180;

pub const CDR_NUMBERS: [u8; 3] = [1, 2, 3];

/// CDR loop (1, 2 or 3) containing an IMGT residue number, if any.
/// Insertion codes do not change the loop a residue belongs to.
pub fn assign_cdr_number(res_serial: i32) -> Option<u8> {
    if IMGT_CDR1.contains(&res_serial) {
        Some(1)
    } else if IMGT_CDR2.contains(&res_serial) {
        Some(2)
    } else if IMGT_CDR3.contains(&res_serial) {
        Some(3)
    } else {
        None
    }
}

pub fn in_mhc_abd(res_serial: i32) -> bool {
    IMGT_MHC_ABD.contains(&res_serial)
}
