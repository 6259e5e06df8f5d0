// File: metrics.rs
// Description: Residue and entity level structural differences
//   - RMSD: over positionally matched points, or over atom-name matched residues
//   - CA distance: between the single CA atoms of two residues
//   - Centre-of-mass distance: mass-weighted by standard atomic weights
//   - Chi-1 change: signed torsion difference wrapped to [-180, 180)
//
// Every function returns `Result`; callers in the measurement workflow turn
// an error into a missing value and a warning.

use crate::error::{LoopwarpError, Result};
use crate::structure::coordinate::{
    calc_torsion_angle, squared_distance, weighted_centroid, wrap_angle_difference, Coordinate,
};
use crate::structure::core::{AtomRow, Residue};
use crate::structure::residue::{atomic_weight, chi1_atoms, has_no_chi1};

/// RMSD between two point sets matched by position.
pub fn rmsd(a: &[Coordinate], b: &[Coordinate]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(LoopwarpError::PointCountMismatch { mobile: a.len(), target: b.len() });
    }
    if a.is_empty() {
        return Err(LoopwarpError::EmptyPointSet);
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(p, q)| squared_distance(&p.to_f64_array(), &q.to_f64_array()))
        .sum();
    Ok((sum / a.len() as f64).sqrt())
}

fn residue_label<T: AtomRow>(residue: &Residue<T>) -> String {
    format!("{} {}", residue.res_name_str(), residue.key)
}

fn find_named<'a, T: AtomRow>(residue: &'a Residue<T>, name: &[u8; 4]) -> Result<&'a Coordinate> {
    residue
        .find_atom(name)
        .map(|atom| &atom.coordinate)
        .ok_or_else(|| LoopwarpError::MissingAtom {
            atom: String::from_utf8_lossy(name).trim().to_string(),
            residue: residue_label(residue),
        })
}

/// RMSD between two residues. Atoms are paired by name; the residues must
/// have the same number of atoms.
pub fn residue_rmsd<T: AtomRow>(x: &Residue<T>, y: &Residue<T>) -> Result<f64> {
    if x.rows.len() != y.rows.len() {
        return Err(LoopwarpError::PointCountMismatch { mobile: x.rows.len(), target: y.rows.len() });
    }
    let mut xs = Vec::with_capacity(x.rows.len());
    let mut ys = Vec::with_capacity(y.rows.len());
    for row in &x.rows {
        let atom = row.atom();
        xs.push(atom.coordinate);
        ys.push(*find_named(y, &atom.atom_name)?);
    }
    rmsd(&xs, &ys)
}

pub fn ca_distance<T: AtomRow>(x: &Residue<T>, y: &Residue<T>) -> Result<f64> {
    let ca = b" CA ";
    Ok(find_named(x, ca)?.distance(find_named(y, ca)?))
}

/// Mass-weighted centroid of a residue's atoms.
pub fn center_of_mass<T: AtomRow>(residue: &Residue<T>) -> Result<[f64; 3]> {
    let mut coords = Vec::with_capacity(residue.rows.len());
    let mut weights = Vec::with_capacity(residue.rows.len());
    for row in &residue.rows {
        let atom = row.atom();
        let weight = atomic_weight(atom.element_str())
            .ok_or_else(|| LoopwarpError::UnknownElement(atom.element_str().to_string()))?;
        coords.push(atom.coordinate);
        weights.push(weight);
    }
    weighted_centroid(&coords, &weights).ok_or(LoopwarpError::EmptyPointSet)
}

pub fn com_distance<T: AtomRow>(x: &Residue<T>, y: &Residue<T>) -> Result<f64> {
    let cx = center_of_mass(x)?;
    let cy = center_of_mass(y)?;
    Ok(squared_distance(&cx, &cy).sqrt())
}

/// Chi-1 torsion in degrees. `Ok(None)` for residues without a chi-1
/// (glycine, alanine and non-standard residues).
pub fn chi1_angle<T: AtomRow>(residue: &Residue<T>) -> Result<Option<f64>> {
    let res_name = residue.res_name_str();
    if has_no_chi1(res_name) {
        return Ok(None);
    }
    let Some([a, b, c, d]) = chi1_atoms(res_name) else {
        return Ok(None);
    };
    let angle = calc_torsion_angle(
        find_named(residue, a)?,
        find_named(residue, b)?,
        find_named(residue, c)?,
        find_named(residue, d)?,
    );
    Ok(Some(angle))
}

/// Change of chi-1 from `y` to `x`, wrapped to [-180, 180).
pub fn chi1_change<T: AtomRow>(x: &Residue<T>, y: &Residue<T>) -> Result<Option<f64>> {
    match (chi1_angle(x)?, chi1_angle(y)?) {
        (Some(ax), Some(ay)) => Ok(Some(wrap_angle_difference(ax - ay))),
        _ => Ok(None),
    }
}
