// File: anchor.rs
// Flanking anchor residues of CDR loops and the loop-with-anchors record
// that alignment and DTW work on.

use crate::annotation::{AnnotatedAtom, AnnotatedStructure, ChainRole};
use crate::error::{LoopwarpError, Result};
use crate::structure::core::{group_residues, AtomRow, Residue};
use crate::structure::coordinate::Coordinate;

pub const DEFAULT_ANCHOR_COUNT: usize = 5;

/// Residues immediately before and after a loop.
///
/// Positions are taken from `chain_residues`, which must list residues in
/// source order. A loop close to either end of the chain gets fewer than
/// `anchor_count` anchors on that side.
pub fn find_anchors<T: AtomRow + Clone>(
    loop_residues: &[Residue<T>],
    chain_residues: &[Residue<T>],
    anchor_count: usize,
) -> Result<(Vec<Residue<T>>, Vec<Residue<T>>)> {
    let (first, last) = match (loop_residues.first(), loop_residues.last()) {
        (Some(first), Some(last)) => (first.key, last.key),
        _ => return Err(LoopwarpError::EmptyLoop),
    };
    let start = chain_residues
        .iter()
        .position(|res| res.key == first)
        .ok_or_else(|| LoopwarpError::ResidueNotFound(first.to_string()))?;
    let end = chain_residues[start..]
        .iter()
        .position(|res| res.key == last)
        .map(|offset| start + offset)
        .ok_or_else(|| LoopwarpError::ResidueNotFound(last.to_string()))?;

    let start_anchor = chain_residues[start.saturating_sub(anchor_count)..start].to_vec();
    let end_stop = (end + 1 + anchor_count).min(chain_residues.len());
    let end_anchor = chain_residues[end + 1..end_stop].to_vec();
    Ok((start_anchor, end_anchor))
}

/// Backbone atoms of a CDR loop and its anchors, anchors first and last.
/// Anchor rows carry `cdr == None`, loop rows carry the loop number.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopWithAnchors {
    pub name: String,
    pub chain_role: ChainRole,
    pub cdr: u8,
    pub rows: Vec<AnnotatedAtom>,
    pub num_start_anchors: usize,
    pub num_end_anchors: usize,
}

impl LoopWithAnchors {
    pub fn build(
        structure: &AnnotatedStructure, chain_role: ChainRole, cdr: u8, anchor_count: usize,
    ) -> Result<Self> {
        let backbone: Vec<AnnotatedAtom> = structure
            .rows
            .iter()
            .filter(|row| row.chain_role == Some(chain_role) && row.atom.is_backbone())
            .cloned()
            .collect();
        let chain_residues = group_residues(&backbone);
        let loop_residues: Vec<Residue<AnnotatedAtom>> = chain_residues
            .iter()
            .filter(|res| res.rows.iter().any(|row| row.cdr == Some(cdr)))
            .cloned()
            .collect();
        let (start_anchor, end_anchor) = find_anchors(&loop_residues, &chain_residues, anchor_count)?;

        let mut rows = Vec::new();
        for res in &start_anchor {
            rows.extend(res.rows.iter().cloned().map(as_anchor));
        }
        for res in &loop_residues {
            rows.extend(res.rows.iter().cloned());
        }
        for res in &end_anchor {
            rows.extend(res.rows.iter().cloned().map(as_anchor));
        }
        Ok(LoopWithAnchors {
            name: structure.name.clone(),
            chain_role,
            cdr,
            rows,
            num_start_anchors: start_anchor.len(),
            num_end_anchors: end_anchor.len(),
        })
    }

    pub fn anchor_coordinates(&self) -> Vec<Coordinate> {
        self.rows.iter().filter(|r| r.cdr.is_none()).map(|r| r.atom.coordinate).collect()
    }

    pub fn loop_coordinates(&self) -> Vec<Coordinate> {
        self.rows.iter().filter(|r| r.cdr.is_some()).map(|r| r.atom.coordinate).collect()
    }
}

fn as_anchor(mut row: AnnotatedAtom) -> AnnotatedAtom {
    row.cdr = None;
    row
}
