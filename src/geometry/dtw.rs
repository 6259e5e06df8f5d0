// File: dtw.rs
// Dynamic time warping between two sequences of 3D points

use crate::structure::coordinate::{squared_distance, Coordinate};

/// Multidimensional DTW distance.
///
/// The local cost of matching two points is their squared Euclidean
/// distance. Costs accumulate along the cheapest warping path with no window
/// constraint and the distance is the square root of the total. Sequences
/// may differ in length. Returns `f64::INFINITY` if either is empty.
pub fn dtw_distance(a: &[[f64; 3]], b: &[[f64; 3]]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return f64::INFINITY;
    }
    let m = b.len();
    // Two rolling rows of the (n+1) x (m+1) cost matrix
    let mut prev = vec![f64::INFINITY; m + 1];
    let mut curr = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;
    for p in a {
        curr[0] = f64::INFINITY;
        for (j, q) in b.iter().enumerate() {
            let best = prev[j].min(prev[j + 1]).min(curr[j]);
            curr[j + 1] = squared_distance(p, q) + best;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m].sqrt()
}

pub fn dtw_coordinates(a: &[Coordinate], b: &[Coordinate]) -> f64 {
    let a: Vec<[f64; 3]> = a.iter().map(|c| c.to_f64_array()).collect();
    let b: Vec<[f64; 3]> = b.iter().map(|c| c.to_f64_array()).collect();
    dtw_distance(&a, &b)
}
