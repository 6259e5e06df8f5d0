// File: kabsch.rs
// Least-squares rigid-body superposition of two corresponding point sets.
// The optimal rotation is the unit quaternion maximising Horn's 4x4 key
// matrix, found with a cyclic Jacobi eigen-solver.

use crate::error::{LoopwarpError, Result};
use crate::structure::core::AtomRow;
use crate::structure::coordinate::{squared_distance, Coordinate};

const JACOBI_MAX_SWEEPS: usize = 64;
/// Off-diagonal mass, relative to the squared Frobenius norm, below which
/// the matrix counts as diagonal
const JACOBI_RELATIVE_TOLERANCE: f64 = 1.0e-24;

/// Rotation followed by translation: `x' = R x + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: [[f64; 3]; 3],
    pub translation: [f64; 3],
}

impl RigidTransform {
    pub fn identity() -> Self {
        RigidTransform {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }

    pub fn apply_f64(&self, p: [f64; 3]) -> [f64; 3] {
        let r = &self.rotation;
        let t = &self.translation;
        [
            r[0][0] * p[0] + r[0][1] * p[1] + r[0][2] * p[2] + t[0],
            r[1][0] * p[0] + r[1][1] * p[1] + r[1][2] * p[2] + t[1],
            r[2][0] * p[0] + r[2][1] * p[1] + r[2][2] * p[2] + t[2],
        ]
    }

    pub fn apply(&self, c: &Coordinate) -> Coordinate {
        let p = self.apply_f64(c.to_f64_array());
        Coordinate::new(p[0] as f32, p[1] as f32, p[2] as f32)
    }

    pub fn apply_all(&self, coords: &[Coordinate]) -> Vec<Coordinate> {
        coords.iter().map(|c| self.apply(c)).collect()
    }

    /// Move every row of a structure in place.
    pub fn apply_rows<T: AtomRow>(&self, rows: &mut [T]) {
        for row in rows.iter_mut() {
            let atom = row.atom_mut();
            atom.coordinate = self.apply(&atom.coordinate);
        }
    }
}

/// Outcome of a superposition of `mobile` onto `target`.
#[derive(Debug, Clone, Copy)]
pub struct Superposition {
    pub transform: RigidTransform,
    /// RMSD after applying `transform` to the mobile points
    pub rmsd: f64,
    /// RMSD before any fitting
    pub init_rmsd: f64,
}

/// Find the rotation and translation that best map `mobile` onto `target`.
///
/// Points correspond by position, so both sets must have the same length.
/// A length mismatch is an error rather than a partial fit: it means the
/// caller built the correspondence wrongly.
pub fn superpose(mobile: &[Coordinate], target: &[Coordinate]) -> Result<Superposition> {
    if mobile.len() != target.len() {
        return Err(LoopwarpError::PointCountMismatch {
            mobile: mobile.len(),
            target: target.len(),
        });
    }
    if mobile.is_empty() {
        return Err(LoopwarpError::EmptyPointSet);
    }
    let x: Vec<[f64; 3]> = mobile.iter().map(|c| c.to_f64_array()).collect();
    let y: Vec<[f64; 3]> = target.iter().map(|c| c.to_f64_array()).collect();
    let init_rmsd = paired_rmsd(&x, &y);

    // Already superposed
    if x == y {
        return Ok(Superposition {
            transform: RigidTransform::identity(),
            rmsd: 0.0,
            init_rmsd,
        });
    }

    let xc = mean(&x);
    let yc = mean(&y);
    let s = cross_covariance(&x, &y, &xc, &yc);
    let rotation = quaternion_to_rotation(optimal_quaternion(&s));

    let rotated_xc = [
        rotation[0][0] * xc[0] + rotation[0][1] * xc[1] + rotation[0][2] * xc[2],
        rotation[1][0] * xc[0] + rotation[1][1] * xc[1] + rotation[1][2] * xc[2],
        rotation[2][0] * xc[0] + rotation[2][1] * xc[1] + rotation[2][2] * xc[2],
    ];
    let translation = [
        yc[0] - rotated_xc[0],
        yc[1] - rotated_xc[1],
        yc[2] - rotated_xc[2],
    ];
    let transform = RigidTransform { rotation, translation };

    let moved: Vec<[f64; 3]> = x.iter().map(|p| transform.apply_f64(*p)).collect();
    let rmsd = paired_rmsd(&moved, &y);
    Ok(Superposition { transform, rmsd, init_rmsd })
}

fn mean(points: &[[f64; 3]]) -> [f64; 3] {
    let n = points.len() as f64;
    let mut sum = [0.0; 3];
    for p in points {
        sum[0] += p[0];
        sum[1] += p[1];
        sum[2] += p[2];
    }
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

fn paired_rmsd(a: &[[f64; 3]], b: &[[f64; 3]]) -> f64 {
    let sum: f64 = a.iter().zip(b).map(|(p, q)| squared_distance(p, q)).sum();
    (sum / a.len() as f64).sqrt()
}

/// `s[a][b] = sum_i (x_i - xc)_a * (y_i - yc)_b`
fn cross_covariance(
    x: &[[f64; 3]], y: &[[f64; 3]], xc: &[f64; 3], yc: &[f64; 3],
) -> [[f64; 3]; 3] {
    let mut s = [[0.0_f64; 3]; 3];
    for (p, q) in x.iter().zip(y) {
        let p = [p[0] - xc[0], p[1] - xc[1], p[2] - xc[2]];
        let q = [q[0] - yc[0], q[1] - yc[1], q[2] - yc[2]];
        for a in 0..3 {
            for b in 0..3 {
                s[a][b] += p[a] * q[b];
            }
        }
    }
    s
}

/// Eigenvector of the largest eigenvalue of Horn's key matrix.
fn optimal_quaternion(s: &[[f64; 3]; 3]) -> [f64; 4] {
    let (sxx, sxy, sxz) = (s[0][0], s[0][1], s[0][2]);
    let (syx, syy, syz) = (s[1][0], s[1][1], s[1][2]);
    let (szx, szy, szz) = (s[2][0], s[2][1], s[2][2]);
    let key = [
        [sxx + syy + szz, syz - szy, szx - sxz, sxy - syx],
        [syz - szy, sxx - syy - szz, sxy + syx, szx + sxz],
        [szx - sxz, sxy + syx, -sxx + syy - szz, syz + szy],
        [sxy - syx, szx + sxz, syz + szy, -sxx - syy + szz],
    ];
    let (values, vectors, _) = jacobi_eigen(key);
    // Ties keep the first index, so a zero key matrix yields the identity
    let mut best = 0;
    for k in 1..4 {
        if values[k] > values[best] {
            best = k;
        }
    }
    let q = [vectors[0][best], vectors[1][best], vectors[2][best], vectors[3][best]];
    let norm = q.iter().map(|v| v * v).sum::<f64>().sqrt();
    [q[0] / norm, q[1] / norm, q[2] / norm, q[3] / norm]
}

fn quaternion_to_rotation(q: [f64; 4]) -> [[f64; 3]; 3] {
    let [q0, q1, q2, q3] = q;
    [
        [
            q0 * q0 + q1 * q1 - q2 * q2 - q3 * q3,
            2.0 * (q1 * q2 - q0 * q3),
            2.0 * (q1 * q3 + q0 * q2),
        ],
        [
            2.0 * (q1 * q2 + q0 * q3),
            q0 * q0 - q1 * q1 + q2 * q2 - q3 * q3,
            2.0 * (q2 * q3 - q0 * q1),
        ],
        [
            2.0 * (q1 * q3 - q0 * q2),
            2.0 * (q2 * q3 + q0 * q1),
            q0 * q0 - q1 * q1 - q2 * q2 + q3 * q3,
        ],
    ]
}

/// Cyclic Jacobi for a symmetric 4x4 matrix. Returns eigenvalues, the
/// eigenvectors as columns and the number of sweeps run.
fn jacobi_eigen(mut a: [[f64; 4]; 4]) -> ([f64; 4], [[f64; 4]; 4], usize) {
    let mut v = [[0.0_f64; 4]; 4];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    // Rotations preserve the Frobenius norm
    let norm_sq: f64 = a.iter().flatten().map(|x| x * x).sum();
    let mut sweeps = 0;
    while sweeps < JACOBI_MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..4 {
            for q in (p + 1)..4 {
                off += a[p][q] * a[p][q];
            }
        }
        if off <= JACOBI_RELATIVE_TOLERANCE * norm_sq {
            break;
        }
        sweeps += 1;
        for p in 0..4 {
            for q in (p + 1)..4 {
                if a[p][q] == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                for k in 0..4 {
                    let (akp, akq) = (a[k][p], a[k][q]);
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..4 {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }
    ([a[0][0], a[1][1], a[2][2], a[3][3]], v, sweeps)
}
