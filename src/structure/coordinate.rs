// File: coordinate.rs
// 3D positions and the small amount of vector maths the pipeline needs

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Coordinate {
    pub fn new(x: f32, y: f32, z: f32) -> Coordinate {
        Coordinate { x, y, z }
    }
    pub fn from_array(arr: [f32; 3]) -> Coordinate {
        Coordinate { x: arr[0], y: arr[1], z: arr[2] }
    }
    pub fn to_f64_array(&self) -> [f64; 3] {
        [self.x as f64, self.y as f64, self.z as f64]
    }
    pub fn add(&self, other: &Coordinate) -> Coordinate {
        Coordinate {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
    /// Euclidean distance, accumulated in f64.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        squared_distance(&self.to_f64_array(), &other.to_f64_array()).sqrt()
    }
}

#[inline(always)]
pub fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// Signed torsion angle a-b-c-d in degrees, in (-180, 180].
///
/// Normals of the two planes come from cross products of consecutive bond
/// vectors; the sign comes from `atan2` against a third orthogonal axis.
pub fn calc_torsion_angle(
    a: &Coordinate, b: &Coordinate, c: &Coordinate, d: &Coordinate,
) -> f64 {
    let [a, b, c, d] = [a, b, c, d].map(|p| p.to_f64_array());
    let b1 = sub3(&b, &a);
    let b2 = sub3(&c, &b);
    let b3 = sub3(&d, &c);

    let n1 = cross3(&b1, &b2);
    let n2 = cross3(&b2, &b3);
    let b2_len = dot3(&b2, &b2).sqrt();
    let b2_unit = [b2[0] / b2_len, b2[1] / b2_len, b2[2] / b2_len];
    let m1 = cross3(&n1, &b2_unit);

    let x = dot3(&n1, &n2);
    let y = dot3(&m1, &n2);
    (-y).atan2(x).to_degrees()
}

/// Wrap a difference of two angles (degrees) into [-180, 180).
pub fn wrap_angle_difference(delta: f64) -> f64 {
    (delta + 180.0).rem_euclid(360.0) - 180.0
}

#[inline]
fn sub3(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}
#[inline]
fn dot3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
#[inline]
fn cross3(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Unweighted centroid of a point set. `None` for an empty slice.
pub fn centroid(points: &[Coordinate]) -> Option<[f64; 3]> {
    weighted_centroid(points, &vec![1.0; points.len()])
}

/// Mass-weighted centroid. `None` if empty, lengths differ or total weight is zero.
pub fn weighted_centroid(points: &[Coordinate], weights: &[f64]) -> Option<[f64; 3]> {
    if points.is_empty() || points.len() != weights.len() {
        return None;
    }
    let mut sum = [0.0_f64; 3];
    let mut total = 0.0_f64;
    for (p, w) in points.iter().zip(weights) {
        let p = p.to_f64_array();
        sum[0] += p[0] * w;
        sum[1] += p[1] * w;
        sum[2] += p[2] * w;
        total += w;
    }
    if total <= 0.0 {
        return None;
    }
    Some([sum[0] / total, sum[1] / total, sum[2] / total])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torsion_angle_sign() {
        // Trans configuration
        let a = Coordinate::new(1.0, 1.0, 0.0);
        let b = Coordinate::new(0.0, 0.0, 0.0);
        let c = Coordinate::new(0.0, 0.0, 1.0);
        let d = Coordinate::new(-1.0, -1.0, 1.0);
        let trans = calc_torsion_angle(&a, &b, &c, &d);
        assert!((trans.abs() - 180.0).abs() < 1e-4, "trans = {}", trans);

        // +90 / -90 are mirror images
        let d_plus = Coordinate::new(-1.0, 1.0, 1.0);
        let d_minus = Coordinate::new(1.0, -1.0, 1.0);
        let plus = calc_torsion_angle(&a, &b, &c, &d_plus);
        let minus = calc_torsion_angle(&a, &b, &c, &d_minus);
        assert!((plus.abs() - 90.0).abs() < 1e-4);
        assert!((plus + minus).abs() < 1e-4);

        // Cis
        let cis = calc_torsion_angle(&a, &b, &c, &Coordinate::new(1.0, 1.0, 1.0));
        assert!(cis.abs() < 1e-4);
    }

    #[test]
    fn test_wrap_angle_difference() {
        assert!((wrap_angle_difference(350.0) - -10.0).abs() < 1e-9);
        assert!((wrap_angle_difference(-190.0) - 170.0).abs() < 1e-9);
        assert!((wrap_angle_difference(45.0) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_centroid() {
        let points = vec![Coordinate::new(0.0, 0.0, 0.0), Coordinate::new(4.0, 0.0, 0.0)];
        let com = weighted_centroid(&points, &[3.0, 1.0]).unwrap();
        assert!((com[0] - 1.0).abs() < 1e-9);
        assert_eq!(centroid(&points).unwrap(), [2.0, 0.0, 0.0]);
        assert!(centroid(&[]).is_none());
    }
}
