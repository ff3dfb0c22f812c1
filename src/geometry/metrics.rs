//! Finite-volume geometric metrics.
//!
//! Faces are arbitrary (possibly non-planar) polygons given as an ordered
//! point loop; cells are arbitrary polyhedra given by their bounding faces.
//!
//! - A face is fanned into triangles around the plain average of its points.
//!   The area vector is the sum of the triangle area vectors and the centroid
//!   is the average of the triangle centroids weighted by triangle area.
//! - A cell is split into one pyramid per face, apex at the plain average of
//!   the cell's points. Pyramid volume is `|S_f . (c_f - apex)| / 3` and the
//!   pyramid centroid is taken as `0.75 c_f + 0.25 apex`. That centroid is an
//!   approximation and solvers are tuned against it; do not replace it with
//!   the exact pyramid centroid.
//!
//! All functions are pure and allocation-free apart from their inputs.

use itertools::Itertools;

use crate::mesh_error::{Entity, MeshError};

/// 3D vector / coordinate.
pub type Vec3 = [f64; 3];

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Plain arithmetic mean of a point set. Returns the origin for an empty set.
pub fn average(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return [0.0; 3];
    }
    let sum = points.iter().fold([0.0; 3], |acc, &p| add(acc, p));
    scale(sum, 1.0 / points.len() as f64)
}

/// Area vector and centroid of a face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceMetrics {
    pub area: Vec3,
    pub centroid: Vec3,
}

impl FaceMetrics {
    /// Scalar face area.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        norm(self.area)
    }
}

/// Volume and centroid of a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMetrics {
    pub volume: f64,
    pub centroid: Vec3,
}

/// Computes the area vector and area-weighted centroid of a polygon.
///
/// `points` must be ordered around the polygon in one consistent winding;
/// the area vector follows the right-hand rule for that winding.
///
/// Fails with [`MeshError::DegenerateGeometry`] when fewer than three points
/// are given or when the summed area vector has zero magnitude.
pub fn face_area_centroid(points: &[Vec3]) -> Result<FaceMetrics, MeshError> {
    let degenerate = |value: f64| MeshError::DegenerateGeometry {
        entity: Entity::Detached,
        what: "area",
        value,
    };
    if points.len() < 3 {
        return Err(degenerate(0.0));
    }

    let center = average(points);
    let mut area = [0.0; 3];
    let mut weighted = [0.0; 3];
    let mut weight_sum = 0.0;
    for (&a, &b) in points.iter().circular_tuple_windows() {
        let tri_area = scale(cross(sub(a, center), sub(b, center)), 0.5);
        let tri_centroid = scale(add(add(a, b), center), 1.0 / 3.0);
        let w = norm(tri_area);
        area = add(area, tri_area);
        weighted = add(weighted, scale(tri_centroid, w));
        weight_sum += w;
    }

    let magnitude = norm(area);
    if magnitude == 0.0 || !magnitude.is_finite() || weight_sum == 0.0 {
        return Err(degenerate(magnitude));
    }
    Ok(FaceMetrics {
        area,
        centroid: scale(weighted, 1.0 / weight_sum),
    })
}

/// Computes the volume and centroid of a polyhedral cell.
///
/// `points` is the de-duplicated set of points of the cell (used for the
/// pyramid apex only); `faces` are the metrics of its bounding faces. The
/// orientation of each face area vector does not matter.
///
/// Fails with [`MeshError::DegenerateGeometry`] when the accumulated volume
/// is zero.
pub fn cell_volume_centroid(
    points: &[Vec3],
    faces: &[FaceMetrics],
) -> Result<CellMetrics, MeshError> {
    let apex = average(points);
    let mut volume = 0.0;
    let mut weighted = [0.0; 3];
    for face in faces {
        let pyramid_volume = dot(face.area, sub(face.centroid, apex)).abs() / 3.0;
        let pyramid_centroid = add(scale(face.centroid, 0.75), scale(apex, 0.25));
        volume += pyramid_volume;
        weighted = add(weighted, scale(pyramid_centroid, pyramid_volume));
    }
    if volume == 0.0 || !volume.is_finite() {
        return Err(MeshError::DegenerateGeometry {
            entity: Entity::Detached,
            what: "volume",
            value: volume,
        });
    }
    Ok(CellMetrics {
        volume,
        centroid: scale(weighted, 1.0 / volume),
    })
}

/// Axis-aligned extent (`max - min` per axis) of a point set.
pub fn bounding_extent(points: &[Vec3]) -> Vec3 {
    let mut lo = [f64::INFINITY; 3];
    let mut hi = [f64::NEG_INFINITY; 3];
    for p in points {
        for axis in 0..3 {
            lo[axis] = lo[axis].min(p[axis]);
            hi[axis] = hi[axis].max(p[axis]);
        }
    }
    if points.is_empty() {
        return [0.0; 3];
    }
    sub(hi, lo)
}
