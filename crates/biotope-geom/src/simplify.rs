//! Douglas–Peucker ring simplification.

use crate::error::GeometryError;
use crate::point::{segment_distance, Point};
use crate::polygon::Ring;

/// Simplify an open polyline with the Douglas–Peucker algorithm.
///
/// Endpoints are always preserved; interior vertices are kept only when
/// they deviate from the chord by more than `tolerance`.
pub fn douglas_peucker(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let (first, last) = (points[0], points[points.len() - 1]);
    let mut max_dist = 0.0;
    let mut max_idx = 0;
    for (i, p) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let d = segment_distance(p, &first, &last);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }
    if max_dist <= tolerance {
        return vec![first, last];
    }
    let mut left = douglas_peucker(&points[..=max_idx], tolerance);
    let right = douglas_peucker(&points[max_idx..], tolerance);
    left.pop();
    left.extend(right);
    left
}

/// Simplify a closed ring, bounding vertex count before expensive
/// downstream operations such as buffering.
///
/// The ring is split at its two mutually farthest vertices so the
/// closed shape simplifies without bias toward the storage start point.
/// When the tolerance is coarse enough to collapse the ring below 3
/// distinct vertices, the original ring is returned unchanged.
///
/// # Errors
///
/// Returns [`GeometryError::BadParameter`] for a negative or non-finite
/// tolerance.
pub fn simplify_ring(ring: &Ring, tolerance: f64) -> Result<Ring, GeometryError> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(GeometryError::BadParameter {
            reason: format!("tolerance must be finite and >= 0, got {tolerance}"),
        });
    }
    if tolerance == 0.0 {
        return Ok(ring.clone());
    }
    let pts = ring.points();
    let n = pts.len();

    // Anchor the split at the vertex farthest from the start point.
    let far = (1..n)
        .max_by(|&a, &b| {
            pts[0]
                .distance(&pts[a])
                .partial_cmp(&pts[0].distance(&pts[b]))
                .expect("finite distances compare")
        })
        .unwrap_or(n / 2);

    let mut half_a: Vec<Point> = pts[..=far].to_vec();
    let mut half_b: Vec<Point> = pts[far..].to_vec();
    half_b.push(pts[0]);

    half_a = douglas_peucker(&half_a, tolerance);
    half_b = douglas_peucker(&half_b, tolerance);

    // Join: half_a ends where half_b starts, half_b ends where half_a starts.
    half_a.pop();
    half_b.pop();
    half_a.extend(half_b);

    match Ring::new(half_a) {
        Ok(r) => Ok(r),
        Err(_) => Ok(ring.clone()),
    }
}
