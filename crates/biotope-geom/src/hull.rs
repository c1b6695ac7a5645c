//! Convex hull by Andrew's monotone chain.

use crate::error::GeometryError;
use crate::point::{cross, Point};
use crate::polygon::Ring;

/// Compute the convex hull of a point set.
///
/// Returns the hull as a counter-clockwise [`Ring`]. Collinear points on
/// the hull boundary are dropped.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] when fewer than 3 distinct
/// points are supplied, or all points are collinear.
pub fn convex_hull(points: &[Point]) -> Result<Ring, GeometryError> {
    let mut pts: Vec<Point> = points.iter().copied().filter(Point::is_finite).collect();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .expect("finite coordinates compare")
            .then(a.y.partial_cmp(&b.y).expect("finite coordinates compare"))
    });
    pts.dedup();
    if pts.len() < 3 {
        return Err(GeometryError::Degenerate {
            reason: format!("convex hull needs at least 3 distinct points, got {}", pts.len()),
        });
    }

    let mut lower: Vec<Point> = Vec::new();
    for p in &pts {
        while lower.len() >= 2
            && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Point> = Vec::new();
    for p in pts.iter().rev() {
        while upper.len() >= 2
            && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);

    Ring::new(lower).map_err(|_| GeometryError::Degenerate {
        reason: "all points are collinear".to_string(),
    })
}
