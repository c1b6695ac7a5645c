//! Outward buffering of convex rings.

use crate::error::GeometryError;
use crate::polygon::Ring;
use crate::point::Point;

/// Offset a convex ring outward by `distance`.
///
/// Each edge is translated along its outward normal; the gaps at the
/// vertices are closed with circular arcs approximated by
/// `arc_segments` points per quarter turn. Pseudo-absence sampling
/// buffers the convex hull of a range map, so only convex input is
/// supported; a concave ring is a contract violation.
///
/// # Errors
///
/// - [`GeometryError::NotConvex`] for concave input.
/// - [`GeometryError::BadParameter`] for a non-positive or non-finite
///   distance, or `arc_segments == 0`.
pub fn buffer_convex(
    ring: &Ring,
    distance: f64,
    arc_segments: usize,
) -> Result<Ring, GeometryError> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(GeometryError::BadParameter {
            reason: format!("buffer distance must be finite and > 0, got {distance}"),
        });
    }
    if arc_segments == 0 {
        return Err(GeometryError::BadParameter {
            reason: "arc_segments must be at least 1".to_string(),
        });
    }
    if !ring.is_convex() {
        return Err(GeometryError::NotConvex);
    }

    // Work on a counter-clockwise copy so the outward normal of edge
    // (a -> b) is the unit right-hand normal (dy, -dx).
    let mut ccw = ring.clone();
    if ccw.signed_area() < 0.0 {
        ccw.reverse();
    }
    let pts = ccw.points();
    let n = pts.len();

    let mut out: Vec<Point> = Vec::with_capacity(n * (arc_segments + 2));
    for i in 0..n {
        let prev = &pts[(i + n - 1) % n];
        let cur = &pts[i];
        let next = &pts[(i + 1) % n];

        let normal = |a: &Point, b: &Point| -> Option<(f64, f64)> {
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            let len = dx.hypot(dy);
            if len == 0.0 {
                None
            } else {
                Some((dy / len, -dx / len))
            }
        };

        // Zero-length edges contribute no normal and are skipped.
        let Some(n_in) = normal(prev, cur) else { continue };
        let Some(n_out) = normal(cur, next) else { continue };

        // Arc from the incoming edge's offset endpoint to the outgoing
        // edge's offset start. Walking a CCW ring, the outward normal
        // rotates counter-clockwise, so the sweep is positive.
        let a_in = n_in.1.atan2(n_in.0);
        let a_out = n_out.1.atan2(n_out.0);
        let mut sweep = a_out - a_in;
        if sweep < 0.0 {
            sweep += std::f64::consts::TAU;
        }
        let steps = ((sweep.abs() / std::f64::consts::FRAC_PI_2) * arc_segments as f64)
            .ceil()
            .max(1.0) as usize;
        for s in 0..=steps {
            let a = a_in + sweep * (s as f64 / steps as f64);
            out.push(Point::new(
                cur.x + distance * a.cos(),
                cur.y + distance * a.sin(),
            ));
        }
    }

    Ring::new(out).map_err(|_| GeometryError::Degenerate {
        reason: "buffered ring collapsed".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Ring;
    use approx::assert_relative_eq;

    fn square(side: f64) -> Ring {
        Ring::new(vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ])
        .unwrap()
    }

    #[test]
    fn buffered_square_area() {
        let d = 1.0;
        let out = buffer_convex(&square(10.0), d, 8).unwrap();
        // Exact buffered area: s^2 + 4*s*d + pi*d^2; the polygonal arcs
        // under-approximate the circular corners slightly.
        let expected = 100.0 + 4.0 * 10.0 * d + std::f64::consts::PI * d * d;
        assert_relative_eq!(out.area(), expected, epsilon = 0.1);
    }

    #[test]
    fn buffer_contains_the_original() {
        let ring = square(4.0);
        let out = buffer_convex(&ring, 0.5, 4).unwrap();
        for p in ring.points() {
            assert!(out.contains(p), "original vertex {p} should be inside");
        }
    }

    #[test]
    fn orientation_of_input_does_not_matter() {
        let ccw = square(4.0);
        let mut cw = ccw.clone();
        cw.reverse();
        let a = buffer_convex(&ccw, 1.0, 8).unwrap();
        let b = buffer_convex(&cw, 1.0, 8).unwrap();
        assert_relative_eq!(a.area(), b.area(), epsilon = 1e-9);
    }

    #[test]
    fn concave_input_rejected() {
        let notch = Ring::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ])
        .unwrap();
        assert_eq!(buffer_convex(&notch, 1.0, 4), Err(GeometryError::NotConvex));
    }

    #[test]
    fn bad_distance_rejected() {
        assert!(buffer_convex(&square(1.0), 0.0, 4).is_err());
        assert!(buffer_convex(&square(1.0), f64::NAN, 4).is_err());
        assert!(buffer_convex(&square(1.0), 1.0, 0).is_err());
    }
}
