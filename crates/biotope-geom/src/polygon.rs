//! Rings, polygons, and multi-polygons.

use crate::error::GeometryError;
use crate::point::{cross, Point};
use biotope_core::Bounds;

/// A closed sequence of vertices.
///
/// Rings are stored open (the closing vertex is implicit); a duplicate
/// closing vertex supplied by a file format is dropped on construction.
/// Orientation is preserved as given (shapefile outer rings arrive
/// clockwise); algorithms that care normalize internally.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    points: Vec<Point>,
}

impl Ring {
    /// Construct a ring from its vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] when fewer than 3 distinct
    /// vertices remain after dropping an explicit closing vertex.
    pub fn new(mut points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() >= 2 && points.first() == points.last() {
            points.pop();
        }
        let mut distinct = points.clone();
        distinct.dedup_by(|a, b| a == b);
        if distinct.len() < 3 {
            return Err(GeometryError::Degenerate {
                reason: format!("ring needs at least 3 distinct vertices, got {}", distinct.len()),
            });
        }
        Ok(Self { points })
    }

    /// The ring's vertices, without the implicit closing vertex.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of stored vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed ring.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Twice-signed shoelace area: positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        let pts = &self.points;
        let n = pts.len();
        let mut acc = 0.0;
        for i in 0..n {
            let a = &pts[i];
            let b = &pts[(i + 1) % n];
            acc += a.x * b.y - b.x * a.y;
        }
        acc / 2.0
    }

    /// Absolute enclosed area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area-weighted centroid of the ring.
    pub fn centroid(&self) -> Point {
        let pts = &self.points;
        let n = pts.len();
        let a = self.signed_area();
        if a == 0.0 {
            // Zero-area ring: fall back to the vertex mean.
            let (sx, sy) = pts.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            return Point::new(sx / n as f64, sy / n as f64);
        }
        let (mut cx, mut cy) = (0.0, 0.0);
        for i in 0..n {
            let p = &pts[i];
            let q = &pts[(i + 1) % n];
            let w = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * w;
            cy += (p.y + q.y) * w;
        }
        Point::new(cx / (6.0 * a), cy / (6.0 * a))
    }

    /// Axis-aligned bounding box.
    pub fn bounding_box(&self) -> Bounds {
        let mut b = Bounds::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for p in &self.points {
            b.left = b.left.min(p.x);
            b.right = b.right.max(p.x);
            b.bottom = b.bottom.min(p.y);
            b.top = b.top.max(p.y);
        }
        b
    }

    /// Even-odd containment test by ray casting.
    pub fn contains(&self, p: &Point) -> bool {
        let pts = &self.points;
        let n = pts.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (pi, pj) = (&pts[i], &pts[j]);
            if (pi.y > p.y) != (pj.y > p.y) {
                let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Whether every interior angle turns the same way.
    pub fn is_convex(&self) -> bool {
        let pts = &self.points;
        let n = pts.len();
        let mut sign = 0.0f64;
        for i in 0..n {
            let c = cross(&pts[i], &pts[(i + 1) % n], &pts[(i + 2) % n]);
            if c != 0.0 {
                if sign != 0.0 && c.signum() != sign {
                    return false;
                }
                sign = c.signum();
            }
        }
        true
    }

    /// Reverse the vertex order in place, flipping orientation.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }
}

/// An exterior ring with optional interior holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    exterior: Ring,
    holes: Vec<Ring>,
}

impl Polygon {
    /// Construct a polygon from an exterior ring and holes.
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    /// The exterior ring.
    pub fn exterior(&self) -> &Ring {
        &self.exterior
    }

    /// The interior rings.
    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Enclosed area: exterior minus holes.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(Ring::area).sum();
        (self.exterior.area() - holes).max(0.0)
    }

    /// Whether `p` lies inside the exterior and outside every hole.
    pub fn contains(&self, p: &Point) -> bool {
        self.exterior.contains(p) && !self.holes.iter().any(|h| h.contains(p))
    }

    /// Axis-aligned bounding box of the exterior.
    pub fn bounding_box(&self) -> Bounds {
        self.exterior.bounding_box()
    }
}

/// A collection of polygons treated as one geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiPolygon {
    polygons: Vec<Polygon>,
}

impl MultiPolygon {
    /// Construct from parts. An empty part list is legal here; operations
    /// that need area reject it.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// The member polygons.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Whether there are no member polygons.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Total enclosed area.
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Whether `p` lies inside any member polygon.
    pub fn contains(&self, p: &Point) -> bool {
        self.polygons.iter().any(|poly| poly.contains(p))
    }

    /// Bounding box over all members, or `None` when empty.
    pub fn bounding_box(&self) -> Option<Bounds> {
        let mut iter = self.polygons.iter().map(Polygon::bounding_box);
        let first = iter.next()?;
        Some(iter.fold(first, |acc, b| acc.union(&b)))
    }

    /// Every exterior-ring vertex of every member, the input to hull
    /// construction.
    pub fn exterior_points(&self) -> Vec<Point> {
        self.polygons
            .iter()
            .flat_map(|poly| poly.exterior().points().iter().copied())
            .collect()
    }
}
