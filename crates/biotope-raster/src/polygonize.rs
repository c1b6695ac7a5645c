//! Extract vector shapes from raster regions.
//!
//! The inverse of rasterization: contiguous (4-connected) runs of
//! equal-value cells become polygons in world coordinates. Nodata cells
//! are masked out. Each connected region yields one polygon; rings that
//! close off enclosed gaps inside a region become holes.

use std::collections::{HashMap, VecDeque};

use biotope_core::GeoTransform;
use biotope_geom::{Point, Polygon, Ring};
use log::info;

use crate::error::RasterError;
use crate::raster::Raster;

/// Trace the shapes of a raster band.
///
/// Returns `(polygon, value)` pairs in scan order of the region seeds.
///
/// # Errors
///
/// [`RasterError::BandOutOfRange`] for a bad band index.
pub fn polygonize(raster: &Raster, band: usize) -> Result<Vec<(Polygon, f32)>, RasterError> {
    let grid = raster.band(band)?;
    let (height, width) = grid.shape();
    let nodata = raster.nodata().unwrap_or(0.0);
    let transform = raster.transform();

    // Label 4-connected equal-value regions.
    let mut ids: Vec<i32> = vec![-1; width * height];
    let mut regions: Vec<(Vec<(usize, usize)>, f32)> = Vec::new();
    for seed_row in 0..height {
        for seed_col in 0..width {
            let idx = seed_row * width + seed_col;
            if ids[idx] >= 0 {
                continue;
            }
            let value = grid.get(seed_row, seed_col).expect("in bounds");
            if value == nodata || value.is_nan() {
                continue;
            }
            let rid = regions.len() as i32;
            let mut cells = Vec::new();
            let mut queue = VecDeque::new();
            ids[idx] = rid;
            queue.push_back((seed_row, seed_col));
            while let Some((r, c)) = queue.pop_front() {
                cells.push((r, c));
                let mut visit = |nr: usize, nc: usize| {
                    let nidx = nr * width + nc;
                    if ids[nidx] < 0 && grid.get(nr, nc) == Some(value) {
                        ids[nidx] = rid;
                        queue.push_back((nr, nc));
                    }
                };
                if r > 0 {
                    visit(r - 1, c);
                }
                if r + 1 < height {
                    visit(r + 1, c);
                }
                if c > 0 {
                    visit(r, c - 1);
                }
                if c + 1 < width {
                    visit(r, c + 1);
                }
            }
            regions.push((cells, value));
        }
    }

    let mut out = Vec::new();
    for (rid, (cells, value)) in regions.iter().enumerate() {
        let loops = trace_boundary(cells, &ids, rid as i32, width, height);
        for polygon in assemble_polygons(loops, transform) {
            out.push((polygon, *value));
        }
    }
    info!(
        "polygonized band {band} into {} shapes from {} regions",
        out.len(),
        regions.len()
    );
    Ok(out)
}

type Lattice = (i64, i64);

/// Collect the directed boundary edges of one region and stitch them into
/// closed loops of lattice (corner) points.
fn trace_boundary(
    cells: &[(usize, usize)],
    ids: &[i32],
    rid: i32,
    width: usize,
    height: usize,
) -> Vec<Vec<Lattice>> {
    let in_region = |r: isize, c: isize| -> bool {
        r >= 0
            && c >= 0
            && (r as usize) < height
            && (c as usize) < width
            && ids[r as usize * width + c as usize] == rid
    };

    // Directed edges between pixel corners; the region interior is kept on
    // the right-hand side of each edge.
    let mut edges: Vec<(Lattice, Lattice)> = Vec::new();
    for &(r, c) in cells {
        let (ri, ci) = (r as isize, c as isize);
        let (x, y) = (c as i64, r as i64);
        if !in_region(ri - 1, ci) {
            edges.push(((x, y), (x + 1, y)));
        }
        if !in_region(ri, ci + 1) {
            edges.push(((x + 1, y), (x + 1, y + 1)));
        }
        if !in_region(ri + 1, ci) {
            edges.push(((x + 1, y + 1), (x, y + 1)));
        }
        if !in_region(ri, ci - 1) {
            edges.push(((x, y + 1), (x, y)));
        }
    }

    let mut by_start: HashMap<Lattice, Vec<usize>> = HashMap::new();
    for (i, (from, _)) in edges.iter().enumerate() {
        by_start.entry(*from).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut loops = Vec::new();
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        let mut ring: Vec<Lattice> = Vec::new();
        let mut current = start;
        loop {
            used[current] = true;
            let (from, to) = edges[current];
            ring.push(from);
            if to == ring[0] {
                break;
            }
            let dir = (to.0 - from.0, to.1 - from.1);
            // Candidate continuations, tightest (right) turn first so a
            // region that touches itself at a corner splits into separate
            // loops instead of a figure-eight.
            let preference = [
                (-dir.1, dir.0),  // right turn
                dir,              // straight on
                (dir.1, -dir.0),  // left turn
            ];
            let next = by_start.get(&to).and_then(|candidates| {
                preference.iter().find_map(|want| {
                    candidates.iter().copied().find(|&i| {
                        if used[i] {
                            return false;
                        }
                        let (f, t) = edges[i];
                        (t.0 - f.0, t.1 - f.1) == *want
                    })
                })
            });
            match next {
                Some(i) => current = i,
                None => break,
            }
        }
        if ring.len() >= 4 {
            loops.push(collapse_collinear(ring));
        }
    }
    loops
}

/// Drop interior vertices that continue in a straight line.
fn collapse_collinear(ring: Vec<Lattice>) -> Vec<Lattice> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev = ring[(i + n - 1) % n];
        let cur = ring[i];
        let next = ring[(i + 1) % n];
        let cross = (cur.0 - prev.0) * (next.1 - prev.1) - (cur.1 - prev.1) * (next.0 - prev.0);
        if cross != 0 {
            out.push(cur);
        }
    }
    out
}

/// Convert lattice loops to world-coordinate rings and nest holes under
/// their outer ring.
fn assemble_polygons(loops: Vec<Vec<Lattice>>, transform: &GeoTransform) -> Vec<Polygon> {
    let to_world = |(x, y): Lattice| -> Point {
        Point::new(
            transform.origin_x + x as f64 * transform.pixel_width,
            transform.origin_y + y as f64 * transform.pixel_height,
        )
    };

    let mut rings: Vec<Ring> = loops
        .into_iter()
        .filter_map(|lp| Ring::new(lp.into_iter().map(to_world).collect()).ok())
        .collect();
    if rings.is_empty() {
        return Vec::new();
    }

    // The largest ring is the region's outer boundary. Remaining rings
    // are holes when they nest inside it, separate shapes otherwise
    // (corner-touching lobes).
    rings.sort_by(|a, b| {
        b.area()
            .partial_cmp(&a.area())
            .expect("finite ring areas compare")
    });
    let outer = rings.remove(0);
    let mut holes = Vec::new();
    let mut separate = Vec::new();
    for ring in rings {
        if outer.contains(&ring.centroid()) {
            holes.push(ring);
        } else {
            separate.push(Polygon::new(ring, Vec::new()));
        }
    }
    let mut out = vec![Polygon::new(outer, holes)];
    out.extend(separate);
    out
}
