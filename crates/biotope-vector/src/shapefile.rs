//! ESRI shapefile (`.shp`/`.shx`) geometry reader and writer.
//!
//! Supports Null (0), Point (1), and Polygon (5) shape records. The
//! shapefile format mixes byte orders: file and record headers are
//! big-endian, shape payloads little-endian. Outer rings are clockwise
//! and holes counter-clockwise on disk, per the specification; ring
//! nesting is reassembled on read by orientation plus containment.

use std::fs;
use std::path::Path;

use biotope_geom::{MultiPolygon, Point, Polygon, Ring};
use log::warn;
use smallvec::SmallVec;

use crate::error::VectorError;

const SHAPE_NULL: i32 = 0;
const SHAPE_POINT: i32 = 1;
const SHAPE_POLYGON: i32 = 5;

/// One decoded shape record.
#[derive(Clone, Debug, PartialEq)]
pub enum ShpGeometry {
    /// A null shape: a placeholder record with no geometry.
    Null,
    /// A single point.
    Point(Point),
    /// A polygon, possibly with holes and multiple parts.
    Polygon(MultiPolygon),
}

fn be_i32(data: &[u8], off: usize) -> Result<i32, VectorError> {
    let b: [u8; 4] = data
        .get(off..off + 4)
        .ok_or_else(|| truncated(off))?
        .try_into()
        .expect("length checked");
    Ok(i32::from_be_bytes(b))
}

fn le_i32(data: &[u8], off: usize) -> Result<i32, VectorError> {
    let b: [u8; 4] = data
        .get(off..off + 4)
        .ok_or_else(|| truncated(off))?
        .try_into()
        .expect("length checked");
    Ok(i32::from_le_bytes(b))
}

fn le_f64(data: &[u8], off: usize) -> Result<f64, VectorError> {
    let b: [u8; 8] = data
        .get(off..off + 8)
        .ok_or_else(|| truncated(off))?
        .try_into()
        .expect("length checked");
    Ok(f64::from_le_bytes(b))
}

fn truncated(off: usize) -> VectorError {
    VectorError::InvalidFormat {
        detail: format!("truncated shapefile at offset {off}"),
    }
}

/// Read all shape records from a `.shp` file.
pub fn read_shp(path: &Path) -> Result<Vec<ShpGeometry>, VectorError> {
    let data = fs::read(path)?;
    if data.len() < 100 {
        return Err(VectorError::InvalidFormat {
            detail: "file shorter than the shapefile header".to_string(),
        });
    }
    if be_i32(&data, 0)? != 9994 {
        return Err(VectorError::InvalidFormat {
            detail: "missing shapefile file code 9994".to_string(),
        });
    }

    let mut shapes = Vec::new();
    let mut off = 100usize;
    while off + 8 <= data.len() {
        let content_words = be_i32(&data, off + 4)?;
        if content_words < 2 {
            return Err(VectorError::InvalidFormat {
                detail: format!("record at offset {off} has bad content length"),
            });
        }
        let content = off + 8;
        let shape_type = le_i32(&data, content)?;
        let shape = match shape_type {
            SHAPE_NULL => ShpGeometry::Null,
            SHAPE_POINT => {
                let x = le_f64(&data, content + 4)?;
                let y = le_f64(&data, content + 12)?;
                ShpGeometry::Point(Point::new(x, y))
            }
            SHAPE_POLYGON => ShpGeometry::Polygon(read_polygon(&data, content)?),
            other => {
                return Err(VectorError::Unsupported {
                    feature: format!("shape type {other}"),
                })
            }
        };
        shapes.push(shape);
        off = content + content_words as usize * 2;
    }
    Ok(shapes)
}

fn read_polygon(data: &[u8], content: usize) -> Result<MultiPolygon, VectorError> {
    // Layout: type(4) bbox(32) numparts(4) numpoints(4) parts points.
    let num_parts = le_i32(data, content + 36)? as usize;
    let num_points = le_i32(data, content + 40)? as usize;
    let parts_off = content + 44;
    let points_off = parts_off + num_parts * 4;

    // Most polygons are a single ring; avoid a heap allocation for them.
    let mut parts: SmallVec<[usize; 4]> = SmallVec::with_capacity(num_parts + 1);
    for i in 0..num_parts {
        parts.push(le_i32(data, parts_off + i * 4)? as usize);
    }
    parts.push(num_points);

    let mut rings: Vec<Ring> = Vec::new();
    for w in parts.windows(2) {
        let (start, end) = (w[0], w[1]);
        if end < start || end > num_points {
            return Err(VectorError::InvalidFormat {
                detail: "polygon part indices out of order".to_string(),
            });
        }
        let mut pts = Vec::with_capacity(end - start);
        for i in start..end {
            let x = le_f64(data, points_off + i * 16)?;
            let y = le_f64(data, points_off + i * 16 + 8)?;
            pts.push(Point::new(x, y));
        }
        match Ring::new(pts) {
            Ok(r) => rings.push(r),
            Err(e) => warn!("skipping degenerate shapefile ring: {e}"),
        }
    }
    Ok(assemble_rings(rings))
}

/// Nest rings into polygons: clockwise rings are outers, counter-
/// clockwise rings are holes of the outer that contains them. Files that
/// ignore the orientation convention fall back to every-ring-an-outer.
fn assemble_rings(rings: Vec<Ring>) -> MultiPolygon {
    let (outers, holes): (Vec<Ring>, Vec<Ring>) =
        rings.into_iter().partition(|r| r.signed_area() <= 0.0);
    if outers.is_empty() {
        return MultiPolygon::new(holes.into_iter().map(|r| Polygon::new(r, Vec::new())).collect());
    }

    let mut polygons: Vec<(Ring, Vec<Ring>)> =
        outers.into_iter().map(|r| (r, Vec::new())).collect();
    for hole in holes {
        let probe = hole.points()[0];
        match polygons.iter_mut().find(|(outer, _)| outer.contains(&probe)) {
            Some((_, hs)) => hs.push(hole),
            None => {
                warn!("shapefile hole ring outside every outer ring; keeping as a shape");
                polygons.push((hole, Vec::new()));
            }
        }
    }
    MultiPolygon::new(
        polygons
            .into_iter()
            .map(|(outer, holes)| Polygon::new(outer, holes))
            .collect(),
    )
}

fn push_be_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn push_le_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn push_le_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn header(file_words: i32, shape_type: i32, bbox: [f64; 4]) -> Vec<u8> {
    let mut h = Vec::with_capacity(100);
    push_be_i32(&mut h, 9994);
    h.extend_from_slice(&[0u8; 20]);
    push_be_i32(&mut h, file_words);
    push_le_i32(&mut h, 1000);
    push_le_i32(&mut h, shape_type);
    for v in bbox {
        push_le_f64(&mut h, v);
    }
    // Unused z and m ranges.
    for _ in 0..4 {
        push_le_f64(&mut h, 0.0);
    }
    h
}

/// Write polygon geometries as `.shp` plus the `.shx` index.
///
/// `path` is the `.shp` file; the index is written alongside it. Empty
/// geometries are written as Null shapes so record numbering stays
/// aligned with the attribute table.
pub fn write_polygons_shp(path: &Path, geometries: &[MultiPolygon]) -> Result<(), VectorError> {
    let mut bbox = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    let mut contents: Vec<Vec<u8>> = Vec::with_capacity(geometries.len());

    for geometry in geometries {
        if geometry.is_empty() {
            let mut c = Vec::with_capacity(4);
            push_le_i32(&mut c, SHAPE_NULL);
            contents.push(c);
            continue;
        }
        let gb = geometry.bounding_box().expect("non-empty geometry");
        bbox[0] = bbox[0].min(gb.left);
        bbox[1] = bbox[1].min(gb.bottom);
        bbox[2] = bbox[2].max(gb.right);
        bbox[3] = bbox[3].max(gb.top);

        // Collect rings in convention: outers clockwise, holes counter-
        // clockwise, each ring explicitly closed.
        let mut rings: Vec<Vec<Point>> = Vec::new();
        for polygon in geometry.polygons() {
            let mut outer = polygon.exterior().clone();
            if outer.signed_area() > 0.0 {
                outer.reverse();
            }
            rings.push(closed(&outer));
            for hole in polygon.holes() {
                let mut hole = hole.clone();
                if hole.signed_area() < 0.0 {
                    hole.reverse();
                }
                rings.push(closed(&hole));
            }
        }
        let num_points: usize = rings.iter().map(Vec::len).sum();

        let mut c = Vec::new();
        push_le_i32(&mut c, SHAPE_POLYGON);
        push_le_f64(&mut c, gb.left);
        push_le_f64(&mut c, gb.bottom);
        push_le_f64(&mut c, gb.right);
        push_le_f64(&mut c, gb.top);
        push_le_i32(&mut c, rings.len() as i32);
        push_le_i32(&mut c, num_points as i32);
        let mut start = 0usize;
        for ring in &rings {
            push_le_i32(&mut c, start as i32);
            start += ring.len();
        }
        for ring in &rings {
            for p in ring {
                push_le_f64(&mut c, p.x);
                push_le_f64(&mut c, p.y);
            }
        }
        contents.push(c);
    }

    if !bbox[0].is_finite() {
        bbox = [0.0; 4];
    }

    let total: usize = 100 + contents.iter().map(|c| 8 + c.len()).sum::<usize>();
    let mut shp = header((total / 2) as i32, SHAPE_POLYGON, bbox);
    let mut shx = header(((100 + contents.len() * 8) / 2) as i32, SHAPE_POLYGON, bbox);

    let mut offset_words = 50i32;
    for (i, c) in contents.iter().enumerate() {
        let words = (c.len() / 2) as i32;
        push_be_i32(&mut shx, offset_words);
        push_be_i32(&mut shx, words);
        push_be_i32(&mut shp, (i + 1) as i32);
        push_be_i32(&mut shp, words);
        shp.extend_from_slice(c);
        offset_words += 4 + words;
    }

    fs::write(path, shp)?;
    fs::write(path.with_extension("shx"), shx)?;
    Ok(())
}

fn closed(ring: &Ring) -> Vec<Point> {
    let mut pts: Vec<Point> = ring.points().to_vec();
    if let Some(&first) = pts.first() {
        pts.push(first);
    }
    pts
}
