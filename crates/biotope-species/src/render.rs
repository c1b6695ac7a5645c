//! PNG previews of occurrence points.

use std::path::Path;

use biotope_core::{Bounds, GeoTransform};
use biotope_geom::Point;
use image::{GrayImage, Luma};
use log::info;

use crate::error::SpeciesError;

/// Render points as white dots on a black world map.
///
/// The image lays `width` x `height` pixels over `extent`; points
/// outside it are skipped.
pub fn render_points_png(
    points: &[Point],
    extent: &Bounds,
    width: usize,
    height: usize,
    path: &Path,
) -> Result<(), SpeciesError> {
    let transform = GeoTransform::from_bounds(extent, width, height);
    let mut img = GrayImage::new(width as u32, height as u32);
    let mut drawn = 0usize;
    for p in points {
        if let Some((row, col)) = transform.world_to_pixel(p.x, p.y, width, height) {
            img.put_pixel(col as u32, row as u32, Luma([255]));
            drawn += 1;
        }
    }
    img.save(path).map_err(|e| SpeciesError::Parse {
        detail: format!("PNG encode: {e}"),
    })?;
    info!("rendered {drawn} of {} points to {}", points.len(), path.display());
    Ok(())
}
