//! Reprojection and grid resampling.

use biotope_core::{Bounds, Crs, GeoTransform, Grid};
use log::info;

use crate::error::RasterError;
use crate::project::transform_point;
use crate::raster::Raster;

/// Resampling kernel used when pixels are remapped onto a new grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Resampling {
    /// Value of the nearest source cell. The only kernel that never
    /// invents values, and the right choice for categorical data.
    #[default]
    Nearest,
    /// Distance-weighted average of the four surrounding cells.
    Bilinear,
    /// Catmull-Rom cubic convolution over a 4x4 neighborhood.
    Cubic,
    /// Cubic B-spline over a 4x4 neighborhood (smoothing).
    CubicSpline,
    /// Lanczos windowed sinc over a 6x6 neighborhood.
    Lanczos,
}

impl Resampling {
    /// Kernel support radius in cells (0 for nearest).
    fn radius(self) -> isize {
        match self {
            Self::Nearest => 0,
            Self::Bilinear => 1,
            Self::Cubic | Self::CubicSpline => 2,
            Self::Lanczos => 3,
        }
    }

    /// Kernel weight at offset `t` from the sample point.
    fn weight(self, t: f64) -> f64 {
        let t = t.abs();
        match self {
            Self::Nearest => {
                if t <= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Bilinear => (1.0 - t).max(0.0),
            // Catmull-Rom (a = -0.5).
            Self::Cubic => {
                let a = -0.5;
                if t < 1.0 {
                    (a + 2.0) * t.powi(3) - (a + 3.0) * t.powi(2) + 1.0
                } else if t < 2.0 {
                    a * t.powi(3) - 5.0 * a * t.powi(2) + 8.0 * a * t - 4.0 * a
                } else {
                    0.0
                }
            }
            Self::CubicSpline => {
                if t < 1.0 {
                    (4.0 + t.powi(2) * (3.0 * t - 6.0)) / 6.0
                } else if t < 2.0 {
                    (2.0 - t).powi(3) / 6.0
                } else {
                    0.0
                }
            }
            Self::Lanczos => {
                let a = 3.0;
                if t == 0.0 {
                    1.0
                } else if t < a {
                    let pt = std::f64::consts::PI * t;
                    a * pt.sin() * (pt / a).sin() / (pt * pt)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Options for [`reproject`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ReprojectOptions {
    /// Destination reference system; the source CRS when `None`.
    pub dst_crs: Option<Crs>,
    /// Destination resolution `(x_res, y_res)` in destination units;
    /// derived from the source shape when `None`.
    pub resolution: Option<(f64, f64)>,
    /// Resampling kernel.
    pub resampling: Resampling,
}

/// Sample one band at fractional pixel position `(fy, fx)` (cell-center
/// coordinates) with the given kernel.
///
/// Nodata cells never contribute; the remaining weights are renormalized.
/// Returns `None` when nothing under the kernel is valid.
fn sample_band(grid: &Grid, nodata: Option<f32>, fy: f64, fx: f64, method: Resampling) -> Option<f32> {
    let (height, width) = grid.shape();
    let is_valid = |v: f32| -> bool { !v.is_nan() && Some(v) != nodata };

    if method == Resampling::Nearest {
        let (r, c) = (fy.round(), fx.round());
        if r < 0.0 || c < 0.0 {
            return None;
        }
        let v = grid.get(r as usize, c as usize)?;
        return is_valid(v).then_some(v);
    }

    let radius = method.radius();
    let base_r = fy.floor() as isize;
    let base_c = fx.floor() as isize;
    let mut acc = 0.0f64;
    let mut total = 0.0f64;
    for dr in (1 - radius)..=radius {
        let r = base_r + dr;
        if r < 0 || r >= height as isize {
            continue;
        }
        let wr = method.weight(fy - r as f64);
        if wr == 0.0 {
            continue;
        }
        for dc in (1 - radius)..=radius {
            let c = base_c + dc;
            if c < 0 || c >= width as isize {
                continue;
            }
            let v = grid.get(r as usize, c as usize).expect("bounds checked");
            if !is_valid(v) {
                continue;
            }
            let w = wr * method.weight(fx - c as f64);
            acc += w * f64::from(v);
            total += w;
        }
    }
    if total.abs() < 1e-12 {
        None
    } else {
        Some((acc / total) as f32)
    }
}

/// Resample a raster onto an explicit destination grid in the *same* CRS.
///
/// The workhorse behind both [`reproject`] and covariate alignment: every
/// destination cell center is mapped back into the source grid and
/// sampled with the kernel.
pub fn resample_to(
    src: &Raster,
    dst_transform: &GeoTransform,
    width: usize,
    height: usize,
    method: Resampling,
) -> Result<Raster, RasterError> {
    warp(src, dst_transform, width, height, src.crs(), method, |x, y| Ok((x, y)))
}

fn warp(
    src: &Raster,
    dst_transform: &GeoTransform,
    width: usize,
    height: usize,
    dst_crs: Crs,
    method: Resampling,
    dst_to_src: impl Fn(f64, f64) -> Result<(f64, f64), RasterError>,
) -> Result<Raster, RasterError> {
    let fill = src.nodata().unwrap_or(0.0);
    let st = src.transform();
    let mut bands = Vec::with_capacity(src.band_count());
    for band in src.bands() {
        let mut cells = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let (dx, dy) = dst_transform.cell_center(row, col);
                let (sx, sy) = dst_to_src(dx, dy)?;
                // Fractional source pixel in cell-center coordinates.
                let fx = (sx - st.origin_x) / st.pixel_width - 0.5;
                let fy = (sy - st.origin_y) / st.pixel_height - 0.5;
                let v = if fx < -0.5
                    || fy < -0.5
                    || fx > src.width() as f64 - 0.5
                    || fy > src.height() as f64 - 0.5
                {
                    fill
                } else {
                    sample_band(band, src.nodata(), fy, fx, method).unwrap_or(fill)
                };
                cells.push(v);
            }
        }
        bands.push(Grid::from_cells(width, height, cells)?);
    }
    Raster::new(bands, *dst_transform, dst_crs, src.nodata())
}

/// Reproject a raster onto a new CRS and/or resolution.
///
/// The destination grid is computed so the source footprint is preserved:
/// the source bounds are transformed into the destination CRS, the
/// resolution is taken from the options or derived from the source
/// shape, and the destination size is rounded to cover the extent.
pub fn reproject(src: &Raster, opts: &ReprojectOptions) -> Result<Raster, RasterError> {
    let dst_crs = opts.dst_crs.unwrap_or(src.crs());
    let b = src.bounds();

    let (left, top) = transform_point(src.crs(), dst_crs, b.left, b.top)?;
    let (right, bottom) = transform_point(src.crs(), dst_crs, b.right, b.bottom)?;
    let dst_bounds = Bounds::new(left, bottom, right, top);

    let resolution = match opts.resolution {
        Some(res) => res,
        None => (
            dst_bounds.width() / src.width() as f64,
            dst_bounds.height() / src.height() as f64,
        ),
    };
    let width = ((dst_bounds.width() / resolution.0).round() as usize).max(1);
    let height = ((dst_bounds.height() / resolution.1).round() as usize).max(1);
    let dst_transform = GeoTransform {
        origin_x: dst_bounds.left,
        origin_y: dst_bounds.top,
        pixel_width: resolution.0,
        pixel_height: -resolution.1,
    };

    info!(
        "reprojecting {}x{} {} -> {}x{} {} at ({}, {})",
        src.height(),
        src.width(),
        src.crs(),
        height,
        width,
        dst_crs,
        resolution.0,
        resolution.1
    );

    let src_crs = src.crs();
    warp(src, &dst_transform, width, height, dst_crs, opts.resampling, |x, y| {
        transform_point(dst_crs, src_crs, x, y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient_raster(w: usize, h: usize, pixel: f64) -> Raster {
        let cells: Vec<f32> = (0..w * h).map(|i| (i % w) as f32).collect();
        let g = Grid::from_cells(w, h, cells).unwrap();
        let t = GeoTransform {
            origin_x: 0.0,
            origin_y: h as f64 * pixel,
            pixel_width: pixel,
            pixel_height: -pixel,
        };
        Raster::single(g, t, Crs::WGS84, Some(-1.0)).unwrap()
    }

    #[test]
    fn downsampling_halves_the_grid() {
        let src = gradient_raster(8, 8, 1.0);
        let out = reproject(
            &src,
            &ReprojectOptions {
                resolution: Some((2.0, 2.0)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(out.shape(), (4, 4));
        assert_eq!(out.resolution(), (2.0, 2.0));
    }

    #[test]
    fn footprint_preserved_within_a_pixel() {
        let src = gradient_raster(10, 6, 0.5);
        for resampling in [
            Resampling::Nearest,
            Resampling::Bilinear,
            Resampling::Cubic,
            Resampling::CubicSpline,
            Resampling::Lanczos,
        ] {
            let out = reproject(
                &src,
                &ReprojectOptions {
                    resolution: Some((0.3, 0.3)),
                    resampling,
                    ..Default::default()
                },
            )
            .unwrap();
            let (sb, ob) = (src.bounds(), out.bounds());
            assert!((sb.left - ob.left).abs() <= 0.3);
            assert!((sb.right - ob.right).abs() <= 0.3);
            assert!((sb.top - ob.top).abs() <= 0.3);
            assert!((sb.bottom - ob.bottom).abs() <= 0.3);
        }
    }

    #[test]
    fn identity_resample_is_lossless_for_nearest() {
        let src = gradient_raster(7, 5, 1.0);
        let out = resample_to(
            &src,
            src.transform(),
            src.width(),
            src.height(),
            Resampling::Nearest,
        )
        .unwrap();
        assert_eq!(out.band(1).unwrap(), src.band(1).unwrap());
    }

    #[test]
    fn bilinear_interpolates_between_columns() {
        // Two columns valued 0 and 2; the midpoint resamples to 1.
        let g = Grid::from_cells(2, 1, vec![0.0, 2.0]).unwrap();
        let t = GeoTransform {
            origin_x: 0.0,
            origin_y: 1.0,
            pixel_width: 1.0,
            pixel_height: -1.0,
        };
        let src = Raster::single(g, t, Crs::WGS84, None).unwrap();
        let dst = GeoTransform {
            origin_x: 0.5,
            origin_y: 1.0,
            pixel_width: 1.0,
            pixel_height: -1.0,
        };
        let out = resample_to(&src, &dst, 1, 1, Resampling::Bilinear).unwrap();
        assert_relative_eq!(out.band(1).unwrap().cells()[0], 1.0f32, epsilon = 1e-6);
    }

    #[test]
    fn nodata_does_not_bleed_into_neighbors() {
        let g = Grid::from_cells(2, 1, vec![-1.0, 2.0]).unwrap();
        let t = GeoTransform {
            origin_x: 0.0,
            origin_y: 1.0,
            pixel_width: 1.0,
            pixel_height: -1.0,
        };
        let src = Raster::single(g, t, Crs::WGS84, Some(-1.0)).unwrap();
        let dst = GeoTransform {
            origin_x: 0.5,
            origin_y: 1.0,
            pixel_width: 1.0,
            pixel_height: -1.0,
        };
        let out = resample_to(&src, &dst, 1, 1, Resampling::Bilinear).unwrap();
        // The nodata neighbor is excluded, weights renormalize to the
        // valid cell alone.
        assert_relative_eq!(out.band(1).unwrap().cells()[0], 2.0f32, epsilon = 1e-6);
    }

    #[test]
    fn mercator_roundtrip_footprint() {
        let src = gradient_raster(16, 16, 1.0);
        let merc = reproject(
            &src,
            &ReprojectOptions {
                dst_crs: Some(Crs::WEB_MERCATOR),
                resampling: Resampling::Bilinear,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(merc.crs(), Crs::WEB_MERCATOR);
        let back = reproject(
            &merc,
            &ReprojectOptions {
                dst_crs: Some(Crs::WGS84),
                resolution: Some((1.0, 1.0)),
                resampling: Resampling::Bilinear,
                ..Default::default()
            },
        )
        .unwrap();
        let (sb, bb) = (src.bounds(), back.bounds());
        assert!((sb.left - bb.left).abs() <= 1.0);
        assert!((sb.top - bb.top).abs() <= 1.0);
    }
}
