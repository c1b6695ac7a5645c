//! Point transforms between the toolkit's coordinate reference systems.
//!
//! Biotope works in geographic WGS84 coordinates and spherical web
//! mercator. The forward and inverse mercator formulas are implemented
//! directly; any other CRS pair is rejected rather than silently passed
//! through.

use biotope_core::Crs;

use crate::error::RasterError;

/// Spherical earth radius used by EPSG:3857, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the web mercator projection, degrees.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

/// Project geographic degrees to web mercator meters.
///
/// Latitude is clamped to the projection's valid range before the
/// tangent blows up at the poles.
pub fn lon_lat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Unproject web mercator meters back to geographic degrees.
pub fn mercator_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// Transform a point between two reference systems.
///
/// # Errors
///
/// [`RasterError::UnsupportedProjection`] for any pair other than
/// identity, WGS84 -> web mercator, or web mercator -> WGS84.
pub fn transform_point(from: Crs, to: Crs, x: f64, y: f64) -> Result<(f64, f64), RasterError> {
    if from == to {
        return Ok((x, y));
    }
    match (from, to) {
        (Crs::WGS84, Crs::WEB_MERCATOR) => Ok(lon_lat_to_mercator(x, y)),
        (Crs::WEB_MERCATOR, Crs::WGS84) => Ok(mercator_to_lon_lat(x, y)),
        _ => Err(RasterError::UnsupportedProjection {
            from: from.code(),
            to: to.code(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn origin_maps_to_origin() {
        let (x, y) = lon_lat_to_mercator(0.0, 0.0);
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn known_point() {
        // Greenwich at 51.4779 N.
        let (x, y) = lon_lat_to_mercator(0.0, 51.4779);
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 6_708_890.0, epsilon = 1_000.0);
    }

    #[test]
    fn unknown_pair_rejected() {
        assert!(matches!(
            transform_point(Crs(27700), Crs::WGS84, 0.0, 0.0),
            Err(RasterError::UnsupportedProjection { .. })
        ));
    }

    proptest! {
        #[test]
        fn forward_inverse_roundtrip(
            lon in -179.9f64..179.9,
            lat in -84.9f64..84.9,
        ) {
            let (x, y) = lon_lat_to_mercator(lon, lat);
            let (lon2, lat2) = mercator_to_lon_lat(x, y);
            prop_assert!((lon - lon2).abs() < 1e-9);
            prop_assert!((lat - lat2).abs() < 1e-9);
        }
    }
}
