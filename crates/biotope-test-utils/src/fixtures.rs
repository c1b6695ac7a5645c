//! Reusable synthetic datasets.
//!
//! Everything here is small, deterministic, and georeferenced on simple
//! round-number grids so expected values are easy to state in tests.

use biotope_core::{Crs, GeoTransform, Grid};
use biotope_geom::{MultiPolygon, Point, Polygon, Ring};
use biotope_raster::Raster;
use biotope_vector::{AttrValue, Feature};
use indexmap::IndexMap;

/// A `width` x `height` single-band raster over the global extent, every
/// cell valued by `f(row, col)`, nodata 0.
pub fn global_raster(width: usize, height: usize, f: impl Fn(usize, usize) -> f32) -> Raster {
    let mut grid = Grid::new(width, height).expect("fixture dimensions");
    for row in 0..height {
        for col in 0..width {
            grid.set(row, col, f(row, col)).expect("in bounds");
        }
    }
    let pixel = 360.0 / width as f64;
    Raster::single(grid, GeoTransform::global(pixel), Crs::WGS84, Some(0.0))
        .expect("fixture raster")
}

/// A two-region environment: value 1 in the western hemisphere, value 2
/// in the eastern.
pub fn two_region_raster(width: usize, height: usize) -> Raster {
    global_raster(width, height, |_, col| if col < width / 2 { 1.0 } else { 2.0 })
}

/// A presence grid matching [`global_raster`]'s shape with 1.0 at the
/// given cells.
pub fn presence_grid(width: usize, height: usize, cells: &[(usize, usize)]) -> Grid {
    let mut grid = Grid::new(width, height).expect("fixture dimensions");
    for &(row, col) in cells {
        grid.set(row, col, 1.0).expect("in bounds");
    }
    grid
}

/// An axis-aligned square as a ring.
pub fn square_ring(x0: f64, y0: f64, side: f64) -> Ring {
    Ring::new(vec![
        Point::new(x0, y0),
        Point::new(x0 + side, y0),
        Point::new(x0 + side, y0 + side),
        Point::new(x0, y0 + side),
    ])
    .expect("square ring")
}

/// A square range-map feature with IUCN-style attributes.
pub fn range_feature(x0: f64, y0: f64, side: f64, binomial: &str, presence_code: f64) -> Feature {
    let mut attributes = IndexMap::new();
    attributes.insert(
        "binomial".to_string(),
        AttrValue::Text(binomial.to_string()),
    );
    attributes.insert("presence".to_string(), AttrValue::Number(presence_code));
    Feature {
        geometry: MultiPolygon::new(vec![Polygon::new(square_ring(x0, y0, side), Vec::new())]),
        attributes,
    }
}

/// A tab-delimited occurrence export with one good, one filtered, and
/// one coordinate-free record.
pub const GBIF_EXPORT_TSV: &str = "\
gbifid\tspecies\tdecimallatitude\tdecimallongitude\tbasisofrecord\teventdate\tyear
1\tSalmo trutta\t46.5\t7.25\tHUMAN_OBSERVATION\t2014-05-02\t2014
2\tSalmo trutta\t46.6\t7.30\tPRESERVED_SPECIMEN\t1950-01-01\t1950
3\tSalmo trutta\t\t\tHUMAN_OBSERVATION\t2015-08-10\t2015
";

/// Two occurrence-service pages: a full one, then the terminal one.
pub const OCCURRENCE_PAGE_1: &str = r#"{
    "offset": 0, "limit": 2, "endOfRecords": false, "count": 3,
    "results": [
        {"key": 10, "scientificName": "Salmo trutta", "decimalLatitude": 46.5, "decimalLongitude": 7.2, "basisOfRecord": "HUMAN_OBSERVATION", "year": 2014},
        {"key": 11, "scientificName": "Salmo trutta", "decimalLatitude": 46.8, "decimalLongitude": 7.4, "basisOfRecord": "HUMAN_OBSERVATION", "year": 2016}
    ]
}"#;

/// The last page of the listing started by [`OCCURRENCE_PAGE_1`].
pub const OCCURRENCE_PAGE_2: &str = r#"{
    "offset": 2, "limit": 2, "endOfRecords": true, "count": 3,
    "results": [
        {"key": 12, "scientificName": "Salmo trutta", "decimalLatitude": 47.0, "decimalLongitude": 7.6, "basisOfRecord": "OBSERVATION", "year": 2018}
    ]
}"#;
