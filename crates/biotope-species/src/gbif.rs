//! Occurrence-based species data in the GBIF shape.

use std::path::Path;

use biotope_core::{Crs, GeoTransform, Grid};
use biotope_geom::{MultiPolygon, Point};
use biotope_raster::Raster;
use log::info;
use serde::Deserialize;

use crate::error::SpeciesError;
use crate::occurrence::Occurrence;
use crate::table::{CsvOptions, OccurrenceTable};

/// One page of the occurrence search endpoint.
///
/// The service pages with `limit`/`offset` and signals completion
/// through `endOfRecords`; pagination is known to be unreliable, so an
/// empty page also terminates the walk.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrencePage {
    /// Page offset echoed by the service.
    #[serde(default)]
    pub offset: u64,
    /// Page size echoed by the service.
    #[serde(default)]
    pub limit: u64,
    /// Whether the service considers the listing complete.
    #[serde(default)]
    pub end_of_records: bool,
    /// Total record count, when the service reports one.
    #[serde(default)]
    pub count: Option<u64>,
    /// The page's records.
    #[serde(default)]
    pub results: Vec<Occurrence>,
}

impl OccurrencePage {
    /// Whether fetching should stop after this page.
    pub fn is_last(&self) -> bool {
        self.end_of_records || self.results.is_empty()
    }
}

/// Parse one occurrence-search response body.
pub fn parse_occurrence_page(body: &str) -> Result<OccurrencePage, SpeciesError> {
    serde_json::from_str(body).map_err(|e| SpeciesError::Parse {
        detail: format!("occurrence page: {e}"),
    })
}

/// A species described by point occurrence records.
#[derive(Clone, Debug, Default)]
pub struct GbifSpecies {
    name: String,
    table: OccurrenceTable,
}

impl GbifSpecies {
    /// A species with no records yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: OccurrenceTable::new(),
        }
    }

    /// The species' scientific name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the species (when reusing one object across a loop of
    /// species, as batch processing does).
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The occurrence table.
    pub fn get_data(&self) -> &OccurrenceTable {
        &self.table
    }

    /// Replace the occurrence table. **Careful**, it overwrites the
    /// existing data.
    pub fn set_data(&mut self, table: OccurrenceTable) {
        self.table = table;
    }

    /// Load occurrence records from a delimited export file.
    pub fn load_csv(&mut self, path: &Path, opts: &CsvOptions) -> Result<(), SpeciesError> {
        self.table = OccurrenceTable::load_csv(path, opts)?;
        Ok(())
    }

    /// Save the records as CSV.
    pub fn save_csv(&self, path: &Path) -> Result<(), SpeciesError> {
        self.table.save_csv(path)
    }

    /// Fetch all occurrence records for this species from the live
    /// occurrence service, replacing the table.
    ///
    /// Resolves the name against the service backbone, then pages
    /// through the occurrence search until the end-of-records signal.
    /// No automatic retries: a failed page fails the fetch.
    #[cfg(feature = "remote")]
    pub fn find_species_occurrences(
        &mut self,
        client: &crate::client::GbifClient,
    ) -> Result<usize, SpeciesError> {
        let taxon_key = client.match_species(&self.name)?;
        let records = client.fetch_all_occurrences(taxon_key)?;
        info!(
            "fetched {} occurrence records for '{}' (taxon {taxon_key})",
            records.len(),
            self.name
        );
        self.table = OccurrenceTable::from_records(records);
        Ok(self.table.len())
    }

    /// Without the `remote` feature, live fetching reports
    /// [`SpeciesError::RemoteDisabled`].
    #[cfg(not(feature = "remote"))]
    pub fn find_species_occurrences(&mut self) -> Result<usize, SpeciesError> {
        Err(SpeciesError::RemoteDisabled)
    }

    /// The georeferenced records as world points.
    pub fn geometrize(&self) -> Vec<Point> {
        self.table.geometrize()
    }

    /// Keep only records whose point falls inside `range` (an expert
    /// range map or other footprint). Returns how many records remain.
    pub fn overlay(&mut self, range: &MultiPolygon) -> usize {
        let records: Vec<Occurrence> = self
            .table
            .records()
            .iter()
            .filter(|r| r.point().map(|p| range.contains(&p)).unwrap_or(false))
            .cloned()
            .collect();
        info!(
            "overlay kept {} of {} records for '{}'",
            records.len(),
            self.table.len(),
            self.name
        );
        self.table = OccurrenceTable::from_records(records);
        self.table.len()
    }

    /// Bin the occurrence points into a global presence grid.
    ///
    /// Cells holding at least one record get value 1, everything else 0;
    /// the result is a single-band raster on the global geographic
    /// extent at `pixel_size` degrees.
    pub fn rasterize(&self, pixel_size: f64) -> Result<Raster, SpeciesError> {
        let transform = GeoTransform::global(pixel_size);
        let width = ((360.0 / pixel_size) as usize).max(1);
        let height = ((180.0 / pixel_size) as usize).max(1);
        let mut grid = Grid::new(width, height).map_err(biotope_raster::RasterError::Grid)?;
        let mut binned = 0usize;
        for p in self.geometrize() {
            if let Some((row, col)) = transform.world_to_pixel(p.x, p.y, width, height) {
                grid.set(row, col, 1.0).map_err(biotope_raster::RasterError::Grid)?;
                binned += 1;
            }
        }
        info!(
            "rasterized {binned} occurrence points of '{}' into a {height}x{width} presence grid",
            self.name
        );
        Ok(Raster::single(grid, transform, Crs::WGS84, Some(0.0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biotope_geom::{Polygon, Ring};

    fn species_with_points(points: &[(f64, f64)]) -> GbifSpecies {
        let records = points
            .iter()
            .map(|&(lat, lon)| Occurrence {
                decimal_latitude: Some(lat),
                decimal_longitude: Some(lon),
                ..Default::default()
            })
            .collect();
        let mut s = GbifSpecies::new("Testus examplus");
        s.set_data(OccurrenceTable::from_records(records));
        s
    }

    fn square_range(x0: f64, y0: f64, side: f64) -> MultiPolygon {
        MultiPolygon::new(vec![Polygon::new(
            Ring::new(vec![
                Point::new(x0, y0),
                Point::new(x0 + side, y0),
                Point::new(x0 + side, y0 + side),
                Point::new(x0, y0 + side),
            ])
            .unwrap(),
            Vec::new(),
        )])
    }

    #[test]
    fn page_parsing_and_termination() {
        let body = r#"{
            "offset": 0, "limit": 2, "endOfRecords": false, "count": 3,
            "results": [
                {"key": 1, "decimalLatitude": 10.0, "decimalLongitude": 20.0},
                {"key": 2, "decimalLatitude": 11.0, "decimalLongitude": 21.0}
            ]
        }"#;
        let page = parse_occurrence_page(body).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.count, Some(3));
        assert!(!page.is_last());

        let last = parse_occurrence_page(
            r#"{"offset": 2, "limit": 2, "endOfRecords": true, "results": [{"key": 3}]}"#,
        )
        .unwrap();
        assert!(last.is_last());

        // An empty page ends the walk even when the flag says otherwise.
        let empty = parse_occurrence_page(
            r#"{"offset": 4, "limit": 2, "endOfRecords": false, "results": []}"#,
        )
        .unwrap();
        assert!(empty.is_last());
    }

    #[test]
    fn bad_page_is_a_parse_error() {
        assert!(matches!(
            parse_occurrence_page("{not json"),
            Err(SpeciesError::Parse { .. })
        ));
    }

    #[test]
    fn overlay_keeps_points_inside_the_range() {
        let mut s = species_with_points(&[(5.0, 5.0), (5.0, 50.0), (-40.0, 5.0)]);
        let kept = s.overlay(&square_range(0.0, 0.0, 10.0));
        assert_eq!(kept, 1);
        assert_eq!(s.get_data().records()[0].decimal_latitude, Some(5.0));
        assert_eq!(s.get_data().records()[0].decimal_longitude, Some(5.0));
    }

    #[test]
    fn rasterize_bins_points_into_presence_cells() {
        // Two points in the same cell, one in another.
        let s = species_with_points(&[(10.2, 20.2), (10.3, 20.4), (-5.0, -60.0)]);
        let raster = s.rasterize(1.0).unwrap();
        let grid = raster.band(1).unwrap();
        assert!(grid.is_binary());
        assert_eq!(grid.count_nonzero(), 2);
        let coords = raster.pixel_to_world_coordinates(1, true).unwrap();
        assert_eq!(coords.len(), 2);
    }

    #[cfg(not(feature = "remote"))]
    #[test]
    fn remote_fetch_reports_disabled() {
        let mut s = GbifSpecies::new("Salmo trutta");
        assert!(matches!(
            s.find_species_occurrences(),
            Err(SpeciesError::RemoteDisabled)
        ));
    }
}
