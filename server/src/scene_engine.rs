// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::sync::Arc;
use std::time::Instant;

use canonical_error::{CanonicalError, CanonicalErrorCode};
use futures::join;
use log::{debug, info, warn};
use serde::Deserialize;

use skysphere_elements::astro_util::WORLD_RADIUS;
use skysphere_elements::calendar::{DateResolution, Era, resolve_date,
                                   today_date_string};
use skysphere_elements::constellation::{ConstellationFigure, build_constellations};
use skysphere_elements::data_source_trait::DataSourceTrait;
use skysphere_elements::scene::SceneModel;
use skysphere_elements::solar_table::{SolarPosition, SolarTableFormat, solar_position};
use skysphere_elements::star::StarIndex;
use skysphere_elements::star_catalog::{CatalogLayout, load_star_catalog};

/// Where the engine finds its inputs and how it interprets them.
#[derive(Clone, Debug)]
pub struct SceneSettings {
    // Resource paths, relative to the data source root.
    pub catalog_path: String,
    pub constellation_path: String,
    pub solar_dir: String,

    pub catalog_layout: CatalogLayout,

    // None means use each table's own format.
    pub solar_format: Option<SolarTableFormat>,

    pub radius: f64,
}

impl Default for SceneSettings {
    fn default() -> Self {
        SceneSettings{
            catalog_path: "bsc5.dat".to_string(),
            constellation_path: "ConstellationLines.dat".to_string(),
            solar_dir: "Solar_data".to_string(),
            catalog_layout: CatalogLayout::baseline(),
            solar_format: None,
            radius: WORLD_RADIUS,
        }
    }
}

/// Query parameters of a scene request. Absent values take defaults: era
/// "a", today's date, and the millennium of the date.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SceneRequest {
    pub era: Option<String>,
    #[serde(rename = "dateStr")]
    pub date_str: Option<String>,
    pub mill: Option<String>,
}

impl SceneRequest {
    pub fn resolve(&self) -> Result<DateResolution, CanonicalError> {
        let era = Era::parse(self.era.as_deref().unwrap_or("a"))?;
        let date_str = match &self.date_str {
            Some(d) => d.clone(),
            None => today_date_string(),
        };
        resolve_date(era, &date_str, self.mill.as_deref())
    }
}

pub struct SceneEngine {
    data_source: Arc<dyn DataSourceTrait + Send + Sync>,
    settings: SceneSettings,
}

impl SceneEngine {
    pub fn new(data_source: Arc<dyn DataSourceTrait + Send + Sync>,
               settings: SceneSettings) -> Self {
        SceneEngine{data_source, settings}
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Builds the scene for `request`. Only an invalid request is an error;
    /// missing or malformed inputs leave the corresponding part of the scene
    /// empty.
    pub async fn build_scene(&self, request: &SceneRequest)
                             -> Result<SceneModel, CanonicalError> {
        let start = Instant::now();
        let resolution = request.resolve()?;
        debug!("Resolved {:?} to {:?}", request, resolution);

        // The sun does not depend on the stars, so fetch its table meanwhile.
        let ((index, figures), sun) =
            join!(self.build_stars(), self.locate_sun(&resolution));

        let scene = SceneModel::assemble(resolution, &index, figures, sun);
        info!("Built scene for {} with {} points, {} lines, {} labels in {:?}",
              scene.date.date_str, scene.points.len(), scene.lines.len(),
              scene.labels.len(), start.elapsed());
        Ok(scene)
    }

    // Loads the catalog, then (only once the index is complete) the line
    // list.
    async fn build_stars(&self) -> (StarIndex, Vec<ConstellationFigure>) {
        let mut index = StarIndex::new();
        let catalog_path = &self.settings.catalog_path;
        match self.data_source.fetch_text(catalog_path).await {
            Ok(text) => {
                load_star_catalog(&text, &self.settings.catalog_layout,
                                  self.settings.radius, &mut index);
            },
            Err(e) => {
                warn!("Could not fetch star catalog {}: {:?}", catalog_path, e);
                return (index, Vec::new());
            }
        }

        let constellation_path = &self.settings.constellation_path;
        let figures = match self.data_source.fetch_text(constellation_path).await {
            Ok(text) => build_constellations(&text, &index),
            Err(e) => {
                warn!("Could not fetch constellation lines {}: {:?}",
                      constellation_path, e);
                Vec::new()
            }
        };
        (index, figures)
    }

    async fn locate_sun(&self, resolution: &DateResolution) -> Option<SolarPosition> {
        let selection = &resolution.selection;
        let path = format!("{}/{}", self.settings.solar_dir, selection.file_name());
        let table = match self.data_source.fetch_text(&path).await {
            Ok(table) => table,
            Err(e) => {
                warn!("Could not fetch solar table {}: {:?}", path, e);
                return None;
            }
        };
        let format = self.settings.solar_format
            .unwrap_or_else(|| selection.default_format());
        match solar_position(&table, &resolution.date_str, format, self.settings.radius) {
            Ok(sun) => {
                if let Some(expected) = resolution.row_offset {
                    if sun.row as i64 != expected {
                        debug!("{} found at row {} of {}, expected row {}",
                               resolution.date_str, sun.row, path, expected);
                    }
                }
                Some(sun)
            },
            Err(e) if e.code == CanonicalErrorCode::OutOfRange => {
                info!("No sun: {}", e.message);
                None
            },
            Err(e) => {
                warn!("No sun: bad row in {}: {:?}", path, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate approx;
    use approx::assert_abs_diff_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use canonical_error::not_found_error;

    use super::*;

    // In-memory resources; records the order in which fetches finish.
    #[derive(Default)]
    struct MemoryDataSource {
        resources: HashMap<String, String>,
        completed: Mutex<Vec<String>>,
    }

    impl MemoryDataSource {
        fn with(mut self, path: &str, text: &str) -> Self {
            self.resources.insert(path.to_string(), text.to_string());
            self
        }
    }

    #[async_trait]
    impl DataSourceTrait for MemoryDataSource {
        async fn fetch_text(&self, path: &str) -> Result<String, CanonicalError> {
            // Give other fetches a chance to interleave.
            tokio::task::yield_now().await;
            self.completed.lock().unwrap().push(path.to_string());
            self.resources.get(path).cloned().ok_or_else(
                || not_found_error(format!("No resource {}", path).as_str()))
        }
    }

    fn catalog_line(id: &str, name: &str, lon: &str, lat: &str, mag: &str,
                    class: &str) -> String {
        let mut bytes = vec![b' '; 140];
        for (at, text) in [(0, id), (4, name), (90, lon), (96, lat), (102, mag),
                           (129, class)] {
            bytes[at..at + text.len()].copy_from_slice(text.as_bytes());
        }
        String::from_utf8(bytes).unwrap()
    }

    const SOLAR_TABLE: &str = "\
 2023-Jun-14,  083.12345,   0.000100,
 2023-Jun-15,  084.08000,  -0.000200,
";

    fn engine(source: Arc<MemoryDataSource>) -> SceneEngine {
        SceneEngine::new(source, SceneSettings::default())
    }

    fn request(era: &str, date_str: &str) -> SceneRequest {
        SceneRequest{era: Some(era.to_string()), date_str: Some(date_str.to_string()),
                     mill: None}
    }

    #[tokio::test]
    async fn test_truncated_catalog_line() {
        let catalog = [
            catalog_line("   1", "Alp Lyr", " 67.45", " 19.24", " 0.03", "A"),
            "   2 Bet Lyr".to_string(),
        ].join("\n");
        let source = Arc::new(MemoryDataSource::default()
                              .with("bsc5.dat", &catalog)
                              .with("ConstellationLines.dat", "Lyr 1 1 2"));
        let scene = engine(source).build_scene(&request("a", "2023-Jun-15"))
            .await.unwrap();
        assert_eq!(scene.star_ids, vec![1]);
        assert_eq!(scene.lines.len(), 1);
        assert_eq!(scene.lines[0].points.len(), 1);
        assert_eq!(scene.lines[0].star_ids, vec![1]);
        // No solar table available.
        assert!(scene.sun.is_none());
        assert_eq!(scene.points.len(), 1);
    }

    #[tokio::test]
    async fn test_full_scene() {
        let catalog = [
            catalog_line("   1", "Alp Lyr", " 67.45", " 19.24", " 0.03", "A"),
            catalog_line("   2", "Bet Lyr", " 63.60", " 14.95", " 3.52", "B"),
        ].join("\n");
        let source = Arc::new(MemoryDataSource::default()
                              .with("bsc5.dat", &catalog)
                              .with("ConstellationLines.dat",
                                    "# Lyra\nLyr 1 1 2 t\n")
                              .with("Solar_data/a2k.csv", SOLAR_TABLE));
        let scene = engine(source.clone()).build_scene(&request("a", "2023-Jun-15"))
            .await.unwrap();
        assert_eq!(scene.star_ids, vec![1, 2]);
        assert_eq!(scene.points.len(), 3);
        assert_eq!(scene.labels.len(), 3);
        let sun = scene.sun.unwrap();
        assert_eq!(sun.table, "a2k");
        assert_eq!(sun.point_index, 2);
        assert_eq!(sun.solar_position.row, 1);
        assert_abs_diff_eq!(sun.solar_position.lon, 84.08, epsilon = 1e-9);

        // The line list is only read after the catalog.
        let completed = source.completed.lock().unwrap().clone();
        let catalog_pos = completed.iter().position(|p| p == "bsc5.dat").unwrap();
        let lines_pos = completed.iter()
            .position(|p| p == "ConstellationLines.dat").unwrap();
        assert!(catalog_pos < lines_pos);
        assert_eq!(completed.len(), 3);
    }

    #[tokio::test]
    async fn test_date_outside_table() {
        let source = Arc::new(MemoryDataSource::default()
                              .with("Solar_data/a2k.csv", SOLAR_TABLE));
        let scene = engine(source).build_scene(&request("a", "2023-Jul-01"))
            .await.unwrap();
        assert!(scene.sun.is_none());
        assert!(scene.points.is_empty());
        assert!(scene.lines.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_date() {
        let source = Arc::new(MemoryDataSource::default());
        let err = engine(source.clone()).build_scene(&request("a", "2023-Foo-15"))
            .await.unwrap_err();
        assert_eq!(err.code, CanonicalErrorCode::InvalidArgument);
        // Nothing was fetched.
        assert!(source.completed.lock().unwrap().is_empty());

        let err = engine(source).build_scene(&request("z", "2023-Jun-15"))
            .await.unwrap_err();
        assert_eq!(err.code, CanonicalErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn test_era_b_and_mill_override() {
        let source = Arc::new(MemoryDataSource::default());
        let scene = engine(source.clone()).build_scene(&request("b", "9500-Jan-01"))
            .await.unwrap();
        assert_eq!(scene.date.selection.table_name(), "b9k");

        let req = SceneRequest{mill: Some("3".to_string()),
                               ..request("a", "2023-Jun-15")};
        let scene = engine(source.clone()).build_scene(&req).await.unwrap();
        assert_eq!(scene.date.selection.table_name(), "a3k");
        assert!(source.completed.lock().unwrap()
                .contains(&"Solar_data/a3k.csv".to_string()));
    }

    #[test]
    fn test_request_defaults() {
        let resolution = SceneRequest::default().resolve().unwrap();
        assert_eq!(resolution.selection.era, Era::A);
        assert_eq!(resolution.date_str, today_date_string());
    }
}  // mod tests.
