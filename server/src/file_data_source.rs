// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use canonical_error::{CanonicalError, invalid_argument_error, not_found_error,
                      unavailable_error};
use glob::glob;
use log::{debug, warn};

use skysphere_elements::data_source_trait::DataSourceTrait;

/// Serves resources from files under a root directory.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    root: PathBuf,
}

impl FileDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileDataSource{root: root.into()}
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, CanonicalError> {
        let relative = Path::new(path);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(invalid_argument_error(
                format!("Resource path {:?} must be relative to the data directory",
                        path).as_str()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DataSourceTrait for FileDataSource {
    async fn fetch_text(&self, path: &str) -> Result<String, CanonicalError> {
        let full_path = self.resolve(path)?;
        debug!("Reading {:?}", full_path);
        tokio::fs::read_to_string(&full_path).await.map_err(|e| {
            let msg = format!("Could not read {:?}: {}", full_path, e);
            match e.kind() {
                ErrorKind::NotFound => not_found_error(msg.as_str()),
                _ => unavailable_error(msg.as_str()),
            }
        })
    }
}

/// Returns the names (e.g. "a2k") of the solar tables present in `dir`,
/// sorted.
pub fn available_solar_tables(dir: &Path) -> Vec<String> {
    let pattern = dir.join("*.csv");
    let mut names = Vec::new();
    let entries = match glob(&pattern.to_string_lossy()) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Error globbing pattern {:?}: {:?}", pattern, e);
            return names;
        }
    };
    for entry in entries {
        match entry {
            Ok(path) => {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().to_string());
                }
            },
            Err(e) => warn!("Could not read solar table entry: {:?}", e),
        }
    }
    names.sort();
    names
}

// mod tests.
