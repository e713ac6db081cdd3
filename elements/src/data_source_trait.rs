// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use async_trait::async_trait;
use canonical_error::CanonicalError;

/// Supplies the text resources (catalog, line list, solar tables) that a
/// scene is built from.
#[async_trait]
pub trait DataSourceTrait {
    /// Returns the full contents of the resource at `path`, which is
    /// relative to the data source's root.
    /// Errors:
    ///   NotFound: there is no such resource.
    ///   Unavailable: the resource exists but could not be read.
    async fn fetch_text(&self, path: &str) -> Result<String, CanonicalError>;
}
