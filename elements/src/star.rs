// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::collections::BTreeMap;

use canonical_error::{CanonicalError, not_found_error};

use crate::astro_util::{degrees_from_dms, degrees_from_hms, project};
use crate::spectral::SpectralClass;

/// Right ascension in hours/minutes/seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HourAngle {
    pub hour: i64,
    pub minute: i64,
    pub second: f64,
}

/// Declination in degrees/arcminutes/arcseconds, with separate sign.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DegreeAngle {
    pub negative: bool,
    pub degree: i64,
    pub arcmin: i64,
    pub arcsec: f64,
}

/// The coordinates a catalog record supplies. Exactly one convention is
/// authoritative for a given record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CatalogCoordinates {
    // Degrees.
    Galactic { lon: f64, lat: f64 },
    Equatorial { ra: HourAngle, dec: DegreeAngle },
}

impl CatalogCoordinates {
    /// Returns (longitude, latitude) in degrees.
    pub fn lon_lat(&self) -> (f64, f64) {
        match self {
            CatalogCoordinates::Galactic{lon, lat} => (*lon, *lat),
            CatalogCoordinates::Equatorial{ra, dec} => (
                degrees_from_hms(ra.hour, ra.minute, ra.second),
                degrees_from_dms(dec.negative, dec.degree, dec.arcmin, dec.arcsec)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StarRecord {
    pub id: u32,
    pub name: String,
    pub coordinates: CatalogCoordinates,
    pub magnitude: f64,
    pub spectral_class: SpectralClass,

    // Computed at construction from `coordinates`.
    position: [f64; 3],
}

impl StarRecord {
    pub fn new(id: u32, name: &str, coordinates: CatalogCoordinates,
               magnitude: f64, spectral_class: SpectralClass, radius: f64) -> Self {
        let (lon, lat) = coordinates.lon_lat();
        StarRecord{
            id,
            name: name.trim().to_string(),
            coordinates,
            magnitude,
            spectral_class,
            position: project(lon, lat, radius),
        }
    }

    pub fn position(&self) -> [f64; 3] {
        self.position
    }

    /// Name used for labels: the catalog name without its 3 character
    /// constellation suffix (e.g. "Alp UMa" -> "Alp").
    pub fn label_name(&self) -> String {
        let keep = self.name.chars().count().saturating_sub(3);
        self.name.chars().take(keep).collect::<String>().trim_end().to_string()
    }
}

/// Stars keyed by catalog id. Iterates in id order.
#[derive(Debug, Default)]
pub struct StarIndex {
    stars: BTreeMap<u32, StarRecord>,
}

impl StarIndex {
    pub fn new() -> Self {
        StarIndex{..Default::default()}
    }

    /// Adds `star`, returning the record it replaced (if any).
    pub fn insert(&mut self, star: StarRecord) -> Option<StarRecord> {
        self.stars.insert(star.id, star)
    }

    pub fn get(&self, id: u32) -> Option<&StarRecord> {
        self.stars.get(&id)
    }

    /// Like get(), but an absent id is a NotFound error.
    pub fn lookup(&self, id: u32) -> Result<&StarRecord, CanonicalError> {
        self.stars.get(&id).ok_or_else(
            || not_found_error(format!("Star {} is not in the catalog", id).as_str()))
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StarRecord> {
        self.stars.values()
    }
}

// mod tests.
