// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use astro::angle::{deg_frm_dms, deg_frm_hms};

/// Radius of the celestial sphere, in world units. Stars and the sun all lie
/// on this one sphere.
pub const WORLD_RADIUS: f64 = 100.0;

/// Projects a point given by longitude and latitude (both degrees) onto the
/// surface of a sphere of the given radius.
///
/// The polar angle is the colatitude (90 - latitude) and the azimuth is the
/// longitude, so that:
///   x = r * sin(colat) * cos(lon)
///   y = r * sin(colat) * sin(lon)
///   z = r * cos(colat)
pub fn project(lon_deg: f64, lat_deg: f64, radius: f64) -> [f64; 3] {
    let colatitude = (90.0 - lat_deg).to_radians();
    let azimuth = lon_deg.to_radians();
    [
        radius * colatitude.sin() * azimuth.cos(),
        radius * colatitude.sin() * azimuth.sin(),
        radius * colatitude.cos(),
    ]
}

/// Combines right ascension hour/minute/second into decimal degrees.
pub fn degrees_from_hms(hour: i64, minute: i64, second: f64) -> f64 {
    deg_frm_hms(hour, minute, second)
}

/// Combines degree/arcminute/arcsecond into decimal degrees. The sign is
/// passed separately because catalogs carry "-00 30 00" style declinations
/// where the degree field alone cannot hold the sign.
pub fn degrees_from_dms(negative: bool, degree: i64, arcmin: i64,
                        arcsec: f64) -> f64 {
    let magnitude = deg_frm_dms(degree.abs(), arcmin.abs(), arcsec.abs());
    if negative { -magnitude } else { magnitude }
}

/// Returns the center of the axis-aligned bounding box enclosing `points`,
/// or None if `points` is empty.
pub fn bounding_box_center(points: &[[f64; 3]]) -> Option<[f64; 3]> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    Some([
        0.5 * (min[0] + max[0]),
        0.5 * (min[1] + max[1]),
        0.5 * (min[2] + max[2]),
    ])
}

// mod tests.
