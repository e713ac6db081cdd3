// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::ops::Range;

use canonical_error::{CanonicalError, data_loss_error, invalid_argument_error,
                      out_of_range_error};
use serde::Serialize;

use crate::astro_util::project;
use crate::spectral::Rgb;

pub const SUN_MAGNITUDE: f64 = -26.74;
pub const SUN_COLOR: Rgb = Rgb(0xfcffb5);
pub const SUN_SIZE: f64 = 15.0;

/// Column positions of the solar longitude/latitude within a table row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SolarTableFormat {
    Standard,
    // One column to the right of Standard.
    Shifted,
}

impl SolarTableFormat {
    fn lon_columns(&self) -> Range<usize> {
        match self {
            SolarTableFormat::Standard => 15..24,
            SolarTableFormat::Shifted => 16..25,
        }
    }

    fn lat_columns(&self) -> Range<usize> {
        match self {
            SolarTableFormat::Standard => 27..36,
            SolarTableFormat::Shifted => 28..37,
        }
    }

    pub fn from_label(label: &str) -> Result<Self, CanonicalError> {
        match label {
            "standard" => Ok(SolarTableFormat::Standard),
            "shifted" => Ok(SolarTableFormat::Shifted),
            _ => Err(invalid_argument_error(
                format!("Unknown solar table format {:?}; expected standard or shifted",
                        label).as_str())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolarPosition {
    // Degrees.
    pub lon: f64,
    pub lat: f64,
    // Zero based index of the table row the position came from.
    pub row: usize,
    pub position: [f64; 3],
}

/// Returns the index and text of the first row containing `date_str`.
/// Later rows that also match are never considered.
pub fn find_row<'a>(table: &'a str, date_str: &str)
                    -> Result<(usize, &'a str), CanonicalError> {
    table.lines().enumerate()
        .find(|(_, row)| row.contains(date_str))
        .ok_or_else(|| out_of_range_error(
            format!("Date {} is not covered by the solar table", date_str).as_str()))
}

fn angle(row: &str, columns: Range<usize>, what: &str) -> Result<f64, CanonicalError> {
    let text = row.get(columns.clone()).ok_or_else(|| data_loss_error(
        format!("Solar table row has no {} at {:?}: {:?}", what, columns, row).as_str()))?;
    text.trim().parse::<f64>().map_err(|_| data_loss_error(
        format!("Invalid solar {} {:?}", what, text).as_str()))
}

/// Finds `date_str` in `table` and projects the sun's position onto the
/// sphere of the given radius.
/// Errors:
///   OutOfRange: the table has no row for `date_str`.
///   DataLoss: the matching row's longitude/latitude could not be parsed.
pub fn solar_position(table: &str, date_str: &str, format: SolarTableFormat,
                      radius: f64) -> Result<SolarPosition, CanonicalError> {
    let (row_index, row) = find_row(table, date_str)?;
    let lon = angle(row, format.lon_columns(), "longitude")?;
    let lat = angle(row, format.lat_columns(), "latitude")?;
    Ok(SolarPosition{lon, lat, row: row_index, position: project(lon, lat, radius)})
}

// mod tests.
