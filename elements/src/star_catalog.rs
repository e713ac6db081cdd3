// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// Fixed-width star catalog parsing. Field positions are 0-based, half-open
// byte ranges; see http://tdc-www.harvard.edu/catalogs/bsc5.readme for the
// Yale Bright Star Catalogue layout these are derived from.

use std::ops::Range;
use std::str::FromStr;

use canonical_error::{CanonicalError, data_loss_error, invalid_argument_error};
use log::{debug, info};

use crate::spectral::SpectralClass;
use crate::star::{CatalogCoordinates, DegreeAngle, HourAngle, StarIndex, StarRecord};

#[derive(Clone, Debug, PartialEq)]
pub enum CoordinateColumns {
    Galactic {
        lon: Range<usize>,
        lat: Range<usize>,
    },
    Equatorial {
        ra_hour: Range<usize>,
        ra_minute: Range<usize>,
        ra_second: Range<usize>,
        dec_sign: Range<usize>,
        dec_degree: Range<usize>,
        dec_arcmin: Range<usize>,
        dec_arcsec: Range<usize>,
    },
}

/// Column map of one catalog edition.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogLayout {
    pub label: &'static str,
    pub id: Range<usize>,
    pub name: Range<usize>,
    pub magnitude: Range<usize>,
    pub spectral_class: Range<usize>,
    pub coordinates: CoordinateColumns,

    // Lines shorter than this are rejected.
    pub min_width: usize,
}

impl CatalogLayout {
    /// BSC5 with galactic coordinates.
    pub fn baseline() -> Self {
        CatalogLayout{
            label: "baseline",
            id: 0..4,
            name: 4..14,
            magnitude: 102..107,
            spectral_class: 129..130,
            coordinates: CoordinateColumns::Galactic{lon: 90..96, lat: 96..102},
            min_width: 130,
        }
    }

    /// BSC5 using the J2000 right ascension and declination columns.
    pub fn equatorial() -> Self {
        CatalogLayout{
            label: "equatorial",
            coordinates: CoordinateColumns::Equatorial{
                ra_hour: 75..77,
                ra_minute: 77..79,
                ra_second: 79..83,
                dec_sign: 83..84,
                dec_degree: 84..86,
                dec_arcmin: 86..88,
                dec_arcsec: 88..90,
            },
            ..Self::baseline()
        }
    }

    /// Edited catalog with a five character id; everything after the id is
    /// one column to the right of the baseline.
    pub fn edited() -> Self {
        CatalogLayout{
            label: "edited",
            id: 0..5,
            name: 5..15,
            magnitude: 103..108,
            spectral_class: 130..131,
            coordinates: CoordinateColumns::Galactic{lon: 91..97, lat: 97..103},
            min_width: 131,
        }
    }

    pub fn from_label(label: &str) -> Result<Self, CanonicalError> {
        match label {
            "baseline" => Ok(Self::baseline()),
            "equatorial" => Ok(Self::equatorial()),
            "edited" => Ok(Self::edited()),
            _ => Err(invalid_argument_error(
                format!("Unknown catalog layout {:?}; expected baseline, equatorial \
                         or edited", label).as_str())),
        }
    }
}

fn field<'a>(line: &'a str, range: &Range<usize>, what: &str)
             -> Result<&'a str, CanonicalError> {
    line.get(range.clone()).ok_or_else(|| data_loss_error(
        format!("No {} field at {:?}", what, range).as_str()))
}

fn number<T: FromStr>(line: &str, range: &Range<usize>, what: &str)
                      -> Result<T, CanonicalError> {
    let text = field(line, range, what)?.trim();
    text.parse::<T>().map_err(|_| data_loss_error(
        format!("Invalid {} {:?}", what, text).as_str()))
}

fn parse_coordinates(line: &str, columns: &CoordinateColumns)
                     -> Result<CatalogCoordinates, CanonicalError> {
    match columns {
        CoordinateColumns::Galactic{lon, lat} => Ok(CatalogCoordinates::Galactic{
            lon: number(line, lon, "galactic longitude")?,
            lat: number(line, lat, "galactic latitude")?,
        }),
        CoordinateColumns::Equatorial{ra_hour, ra_minute, ra_second, dec_sign,
                                      dec_degree, dec_arcmin, dec_arcsec} => {
            let negative = match field(line, dec_sign, "declination sign")? {
                "-" => true,
                "+" | " " => false,
                other => return Err(data_loss_error(
                    format!("Invalid declination sign {:?}", other).as_str())),
            };
            Ok(CatalogCoordinates::Equatorial{
                ra: HourAngle{
                    hour: number(line, ra_hour, "RA hours")?,
                    minute: number(line, ra_minute, "RA minutes")?,
                    second: number(line, ra_second, "RA seconds")?,
                },
                dec: DegreeAngle{
                    negative,
                    degree: number(line, dec_degree, "declination degrees")?,
                    arcmin: number(line, dec_arcmin, "declination arcminutes")?,
                    arcsec: number(line, dec_arcsec, "declination arcseconds")?,
                },
            })
        }
    }
}

/// Decodes one catalog line. Returns a DataLoss error if the line is too
/// short or any numeric field is blank or malformed.
pub fn parse_star_line(line: &str, layout: &CatalogLayout, radius: f64)
                       -> Result<StarRecord, CanonicalError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.len() < layout.min_width {
        return Err(data_loss_error(
            format!("Line has {} characters, need at least {}",
                    line.len(), layout.min_width).as_str()));
    }
    let id: u32 = number(line, &layout.id, "catalog id")?;
    let name = field(line, &layout.name, "name")?;
    let coordinates = parse_coordinates(line, &layout.coordinates)?;
    let magnitude: f64 = number(line, &layout.magnitude, "magnitude")?;
    let spectral_class = SpectralClass::from_field(
        field(line, &layout.spectral_class, "spectral class")?);
    Ok(StarRecord::new(id, name, coordinates, magnitude, spectral_class, radius))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogLoadStats {
    pub loaded: usize,
    pub skipped: usize,

    // Loaded records whose id was already present.
    pub replaced: usize,
}

/// Parses every line of `text` into `index`. Malformed lines are skipped;
/// blank lines are ignored.
pub fn load_star_catalog(text: &str, layout: &CatalogLayout, radius: f64,
                         index: &mut StarIndex) -> CatalogLoadStats {
    let mut stats = CatalogLoadStats::default();
    for (line_num, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_star_line(line, layout, radius) {
            Ok(star) => {
                stats.loaded += 1;
                if index.insert(star).is_some() {
                    stats.replaced += 1;
                }
            },
            Err(e) => {
                debug!("Skipping catalog line {}: {}", line_num + 1, e.message);
                stats.skipped += 1;
            }
        }
    }
    info!("Loaded {} stars ({} replaced, {} lines skipped) using {} layout",
          stats.loaded, stats.replaced, stats.skipped, layout.label);
    stats
}

#[cfg(test)]
pub(crate) mod tests {
    extern crate approx;
    use approx::assert_abs_diff_eq;
    use canonical_error::CanonicalErrorCode;

    use super::*;

    // Builds a fixed-width line of `width` characters with the given fields
    // written at their offsets.
    pub(crate) fn fixed_width_line(width: usize, fields: &[(usize, &str)]) -> String {
        let mut bytes = vec![b' '; width];
        for (at, text) in fields {
            bytes[*at..*at + text.len()].copy_from_slice(text.as_bytes());
        }
        String::from_utf8(bytes).unwrap()
    }

    pub(crate) fn baseline_line(id: &str, name: &str, lon: &str, lat: &str,
                                mag: &str, class: &str) -> String {
        fixed_width_line(147, &[(0, id), (4, name), (90, lon), (96, lat),
                                (102, mag), (129, class)])
    }

    #[test]
    fn test_baseline() {
        let line = baseline_line("  42", "Alp UMa", "142.85", " 51.01", " 1.79", "K");
        let star = parse_star_line(&line, &CatalogLayout::baseline(), 100.0).unwrap();
        assert_eq!(star.id, 42);
        assert_eq!(star.name, "Alp UMa");
        assert_eq!(star.coordinates,
                   CatalogCoordinates::Galactic{lon: 142.85, lat: 51.01});
        assert_abs_diff_eq!(star.magnitude, 1.79, epsilon = 1e-9);
        assert_eq!(star.spectral_class, SpectralClass::K);
    }

    #[test]
    fn test_equatorial() {
        let line = fixed_width_line(
            130, &[(0, "4301"), (4, "50Alp UMa"), (75, "11"), (77, "03"),
                   (79, "43.7"), (83, "+"), (84, "61"), (86, "45"), (88, "03"),
                   (102, " 1.79"), (129, "K")]);
        let star = parse_star_line(&line, &CatalogLayout::equatorial(), 1.0).unwrap();
        let (lon, lat) = star.coordinates.lon_lat();
        assert_abs_diff_eq!(lon, 165.932083, epsilon = 1e-5);
        assert_abs_diff_eq!(lat, 61.750833, epsilon = 1e-5);

        let southern = line.replacen('+', "-", 1);
        let star = parse_star_line(&southern, &CatalogLayout::equatorial(), 1.0).unwrap();
        assert_abs_diff_eq!(star.coordinates.lon_lat().1, -61.750833, epsilon = 1e-5);

        let bad_sign = line.replacen('+', "*", 1);
        assert!(parse_star_line(&bad_sign, &CatalogLayout::equatorial(), 1.0).is_err());
    }

    #[test]
    fn test_edited() {
        let line = fixed_width_line(
            131, &[(0, "12345"), (5, "Bet Ori"), (91, "209.24"), (97, "-25.25"),
                   (103, " 0.12"), (130, "B")]);
        let star = parse_star_line(&line, &CatalogLayout::edited(), 100.0).unwrap();
        assert_eq!(star.id, 12345);
        assert_eq!(star.name, "Bet Ori");
        assert_eq!(star.spectral_class, SpectralClass::B);
        // The same line does not fit the baseline layout.
        assert!(parse_star_line(&line, &CatalogLayout::baseline(), 100.0).is_err());
    }

    #[test]
    fn test_rejects() {
        let layout = CatalogLayout::baseline();
        let good = baseline_line("   1", "x", "  1.00", "  2.00", " 3.00", "G");
        assert!(parse_star_line(&good, &layout, 100.0).is_ok());

        let short = &good[..120];
        assert_eq!(parse_star_line(short, &layout, 100.0).unwrap_err().code,
                   CanonicalErrorCode::DataLoss);
        let bad_id = good.replacen("   1", "  x1", 1);
        assert!(parse_star_line(&bad_id, &layout, 100.0).is_err());
        let blank_mag = baseline_line("   1", "x", "  1.00", "  2.00", "     ", "G");
        assert!(parse_star_line(&blank_mag, &layout, 100.0).is_err());
        // Spectral class may be blank.
        let blank_class = baseline_line("   1", "x", "  1.00", "  2.00", " 3.00", " ");
        assert_eq!(parse_star_line(&blank_class, &layout, 100.0).unwrap().spectral_class,
                   SpectralClass::Unknown);
        // Trailing carriage return is tolerated.
        assert!(parse_star_line(&format!("{}\r", good), &layout, 100.0).is_ok());
    }

    #[test]
    fn test_load_star_catalog() {
        let text = [
            baseline_line("   1", "One", "  1.00", "  2.00", " 3.00", "G"),
            "   2 truncated".to_string(),
            String::new(),
            baseline_line("   3", "Three", "  1.00", "  2.00", " 3.00", "M"),
            baseline_line("   1", "Uno", "  1.00", "  2.00", " 3.00", "G"),
        ].join("\n");
        let mut index = StarIndex::new();
        let stats = load_star_catalog(&text, &CatalogLayout::baseline(), 100.0, &mut index);
        assert_eq!(stats, CatalogLoadStats{loaded: 3, skipped: 1, replaced: 1});
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(1).unwrap().name, "Uno");
        assert!(index.get(2).is_none());
    }

    #[test]
    fn test_from_label() {
        assert_eq!(CatalogLayout::from_label("edited").unwrap(), CatalogLayout::edited());
        assert!(CatalogLayout::from_label("bogus").is_err());
    }
}  // mod tests.
