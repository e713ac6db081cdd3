// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// Builds constellation stick figures from a line list. Each row reads
//   <name> <segment count> <star id> <star id> ... [t|f]
// with fields separated by runs of spaces and/or commas.

use log::{debug, info};
use serde::Serialize;

use crate::astro_util::bounding_box_center;
use crate::spectral::Rgb;
use crate::star::StarIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LineStyle {
    Default,
    // Selected by a trailing 't' flag.
    Highlighted,
}

impl LineStyle {
    pub fn color(&self) -> Rgb {
        match self {
            LineStyle::Default => Rgb(0x008888),
            LineStyle::Highlighted => Rgb(0xff0000),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LabelKind {
    StarName,
    ConstellationName,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelAnchor {
    pub text: String,
    pub position: [f64; 3],
    pub kind: LabelKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConstellationLine {
    pub name: String,
    pub style: LineStyle,
    pub color: Rgb,

    // Ids of the stars that were found in the index, in row order.
    pub star_ids: Vec<u32>,
    // Positions of those stars; may be empty.
    pub points: Vec<[f64; 3]>,
}

/// Result of one line-list row.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstellationFigure {
    pub line: ConstellationLine,
    pub star_labels: Vec<LabelAnchor>,

    // Absent when none of the row's stars were found.
    pub name_label: Option<LabelAnchor>,
}

fn style_for_flag(token: &str) -> LineStyle {
    if token.trim().eq_ignore_ascii_case("t") {
        LineStyle::Highlighted
    } else {
        LineStyle::Default
    }
}

/// Builds the figure for one row. Returns None for comment rows (leading
/// '#') and rows shorter than 2 characters. Star ids that are malformed or
/// absent from `index` are skipped.
pub fn build_constellation(row: &str, index: &StarIndex) -> Option<ConstellationFigure> {
    let row = row.trim_end_matches(['\r', '\n']);
    if row.starts_with('#') || row.len() < 2 {
        return None;
    }
    let tokens: Vec<&str> = row.split([' ', ','])
        .filter(|t| !t.is_empty()).collect();
    let name = tokens.first()?.to_string();

    let style = if tokens.len() > 2 {
        style_for_flag(tokens[tokens.len() - 1])
    } else {
        LineStyle::Default
    };

    let mut line = ConstellationLine{
        name: name.clone(),
        style,
        color: style.color(),
        star_ids: Vec::new(),
        points: Vec::new(),
    };
    let mut star_labels = Vec::new();
    for token in tokens.iter().skip(2) {
        // The t/f flag lands here too and fails to parse.
        let Ok(id) = token.trim().parse::<u32>() else {
            continue;
        };
        match index.lookup(id) {
            Ok(star) => {
                line.star_ids.push(id);
                line.points.push(star.position());
                star_labels.push(LabelAnchor{
                    text: star.label_name(),
                    position: star.position(),
                    kind: LabelKind::StarName,
                });
            },
            Err(e) => {
                debug!("{}: {}", name, e.message);
            }
        }
    }
    let name_label = bounding_box_center(&line.points).map(|center| LabelAnchor{
        text: name,
        position: center,
        kind: LabelKind::ConstellationName,
    });
    Some(ConstellationFigure{line, star_labels, name_label})
}

/// Builds figures for every row of a line list.
pub fn build_constellations(text: &str, index: &StarIndex) -> Vec<ConstellationFigure> {
    let figures: Vec<ConstellationFigure> = text.lines()
        .filter_map(|row| build_constellation(row, index))
        .collect();
    let point_count: usize = figures.iter().map(|f| f.line.points.len()).sum();
    info!("Built {} constellation lines through {} star positions",
          figures.len(), point_count);
    figures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::SpectralClass;
    use crate::star::{CatalogCoordinates, StarRecord};

    fn index_of(stars: &[(u32, &str, f64, f64)]) -> StarIndex {
        let mut index = StarIndex::new();
        for (id, name, lon, lat) in stars {
            index.insert(StarRecord::new(*id, name,
                                         CatalogCoordinates::Galactic{lon: *lon, lat: *lat},
                                         2.0, SpectralClass::A, 100.0));
        }
        index
    }

    #[test]
    fn test_skipped_rows() {
        let index = index_of(&[(1, "Alp Ori", 0.0, 0.0)]);
        assert!(build_constellation("# comment 1 1", &index).is_none());
        assert!(build_constellation("x", &index).is_none());
        assert!(build_constellation("", &index).is_none());
    }

    #[test]
    fn test_one_valid_one_absent() {
        let index = index_of(&[(1, "Alp Ori", 0.0, 0.0)]);
        let figure = build_constellation("Ori, 1, 1, 999", &index).unwrap();
        assert_eq!(figure.line.name, "Ori");
        assert_eq!(figure.line.points.len(), 1);
        assert_eq!(figure.line.star_ids, vec![1]);
        assert_eq!(figure.star_labels.len(), 1);
        assert_eq!(figure.star_labels[0].text, "Alp");
        assert_eq!(figure.star_labels[0].kind, LabelKind::StarName);
        let name_label = figure.name_label.unwrap();
        assert_eq!(name_label.text, "Ori");
        assert_eq!(name_label.position, index.get(1).unwrap().position());
    }

    #[test]
    fn test_flags() {
        let index = index_of(&[(1, "Alp Ori", 0.0, 0.0), (2, "Bet Ori", 90.0, 0.0)]);
        let figure = build_constellation("Ori 2 1 2 t", &index).unwrap();
        assert_eq!(figure.line.style, LineStyle::Highlighted);
        assert_eq!(figure.line.color, Rgb(0xff0000));
        assert_eq!(figure.line.star_ids, vec![1, 2]);

        let figure = build_constellation("Ori 2 1 2 T", &index).unwrap();
        assert_eq!(figure.line.style, LineStyle::Highlighted);

        let figure = build_constellation("Ori,2,1,2,f", &index).unwrap();
        assert_eq!(figure.line.style, LineStyle::Default);
        assert_eq!(figure.line.color, Rgb(0x008888));

        // No flag at all; the last id is still an id.
        let figure = build_constellation("Ori 2 1 2", &index).unwrap();
        assert_eq!(figure.line.style, LineStyle::Default);
        assert_eq!(figure.line.star_ids, vec![1, 2]);
    }

    #[test]
    fn test_center_label() {
        let index = index_of(&[(1, "Alp Ori", 0.0, 0.0), (2, "Bet Ori", 90.0, 0.0)]);
        let figure = build_constellation("Ori 2 1 2", &index).unwrap();
        let center = figure.name_label.unwrap().position;
        assert!((center[0] - 50.0).abs() < 1e-9);
        assert!((center[1] - 50.0).abs() < 1e-9);
        assert!(center[2].abs() < 1e-9);
    }

    #[test]
    fn test_nothing_resolves() {
        let index = index_of(&[]);
        let figure = build_constellation("Lyr 3 10 20 30 t", &index).unwrap();
        assert!(figure.line.points.is_empty());
        assert!(figure.star_labels.is_empty());
        assert!(figure.name_label.is_none());

        // Name and count only.
        let figure = build_constellation("Lyr 3", &index).unwrap();
        assert!(figure.line.points.is_empty());
    }

    #[test]
    fn test_build_constellations() {
        let index = index_of(&[(1, "Alp Ori", 0.0, 0.0), (2, "Bet Ori", 90.0, 0.0)]);
        let text = "# Orion\nOri 2 1 2\n\nOri2 1 2 f\r\n";
        let figures = build_constellations(text, &index);
        assert_eq!(figures.len(), 2);
        assert_eq!(figures[1].line.name, "Ori2");
        assert_eq!(figures[1].line.points.len(), 1);
    }
}  // mod tests.
