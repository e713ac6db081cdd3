// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use serde::Serialize;

use crate::calendar::DateResolution;
use crate::constellation::{ConstellationFigure, ConstellationLine, LabelAnchor};
use crate::solar_table::{SUN_COLOR, SUN_MAGNITUDE, SUN_SIZE, SolarPosition};
use crate::spectral::{Rgb, color_for, size_for};
use crate::star::StarIndex;

/// Flat point buffers, ready to hand to a renderer. Entry i of each buffer
/// describes the same point; `positions` and `colors` hold 3 values per
/// point.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PointBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub sizes: Vec<f32>,
}

impl PointBuffers {
    pub fn push(&mut self, position: [f64; 3], color: Rgb, size: f64) {
        self.positions.extend(position.iter().map(|c| *c as f32));
        self.colors.extend(color.components());
        self.sizes.push(size as f32);
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SunInfo {
    pub table: String,
    pub solar_position: SolarPosition,
    pub magnitude: f64,
    // Index of `solar_position` within `SceneModel::points`.
    pub point_index: usize,
}

/// Everything the renderer needs for one date.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneModel {
    pub date: DateResolution,

    // One point per star in ascending id order, followed by the sun if its
    // position is known.
    pub points: PointBuffers,
    // Catalog ids of the star points.
    pub star_ids: Vec<u32>,

    pub lines: Vec<ConstellationLine>,
    pub labels: Vec<LabelAnchor>,
    pub sun: Option<SunInfo>,
}

impl SceneModel {
    pub fn assemble(date: DateResolution, index: &StarIndex,
                    figures: Vec<ConstellationFigure>,
                    solar_position: Option<SolarPosition>) -> Self {
        let mut points = PointBuffers::default();
        let mut star_ids = Vec::with_capacity(index.len());
        for star in index.iter() {
            points.push(star.position(), color_for(star.spectral_class),
                        size_for(star.magnitude));
            star_ids.push(star.id);
        }

        let mut lines = Vec::with_capacity(figures.len());
        let mut labels = Vec::new();
        for figure in figures {
            labels.extend(figure.star_labels);
            labels.extend(figure.name_label);
            lines.push(figure.line);
        }

        let sun = solar_position.map(|solar_position| {
            let point_index = points.len();
            points.push(solar_position.position, SUN_COLOR, SUN_SIZE);
            SunInfo{table: date.selection.table_name(), solar_position,
                    magnitude: SUN_MAGNITUDE, point_index}
        });

        SceneModel{date, points, star_ids, lines, labels, sun}
    }
}

// mod tests.
