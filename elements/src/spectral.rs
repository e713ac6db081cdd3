// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use serde::Serialize;

/// A display color as 0xRRGGBB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u32);

pub const WHITE: Rgb = Rgb(0xffffff);

impl Rgb {
    /// Red, green, blue in 0..1.
    pub fn components(&self) -> [f32; 3] {
        [((self.0 >> 16) & 0xff) as f32 / 255.0,
         ((self.0 >> 8) & 0xff) as f32 / 255.0,
         (self.0 & 0xff) as f32 / 255.0]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SpectralClass {
    O, B, A, F, G, K, M, L, T,
    Unknown,
}

impl SpectralClass {
    pub fn from_char(c: char) -> Self {
        match c {
            'O' => SpectralClass::O,
            'B' => SpectralClass::B,
            'A' => SpectralClass::A,
            'F' => SpectralClass::F,
            'G' => SpectralClass::G,
            'K' => SpectralClass::K,
            'M' => SpectralClass::M,
            'L' => SpectralClass::L,
            'T' => SpectralClass::T,
            _ => SpectralClass::Unknown,
        }
    }

    /// Classifies the first character of `field`; blank is Unknown.
    pub fn from_field(field: &str) -> Self {
        field.chars().next().map_or(SpectralClass::Unknown, Self::from_char)
    }
}

/// Display color for a spectral class. Unknown classes are white.
pub fn color_for(class: SpectralClass) -> Rgb {
    match class {
        SpectralClass::O => Rgb(0x91b5ff),
        SpectralClass::B => Rgb(0xa7c3ff),
        SpectralClass::A => Rgb(0xd0ddff),
        SpectralClass::F => Rgb(0xf1f1fd),
        SpectralClass::G => Rgb(0xfdefe7),
        SpectralClass::K => Rgb(0xffddbb),
        SpectralClass::M => Rgb(0xffb466),
        SpectralClass::L => Rgb(0xff820e),
        SpectralClass::T => Rgb(0xff3a00),
        SpectralClass::Unknown => WHITE,
    }
}

/// Display size for an apparent magnitude. Brighter (lower magnitude) stars
/// are larger; a magnitude -2 star gets 1.4.
pub fn size_for(magnitude: f64) -> f64 {
    1.4 - (magnitude + 2.0) / 10.0
}

// mod tests.
