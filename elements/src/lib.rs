// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

pub mod astro_util;
pub mod calendar;
pub mod constellation;
pub mod data_source_trait;
pub mod scene;
pub mod solar_table;
pub mod spectral;
pub mod star;
pub mod star_catalog;
