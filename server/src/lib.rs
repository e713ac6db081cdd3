// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

pub mod file_data_source;
pub mod scene_engine;
pub mod skysphere_server;
