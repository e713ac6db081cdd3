// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use skysphere_server::skysphere_server::server_main;

fn main() {
    server_main("SkySphere");
}
