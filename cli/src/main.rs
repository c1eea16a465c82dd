// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command Line Interface for roomloc

use clap::Parser;
use log::error;
use roomloc_cli::RoomlocArgs;
use roomloc_common::util::roomloc_logger;

fn main() {
    let args = RoomlocArgs::parse();
    roomloc_logger::init("roomloc");
    if let Err(e) = roomloc_cli::run(args) {
        error!("{e:#}");
        std::process::exit(1);
    }
}
