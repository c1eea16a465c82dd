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

use clap::{Args, Parser, Subcommand};
use roomloc_locator::ConsistencyPolicy;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "roomloc", version, about = "Room-level sensor localization from RSSI")]
pub struct RoomlocArgs {
    #[command(subcommand)]
    pub command: Command,
    /// Set verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(flatten)]
    pub data: DataArgs,
}

/// Input files and calibration, shared by every subcommand.
#[derive(Debug, Args)]
pub struct DataArgs {
    /// Directory that relative data file paths are resolved against
    #[arg(long, global = true, default_value = "res/data")]
    pub data_dir: PathBuf,
    /// Room table: name,x,y,width,height in drawing units
    #[arg(long, global = true, default_value = "rooms.csv")]
    pub rooms: PathBuf,
    /// Wall adjacency matrix
    #[arg(long, global = true, default_value = "Walls.csv")]
    pub walls: PathBuf,
    /// Node table: node_id,room (blank room for unknown nodes)
    #[arg(long, global = true, default_value = "node_locations.csv")]
    pub nodes: PathBuf,
    /// Raw samples: sender,receiver,rssi
    #[arg(long, global = true, default_value = "rssi_data_trial_1.csv")]
    pub rssi: PathBuf,
    /// Calibration file (key = value)
    #[arg(long, global = true)]
    pub calibration: Option<PathBuf>,
    /// Drawing units to real-world units, overrides the calibration file
    #[arg(long, global = true)]
    pub scale: Option<f64>,
    /// report or filter, overrides the calibration file
    #[arg(long, global = true)]
    pub consistency: Option<ConsistencyPolicy>,
}

impl DataArgs {
    /// Resolves `file` against `--data-dir` unless it is absolute.
    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }
}

#[derive(Debug, Subcommand)]
#[command(infer_subcommands = true)]
pub enum Command {
    /// Rank candidate rooms for unknown nodes
    Locate(Locate),
    /// Localize every anchor from its links to the others and report accuracy
    Validate,
    /// Estimate the distance for an RSSI reading through a number of walls
    Distance(Distance),
    /// List the rooms of the floor plan
    Rooms,
}

#[derive(Debug, Args)]
pub struct Locate {
    /// Localize only this node
    #[arg(short, long)]
    pub node: Option<String>,
    /// Number of rooms printed per node
    #[arg(short, long, default_value_t = 3)]
    pub top: usize,
    /// Print the full rankings as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct Distance {
    /// Measured RSSI in dBm
    #[arg(id = "rssi_dbm", value_name = "RSSI", allow_negative_numbers = true)]
    pub rssi: f64,
    /// Walls between the two nodes
    #[arg(id = "wall_count", value_name = "WALLS", default_value_t = 0.0)]
    pub walls: f64,
}
