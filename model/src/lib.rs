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

//! Building model: room geometry, wall adjacency, sensor nodes and
//! aggregated RSSI links.

mod error;
pub mod floor_plan;
pub mod geometry;
pub mod node;
pub mod position;
pub mod room;
pub mod rssi;

pub use error::{Error, Result};
pub use floor_plan::{FloorPlan, WallTable};
pub use geometry::{circle_intersects_segment, Segment};
pub use node::{Node, NodeId};
pub use position::Position;
pub use room::Room;
pub use rssi::{aggregate, LinkKey, LinkStats, RssiAggregator, RssiSample};
