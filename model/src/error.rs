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

//! This module defines the model error types.

/// An enumeration of possible errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A room name that is not part of the floor plan.
    #[error("room not found: {0}")]
    RoomNotFound(String),
    /// A node id that is not part of the node table.
    #[error("node not found: {0}")]
    NodeNotFound(String),
    /// Both rooms exist but no wall count was recorded for the pair.
    #[error("no wall count recorded from {from} to {to}")]
    MissingAdjacency { from: String, to: String },
    /// Non-finite or degenerate input to a geometric test.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("invalid room {name}: {reason}")]
    InvalidRoom { name: String, reason: String },
    #[error("room {0} already exists")]
    DuplicateRoom(String),
    #[error("invalid wall count from {from} to {to}: {value}")]
    InvalidWallCount { from: String, to: String, value: String },
    #[error("malformed wall table: {0}")]
    MalformedWallTable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
