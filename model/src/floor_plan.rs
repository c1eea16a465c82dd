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

//! Floor plan: the set of rooms and the wall counts between them.

use crate::error::{Error, Result};
use crate::room::Room;
use log::debug;
use std::collections::BTreeMap;
use std::ops::Bound;

/// A wall adjacency matrix as it appears in a table: a header row naming
/// the columns, then one row per room with a count for each column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallTable {
    columns: Vec<String>,
    rows: Vec<WallRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallRow {
    pub room: String,
    /// Aligned with [`WallTable::columns`]. `None` marks a blank cell.
    pub counts: Vec<Option<f64>>,
}

impl WallTable {
    /// Builds a table from raw records.
    ///
    /// The first non-blank record is the header; its first cell is the
    /// corner cell and is ignored. Cells are trimmed, so a cell holding only a
    /// line terminator is blank. Blank records are skipped and blank cells
    /// record nothing.
    pub fn from_records<I, R, S>(records: I) -> Result<WallTable>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = records
            .into_iter()
            .map(|record| record.into_iter().map(|c| c.as_ref().trim().to_owned()).collect())
            .filter(|cells: &Vec<String>| cells.iter().any(|c| !c.is_empty()));

        let header = records
            .next()
            .ok_or_else(|| Error::MalformedWallTable("missing header row".to_string()))?;
        let mut columns: Vec<String> = header.into_iter().skip(1).collect();
        while columns.last().is_some_and(|c| c.is_empty()) {
            columns.pop();
        }
        if let Some(i) = columns.iter().position(|c| c.is_empty()) {
            return Err(Error::MalformedWallTable(format!("blank room name in column {}", i + 1)));
        }

        let mut rows = Vec::new();
        for cells in records {
            let mut cells = cells.into_iter();
            let room = cells.next().unwrap_or_default();
            if room.is_empty() {
                return Err(Error::MalformedWallTable("row without a room name".to_string()));
            }
            let mut counts = Vec::with_capacity(columns.len());
            for (i, cell) in cells.enumerate() {
                if cell.is_empty() {
                    counts.push(None);
                    continue;
                }
                let column = columns.get(i).ok_or_else(|| {
                    Error::MalformedWallTable(format!("row {room} has more cells than the header"))
                })?;
                let count = cell.parse::<f64>().map_err(|_| Error::InvalidWallCount {
                    from: room.clone(),
                    to: column.clone(),
                    value: cell.clone(),
                })?;
                counts.push(Some(count));
            }
            counts.truncate(columns.len());
            rows.push(WallRow { room, counts });
        }
        Ok(WallTable { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[WallRow] {
        &self.rows
    }
}

/// All rooms of one floor, keyed by name.
///
/// Read-only once built, so it can be shared between concurrent
/// localizations.
#[derive(Debug, Clone, Default)]
pub struct FloorPlan {
    rooms: BTreeMap<String, Room>,
}

impl FloorPlan {
    pub fn new() -> Self {
        FloorPlan { rooms: BTreeMap::new() }
    }

    pub fn add_room(&mut self, room: Room) -> Result<()> {
        if self.rooms.contains_key(room.name()) {
            return Err(Error::DuplicateRoom(room.name().to_owned()));
        }
        self.rooms.insert(room.name().to_owned(), room);
        Ok(())
    }

    pub fn room(&self, name: &str) -> Result<&Room> {
        self.rooms.get(name).ok_or_else(|| Error::RoomNotFound(name.to_owned()))
    }

    fn room_mut(&mut self, name: &str) -> Result<&mut Room> {
        self.rooms.get_mut(name).ok_or_else(|| Error::RoomNotFound(name.to_owned()))
    }

    /// Rooms in name order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Records the wall count from `from` to `to`. Only that direction is set.
    pub fn set_walls(&mut self, from: &str, to: &str, count: f64) -> Result<()> {
        self.room(to)?;
        self.room_mut(from)?.set_walls(to, count)
    }

    /// Applies every non-blank cell of `table`. Nothing is changed if any
    /// room is unknown or any count is invalid.
    pub fn assign_walls(&mut self, table: &WallTable) -> Result<()> {
        let mut rooms = self.rooms.clone();
        for column in table.columns() {
            if !rooms.contains_key(column) {
                return Err(Error::RoomNotFound(column.clone()));
            }
        }
        let mut assigned = 0;
        for row in table.rows() {
            let room =
                rooms.get_mut(&row.room).ok_or_else(|| Error::RoomNotFound(row.room.clone()))?;
            for (column, count) in table.columns().iter().zip(&row.counts) {
                if let Some(count) = count {
                    room.set_walls(column, *count)?;
                    assigned += 1;
                }
            }
        }
        debug!("assigned {assigned} wall counts across {} rows", table.rows().len());
        self.rooms = rooms;
        Ok(())
    }

    /// Walls between `from` and `to` as recorded on `from`.
    ///
    /// An unrecorded pair is [`Error::MissingAdjacency`], never zero walls.
    pub fn walls_between(&self, from: &str, to: &str) -> Result<f64> {
        let room = self.room(from)?;
        self.room(to)?;
        room.walls_to(to)
            .ok_or_else(|| Error::MissingAdjacency { from: from.to_owned(), to: to.to_owned() })
    }

    /// Euclidean distance between the two room centers.
    pub fn center_distance(&self, a: &str, b: &str) -> Result<f64> {
        Ok(self.room(a)?.center().distance(&self.room(b)?.center()))
    }

    /// Pairs `(a, b)` with `a < b` whose counts differ between the two
    /// directions, including pairs recorded in one direction only.
    pub fn asymmetric_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for a in self.rooms.values() {
            for (b_name, b) in
                self.rooms.range::<str, _>((Bound::Excluded(a.name()), Bound::Unbounded))
            {
                if a.walls_to(b_name) != b.walls_to(a.name()) {
                    pairs.push((a.name().to_owned(), b_name.clone()));
                }
            }
        }
        pairs
    }
}
