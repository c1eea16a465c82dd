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

use crate::error::{Error, Result};
use crate::geometry::Segment;
use crate::position::Position;
use serde::Serialize;
use std::collections::BTreeMap;

/// A rectangular room on the floor plan.
///
/// `(x, y)` is the top-left corner in real-world units and the rectangle
/// extends right by `width` and down by `height`, so it covers
/// `x..=x + width` horizontally and `y - height..=y` vertically.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Room {
    name: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    /// Walls between this room and the keyed room.
    walls: BTreeMap<String, f64>,
}

impl Room {
    pub fn new(name: &str, x: f64, y: f64, width: f64, height: f64) -> Result<Room> {
        let invalid = |reason: String| Error::InvalidRoom { name: name.to_owned(), reason };
        if name.is_empty() {
            return Err(invalid("empty name".to_string()));
        }
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return Err(invalid(format!("non-finite geometry ({x}, {y}, {width}, {height})")));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(invalid(format!("width and height must be positive: {width} x {height}")));
        }
        Ok(Room { name: name.to_owned(), x, y, width, height, walls: BTreeMap::new() })
    }

    /// Builds a room from drawing units, applying the linear `scale` to every
    /// coordinate and dimension.
    pub fn from_drawing(
        name: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        scale: f64,
    ) -> Result<Room> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::InvalidRoom {
                name: name.to_owned(),
                reason: format!("scale must be positive: {scale}"),
            });
        }
        Room::new(name, x * scale, y * scale, width * scale, height * scale)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn top_left(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Midpoint of the rectangle. The vertical coordinate is `y - height / 2`
    /// because the stored corner is the top one.
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y - self.height / 2.0)
    }

    /// Corners clockwise from the top-left one.
    pub fn corners(&self) -> [Position; 4] {
        let (left, right) = (self.x, self.x + self.width);
        let (top, bottom) = (self.y, self.y - self.height);
        [
            Position::new(left, top),
            Position::new(right, top),
            Position::new(right, bottom),
            Position::new(left, bottom),
        ]
    }

    /// The four boundary walls as segments: top, right, bottom, left.
    pub fn boundary(&self) -> [Segment; 4] {
        let [tl, tr, br, bl] = self.corners();
        [Segment::new(tl, tr), Segment::new(tr, br), Segment::new(br, bl), Segment::new(bl, tl)]
    }

    /// Whether `p` is inside the rectangle or on its boundary.
    pub fn contains(&self, p: Position) -> bool {
        (self.x..=self.x + self.width).contains(&p.x)
            && (self.y - self.height..=self.y).contains(&p.y)
    }

    /// Recorded wall count towards `other`, if any.
    pub fn walls_to(&self, other: &str) -> Option<f64> {
        self.walls.get(other).copied()
    }

    pub fn walls(&self) -> &BTreeMap<String, f64> {
        &self.walls
    }

    /// Records the wall count towards `other`, replacing any previous value.
    pub fn set_walls(&mut self, other: &str, count: f64) -> Result<()> {
        let valid = count.is_finite() && count >= 0.0 && (other != self.name || count == 0.0);
        if !valid {
            return Err(Error::InvalidWallCount {
                from: self.name.clone(),
                to: other.to_owned(),
                value: count.to_string(),
            });
        }
        self.walls.insert(other.to_owned(), count);
        Ok(())
    }
}
