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

//! Segment primitives and the circle/segment intersection test.

use crate::error::{Error, Result};
use crate::position::Position;
use serde::{Deserialize, Serialize};

/// A finite segment between two positions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Position,
    pub end: Position,
}

impl Segment {
    pub fn new(start: Position, end: Position) -> Segment {
        Segment { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// See [`circle_intersects_segment`].
    pub fn intersects_circle(&self, center: Position, radius: f64) -> Result<bool> {
        circle_intersects_segment(center, radius, self.start, self.end)
    }
}

/// Returns whether the disk of `radius` around `center` shares at least one
/// point with the segment from `start` to `end`.
///
/// Parametrising the segment as `start + t * (end - start)` gives the
/// quadratic `a t^2 + b t + c = 0` for the points at exactly `radius` from
/// `center`. The segment meets the disk iff the discriminant is non-negative
/// and the root interval `[t1, t2]` overlaps `[0, 1]`. This covers crossings,
/// tangency, an endpoint inside the circle and a segment fully enclosed by it.
///
/// A zero-length segment or any non-finite input is an
/// [`Error::InvalidGeometry`].
pub fn circle_intersects_segment(
    center: Position,
    radius: f64,
    start: Position,
    end: Position,
) -> Result<bool> {
    if !(center.is_finite() && start.is_finite() && end.is_finite()) {
        return Err(Error::InvalidGeometry(format!(
            "non-finite coordinates: center {center:?}, segment {start:?} -> {end:?}"
        )));
    }
    if !(radius.is_finite() && radius >= 0.0) {
        return Err(Error::InvalidGeometry(format!("radius must be finite and >= 0: {radius}")));
    }
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let a = dx * dx + dy * dy;
    if a == 0.0 {
        return Err(Error::InvalidGeometry(format!("zero-length segment at {start:?}")));
    }
    let fx = start.x - center.x;
    let fy = start.y - center.y;
    let b = 2.0 * (dx * fx + dy * fy);
    let c = fx * fx + fy * fy - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Ok(false);
    }
    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);
    Ok(t1 <= 1.0 && t2 >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_segment() -> (Position, Position) {
        (Position::new(-1.0, 0.0), Position::new(1.0, 0.0))
    }

    #[test]
    fn test_crossing() {
        let (s, e) = (Position::new(-2.0, 0.0), Position::new(2.0, 0.0));
        assert!(circle_intersects_segment(Position::default(), 1.0, s, e).unwrap());
    }

    #[test]
    fn test_circle_encloses_segment() {
        let (s, e) = unit_segment();
        assert!(circle_intersects_segment(Position::new(0.0, 0.5), 10.0, s, e).unwrap());
    }

    #[test]
    fn test_endpoint_inside() {
        let (s, e) = (Position::new(0.0, 0.0), Position::new(5.0, 0.0));
        assert!(circle_intersects_segment(Position::new(-0.5, 0.0), 1.0, s, e).unwrap());
    }

    #[test]
    fn test_line_missed() {
        let (s, e) = unit_segment();
        assert!(!circle_intersects_segment(Position::new(0.0, 5.0), 1.0, s, e).unwrap());
    }

    #[test]
    fn test_tangent() {
        let (s, e) = unit_segment();
        assert!(circle_intersects_segment(Position::new(0.0, 1.0), 1.0, s, e).unwrap());
    }

    #[test]
    fn test_line_hit_beyond_segment() {
        // The infinite line crosses the circle at x = 9 and x = 11, the
        // segment stops at x = 1.
        let (s, e) = unit_segment();
        assert!(!circle_intersects_segment(Position::new(10.0, 0.0), 1.0, s, e).unwrap());
        assert!(!circle_intersects_segment(Position::new(-10.0, 0.0), 1.0, s, e).unwrap());
    }

    #[test]
    fn test_vertical_segment() {
        let segment = Segment::new(Position::new(3.0, -4.0), Position::new(3.0, 4.0));
        assert!(segment.intersects_circle(Position::default(), 3.0).unwrap());
        assert!(!segment.intersects_circle(Position::default(), 2.9).unwrap());
        assert_eq!(segment.length(), 8.0);
    }

    #[test]
    fn test_invalid_geometry() {
        let p = Position::new(1.0, 1.0);
        assert!(matches!(
            circle_intersects_segment(Position::default(), 1.0, p, p),
            Err(Error::InvalidGeometry(_))
        ));
        let (s, e) = unit_segment();
        assert!(matches!(
            circle_intersects_segment(Position::new(f64::NAN, 0.0), 1.0, s, e),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(matches!(
            circle_intersects_segment(Position::default(), -1.0, s, e),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(matches!(
            circle_intersects_segment(Position::default(), f64::INFINITY, s, e),
            Err(Error::InvalidGeometry(_))
        ));
    }

    // Agrees with the closest point on the segment, away from the boundary.
    #[test]
    fn test_matches_closest_point() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let mut point = || Position::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
        for _ in 0..1000 {
            let (center, start, end) = (point(), point(), point());
            let radius = point().x.abs();
            let (dx, dy) = (end.x - start.x, end.y - start.y);
            let t = (((center.x - start.x) * dx + (center.y - start.y) * dy) / (dx * dx + dy * dy))
                .clamp(0.0, 1.0);
            let closest = Position::new(start.x + t * dx, start.y + t * dy);
            let gap = closest.distance(&center) - radius;
            if gap.abs() < 1e-6 {
                continue;
            }
            assert_eq!(
                circle_intersects_segment(center, radius, start, end).unwrap(),
                gap < 0.0,
                "center {center:?} radius {radius} segment {start:?} -> {end:?}"
            );
        }
    }
}
