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

use roomloc_locator::{AnchorEvidence, RoomScore, ValidationOutcome};
use roomloc_model::{NodeId, Room};
use std::fmt;

const INDENT_WIDTH: usize = 2;

/// Displayer for localization results. Implements fmt::Display.
/// # Invariants
/// Displayed values **do not** end in a newline.
pub struct Displayer<T> {
    value: T,
    verbose: bool,
    indent: usize,
}

impl<T> Displayer<T> {
    /// Returns a new displayer for values of the provided type.
    pub fn new(value: T, verbose: bool) -> Self {
        Displayer { value, verbose, indent: 0 }
    }

    /// Indent the displayed string by a given amount. Returns `self`.
    pub fn indent(&mut self, current_indent: usize) -> &Self {
        self.indent = current_indent + INDENT_WIDTH;
        self
    }
}

/// The best `top` rooms of one node's ranking.
pub struct Ranking<'a> {
    pub node: &'a NodeId,
    pub scores: &'a [RoomScore],
    pub top: usize,
}

impl fmt::Display for Displayer<Ranking<'_>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = self.indent;
        let Ranking { node, scores, top } = self.value;
        write!(f, "{:indent$}node {node}: {} candidate rooms", "", scores.len())?;
        for (i, score) in scores.iter().take(top).enumerate() {
            writeln!(f)?;
            write!(
                f,
                "{:indent$}{:>3}. {}",
                "",
                i + 1,
                Displayer::new(score, self.verbose).indent(self.indent)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Displayer<&RoomScore> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let score = self.value;
        write!(
            f,
            "{:10} residual {:>10.3}  consistent {}/{}",
            score.room,
            score.residual,
            score.consistent_anchors(),
            score.anchors()
        )?;
        if self.verbose {
            for evidence in &score.evidence {
                writeln!(f)?;
                write!(f, "{}", Displayer::new(evidence, true).indent(self.indent + INDENT_WIDTH))?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Displayer<&AnchorEvidence> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = self.indent;
        let e = self.value;
        write!(
            f,
            "{:indent$}anchor {} in {}: walls {} estimated {:.2} geometric {:.2}{}",
            "",
            e.anchor,
            e.anchor_room,
            e.walls,
            e.estimated_distance,
            e.geometric_distance,
            if e.consistent { "" } else { " (unreachable)" }
        )
    }
}

impl fmt::Display for Displayer<&Room> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = self.indent;
        let room = self.value;
        let center = room.center();
        write!(f, "{:indent$}{:10} center ({:.1}, {:.1})", "", room.name(), center.x, center.y)?;
        if self.verbose {
            write!(f, " size {:.1}x{:.1}", room.width(), room.height())?;
            let walls: Vec<String> =
                room.walls().iter().map(|(other, n)| format!("{other}:{n}")).collect();
            write!(f, " walls [{}]", walls.join(" "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Displayer<&[ValidationOutcome]> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = self.indent;
        for outcome in self.value {
            let result = match (&outcome.best, &outcome.error) {
                (_, Some(error)) => format!("error: {error}"),
                (Some(best), None) => match outcome.position {
                    Some(1) => format!("hit ({best})"),
                    Some(p) => format!("miss: {best}, true room ranked {p}"),
                    None => format!("miss: {best}, true room not ranked"),
                },
                (None, None) => "no ranking".to_string(),
            };
            writeln!(f, "{:indent$}node {:6} {:10} {result}", "", outcome.node, outcome.true_room)?;
        }
        let hits = self.value.iter().filter(|o| o.is_hit()).count();
        write!(f, "{:indent$}{hits}/{} anchors placed in their own room", "", self.value.len())
    }
}
