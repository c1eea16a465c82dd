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

//! Accuracy check against anchors whose room is already known.

use crate::localizer::Localizer;
use log::info;
use roomloc_model::{FloorPlan, Node, NodeId};
use serde::Serialize;

/// Result of localizing one anchor as if its room were unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub node: NodeId,
    pub true_room: String,
    /// Best ranked room, if the ranking succeeded.
    pub best: Option<String>,
    /// 1-based rank of `true_room`, if it was ranked at all.
    pub position: Option<usize>,
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn is_hit(&self) -> bool {
        self.position == Some(1)
    }
}

/// Localizes every anchor of `nodes` from its own links to the other
/// anchors and compares the ranking with its recorded room.
pub fn leave_one_out(
    localizer: &Localizer,
    nodes: &[Node],
    plan: &FloorPlan,
) -> Vec<ValidationOutcome> {
    let anchors: Vec<&Node> = nodes.iter().filter(|n| n.is_anchor()).collect();
    let outcomes: Vec<ValidationOutcome> = localizer
        .rank_all(&anchors, nodes, plan)
        .into_iter()
        .zip(&anchors)
        .map(|((id, result), anchor)| {
            let true_room = anchor.room().unwrap_or_default().to_owned();
            match result {
                Ok(ranking) => ValidationOutcome {
                    node: id,
                    best: ranking.first().map(|s| s.room.clone()),
                    position: ranking.iter().position(|s| s.room == true_room).map(|i| i + 1),
                    true_room,
                    error: None,
                },
                Err(e) => ValidationOutcome {
                    node: id,
                    true_room,
                    best: None,
                    position: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();
    let hits = outcomes.iter().filter(|o| o.is_hit()).count();
    info!("leave-one-out: {hits}/{} anchors placed in their own room", outcomes.len());
    outcomes
}
