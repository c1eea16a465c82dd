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

//! Multilateration by residual minimization over candidate rooms.
//!
//! For every candidate room `C` and anchor `a` in room `R_a` with link RSSI
//! `v`, the propagation model turns `(v, walls(C, R_a))` into an estimated
//! distance which is compared with the distance between the centers of `C`
//! and `R_a`. The squared differences are summed per candidate and the
//! candidates are ranked by that sum, lowest first.
//!
//! Independently, each anchor's distance is drawn as a disk around the
//! center of `R_a`; a candidate that no anchor disk reaches is flagged as
//! geometrically inconsistent.

use crate::error::{Error, Result};
use log::{debug, trace};
use roomloc_model::{self as model, FloorPlan, Node, NodeId, Position, Room};
use roomloc_ranging::PropagationModel;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::thread;

/// Aggregated RSSI between the node being localized and one anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorLink {
    pub anchor: NodeId,
    pub room: String,
    pub rssi: f64,
}

impl AnchorLink {
    pub fn new(anchor: impl Into<NodeId>, room: &str, rssi: f64) -> Self {
        AnchorLink { anchor: anchor.into(), room: room.to_owned(), rssi }
    }
}

/// How the geometric consistency signal affects the ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsistencyPolicy {
    /// Reported on every score, ranking by residual only.
    #[default]
    Report,
    /// Candidates that no anchor disk reaches are dropped.
    Filter,
}

impl FromStr for ConsistencyPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "report" => Ok(ConsistencyPolicy::Report),
            "filter" => Ok(ConsistencyPolicy::Filter),
            other => {
                Err(format!("unknown consistency policy '{other}', expected report or filter"))
            }
        }
    }
}

impl fmt::Display for ConsistencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyPolicy::Report => write!(f, "report"),
            ConsistencyPolicy::Filter => write!(f, "filter"),
        }
    }
}

/// What one anchor says about one candidate room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorEvidence {
    pub anchor: NodeId,
    pub anchor_room: String,
    pub walls: f64,
    pub estimated_distance: f64,
    pub geometric_distance: f64,
    /// `(estimated_distance - geometric_distance)^2`
    pub residual: f64,
    /// The anchor's distance disk reaches the candidate rectangle.
    pub consistent: bool,
}

/// Fitness of one candidate room. Lower `residual` is better.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomScore {
    pub room: String,
    pub residual: f64,
    pub evidence: Vec<AnchorEvidence>,
}

impl RoomScore {
    fn new(room: &str) -> Self {
        RoomScore { room: room.to_owned(), residual: 0.0, evidence: Vec::new() }
    }

    fn push(&mut self, evidence: AnchorEvidence) {
        self.residual += evidence.residual;
        self.evidence.push(evidence);
    }

    /// Anchors that produced a residual for this room.
    pub fn anchors(&self) -> usize {
        self.evidence.len()
    }

    pub fn consistent_anchors(&self) -> usize {
        self.evidence.iter().filter(|e| e.consistent).count()
    }

    /// Share of contributing anchors whose disk reaches the room, in `0..=1`.
    pub fn consistency(&self) -> f64 {
        match self.anchors() {
            0 => 0.0,
            n => self.consistent_anchors() as f64 / n as f64,
        }
    }

    fn cmp_rank(&self, other: &Self) -> Ordering {
        self.residual.total_cmp(&other.residual).then_with(|| self.room.cmp(&other.room))
    }
}

/// Scores candidate rooms for a node from its anchor links.
///
/// Holds no per-run state, so one instance can rank many nodes, also from
/// several threads at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct Localizer {
    model: PropagationModel,
    policy: ConsistencyPolicy,
}

impl Localizer {
    pub fn new(model: PropagationModel) -> Self {
        Localizer { model, policy: ConsistencyPolicy::default() }
    }

    pub fn with_policy(mut self, policy: ConsistencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn model(&self) -> &PropagationModel {
        &self.model
    }

    pub fn policy(&self) -> ConsistencyPolicy {
        self.policy
    }

    /// Ranks every room of `plan`, best first. Ties are broken by room name.
    ///
    /// A candidate with no recorded wall count to an anchor's room gets no
    /// evidence from that anchor; a candidate with no evidence at all is
    /// left out of the ranking.
    pub fn rank(&self, links: &[AnchorLink], plan: &FloorPlan) -> Result<Vec<RoomScore>> {
        if links.is_empty() {
            return Err(Error::InsufficientEvidence("no anchor links".to_string()));
        }
        let mut anchor_centers = Vec::with_capacity(links.len());
        for link in links {
            anchor_centers.push(plan.room(&link.room)?.center());
        }

        let mut scores = Vec::new();
        for candidate in plan.rooms() {
            let mut score = RoomScore::new(candidate.name());
            for (link, anchor_center) in links.iter().zip(&anchor_centers) {
                let walls = match plan.walls_between(candidate.name(), &link.room) {
                    Ok(walls) => walls,
                    Err(model::Error::MissingAdjacency { .. }) => {
                        trace!("{}: no walls recorded to {}", candidate.name(), link.room);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                let estimated_distance = self.model.estimate_distance(link.rssi, walls)?;
                let geometric_distance = plan.center_distance(candidate.name(), &link.room)?;
                let consistent = reaches(candidate, *anchor_center, estimated_distance)?;
                let evidence = AnchorEvidence {
                    anchor: link.anchor.clone(),
                    anchor_room: link.room.clone(),
                    walls,
                    estimated_distance,
                    geometric_distance,
                    residual: (estimated_distance - geometric_distance).powi(2),
                    consistent,
                };
                trace!("{}: {:?}", candidate.name(), evidence);
                score.push(evidence);
            }
            if score.anchors() > 0 {
                debug!(
                    "{}: residual {:.3} from {} anchors ({} consistent)",
                    score.room,
                    score.residual,
                    score.anchors(),
                    score.consistent_anchors()
                );
                scores.push(score);
            }
        }

        if scores.is_empty() {
            return Err(Error::InsufficientEvidence(
                "no anchor room has a recorded wall count to any candidate room".to_string(),
            ));
        }
        if self.policy == ConsistencyPolicy::Filter {
            scores.retain(|s| s.consistent_anchors() > 0);
            if scores.is_empty() {
                return Err(Error::InsufficientEvidence(
                    "no candidate room is reached by any anchor distance".to_string(),
                ));
            }
        }
        scores.sort_by(RoomScore::cmp_rank);
        Ok(scores)
    }

    /// Ranks `node` using its links to the anchors found in `nodes`.
    ///
    /// `node` may itself be an anchor, which is how accuracy is checked.
    pub fn rank_node(
        &self,
        node: &Node,
        nodes: &[Node],
        plan: &FloorPlan,
    ) -> Result<Vec<RoomScore>> {
        let links = anchor_links(node, nodes);
        debug!("node {}: {} anchor links", node.id(), links.len());
        self.rank(&links, plan)
    }

    /// Ranks every node of `targets` concurrently over the same read-only
    /// data. Results keep the order of `targets`.
    pub fn rank_all(
        &self,
        targets: &[&Node],
        nodes: &[Node],
        plan: &FloorPlan,
    ) -> Vec<(NodeId, Result<Vec<RoomScore>>)> {
        thread::scope(|s| {
            let handles: Vec<_> = targets
                .iter()
                .map(|node| s.spawn(move || self.rank_node(node, nodes, plan)))
                .collect();
            targets
                .iter()
                .zip(handles)
                .map(|(node, handle)| {
                    let result = handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
                    (node.id().clone(), result)
                })
                .collect()
        })
    }
}

/// Builds anchor links for `node` from its aggregated links. Links to
/// nodes without a room, to unlisted nodes and to itself are skipped.
pub fn anchor_links(node: &Node, nodes: &[Node]) -> Vec<AnchorLink> {
    let mut links = Vec::new();
    for (other, rssi) in node.links() {
        if other == node.id() {
            continue;
        }
        match nodes.iter().find(|n| n.id() == other).and_then(|n| n.room()) {
            Some(room) => links.push(AnchorLink {
                anchor: other.clone(),
                room: room.to_owned(),
                rssi: *rssi,
            }),
            None => trace!("node {}: skipping link to {other}, not an anchor", node.id()),
        }
    }
    links
}

/// Whether the disk of `radius` around `center` shares a point with `room`:
/// it crosses or encloses a boundary wall, or lies inside the room.
fn reaches(room: &Room, center: Position, radius: f64) -> model::Result<bool> {
    for wall in room.boundary() {
        if wall.intersects_circle(center, radius)? {
            return Ok(true);
        }
    }
    Ok(room.contains(center))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str, x: f64) -> Room {
        Room::new(name, x, 10.0, 10.0, 10.0).unwrap()
    }

    /// A at x = 0..10, B at x = 20..30, C at x = 40..50. Centers are 20 apart.
    fn row_of_rooms() -> FloorPlan {
        let mut plan = FloorPlan::new();
        for (name, x) in [("A", 0.0), ("B", 20.0), ("C", 40.0)] {
            plan.add_room(room(name, x)).unwrap();
        }
        for name in ["A", "B", "C"] {
            plan.set_walls(name, name, 0.0).unwrap();
        }
        plan.set_walls("A", "B", 2.0).unwrap();
        plan.set_walls("B", "A", 2.0).unwrap();
        plan
    }

    fn rssi_for(distance: f64, walls: f64) -> f64 {
        PropagationModel::default().expected_rssi(distance, walls).unwrap()
    }

    #[test]
    fn test_ground_truth_ranks_first() {
        let plan = row_of_rooms();
        let links = [AnchorLink::new("b1", "B", rssi_for(20.0, 2.0))];
        let ranking = Localizer::default().rank(&links, &plan).unwrap();
        assert_eq!(ranking[0].room, "A");
        assert!(ranking[0].residual < 1e-9);
        assert!(ranking[1].residual > ranking[0].residual);
        // C has no walls recorded to B.
        assert_eq!(ranking.len(), 2);
        assert!(ranking.iter().all(|s| s.room != "C"));
    }

    #[test]
    fn test_evidence_values() {
        let plan = row_of_rooms();
        let links = [AnchorLink::new("b1", "B", rssi_for(20.0, 2.0))];
        let ranking = Localizer::default().rank(&links, &plan).unwrap();
        let evidence = &ranking[0].evidence[0];
        assert_eq!(evidence.anchor, NodeId::from("b1"));
        assert_eq!(evidence.walls, 2.0);
        assert_eq!(evidence.geometric_distance, 20.0);
        assert!((evidence.estimated_distance - 20.0).abs() < 1e-9);
        assert!(evidence.consistent);
        assert_eq!(ranking[0].anchors(), 1);
        assert_eq!(ranking[0].consistency(), 1.0);
    }

    #[test]
    fn test_ties_break_by_name() {
        let mut plan = row_of_rooms();
        plan.set_walls("C", "B", 2.0).unwrap();
        let links = [AnchorLink::new("b1", "B", rssi_for(20.0, 2.0))];
        let ranking = Localizer::default().rank(&links, &plan).unwrap();
        assert_eq!(ranking[0].room, "A");
        assert_eq!(ranking[1].room, "C");
        assert_eq!(ranking[0].residual, ranking[1].residual);
    }

    #[test]
    fn test_deterministic() {
        let mut plan = row_of_rooms();
        plan.set_walls("C", "B", 1.0).unwrap();
        plan.set_walls("C", "A", 3.0).unwrap();
        let links = [AnchorLink::new("b1", "B", -61.5), AnchorLink::new("a1", "A", -70.25)];
        let localizer = Localizer::default();
        let first = localizer.rank(&links, &plan).unwrap();
        for _ in 0..10 {
            assert_eq!(localizer.rank(&links, &plan).unwrap(), first);
        }
    }

    #[test]
    fn test_no_links() {
        let plan = row_of_rooms();
        assert!(matches!(
            Localizer::default().rank(&[], &plan),
            Err(Error::InsufficientEvidence(_))
        ));
    }

    #[test]
    fn test_no_adjacency_to_any_candidate() {
        let mut plan = FloorPlan::new();
        plan.add_room(room("A", 0.0)).unwrap();
        plan.add_room(room("B", 20.0)).unwrap();
        let links = [AnchorLink::new("b1", "B", -50.0)];
        assert!(matches!(
            Localizer::default().rank(&links, &plan),
            Err(Error::InsufficientEvidence(_))
        ));
    }

    #[test]
    fn test_unknown_anchor_room() {
        let plan = row_of_rooms();
        let links = [AnchorLink::new("z1", "Z", -50.0)];
        assert_eq!(
            Localizer::default().rank(&links, &plan),
            Err(Error::Model(model::Error::RoomNotFound("Z".into())))
        );
    }

    #[test]
    fn test_bad_rssi_is_reported() {
        let plan = row_of_rooms();
        let links = [AnchorLink::new("b1", "B", f64::NAN)];
        assert!(matches!(Localizer::default().rank(&links, &plan), Err(Error::Ranging(_))));
    }

    #[test]
    fn test_out_of_range_rssi_is_a_ranging_error() {
        let plan = row_of_rooms();
        let links = [AnchorLink::new("b1", "B", -10_000.0)];
        assert!(matches!(Localizer::default().rank(&links, &plan), Err(Error::Ranging(_))));
    }

    #[test]
    fn test_consistency_filter() {
        let mut plan = row_of_rooms();
        plan.add_room(room("F", 200.0)).unwrap();
        plan.set_walls("F", "B", 2.0).unwrap();
        let links = [AnchorLink::new("b1", "B", rssi_for(20.0, 2.0))];

        let reported = Localizer::default().rank(&links, &plan).unwrap();
        let far = reported.iter().find(|s| s.room == "F").unwrap();
        assert_eq!(far.consistent_anchors(), 0);
        assert_eq!(reported.last().unwrap().room, "F");

        let filtered = Localizer::default()
            .with_policy(ConsistencyPolicy::Filter)
            .rank(&links, &plan)
            .unwrap();
        assert_eq!(filtered.iter().map(|s| s.room.as_str()).collect::<Vec<_>>(), ["A", "B"]);
    }

    #[test]
    fn test_filter_can_leave_nothing() {
        let mut plan = FloorPlan::new();
        plan.add_room(room("B", 20.0)).unwrap();
        plan.add_room(room("F", 200.0)).unwrap();
        plan.set_walls("F", "B", 0.0).unwrap();
        let links = [AnchorLink::new("b1", "B", rssi_for(5.0, 0.0))];
        let localizer = Localizer::default().with_policy(ConsistencyPolicy::Filter);
        assert!(matches!(localizer.rank(&links, &plan), Err(Error::InsufficientEvidence(_))));
    }

    #[test]
    fn test_reaches() {
        let r = room("A", 0.0);
        // Disk inside the room.
        assert!(reaches(&r, r.center(), 1.0).unwrap());
        // Disk enclosing the room.
        assert!(reaches(&r, Position::new(5.0, 5.0), 100.0).unwrap());
        // Disk crossing the left wall from outside.
        assert!(reaches(&r, Position::new(-3.0, 5.0), 4.0).unwrap());
        assert!(!reaches(&r, Position::new(-3.0, 5.0), 2.0).unwrap());
    }

    #[test]
    fn test_anchor_links_skip_non_anchors() {
        let nodes = vec![
            Node::new("1", "A"),
            Node::new("2", "B"),
            Node::unknown("3"),
            Node::unknown("9"),
        ];
        let mut target = Node::unknown("9");
        target.set_link("1", -60.0);
        target.set_link("3", -50.0);
        target.set_link("4", -40.0);
        target.set_link("9", -10.0);
        let links = anchor_links(&target, &nodes);
        assert_eq!(links, vec![AnchorLink::new("1", "A", -60.0)]);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Filter".parse::<ConsistencyPolicy>(), Ok(ConsistencyPolicy::Filter));
        assert_eq!(" report ".parse::<ConsistencyPolicy>(), Ok(ConsistencyPolicy::Report));
        assert!("strict".parse::<ConsistencyPolicy>().is_err());
        assert_eq!(ConsistencyPolicy::Filter.to_string(), "filter");
    }
}
