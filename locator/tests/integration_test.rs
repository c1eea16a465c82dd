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

use roomloc_common::util::roomloc_logger::init_for_test;
use roomloc_locator::{leave_one_out, ConsistencyPolicy, Localizer};
use roomloc_model::{aggregate, FloorPlan, Node, NodeId, Room, RssiSample, WallTable};
use roomloc_ranging::PropagationModel;

/// Where every node really is. Nodes 10 and 11 are treated as unknown.
const TRUTH: [(&str, &str); 6] =
    [("1", "A"), ("2", "B"), ("3", "C"), ("4", "D"), ("10", "D"), ("11", "A")];

// Two by two grid: A B on top, C D below. Neighbours share one wall.
fn plan() -> FloorPlan {
    let mut plan = FloorPlan::new();
    for (name, x, y) in [("A", 0.0, 40.0), ("B", 20.0, 40.0), ("C", 0.0, 20.0), ("D", 20.0, 20.0)]
    {
        plan.add_room(Room::new(name, x, y, 10.0, 10.0).unwrap()).unwrap();
    }
    let table = WallTable::from_records([
        ",A,B,C,D",
        "A,0,1,1,2",
        "B,1,0,2,1",
        "C,1,2,0,1",
        "D,2,1,1,0",
    ]
    .map(|line| line.split(',')))
    .unwrap();
    plan.assign_walls(&table).unwrap();
    plan
}

/// Samples from every node to every anchor, scattered symmetrically
/// around what the default model predicts. Nodes in the same room are
/// placed 2 units apart.
fn samples(plan: &FloorPlan) -> Vec<RssiSample> {
    let model = PropagationModel::default();
    let mut samples = Vec::new();
    for (sender, room) in TRUTH {
        for (receiver, anchor_room) in TRUTH.iter().take(4) {
            if sender == *receiver {
                continue;
            }
            let distance = match plan.center_distance(room, anchor_room).unwrap() {
                d if d == 0.0 => 2.0,
                d => d,
            };
            let walls = plan.walls_between(room, anchor_room).unwrap();
            let rssi = model.expected_rssi(distance, walls).unwrap();
            for offset in [-1.5, 1.5, 0.0] {
                samples.push(RssiSample::new(sender, *receiver, rssi + offset));
            }
        }
    }
    samples
}

fn nodes(plan: &FloorPlan) -> Vec<Node> {
    let links = aggregate(samples(plan));
    TRUTH
        .iter()
        .enumerate()
        .map(|(i, (id, room))| {
            let mut node = if i < 4 { Node::new(*id, room) } else { Node::unknown(*id) };
            node.attach_links(&links);
            node
        })
        .collect()
}

#[test]
fn test_locate_unknown_nodes() {
    init_for_test();
    let plan = plan();
    let nodes = nodes(&plan);
    let targets: Vec<&Node> = nodes.iter().filter(|n| !n.is_anchor()).collect();
    assert_eq!(targets.len(), 2);

    for policy in [ConsistencyPolicy::Report, ConsistencyPolicy::Filter] {
        let localizer = Localizer::default().with_policy(policy);
        let results = localizer.rank_all(&targets, &nodes, &plan);
        assert_eq!(results[0].0, NodeId::from("10"));
        assert_eq!(results[1].0, NodeId::from("11"));
        let best: Vec<String> = results
            .into_iter()
            .map(|(_, ranking)| ranking.unwrap()[0].room.clone())
            .collect();
        assert_eq!(best, vec!["D", "A"], "policy {policy}");
    }
}

#[test]
fn test_ranking_matches_single_node_call() {
    init_for_test();
    let plan = plan();
    let nodes = nodes(&plan);
    let localizer = Localizer::default();
    let ranking = localizer.rank_node(&nodes[4], &nodes, &plan).unwrap();
    assert_eq!(ranking.len(), 4);
    assert_eq!(ranking[0].anchors(), 4);
    assert!(ranking.windows(2).all(|w| w[0].residual <= w[1].residual));

    let batch = localizer.rank_all(&[&nodes[4]], &nodes, &plan);
    assert_eq!(batch[0].1.as_ref().unwrap(), &ranking);

    let json = serde_json::to_value(&ranking[0]).unwrap();
    assert_eq!(json["room"], "D");
    assert_eq!(json["evidence"].as_array().unwrap().len(), 4);
}

#[test]
fn test_leave_one_out_places_every_anchor() {
    init_for_test();
    let plan = plan();
    let nodes = nodes(&plan);
    let outcomes = leave_one_out(&Localizer::default(), &nodes, &plan);
    assert_eq!(outcomes.len(), 4);
    for outcome in &outcomes {
        assert!(outcome.is_hit(), "{outcome:?}");
    }
}
