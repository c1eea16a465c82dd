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

//! Command Line Interface for roomloc

pub mod args;
pub mod config_file;
mod display;
pub mod loader;

pub use args::RoomlocArgs;

use anyhow::anyhow;
use args::{Command, DataArgs, Distance, Locate};
use config_file::Settings;
use display::{Displayer, Ranking};
use log::{debug, error, info, warn};
use roomloc_locator::{leave_one_out, Localizer, RoomScore};
use roomloc_model::{FloorPlan, Node, NodeId, RssiAggregator};
use roomloc_ranging::PropagationModel;
use serde::Serialize;

/// Per-node outcome of a `locate` run.
pub type NodeRanking = (NodeId, roomloc_locator::Result<Vec<RoomScore>>);

#[derive(Serialize)]
struct NodeReport<'a> {
    node: &'a NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    rooms: Option<&'a [RoomScore]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Runs the parsed command.
pub fn run(args: RoomlocArgs) -> anyhow::Result<()> {
    let settings =
        config_file::load(args.data.calibration.as_deref())?.with_overrides(&args.data)?;
    debug!("settings: {settings:?}");
    match &args.command {
        Command::Locate(cmd) => locate(cmd, &args.data, &settings, args.verbose),
        Command::Validate => validate(&args.data, &settings, args.verbose),
        Command::Distance(cmd) => distance(cmd, &settings),
        Command::Rooms => {
            let plan = load_plan(&args.data, &settings)?;
            for room in plan.rooms() {
                println!("{}", Displayer::new(room, args.verbose));
            }
            Ok(())
        }
    }
}

fn localizer(settings: &Settings) -> anyhow::Result<Localizer> {
    let model = PropagationModel::new(settings.calibration)?;
    Ok(Localizer::new(model).with_policy(settings.consistency))
}

/// Loads the rooms and attaches the wall matrix.
pub fn load_plan(data: &DataArgs, settings: &Settings) -> anyhow::Result<FloorPlan> {
    let mut plan = loader::load_rooms(&data.resolve(&data.rooms), settings.scale)?;
    let walls = loader::load_walls(&data.resolve(&data.walls))?;
    plan.assign_walls(&walls)?;
    for (a, b) in plan.asymmetric_pairs() {
        warn!("wall counts between {a} and {b} differ by direction");
    }
    Ok(plan)
}

/// Loads the node table and attaches the mean RSSI each node sent to
/// every other node.
pub fn load_linked_nodes(data: &DataArgs) -> anyhow::Result<Vec<Node>> {
    let mut nodes = loader::load_nodes(&data.resolve(&data.nodes))?;
    let mut aggregator = RssiAggregator::new();
    aggregator.extend(loader::load_rssi(&data.resolve(&data.rssi))?);
    if aggregator.dropped() > 0 {
        warn!("{} samples were not finite and were ignored", aggregator.dropped());
    }
    let links = aggregator.finish();
    for node in nodes.iter_mut() {
        let attached = node.attach_links(&links);
        debug!("node {}: {attached} links", node.id());
    }
    Ok(nodes)
}

/// Ranks the rooms for `--node`, or for every node without a room.
pub fn rank_targets(
    cmd: &Locate,
    data: &DataArgs,
    settings: &Settings,
) -> anyhow::Result<Vec<NodeRanking>> {
    let plan = load_plan(data, settings)?;
    let nodes = load_linked_nodes(data)?;
    let targets: Vec<&Node> = match &cmd.node {
        Some(id) => {
            let id = loader::node_number(id);
            let node = nodes
                .iter()
                .find(|n| *n.id() == id)
                .ok_or_else(|| roomloc_model::Error::NodeNotFound(id.to_string()))?;
            vec![node]
        }
        None => nodes.iter().filter(|n| !n.is_anchor()).collect(),
    };
    info!("localizing {} nodes over {} rooms", targets.len(), plan.len());
    Ok(localizer(settings)?.rank_all(&targets, &nodes, &plan))
}

fn locate(
    cmd: &Locate,
    data: &DataArgs,
    settings: &Settings,
    verbose: bool,
) -> anyhow::Result<()> {
    let results = rank_targets(cmd, data, settings)?;
    if cmd.json {
        let reports: Vec<NodeReport> = results
            .iter()
            .map(|(node, result)| match result {
                Ok(scores) => NodeReport { node, rooms: Some(scores.as_slice()), error: None },
                Err(e) => NodeReport { node, rooms: None, error: Some(e.to_string()) },
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    let mut failed = 0;
    for (node, result) in &results {
        match result {
            Ok(scores) if !cmd.json => {
                let ranking = Ranking { node, scores, top: cmd.top };
                println!("{}", Displayer::new(ranking, verbose));
            }
            Ok(_) => {}
            Err(e) => {
                error!("node {node}: {e}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(anyhow!("{failed} of {} nodes could not be localized", results.len()));
    }
    Ok(())
}

fn validate(data: &DataArgs, settings: &Settings, verbose: bool) -> anyhow::Result<()> {
    let plan = load_plan(data, settings)?;
    let nodes = load_linked_nodes(data)?;
    let outcomes = leave_one_out(&localizer(settings)?, &nodes, &plan);
    println!("{}", Displayer::new(outcomes.as_slice(), verbose));
    Ok(())
}

fn distance(cmd: &Distance, settings: &Settings) -> anyhow::Result<()> {
    let model = PropagationModel::new(settings.calibration)?;
    let d = model.estimate_distance(cmd.rssi, cmd.walls)?;
    println!("{d:.3}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rand::{distributions::Alphanumeric, Rng};
    use std::fs;
    use std::path::PathBuf;

    /// A data directory with three rooms along a corridor, three anchors
    /// and one unknown node sitting in room B.
    struct TrialDir(PathBuf);

    impl TrialDir {
        fn new() -> TrialDir {
            let name: String =
                rand::thread_rng().sample_iter(&Alphanumeric).take(8).map(char::from).collect();
            let dir = std::env::temp_dir().join(format!("roomloc_trial_{name}"));
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join("rooms.csv"),
                "name,x,y,width,height\nA,0,10,10,10\nB,20,10,10,10\nC,40,10,10,10\n",
            )
            .unwrap();
            fs::write(dir.join("Walls.csv"), ",A,B,C\nA,0,2,4\nB,2,0,2\nC,4,2,0\n").unwrap();
            fs::write(dir.join("node_locations.csv"), "node_id,room\n1,A\n2,B\n3,C\n9,\n").unwrap();
            // Samples the default model maps exactly onto the center
            // distances seen from room B.
            let model = PropagationModel::default();
            let mut rssi = String::from("sender,receiver,rssi\n");
            for receiver in [1, 3] {
                let value = model.expected_rssi(20.0, 2.0).unwrap();
                rssi.push_str(&format!("9,{receiver},{}\n", value - 1.0));
                rssi.push_str(&format!("9,{receiver}.0,{}\n", value + 1.0));
            }
            rssi.push_str("9,2,-40\n");
            fs::write(dir.join("rssi_data_trial_1.csv"), rssi).unwrap();
            TrialDir(dir)
        }

        fn args(&self, extra: &[&str]) -> RoomlocArgs {
            let mut argv = vec!["roomloc"];
            argv.extend_from_slice(extra);
            argv.extend_from_slice(&["--data-dir", self.0.to_str().unwrap(), "--scale", "1"]);
            RoomlocArgs::try_parse_from(argv).unwrap()
        }
    }

    impl Drop for TrialDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn locate_args(args: &RoomlocArgs) -> &Locate {
        match &args.command {
            Command::Locate(cmd) => cmd,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rank_targets_unknown_nodes() {
        let trial = TrialDir::new();
        let args = trial.args(&["locate"]);
        let settings = Settings::default().with_overrides(&args.data).unwrap();
        let results = rank_targets(locate_args(&args), &args.data, &settings).unwrap();
        assert_eq!(results.len(), 1);
        let (node, ranking) = &results[0];
        assert_eq!(*node, NodeId::from(9u32));
        let ranking = ranking.as_ref().unwrap();
        assert_eq!(ranking[0].room, "B");
        assert_eq!(ranking[0].anchors(), 3);
    }

    #[test]
    fn test_rank_targets_single_anchor() {
        let trial = TrialDir::new();
        let args = trial.args(&["locate", "--node", "2"]);
        let settings = Settings::default().with_overrides(&args.data).unwrap();
        let results = rank_targets(locate_args(&args), &args.data, &settings).unwrap();
        assert_eq!(results.len(), 1);
        // Node 2 sent nothing.
        assert!(results[0].1.is_err());
    }

    #[test]
    fn test_unknown_node() {
        let trial = TrialDir::new();
        let args = trial.args(&["locate", "--node", "42"]);
        let settings = Settings::default().with_overrides(&args.data).unwrap();
        let err = rank_targets(locate_args(&args), &args.data, &settings).unwrap_err();
        assert_eq!(
            err.downcast_ref::<roomloc_model::Error>(),
            Some(&roomloc_model::Error::NodeNotFound("42".to_string()))
        );
    }

    #[test]
    fn test_padded_node_flag() {
        let trial = TrialDir::new();
        let args = trial.args(&["locate", "--node", "09"]);
        let settings = Settings::default().with_overrides(&args.data).unwrap();
        let results = rank_targets(locate_args(&args), &args.data, &settings).unwrap();
        assert_eq!(results[0].0, NodeId::from(9u32));
        assert_eq!(results[0].1.as_ref().unwrap()[0].room, "B");
    }

    #[test]
    fn test_run_commands() {
        let trial = TrialDir::new();
        assert!(run(trial.args(&["rooms", "-v"])).is_ok());
        assert!(run(trial.args(&["locate", "--json"])).is_ok());
        assert!(run(trial.args(&["validate"])).is_ok());
        assert!(run(trial.args(&["distance", "-60", "1"])).is_ok());
        assert!(run(trial.args(&["rooms", "--rooms", "rooms.txt"])).is_err());
    }

    #[test]
    fn test_missing_data_dir() {
        let args =
            RoomlocArgs::try_parse_from(["roomloc", "rooms", "--data-dir", "/nonexistent/roomloc"])
                .unwrap();
        assert!(run(args).is_err());
    }
}
