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

//! CSV loaders for the floor plan, wall matrix, node table and raw samples.
//!
//! Every file must carry a `.csv` extension. Cells are trimmed and rows may
//! have any number of cells.

use anyhow::{anyhow, bail, Context};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, trace};
use roomloc_model::{FloorPlan, Node, NodeId, Room, RssiSample, WallTable};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

fn open(path: &Path) -> anyhow::Result<csv::Reader<File>> {
    if path.extension().and_then(|e| e.to_str()) != Some("csv") {
        bail!("cannot load {}: file type must be csv", path.display());
    }
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("could not load data from {}", path.display()))
}

/// Reads every record that has at least one non-blank cell.
fn records(path: &Path) -> anyhow::Result<Vec<StringRecord>> {
    let mut reader = open(path)?;
    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.with_context(|| format!("failed to read {}", path.display()))?;
        if record.iter().any(|cell| !cell.is_empty()) {
            records.push(record);
        }
    }
    Ok(records)
}

fn line(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

fn parse_cell(record: &StringRecord, index: usize, what: &str) -> anyhow::Result<f64> {
    let cell = record
        .get(index)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| anyhow!("line {}: missing {what}", line(record)))?;
    cell.parse::<f64>().with_context(|| format!("line {}: invalid {what} '{cell}'", line(record)))
}

/// Loads `name,x,y,width,height` rows in drawing units, scaled by `scale`.
/// A row whose first cell is `name` is a header.
pub fn load_rooms(path: &Path, scale: f64) -> anyhow::Result<FloorPlan> {
    let mut plan = FloorPlan::new();
    for record in records(path)? {
        let name = &record[0];
        if name == "name" {
            continue;
        }
        let room = Room::from_drawing(
            name,
            parse_cell(&record, 1, "x")?,
            parse_cell(&record, 2, "y")?,
            parse_cell(&record, 3, "width")?,
            parse_cell(&record, 4, "height")?,
            scale,
        )?;
        trace!("room {name}: center {:?}", room.center());
        plan.add_room(room)?;
    }
    info!("loaded {} rooms from {}", plan.len(), path.display());
    Ok(plan)
}

/// Loads the wall adjacency matrix. See [`WallTable::from_records`].
pub fn load_walls(path: &Path) -> anyhow::Result<WallTable> {
    let rows: Vec<Vec<String>> = records(path)?
        .iter()
        .map(|record| record.iter().map(str::to_owned).collect())
        .collect();
    let table = WallTable::from_records(rows)
        .with_context(|| format!("invalid wall table {}", path.display()))?;
    debug!("loaded {} wall rows from {}", table.rows().len(), path.display());
    Ok(table)
}

/// Loads `node_id,room` rows. A blank room marks an unknown node; a first
/// row starting with `id` or `node` is a header.
pub fn load_nodes(path: &Path) -> anyhow::Result<Vec<Node>> {
    let mut nodes = Vec::new();
    let mut seen = BTreeSet::new();
    for (i, record) in records(path)?.iter().enumerate() {
        let id = &record[0];
        if i == 0 && ["id", "node", "node_id"].iter().any(|h| id.eq_ignore_ascii_case(h)) {
            continue;
        }
        if id.is_empty() {
            bail!("line {}: missing node id", line(record));
        }
        let id = node_number(id);
        if !seen.insert(id.clone()) {
            bail!("line {}: duplicate node {id}", line(record));
        }
        nodes.push(Node::new(id, record.get(1).unwrap_or_default()));
    }
    let anchors = nodes.iter().filter(|n| n.is_anchor()).count();
    info!("loaded {} nodes ({anchors} anchors) from {}", nodes.len(), path.display());
    Ok(nodes)
}

/// Loads `sender,receiver,rssi` rows. Rows whose first cell is not an
/// integer node number are skipped. Both ids go through [`node_number`].
pub fn load_rssi(path: &Path) -> anyhow::Result<Vec<RssiSample>> {
    let mut samples = Vec::new();
    let mut skipped = 0;
    for record in records(path)? {
        if record[0].parse::<u32>().is_err() {
            skipped += 1;
            continue;
        }
        let receiver = record
            .get(1)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow!("line {}: missing receiver", line(&record)))?;
        samples.push(RssiSample::new(
            node_number(&record[0]),
            node_number(receiver),
            parse_cell(&record, 2, "rssi")?,
        ));
    }
    info!("loaded {} samples from {} ({skipped} rows skipped)", samples.len(), path.display());
    Ok(samples)
}

/// Canonical id for a node cell: whole numbers lose leading zeros and a
/// trailing `.0` (`"07"` and `"7.0"` are node `7`), anything else is kept.
pub fn node_number(cell: &str) -> NodeId {
    match cell.parse::<f64>() {
        Ok(n) if n.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&n) => {
            NodeId::from(n as u32)
        }
        _ => NodeId::from(cell),
    }
}
