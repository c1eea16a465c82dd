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

use crate::rssi::LinkKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a sensor node, as written in the node and RSSI tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.trim().to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId::from(id.as_str())
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id.to_string())
    }
}

/// A sensor in the network.
///
/// Anchors carry the room they were installed in; the node being localized
/// has no room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    id: NodeId,
    room: Option<String>,
    /// Aggregated RSSI of packets this node sent, keyed by receiver.
    links: BTreeMap<NodeId, f64>,
}

impl Node {
    /// Builds a node from a table row. A blank `room` makes it unknown.
    pub fn new(id: impl Into<NodeId>, room: &str) -> Self {
        let room = room.trim();
        Node {
            id: id.into(),
            room: (!room.is_empty()).then(|| room.to_owned()),
            links: BTreeMap::new(),
        }
    }

    pub fn unknown(id: impl Into<NodeId>) -> Self {
        Node::new(id, "")
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn is_anchor(&self) -> bool {
        self.room.is_some()
    }

    pub fn links(&self) -> &BTreeMap<NodeId, f64> {
        &self.links
    }

    pub fn link_to(&self, other: &NodeId) -> Option<f64> {
        self.links.get(other).copied()
    }

    pub fn set_link(&mut self, other: impl Into<NodeId>, rssi: f64) {
        self.links.insert(other.into(), rssi);
    }

    /// Copies every aggregated link sent by this node, skipping self links.
    /// Returns how many links were attached.
    pub fn attach_links(&mut self, aggregate: &BTreeMap<LinkKey, f64>) -> usize {
        let mut attached = 0;
        for (key, value) in aggregate {
            if key.sender == self.id && key.receiver != self.id {
                self.links.insert(key.receiver.clone(), *value);
                attached += 1;
            }
        }
        attached
    }
}
