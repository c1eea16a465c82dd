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

//! Reduction of raw RSSI samples to one value per ordered node pair.

use crate::node::NodeId;
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;

/// One raw reading: `receiver` heard `sender` at `value` dBm.
#[derive(Debug, Clone, PartialEq)]
pub struct RssiSample {
    pub sender: NodeId,
    pub receiver: NodeId,
    pub value: f64,
}

impl RssiSample {
    pub fn new(sender: impl Into<NodeId>, receiver: impl Into<NodeId>, value: f64) -> Self {
        RssiSample { sender: sender.into(), receiver: receiver.into(), value }
    }
}

/// Ordered (sender, receiver) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LinkKey {
    pub sender: NodeId,
    pub receiver: NodeId,
}

impl LinkKey {
    pub fn new(sender: impl Into<NodeId>, receiver: impl Into<NodeId>) -> Self {
        LinkKey { sender: sender.into(), receiver: receiver.into() }
    }
}

/// Running mean of one link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LinkStats {
    pub count: u64,
    pub mean: f64,
}

impl LinkStats {
    // Welford update, avoids accumulating a large sum.
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }
}

/// Incremental aggregator. A pair only gets an entry once it has a sample.
#[derive(Debug, Clone, Default)]
pub struct RssiAggregator {
    links: BTreeMap<LinkKey, LinkStats>,
    dropped: u64,
}

impl RssiAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one sample. Non-finite values are dropped and counted.
    pub fn add(&mut self, sample: RssiSample) -> bool {
        if !sample.value.is_finite() {
            warn!(
                "dropping non-finite rssi {} from {} to {}",
                sample.value, sample.sender, sample.receiver
            );
            self.dropped += 1;
            return false;
        }
        self.links
            .entry(LinkKey { sender: sample.sender, receiver: sample.receiver })
            .or_default()
            .push(sample.value);
        true
    }

    pub fn extend<I: IntoIterator<Item = RssiSample>>(&mut self, samples: I) {
        for sample in samples {
            self.add(sample);
        }
    }

    pub fn stats(&self) -> &BTreeMap<LinkKey, LinkStats> {
        &self.links
    }

    /// Number of samples rejected by [`RssiAggregator::add`].
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Mean RSSI per ordered pair.
    pub fn finish(self) -> BTreeMap<LinkKey, f64> {
        self.links.into_iter().map(|(key, stats)| (key, stats.mean)).collect()
    }
}

/// Groups `samples` by ordered pair and reduces each group to its mean.
pub fn aggregate<I: IntoIterator<Item = RssiSample>>(samples: I) -> BTreeMap<LinkKey, f64> {
    let mut aggregator = RssiAggregator::new();
    aggregator.extend(samples);
    aggregator.finish()
}
