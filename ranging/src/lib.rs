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

//! Ranging library for RSSI.
//!
//! The log-distance path loss model with a per-wall attenuation term is
//! used to turn a received signal strength into an apparent distance inside
//! a building.

use serde::{Deserialize, Serialize};

/// Errors reported by the propagation model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid ranging input: {0}")]
    InvalidInput(String),
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// (dBm) RSSI measured at the reference distance.
pub const DEFAULT_REFERENCE_RSSI: f64 = -42.0;
/// Reference distance, in real-world units (ft for the shipped floor plans).
pub const DEFAULT_REFERENCE_DISTANCE: f64 = 18.0;
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 3.0;
/// Path loss units contributed by each wall. Negative values make each wall
/// look like extra distance.
pub const DEFAULT_WALL_ATTENUATION: f64 = -9.0;

/// Per-deployment calibration constants of the propagation model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(default = "default_reference_rssi")]
    pub reference_rssi: f64,
    #[serde(default = "default_reference_distance")]
    pub reference_distance: f64,
    #[serde(default = "default_path_loss_exponent")]
    pub path_loss_exponent: f64,
    #[serde(default = "default_wall_attenuation")]
    pub wall_attenuation: f64,
}

fn default_reference_rssi() -> f64 {
    DEFAULT_REFERENCE_RSSI
}

fn default_reference_distance() -> f64 {
    DEFAULT_REFERENCE_DISTANCE
}

fn default_path_loss_exponent() -> f64 {
    DEFAULT_PATH_LOSS_EXPONENT
}

fn default_wall_attenuation() -> f64 {
    DEFAULT_WALL_ATTENUATION
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            reference_rssi: DEFAULT_REFERENCE_RSSI,
            reference_distance: DEFAULT_REFERENCE_DISTANCE,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
            wall_attenuation: DEFAULT_WALL_ATTENUATION,
        }
    }
}

impl Calibration {
    /// Checks that the constants describe a usable model.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("reference_rssi", self.reference_rssi),
            ("reference_distance", self.reference_distance),
            ("path_loss_exponent", self.path_loss_exponent),
            ("wall_attenuation", self.wall_attenuation),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidCalibration(format!("{name} is not finite: {value}")));
        }
        if self.reference_distance <= 0.0 {
            return Err(Error::InvalidCalibration(format!(
                "reference_distance must be positive: {}",
                self.reference_distance
            )));
        }
        if self.path_loss_exponent <= 0.0 {
            return Err(Error::InvalidCalibration(format!(
                "path_loss_exponent must be positive: {}",
                self.path_loss_exponent
            )));
        }
        Ok(())
    }
}

/// Log-distance path loss model with wall attenuation.
///
/// ```text
/// d = d0 * 10 ^ ((rssi - rssi0 + k * walls) / (-10 * n))
/// ```
///
/// Typical hardware reports `rssi` in -100..0 dBm, but any finite value is
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationModel {
    calibration: Calibration,
}

impl Default for PropagationModel {
    fn default() -> Self {
        PropagationModel { calibration: Calibration::default() }
    }
}

impl PropagationModel {
    pub fn new(calibration: Calibration) -> Result<Self> {
        calibration.validate()?;
        Ok(PropagationModel { calibration })
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Convert an RSSI reading and wall count to an apparent distance.
    ///
    /// # Parameters
    ///
    /// * `measured_rssi`: averaged RSSI (dBm) between the two nodes.
    /// * `wall_count`: walls between the two rooms, possibly fractional.
    ///
    /// # Returns
    ///
    /// The estimated distance in the calibration's distance unit.
    pub fn estimate_distance(&self, measured_rssi: f64, wall_count: f64) -> Result<f64> {
        if !measured_rssi.is_finite() {
            return Err(Error::InvalidInput(format!("rssi is not finite: {measured_rssi}")));
        }
        check_wall_count(wall_count)?;
        let c = &self.calibration;
        let exponent = (measured_rssi - c.reference_rssi + c.wall_attenuation * wall_count)
            / (-10.0 * c.path_loss_exponent);
        let distance = c.reference_distance * 10f64.powf(exponent);
        if !(distance.is_finite() && distance > 0.0) {
            return Err(Error::InvalidInput(format!(
                "rssi {measured_rssi} with {wall_count} walls gives distance {distance}"
            )));
        }
        Ok(distance)
    }

    /// Inverse of [`PropagationModel::estimate_distance`]: the RSSI that the
    /// model predicts at `distance` through `wall_count` walls.
    pub fn expected_rssi(&self, distance: f64, wall_count: f64) -> Result<f64> {
        if !(distance.is_finite() && distance > 0.0) {
            return Err(Error::InvalidInput(format!("distance must be positive: {distance}")));
        }
        check_wall_count(wall_count)?;
        let c = &self.calibration;
        Ok(c.reference_rssi
            - c.wall_attenuation * wall_count
            - 10.0 * c.path_loss_exponent * (distance / c.reference_distance).log10())
    }
}

fn check_wall_count(wall_count: f64) -> Result<()> {
    match wall_count.is_finite() && wall_count >= 0.0 {
        true => Ok(()),
        false => Err(Error::InvalidInput(format!("wall count must be >= 0: {wall_count}"))),
    }
}
