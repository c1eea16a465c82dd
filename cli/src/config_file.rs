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

/// Calibration file for roomloc
use crate::args::DataArgs;
use anyhow::{anyhow, bail};
use log::{info, warn};
use roomloc_common::util::ini_file::IniFile;
use roomloc_locator::ConsistencyPolicy;
use roomloc_ranging::Calibration;
use std::path::Path;

/// Drawing units to real-world units of the shipped floor plans.
pub const DEFAULT_SCALE: f64 = 12.5;

const KNOWN_KEYS: [&str; 6] = [
    "reference_rssi",
    "reference_distance",
    "path_loss_exponent",
    "wall_attenuation",
    "scale",
    "consistency",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub calibration: Calibration,
    pub scale: f64,
    pub consistency: ConsistencyPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            calibration: Calibration::default(),
            scale: DEFAULT_SCALE,
            consistency: ConsistencyPolicy::default(),
        }
    }
}

impl Settings {
    /// Starts from the defaults and applies every key present in `ini`.
    pub fn from_ini(ini: &IniFile) -> anyhow::Result<Settings> {
        let mut settings = Settings::default();
        let calibration = &mut settings.calibration;
        for (key, field) in [
            ("reference_rssi", &mut calibration.reference_rssi),
            ("reference_distance", &mut calibration.reference_distance),
            ("path_loss_exponent", &mut calibration.path_loss_exponent),
            ("wall_attenuation", &mut calibration.wall_attenuation),
        ] {
            if let Some(value) = ini.get_parsed::<f64>(key)? {
                *field = value;
            }
        }
        if let Some(scale) = ini.get_parsed::<f64>("scale")? {
            settings.scale = scale;
        }
        if let Some(policy) = ini.get_parsed::<ConsistencyPolicy>("consistency")? {
            settings.consistency = policy;
        }
        for key in ini.keys().filter(|k| !KNOWN_KEYS.contains(k)) {
            warn!("ignoring unknown calibration key '{key}'");
        }
        Ok(settings)
    }

    /// Applies command line overrides and validates the result.
    pub fn with_overrides(mut self, data: &DataArgs) -> anyhow::Result<Settings> {
        if let Some(scale) = data.scale {
            self.scale = scale;
        }
        if let Some(policy) = data.consistency {
            self.consistency = policy;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.calibration.validate()?;
        if !(self.scale.is_finite() && self.scale > 0.0) {
            bail!("scale must be positive: {}", self.scale);
        }
        Ok(())
    }
}

/// Loads settings from `path`, or the defaults when no file is given.
pub fn load(path: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let mut ini = IniFile::new(path.to_path_buf());
    ini.read()?;
    let settings = Settings::from_ini(&ini)
        .map_err(|e| anyhow!("failed to load calibration {}: {e}", path.display()))?;
    info!("loaded calibration from {}: {:?}", path.display(), settings.calibration);
    Ok(settings)
}
