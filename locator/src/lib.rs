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

//! Room-level localization of a sensor node from RSSI links to anchors.

mod error;
pub mod localizer;
pub mod validation;

pub use error::{Error, Result};
pub use localizer::{
    anchor_links, AnchorEvidence, AnchorLink, ConsistencyPolicy, Localizer, RoomScore,
};
pub use validation::{leave_one_out, ValidationOutcome};
