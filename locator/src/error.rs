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

/// Errors reported by the localizer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// No anchor produced a residual for any candidate room.
    #[error("insufficient evidence: {0}")]
    InsufficientEvidence(String),
    #[error(transparent)]
    Model(#[from] roomloc_model::Error),
    #[error(transparent)]
    Ranging(#[from] roomloc_ranging::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
