//
//  Copyright 2025 Google, Inc.
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at:
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! # IniFile class
//!
//! Flat `key = value` files used for deployment calibration. Section headers
//! are accepted but do not namespace keys.

use anyhow::{anyhow, Context};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// A read-only view over an ini file.
pub struct IniFile {
    /// The data stored in the ini file, ordered by key.
    data: BTreeMap<String, String>,
    /// The path to the ini file.
    filepath: PathBuf,
}

impl IniFile {
    /// Creates a new, empty IniFile backed by the given filepath.
    ///
    /// # Arguments
    ///
    /// * `filepath` - The path to the ini file.
    pub fn new(filepath: PathBuf) -> IniFile {
        IniFile { data: BTreeMap::new(), filepath }
    }

    /// Reads data into IniFile from the backing file, overwriting any
    /// existing data.
    pub fn read(&mut self) -> anyhow::Result<()> {
        let contents = fs::read_to_string(&self.filepath)
            .with_context(|| format!("failed to read {}", self.filepath.display()))?;
        self.data = parse(&contents);
        Ok(())
    }

    /// Builds an IniFile directly from text. The filepath is left empty.
    pub fn from_contents(contents: &str) -> IniFile {
        IniFile { data: parse(contents), filepath: PathBuf::new() }
    }

    /// Checks if a certain key exists in the file.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Gets the raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|v| v.as_str())
    }

    /// Gets the value for `key` parsed as `T`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the key is absent, `Err` when it is present but
    /// does not parse.
    pub fn get_parsed<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|e| {
                anyhow!("invalid value '{raw}' for '{key}' in {}: {e}", self.filepath.display())
            }),
        }
    }

    /// Iterates over all keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|k| k.as_str())
    }
}

fn parse(contents: &str) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') || line.starts_with('[')
        {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            data.insert(key.trim().to_owned(), value.trim().to_owned());
        }
    }
    data
}
