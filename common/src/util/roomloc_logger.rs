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

//! A logger for the roomloc binary and its tests.
//!
//! Uses the env_logger crate that allows control of logging through
//! the RUST_LOG environment variable.

use chrono::Local;
use env_logger::{Builder, Env};
use log::{Level, Record};
use std::{ffi::OsStr, io::Write, path::Path};

/// Timestamp format used in every log line, e.g. `10-19 14:03:27.512`.
const TIME_FORMAT: &str = "%m-%d %H:%M:%S%.3f";

/// Initiating the environment for logging with given prefix.
///
/// Calling it more than once keeps the first logger.
pub fn init(prefix: &'static str) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(move |buf, record| {
        writeln!(
            buf,
            "{} {} {} {}:{} - {}",
            prefix,
            level_to_string(record.level()),
            Local::now().format(TIME_FORMAT),
            format_file(record),
            record.line().unwrap_or(0),
            record.args()
        )
    });
    let _ = builder.try_init();
}

/// Initiating the environment for logging in Rust unit tests.
pub fn init_for_test() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("debug"));
    builder.is_test(true).format(move |buf, record| {
        writeln!(
            buf,
            "{} {} \t| roomloc-test: {}",
            level_to_string(record.level()),
            Local::now().format(TIME_FORMAT),
            record.args()
        )
    });
    let _ = builder.try_init();
}

/// Parses the file name out of the record's source path.
fn format_file<'a>(record: &'a Record<'a>) -> &'a str {
    record
        .file()
        .and_then(|filepath| Path::new(filepath).file_name())
        .and_then(OsStr::to_str)
        .unwrap_or("N/A")
}

fn level_to_string(level: Level) -> &'static str {
    match level {
        Level::Error => "E",
        Level::Warn => "W",
        Level::Info => "I",
        Level::Debug => "D",
        Level::Trace => "T",
    }
}
