//! Run settings, read from an optional `wherechain.*` file and then from
//! `WHERECHAIN_*` environment variables.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::bench::ProcessingMode;
use crate::error::Result;

pub const DEFAULT_SETTINGS_FILE: &str = "wherechain";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub processing_method: ProcessingMode,
    /// Runs every processing method over the same batch.
    pub compare_all: bool,
    pub headers: usize,
    pub lines_per_header: usize,
    /// Lines whose keys belong to none of the generated headers.
    pub unmatched_lines: usize,
    pub rounds: usize,
    /// Filter directive for the log output, unless `RUST_LOG` is set.
    pub log: String,
    /// Prints every result as a JSON line on stdout.
    pub report_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            processing_method: ProcessingMode::default(),
            compare_all: false,
            headers: 100,
            lines_per_header: 3,
            unmatched_lines: 0,
            rounds: 1,
            log: String::from("info"),
            report_json: false,
        }
    }
}

impl Settings {
    /// Loads the settings, where `path` names the settings file with or
    /// without its extension. A missing file is not an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_SETTINGS_FILE)).required(false))
            .add_source(Environment::with_prefix("WHERECHAIN").try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }

    /// The modes a run should go through.
    pub fn modes(&self) -> Vec<ProcessingMode> {
        if self.compare_all {
            ProcessingMode::ALL.to_vec()
        } else {
            vec![self.processing_method]
        }
    }
}
