use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings of one train-and-evaluate run.
///
/// Every field except `data` has a default, so a JSON config file may list
/// only what it changes. `num_rows`/`num_cols` follow the CSV loader's
/// convention (header row and label column included); when either is absent
/// the shape is read from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub data: PathBuf,
    pub num_rows: Option<usize>,
    pub num_cols: Option<usize>,
    pub hidden_size: usize,
    pub learning_rate: f64,
    pub epochs: usize,
    pub test_ratio: f64,
    /// Standardize attributes over the whole dataset before splitting.
    pub normalize: bool,
    /// Seed for weight init and shuffling; drawn from the OS when absent.
    pub seed: Option<u64>,
    pub model_out: Option<PathBuf>,
    pub report_out: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            data: PathBuf::new(),
            num_rows: None,
            num_cols: None,
            hidden_size: 2,
            learning_rate: 0.05,
            epochs: 25,
            test_ratio: 0.2,
            normalize: false,
            seed: None,
            model_out: None,
            report_out: None,
        }
    }
}

impl RunConfig {
    /// Deserializes a `RunConfig` from a JSON file. Does not validate, since
    /// command-line overrides are usually applied afterwards.
    pub fn load_json(path: impl AsRef<Path>) -> Result<RunConfig> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("no data file given".to_owned()));
        }
        if self.num_rows.is_some() != self.num_cols.is_some() {
            return Err(Error::InvalidConfig(
                "num_rows and num_cols must be given together".to_owned(),
            ));
        }
        if self.hidden_size == 0 {
            return Err(Error::InvalidConfig("hidden_size must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.test_ratio) {
            return Err(Error::InvalidConfig(format!(
                "test_ratio must be in [0, 1), got {}",
                self.test_ratio
            )));
        }
        Ok(())
    }
}
