use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Construction parameters of a network.
///
/// Fields:
/// - `input_size`    — number of input units; must equal the dataset's attribute count
/// - `hidden_size`   — number of hidden sigmoid units (tunable, > 0)
/// - `learning_rate` — SGD step size, finite and > 0 (typically 0.01–0.05)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub input_size: usize,
    pub hidden_size: usize,
    pub learning_rate: f64,
}

impl NetworkSpec {
    pub fn new(input_size: usize, hidden_size: usize, learning_rate: f64) -> Self {
        NetworkSpec {
            input_size,
            hidden_size,
            learning_rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(Error::InvalidConfig("input_size must be > 0".to_owned()));
        }
        if self.hidden_size == 0 {
            return Err(Error::InvalidConfig("hidden_size must be > 0".to_owned()));
        }
        // The model file stores both sizes as i32.
        if i32::try_from(self.input_size).is_err() || i32::try_from(self.hidden_size).is_err() {
            return Err(Error::InvalidConfig(format!(
                "sizes must fit in i32, got input_size={} hidden_size={}",
                self.input_size, self.hidden_size
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let reader = BufReader::new(File::open(path)?);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
