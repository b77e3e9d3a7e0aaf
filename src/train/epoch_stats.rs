use serde::{Deserialize, Serialize};

/// Per-epoch training statistics produced by [`train`](crate::train::train).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 0-based epoch number, as logged.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean squared error over the training view after this epoch's updates.
    pub train_loss: f64,
    /// Wall-clock duration of the epoch in milliseconds, loss pass included.
    pub elapsed_ms: u64,
}

/// Everything a training run reports, one entry per completed epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    pub epochs: Vec<EpochStats>,
}

impl TrainReport {
    pub fn first_loss(&self) -> Option<f64> {
        self.epochs.first().map(|s| s.train_loss)
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|s| s.train_loss)
    }

    /// Writes the report as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<std::path::Path>) -> crate::error::Result<()> {
        let writer = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
