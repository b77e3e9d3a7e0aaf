use std::time::Instant;

use log::info;
use rand::Rng;

use crate::dataset::{DatasetStorage, DatasetView};
use crate::error::{Error, Result};
use crate::network::Network;
use crate::train::epoch_stats::{EpochStats, TrainReport};
use crate::train::trainer::{average_loss, train_epoch};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `net` for `epochs` passes over `view`.
///
/// Each epoch runs a train step on every record in the view's current order,
/// then computes the mean loss over the same view, logs it at `info` level as
/// `epoch {n} | loss: {loss}` and finally reshuffles the view with `rng`. The
/// loss of an epoch is therefore measured before that epoch's shuffle. There
/// is no early stopping.
///
/// # Errors
/// - [`Error::EmptyDataset`] if `view` holds no records
/// - [`Error::DimensionMismatch`] if the view's attribute count differs from
///   the network's input size
/// - [`Error::ForeignStorage`] if `view` was not created over `storage`
pub fn train<R: Rng + ?Sized>(
    net: &mut Network,
    view: &mut DatasetView,
    storage: &DatasetStorage,
    epochs: usize,
    rng: &mut R,
) -> Result<TrainReport> {
    if view.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let mut report = TrainReport {
        epochs: Vec::with_capacity(epochs),
    };

    for epoch in 0..epochs {
        let t_start = Instant::now();

        train_epoch(net, view, storage)?;
        let train_loss = average_loss(net, view, storage)?;
        info!("epoch {epoch} | loss: {train_loss:.10}");

        view.shuffle(rng);

        report.epochs.push(EpochStats {
            epoch,
            total_epochs: epochs,
            train_loss,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        });
    }

    Ok(report)
}
