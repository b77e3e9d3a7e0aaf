use crate::dataset::{DatasetStorage, DatasetView};
use crate::error::{Error, Result};
use crate::loss::SquaredError;
use crate::network::Network;

fn check_view(net: &Network, view: &DatasetView, storage: &DatasetStorage) -> Result<()> {
    if view.storage_id() != storage.id() {
        return Err(Error::ForeignStorage);
    }
    if view.num_attributes() != net.input_size() {
        return Err(Error::DimensionMismatch {
            expected: net.input_size(),
            actual: view.num_attributes(),
        });
    }
    Ok(())
}

/// One SGD pass: a train step on every record, in the view's current order.
pub fn train_epoch(net: &mut Network, view: &DatasetView, storage: &DatasetStorage) -> Result<()> {
    check_view(net, view, storage)?;
    for record in view.records(storage)? {
        net.train_step(record.attributes, record.label)?;
    }
    Ok(())
}

/// Mean of `(label - prediction)^2` over every record of `view`.
///
/// Runs a forward pass per record, so the hidden activation cache ends up
/// holding the last record's values. The network is left unprimed.
pub fn average_loss(net: &mut Network, view: &DatasetView, storage: &DatasetStorage) -> Result<f64> {
    if view.is_empty() {
        return Err(Error::EmptyDataset);
    }
    check_view(net, view, storage)?;

    let mut total = 0.0;
    for record in view.records(storage)? {
        let predicted = net.forward(record.attributes)?;
        total += SquaredError::loss(predicted, record.label);
    }
    net.unprime();
    Ok(total / view.len() as f64)
}
