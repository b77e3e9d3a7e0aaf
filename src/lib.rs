//! A one-hidden-layer regression network trained with single-example SGD,
//! with CSV datasets, handle-based dataset views and a fixed binary model
//! format.

pub mod activation;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loss;
pub mod network;
pub mod train;

// Convenience re-exports
pub use config::RunConfig;
pub use dataset::{load_csv, load_csv_auto, DatasetStorage, DatasetView, Record, RecordId};
pub use error::{Error, Result};
pub use network::{Network, NetworkSpec, ParameterBuffer};
pub use train::{average_loss, train, EpochStats, TrainReport};
