pub mod epoch_stats;
pub mod loop_fn;
pub mod trainer;

pub use epoch_stats::{EpochStats, TrainReport};
pub use loop_fn::train;
pub use trainer::{average_loss, train_epoch};
