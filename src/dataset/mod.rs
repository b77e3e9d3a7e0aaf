pub mod csv;
pub mod storage;
pub mod view;

pub use csv::{detect_shape, load_csv, load_csv_auto, parse_csv};
pub use storage::{DatasetStorage, Record, RecordId, StorageId};
pub use view::{DatasetView, ViewDisplay};
