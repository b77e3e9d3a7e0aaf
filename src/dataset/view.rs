use std::fmt;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::dataset::storage::{DatasetStorage, Record, RecordId, StorageId};
use crate::error::{Error, Result};

/// An ordered subset of the records of one [`DatasetStorage`].
///
/// A view only owns its handle vector. Shuffling and splitting rearrange or
/// copy handles and never touch record data, so any number of views can share
/// one storage and be dropped in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetView {
    storage: StorageId,
    num_attributes: usize,
    handles: Vec<RecordId>,
}

impl DatasetView {
    pub(crate) fn new(storage: StorageId, num_attributes: usize, handles: Vec<RecordId>) -> Self {
        DatasetView {
            storage,
            num_attributes,
            handles,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    #[inline]
    pub fn num_attributes(&self) -> usize {
        self.num_attributes
    }

    /// Identity of the storage this view indexes into.
    #[inline]
    pub fn storage_id(&self) -> StorageId {
        self.storage
    }

    #[inline]
    pub fn handles(&self) -> &[RecordId] {
        &self.handles
    }

    fn check_storage(&self, storage: &DatasetStorage) -> Result<()> {
        if storage.id() != self.storage {
            return Err(Error::ForeignStorage);
        }
        Ok(())
    }

    /// Resolves the view's handles against `storage`, in view order.
    pub fn records<'a>(
        &'a self,
        storage: &'a DatasetStorage,
    ) -> Result<impl Iterator<Item = Record<'a>> + 'a> {
        self.check_storage(storage)?;
        Ok(self.handles.iter().map(move |&id| storage.record(id)))
    }

    /// In-place Fisher–Yates shuffle of the handle order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.handles.shuffle(rng);
    }

    /// Splits into `(train, test)`.
    ///
    /// `test_ratio` is clamped to `[0, 1]` (NaN counts as 0). The first
    /// `floor(test_ratio * len)` handles, in current order, become the test
    /// view; the rest become the train view. Shuffle first for a random split.
    pub fn split(&self, test_ratio: f64) -> (DatasetView, DatasetView) {
        let ratio = if test_ratio.is_nan() {
            0.0
        } else {
            test_ratio.clamp(0.0, 1.0)
        };
        let test_size = ((ratio * self.len() as f64).floor() as usize).min(self.len());
        let (test, train) = self.handles.split_at(test_size);

        debug!(
            "split {} records into {} train / {} test",
            self.len(),
            train.len(),
            test.len()
        );

        (
            DatasetView::new(self.storage, self.num_attributes, train.to_vec()),
            DatasetView::new(self.storage, self.num_attributes, test.to_vec()),
        )
    }

    /// Standardizes every attribute to zero mean and unit population standard
    /// deviation over the records of this view.
    ///
    /// This rewrites storage, so every other view over `storage` sees the new
    /// values. An attribute holding one value across the whole view returns
    /// [`Error::ConstantAttribute`] before any of its values are rewritten.
    pub fn normalize(&self, storage: &mut DatasetStorage) -> Result<()> {
        self.check_storage(storage)?;
        if self.is_empty() {
            return Ok(());
        }
        let n = self.len() as f64;

        for k in 0..self.num_attributes {
            let first = storage.record(self.handles[0]).attributes[k];
            if self
                .handles
                .iter()
                .all(|&id| storage.record(id).attributes[k] == first)
            {
                return Err(Error::ConstantAttribute { attribute: k });
            }

            let mut mean = 0.0;
            for &id in &self.handles {
                mean += storage.record(id).attributes[k];
            }
            mean /= n;

            let mut std = 0.0;
            for &id in &self.handles {
                let diff = storage.record(id).attributes[k] - mean;
                std += diff * diff;
            }
            std = (std / n).sqrt();

            if std == 0.0 {
                return Err(Error::ConstantAttribute { attribute: k });
            }

            for &id in &self.handles {
                let value = &mut storage.attributes_mut(id)[k];
                *value = (*value - mean) / std;
            }
            debug!("attribute {k}: mean={mean:.6} std={std:.6}");
        }
        Ok(())
    }

    /// Renders one line per record: `row | label,attr,attr,...` with two decimals.
    pub fn display<'a>(&'a self, storage: &'a DatasetStorage) -> Result<ViewDisplay<'a>> {
        self.check_storage(storage)?;
        Ok(ViewDisplay {
            view: self,
            storage,
        })
    }
}

/// [`fmt::Display`] adapter returned by [`DatasetView::display`].
pub struct ViewDisplay<'a> {
    view: &'a DatasetView,
    storage: &'a DatasetStorage,
}

impl fmt::Display for ViewDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, &id) in self.view.handles.iter().enumerate() {
            let record = self.storage.record(id);
            write!(f, "{row} | {}", record.label)?;
            for value in record.attributes {
                write!(f, ",{value:.2}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
