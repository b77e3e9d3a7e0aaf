use std::sync::atomic::{AtomicU64, Ordering};

use crate::dataset::view::DatasetView;
use crate::error::{Error, Result};

static NEXT_STORAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`DatasetStorage`]; views carry it so that
/// resolving a view against the wrong storage is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageId(u64);

impl StorageId {
    fn next() -> StorageId {
        StorageId(NEXT_STORAGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to one record inside a [`DatasetStorage`].
///
/// Only storages mint these, so a handle is always in range for the storage
/// whose id its view carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(usize);

impl RecordId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A labeled example borrowed from storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    pub label: i32,
    pub attributes: &'a [f64],
}

/// Owner of every record of a dataset.
///
/// Labels and attributes live in two separate arrays. Record `k` is
/// `labels[k]` plus the contiguous slice
/// `attributes[k * num_attributes..][..num_attributes]`. The record count never
/// changes after construction; only [`DatasetView::normalize`] rewrites
/// attribute values.
#[derive(Debug)]
pub struct DatasetStorage {
    id: StorageId,
    num_attributes: usize,
    labels: Vec<i32>,
    attributes: Vec<f64>,
}

impl DatasetStorage {
    pub(crate) fn with_capacity(num_attributes: usize, num_examples: usize) -> Result<Self> {
        if num_attributes == 0 {
            return Err(Error::InvalidConfig(
                "num_attributes must be > 0".to_owned(),
            ));
        }
        let slots = num_examples.checked_mul(num_attributes).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "{num_examples} examples of {num_attributes} attributes overflow usize"
            ))
        })?;
        Ok(DatasetStorage {
            id: StorageId::next(),
            num_attributes,
            labels: Vec::with_capacity(num_examples),
            attributes: Vec::with_capacity(slots),
        })
    }

    pub(crate) fn push(&mut self, label: i32, attributes: &[f64]) -> Result<RecordId> {
        if attributes.len() != self.num_attributes {
            return Err(Error::DimensionMismatch {
                expected: self.num_attributes,
                actual: attributes.len(),
            });
        }
        let id = RecordId(self.labels.len());
        self.labels.push(label);
        self.attributes.extend_from_slice(attributes);
        Ok(id)
    }

    /// Builds storage from in-memory `(label, attributes)` pairs.
    pub fn from_records<I, A>(num_attributes: usize, records: I) -> Result<DatasetStorage>
    where
        I: IntoIterator<Item = (i32, A)>,
        A: AsRef<[f64]>,
    {
        let records = records.into_iter();
        let mut storage = DatasetStorage::with_capacity(num_attributes, records.size_hint().0)?;
        for (label, attributes) in records {
            storage.push(label, attributes.as_ref())?;
        }
        Ok(storage)
    }

    #[inline]
    pub fn id(&self) -> StorageId {
        self.id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn num_attributes(&self) -> usize {
        self.num_attributes
    }

    /// Handles of every record, in storage order.
    pub fn ids(&self) -> impl Iterator<Item = RecordId> {
        (0..self.len()).map(RecordId)
    }

    /// A view over every record in storage order.
    pub fn view(&self) -> DatasetView {
        DatasetView::new(self.id, self.num_attributes, self.ids().collect())
    }

    /// Panics if `id` was minted by another storage.
    #[inline]
    pub fn record(&self, id: RecordId) -> Record<'_> {
        let start = id.0 * self.num_attributes;
        Record {
            label: self.labels[id.0],
            attributes: &self.attributes[start..start + self.num_attributes],
        }
    }

    #[inline]
    pub(crate) fn attributes_mut(&mut self, id: RecordId) -> &mut [f64] {
        let start = id.0 * self.num_attributes;
        &mut self.attributes[start..start + self.num_attributes]
    }
}
