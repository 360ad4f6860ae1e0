//! Client transactions
//!
//! A `Transaction` collects pairs into one batch and commits them as a
//! single WAL transaction. A `ReadonlyTransaction` issues lookups. Both go
//! through the same request executor.

use crate::error::{LodeError, Result};
use crate::model::{GetResult, Slice};

use super::batch::{Batch, MAX_TRANSACTION_SIZE};
use super::executor::{wait, RequestExecutor};

/// Read-write transaction owning one batch
pub struct Transaction {
    executor: RequestExecutor,
    batch: Batch,
}

impl Transaction {
    pub(crate) fn new(executor: RequestExecutor) -> Self {
        Self {
            executor,
            batch: Batch::new(),
        }
    }

    /// Add a pair to the batch.
    ///
    /// Fails with `BatchTooLarge`, leaving the batch unchanged, if the framed
    /// batch would grow past `MAX_TRANSACTION_SIZE` bytes.
    pub fn put(&mut self, key: impl Into<Slice>, value: impl Into<Slice>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        if self.batch.would_exceed(&key, &value, MAX_TRANSACTION_SIZE) {
            return Err(LodeError::BatchTooLarge {
                size: self.batch.size_with(&key, &value),
                max: MAX_TRANSACTION_SIZE,
            });
        }
        self.batch.add(key, value);
        Ok(())
    }

    /// Submit the batch and wait for it to be applied
    ///
    /// A failed commit is marked failed in the WAL and its pairs are not
    /// served from memory. Pairs flushed to an SSTable before the failure
    /// remain readable.
    pub fn commit(self) -> Result<()> {
        if self.batch.is_empty() {
            return Err(LodeError::EmptyBatch);
        }
        wait(self.executor.put(self.batch)?)
    }

    /// Pairs added so far
    pub fn batch(&self) -> &Batch {
        &self.batch
    }
}

/// Lookup-only transaction
#[derive(Clone)]
pub struct ReadonlyTransaction {
    executor: RequestExecutor,
}

impl ReadonlyTransaction {
    pub(crate) fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    pub fn get(&self, key: impl Into<Slice>) -> Result<GetResult> {
        wait(self.executor.get(key.into())?)
    }

    /// Look up several keys; results are not in input order, match them by `key`
    pub fn multi_get<I, K>(&self, keys: I) -> Result<Vec<GetResult>>
    where
        I: IntoIterator<Item = K>,
        K: Into<Slice>,
    {
        let keys = keys.into_iter().map(Into::into).collect();
        wait(self.executor.multi_get(keys)?)
    }
}
