//! Engine Module
//!
//! The client-facing handle that ties the workspace to its request executor.
//!
//! ## Responsibilities
//! - Validate configuration and open the on-disk state
//! - Run the executor worker that owns the workspace
//! - Hand out transactions
//! - Shut the worker down on close (or drop)
//!
//! ## Concurrency Model: single actor
//!
//! Every put, get and multi-get is a message to one worker thread, which
//! applies them one at a time in submission order. Any number of threads
//! may hold transactions; they share nothing but the request queue.

mod batch;
mod executor;
mod request;
mod transaction;
mod workspace;

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crate::config::Config;
use crate::error::{LodeError, Result};

pub use batch::{Batch, MAX_TRANSACTION_SIZE};
pub use executor::{wait, RequestExecutor};
pub use request::Request;
pub use transaction::{ReadonlyTransaction, Transaction};
pub use workspace::{RecoverySummary, Workspace};

/// The main storage engine handle
pub struct Engine {
    directory: PathBuf,
    executor: RequestExecutor,
    worker: Option<JoinHandle<()>>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Reopen WAL segments, SSTables and bloom filters
    /// 3. Start the executor worker
    pub fn open(config: Config) -> Result<Self> {
        let directory = config.directory.clone();
        let workspace = Workspace::open(config)?;
        let (executor, worker) = RequestExecutor::spawn(workspace)?;

        tracing::info!("LodeKV engine v{} opened at {}", crate::VERSION, directory.display());

        Ok(Self {
            directory,
            executor,
            worker: Some(worker),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().directory(path).build())
    }

    pub fn new_transaction(&self) -> Transaction {
        Transaction::new(self.executor.clone())
    }

    pub fn new_readonly_transaction(&self) -> ReadonlyTransaction {
        ReadonlyTransaction::new(self.executor.clone())
    }

    /// Close the engine gracefully
    ///
    /// Flushes the active memtable, syncs the WAL and stops the worker.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    /// Get the data directory path
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn shutdown(&mut self) -> Result<()> {
        let worker = match self.worker.take() {
            Some(worker) => worker,
            None => return Ok(()),
        };
        let result = self.executor.close().and_then(wait);
        if worker.join().is_err() {
            return Err(LodeError::Storage("request executor panicked".to_string()));
        }
        tracing::info!("LodeKV engine closed at {}", self.directory.display());
        result
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!("Failed to shut down engine: {}", e);
        }
    }
}
