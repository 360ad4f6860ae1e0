//! Request executor
//!
//! A single worker thread owns the workspace and drains one request queue,
//! so every put and lookup is applied in submission order. Callers block
//! only on the response channel of their own request.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::{LodeError, Result};
use crate::model::{GetResult, Slice};

use super::batch::Batch;
use super::request::Request;
use super::workspace::Workspace;

const WORKER_NAME: &str = "lodekv-executor";

/// Handle for submitting requests to the worker; cheap to clone
#[derive(Clone)]
pub struct RequestExecutor {
    requests: Sender<Request>,
}

impl RequestExecutor {
    /// Start the worker thread, moving the workspace into it
    pub fn spawn(workspace: Workspace) -> Result<(Self, JoinHandle<()>)> {
        let (sender, receiver) = channel::unbounded();
        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_owned())
            .spawn(move || run(workspace, receiver))?;
        Ok((Self { requests: sender }, worker))
    }

    pub fn put(&self, batch: Batch) -> Result<Receiver<Result<()>>> {
        let (response, receiver) = channel::bounded(1);
        self.submit(Request::Put { batch, response })?;
        Ok(receiver)
    }

    pub fn get(&self, key: Slice) -> Result<Receiver<Result<GetResult>>> {
        let (response, receiver) = channel::bounded(1);
        self.submit(Request::Get { key, response })?;
        Ok(receiver)
    }

    pub fn multi_get(&self, keys: Vec<Slice>) -> Result<Receiver<Result<Vec<GetResult>>>> {
        let (response, receiver) = channel::bounded(1);
        self.submit(Request::MultiGet { keys, response })?;
        Ok(receiver)
    }

    /// Ask the worker to close the workspace and stop
    pub fn close(&self) -> Result<Receiver<Result<()>>> {
        let (response, receiver) = channel::bounded(1);
        self.submit(Request::Close { response })?;
        Ok(receiver)
    }

    fn submit(&self, request: Request) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| LodeError::ExecutorStopped)
    }
}

/// Block until the worker answers
pub fn wait<T>(receiver: Receiver<Result<T>>) -> Result<T> {
    receiver.recv().map_err(|_| LodeError::ExecutorStopped)?
}

fn run(mut workspace: Workspace, requests: Receiver<Request>) {
    tracing::debug!("Request executor started");

    for request in requests.iter() {
        tracing::trace!("Executing {} request", request.kind());
        // A send only fails if the caller stopped waiting
        match request {
            Request::Put { batch, response } => {
                let _ = response.send(workspace.put(&batch));
            }
            Request::Get { key, response } => {
                let _ = response.send(workspace.get(&key));
            }
            Request::MultiGet { keys, response } => {
                let _ = response.send(workspace.multi_get(&keys));
            }
            Request::Close { response } => {
                let _ = response.send(workspace.close());
                tracing::debug!("Request executor stopped");
                return;
            }
        }
    }

    // Every handle was dropped without a close request
    if let Err(e) = workspace.close() {
        tracing::warn!("Failed to close workspace: {}", e);
    }
    tracing::debug!("Request executor stopped");
}
