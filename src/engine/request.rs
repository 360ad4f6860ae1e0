//! Requests handled by the executor worker.

use crossbeam::channel::Sender;

use crate::error::Result;
use crate::model::{GetResult, Slice};

use super::batch::Batch;

/// One unit of work, carrying the channel its result is sent on
pub enum Request {
    Put {
        batch: Batch,
        response: Sender<Result<()>>,
    },
    Get {
        key: Slice,
        response: Sender<Result<GetResult>>,
    },
    MultiGet {
        keys: Vec<Slice>,
        response: Sender<Result<Vec<GetResult>>>,
    },
    /// Flush and close the workspace, then stop the worker
    Close { response: Sender<Result<()>> },
}

impl Request {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Put { .. } => "put",
            Request::Get { .. } => "get",
            Request::MultiGet { .. } => "multi_get",
            Request::Close { .. } => "close",
        }
    }
}
