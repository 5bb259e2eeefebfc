//! # Correlation Table
//!
//! Tracks outbound calls that are waiting for a response, keyed by request
//! id. Every entry leaves the table settled: by a matching response, by the
//! poison drain, or by being displaced through an id collision.

use std::collections::HashMap;

use futures::channel::oneshot;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::warn;

use crate::error::{EngineError, RpcError};
use crate::types::RequestId;

/// Outcome delivered to a waiting call
pub type CallOutcome = Result<Value, EngineError>;

/// Completion handle for one pending call
pub type Completion = oneshot::Sender<CallOutcome>;

/// Receiving half handed back to the caller
pub type CompletionReceiver = oneshot::Receiver<CallOutcome>;

/// Create a linked completion handle and receiver
pub fn completion() -> (Completion, CompletionReceiver) {
    oneshot::channel()
}

#[derive(Debug, Default)]
pub struct PendingCalls {
    entries: Mutex<HashMap<RequestId, Completion>>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pending entry.
    ///
    /// An id that is already pending is a generator bug: the newer entry
    /// wins and the displaced one is rejected with an internal error.
    pub fn register(&self, id: RequestId, completion: Completion) {
        let displaced = self.entries.lock().insert(id.clone(), completion);

        if let Some(displaced) = displaced {
            warn!(id = %id, "Duplicate request id registered; rejecting the older call");
            let _ = displaced.send(Err(RpcError::internal_error(Some(format!(
                "duplicate request id {}",
                id
            )))
            .into()));
        }
    }

    /// Remove and settle the entry for `id`.
    ///
    /// Returns `false` when nothing was pending under that id; this is not
    /// an error (stale or duplicate response).
    pub fn complete(&self, id: &RequestId, outcome: CallOutcome) -> bool {
        let entry = self.entries.lock().remove(id);

        match entry {
            Some(completion) => {
                // The caller may have stopped waiting; that is fine.
                let _ = completion.send(outcome);
                true
            }
            None => false,
        }
    }

    /// Drop an entry without settling it.
    pub(crate) fn remove(&self, id: &RequestId) -> bool {
        self.entries.lock().remove(id).is_some()
    }

    /// Empty the table, rejecting every entry with `error`.
    ///
    /// Returns the number of calls that were drained.
    pub fn drain_all(&self, error: &EngineError) -> usize {
        let drained: Vec<Completion> = {
            let mut entries = self.entries.lock();
            entries.drain().map(|(_, completion)| completion).collect()
        };

        let count = drained.len();
        for completion in drained {
            let _ = completion.send(Err(error.clone()));
        }
        count
    }

    /// Insert a pending entry and return a guard that removes it again when
    /// dropped, unless the guard was disarmed after the call settled.
    pub fn register_guarded(&self, id: RequestId, completion: Completion) -> PendingGuard<'_> {
        self.register(id.clone(), completion);
        PendingGuard {
            table: self,
            id: Some(id),
        }
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Removes an abandoned entry when the owning call is dropped or fails.
#[must_use = "dropping the guard removes the pending entry"]
#[derive(Debug)]
pub struct PendingGuard<'a> {
    table: &'a PendingCalls,
    id: Option<RequestId>,
}

impl PendingGuard<'_> {
    /// The call settled; its entry is already gone.
    pub fn disarm(mut self) {
        self.id = None;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.table.remove(&id);
        }
    }
}
