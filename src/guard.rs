//! Per-user guard against overlapping model batches.
//!
//! Each (user, operation) pair moves `Idle -> InFlight -> Settled`, and may go
//! back to `InFlight` from `Settled`. A second `begin` while in flight is
//! rejected instead of queued. Settled pairs are forgotten at the next `begin`,
//! so the map only holds batches that are running or just finished.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Estimate,
    Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    InFlight,
    Settled,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("a {operation:?} request is already in progress")]
pub struct AlreadyInFlight {
    pub operation: Operation,
}

#[derive(Debug, Default)]
pub struct InFlightRegistry {
    states: Mutex<HashMap<(Uuid, Operation), BatchState>>,
}

impl InFlightRegistry {
    fn lock(&self) -> MutexGuard<'_, HashMap<(Uuid, Operation), BatchState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self, user_id: Uuid, operation: Operation) -> BatchState {
        self.lock()
            .get(&(user_id, operation))
            .copied()
            .unwrap_or(BatchState::Idle)
    }

    pub fn begin(
        self: &Arc<Self>,
        user_id: Uuid,
        operation: Operation,
    ) -> Result<InFlightTicket, AlreadyInFlight> {
        let mut states = self.lock();
        // Settled entries read the same as missing ones once a new batch starts.
        states.retain(|_, s| *s == BatchState::InFlight);
        let state = states.entry((user_id, operation)).or_insert(BatchState::Idle);
        if *state == BatchState::InFlight {
            return Err(AlreadyInFlight { operation });
        }
        *state = BatchState::InFlight;
        debug!(%user_id, ?operation, "batch in flight");
        Ok(InFlightTicket {
            registry: Arc::clone(self),
            user_id,
            operation,
        })
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.lock().len()
    }

    fn settle(&self, user_id: Uuid, operation: Operation) {
        self.lock().insert((user_id, operation), BatchState::Settled);
        debug!(%user_id, ?operation, "batch settled");
    }
}

/// Held for the duration of a batch. Settles on drop, so early returns and
/// panics release the slot too.
#[derive(Debug)]
pub struct InFlightTicket {
    registry: Arc<InFlightRegistry>,
    user_id: Uuid,
    operation: Operation,
}

impl InFlightTicket {
    pub fn settle(self) {}
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.registry.settle(self.user_id, self.operation);
    }
}
