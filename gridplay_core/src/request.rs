//! "Latest wins" bookkeeping for fetches that may resolve out of order.
//!
//! Each fetch takes a token from `begin`; a result is applied only if its
//! token is still the newest one issued for that slot.

use std::fmt::Display;

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Loading(RequestToken),
    Ready(RequestToken, T),
    Failed(RequestToken, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

struct Slot<T> {
    issued: u64,
    state: RequestState<T>,
}

/// Lifecycle of the newest request for one selection (e.g. race + driver).
pub struct RequestSlot<T> {
    inner: Mutex<Slot<T>>,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Slot {
                issued: 0,
                state: RequestState::Idle,
            }),
        }
    }
}

impl<T: Clone> RequestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request. Any request still in flight becomes stale.
    pub fn begin(&self) -> RequestToken {
        let mut slot = self.inner.lock();
        slot.issued += 1;
        let token = RequestToken(slot.issued);
        slot.state = RequestState::Loading(token);
        token
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.inner.lock().issued == token.0
    }

    /// Record the outcome of the request that owns `token`.
    pub fn complete<E: Display>(&self, token: RequestToken, result: Result<T, E>) -> Completion {
        let mut slot = self.inner.lock();
        if slot.issued != token.0 {
            tracing::debug!(
                token = token.0,
                latest = slot.issued,
                "discarding stale response"
            );
            return Completion::Stale;
        }
        slot.state = match result {
            Ok(v) => RequestState::Ready(token, v),
            Err(e) => RequestState::Failed(token, e.to_string()),
        };
        Completion::Applied
    }

    pub fn state(&self) -> RequestState<T> {
        self.inner.lock().state.clone()
    }
}
