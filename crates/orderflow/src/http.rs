//! Request lifecycle tracking.
//!
//! A [`RequestSlot`] holds the observable state of at most one in-flight
//! request: `Idle | Pending | Success | Failed`. Issuing a new request
//! supersedes whatever was pending; completions of superseded requests are
//! discarded by token comparison instead of being applied out of order. The
//! orchestrator serializes its own submissions with a pipeline guard; this
//! type only guarantees that a late response never overwrites newer state.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Observable state of a tracked request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState<T> {
    /// No request has been issued (or the slot was cleared).
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The most recent request succeeded.
    Success(T),
    /// The most recent request failed; the message is user-displayable.
    Failed(String),
}

impl<T> RequestState<T> {
    /// True while a request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Token identifying one issued request. Completions must present the token
/// they were issued; stale tokens are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Tracks the lifecycle of a single logical request slot.
#[derive(Debug, Default)]
pub struct RequestSlot<T> {
    inner: Mutex<SlotInner<T>>,
}

#[derive(Debug)]
struct SlotInner<T> {
    generation: u64,
    state: RequestState<T>,
}

impl<T> Default for SlotInner<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            state: RequestState::Idle,
        }
    }
}

impl<T: Clone> RequestSlot<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SlotInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a new request in flight, superseding any pending one.
    pub fn begin(&self) -> RequestToken {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = RequestState::Pending;
        RequestToken(inner.generation)
    }

    /// Record a success for `token`. Returns false (and changes nothing)
    /// when the token has been superseded or cleared.
    pub fn succeed(&self, token: RequestToken, value: T) -> bool {
        let mut inner = self.lock();
        if inner.generation != token.0 {
            tracing::debug!(token = token.0, current = inner.generation, "discarding stale response");
            return false;
        }
        inner.state = RequestState::Success(value);
        true
    }

    /// Record a failure for `token`. Returns false when the token is stale.
    pub fn fail(&self, token: RequestToken, message: impl Into<String>) -> bool {
        let mut inner = self.lock();
        if inner.generation != token.0 {
            tracing::debug!(token = token.0, current = inner.generation, "discarding stale failure");
            return false;
        }
        inner.state = RequestState::Failed(message.into());
        true
    }

    /// Reset to `Idle`, invalidating any request still in flight.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = RequestState::Idle;
    }

    /// Current observable state.
    #[must_use]
    pub fn state(&self) -> RequestState<T> {
        self.lock().state.clone()
    }

    /// True while a request is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock().state.is_pending()
    }
}
