//! The request-handling business logic: event lifecycle, registration,
//! feedback, and account sign-up. Every operation checks its capability
//! predicate first, then reads/writes the store, and only then dispatches
//! best-effort notifications.

mod accounts;
mod events;
mod feedback;
mod registration;

pub use events::EventDetail;
pub use registration::{AddParticipantOutcome, CancelOutcome, RegisterOutcome};

use std::sync::Arc;

use thiserror::Error;

use crate::notify::Dispatcher;
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Malformed or out-of-range input. No side effect.
    #[error("{0}")]
    Validation(String),

    /// A capability predicate failed. No side effect.
    #[error("{0}")]
    Forbidden(String),

    /// The referenced entity is absent or not visible to the caller.
    #[error("{0}")]
    NotFound(String),

    /// The event's venue is at capacity.
    #[error("Venue is full. Registration closed.")]
    CapacityFull,

    /// Hard conflict: feedback already exists for this (event, user) pair.
    #[error("You already submitted feedback.")]
    DuplicateFeedback,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct WorkflowService {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) dispatcher: Dispatcher,
}

impl WorkflowService {
    pub fn new(store: Arc<dyn Store>, dispatcher: Dispatcher) -> Self {
        Self { store, dispatcher }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}
