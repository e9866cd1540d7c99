//! Irreversible side effects performed by a workflow before it failed.
//!
//! No transaction spans the credential store, the payment processor and the
//! order store, so a workflow that fails midway may already have changed the
//! world. Multi-write workflows return their error wrapped in [`Incomplete`],
//! which lists those changes so the caller can reconcile them.

use std::error::Error;
use std::fmt;

use bookshelf_core::{OrderId, UserId};

use crate::error::{Classify, ErrorKind};

/// A side effect that a failed workflow did not undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A new user was written to the credential store.
    UserSaved(UserId),
    /// A user's password hash was replaced in the credential store.
    PasswordUpdated(UserId),
    /// A payment intent was opened with the processor.
    PaymentIntentOpened {
        /// Order the intent was opened for.
        order_id: OrderId,
        /// Processor-side intent ID.
        intent_id: String,
    },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserSaved(id) => write!(f, "user {id} saved"),
            Self::PasswordUpdated(id) => write!(f, "password of user {id} updated"),
            Self::PaymentIntentOpened {
                order_id,
                intent_id,
            } => write!(f, "payment intent {intent_id} opened for order {order_id}"),
        }
    }
}

/// A workflow failure together with the effects performed before it.
///
/// `error` is the failing step's error, unmodified. `effects` lists, in
/// order, every irreversible step that had already succeeded.
#[derive(Debug)]
pub struct Incomplete<E> {
    /// The error that aborted the workflow.
    pub error: E,
    /// Effects performed before the failure.
    pub effects: Vec<Effect>,
}

impl<E> Incomplete<E> {
    /// Wrap an error with the effects performed so far.
    #[must_use]
    pub const fn new(error: E, effects: Vec<Effect>) -> Self {
        Self { error, effects }
    }

    /// Whether the workflow failed before changing anything.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.effects.is_empty()
    }

    /// Discard the effect list and return the underlying error.
    #[must_use]
    pub fn into_error(self) -> E {
        self.error
    }
}

impl<E> From<E> for Incomplete<E> {
    fn from(error: E) -> Self {
        Self::new(error, Vec::new())
    }
}

impl<E: fmt::Display> fmt::Display for Incomplete<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<E: Error + 'static> Error for Incomplete<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error.source()
    }
}

impl<E: Classify> Classify for Incomplete<E> {
    fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}
