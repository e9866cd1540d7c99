//! Per-request context threaded through every workflow and collaborator call.
//!
//! The context carries the acting identity explicitly (never read from ambient
//! state), a request ID for log correlation, and an optional deadline. The
//! engines never enforce the deadline themselves; they pass the context
//! unchanged to collaborators, which may bound their own I/O with
//! [`Context::bound`].

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use uuid::Uuid;

use bookshelf_core::{Role, UserId};

/// The authenticated identity performing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// ID of the acting user.
    pub user_id: UserId,
    /// Role of the acting user.
    pub role: Role,
}

impl Actor {
    /// Create a new actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the actor is an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// A collaborator call outlived the request deadline.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("request deadline exceeded")]
pub struct DeadlineExceeded;

/// Request-scoped context.
#[derive(Debug, Clone)]
pub struct Context {
    request_id: Uuid,
    actor: Option<Actor>,
    deadline: Option<Instant>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create an anonymous context with a fresh request ID and no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            actor: None,
            deadline: None,
        }
    }

    /// Attach the acting identity.
    #[must_use]
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Request ID for log correlation.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// The acting identity, if the request is authenticated.
    #[must_use]
    pub const fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    /// The deadline, if one was set.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` means unbounded.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the deadline has already passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Run a future, bounded by the deadline if there is one.
    ///
    /// # Errors
    ///
    /// Returns `DeadlineExceeded` if the deadline passes before the future
    /// completes.
    pub async fn bound<F, T>(&self, fut: F) -> Result<T, DeadlineExceeded>
    where
        F: Future<Output = T>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| DeadlineExceeded),
            None => Ok(fut.await),
        }
    }
}
