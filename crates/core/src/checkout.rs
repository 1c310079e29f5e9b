//! Order submission state machine.
//!
//! ```text
//!          begin            complete(redirect)
//! Idle ──────────▶ Pending ───────────────────▶ Redirected
//!   ▲                │  │  complete(no redirect)
//!   │                │  └─────────────────────▶ Accepted
//!   │                │ fail
//!   │                ▼
//!   └──── begin ── Failed
//! ```
//!
//! Only one submission may be in flight per browsing session. `begin` from
//! `Pending` is refused unless the pending submission is older than
//! [`PENDING_TIMEOUT_SECS`], which covers requests that were dropped before
//! they could record an outcome.

use serde::{Deserialize, Serialize};

/// A pending submission older than this is treated as abandoned.
pub const PENDING_TIMEOUT_SECS: u64 = 60;

/// Errors from an invalid state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// A submission is already in flight.
    #[error("an order submission is already in progress")]
    AlreadyPending,
    /// `fail`/`complete` was called without a submission in flight.
    #[error("no order submission is in progress")]
    NotPending,
}

/// Where the current browsing session is in the submission flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending {
        /// Unix seconds when the submission started.
        started_at: u64,
    },
    /// The order collaborator failed; the form may be submitted again.
    Failed,
    /// Order created and the customer was sent to the hosted checkout.
    Redirected { session_id: String },
    /// Order created but no payment redirect was configured.
    Accepted { session_id: String },
}

impl SubmissionState {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Checkout session id of a finished submission, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Redirected { session_id } | Self::Accepted { session_id } => Some(session_id),
            _ => None,
        }
    }

    /// Start a submission at `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::AlreadyPending`] if another submission
    /// started less than [`PENDING_TIMEOUT_SECS`] ago.
    pub fn begin(&mut self, now: u64) -> Result<(), SubmissionError> {
        if matches!(
            *self,
            Self::Pending { started_at } if now.saturating_sub(started_at) < PENDING_TIMEOUT_SECS
        ) {
            return Err(SubmissionError::AlreadyPending);
        }

        *self = Self::Pending { started_at: now };
        Ok(())
    }

    /// Record that the order collaborator failed.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::NotPending`] unless a submission is in flight.
    pub fn fail(&mut self) -> Result<(), SubmissionError> {
        if !self.is_pending() {
            return Err(SubmissionError::NotPending);
        }

        *self = Self::Failed;
        Ok(())
    }

    /// Record a created order. `redirected` says whether the customer was
    /// handed to the hosted checkout.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::NotPending`] unless a submission is in flight.
    pub fn complete(
        &mut self,
        session_id: String,
        redirected: bool,
    ) -> Result<(), SubmissionError> {
        if !self.is_pending() {
            return Err(SubmissionError::NotPending);
        }

        *self = if redirected {
            Self::Redirected { session_id }
        } else {
            Self::Accepted { session_id }
        };
        Ok(())
    }
}
