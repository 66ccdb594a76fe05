use bridge_traits::BridgeError;
use std::fmt;
use thiserror::Error;

use crate::model::DiffEntry;

/// Remote call a protocol failure was reported for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOperation {
    /// Batch-level status of a collection-details fetch
    FetchBatch,
    /// Per-collection status inside a collection-details batch
    FetchCollection,
    AddChild,
    RemoveChild,
}

impl RemoteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteOperation::FetchBatch => "fetch_batch",
            RemoteOperation::FetchCollection => "fetch_collection",
            RemoteOperation::AddChild => "add_child",
            RemoteOperation::RemoveChild => "remove_child",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    /// The remote answered but reported a non-success status.
    #[error("Remote reported status {status} for {operation} on {id}")]
    RemoteProtocol {
        operation: RemoteOperation,
        id: String,
        status: i64,
    },

    #[error("Transport error (status {}): {body}", display_status(.status))]
    Transport { status: Option<u16>, body: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Session unavailable: {0}")]
    Session(String),

    #[error("Bridge error: {0}")]
    Bridge(String),

    #[error("Apply phase failed: {0}")]
    MutationsFailed(Box<ApplyFailure>),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid sync phase: {0}")]
    InvalidPhase(String),
}

impl SyncError {
    /// The error that actually stopped the run.
    ///
    /// Unwraps [`SyncError::MutationsFailed`] to the first mutation failure;
    /// every other variant is its own root cause.
    pub fn root_cause(&self) -> &SyncError {
        match self {
            SyncError::MutationsFailed(failure) => failure.error.root_cause(),
            other => other,
        }
    }

    /// Apply-phase bookkeeping, when the run failed while mutating.
    pub fn apply_failure(&self) -> Option<&ApplyFailure> {
        match self {
            SyncError::MutationsFailed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<BridgeError> for SyncError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Transport { status, body } => SyncError::Transport { status, body },
            BridgeError::MalformedResponse { endpoint, reason } => {
                SyncError::MalformedResponse { endpoint, reason }
            }
            BridgeError::NotAvailable(message) | BridgeError::OperationFailed(message) => {
                SyncError::Bridge(message)
            }
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

/// Failed outcome of the apply phase.
///
/// Mutations in `confirmed` reached the remote and are not rolled back.
#[derive(Debug)]
pub struct ApplyFailure {
    /// First failure in diff order
    pub error: SyncError,
    /// Every mutation sent during the apply phase
    pub dispatched: Vec<DiffEntry>,
    /// Mutations the remote acknowledged
    pub confirmed: Vec<DiffEntry>,
}

impl fmt::Display for ApplyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} of {} dispatched mutations confirmed)",
            self.error,
            self.confirmed.len(),
            self.dispatched.len()
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
