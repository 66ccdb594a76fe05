//! # Sync Run State Machine
//!
//! Tracks one `sync` invocation through its phases with validated transitions.
//!
//! ## State Machine
//!
//! ```text
//! Idle → Fetching → Diffing → Applying → Succeeded
//!           ↓          ↓          ↓
//!           └──────────┴──────────┴────→ Failed
//! ```
//!
//! There is no edge back to `Fetching`. A failed run is over; the caller
//! starts a new one, which re-reads remote state from scratch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::{Result, SyncError};

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncRunId(Uuid);

impl SyncRunId {
    /// Create a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SyncRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SyncRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SyncRunId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// ============================================================================
// Phase
// ============================================================================

/// Phase of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    /// Created, nothing requested yet
    Idle,
    /// Expanding the target and the sources
    Fetching,
    /// Comparing the two snapshots
    Diffing,
    /// Sending membership mutations
    Applying,
    Succeeded,
    Failed,
}

impl SyncPhase {
    /// Check if this phase ends the run
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncPhase::Succeeded | SyncPhase::Failed)
    }

    /// Whether a run may move from `self` to `next`
    pub fn can_transition_to(&self, next: SyncPhase) -> bool {
        matches!(
            (self, next),
            (SyncPhase::Idle, SyncPhase::Fetching)
                | (SyncPhase::Fetching, SyncPhase::Diffing)
                | (SyncPhase::Fetching, SyncPhase::Failed)
                | (SyncPhase::Diffing, SyncPhase::Applying)
                | (SyncPhase::Diffing, SyncPhase::Failed)
                | (SyncPhase::Applying, SyncPhase::Succeeded)
                | (SyncPhase::Applying, SyncPhase::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Fetching => "fetching",
            SyncPhase::Diffing => "diffing",
            SyncPhase::Applying => "applying",
            SyncPhase::Succeeded => "succeeded",
            SyncPhase::Failed => "failed",
        }
    }
}

impl FromStr for SyncPhase {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(SyncPhase::Idle),
            "fetching" => Ok(SyncPhase::Fetching),
            "diffing" => Ok(SyncPhase::Diffing),
            "applying" => Ok(SyncPhase::Applying),
            "succeeded" => Ok(SyncPhase::Succeeded),
            "failed" => Ok(SyncPhase::Failed),
            _ => Err(SyncError::InvalidPhase(s.to_string())),
        }
    }
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Run
// ============================================================================

/// A single sync invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRun {
    pub id: SyncRunId,
    pub target_id: String,
    pub source_ids: Vec<String>,
    pub phase: SyncPhase,
    pub created_at: DateTime<Utc>,
    /// When the run left `Idle`
    pub started_at: Option<DateTime<Utc>>,
    /// When the run reached a terminal phase
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncRun {
    /// Create a run in the `Idle` phase
    pub fn new(target_id: impl Into<String>, source_ids: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: SyncRunId::new(),
            target_id: target_id.into(),
            source_ids,
            phase: SyncPhase::Idle,
            created_at: now,
            started_at: None,
            finished_at: None,
        }
    }

    /// Move to `next`, returning the phase that was left.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidStateTransition`] if the edge does not exist.
    pub fn transition(&mut self, next: SyncPhase, now: DateTime<Utc>) -> Result<SyncPhase> {
        if !self.phase.can_transition_to(next) {
            return Err(SyncError::InvalidStateTransition {
                from: self.phase.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let previous = self.phase;
        self.phase = next;

        if previous == SyncPhase::Idle {
            self.started_at = Some(now);
        }
        if next.is_terminal() {
            self.finished_at = Some(now);
        }

        Ok(previous)
    }
}
