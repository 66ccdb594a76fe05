//! # Sync Orchestrator
//!
//! Makes a target collection hold exactly the leaf items of its sources.
//!
//! ## Workflow
//!
//! 1. Expand the target and the sources concurrently, each with its own
//!    [`VisitedSet`]
//! 2. Diff the two snapshots
//! 3. Acquire the session (only when there is something to apply)
//! 4. Send every mutation concurrently and wait for all of them
//!
//! Mutations confirmed before a failure stay applied. Re-running is safe: the
//! next run diffs against the updated target and only sends what is left.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::SyncOrchestrator;
//! use std::sync::Arc;
//!
//! let orchestrator = SyncOrchestrator::new(client, session).with_event_bus(event_bus);
//! let report = orchestrator
//!     .sync("100", &["200".to_string(), "300".to_string()])
//!     .await?;
//! println!("applied {} mutations", report.applied.len());
//! ```

use bridge_traits::{
    Clock, MutationAck, RemoteCollectionClient, SessionProvider, SystemClock, STATUS_OK,
};
use core_runtime::events::{CoreEvent, EventBus, SessionEvent, SyncEvent};
use futures::future::{join_all, try_join};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::differ::diff;
use crate::error::{ApplyFailure, RemoteOperation, Result, SyncError};
use crate::expander::CollectionExpander;
use crate::model::{CollectionSnapshot, Diff, DiffDirection, DiffEntry, SyncReport, VisitedSet};
use crate::run::{SyncPhase, SyncRun};

/// How the remote handled a single mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutationOutcome {
    Applied,
    /// Redirected; nothing was applied
    Skipped,
}

#[derive(Debug, Default)]
struct ApplyOutcome {
    applied: Vec<DiffEntry>,
    skipped: Vec<DiffEntry>,
}

pub struct SyncOrchestrator {
    client: Arc<dyn RemoteCollectionClient>,
    session: Arc<dyn SessionProvider>,
    event_bus: Option<Arc<EventBus>>,
    clock: Arc<dyn Clock>,
}

impl SyncOrchestrator {
    pub fn new(client: Arc<dyn RemoteCollectionClient>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            client,
            session,
            event_bus: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Publish run progress on `event_bus`
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Stamp runs with `clock` instead of the system clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Reconcile `target_id` with the union of `source_ids`.
    ///
    /// Issues exactly one mutation per diff entry. When the target already
    /// matches, neither the session provider nor any mutation endpoint is
    /// contacted.
    ///
    /// # Errors
    ///
    /// - Any expansion failure of either branch ([`SyncError::RemoteProtocol`],
    ///   [`SyncError::Transport`], [`SyncError::MalformedResponse`])
    /// - [`SyncError::MutationsFailed`] carrying the first mutation failure (or
    ///   the session failure) with the dispatched and confirmed mutations
    #[instrument(skip_all, fields(target_id = %target_id, sources = source_ids.len()))]
    pub async fn sync(&self, target_id: &str, source_ids: &[String]) -> Result<SyncReport> {
        let mut run = SyncRun::new(target_id, source_ids.to_vec(), self.clock.now());
        let run_id = run.id.to_string();

        info!(run_id = %run_id, "Starting collection sync");
        self.emit(CoreEvent::Sync(SyncEvent::Started {
            run_id: run_id.clone(),
            target_id: target_id.to_string(),
            source_count: source_ids.len(),
        }));

        self.advance(&mut run, SyncPhase::Fetching)?;
        let fetched = self.fetch(target_id, source_ids).await;
        let (target, source) = match fetched {
            Ok(snapshots) => snapshots,
            Err(error) => return Err(self.fail(&mut run, error)),
        };

        self.advance(&mut run, SyncPhase::Diffing)?;
        let diff = diff(target.items(), source.items());
        let additions = diff.additions().count();
        let removals = diff.removals().count();
        info!(
            run_id = %run_id,
            target_items = target.len(),
            source_items = source.len(),
            additions,
            removals,
            "Diff computed"
        );
        self.emit(CoreEvent::Sync(SyncEvent::DiffComputed {
            run_id: run_id.clone(),
            additions,
            removals,
        }));

        self.advance(&mut run, SyncPhase::Applying)?;
        let applied = self.apply(&run, &diff).await;
        let outcome = match applied {
            Ok(outcome) => outcome,
            Err(failure) => {
                return Err(self.fail(&mut run, SyncError::MutationsFailed(Box::new(failure))))
            }
        };

        self.advance(&mut run, SyncPhase::Succeeded)?;
        let finished_at = run.finished_at.unwrap_or_else(|| self.clock.now());
        let report = SyncReport {
            run_id: run.id,
            target_id: run.target_id,
            diff,
            applied: outcome.applied,
            skipped: outcome.skipped,
            started_at: run.started_at.unwrap_or(run.created_at),
            finished_at,
        };

        info!(
            run_id = %run_id,
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "Collection sync completed"
        );
        self.emit(CoreEvent::Sync(SyncEvent::Completed {
            run_id,
            applied: report.applied.len(),
            skipped: report.skipped.len(),
            duration_ms: report.duration_ms().max(0) as u64,
        }));

        Ok(report)
    }

    /// Expand both sides concurrently; either failure aborts the join.
    async fn fetch(
        &self,
        target_id: &str,
        source_ids: &[String],
    ) -> Result<(CollectionSnapshot, CollectionSnapshot)> {
        let expander = CollectionExpander::new(Arc::clone(&self.client));
        let target_ids = [target_id.to_string()];
        let mut target_visited = VisitedSet::new();
        let mut source_visited = VisitedSet::new();

        try_join(
            expander.expand(&target_ids, &mut target_visited),
            expander.expand(source_ids, &mut source_visited),
        )
        .await
    }

    async fn apply(
        &self,
        run: &SyncRun,
        diff: &Diff,
    ) -> std::result::Result<ApplyOutcome, ApplyFailure> {
        if diff.is_empty() {
            debug!("Target already matches sources, nothing to apply");
            return Ok(ApplyOutcome::default());
        }

        let session_id = match self.session.current_session_id().await {
            Ok(session_id) => session_id,
            Err(error) => {
                warn!(error = %error, "Session provider failed");
                self.emit(CoreEvent::Session(SessionEvent::Unavailable {
                    run_id: run.id.to_string(),
                    message: error.to_string(),
                }));
                return Err(ApplyFailure {
                    error: SyncError::Session(error.to_string()),
                    dispatched: Vec::new(),
                    confirmed: Vec::new(),
                });
            }
        };

        let target_id = run.target_id.as_str();
        debug!(mutations = diff.len(), "Dispatching mutations");
        let results = join_all(
            diff.iter()
                .map(|entry| self.mutate(target_id, entry, &session_id)),
        )
        .await;

        let mut outcome = ApplyOutcome::default();
        let mut first_error = None;

        for (entry, result) in results {
            match result {
                Ok(MutationOutcome::Applied) => outcome.applied.push(entry.clone()),
                Ok(MutationOutcome::Skipped) => {
                    warn!(
                        item_id = %entry.item.id,
                        direction = %entry.direction,
                        "Mutation redirected, session may be expired"
                    );
                    self.emit(CoreEvent::Session(SessionEvent::MutationRedirected {
                        run_id: run.id.to_string(),
                        collection_id: run.target_id.clone(),
                        item_id: entry.item.id.clone(),
                    }));
                    outcome.skipped.push(entry.clone());
                }
                Err(error) => {
                    warn!(
                        item_id = %entry.item.id,
                        direction = %entry.direction,
                        error = %error,
                        "Mutation failed"
                    );
                    // Later failures are logged; the first in diff order is reported.
                    first_error.get_or_insert(error);
                }
            }
        }

        if let Some(error) = first_error {
            return Err(ApplyFailure {
                error,
                dispatched: diff.entries.clone(),
                confirmed: outcome.applied,
            });
        }

        Ok(outcome)
    }

    async fn mutate<'a>(
        &self,
        target_id: &str,
        entry: &'a DiffEntry,
        session_id: &str,
    ) -> (&'a DiffEntry, Result<MutationOutcome>) {
        let item_id = entry.item.id.as_str();
        let (operation, ack) = match entry.direction {
            DiffDirection::Add => (
                RemoteOperation::AddChild,
                self.client.add_child(target_id, item_id, session_id).await,
            ),
            DiffDirection::Remove => (
                RemoteOperation::RemoveChild,
                self.client.remove_child(target_id, item_id, session_id).await,
            ),
        };

        let result = ack
            .map_err(SyncError::from)
            .and_then(|ack| interpret_ack(ack, operation, item_id));
        (entry, result)
    }

    fn advance(&self, run: &mut SyncRun, next: SyncPhase) -> Result<()> {
        let previous = run.transition(next, self.clock.now())?;
        debug!(run_id = %run.id, from = %previous, to = %next, "Sync phase changed");
        self.emit(CoreEvent::Sync(SyncEvent::PhaseChanged {
            run_id: run.id.to_string(),
            from: previous.to_string(),
            to: next.to_string(),
        }));
        Ok(())
    }

    /// Move `run` to `Failed`, publish the failure and hand `error` back.
    fn fail(&self, run: &mut SyncRun, error: SyncError) -> SyncError {
        if let Err(transition_error) = self.advance(run, SyncPhase::Failed) {
            warn!(error = %transition_error, "Could not mark run as failed");
        }

        let (dispatched, confirmed) = error
            .apply_failure()
            .map(|failure| (failure.dispatched.len(), failure.confirmed.len()))
            .unwrap_or((0, 0));

        warn!(run_id = %run.id, error = %error, dispatched, confirmed, "Collection sync failed");
        self.emit(CoreEvent::Sync(SyncEvent::Failed {
            run_id: run.id.to_string(),
            message: error.to_string(),
            dispatched,
            confirmed,
        }));

        error
    }

    fn emit(&self, event: CoreEvent) {
        if let Some(event_bus) = &self.event_bus {
            event_bus.emit(event).ok();
        }
    }
}

impl std::fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("has_event_bus", &self.event_bus.is_some())
            .finish_non_exhaustive()
    }
}

fn interpret_ack(
    ack: MutationAck,
    operation: RemoteOperation,
    item_id: &str,
) -> Result<MutationOutcome> {
    match ack {
        MutationAck::Completed | MutationAck::Status(STATUS_OK) => Ok(MutationOutcome::Applied),
        MutationAck::Status(status) => Err(SyncError::RemoteProtocol {
            operation,
            id: item_id.to_string(),
            status,
        }),
        MutationAck::Redirected => Ok(MutationOutcome::Skipped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_ack() {
        assert_eq!(
            interpret_ack(MutationAck::Completed, RemoteOperation::AddChild, "1").unwrap(),
            MutationOutcome::Applied
        );
        assert_eq!(
            interpret_ack(MutationAck::Status(1), RemoteOperation::RemoveChild, "1").unwrap(),
            MutationOutcome::Applied
        );
        assert_eq!(
            interpret_ack(MutationAck::Redirected, RemoteOperation::AddChild, "1").unwrap(),
            MutationOutcome::Skipped
        );

        let error =
            interpret_ack(MutationAck::Status(0), RemoteOperation::RemoveChild, "7").unwrap_err();
        assert!(matches!(
            error,
            SyncError::RemoteProtocol {
                operation: RemoteOperation::RemoveChild,
                ref id,
                status: 0,
            } if id == "7"
        ));
    }
}
