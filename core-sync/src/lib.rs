//! # Collection Sync Engine
//!
//! Makes a target collection's membership match the union of one or more
//! source collections, expanding nested collections along the way.
//!
//! ## Components
//!
//! - **Data model** (`model`): visited set, snapshots, diffs and the sync report
//! - **Collection Expander** (`expander`): breadth-first, batched, de-duplicated
//!   expansion of collection ids into leaf items
//! - **Differ** (`differ`): pure set difference into add/remove mutations
//! - **Run State Machine** (`run`): validated phase transitions per sync run
//! - **Sync Orchestrator** (`orchestrator`): fetch, diff and apply with
//!   concurrent fan-out and first-failure semantics
//!
//! ## Data flow
//!
//! ```text
//! RemoteCollectionClient → CollectionExpander → diff → SyncOrchestrator → RemoteCollectionClient
//!        (fetch)                                                           (add/remove child)
//! ```

pub mod differ;
pub mod error;
pub mod expander;
pub mod model;
pub mod orchestrator;
pub mod run;

pub use differ::diff;
pub use error::{ApplyFailure, RemoteOperation, Result, SyncError};
pub use expander::CollectionExpander;
pub use model::{CollectionSnapshot, Diff, DiffDirection, DiffEntry, SyncReport, VisitedSet};
pub use orchestrator::SyncOrchestrator;
pub use run::{SyncPhase, SyncRun, SyncRunId};
