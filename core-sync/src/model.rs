//! # Sync Data Model
//!
//! Values produced and consumed within a single sync run. Nothing here is
//! persisted; every run computes them fresh from remote state.

use bridge_traits::CollectionItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::run::SyncRunId;

// ============================================================================
// Visited Set
// ============================================================================

/// Collection ids already expanded during one expansion call.
///
/// Only grows. Create a fresh one per expansion; sharing one between the
/// target and source branches would hide collections both sides reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedSet {
    ids: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, collection_id: &str) -> bool {
        self.ids.contains(collection_id)
    }

    /// Mark `collection_id` as expanded. Returns `false` if it already was.
    pub fn insert(&mut self, collection_id: impl Into<String>) -> bool {
        self.ids.insert(collection_id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Flat, de-duplicated leaf items of one or more root collections.
///
/// Items keep the order in which expansion first encountered them.
#[derive(Debug, Clone, Default)]
pub struct CollectionSnapshot {
    items: Vec<CollectionItem>,
    seen: HashSet<String>,
}

impl CollectionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` unless an item with the same id is already present.
    pub fn insert(&mut self, item: CollectionItem) -> bool {
        if !self.seen.insert(item.id.clone()) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn items(&self) -> &[CollectionItem] {
        &self.items
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.seen.contains(item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }

    pub fn into_items(self) -> Vec<CollectionItem> {
        self.items
    }
}

impl FromIterator<CollectionItem> for CollectionSnapshot {
    fn from_iter<T: IntoIterator<Item = CollectionItem>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        for item in iter {
            snapshot.insert(item);
        }
        snapshot
    }
}

// ============================================================================
// Diff
// ============================================================================

/// What must happen to an item for the target to match the sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffDirection {
    /// Present in the sources, missing from the target
    Add,
    /// Present in the target, missing from every source
    Remove,
}

impl DiffDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffDirection::Add => "add",
            DiffDirection::Remove => "remove",
        }
    }
}

impl fmt::Display for DiffDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub item: CollectionItem,
    pub direction: DiffDirection,
}

impl DiffEntry {
    pub fn new(item: CollectionItem, direction: DiffDirection) -> Self {
        Self { item, direction }
    }

    pub fn add(item: CollectionItem) -> Self {
        Self::new(item, DiffDirection::Add)
    }

    pub fn remove(item: CollectionItem) -> Self {
        Self::new(item, DiffDirection::Remove)
    }
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.direction, self.item.id)
    }
}

/// Ordered mutations that reconcile a target with its sources.
///
/// Additions come first, in source order, followed by removals in target order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub entries: Vec<DiffEntry>,
}

impl Diff {
    pub fn new(entries: Vec<DiffEntry>) -> Self {
        Self { entries }
    }

    pub fn additions(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.direction == DiffDirection::Add)
    }

    pub fn removals(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.direction == DiffDirection::Remove)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Diff {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of a successful sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: SyncRunId,
    pub target_id: String,
    /// Every mutation the run decided on
    pub diff: Diff,
    /// Mutations the remote acknowledged
    pub applied: Vec<DiffEntry>,
    /// Mutations answered with a redirect; nothing was applied for these
    pub skipped: Vec<DiffEntry>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// True when the target already matched the sources
    pub fn is_noop(&self) -> bool {
        self.diff.is_empty()
    }

    /// True when every mutation was acknowledged
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visited_set_only_grows() {
        let mut visited = VisitedSet::new();
        assert!(visited.is_empty());

        assert!(visited.insert("1"));
        assert!(!visited.insert("1"));
        assert!(visited.insert("2"));

        assert!(visited.contains("1"));
        assert!(!visited.contains("3"));
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn test_snapshot_dedupes_by_id() {
        let snapshot: CollectionSnapshot = vec![
            CollectionItem::leaf("1", 0),
            CollectionItem::leaf("2", 1),
            CollectionItem::leaf("1", 5),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.ids().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(snapshot.items()[0].sort_order, 0);
        assert!(snapshot.contains("2"));
    }

    #[test]
    fn test_diff_partitions() {
        let diff = Diff::new(vec![
            DiffEntry::add(CollectionItem::leaf("3", 0)),
            DiffEntry::remove(CollectionItem::leaf("1", 0)),
        ]);

        assert_eq!(diff.len(), 2);
        assert_eq!(diff.additions().count(), 1);
        assert_eq!(diff.removals().count(), 1);
        assert_eq!(diff.entries[1].to_string(), "remove(1)");
    }
}
