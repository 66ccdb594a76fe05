//! Remote Collection Abstractions
//!
//! Contract for the content-sharing service that owns collections, plus the
//! item model shared by every crate that reads or mutates collection membership.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::error::Result;

/// Status value the remote service uses to signal success, both for batches
/// and for individual collections or mutations.
pub const STATUS_OK: i64 = 1;

/// Numeric file type the remote service assigns to collections.
pub const FILE_TYPE_COLLECTION: i64 = 2;

/// Kind of a collection child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A regular item with no children relevant to synchronization
    Leaf,
    /// A nested collection that must be expanded
    Collection,
}

impl ItemKind {
    /// Map the remote file type onto an item kind.
    ///
    /// Only the collection type is special; every other type is a leaf.
    pub fn from_file_type(file_type: i64) -> Self {
        if file_type == FILE_TYPE_COLLECTION {
            ItemKind::Collection
        } else {
            ItemKind::Leaf
        }
    }
}

/// A child entry of a remote collection.
///
/// Identity is the `id` alone: two items compare equal (and hash identically)
/// whenever their ids match, whatever their sort order or kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: String,
    pub sort_order: i64,
    pub kind: ItemKind,
}

impl CollectionItem {
    pub fn new(id: impl Into<String>, sort_order: i64, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            sort_order,
            kind,
        }
    }

    /// Shorthand for a leaf item
    pub fn leaf(id: impl Into<String>, sort_order: i64) -> Self {
        Self::new(id, sort_order, ItemKind::Leaf)
    }

    /// Shorthand for a nested collection reference
    pub fn collection(id: impl Into<String>, sort_order: i64) -> Self {
        Self::new(id, sort_order, ItemKind::Collection)
    }

    pub fn is_collection(&self) -> bool {
        self.kind == ItemKind::Collection
    }
}

impl PartialEq for CollectionItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CollectionItem {}

impl Hash for CollectionItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Details of one collection within a batch response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDetails {
    pub id: String,
    /// Per-collection status; anything but [`STATUS_OK`] means unreadable
    pub status: i64,
    pub children: Vec<CollectionItem>,
}

impl CollectionDetails {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Response to a batched collection-details fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDetailsBatch {
    /// Batch-level status; anything but [`STATUS_OK`] means the call failed
    pub status: i64,
    pub collections: Vec<CollectionDetails>,
}

impl CollectionDetailsBatch {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Transport-level acknowledgement of a membership mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAck {
    /// The request succeeded; the endpoint returns no structured flag
    Completed,
    /// The endpoint returned a structured `success` flag
    Status(i64),
    /// The service answered with a redirect (usually an expired or missing
    /// session); nothing was applied and nothing is left to inspect
    Redirected,
}

/// Remote collection service trait
///
/// Implementations perform exactly one remote call per method and never retry.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::collection::RemoteCollectionClient;
///
/// async fn count_children(client: &dyn RemoteCollectionClient, id: &str) -> Result<usize> {
///     let batch = client.fetch_collection_details(&[id.to_string()]).await?;
///     Ok(batch.collections.iter().map(|c| c.children.len()).sum())
/// }
/// ```
#[async_trait]
pub trait RemoteCollectionClient: Send + Sync {
    /// Fetch the direct children of every collection in `collection_ids` in a
    /// single round trip.
    async fn fetch_collection_details(
        &self,
        collection_ids: &[String],
    ) -> Result<CollectionDetailsBatch>;

    /// Insert `item_id` into `collection_id`.
    async fn add_child(
        &self,
        collection_id: &str,
        item_id: &str,
        session_id: &str,
    ) -> Result<MutationAck>;

    /// Delete `item_id` from `collection_id`.
    async fn remove_child(
        &self,
        collection_id: &str,
        item_id: &str,
        session_id: &str,
    ) -> Result<MutationAck>;
}
