//! # Collection Expander
//!
//! Resolves collection ids into the flat set of leaf items they contain,
//! descending through nested collections.
//!
//! ## Algorithm
//!
//! Expansion is a breadth-first worklist. Each level is fetched with one
//! batched remote call, so the number of round trips is bounded by the nesting
//! depth rather than the number of collections:
//!
//! ```text
//! pending = roots - visited
//! while pending is not empty:
//!     visited += pending
//!     batch = fetch(pending)            // one call per level
//!     leaves  -> snapshot
//!     nested  -> pending = nested - visited
//! ```
//!
//! The caller owns the [`VisitedSet`]. Passing the same set twice with the same
//! ids yields an empty snapshot the second time.

use bridge_traits::{CollectionDetailsBatch, RemoteCollectionClient};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{RemoteOperation, Result, SyncError};
use crate::model::{CollectionSnapshot, VisitedSet};

pub struct CollectionExpander {
    client: Arc<dyn RemoteCollectionClient>,
}

impl CollectionExpander {
    pub fn new(client: Arc<dyn RemoteCollectionClient>) -> Self {
        Self { client }
    }

    /// Expand `collection_ids` into their leaf items.
    ///
    /// Every collection id is fetched at most once per `visited` set, and the
    /// returned snapshot holds each leaf id once.
    ///
    /// # Errors
    ///
    /// - [`SyncError::RemoteProtocol`] when the batch, or any collection in it,
    ///   reports a non-success status
    /// - Transport and malformed-response failures from the client
    #[instrument(skip(self, visited), fields(roots = collection_ids.len()))]
    pub async fn expand(
        &self,
        collection_ids: &[String],
        visited: &mut VisitedSet,
    ) -> Result<CollectionSnapshot> {
        let mut snapshot = CollectionSnapshot::new();
        let mut pending = unvisited(collection_ids.iter().cloned(), visited);
        let mut depth = 0usize;

        while !pending.is_empty() {
            for id in &pending {
                visited.insert(id.clone());
            }

            debug!(depth, batch = pending.len(), "Fetching collection batch");
            let batch = self.client.fetch_collection_details(&pending).await?;
            let nested = partition(&pending, batch, &mut snapshot)?;

            pending = unvisited(nested.into_iter(), visited);
            depth += 1;
        }

        debug!(
            depth,
            leaves = snapshot.len(),
            visited = visited.len(),
            "Expansion finished"
        );
        Ok(snapshot)
    }
}

/// Ids not yet visited, de-duplicated, in first-seen order.
fn unvisited(ids: impl Iterator<Item = String>, visited: &VisitedSet) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| !visited.contains(id) && seen.insert(id.clone()))
        .collect()
}

/// Move leaves into `snapshot` and return the nested collection ids.
fn partition(
    requested: &[String],
    batch: CollectionDetailsBatch,
    snapshot: &mut CollectionSnapshot,
) -> Result<Vec<String>> {
    if !batch.is_ok() {
        return Err(SyncError::RemoteProtocol {
            operation: RemoteOperation::FetchBatch,
            id: requested.join(","),
            status: batch.status,
        });
    }

    let mut nested = Vec::new();
    for collection in batch.collections {
        if !collection.is_ok() {
            return Err(SyncError::RemoteProtocol {
                operation: RemoteOperation::FetchCollection,
                id: collection.id,
                status: collection.status,
            });
        }

        for child in collection.children {
            if child.is_collection() {
                nested.push(child.id);
            } else {
                snapshot.insert(child);
            }
        }
    }

    Ok(nested)
}

impl std::fmt::Debug for CollectionExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionExpander").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{BridgeError, CollectionDetails, CollectionItem, MutationAck};
    use mockall::{mock, Sequence};

    mock! {
        Client {}

        #[async_trait]
        impl RemoteCollectionClient for Client {
            async fn fetch_collection_details(
                &self,
                collection_ids: &[String],
            ) -> BridgeResult<CollectionDetailsBatch>;

            async fn add_child(
                &self,
                collection_id: &str,
                item_id: &str,
                session_id: &str,
            ) -> BridgeResult<MutationAck>;

            async fn remove_child(
                &self,
                collection_id: &str,
                item_id: &str,
                session_id: &str,
            ) -> BridgeResult<MutationAck>;
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn requested_eq(requested: &[String], expected: &[&str]) -> bool {
        requested.iter().map(String::as_str).eq(expected.iter().copied())
    }

    fn collection(id: &str, children: Vec<CollectionItem>) -> CollectionDetails {
        CollectionDetails {
            id: id.to_string(),
            status: 1,
            children,
        }
    }

    fn batch(collections: Vec<CollectionDetails>) -> CollectionDetailsBatch {
        CollectionDetailsBatch {
            status: 1,
            collections,
        }
    }

    #[tokio::test]
    async fn test_expand_nested_collection_one_call_per_level() {
        let mut client = MockClient::new();
        let mut seq = Sequence::new();

        client
            .expect_fetch_collection_details()
            .withf(|requested| requested_eq(requested, &["C1"]))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(batch(vec![collection(
                    "C1",
                    vec![
                        CollectionItem::leaf("1", 0),
                        CollectionItem::collection("C3", 1),
                    ],
                )]))
            });

        client
            .expect_fetch_collection_details()
            .withf(|requested| requested_eq(requested, &["C3"]))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(batch(vec![collection(
                    "C3",
                    vec![CollectionItem::leaf("4", 0), CollectionItem::leaf("5", 1)],
                )]))
            });

        let expander = CollectionExpander::new(Arc::new(client));
        let mut visited = VisitedSet::new();
        let snapshot = expander.expand(&ids(&["C1"]), &mut visited).await.unwrap();

        assert_eq!(snapshot.ids().collect::<Vec<_>>(), vec!["1", "4", "5"]);
        assert!(visited.contains("C1"));
        assert!(visited.contains("C3"));
    }

    #[tokio::test]
    async fn test_shared_subcollection_fetched_once() {
        let mut client = MockClient::new();
        let mut seq = Sequence::new();

        client
            .expect_fetch_collection_details()
            .withf(|requested| requested_eq(requested, &["C1", "C2"]))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(batch(vec![
                    collection("C1", vec![CollectionItem::collection("C3", 0)]),
                    collection(
                        "C2",
                        vec![
                            CollectionItem::collection("C3", 0),
                            CollectionItem::leaf("9", 1),
                        ],
                    ),
                ]))
            });

        // C3 is referenced twice but requested once
        client
            .expect_fetch_collection_details()
            .withf(|requested| requested_eq(requested, &["C3"]))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(batch(vec![collection(
                    "C3",
                    vec![
                        CollectionItem::leaf("4", 0),
                        CollectionItem::collection("C1", 1),
                    ],
                )]))
            });

        let expander = CollectionExpander::new(Arc::new(client));
        let mut visited = VisitedSet::new();
        let snapshot = expander
            .expand(&ids(&["C1", "C2", "C1"]), &mut visited)
            .await
            .unwrap();

        assert_eq!(snapshot.ids().collect::<Vec<_>>(), vec!["9", "4"]);
        assert_eq!(visited.len(), 3);
    }

    #[tokio::test]
    async fn test_second_expansion_with_same_visited_set_is_empty() {
        let mut client = MockClient::new();
        client
            .expect_fetch_collection_details()
            .times(1)
            .returning(|_| {
                Ok(batch(vec![collection("C1", vec![CollectionItem::leaf("1", 0)])]))
            });

        let expander = CollectionExpander::new(Arc::new(client));
        let mut visited = VisitedSet::new();

        let first = expander.expand(&ids(&["C1"]), &mut visited).await.unwrap();
        let second = expander.expand(&ids(&["C1"]), &mut visited).await.unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let mut client = MockClient::new();
        client.expect_fetch_collection_details().never();

        let expander = CollectionExpander::new(Arc::new(client));
        let snapshot = expander
            .expand(&[], &mut VisitedSet::new())
            .await
            .unwrap();

        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_empty_collection_does_not_short_circuit_siblings() {
        let mut client = MockClient::new();
        client
            .expect_fetch_collection_details()
            .times(1)
            .returning(|_| {
                Ok(batch(vec![
                    collection("C1", vec![]),
                    collection("C2", vec![CollectionItem::leaf("2", 0)]),
                ]))
            });

        let expander = CollectionExpander::new(Arc::new(client));
        let snapshot = expander
            .expand(&ids(&["C1", "C2"]), &mut VisitedSet::new())
            .await
            .unwrap();

        assert_eq!(snapshot.ids().collect::<Vec<_>>(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_batch_failure_is_protocol_error() {
        let mut client = MockClient::new();
        client
            .expect_fetch_collection_details()
            .returning(|_| {
                Ok(CollectionDetailsBatch {
                    status: 2,
                    collections: vec![],
                })
            });

        let expander = CollectionExpander::new(Arc::new(client));
        let error = expander
            .expand(&ids(&["C1", "C2"]), &mut VisitedSet::new())
            .await
            .unwrap_err();

        match error {
            SyncError::RemoteProtocol {
                operation,
                id,
                status,
            } => {
                assert_eq!(operation, RemoteOperation::FetchBatch);
                assert_eq!(id, "C1,C2");
                assert_eq!(status, 2);
            }
            other => panic!("expected RemoteProtocol, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_collection_failure_names_collection() {
        let mut client = MockClient::new();
        client
            .expect_fetch_collection_details()
            .returning(|_| {
                Ok(batch(vec![
                    collection("C1", vec![CollectionItem::leaf("1", 0)]),
                    CollectionDetails {
                        id: "C2".to_string(),
                        status: 9,
                        children: vec![],
                    },
                ]))
            });

        let expander = CollectionExpander::new(Arc::new(client));
        let error = expander
            .expand(&ids(&["C1", "C2"]), &mut VisitedSet::new())
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            SyncError::RemoteProtocol {
                operation: RemoteOperation::FetchCollection,
                ref id,
                status: 9,
            } if id == "C2"
        ));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut client = MockClient::new();
        client
            .expect_fetch_collection_details()
            .returning(|_| Err(BridgeError::network("connection reset")));

        let expander = CollectionExpander::new(Arc::new(client));
        let error = expander
            .expand(&ids(&["C1"]), &mut VisitedSet::new())
            .await
            .unwrap_err();

        assert!(matches!(error, SyncError::Transport { status: None, .. }));
    }
}
