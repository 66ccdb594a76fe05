//! Steam Web API response types
//!
//! Data structures for deserializing `ISteamRemoteStorage/GetCollectionDetails`
//! and the community `sharedfiles` endpoints.

use bridge_traits::collection::{
    CollectionDetails, CollectionDetailsBatch, CollectionItem, ItemKind,
};
use serde::Deserialize;

/// Outer envelope of `GetCollectionDetails/v1`
#[derive(Debug, Deserialize)]
pub struct GetCollectionDetailsEnvelope {
    pub response: GetCollectionDetailsResponse,
}

/// `GetCollectionDetails/v1` response body
#[derive(Debug, Deserialize)]
pub struct GetCollectionDetailsResponse {
    /// Batch status (1 = OK)
    pub result: i64,

    /// Number of entries in `collectiondetails`
    #[serde(rename = "resultcount", default)]
    pub result_count: u32,

    /// One entry per requested collection
    #[serde(rename = "collectiondetails", default)]
    pub collection_details: Vec<CollectionDetailsEntry>,
}

/// A single collection in the batch
#[derive(Debug, Deserialize)]
pub struct CollectionDetailsEntry {
    #[serde(rename = "publishedfileid")]
    pub published_file_id: String,

    /// Per-collection status (1 = OK)
    pub result: i64,

    /// Omitted by Steam for empty or unreadable collections
    #[serde(default)]
    pub children: Vec<ChildEntry>,
}

/// A child of a collection
#[derive(Debug, Deserialize)]
pub struct ChildEntry {
    #[serde(rename = "publishedfileid")]
    pub published_file_id: String,

    #[serde(rename = "sortorder", default)]
    pub sort_order: i64,

    /// 0 = item, 2 = collection
    #[serde(rename = "filetype", default)]
    pub file_type: i64,
}

/// `sharedfiles/removechild` response body
#[derive(Debug, Deserialize)]
pub struct RemoveChildResponse {
    pub success: i64,
}

impl From<ChildEntry> for CollectionItem {
    fn from(child: ChildEntry) -> Self {
        CollectionItem::new(
            child.published_file_id,
            child.sort_order,
            ItemKind::from_file_type(child.file_type),
        )
    }
}

impl From<CollectionDetailsEntry> for CollectionDetails {
    fn from(entry: CollectionDetailsEntry) -> Self {
        CollectionDetails {
            id: entry.published_file_id,
            status: entry.result,
            children: entry.children.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<GetCollectionDetailsResponse> for CollectionDetailsBatch {
    fn from(response: GetCollectionDetailsResponse) -> Self {
        CollectionDetailsBatch {
            status: response.result,
            collections: response
                .collection_details
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_collection_details() {
        let json = r#"{
            "response": {
                "result": 1,
                "resultcount": 1,
                "collectiondetails": [
                    {
                        "publishedfileid": "100",
                        "result": 1,
                        "children": [
                            { "publishedfileid": "1", "sortorder": 1, "filetype": 0 },
                            { "publishedfileid": "200", "sortorder": 2, "filetype": 2 }
                        ]
                    }
                ]
            }
        }"#;

        let envelope: GetCollectionDetailsEnvelope = serde_json::from_str(json).unwrap();
        let batch = CollectionDetailsBatch::from(envelope.response);

        assert!(batch.is_ok());
        assert_eq!(batch.collections.len(), 1);
        let collection = &batch.collections[0];
        assert_eq!(collection.id, "100");
        assert_eq!(collection.children[0].kind, ItemKind::Leaf);
        assert_eq!(collection.children[1].kind, ItemKind::Collection);
        assert_eq!(collection.children[1].sort_order, 2);
    }

    #[test]
    fn test_deserialize_entry_without_children() {
        let json = r#"{
            "response": {
                "result": 1,
                "collectiondetails": [
                    { "publishedfileid": "100", "result": 9 }
                ]
            }
        }"#;

        let envelope: GetCollectionDetailsEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.response.result_count, 0);
        let entry = &envelope.response.collection_details[0];
        assert_eq!(entry.result, 9);
        assert!(entry.children.is_empty());
    }

    #[test]
    fn test_missing_response_envelope_is_rejected() {
        let json = r#"{ "result": 1 }"#;
        assert!(serde_json::from_str::<GetCollectionDetailsEnvelope>(json).is_err());
    }

    #[test]
    fn test_deserialize_remove_child() {
        let response: RemoveChildResponse = serde_json::from_str(r#"{"success":1}"#).unwrap();
        assert_eq!(response.success, 1);
    }
}
