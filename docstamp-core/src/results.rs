//! Write-result types returned by backend operations.
//!
//! Backends map their driver's native acknowledgements into these neutral
//! structs; the facade returns them unchanged.

use bson::Bson;
use serde::{Deserialize, Serialize};

/// Acknowledgement of a single-document insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOneResult {
    /// Identifier of the inserted document, generated by the backend when
    /// the document carried none.
    pub inserted_id: Bson,
}

/// Acknowledgement of a multi-document insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertManyResult {
    /// Identifiers of the inserted documents, in input order.
    pub inserted_ids: Vec<Bson>,
}

/// Acknowledgement of an update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Number of documents the filter matched.
    pub matched_count: u64,
    /// Number of documents actually modified.
    pub modified_count: u64,
    /// Identifier of the document created by an upsert, if any.
    pub upserted_id: Option<Bson>,
}

/// Acknowledgement of a delete operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// Number of documents removed.
    pub deleted_count: u64,
}
