//! Conventional driver options forwarded with operations.
//!
//! Filters and update expressions travel through the facade verbatim as
//! BSON documents; the types here cover the small set of options the
//! facade forwards alongside them.
//!
//! # Example
//!
//! ```ignore
//! use docstamp::options::{FindOptions, SortDirection};
//!
//! let options = FindOptions::builder()
//!     .limit(10)
//!     .skip(20)
//!     .sort("createdAt", SortDirection::Desc)
//!     .build();
//! ```

use bson::{Document, doc};
use serde::{Deserialize, Serialize};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

impl SortDirection {
    /// Driver-syntax sort value (`1` ascending, `-1` descending).
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// Options forwarded with `find` and `find_one` operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindOptions {
    /// Maximum number of documents to return.
    pub limit: Option<i64>,
    /// Number of matching documents to skip.
    pub skip: Option<u64>,
    /// Driver-syntax sort document (field name to `1`/`-1`).
    pub sort: Option<Document>,
}

impl FindOptions {
    /// Creates a builder for fluent construction.
    pub fn builder() -> FindOptionsBuilder {
        FindOptionsBuilder::new()
    }
}

/// Builder for [`FindOptions`].
#[derive(Debug, Clone, Default)]
pub struct FindOptionsBuilder {
    options: FindOptions,
}

impl FindOptionsBuilder {
    /// Creates a builder with no options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: i64) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// Sets the number of matching documents to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.options.skip = Some(skip);
        self
    }

    /// Sorts results by a field. Called repeatedly, the last sort wins.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        let field = field.into();
        self.options.sort = Some(doc! { field: direction.as_i32() });
        self
    }

    /// Builds the final options.
    pub fn build(self) -> FindOptions {
        self.options
    }
}

/// Options forwarded with `update_one` and `update_many` operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOptions {
    /// Insert a new document when the filter matches nothing.
    pub upsert: bool,
}

impl UpdateOptions {
    /// Options requesting an upsert.
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}
