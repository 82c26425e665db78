//! Filter matching and update application for in-memory documents.
//!
//! The real facade forwards filters and update expressions verbatim to a
//! driver; this module gives the in-memory backend just enough of the
//! conventional driver syntax to stand in for one during development and
//! tests. Unimplemented update operators are rejected rather than
//! silently ignored.

use std::{cmp::Ordering, collections::HashMap};

use bson::{Bson, Document, datetime::DateTime};

use docstamp_core::error::{CollectionStoreError, CollectionStoreResult};

/// Type-erased, comparable representation of BSON values.
///
/// Normalizes all numeric types to f64 so that, like a real driver,
/// `Int32(5)`, `Int64(5)`, and `Double(5.0)` compare equal.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Evaluates driver-syntax filter documents against in-memory documents.
///
/// Supported: top-level `$and`/`$or`, bare values as equality, and the
/// per-field operators `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`,
/// `$nin`, `$exists`. Field paths may be dotted.
pub(crate) struct FilterMatcher;

impl FilterMatcher {
    /// Returns whether `document` satisfies every clause of `filter`.
    pub(crate) fn matches(document: &Document, filter: &Document) -> CollectionStoreResult<bool> {
        for (key, condition) in filter {
            let matched = match key.as_str() {
                "$and" => Self::matches_all(document, condition)?,
                "$or" => Self::matches_any(document, condition)?,
                _ => Self::matches_field(document, key, condition)?,
            };

            if !matched {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn matches_all(document: &Document, condition: &Bson) -> CollectionStoreResult<bool> {
        for filter in Self::subfilters(condition, "$and")? {
            if !Self::matches(document, filter)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn matches_any(document: &Document, condition: &Bson) -> CollectionStoreResult<bool> {
        for filter in Self::subfilters(condition, "$or")? {
            if Self::matches(document, filter)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn subfilters<'a>(
        condition: &'a Bson,
        operator: &str,
    ) -> CollectionStoreResult<impl Iterator<Item = &'a Document>> {
        match condition {
            Bson::Array(clauses) => Ok(clauses.iter().filter_map(Bson::as_document)),
            _ => Err(CollectionStoreError::Unsupported(format!(
                "{} requires an array of filter documents",
                operator
            ))),
        }
    }

    fn matches_field(
        document: &Document,
        path: &str,
        condition: &Bson,
    ) -> CollectionStoreResult<bool> {
        let value = lookup_path(document, path);

        match condition {
            Bson::Document(operators) if is_operator_document(operators) => {
                for (operator, operand) in operators {
                    if !Self::apply_operator(value, operator, operand)? {
                        return Ok(false);
                    }
                }

                Ok(true)
            }
            // Bare values compare for equality; `null` also matches a
            // missing field, as drivers do.
            other => Ok(Self::values_equal(value, other)),
        }
    }

    fn values_equal(value: Option<&Bson>, operand: &Bson) -> bool {
        match value {
            Some(value) => Comparable::from(value) == Comparable::from(operand),
            None => matches!(operand, Bson::Null),
        }
    }

    fn apply_operator(
        value: Option<&Bson>,
        operator: &str,
        operand: &Bson,
    ) -> CollectionStoreResult<bool> {
        match operator {
            "$eq" => Ok(Self::values_equal(value, operand)),
            "$ne" => Ok(!Self::values_equal(value, operand)),
            "$exists" => {
                let should_exist = !matches!(
                    operand,
                    Bson::Boolean(false) | Bson::Null | Bson::Int32(0) | Bson::Int64(0)
                );
                Ok(value.is_some() == should_exist)
            }
            "$gt" | "$gte" | "$lt" | "$lte" => {
                let Some(value) = value else {
                    return Ok(false);
                };

                match Comparable::from(value).partial_cmp(&Comparable::from(operand)) {
                    Some(ordering) => Ok(match operator {
                        "$gt" => ordering == Ordering::Greater,
                        "$gte" => ordering != Ordering::Less,
                        "$lt" => ordering == Ordering::Less,
                        "$lte" => ordering != Ordering::Greater,
                        _ => unreachable!(),
                    }),
                    None => Ok(false),
                }
            }
            "$in" => Self::contained_in(value, operand, "$in"),
            "$nin" => Ok(!Self::contained_in(value, operand, "$nin")?),
            other => Err(CollectionStoreError::Unsupported(format!(
                "filter operator {}",
                other
            ))),
        }
    }

    fn contained_in(
        value: Option<&Bson>,
        operand: &Bson,
        operator: &str,
    ) -> CollectionStoreResult<bool> {
        let Bson::Array(candidates) = operand else {
            return Err(CollectionStoreError::Unsupported(format!(
                "{} requires an array operand",
                operator
            )));
        };

        let Some(value) = value else {
            return Ok(false);
        };

        // An array field matches when any of its elements does.
        let values = match value {
            Bson::Array(elements) => elements.iter().collect::<Vec<_>>(),
            single => vec![single],
        };

        Ok(values.iter().any(|value| {
            candidates
                .iter()
                .any(|candidate| Comparable::from(*value) == Comparable::from(candidate))
        }))
    }
}

/// Applies driver-syntax update expressions to in-memory documents.
///
/// Supported: `$set` and `$unset` with top-level field names, and
/// operator-free replacement documents. Anything else is rejected with
/// [`CollectionStoreError::Unsupported`].
pub(crate) struct UpdateApplier;

impl UpdateApplier {
    /// Applies `update` to `document`, returning whether anything changed.
    pub(crate) fn apply(
        document: &mut Document,
        update: &Document,
    ) -> CollectionStoreResult<bool> {
        if !update.keys().any(|key| key.starts_with('$')) {
            return Ok(Self::replace(document, update));
        }

        let mut changed = false;

        for (operator, clause) in update {
            let clause = clause.as_document().ok_or_else(|| {
                CollectionStoreError::Backend(format!(
                    "update operator {} requires a document clause",
                    operator
                ))
            })?;

            match operator.as_str() {
                "$set" => {
                    for (field, value) in clause {
                        if document.get(field) != Some(value) {
                            document.insert(field.as_str(), value.clone());
                            changed = true;
                        }
                    }
                }
                "$unset" => {
                    for (field, _) in clause {
                        if document.remove(field).is_some() {
                            changed = true;
                        }
                    }
                }
                other => {
                    return Err(CollectionStoreError::Unsupported(format!(
                        "update operator {}",
                        other
                    )));
                }
            }
        }

        Ok(changed)
    }

    /// Replaces the document's contents wholesale, preserving its `_id`.
    fn replace(document: &mut Document, replacement: &Document) -> bool {
        let id = document.get("_id").cloned();

        let mut next = replacement.clone();
        if let Some(id) = id {
            if !next.contains_key("_id") {
                next.insert("_id", id);
            }
        }

        if *document == next {
            return false;
        }

        *document = next;
        true
    }

    /// Seeds an upsert document from the filter's equality clauses, the
    /// way drivers do.
    pub(crate) fn upsert_seed(filter: &Document) -> Document {
        let mut seed = Document::new();

        for (field, condition) in filter {
            if field.starts_with('$') {
                continue;
            }

            match condition {
                Bson::Document(operators) if is_operator_document(operators) => {
                    if let Some(value) = operators.get("$eq") {
                        seed.insert(field.as_str(), value.clone());
                    }
                }
                value => {
                    seed.insert(field.as_str(), value.clone());
                }
            }
        }

        seed
    }
}

/// Resolves a possibly dotted field path against a document.
fn lookup_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut current = document;
    let mut parts = path.split('.').peekable();

    while let Some(part) = parts.next() {
        let value = current.get(part)?;

        if parts.peek().is_none() {
            return Some(value);
        }

        current = value.as_document()?;
    }

    None
}

fn is_operator_document(document: &Document) -> bool {
    !document.is_empty() && document.keys().all(|key| key.starts_with('$'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_bare_value_equality() {
        let document = doc! { "name": "Alice", "age": 30 };

        assert!(FilterMatcher::matches(&document, &doc! { "name": "Alice" }).unwrap());
        assert!(!FilterMatcher::matches(&document, &doc! { "name": "Bob" }).unwrap());
    }

    #[test]
    fn test_numeric_cross_type_equality() {
        let document = doc! { "age": 30_i64 };

        assert!(FilterMatcher::matches(&document, &doc! { "age": 30_i32 }).unwrap());
        assert!(FilterMatcher::matches(&document, &doc! { "age": 30.0 }).unwrap());
    }

    #[test]
    fn test_comparison_operators() {
        let document = doc! { "age": 30 };

        assert!(FilterMatcher::matches(&document, &doc! { "age": { "$gt": 20 } }).unwrap());
        assert!(FilterMatcher::matches(&document, &doc! { "age": { "$gte": 30 } }).unwrap());
        assert!(!FilterMatcher::matches(&document, &doc! { "age": { "$lt": 30 } }).unwrap());
        assert!(FilterMatcher::matches(
            &document,
            &doc! { "age": { "$gt": 20, "$lte": 30 } }
        )
        .unwrap());
    }

    #[test]
    fn test_in_and_nin() {
        let document = doc! { "status": "active", "tags": ["a", "b"] };

        assert!(FilterMatcher::matches(
            &document,
            &doc! { "status": { "$in": ["active", "pending"] } }
        )
        .unwrap());
        assert!(FilterMatcher::matches(
            &document,
            &doc! { "tags": { "$in": ["b"] } }
        )
        .unwrap());
        assert!(FilterMatcher::matches(
            &document,
            &doc! { "status": { "$nin": ["archived"] } }
        )
        .unwrap());
    }

    #[test]
    fn test_exists_and_missing_fields() {
        let document = doc! { "name": "Alice" };

        assert!(FilterMatcher::matches(&document, &doc! { "name": { "$exists": true } }).unwrap());
        assert!(FilterMatcher::matches(&document, &doc! { "age": { "$exists": false } }).unwrap());
        // Null matches a missing field, like the driver.
        assert!(FilterMatcher::matches(&document, &doc! { "age": Bson::Null }).unwrap());
        assert!(FilterMatcher::matches(&document, &doc! { "age": { "$ne": 5 } }).unwrap());
    }

    #[test]
    fn test_logical_operators() {
        let document = doc! { "age": 30, "status": "active" };

        assert!(FilterMatcher::matches(
            &document,
            &doc! { "$and": [ { "age": { "$gt": 20 } }, { "status": "active" } ] }
        )
        .unwrap());
        assert!(FilterMatcher::matches(
            &document,
            &doc! { "$or": [ { "age": { "$gt": 100 } }, { "status": "active" } ] }
        )
        .unwrap());
    }

    #[test]
    fn test_dotted_paths() {
        let document = doc! { "profile": { "city": "Berlin" } };

        assert!(FilterMatcher::matches(&document, &doc! { "profile.city": "Berlin" }).unwrap());
        assert!(!FilterMatcher::matches(&document, &doc! { "profile.city": "Paris" }).unwrap());
    }

    #[test]
    fn test_unknown_filter_operator_is_rejected() {
        let document = doc! { "name": "Alice" };

        assert!(matches!(
            FilterMatcher::matches(&document, &doc! { "name": { "$regex": "^A" } }),
            Err(CollectionStoreError::Unsupported(_))
        ));
    }

    #[test]
    fn test_set_and_unset() {
        let mut document = doc! { "name": "Alice", "age": 30 };

        let changed = UpdateApplier::apply(
            &mut document,
            &doc! { "$set": { "age": 31 }, "$unset": { "name": "" } },
        )
        .unwrap();

        assert!(changed);
        assert_eq!(document, doc! { "age": 31 });
    }

    #[test]
    fn test_set_of_identical_value_reports_no_change() {
        let mut document = doc! { "age": 30 };

        let changed = UpdateApplier::apply(&mut document, &doc! { "$set": { "age": 30 } }).unwrap();

        assert!(!changed);
    }

    #[test]
    fn test_replacement_preserves_id() {
        let mut document = doc! { "_id": 7, "name": "Alice" };

        let changed = UpdateApplier::apply(&mut document, &doc! { "name": "Bob" }).unwrap();

        assert!(changed);
        assert_eq!(document, doc! { "name": "Bob", "_id": 7 });
    }

    #[test]
    fn test_unknown_update_operator_is_rejected() {
        let mut document = doc! { "tags": ["a"] };

        assert!(matches!(
            UpdateApplier::apply(&mut document, &doc! { "$push": { "tags": "b" } }),
            Err(CollectionStoreError::Unsupported(_))
        ));
    }

    #[test]
    fn test_upsert_seed_from_equality_clauses() {
        let seed = UpdateApplier::upsert_seed(&doc! {
            "name": "Alice",
            "age": { "$eq": 30 },
            "score": { "$gt": 5 },
        });

        assert_eq!(seed, doc! { "name": "Alice", "age": 30 });
    }
}
