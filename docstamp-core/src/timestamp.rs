//! Automatic timestamp injection for inserts and updates.
//!
//! This module implements the write-time stamping policy applied by the
//! collection facades: creation and modification times are filled in on
//! insert, and modification times are folded into the `$set` clause of an
//! update expression, without ever clobbering caller-supplied values.
//!
//! # Example
//!
//! ```ignore
//! use docstamp::timestamp::{TimestampPolicy, TimestampFormat};
//! use bson::doc;
//!
//! let policy = TimestampPolicy::new(TimestampFormat::Millis);
//! let mut document = doc! { "name": "Alice" };
//! policy.stamp_insert(&mut document);
//! assert!(document.contains_key("createdAt"));
//! assert!(document.contains_key("updatedAt"));
//! ```

use bson::{Bson, Document};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Wire format for stamped timestamp values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO-8601 string with millisecond precision and a `Z` suffix.
    #[serde(rename = "ISODate")]
    IsoDate,
    /// Native BSON datetime value.
    Date,
    /// Integer seconds since the Unix epoch.
    Unix,
    /// Integer milliseconds since the Unix epoch.
    #[default]
    Millis,
    /// RFC-1123 string, e.g. `"Mon, 05 Dec 2022 04:14:52 GMT"`.
    Utc,
}

impl TimestampFormat {
    /// Renders an instant as a BSON value in this format.
    pub fn render(&self, now: DateTime<Utc>) -> Bson {
        match self {
            TimestampFormat::IsoDate => {
                Bson::String(now.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            TimestampFormat::Date => Bson::DateTime(bson::DateTime::from_chrono(now)),
            TimestampFormat::Unix => Bson::Int64(now.timestamp()),
            TimestampFormat::Millis => Bson::Int64(now.timestamp_millis()),
            TimestampFormat::Utc => {
                Bson::String(now.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
            }
        }
    }
}

/// Field names the policy writes timestamps under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampFields {
    /// Field holding the creation time (insert only).
    #[serde(default = "TimestampFields::default_created")]
    pub created: String,
    /// Field holding the last modification time (insert and update).
    #[serde(default = "TimestampFields::default_updated")]
    pub updated: String,
}

impl TimestampFields {
    /// Creates a field-name pair.
    pub fn new(created: impl Into<String>, updated: impl Into<String>) -> Self {
        Self { created: created.into(), updated: updated.into() }
    }

    fn default_created() -> String {
        "createdAt".to_string()
    }

    fn default_updated() -> String {
        "updatedAt".to_string()
    }
}

impl Default for TimestampFields {
    fn default() -> Self {
        Self {
            created: Self::default_created(),
            updated: Self::default_updated(),
        }
    }
}

/// The write-time stamping policy for a collection.
///
/// The policy is inert when disabled and otherwise purely additive: it
/// mutates only the record passed in, computes the wall clock once per
/// call, and never raises an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampPolicy {
    /// Whether stamping is applied at all.
    pub enabled: bool,
    /// Wire format for stamped values.
    pub format: TimestampFormat,
    /// Field names to stamp under.
    pub fields: TimestampFields,
}

impl TimestampPolicy {
    /// Creates an enabled policy with the given format and default field
    /// names (`createdAt` / `updatedAt`).
    pub fn new(format: TimestampFormat) -> Self {
        Self {
            enabled: true,
            format,
            fields: TimestampFields::default(),
        }
    }

    /// Creates a disabled policy.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Replaces the stamped field names.
    pub fn with_fields(mut self, fields: TimestampFields) -> Self {
        self.fields = fields;
        self
    }

    /// Stamps a document about to be inserted with the current wall clock.
    ///
    /// Both the created and updated fields are set, each only when absent
    /// or holding a falsy value (null, `false`, numeric zero or NaN, empty
    /// string). Caller-supplied truthy values always win.
    pub fn stamp_insert(&self, document: &mut Document) {
        self.stamp_insert_at(document, Utc::now());
    }

    /// Stamps an insert as of a fixed instant.
    pub fn stamp_insert_at(&self, document: &mut Document, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }

        let stamp = self.format.render(now);

        for field in [&self.fields.created, &self.fields.updated] {
            if document.get(field).is_none_or(is_falsy) {
                document.insert(field.as_str(), stamp.clone());
            }
        }
    }

    /// Folds the current wall clock into an update expression's `$set`
    /// clause.
    ///
    /// A `$set` subdocument is created when missing. The updated field is
    /// written only when not already present under `$set`. Unlike the
    /// insert path this is a presence check, so even a falsy
    /// caller-supplied value is kept.
    pub fn stamp_update(&self, update: &mut Document) {
        self.stamp_update_at(update, Utc::now());
    }

    /// Stamps an update expression as of a fixed instant.
    pub fn stamp_update_at(&self, update: &mut Document, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }

        if !update.contains_key("$set") {
            update.insert("$set", Document::new());
        }

        // A caller-supplied `$set` that is not a subdocument cannot take an
        // injected field; leave the expression untouched.
        let Some(Bson::Document(set)) = update.get_mut("$set") else {
            return;
        };

        if !set.contains_key(&self.fields.updated) {
            set.insert(self.fields.updated.as_str(), self.format.render(now));
        }
    }
}

/// Present-but-empty values an insert stamp may replace; absence is
/// handled at the call site.
fn is_falsy(value: &Bson) -> bool {
    match value {
        Bson::Null | Bson::Undefined => true,
        Bson::Boolean(value) => !value,
        Bson::Int32(value) => *value == 0,
        Bson::Int64(value) => *value == 0,
        Bson::Double(value) => *value == 0.0 || value.is_nan(),
        Bson::String(value) => value.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    // 2022-12-05T04:14:52.000Z, the instant used throughout.
    const FIXED_MILLIS: i64 = 1_670_213_692_000;

    fn fixed_instant() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(FIXED_MILLIS).unwrap()
    }

    #[test]
    fn test_disabled_policy_is_inert() {
        let policy = TimestampPolicy::disabled();
        let mut document = doc! { "name": "Alice" };

        policy.stamp_insert_at(&mut document, fixed_instant());
        assert_eq!(document, doc! { "name": "Alice" });

        let mut update = doc! { "$set": { "name": "Bob" } };
        policy.stamp_update_at(&mut update, fixed_instant());
        assert_eq!(update, doc! { "$set": { "name": "Bob" } });
    }

    #[test]
    fn test_insert_stamps_both_fields_with_millis() {
        let policy = TimestampPolicy::new(TimestampFormat::Millis);
        let mut document = doc! { "name": "Alice" };

        policy.stamp_insert_at(&mut document, fixed_instant());

        assert_eq!(document.get("createdAt"), Some(&Bson::Int64(FIXED_MILLIS)));
        assert_eq!(document.get("updatedAt"), Some(&Bson::Int64(FIXED_MILLIS)));
        assert_eq!(document.get("createdAt"), document.get("updatedAt"));
    }

    #[test]
    fn test_insert_is_idempotent_at_fixed_instant() {
        let policy = TimestampPolicy::new(TimestampFormat::Millis);
        let mut document = doc! { "name": "Alice" };

        policy.stamp_insert_at(&mut document, fixed_instant());
        let stamped = document.clone();

        policy.stamp_insert_at(&mut document, fixed_instant());
        assert_eq!(document, stamped);
    }

    #[test]
    fn test_insert_preserves_existing_created() {
        let policy = TimestampPolicy::new(TimestampFormat::Millis);
        let mut document = doc! { "createdAt": 1234_i64 };

        policy.stamp_insert_at(&mut document, fixed_instant());

        assert_eq!(document.get("createdAt"), Some(&Bson::Int64(1234)));
        assert_eq!(document.get("updatedAt"), Some(&Bson::Int64(FIXED_MILLIS)));
    }

    #[test]
    fn test_insert_overwrites_falsy_created() {
        // Present-but-falsy values are replaced on the insert path.
        let policy = TimestampPolicy::new(TimestampFormat::Millis);

        for falsy in [
            Bson::Null,
            Bson::Int32(0),
            Bson::Int64(0),
            Bson::Double(0.0),
            Bson::Double(f64::NAN),
            Bson::Boolean(false),
            Bson::String(String::new()),
        ] {
            let mut document = doc! { "createdAt": falsy };
            policy.stamp_insert_at(&mut document, fixed_instant());
            assert_eq!(document.get("createdAt"), Some(&Bson::Int64(FIXED_MILLIS)));
        }
    }

    #[test]
    fn test_update_creates_set_subdocument() {
        let policy = TimestampPolicy::new(TimestampFormat::Millis);
        let mut update = doc! {};

        policy.stamp_update_at(&mut update, fixed_instant());

        assert_eq!(update, doc! { "$set": { "updatedAt": FIXED_MILLIS } });
    }

    #[test]
    fn test_update_preserves_existing_updated() {
        let policy = TimestampPolicy::new(TimestampFormat::Millis);
        let mut update = doc! { "$set": { "updatedAt": 42 } };

        policy.stamp_update_at(&mut update, fixed_instant());

        assert_eq!(update, doc! { "$set": { "updatedAt": 42 } });
    }

    #[test]
    fn test_update_presence_check_keeps_falsy_value() {
        let policy = TimestampPolicy::new(TimestampFormat::Millis);
        let mut update = doc! { "$set": { "updatedAt": 0 } };

        policy.stamp_update_at(&mut update, fixed_instant());

        assert_eq!(update, doc! { "$set": { "updatedAt": 0 } });
    }

    #[test]
    fn test_update_leaves_non_document_set_untouched() {
        let policy = TimestampPolicy::new(TimestampFormat::Millis);
        let mut update = doc! { "$set": 42 };

        policy.stamp_update_at(&mut update, fixed_instant());

        assert_eq!(update, doc! { "$set": 42 });
    }

    #[test]
    fn test_update_keeps_sibling_set_fields() {
        let policy = TimestampPolicy::new(TimestampFormat::Millis);
        let mut update = doc! { "$set": { "name": "Bob" } };

        policy.stamp_update_at(&mut update, fixed_instant());

        assert_eq!(
            update,
            doc! { "$set": { "name": "Bob", "updatedAt": FIXED_MILLIS } }
        );
    }

    #[test]
    fn test_format_millis() {
        let rendered = TimestampFormat::Millis.render(fixed_instant());
        assert_eq!(rendered, Bson::Int64(FIXED_MILLIS));
    }

    #[test]
    fn test_format_unix_floors_subsecond_millis() {
        let instant = DateTime::from_timestamp_millis(FIXED_MILLIS + 500).unwrap();
        let rendered = TimestampFormat::Unix.render(instant);
        assert_eq!(rendered, Bson::Int64(FIXED_MILLIS / 1000));
    }

    #[test]
    fn test_format_isodate() {
        let rendered = TimestampFormat::IsoDate.render(fixed_instant());
        assert_eq!(
            rendered,
            Bson::String("2022-12-05T04:14:52.000Z".to_string())
        );
    }

    #[test]
    fn test_format_utc() {
        let rendered = TimestampFormat::Utc.render(fixed_instant());
        assert_eq!(
            rendered,
            Bson::String("Mon, 05 Dec 2022 04:14:52 GMT".to_string())
        );
    }

    #[test]
    fn test_format_date() {
        match TimestampFormat::Date.render(fixed_instant()) {
            Bson::DateTime(value) => assert_eq!(value.timestamp_millis(), FIXED_MILLIS),
            other => panic!("expected a datetime, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_field_names() {
        let policy = TimestampPolicy::new(TimestampFormat::Millis)
            .with_fields(TimestampFields::new("inserted", "modified"));
        let mut document = doc! {};

        policy.stamp_insert_at(&mut document, fixed_instant());

        assert!(document.contains_key("inserted"));
        assert!(document.contains_key("modified"));
        assert!(!document.contains_key("createdAt"));
    }

    #[test]
    fn test_format_serde_names() {
        assert_eq!(
            serde_json::to_string(&TimestampFormat::IsoDate).unwrap(),
            "\"ISODate\""
        );
        assert_eq!(
            serde_json::from_str::<TimestampFormat>("\"Millis\"").unwrap(),
            TimestampFormat::Millis
        );
    }

    #[test]
    fn test_policy_serde_defaults() {
        let policy: TimestampPolicy = serde_json::from_str(r#"{ "enabled": true }"#).unwrap();
        assert!(policy.enabled);
        assert_eq!(policy.format, TimestampFormat::Millis);
        assert_eq!(policy.fields.created, "createdAt");
        assert_eq!(policy.fields.updated, "updatedAt");
    }
}
