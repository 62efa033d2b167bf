//! Document store port
//!
//! Handlers never talk to a driver directly. They hold an
//! `Arc<dyn DocumentStore>` and issue exactly one operation per request.
//! Two adapters exist: [`MongoStore`] for production and [`MemoryStore`]
//! for development and tests.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::models::{Document, EXTERNAL_ID_FIELD, PRIMARY_KEY_FIELD};
use crate::Result;

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// The four logical collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Songs,
    Users,
    LikedSongs,
    Playlists,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Songs,
        Collection::Users,
        Collection::LikedSongs,
        Collection::Playlists,
    ];

    /// Collection name in the database
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Songs => "Songs",
            Collection::Users => "Users",
            Collection::LikedSongs => "LikedSongs",
            Collection::Playlists => "Playlists",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage-assigned primary key (rendered to clients as `_id`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimaryKey(ObjectId);

impl PrimaryKey {
    /// Allocate a fresh key
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parse the client-facing hex form; `None` if the string is not a key
    pub fn parse(s: &str) -> Option<Self> {
        ObjectId::parse_str(s).ok().map(Self)
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// Document selection
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection
    All,
    /// Every listed field equals the given value; `null` also matches a missing field
    FieldsEqual(Vec<(String, Value)>),
    /// Match on the storage primary key
    PrimaryKey(PrimaryKey),
    /// Case-insensitive literal substring match on any of the fields
    ContainsAny { fields: Vec<String>, needle: String },
}

impl Filter {
    /// Match on the external `id` field
    pub fn external_id(id: impl Into<Value>) -> Self {
        Filter::FieldsEqual(vec![(EXTERNAL_ID_FIELD.to_string(), id.into())])
    }

    /// Match on a single field
    pub fn field(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::FieldsEqual(vec![(name.into(), value.into())])
    }

    /// Narrow a `FieldsEqual` filter with another equality; other filters are left as is
    pub fn and_field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        match self {
            Filter::FieldsEqual(mut pairs) => {
                pairs.push((name.into(), value.into()));
                Filter::FieldsEqual(pairs)
            }
            Filter::All => Filter::field(name, value),
            other => other,
        }
    }

    /// Case-insensitive substring search across `fields`
    pub fn contains_any(fields: &[&str], needle: impl Into<String>) -> Self {
        Filter::ContainsAny {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            needle: needle.into(),
        }
    }

    /// Evaluate the filter against an in-process document
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::FieldsEqual(pairs) => pairs.iter().all(|(name, value)| match value {
                Value::Null => matches!(doc.get(name), None | Some(Value::Null)),
                _ => doc.get(name) == Some(value),
            }),
            Filter::PrimaryKey(key) => {
                matches!(doc.get(PRIMARY_KEY_FIELD), Some(Value::String(s)) if *s == key.to_hex())
            }
            Filter::ContainsAny { fields, needle } => {
                let needle = needle.to_lowercase();
                fields.iter().any(|name| {
                    matches!(doc.get(name), Some(Value::String(s)) if s.to_lowercase().contains(&needle))
                })
            }
        }
    }
}

/// Single-document modification
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Overwrite only the supplied fields
    Set(Document),
    /// Append `value` to the array at `field`, creating it if absent
    Push { field: String, value: Value },
    /// Remove every entry of the array at `field` whose `id` equals `id`
    PullById { field: String, id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Collection accessors used by every handler
///
/// Each method is a single storage operation. Adapters must render the
/// primary key of every returned document as a string `_id`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents matching `filter`, in natural order
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>>;

    /// First document matching `filter`
    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>>;

    /// Insert verbatim; a missing `_id` is assigned by the store
    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOutcome>;

    /// Insert a batch verbatim, returning how many were stored
    async fn insert_many(&self, collection: Collection, docs: Vec<Document>) -> Result<u64>;

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64>;

    /// Apply `update` to the first document matching `filter`
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
    ) -> Result<UpdateOutcome>;

    /// Delete the first document matching `filter`
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn primary_key_parse_rejects_non_hex() {
        assert!(PrimaryKey::parse("s1").is_none());
        assert!(PrimaryKey::parse("").is_none());

        let key = PrimaryKey::generate();
        assert_eq!(PrimaryKey::parse(&key.to_hex()), Some(key));
    }

    #[test]
    fn fields_equal_requires_all_pairs() {
        let liked = doc(json!({"id": "s1", "userId": "u1"}));

        assert!(Filter::external_id("s1").and_field("userId", "u1").matches(&liked));
        assert!(!Filter::external_id("s1").and_field("userId", "u2").matches(&liked));
        assert!(!Filter::field("title", "x").matches(&liked));
    }

    #[test]
    fn fields_equal_compares_json_values() {
        let song = doc(json!({"id": 7, "genre": ["Rock", "Pop"]}));

        assert!(!Filter::external_id("7").matches(&song));
        assert!(Filter::external_id(7).matches(&song));
        assert!(Filter::field("genre", json!(["Rock", "Pop"])).matches(&song));
    }

    #[test]
    fn null_matches_missing_field() {
        let liked = doc(json!({"id": "s1", "userId": null}));

        assert!(Filter::field("userId", Value::Null).matches(&liked));
        assert!(Filter::field("album", Value::Null).matches(&liked));
        assert!(!Filter::field("id", Value::Null).matches(&liked));
    }

    #[test]
    fn contains_any_is_case_insensitive() {
        let song = doc(json!({"title": "Rock Lobster", "genre": "New Wave"}));

        assert!(Filter::contains_any(&["title", "genre"], "ROCK").matches(&song));
        assert!(Filter::contains_any(&["genre"], "wave").matches(&song));
        assert!(!Filter::contains_any(&["genre"], "rock").matches(&song));
    }

    #[test]
    fn contains_any_treats_needle_literally() {
        let song = doc(json!({"title": "AC/DC (Live)"}));
        assert!(Filter::contains_any(&["title"], "(live)").matches(&song));
        assert!(!Filter::contains_any(&["title"], "a.c").matches(&song));
    }

    #[test]
    fn primary_key_filter_matches_hex_id() {
        let key = PrimaryKey::generate();
        let stored = doc(json!({"_id": key.to_hex()}));

        assert!(Filter::PrimaryKey(key).matches(&stored));
        assert!(!Filter::PrimaryKey(PrimaryKey::generate()).matches(&stored));
    }
}
