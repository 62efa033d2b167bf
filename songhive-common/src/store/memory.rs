//! In-process document store
//!
//! Keeps each collection as an insertion-ordered vector behind one
//! `RwLock`, so every operation is atomic with respect to the others.
//! Used by `store.backend = "memory"` and by the test suites.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    Collection, DeleteOutcome, DocumentStore, Filter, InsertOutcome, PrimaryKey, Update,
    UpdateOutcome,
};
use crate::models::{Document, EXTERNAL_ID_FIELD, PRIMARY_KEY_FIELD};
use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a primary key unless the document already carries one
    fn with_key(mut doc: Document) -> (String, Document) {
        let key = match doc.get(PRIMARY_KEY_FIELD) {
            Some(Value::String(existing)) => existing.clone(),
            Some(other) => other.to_string(),
            None => PrimaryKey::generate().to_hex(),
        };
        doc.insert(PRIMARY_KEY_FIELD.to_string(), Value::String(key.clone()));
        (key, doc)
    }
}

/// Apply `update` in place, reporting whether the document changed
fn apply(doc: &mut Document, update: Update) -> Result<bool> {
    match update {
        Update::Set(fields) => {
            let mut changed = false;
            for (name, value) in fields {
                if name == PRIMARY_KEY_FIELD {
                    return Err(Error::Storage(
                        "the primary key field is immutable".to_string(),
                    ));
                }
                if doc.get(&name) != Some(&value) {
                    doc.insert(name, value);
                    changed = true;
                }
            }
            Ok(changed)
        }
        Update::Push { field, value } => {
            match doc
                .entry(field.clone())
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(items) => {
                    items.push(value);
                    Ok(true)
                }
                _ => Err(Error::Storage(format!(
                    "cannot push to non-array field '{}'",
                    field
                ))),
            }
        }
        Update::PullById { field, id } => match doc.get_mut(&field) {
            None => Ok(false),
            Some(Value::Array(items)) => {
                let before = items.len();
                items.retain(|item| {
                    !matches!(item.get(EXTERNAL_ID_FIELD), Some(Value::String(s)) if *s == id)
                });
                Ok(items.len() != before)
            }
            Some(_) => Err(Error::Storage(format!(
                "cannot pull from non-array field '{}'",
                field
            ))),
        },
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOutcome> {
        let (key, doc) = Self::with_key(doc);
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if docs
            .iter()
            .any(|d| matches!(d.get(PRIMARY_KEY_FIELD), Some(Value::String(s)) if *s == key))
        {
            return Err(Error::Storage(format!(
                "duplicate primary key '{}' in {}",
                key, collection
            )));
        }

        docs.push(doc);
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: key,
        })
    }

    async fn insert_many(&self, collection: Collection, docs: Vec<Document>) -> Result<u64> {
        if docs.is_empty() {
            return Err(Error::Storage("cannot insert an empty batch".to_string()));
        }

        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection).or_default();
        let count = docs.len() as u64;
        stored.extend(docs.into_iter().map(|d| Self::with_key(d).1));
        Ok(count)
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
    ) -> Result<UpdateOutcome> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)));

        let Some(doc) = target else {
            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            });
        };

        let changed = apply(doc, update)?;
        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(changed),
        })
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteOutcome> {
        let mut collections = self.collections.write().await;
        let deleted = match collections.get_mut(&collection) {
            Some(docs) => match docs.iter().position(|d| filter.matches(d)) {
                Some(index) => {
                    docs.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: deleted,
        })
    }
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

    #[tokio::test]
    async fn insert_assigns_string_primary_key() {
        let store = MemoryStore::new();
        let outcome = store
            .insert_one(Collection::Songs, doc(json!({"id": "s1"})))
            .await
            .unwrap();

        assert!(outcome.acknowledged);
        assert!(PrimaryKey::parse(&outcome.inserted_id).is_some());

        let found = store
            .find_one(Collection::Songs, &Filter::external_id("s1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["_id"], json!(outcome.inserted_id));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Songs, doc(json!({"id": "x"})))
            .await
            .unwrap();

        assert_eq!(store.count(Collection::Songs, &Filter::All).await.unwrap(), 1);
        assert_eq!(store.count(Collection::Users, &Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn set_reports_no_modification_for_identical_values() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Songs, doc(json!({"id": "s1", "genre": "Rock"})))
            .await
            .unwrap();

        let same = store
            .update_one(
                Collection::Songs,
                &Filter::external_id("s1"),
                Update::Set(doc(json!({"genre": "Rock"}))),
            )
            .await
            .unwrap();
        assert_eq!(same.matched_count, 1);
        assert_eq!(same.modified_count, 0);

        let changed = store
            .update_one(
                Collection::Songs,
                &Filter::external_id("s1"),
                Update::Set(doc(json!({"genre": "Jazz"}))),
            )
            .await
            .unwrap();
        assert_eq!(changed.modified_count, 1);
    }

    #[tokio::test]
    async fn set_keeps_unmentioned_fields() {
        let store = MemoryStore::new();
        store
            .insert_one(
                Collection::Songs,
                doc(json!({"id": "s1", "title": "A", "artist": "B"})),
            )
            .await
            .unwrap();
        store
            .update_one(
                Collection::Songs,
                &Filter::external_id("s1"),
                Update::Set(doc(json!({"title": "C"}))),
            )
            .await
            .unwrap();

        let song = store
            .find_one(Collection::Songs, &Filter::external_id("s1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(song["title"], json!("C"));
        assert_eq!(song["artist"], json!("B"));
    }

    #[tokio::test]
    async fn update_without_match_is_not_an_error() {
        let store = MemoryStore::new();
        let outcome = store
            .update_one(
                Collection::Playlists,
                &Filter::external_id("missing"),
                Update::Push {
                    field: "songs".to_string(),
                    value: json!({"id": "s1"}),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.matched_count, 0);
        assert_eq!(outcome.modified_count, 0);
    }

    #[tokio::test]
    async fn push_and_pull_embedded_songs() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Playlists, doc(json!({"id": "p1"})))
            .await
            .unwrap();

        for song in ["s1", "s2", "s1"] {
            store
                .update_one(
                    Collection::Playlists,
                    &Filter::external_id("p1"),
                    Update::Push {
                        field: "songs".to_string(),
                        value: json!({"id": song}),
                    },
                )
                .await
                .unwrap();
        }

        let pulled = store
            .update_one(
                Collection::Playlists,
                &Filter::external_id("p1"),
                Update::PullById {
                    field: "songs".to_string(),
                    id: "s1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(pulled.modified_count, 1);

        let playlist = store
            .find_one(Collection::Playlists, &Filter::external_id("p1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(playlist["songs"], json!([{"id": "s2"}]));

        let again = store
            .update_one(
                Collection::Playlists,
                &Filter::external_id("p1"),
                Update::PullById {
                    field: "songs".to_string(),
                    id: "s1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(again.modified_count, 0);
    }

    #[tokio::test]
    async fn push_onto_scalar_field_fails() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Playlists, doc(json!({"id": "p1", "songs": "oops"})))
            .await
            .unwrap();

        let result = store
            .update_one(
                Collection::Playlists,
                &Filter::external_id("p1"),
                Update::Push {
                    field: "songs".to_string(),
                    value: json!({"id": "s1"}),
                },
            )
            .await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn delete_removes_only_first_match() {
        let store = MemoryStore::new();
        store
            .insert_many(
                Collection::LikedSongs,
                vec![doc(json!({"id": "s1"})), doc(json!({"id": "s1"}))],
            )
            .await
            .unwrap();

        let first = store
            .delete_one(Collection::LikedSongs, &Filter::external_id("s1"))
            .await
            .unwrap();
        assert_eq!(first.deleted_count, 1);
        assert_eq!(store.count(Collection::LikedSongs, &Filter::All).await.unwrap(), 1);

        let missing = store
            .delete_one(Collection::LikedSongs, &Filter::external_id("nope"))
            .await
            .unwrap();
        assert_eq!(missing.deleted_count, 0);
    }

    #[tokio::test]
    async fn duplicate_primary_key_is_rejected() {
        let store = MemoryStore::new();
        let key = PrimaryKey::generate().to_hex();
        store
            .insert_one(Collection::Users, doc(json!({"_id": key.clone()})))
            .await
            .unwrap();

        let result = store
            .insert_one(Collection::Users, doc(json!({"_id": key})))
            .await;
        assert!(result.is_err());
    }
}
