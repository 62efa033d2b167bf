//! Startup seed loader
//!
//! Fills empty collections from a bundled JSON snapshot with top-level keys
//! `songs`, `users`, `likedSongs` and `playlists`. A collection that already
//! holds documents is never touched.

use serde::Deserialize;
use serde_json::Value;
use songhive_common::credentials::{protect_password, PasswordMode};
use songhive_common::{Collection, Document, DocumentStore, Filter, Result};
use std::path::Path;
use tracing::info;

/// Parsed seed snapshot; a missing key leaves that collection alone
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub songs: Option<Vec<Document>>,
    #[serde(default)]
    pub users: Option<Vec<Document>>,
    #[serde(default, rename = "likedSongs")]
    pub liked_songs: Option<Vec<Document>>,
    #[serde(default)]
    pub playlists: Option<Vec<Document>>,
}

impl SeedData {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn take(&mut self, collection: Collection) -> Option<Vec<Document>> {
        match collection {
            Collection::Songs => self.songs.take(),
            Collection::Users => self.users.take(),
            Collection::LikedSongs => self.liked_songs.take(),
            Collection::Playlists => self.playlists.take(),
        }
    }
}

/// What happened to one collection during seeding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted(u64),
    /// Collection already had documents
    AlreadyPopulated,
    /// Seed file has no (or an empty) array for this collection
    NotInSeed,
}

#[derive(Debug, Default)]
pub struct SeedReport {
    pub results: Vec<(Collection, SeedOutcome)>,
}

impl SeedReport {
    pub fn outcome(&self, collection: Collection) -> Option<SeedOutcome> {
        self.results
            .iter()
            .find(|(c, _)| *c == collection)
            .map(|(_, outcome)| *outcome)
    }

    pub fn total_inserted(&self) -> u64 {
        self.results
            .iter()
            .map(|(_, outcome)| match outcome {
                SeedOutcome::Inserted(n) => *n,
                _ => 0,
            })
            .sum()
    }
}

/// Insert seed documents into every empty collection
///
/// User passwords are protected according to `password_mode` so seeded
/// accounts can log in the same way as accounts created over the API.
pub async fn seed_store(
    store: &dyn DocumentStore,
    mut data: SeedData,
    password_mode: PasswordMode,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for collection in Collection::ALL {
        let docs = match data.take(collection) {
            Some(docs) if !docs.is_empty() => docs,
            _ => {
                report.results.push((collection, SeedOutcome::NotInSeed));
                continue;
            }
        };

        if store.count(collection, &Filter::All).await? > 0 {
            report
                .results
                .push((collection, SeedOutcome::AlreadyPopulated));
            continue;
        }

        let docs = if collection == Collection::Users {
            docs.into_iter()
                .map(|user| protect_user(user, password_mode))
                .collect::<Result<Vec<_>>>()?
        } else {
            docs
        };

        let inserted = store.insert_many(collection, docs).await?;
        info!("Initialized {} collection with {} documents", collection, inserted);
        report
            .results
            .push((collection, SeedOutcome::Inserted(inserted)));
    }

    Ok(report)
}

fn protect_user(mut user: Document, mode: PasswordMode) -> Result<Document> {
    if let Some(Value::String(password)) = user.get("password") {
        let protected = protect_password(password, mode)?;
        user.insert("password".to_string(), Value::String(protected));
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_parse_as_none() {
        let data = SeedData::from_json_str(r#"{"songs": [{"id": "s1"}]}"#).unwrap();
        assert_eq!(data.songs.map(|s| s.len()), Some(1));
        assert!(data.users.is_none());
        assert!(data.liked_songs.is_none());
    }

    #[test]
    fn liked_songs_key_is_camel_case() {
        let data =
            SeedData::from_json_str(r#"{"likedSongs": [{"id": "s1", "userId": "u1"}]}"#).unwrap();
        assert!(data.liked_songs.is_some());
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(SeedData::from_json_str(r#"{"songs": [1, 2]}"#).is_err());
    }

    #[test]
    fn plaintext_mode_keeps_passwords() {
        let user = serde_json::json!({"id": "u1", "password": "pw"})
            .as_object()
            .cloned()
            .unwrap();
        let protected = protect_user(user, PasswordMode::Plaintext).unwrap();
        assert_eq!(protected["password"], "pw");
    }
}
