//! Record types for the four SongHive collections
//!
//! Collections are schema-less: every known field holds whatever JSON value
//! the client sent, and anything else is kept in `extra`, all stored
//! verbatim. `None` means the key was absent; an explicit `null` is
//! `Some(Value::Null)`. Serializing a record omits absent fields, so the same
//! type doubles as a `$set` patch.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A stored document as exchanged with the store and with clients.
///
/// The storage primary key, when present, is always the string field `_id`.
pub type Document = Map<String, Value>;

/// Name of the primary key field in every document
pub const PRIMARY_KEY_FIELD: &str = "_id";

/// Name of the external identifier field in every document
pub const EXTERNAL_ID_FIELD: &str = "id";

/// Song in the `Songs` collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub artist: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub album: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub genre: Option<Value>,
    #[serde(rename = "audioUrl", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User in the `Users` collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub password: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Denormalized song copy liked by one user (`LikedSongs` collection)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LikedSong {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub artist: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub album: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub genre: Option<Value>,
    #[serde(rename = "audioUrl", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<Value>,
    #[serde(rename = "userId", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LikedSong {
    /// Fields a liked song must carry before it can be stored
    pub const REQUIRED_FIELDS: [&'static str; 6] =
        ["id", "title", "artist", "genre", "audioUrl", "userId"];

    /// Names of required fields absent from the body, in declaration order
    ///
    /// An explicit `null` counts as present.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.id.is_some(),
            self.title.is_some(),
            self.artist.is_some(),
            self.genre.is_some(),
            self.audio_url.is_some(),
            self.user_id.is_some(),
        ];
        Self::REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, set)| !set)
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Playlist with its embedded song copies (`Playlists` collection)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "playlistName", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(rename = "userId", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    /// Embedded song copies; never carry the source collection's `_id`
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub songs: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keep an explicit `null` distinct from an absent key
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Conversion between typed records and raw documents
pub trait Record: Serialize + DeserializeOwned {
    /// Serialize into a document, omitting unset fields
    fn into_document(self) -> Result<Document> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::Serialization(format!(
                "record serialized to non-object: {}",
                other
            ))),
        }
    }

    /// Serialize into a `$set` patch: identity fields are never overwritten
    fn into_patch(self) -> Result<Document> {
        let mut doc = self.into_document()?;
        doc.remove(PRIMARY_KEY_FIELD);
        doc.remove(EXTERNAL_ID_FIELD);
        Ok(doc)
    }
}

impl Record for Song {}
impl Record for User {}
impl Record for LikedSong {}
impl Record for Playlist {}
