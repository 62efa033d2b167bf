//! MongoDB adapter for the document store port

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document as BsonDocument};
use mongodb::{Client, Database};
use serde_json::Value;
use tracing::{debug, info};

use super::{
    Collection, DeleteOutcome, DocumentStore, Filter, InsertOutcome, Update, UpdateOutcome,
};
use crate::models::{Document, EXTERNAL_ID_FIELD, PRIMARY_KEY_FIELD};
use crate::{Error, Result};

/// Document store backed by one MongoDB database
///
/// The driver pools connections internally; cloning is cheap.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect to `uri` and select `database`, verifying the server answers
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;
        info!("Connected to MongoDB database '{}'", database);
        Ok(Self { db })
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<BsonDocument> {
        self.db.collection(collection.name())
    }
}

/// Translate a filter into a MongoDB query document
pub(crate) fn filter_to_bson(filter: &Filter) -> Result<BsonDocument> {
    Ok(match filter {
        Filter::All => BsonDocument::new(),
        Filter::FieldsEqual(pairs) => pairs
            .iter()
            .map(|(name, value)| Ok((name.clone(), json_to_bson(value.clone())?)))
            .collect::<Result<BsonDocument>>()?,
        Filter::PrimaryKey(key) => doc! { PRIMARY_KEY_FIELD: key.object_id() },
        Filter::ContainsAny { fields, needle } => {
            let pattern = regex::escape(needle);
            let clauses: Vec<BsonDocument> = fields
                .iter()
                .map(|name| {
                    let mut clause = BsonDocument::new();
                    clause.insert(
                        name.clone(),
                        doc! { "$regex": pattern.clone(), "$options": "i" },
                    );
                    clause
                })
                .collect();

            match clauses.len() {
                1 => clauses.into_iter().next().unwrap_or_default(),
                _ => doc! { "$or": clauses },
            }
        }
    })
}

/// Translate an update into a MongoDB update document
pub(crate) fn update_to_bson(update: Update) -> Result<BsonDocument> {
    Ok(match update {
        Update::Set(fields) => doc! { "$set": json_to_bson_document(fields)? },
        Update::Push { field, value } => {
            let mut push = BsonDocument::new();
            push.insert(field, json_to_bson(value)?);
            doc! { "$push": push }
        }
        Update::PullById { field, id } => {
            let mut pull = BsonDocument::new();
            pull.insert(field, doc! { EXTERNAL_ID_FIELD: id });
            doc! { "$pull": pull }
        }
    })
}

fn json_to_bson(value: Value) -> Result<Bson> {
    bson::to_bson(&value).map_err(|e| Error::Serialization(e.to_string()))
}

pub(crate) fn json_to_bson_document(doc: Document) -> Result<BsonDocument> {
    bson::to_document(&doc).map_err(|e| Error::Serialization(e.to_string()))
}

/// Render a stored document for clients: `_id` always becomes a plain string
pub(crate) fn bson_to_json_document(mut doc: BsonDocument) -> Document {
    let key = doc.remove(PRIMARY_KEY_FIELD).map(render_key);

    let mut json = match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Document::new(),
    };
    if let Some(key) = key {
        json.insert(PRIMARY_KEY_FIELD.to_string(), Value::String(key));
    }
    json
}

fn render_key(key: Bson) -> String {
    match key {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
        let cursor = self.collection(collection).find(filter_to_bson(filter)?).await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        debug!("find on {} returned {} documents", collection, docs.len());
        Ok(docs.into_iter().map(bson_to_json_document).collect())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let found = self
            .collection(collection)
            .find_one(filter_to_bson(filter)?)
            .await?;
        Ok(found.map(bson_to_json_document))
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOutcome> {
        let result = self
            .collection(collection)
            .insert_one(json_to_bson_document(doc)?)
            .await?;
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: render_key(result.inserted_id),
        })
    }

    async fn insert_many(&self, collection: Collection, docs: Vec<Document>) -> Result<u64> {
        let docs = docs
            .into_iter()
            .map(json_to_bson_document)
            .collect::<Result<Vec<_>>>()?;
        let result = self.collection(collection).insert_many(docs).await?;
        Ok(result.inserted_ids.len() as u64)
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        Ok(self
            .collection(collection)
            .count_documents(filter_to_bson(filter)?)
            .await?)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
    ) -> Result<UpdateOutcome> {
        let result = self
            .collection(collection)
            .update_one(filter_to_bson(filter)?, update_to_bson(update)?)
            .await?;
        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteOutcome> {
        let result = self
            .collection(collection)
            .delete_one(filter_to_bson(filter)?)
            .await?;
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }
}
