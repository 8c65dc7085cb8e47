use async_trait::async_trait;
use mongodb::bson::{doc, from_document, Bson, Document};
use mongodb::{Client, Collection, Database};
use serde_json::Value;

use super::document_store::{DocumentFields, DocumentStore};
use crate::errors::Result;

/// Rewrites stored fields into a document MongoDB will accept whatever the gateway sent.
///
/// Integers beyond `i64` are kept as decimal strings, a leading `$` in a key becomes
/// `＄` and `.` in a key becomes `．`.
pub fn to_bson_document(fields: &DocumentFields) -> Document {
    fields
        .iter()
        .map(|(key, value)| (escape_key(key), to_bson(value)))
        .collect()
}

fn to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Bson::Int64(i),
            (None, Some(f)) if n.is_f64() => Bson::Double(f),
            _ => Bson::String(n.to_string()),
        },
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(to_bson).collect()),
        Value::Object(map) => Bson::Document(to_bson_document(map)),
    }
}

fn escape_key(key: &str) -> String {
    let escaped = key.replace('.', "\u{ff0e}");
    if escaped.starts_with('$') {
        format!("\u{ff04}{}", &escaped[1..])
    } else {
        escaped
    }
}

/// MongoDB-backed store. Document keys are stored as `_id`.
#[derive(Clone)]
pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    pub fn new(db: Database) -> Self {
        MongoDocumentStore { db }
    }

    pub async fn connect(database_url: &str, database_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(database_url).await?;
        Ok(Self::new(client.database(database_name)))
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn upsert_merge(
        &self,
        collection: &str,
        key: &str,
        mut fields: DocumentFields,
        stamp_field: &str,
    ) -> Result<()> {
        // $set and $currentDate may not name the same path.
        fields.remove(stamp_field);
        fields.remove("_id");

        let mut stamp = Document::new();
        stamp.insert(stamp_field, true);

        let update = doc! {
            "$set": to_bson_document(&fields),
            "$currentDate": stamp,
        };

        self.collection(collection)
            .update_one(doc! { "_id": key }, update)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<DocumentFields>> {
        match self.collection(collection).find_one(doc! { "_id": key }).await? {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
