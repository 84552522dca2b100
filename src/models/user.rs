use mongodb::bson::{self, Bson, Document};
use serde_json::{Map, Value};

/// A user profile as written to the store.
///
/// `uid` and `email` come from verified claims; `extra` is whatever the client
/// sent. Client keys are never checked against a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDocument {
    pub uid: String,
    pub email: String,
    pub extra: Map<String, Value>,
}

impl UserDocument {
    pub fn new(uid: impl Into<String>, email: impl Into<String>, extra: Map<String, Value>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            extra,
        }
    }

    /// Flattens into the map persisted with `$set`.
    ///
    /// Client fields overlay `email` (and anything else), but `uid` is always
    /// the verified subject id so the lookup key and the stored field agree.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("uid".to_string(), Value::String(self.uid.clone()));
        fields.insert("email".to_string(), Value::String(self.email));
        fields.extend(self.extra);
        fields.insert("uid".to_string(), Value::String(self.uid));
        fields
    }

    pub fn into_bson(self) -> Result<Document, bson::ser::Error> {
        bson::to_document(&self.into_fields())
    }
}

/// Renders a stored document as plain JSON with `_id` as a string.
pub fn document_to_json(mut doc: Document) -> Value {
    if let Some(id) = doc.get("_id").cloned() {
        let id = match id {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s,
            other => other.to_string(),
        };
        doc.insert("_id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}
