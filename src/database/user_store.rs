use async_trait::async_trait;
use mongodb::{
    bson::{doc, Document},
    Collection,
};
use thiserror::Error;

use super::MongoDB;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Persistence for user profiles, one document per subject id.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Sets `fields` on the document whose `uid` matches, creating it if absent.
    /// Fields not named in `fields` are left as they are.
    async fn upsert_user(&self, uid: &str, fields: Document) -> Result<(), StoreError>;

    async fn find_user(&self, uid: &str) -> Result<Option<Document>, StoreError>;

    /// Checks that the backing database still answers.
    async fn ping(&self) -> Result<(), StoreError>;
}

pub struct MongoUserStore {
    db: MongoDB,
    users: Collection<Document>,
}

impl MongoUserStore {
    pub fn new(db: &MongoDB, collection: &str) -> Self {
        Self {
            db: db.clone(),
            users: db.collection(collection),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn upsert_user(&self, uid: &str, fields: Document) -> Result<(), StoreError> {
        let result = self
            .users
            .update_one(doc! { "uid": uid }, doc! { "$set": fields })
            .upsert(true)
            .await?;

        if result.upserted_id.is_some() {
            log::debug!("Created user document for {}", uid);
        } else {
            log::debug!("Updated user document for {} (modified: {})", uid, result.modified_count);
        }

        Ok(())
    }

    async fn find_user(&self, uid: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.users.find_one(doc! { "uid": uid }).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await
    }
}
