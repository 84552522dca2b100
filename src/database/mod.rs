pub mod user_store;

pub use user_store::*;

use mongodb::{bson::doc, options::IndexOptions, Client, Collection, Database, IndexModel};
use std::time::Duration;

const DEFAULT_DATABASE: &str = "profile_store";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    /// Connects, verifies the server answers, and returns the handle.
    ///
    /// The database is the one named in the URI path, then `fallback_db`,
    /// then `profile_store`.
    pub async fn new(uri: &str, fallback_db: Option<&str>) -> Result<Self, StoreError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let db_name = client_options
            .default_database
            .clone()
            .or_else(|| fallback_db.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        let mongo = Self { db };
        mongo.ping().await?;
        log::info!("✅ MongoDB reachable, using database '{}'", db_name);

        Ok(mongo)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Creates the indexes the user store relies on.
    ///
    /// The unique `uid` index is what keeps concurrent upserts for the same
    /// subject from producing two documents.
    pub async fn ensure_indexes(&self, users_collection: &str) -> Result<(), StoreError> {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(users_collection);

        let uid_index = IndexModel::builder()
            .keys(doc! { "uid": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        users.create_index(uid_index).await?;
        log::info!("   ✅ Index ready: {}(uid) unique", users_collection);

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}
