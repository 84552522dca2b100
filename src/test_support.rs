//! In-memory stand-ins for the identity provider and MongoDB.

use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{
    database::{StoreError, UserStore},
    models::Claims,
    services::{TokenVerifier, VerifyError},
};

pub fn claims_for(uid: &str, email: Option<&str>) -> Claims {
    let provider_fields: Map<String, Value> = json!({
        "sub": uid,
        "iss": "https://securetoken.google.com/profile-store-test",
        "aud": "profile-store-test",
        "email_verified": email.is_some(),
    })
    .as_object()
    .cloned()
    .unwrap_or_default();

    Claims {
        uid: uid.to_string(),
        email: email.map(str::to_string),
        provider_fields,
    }
}

/// Applies `$set`-with-upsert semantics to a map of documents.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, Document>>,
    calls: AtomicUsize,
}

impl MemoryUserStore {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn upsert_user(&self, uid: &str, fields: Document) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        let user = users
            .entry(uid.to_string())
            .or_insert_with(|| doc! { "_id": ObjectId::new(), "uid": uid });
        for (key, value) in fields {
            user.insert(key, value);
        }
        Ok(())
    }

    async fn find_user(&self, uid: &str) -> Result<Option<Document>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.lock().unwrap().get(uid).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Store whose every call fails as if the database were down.
pub struct FailingStore;

fn connection_refused() -> StoreError {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    StoreError::from(mongodb::error::Error::from(io))
}

#[async_trait]
impl UserStore for FailingStore {
    async fn upsert_user(&self, _uid: &str, _fields: Document) -> Result<(), StoreError> {
        Err(connection_refused())
    }

    async fn find_user(&self, _uid: &str) -> Result<Option<Document>, StoreError> {
        Err(connection_refused())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(connection_refused())
    }
}

/// Accepts only the tokens it was given.
#[derive(Default)]
pub struct StaticVerifier {
    tokens: HashMap<String, Claims>,
    calls: AtomicUsize,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, claims: Claims) -> Self {
        self.tokens.insert(token.to_string(), claims);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| VerifyError::Jwt(jsonwebtoken::errors::ErrorKind::InvalidToken.into()))
    }
}
