//! In-memory backend services
//!
//! Used by the tests and by local runs without hosted credentials. They keep
//! the hosted services' observable contracts: unordered `list`, ordered
//! queries that need a declared composite index, download URLs for blobs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::{AuthProvider, AuthSession, BlobStorage, Direction, Document, DocumentStore, IdentityProvider, OrderedQuery};
use crate::error::{LostFoundError, Result};

/// Document database held in memory
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    indexes: RwLock<HashSet<(String, String, String)>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    /// Empty store with no composite indexes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a composite index so ordered queries on the pair succeed
    pub async fn create_index(&self, collection: &str, field: &str, order_by: &str) {
        self.indexes
            .write()
            .await
            .insert((collection.to_string(), field.to_string(), order_by.to_string()));
    }

    /// Simulate losing connectivity; every call fails while offline
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Number of successful `set` calls so far
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(LostFoundError::Backend("backend unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        self.check_online()?;
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        debug!(collection, id, "Document written");
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.check_online()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.check_online()?;
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn list(&self, collection: &str, limit: usize) -> Result<Vec<Document>> {
        self.check_online()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .take(limit)
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query(&self, collection: &str, query: &OrderedQuery) -> Result<Vec<Document>> {
        self.check_online()?;
        let key = (collection.to_string(), query.field.clone(), query.order_by.clone());
        if !self.indexes.read().await.contains(&key) {
            return Err(LostFoundError::IndexRequired(format!(
                "{collection}: {} == ? ORDER BY {}",
                query.field, query.order_by
            )));
        }

        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| data.get(&query.field) == Some(&query.equals))
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        docs.sort_by(|a, b| {
            let ordering = compare_values(a.data.get(&query.order_by), b.data.get(&query.order_by));
            match query.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
        docs.truncate(query.limit);
        Ok(docs)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.check_online()?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len))
    }
}

/// Timestamps are stored as RFC 3339 strings with variable precision, so they
/// are compared as instants rather than as text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        },
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Authentication service held in memory
///
/// Tokens must be registered before they can be exchanged.
#[derive(Debug, Default)]
pub struct MemoryAuthProvider {
    tokens: RwLock<HashMap<String, AuthSession>>,
    current: Mutex<Option<String>>,
    sign_in_attempts: AtomicUsize,
}

impl MemoryAuthProvider {
    /// No registered tokens, nobody signed in
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as an assertion for `uid`
    pub async fn register_token(&self, token: &str, uid: &str, email: Option<&str>) {
        self.tokens.write().await.insert(
            token.to_string(),
            AuthSession {
                uid: uid.to_string(),
                email: email.map(ToString::to_string),
            },
        );
    }

    /// Number of token exchanges attempted
    #[must_use]
    pub fn sign_in_attempts(&self) -> usize {
        self.sign_in_attempts.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in_with_id_token(&self, id_token: &str) -> Result<AuthSession> {
        self.sign_in_attempts.fetch_add(1, AtomicOrdering::SeqCst);
        let session = self
            .tokens
            .read()
            .await
            .get(id_token)
            .cloned()
            .ok_or_else(|| LostFoundError::Backend("The supplied auth credential is malformed or has expired".to_string()))?;
        *self.current.lock().await = Some(session.uid.clone());
        Ok(session)
    }

    async fn current_user_id(&self) -> Option<String> {
        self.current.lock().await.clone()
    }

    async fn sign_out(&self) -> Result<()> {
        *self.current.lock().await = None;
        Ok(())
    }
}

/// Blob storage held in memory
#[derive(Debug)]
pub struct MemoryBlobStorage {
    bucket: String,
    blobs: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryBlobStorage {
    /// Empty bucket
    #[must_use]
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Paths of every stored blob, sorted
    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.blobs.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Bytes stored at `path`
    pub async fn bytes(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.read().await.get(path).map(|(bytes, _)| bytes.clone())
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        self.blobs
            .write()
            .await
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(format!("memory://{}/{path}", self.bucket))
    }
}

/// Identity provider held in memory
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    signed_in: AtomicBool,
}

impl MemoryIdentityProvider {
    /// Nobody chosen yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the user picked an account
    pub fn choose_account(&self) {
        self.signed_in.store(true, AtomicOrdering::SeqCst);
    }

    /// Whether an account is currently chosen
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.signed_in.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_out(&self) -> Result<()> {
        self.signed_in.store(false, AtomicOrdering::SeqCst);
        Ok(())
    }
}
