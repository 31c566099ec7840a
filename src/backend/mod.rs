//! Seams onto the managed backend services
//!
//! The repository talks to three hosted services: a schema-less document
//! database, an authentication service and blob storage. The host identity
//! provider (the account picker that yields an id token) is a fourth seam used
//! only by sign-in. Each is an async trait so the hosted SDK bindings and the
//! in-memory implementations in [`memory`] are interchangeable.

/// In-memory backends for tests and offline runs
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A raw document: its id and its schema-less body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id within its collection
    pub id: String,
    /// Raw document body
    pub data: Value,
}

/// Sort direction for ordered queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// A server-side filtered and ordered query
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedQuery {
    /// Field compared for equality
    pub field: String,
    /// Value the field must equal
    pub equals: Value,
    /// Field to order by
    pub order_by: String,
    /// Sort direction
    pub direction: Direction,
    /// Maximum documents returned
    pub limit: usize,
}

/// Schema-less document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create or overwrite `collection/id`
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    /// Read `collection/id`, `None` when absent
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Delete `collection/id`; deleting a missing document succeeds
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Fetch up to `limit` documents in unspecified order
    async fn list(&self, collection: &str, limit: usize) -> Result<Vec<Document>>;

    /// Filtered and ordered fetch; fails with `IndexRequired` when the backend
    /// has no composite index for the field pair
    async fn query(&self, collection: &str, query: &OrderedQuery) -> Result<Vec<Document>>;

    /// Number of documents in the collection
    async fn count(&self, collection: &str) -> Result<usize>;
}

/// An authenticated backend session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Backend user id
    pub uid: String,
    /// Email asserted by the identity token, if any
    pub email: Option<String>,
}

/// Backend authentication service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange an identity-provider token for a backend session
    async fn sign_in_with_id_token(&self, id_token: &str) -> Result<AuthSession>;

    /// Id of the signed-in user, if any
    async fn current_user_id(&self) -> Option<String>;

    /// End the backend session
    async fn sign_out(&self) -> Result<()>;
}

/// Blob storage
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `bytes` at `path` and return its download URL
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// An account chosen in the host identity provider
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityAccount {
    /// Account email
    pub email: Option<String>,
    /// Token to exchange with the backend
    pub id_token: Option<String>,
    /// Display name
    pub display_name: Option<String>,
}

/// Host identity provider (the account picker)
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Forget the chosen account
    async fn sign_out(&self) -> Result<()>;
}
