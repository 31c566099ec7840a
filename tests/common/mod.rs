//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockall::mock;
use std::path::Path;
use std::sync::Arc;

use lost_and_found::backend::memory::{MemoryAuthProvider, MemoryBlobStorage, MemoryDocumentStore};
use lost_and_found::backend::DocumentStore;
use lost_and_found::config::AppConfig;
use lost_and_found::error::Result;
use lost_and_found::models::{CollectionStats, Item, ItemQuery, ItemStatus, ItemType, User};
use lost_and_found::{ItemRepository, RemoteRepository};

mock! {
    pub Repo {}

    #[async_trait]
    impl ItemRepository for Repo {
        async fn sign_in_with_token(&self, id_token: &str) -> Result<String>;
        async fn sign_out(&self) -> Result<()>;
        async fn current_user_id(&self) -> Option<String>;
        async fn create_user(&self, user: User) -> Result<String>;
        async fn get_user(&self, user_id: &str) -> Result<Option<User>>;
        async fn update_user(&self, user: User) -> Result<()>;
        async fn add_item(&self, item: Item) -> Result<String>;
        async fn get_items(&self, query: &ItemQuery) -> Result<Vec<Item>>;
        async fn get_item(&self, item_id: &str) -> Result<Option<Item>>;
        async fn update_item(&self, item: Item) -> Result<()>;
        async fn delete_item(&self, item_id: &str) -> Result<()>;
        async fn search_items(&self, query: &str) -> Result<Vec<Item>>;
        async fn upload_image(&self, image_uri: &str, item_id: &str) -> Result<String>;
        async fn upload_images(&self, image_uris: &[String], item_id: &str) -> Result<Vec<String>>;
        async fn test_connection(&self) -> Result<bool>;
        async fn collection_stats(&self) -> Result<CollectionStats>;
        async fn check_optimized_queries(&self) -> Result<bool>;
    }
}

/// In-memory services wired into a repository
pub struct TestBackend {
    pub documents: Arc<MemoryDocumentStore>,
    pub auth: Arc<MemoryAuthProvider>,
    pub blobs: Arc<MemoryBlobStorage>,
    pub repository: Arc<RemoteRepository>,
}

impl TestBackend {
    pub fn new() -> Self {
        let documents = Arc::new(MemoryDocumentStore::new());
        let auth = Arc::new(MemoryAuthProvider::new());
        let blobs = Arc::new(MemoryBlobStorage::new("lost-and-found-test"));
        let repository = Arc::new(RemoteRepository::new(
            documents.clone(),
            auth.clone(),
            blobs.clone(),
            AppConfig::default().repository,
        ));
        Self {
            documents,
            auth,
            blobs,
            repository,
        }
    }

    /// Store `item` verbatim, bypassing the repository's stamping
    pub async fn seed(&self, item: &Item) {
        self.documents
            .set("items", &item.id, serde_json::to_value(item).unwrap())
            .await
            .unwrap();
    }

    pub async fn stored_item(&self, id: &str) -> Item {
        let doc = self.documents.get("items", id).await.unwrap().expect("item stored");
        serde_json::from_value(doc.data).unwrap()
    }
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    Utc::now() - Duration::minutes(minutes)
}

pub fn item(id: &str, title: &str, item_type: ItemType, status: ItemStatus) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} reported on campus"),
        category: "Other".to_string(),
        item_type,
        status,
        reporter_name: "Meera".to_string(),
        reporter_email: "meera@iiitdm.ac.in".to_string(),
        ..Item::default()
    }
}

/// Write a small fake JPEG and return its path
pub fn write_image(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();
    path.to_string_lossy().into_owned()
}
