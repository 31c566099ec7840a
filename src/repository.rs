use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::{AuthProvider, BlobStorage, Direction, Document, DocumentStore, OrderedQuery};
use crate::config::RepositoryConfig;
use crate::error::{LostFoundError, Result};
use crate::logging::OperationTimer;
use crate::metrics::RepositoryMetrics;
use crate::models::{CollectionStats, Item, ItemQuery, ItemStatus, User};

/// Everything the view-state holders need from the backend
///
/// Every call returns a `Result`; nothing panics across this boundary.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Exchange an identity token for a backend session, returning the user id
    async fn sign_in_with_token(&self, id_token: &str) -> Result<String>;
    /// End the backend session
    async fn sign_out(&self) -> Result<()>;
    /// Id of the signed-in user, if any
    async fn current_user_id(&self) -> Option<String>;

    /// Store a new profile, assigning an id when it has none
    async fn create_user(&self, user: User) -> Result<String>;
    /// Read a profile
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;
    /// Overwrite a profile
    async fn update_user(&self, user: User) -> Result<()>;

    /// Store a new active item, assigning an id when it has none
    async fn add_item(&self, item: Item) -> Result<String>;
    /// Bounded fetch, filtered and sorted in memory
    async fn get_items(&self, query: &ItemQuery) -> Result<Vec<Item>>;
    /// Read one item
    async fn get_item(&self, item_id: &str) -> Result<Option<Item>>;
    /// Overwrite an item, restamping `updated_at`
    async fn update_item(&self, item: Item) -> Result<()>;
    /// Remove an item
    async fn delete_item(&self, item_id: &str) -> Result<()>;
    /// Case-insensitive search over active items
    async fn search_items(&self, query: &str) -> Result<Vec<Item>>;

    /// Upload one local image for `item_id`, returning its download URL
    async fn upload_image(&self, image_uri: &str, item_id: &str) -> Result<String>;
    /// Upload images one after another; failures are skipped
    async fn upload_images(&self, image_uris: &[String], item_id: &str) -> Result<Vec<String>>;

    /// Whether the items collection is reachable
    async fn test_connection(&self) -> Result<bool>;
    /// Collection sizes
    async fn collection_stats(&self) -> Result<CollectionStats>;
    /// Whether the status/createdAt composite index exists
    async fn check_optimized_queries(&self) -> Result<bool>;
}

/// [`ItemRepository`] over the hosted document database, auth and blob storage
pub struct RemoteRepository {
    documents: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
    blobs: Arc<dyn BlobStorage>,
    config: RepositoryConfig,
    metrics: RepositoryMetrics,
}

impl RemoteRepository {
    /// Wire the repository to its backend services
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        blobs: Arc<dyn BlobStorage>,
        config: RepositoryConfig,
    ) -> Self {
        info!(
            users = %config.users_collection,
            items = %config.items_collection,
            "Remote repository initialized"
        );
        Self {
            documents,
            auth,
            blobs,
            config,
            metrics: RepositoryMetrics::default(),
        }
    }

    fn finish<T>(&self, operation: &'static str, timer: OperationTimer, result: &Result<T>) {
        self.metrics.record_operation(operation, timer.elapsed(), result.is_ok());
        if let Err(e) = result {
            error!(operation, error = %e, "Repository call failed");
        }
        timer.finish();
    }

    fn decode_item(doc: Document) -> Result<Item> {
        let mut item: Item = serde_json::from_value(doc.data).map_err(|source| LostFoundError::Decode {
            id: doc.id.clone(),
            source,
        })?;
        item.id = doc.id;
        Ok(item)
    }

    fn decode_user(doc: Document) -> Result<User> {
        let mut user: User = serde_json::from_value(doc.data).map_err(|source| LostFoundError::Decode {
            id: doc.id.clone(),
            source,
        })?;
        user.id = doc.id;
        Ok(user)
    }

    /// Undecodable documents are logged and left out of listings
    fn decode_items(docs: Vec<Document>) -> Vec<Item> {
        docs.into_iter()
            .filter_map(|doc| match Self::decode_item(doc) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable item document");
                    None
                },
            })
            .collect()
    }

    async fn fetch_items(&self, limit: usize) -> Result<(usize, Vec<Item>)> {
        let docs = self.documents.list(&self.config.items_collection, limit).await?;
        let fetched = docs.len();
        for doc in &docs {
            debug!(id = %doc.id, data = %doc.data, "Raw item document");
        }
        Ok((fetched, Self::decode_items(docs)))
    }

    async fn log_empty_listing(&self, query: &ItemQuery) {
        warn!(
            status = ?query.status,
            item_type = ?query.item_type,
            category = ?query.category,
            "No items left after filtering; the collection may be empty or no document matches"
        );

        match self.documents.list(&self.config.items_collection, 5).await {
            Ok(sample) => {
                warn!("Raw collection access found {} documents", sample.len());
                for doc in sample {
                    warn!(id = %doc.id, data = %doc.data, "Raw item document");
                }
            },
            Err(e) => error!(error = %e, "Failed to access raw collection"),
        }
    }

    fn image_path(&self, item_id: &str) -> String {
        format!("{}/{item_id}/{}.jpg", self.config.items_collection, Uuid::new_v4())
    }
}

#[async_trait]
impl ItemRepository for RemoteRepository {
    async fn sign_in_with_token(&self, id_token: &str) -> Result<String> {
        debug!("Exchanging identity token for a backend session");
        let timer = OperationTimer::new("sign_in_with_token");
        let result = self.auth.sign_in_with_id_token(id_token).await.map(|session| session.uid);
        self.finish("sign_in_with_token", timer, &result);
        if let Ok(uid) = &result {
            info!(uid = %uid, "Signed in");
        }
        result
    }

    async fn sign_out(&self) -> Result<()> {
        let timer = OperationTimer::new("sign_out");
        let result = self.auth.sign_out().await;
        self.finish("sign_out", timer, &result);
        result
    }

    async fn current_user_id(&self) -> Option<String> {
        let uid = self.auth.current_user_id().await;
        debug!(?uid, "Current user");
        uid
    }

    async fn create_user(&self, user: User) -> Result<String> {
        debug!(name = %user.name, "Creating user");
        let timer = OperationTimer::new("create_user");
        let result = async {
            let user_id = if user.id.is_empty() { Uuid::new_v4().to_string() } else { user.id.clone() };
            let user = User { id: user_id.clone(), ..user };
            let data = serde_json::to_value(&user)?;
            self.documents.set(&self.config.users_collection, &user_id, data).await?;
            Ok::<_, LostFoundError>(user_id)
        }
        .await;
        self.finish("create_user", timer, &result);
        result
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        debug!(user_id, "Fetching user");
        let timer = OperationTimer::new("get_user");
        let result = async {
            match self.documents.get(&self.config.users_collection, user_id).await? {
                Some(doc) => Self::decode_user(doc).map(Some),
                None => Ok(None),
            }
        }
        .await;
        self.finish("get_user", timer, &result);
        result
    }

    async fn update_user(&self, user: User) -> Result<()> {
        debug!(user_id = %user.id, "Updating user");
        let timer = OperationTimer::new("update_user");
        let result = async {
            let data = serde_json::to_value(&user)?;
            self.documents.set(&self.config.users_collection, &user.id, data).await
        }
        .await;
        self.finish("update_user", timer, &result);
        result
    }

    async fn add_item(&self, item: Item) -> Result<String> {
        debug!(title = %item.title, "Adding item");
        let timer = OperationTimer::new("add_item");
        let result = async {
            let item_id = if item.id.is_empty() { Uuid::new_v4().to_string() } else { item.id.clone() };
            let now = Utc::now();
            let item = Item {
                id: item_id.clone(),
                status: ItemStatus::Active,
                created_at: now,
                updated_at: now,
                ..item
            };
            debug!(id = %item_id, item_type = %item.item_type, status = %item.status, "Item details");
            let data = serde_json::to_value(&item)?;
            self.documents.set(&self.config.items_collection, &item_id, data).await?;
            info!(id = %item_id, "Item added");
            Ok::<_, LostFoundError>(item_id)
        }
        .await;
        self.finish("add_item", timer, &result);
        result
    }

    async fn get_items(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        debug!(?query, "Fetching items");
        let timer = OperationTimer::new("get_items");
        let result = async {
            // Full fetch then in-memory filtering, so no composite index is needed
            let (fetched, mut items) = self.fetch_items(query.limit).await?;

            if let Some(status) = query.status {
                items.retain(|item| item.status == status);
                debug!(%status, remaining = items.len(), "Applied status filter");
            }
            if let Some(item_type) = query.item_type {
                items.retain(|item| item.item_type == item_type);
                debug!(%item_type, remaining = items.len(), "Applied type filter");
            }
            if let Some(category) = &query.category {
                items.retain(|item| &item.category == category);
                debug!(%category, remaining = items.len(), "Applied category filter");
            }

            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            self.metrics.record_listing("get_items", fetched, items.len());
            debug!("Retrieved {} items after filtering and sorting", items.len());

            if items.is_empty() {
                self.log_empty_listing(query).await;
            }
            Ok::<_, LostFoundError>(items)
        }
        .await;
        self.finish("get_items", timer, &result);
        result
    }

    async fn get_item(&self, item_id: &str) -> Result<Option<Item>> {
        debug!(item_id, "Fetching item");
        let timer = OperationTimer::new("get_item");
        let result = async {
            match self.documents.get(&self.config.items_collection, item_id).await? {
                Some(doc) => Self::decode_item(doc).map(Some),
                None => Ok(None),
            }
        }
        .await;
        self.finish("get_item", timer, &result);
        result
    }

    async fn update_item(&self, item: Item) -> Result<()> {
        debug!(id = %item.id, title = %item.title, "Updating item");
        let timer = OperationTimer::new("update_item");
        let result = async {
            let item = Item {
                updated_at: Utc::now(),
                ..item
            };
            let data = serde_json::to_value(&item)?;
            self.documents.set(&self.config.items_collection, &item.id, data).await
        }
        .await;
        self.finish("update_item", timer, &result);
        result
    }

    async fn delete_item(&self, item_id: &str) -> Result<()> {
        debug!(item_id, "Deleting item");
        let timer = OperationTimer::new("delete_item");
        let result = self.documents.delete(&self.config.items_collection, item_id).await;
        self.finish("delete_item", timer, &result);
        result
    }

    async fn search_items(&self, query: &str) -> Result<Vec<Item>> {
        debug!(query, "Searching items");
        let timer = OperationTimer::new("search_items");
        let result = async {
            let (fetched, items) = self.fetch_items(self.config.search_limit).await?;
            let results: Vec<Item> = items
                .into_iter()
                .filter(|item| item.status == ItemStatus::Active)
                .filter(|item| item.matches_query(query))
                .collect();
            self.metrics.record_listing("search_items", fetched, results.len());
            debug!("Found {} items matching {:?}", results.len(), query);
            Ok::<_, LostFoundError>(results)
        }
        .await;
        self.finish("search_items", timer, &result);
        result
    }

    async fn upload_image(&self, image_uri: &str, item_id: &str) -> Result<String> {
        debug!(image_uri, item_id, "Uploading image");
        let timer = OperationTimer::new("upload_image");
        let result = async {
            let local_path = image_uri.strip_prefix("file://").unwrap_or(image_uri);
            let bytes = tokio::fs::read(Path::new(local_path)).await?;
            let path = self.image_path(item_id);
            debug!(%path, size = bytes.len(), "Uploading to path");
            let url = self.blobs.put(&path, bytes, "image/jpeg").await?;
            info!(%url, "Image uploaded");
            Ok::<_, LostFoundError>(url)
        }
        .await;
        self.metrics.record_upload(result.is_ok());
        self.finish("upload_image", timer, &result);
        result
    }

    async fn upload_images(&self, image_uris: &[String], item_id: &str) -> Result<Vec<String>> {
        debug!(count = image_uris.len(), item_id, "Uploading images");
        let mut urls = Vec::with_capacity(image_uris.len());

        for (index, image_uri) in image_uris.iter().enumerate() {
            match self.upload_image(image_uri, item_id).await {
                Ok(url) => urls.push(url),
                Err(e) => warn!(image = index + 1, total = image_uris.len(), error = %e, "Image upload failed, skipping"),
            }
        }

        info!("Uploaded {}/{} images", urls.len(), image_uris.len());
        Ok(urls)
    }

    async fn test_connection(&self) -> Result<bool> {
        let timer = OperationTimer::new("test_connection");
        let result = self
            .documents
            .list(&self.config.items_collection, 1)
            .await
            .map(|_| true);
        self.finish("test_connection", timer, &result);
        if result.is_ok() {
            info!(collection = %self.config.items_collection, "Database reachable");
        }
        result
    }

    async fn collection_stats(&self) -> Result<CollectionStats> {
        let timer = OperationTimer::new("collection_stats");
        let result = async {
            let items_count = self.documents.count(&self.config.items_collection).await?;
            let users_count = self.documents.count(&self.config.users_collection).await?;
            Ok::<_, LostFoundError>(CollectionStats {
                items_count,
                users_count,
                items_path: self.config.items_collection.clone(),
                users_path: self.config.users_collection.clone(),
            })
        }
        .await;
        self.finish("collection_stats", timer, &result);
        if let Ok(stats) = &result {
            info!(items = stats.items_count, users = stats.users_count, "Collection stats");
        }
        result
    }

    async fn check_optimized_queries(&self) -> Result<bool> {
        let query = OrderedQuery {
            field: "status".to_string(),
            equals: json!(ItemStatus::Active.as_str()),
            order_by: "createdAt".to_string(),
            direction: Direction::Descending,
            limit: 1,
        };

        match self.documents.query(&self.config.items_collection, &query).await {
            Ok(docs) => {
                info!(returned = docs.len(), "Composite index present, ordered queries available");
                Ok(true)
            },
            Err(LostFoundError::IndexRequired(detail)) => {
                warn!(%detail, "Composite index not created yet, staying on in-memory filtering");
                Ok(false)
            },
            Err(e) => {
                error!(error = %e, "Unexpected error checking for the composite index");
                Err(e)
            },
        }
    }
}
