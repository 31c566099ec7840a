use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::RepositoryConfig;
use crate::error::{LostFoundError, Result};
use crate::models::{CollectionStats, Item, ItemQuery, ItemStatus, ItemType, User};
use crate::repository::ItemRepository;
use crate::state::{Observable, ViewModelScope};

/// Observable state behind [`ItemViewModel`], shared with its tasks
struct ItemState {
    repository: Arc<dyn ItemRepository>,
    list_limit: usize,
    items: Observable<Vec<Item>>,
    lost_items: Observable<Vec<Item>>,
    found_items: Observable<Vec<Item>>,
    search_results: Observable<Vec<Item>>,
    is_loading: Observable<bool>,
    error: Observable<Option<String>>,
    selected_item: Observable<Option<Item>>,
    current_user: Observable<Option<User>>,
    db_connected: Observable<Option<bool>>,
    collection_stats: Observable<Option<CollectionStats>>,
    optimized_queries: Observable<Option<bool>>,
}

impl ItemState {
    fn begin(&self) {
        self.is_loading.set(true);
        self.error.set(None);
    }

    /// Finish a task, publishing `context: error` on failure
    fn end<T>(&self, context: &str, result: Result<T>) -> Option<T> {
        self.is_loading.set(false);
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                error!(error = %e, "{context}");
                self.error.set(Some(format!("{context}: {e}")));
                None
            },
        }
    }

    fn listing_query(&self) -> ItemQuery {
        ItemQuery::default().with_limit(self.list_limit)
    }

    async fn load_all_items(&self) {
        self.begin();
        let result = self.repository.get_items(&self.listing_query()).await;
        if let Some(items) = self.end("Failed to load items", result) {
            info!("Loaded {} items", items.len());
            self.items.set(items);
        }
    }

    async fn load_items_by_type(&self, item_type: ItemType) {
        self.begin();
        let query = ItemQuery {
            item_type: Some(item_type),
            ..self.listing_query()
        };
        let result = self.repository.get_items(&query).await;
        if let Some(items) = self.end("Failed to load items", result) {
            debug!(%item_type, count = items.len(), "Loaded items by type");
            match item_type {
                ItemType::Lost => self.lost_items.set(items),
                ItemType::Found => self.found_items.set(items),
            }
        }
    }

    async fn load_items_by_category(&self, category: String) {
        self.begin();
        let query = ItemQuery {
            category: Some(category),
            ..self.listing_query()
        };
        let result = self.repository.get_items(&query).await;
        if let Some(items) = self.end("Failed to load items", result) {
            self.items.set(items);
        }
    }

    async fn search_items(&self, query: String) {
        self.begin();
        let result = self.repository.search_items(&query).await;
        if let Some(results) = self.end("Search failed", result) {
            self.search_results.set(results);
        }
    }

    /// Create, upload, attach URLs; returns the new item id
    async fn create_with_images(&self, item: Item, image_uris: Vec<String>) -> Result<String> {
        let item = Item {
            images: Vec::new(),
            image_uri: String::new(),
            ..item
        };
        let item_id = self.repository.add_item(item.clone()).await?;

        if !image_uris.is_empty() {
            let urls = self.repository.upload_images(&image_uris, &item_id).await?;
            let stored = self.repository.get_item(&item_id).await?.unwrap_or(Item {
                id: item_id.clone(),
                status: ItemStatus::Active,
                ..item
            });
            let image_uri = urls.first().cloned().unwrap_or_default();
            debug!(item_id = %item_id, uploaded = urls.len(), "Attaching uploaded images");
            self.repository
                .update_item(Item {
                    images: urls,
                    image_uri,
                    ..stored
                })
                .await?;
        }
        Ok(item_id)
    }

    async fn add_item(&self, item: Item, image_uris: Vec<String>) -> Option<String> {
        self.begin();
        let result = self.create_with_images(item, image_uris).await;
        let item_id = self.end("Failed to add item", result)?;
        info!(item_id = %item_id, "Item posted");
        self.load_all_items().await;
        Some(item_id)
    }

    async fn update_item(&self, item: Item) {
        self.begin();
        let result = self.repository.update_item(item).await;
        if self.end("Failed to update item", result).is_some() {
            self.load_all_items().await;
        }
    }

    async fn delete_item(&self, item_id: String) {
        self.begin();
        let result = self.repository.delete_item(&item_id).await;
        if self.end("Failed to delete item", result).is_some() {
            self.load_all_items().await;
        }
    }

    async fn mark_as_resolved(&self, item_id: String) {
        self.begin();
        let result = async {
            let item = self
                .repository
                .get_item(&item_id)
                .await?
                .ok_or_else(|| LostFoundError::Other(format!("Item {item_id} not found")))?;
            self.repository
                .update_item(Item {
                    is_resolved: true,
                    status: ItemStatus::Resolved,
                    ..item
                })
                .await
        }
        .await;
        if self.end("Failed to mark item as resolved", result).is_some() {
            self.load_all_items().await;
        }
    }

    async fn load_current_user(&self) {
        self.begin();
        let result = async {
            match self.repository.current_user_id().await {
                Some(user_id) => self.repository.get_user(&user_id).await,
                None => Ok(None),
            }
        }
        .await;
        if let Some(user) = self.end("Failed to load user", result) {
            debug!(user = ?user.as_ref().map(|u| &u.name), "Current user");
            self.current_user.set(user);
        }
    }

    async fn test_database_connection(&self) {
        self.begin();
        let result = self.repository.test_connection().await;
        let connected = self.end("Database connection failed", result).unwrap_or(false);
        self.db_connected.set(Some(connected));
    }

    async fn get_collection_stats(&self) {
        self.begin();
        let result = self.repository.collection_stats().await;
        if let Some(stats) = self.end("Failed to get collection stats", result) {
            self.collection_stats.set(Some(stats));
        }
    }

    async fn test_optimized_queries(&self) {
        self.begin();
        let result = self.repository.check_optimized_queries().await;
        if let Some(available) = self.end("Optimized query check failed", result) {
            self.optimized_queries.set(Some(available));
        }
    }
}

/// View state for item listings, posting and item maintenance
///
/// Every trigger launches one task and returns its handle. Concurrent triggers
/// are not serialized; whichever task writes last wins. Dropping the holder
/// aborts its outstanding tasks.
pub struct ItemViewModel {
    state: Arc<ItemState>,
    scope: ViewModelScope,
}

impl ItemViewModel {
    /// Holder with the default listing limit
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self::with_list_limit(repository, ItemQuery::default().limit)
    }

    /// Holder whose listings use the configured `default_list_limit`
    pub fn from_config(repository: Arc<dyn ItemRepository>, config: &RepositoryConfig) -> Self {
        Self::with_list_limit(repository, config.default_list_limit)
    }

    /// Holder whose listings fetch up to `list_limit` documents
    pub fn with_list_limit(repository: Arc<dyn ItemRepository>, list_limit: usize) -> Self {
        Self {
            state: Arc::new(ItemState {
                repository,
                list_limit,
                items: Observable::default(),
                lost_items: Observable::default(),
                found_items: Observable::default(),
                search_results: Observable::default(),
                is_loading: Observable::default(),
                error: Observable::default(),
                selected_item: Observable::default(),
                current_user: Observable::default(),
                db_connected: Observable::default(),
                collection_stats: Observable::default(),
                optimized_queries: Observable::default(),
            }),
            scope: ViewModelScope::new(),
        }
    }

    /// Latest full listing
    pub fn items(&self) -> &Observable<Vec<Item>> {
        &self.state.items
    }

    /// Active lost items
    pub fn lost_items(&self) -> &Observable<Vec<Item>> {
        &self.state.lost_items
    }

    /// Active found items
    pub fn found_items(&self) -> &Observable<Vec<Item>> {
        &self.state.found_items
    }

    /// Results of the last search
    pub fn search_results(&self) -> &Observable<Vec<Item>> {
        &self.state.search_results
    }

    /// Cleared when the latest task ends
    pub fn is_loading(&self) -> &Observable<bool> {
        &self.state.is_loading
    }

    /// Last failure message, `None` once cleared
    pub fn error(&self) -> &Observable<Option<String>> {
        &self.state.error
    }

    /// Item opened in the detail screen
    pub fn selected_item(&self) -> &Observable<Option<Item>> {
        &self.state.selected_item
    }

    /// Profile of the signed-in user
    pub fn current_user(&self) -> &Observable<Option<User>> {
        &self.state.current_user
    }

    /// Outcome of the last connection check
    pub fn db_connected(&self) -> &Observable<Option<bool>> {
        &self.state.db_connected
    }

    /// Counts from the last stats check
    pub fn collection_stats(&self) -> &Observable<Option<CollectionStats>> {
        &self.state.collection_stats
    }

    /// Whether ordered filtered queries are indexed
    pub fn optimized_queries(&self) -> &Observable<Option<bool>> {
        &self.state.optimized_queries
    }

    /// Reload every active item into [`Self::items`]
    pub fn load_all_items(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.load_all_items().await })
    }

    /// Load active items of one type into the lost or found list
    pub fn load_items_by_type(&self, item_type: ItemType) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.load_items_by_type(item_type).await })
    }

    /// Load active items of one category into [`Self::items`]
    pub fn load_items_by_category(&self, category: &str) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let category = category.to_string();
        self.scope.launch(async move { state.load_items_by_category(category).await })
    }

    /// Case-insensitive search over title, description and category
    pub fn search_items(&self, query: &str) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let query = query.to_string();
        self.scope.launch(async move { state.search_items(query).await })
    }

    /// Post `item`, upload `image_uris` and attach their URLs, then reload the
    /// listing. The handle yields the new item id, or `None` on failure.
    pub fn add_item(&self, item: Item, image_uris: Vec<String>) -> JoinHandle<Option<String>> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.add_item(item, image_uris).await })
    }

    /// Overwrite `item`, then reload
    pub fn update_item(&self, item: Item) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.update_item(item).await })
    }

    /// Delete the item, then reload
    pub fn delete_item(&self, item_id: &str) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let item_id = item_id.to_string();
        self.scope.launch(async move { state.delete_item(item_id).await })
    }

    /// Flag the item resolved, then reload
    pub fn mark_as_resolved(&self, item_id: &str) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let item_id = item_id.to_string();
        self.scope.launch(async move { state.mark_as_resolved(item_id).await })
    }

    /// Load the signed-in user's profile
    pub fn load_current_user(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.load_current_user().await })
    }

    /// Round-trip to the document database
    pub fn test_database_connection(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.test_database_connection().await })
    }

    /// Refresh [`Self::collection_stats`]
    pub fn get_collection_stats(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.get_collection_stats().await })
    }

    /// Refresh [`Self::optimized_queries`]
    pub fn test_optimized_queries(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.test_optimized_queries().await })
    }

    /// Select an item for the detail screen
    pub fn set_selected_item(&self, item: Option<Item>) {
        self.state.selected_item.set(item);
    }

    /// Drop a shown error
    pub fn clear_error(&self) {
        self.state.error.set(None);
    }
}
