use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use super::{Destination, ItemAdapter, ListChange};
use crate::models::ItemType;
use crate::viewmodel::{AuthViewModel, ItemViewModel};

/// What the home screen shows after a bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeView {
    /// List changes since the previous bind
    pub changes: Vec<ListChange>,
    /// Pull-to-refresh indicator
    pub refreshing: bool,
    /// Lost items in the listing
    pub lost_count: usize,
    /// Found items in the listing
    pub found_count: usize,
    /// No items to show
    pub show_empty_state: bool,
    /// Transient message; shown once
    pub message: Option<String>,
}

/// Landing screen after sign-in: every active item plus lost/found shortcuts
pub struct HomeScreen {
    items: Arc<ItemViewModel>,
    auth: Arc<AuthViewModel>,
    adapter: ItemAdapter,
}

impl HomeScreen {
    /// Screen over the shared item and auth holders
    pub fn new(items: Arc<ItemViewModel>, auth: Arc<AuthViewModel>) -> Self {
        Self {
            items,
            auth,
            adapter: ItemAdapter::new(),
        }
    }

    /// Run the connectivity diagnostics and the initial load
    pub fn on_start(&self) -> Vec<JoinHandle<()>> {
        debug!("Home screen started");
        vec![
            self.items.test_database_connection(),
            self.items.get_collection_stats(),
            self.items.test_optimized_queries(),
            self.items.load_all_items(),
        ]
    }

    /// Reload on return to the screen
    pub fn on_resume(&self) -> JoinHandle<()> {
        self.items.load_all_items()
    }

    /// Pull-to-refresh
    pub fn refresh(&self) -> JoinHandle<()> {
        self.items.load_all_items()
    }

    /// Pull the latest view state into the adapter. A pending error is taken
    /// as the message and cleared on the holder.
    pub fn bind(&mut self) -> HomeView {
        let items = self.items.items().get();
        let lost_count = items.iter().filter(|item| item.item_type == ItemType::Lost).count();
        let found_count = items.len() - lost_count;
        let show_empty_state = items.is_empty();
        let changes = self.adapter.submit(items);

        let message = self.items.error().get();
        if message.is_some() {
            self.items.clear_error();
        }

        HomeView {
            changes,
            refreshing: self.items.is_loading().get(),
            lost_count,
            found_count,
            show_empty_state,
            message,
        }
    }

    /// Adapter backing the list
    pub fn adapter(&self) -> &ItemAdapter {
        &self.adapter
    }

    /// Select the tapped item and open its detail
    pub fn on_item_click(&self, position: usize) -> Option<Destination> {
        let item = self.adapter.item_at(position)?.clone();
        debug!(title = %item.title, "Item clicked");
        self.items.set_selected_item(Some(item));
        Some(Destination::ItemDetail)
    }

    /// Lost items shortcut
    pub const fn open_lost_items(&self) -> Destination {
        Destination::LostItems
    }

    /// Found items shortcut
    pub const fn open_found_items(&self) -> Destination {
        Destination::FoundItems
    }

    /// Post button
    pub const fn post_item(&self) -> Destination {
        Destination::PostItem
    }

    /// Sign out and return to the auth screen
    pub fn sign_out(&self) -> (JoinHandle<()>, Destination) {
        (self.auth.sign_out(), Destination::Auth)
    }
}
