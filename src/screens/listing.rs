use std::sync::Arc;

use tokio::task::JoinHandle;

use super::{Destination, ItemAdapter, ListChange};
use crate::models::ItemType;
use crate::viewmodel::ItemViewModel;

/// What a lost-only or found-only list shows after a bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// List changes since the previous bind
    pub changes: Vec<ListChange>,
    /// No items to show
    pub show_empty_state: bool,
}

/// Active items of a single type
pub struct ItemListScreen {
    items: Arc<ItemViewModel>,
    item_type: ItemType,
    adapter: ItemAdapter,
}

impl ItemListScreen {
    /// Lost items screen
    pub fn lost(items: Arc<ItemViewModel>) -> Self {
        Self::new(items, ItemType::Lost)
    }

    /// Found items screen
    pub fn found(items: Arc<ItemViewModel>) -> Self {
        Self::new(items, ItemType::Found)
    }

    fn new(items: Arc<ItemViewModel>, item_type: ItemType) -> Self {
        Self {
            items,
            item_type,
            adapter: ItemAdapter::new(),
        }
    }

    /// Type shown by this screen
    pub const fn item_type(&self) -> ItemType {
        self.item_type
    }

    /// Load this screen's item type
    pub fn on_start(&self) -> JoinHandle<()> {
        self.items.load_items_by_type(self.item_type)
    }

    /// Pull the latest listing into the adapter
    pub fn bind(&mut self) -> ListView {
        let items = match self.item_type {
            ItemType::Lost => self.items.lost_items().get(),
            ItemType::Found => self.items.found_items().get(),
        };
        let show_empty_state = items.is_empty();
        ListView {
            changes: self.adapter.submit(items),
            show_empty_state,
        }
    }

    /// Adapter backing the list
    pub fn adapter(&self) -> &ItemAdapter {
        &self.adapter
    }

    /// Select the tapped item and open its detail
    pub fn on_item_click(&self, position: usize) -> Option<Destination> {
        let item = self.adapter.item_at(position)?.clone();
        self.items.set_selected_item(Some(item));
        Some(Destination::ItemDetail)
    }
}
