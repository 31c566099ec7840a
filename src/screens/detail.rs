use std::sync::Arc;

use tokio::task::JoinHandle;

use super::DATE_FORMAT;
use crate::models::{Item, ItemType};
use crate::viewmodel::ItemViewModel;

/// Rendered detail of the selected item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetailView {
    /// Title as entered
    pub title: String,
    /// Description as entered
    pub description: String,
    /// Category name
    pub category: String,
    /// `Location: <address>`
    pub location: String,
    /// `Reported: <date>`
    pub date: String,
    /// `Reported by: <name>`
    pub reporter: String,
    /// Reporter email
    pub contact: String,
    /// `LOST` or `FOUND`
    pub type_label: &'static str,
    /// Resolved badge
    pub resolved_visible: bool,
    /// Mark-resolved action, hidden once resolved
    pub mark_resolved_visible: bool,
    /// Primary image; placeholder when `None`
    pub image_url: Option<String>,
}

impl ItemDetailView {
    fn from_item(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            category: item.category.clone(),
            location: format!("Location: {}", item.location.address),
            date: format!("Reported: {}", item.date_reported.format(DATE_FORMAT)),
            reporter: format!("Reported by: {}", item.reporter_name),
            contact: item.contact_info.email.clone(),
            type_label: if item.item_type == ItemType::Lost { "LOST" } else { "FOUND" },
            resolved_visible: item.is_resolved,
            mark_resolved_visible: !item.is_resolved,
            image_url: (!item.image_uri.is_empty()).then(|| item.image_uri.clone()),
        }
    }
}

/// Email draft for contacting a reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    /// Reporter email
    pub to: String,
    /// Mail subject
    pub subject: String,
    /// Mail body
    pub body: String,
}

/// Detail of the item selected on a list screen
pub struct ItemDetailScreen {
    items: Arc<ItemViewModel>,
}

impl ItemDetailScreen {
    /// Screen over the shared item holder
    pub const fn new(items: Arc<ItemViewModel>) -> Self {
        Self { items }
    }

    /// `None` until an item is selected
    pub fn render(&self) -> Option<ItemDetailView> {
        self.items.selected_item().get().as_ref().map(ItemDetailView::from_item)
    }

    /// Draft an email to the selected item's reporter
    pub fn contact_reporter(&self) -> Option<ContactRequest> {
        let item = self.items.selected_item().get()?;
        Some(ContactRequest {
            to: item.contact_info.email,
            subject: format!("Regarding: {}", item.title),
            body: format!("Hi, I saw your post about the {}...", item.title),
        })
    }

    /// Mark the selected item resolved; `None` if nothing is selected or it
    /// already is
    pub fn mark_resolved(&self) -> Option<JoinHandle<()>> {
        let item = self.items.selected_item().get()?;
        if item.is_resolved {
            return None;
        }
        Some(self.items.mark_as_resolved(&item.id))
    }
}
