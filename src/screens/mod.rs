//! Headless screens
//!
//! Each screen binds a view-state holder to plain render structs and turns user
//! actions into holder triggers and [`Destination`]s. Nothing here draws.

/// List diffing and item cards
pub mod adapter;
/// Sign-in screen
pub mod auth;
/// Item detail screen
pub mod detail;
/// Home screen
pub mod home;
/// Lost-only and found-only lists
pub mod listing;
/// Post form
pub mod post_item;

pub use adapter::{ItemAdapter, ItemCard, ListChange};
pub use auth::{AuthScreen, AuthView};
pub use detail::{ContactRequest, ItemDetailScreen, ItemDetailView};
pub use home::{HomeScreen, HomeView};
pub use listing::{ItemListScreen, ListView};
pub use post_item::{PostItemForm, PostItemScreen};

/// Navigation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Sign-in
    Auth,
    /// Every active item
    Home,
    /// Lost items only
    LostItems,
    /// Found items only
    FoundItems,
    /// Post form
    PostItem,
    /// Selected item
    ItemDetail,
}

/// Card and detail date format, e.g. `Mar 05, 2025`
pub(crate) const DATE_FORMAT: &str = "%b %d, %Y";
