//! Data models for lost & found reports
//!
//! The remote document shapes ([`Item`], [`User`]) drive the view-state holders
//! and screens. [`LocalItem`] is the row shape of the embedded store, which is
//! kept separate and never reconciled with the remote one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LostFoundError;

/// Whether a report describes something lost or something found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    /// The reporter lost the item
    #[default]
    Lost,
    /// The reporter found the item
    Found,
}

impl ItemType {
    /// Stored / wire name of the variant
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lost => "LOST",
            Self::Found => "FOUND",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = LostFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOST" => Ok(Self::Lost),
            "FOUND" => Ok(Self::Found),
            other => Err(LostFoundError::validation("type", format!("Unknown item type: {other}"))),
        }
    }
}

/// Lifecycle status of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// Visible in listings and search
    #[default]
    Active,
    /// Returned to its owner
    Resolved,
    /// Past its expiry date (never set automatically)
    Expired,
}

impl ItemStatus {
    /// Stored / wire name of the variant
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Resolved => "RESOLVED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an item was lost or found
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Free-text address
    pub address: String,
    /// Short place name shown on cards
    pub place_name: String,
}

impl Location {
    /// Location known only by a free-text description
    #[must_use]
    pub fn described(text: &str) -> Self {
        Self {
            address: text.to_string(),
            place_name: text.to_string(),
            ..Self::default()
        }
    }

    /// Text shown on list cards
    #[must_use]
    pub fn display_text(&self) -> &str {
        if !self.place_name.is_empty() {
            &self.place_name
        } else if !self.address.is_empty() {
            &self.address
        } else {
            "Location not specified"
        }
    }
}

/// Preferred way of reaching the reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactMethod {
    /// Email
    #[default]
    Email,
    /// Phone call or message
    Phone,
}

/// How to reach the reporter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    /// Phone number or free-text contact
    pub phone: String,
    /// Email address
    pub email: String,
    /// Preferred channel
    pub preferred_method: ContactMethod,
}

/// A lost-or-found report as stored in the `items` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    /// Document id; empty until assigned by the repository
    pub id: String,
    /// Id of the posting user
    pub user_id: String,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Category name, normally one of [`Category::all`]
    pub category: String,
    /// Lost or found
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Lifecycle status
    pub status: ItemStatus,
    /// Where it happened
    pub location: Location,
    /// Image URIs (local before upload, download URLs after)
    pub images: Vec<String>,
    /// Primary image, empty when there is none
    pub image_uri: String,
    /// How to reach the reporter
    pub contact_info: ContactInfo,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Optional reward amount
    pub reward: Option<f64>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Optional expiry (informational only)
    pub expires_at: Option<DateTime<Utc>>,
    /// When the reporter filed the report
    pub date_reported: DateTime<Utc>,
    /// Whether the item was handed back
    pub is_resolved: bool,
    /// Reporter's name
    pub reporter_name: String,
    /// Reporter's email
    pub reporter_email: String,
}

impl Default for Item {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            user_id: String::new(),
            title: String::new(),
            description: String::new(),
            category: String::new(),
            item_type: ItemType::default(),
            status: ItemStatus::default(),
            location: Location::default(),
            images: Vec::new(),
            image_uri: String::new(),
            contact_info: ContactInfo::default(),
            tags: Vec::new(),
            reward: None,
            created_at: now,
            updated_at: now,
            expires_at: None,
            date_reported: now,
            is_resolved: false,
            reporter_name: String::new(),
            reporter_email: String::new(),
        }
    }
}

impl Item {
    /// Case-insensitive substring match over title, description and category.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.category.to_lowercase().contains(&needle)
    }
}

/// A user profile as stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    /// Document id (the auth uid)
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Avatar URL
    pub profile_image_url: String,
    /// Profile creation time
    pub created_at: DateTime<Utc>,
    /// Last time the user was seen
    pub last_active: DateTime<Utc>,
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            profile_image_url: String::new(),
            created_at: now,
            last_active: now,
        }
    }
}

/// Reference data for one of the fixed item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Display name, also the value stored on items
    pub name: &'static str,
    /// Icon resource name
    pub icon: &'static str,
    /// Accent colour
    pub color: &'static str,
}

const CATEGORIES: [Category; 10] = [
    Category { name: "Electronics", icon: "ic_electronics", color: "#FF5722" },
    Category { name: "Books & Stationery", icon: "ic_book", color: "#2196F3" },
    Category { name: "Clothing & Accessories", icon: "ic_clothing", color: "#4CAF50" },
    Category { name: "Personal Items", icon: "ic_personal", color: "#9C27B0" },
    Category { name: "Bags & Backpacks", icon: "ic_bag", color: "#FF9800" },
    Category { name: "Jewelry", icon: "ic_jewelry", color: "#E91E63" },
    Category { name: "Documents & Cards", icon: "ic_document", color: "#607D8B" },
    Category { name: "Keys", icon: "ic_key", color: "#795548" },
    Category { name: "Sports Equipment", icon: "ic_sports", color: "#00BCD4" },
    Category { name: "Other", icon: "ic_other", color: "#9E9E9E" },
];

impl Category {
    /// All categories in display order
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &CATEGORIES
    }

    /// Look up a category by its exact name
    #[must_use]
    pub fn find(name: &str) -> Option<&'static Self> {
        CATEGORIES.iter().find(|c| c.name == name)
    }
}

/// Filters for an item listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    /// Only this type, if set
    pub item_type: Option<ItemType>,
    /// Only this exact category, if set
    pub category: Option<String>,
    /// Only this status; `None` disables the status filter
    pub status: Option<ItemStatus>,
    /// Maximum number of documents fetched before filtering
    pub limit: usize,
}

impl Default for ItemQuery {
    fn default() -> Self {
        Self {
            item_type: None,
            category: None,
            status: Some(ItemStatus::Active),
            limit: 50,
        }
    }
}

impl ItemQuery {
    /// Active items of one type
    #[must_use]
    pub fn of_type(item_type: ItemType) -> Self {
        Self {
            item_type: Some(item_type),
            ..Self::default()
        }
    }

    /// Active items in one category
    #[must_use]
    pub fn in_category(category: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            ..Self::default()
        }
    }

    /// Override the fetch limit
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Sizes of the backend collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Documents in `items`
    pub items_count: usize,
    /// Documents in `users`
    pub users_count: usize,
    /// Path of the items collection
    pub items_path: String,
    /// Path of the users collection
    pub users_path: String,
}

/// Row of the embedded `items` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalItem {
    /// Autoincrement primary key
    pub id: i64,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Category name
    pub category: String,
    /// Lost or found
    pub item_type: ItemType,
    /// Free-text location
    pub location: String,
    /// Report time
    pub date_reported: DateTime<Utc>,
    /// Free-text contact details
    pub contact_info: String,
    /// Single optional image
    pub image_uri: Option<String>,
    /// Whether the item was handed back
    pub is_resolved: bool,
    /// Reporter's name
    pub reporter_name: String,
    /// Reporter's email
    pub reporter_email: String,
}

/// Values for inserting a new local row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocalItem {
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Category name
    pub category: String,
    /// Lost or found
    pub item_type: ItemType,
    /// Free-text location
    pub location: String,
    /// Report time; defaults to now
    pub date_reported: Option<DateTime<Utc>>,
    /// Free-text contact details
    pub contact_info: String,
    /// Single optional image
    pub image_uri: Option<String>,
    /// Reporter's name
    pub reporter_name: String,
    /// Reporter's email
    pub reporter_email: String,
}
