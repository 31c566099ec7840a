//! Local store schema definitions
//!
//! Table and column names for the embedded `items` table, used with rusqlite.

/// Items table schema
pub mod items {
    /// Table name
    pub const TABLE: &str = "items";
    /// Autoincrement primary key column
    pub const ID: &str = "id";
    /// Title column
    pub const TITLE: &str = "title";
    /// Description column
    pub const DESCRIPTION: &str = "description";
    /// Category name column
    pub const CATEGORY: &str = "category";
    /// Item type column (`LOST` / `FOUND`)
    pub const TYPE: &str = "type";
    /// Free-text location column
    pub const LOCATION: &str = "location";
    /// Report timestamp column (epoch milliseconds)
    pub const DATE_REPORTED: &str = "date_reported";
    /// Contact details column
    pub const CONTACT_INFO: &str = "contact_info";
    /// Optional image URI column
    pub const IMAGE_URI: &str = "image_uri";
    /// Resolved flag column
    pub const IS_RESOLVED: &str = "is_resolved";
    /// Reporter name column
    pub const REPORTER_NAME: &str = "reporter_name";
    /// Reporter email column
    pub const REPORTER_EMAIL: &str = "reporter_email";

    /// DDL for the table
    pub const CREATE: &str = "CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL,
        type TEXT NOT NULL,
        location TEXT NOT NULL,
        date_reported INTEGER NOT NULL,
        contact_info TEXT NOT NULL,
        image_uri TEXT,
        is_resolved INTEGER NOT NULL DEFAULT 0,
        reporter_name TEXT NOT NULL,
        reporter_email TEXT NOT NULL
    )";
}
