use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{LostFoundError, Result};
use crate::models::{ItemType, LocalItem, NewLocalItem};
use crate::schema::items;

// Type alias for the database connection pool
/// Pooled SQLite connections
pub type DbPool = Pool<SqliteConnectionManager>;
/// One checked-out connection
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

impl ToSql for ItemType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ItemType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: LostFoundError| FromSqlError::Other(Box::new(e)))
    }
}

fn to_millis(date: &DateTime<Utc>) -> i64 {
    date.timestamp_millis()
}

fn from_millis(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(column)?;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {millis}").into(),
        )
    })
}

/// Which rows an observed query returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalFilter {
    /// Every row
    All,
    /// Rows of one item type
    ByType(ItemType),
    /// Rows with exactly this category
    ByCategory(String),
    /// Rows not yet resolved
    Unresolved,
    /// Title or description contains the text
    Search(String),
}

/// Embedded SQLite store for locally recorded items
///
/// Every mutation bumps a change counter; observed queries re-run on each bump
/// and publish a fresh snapshot.
#[derive(Clone)]
pub struct LocalStore {
    pool: DbPool,
    changes: Arc<watch::Sender<u64>>,
}

impl LocalStore {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path);
        let store = Self::with_manager(manager, 8)?;
        info!("Local store opened at {}", path.display());
        Ok(store)
    }

    /// In-memory store; a single pooled connection keeps every caller on one database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_manager(SqliteConnectionManager::memory(), 1)
    }

    fn with_manager(manager: SqliteConnectionManager, max_size: u32) -> Result<Self> {
        let pool = Pool::builder()
            .max_size(max_size)
            .max_lifetime(None)
            .idle_timeout(None)
            .build(manager)?;

        let conn = pool.get()?;
        Self::create_tables(&conn)?;

        let (changes, _) = watch::channel(0);
        Ok(Self {
            pool,
            changes: Arc::new(changes),
        })
    }

    fn create_tables(conn: &Connection) -> Result<()> {
        conn.execute_batch(items::CREATE)?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    fn notify_changed(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    /// Insert a row and return its assigned id
    pub fn insert_item(&self, item: NewLocalItem) -> Result<i64> {
        let conn = self.get_connection()?;
        let date_reported = item.date_reported.unwrap_or_else(Utc::now);

        conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10)",
                items::TABLE,
                items::TITLE,
                items::DESCRIPTION,
                items::CATEGORY,
                items::TYPE,
                items::LOCATION,
                items::DATE_REPORTED,
                items::CONTACT_INFO,
                items::IMAGE_URI,
                items::IS_RESOLVED,
                items::REPORTER_NAME,
                items::REPORTER_EMAIL
            ),
            params![
                item.title,
                item.description,
                item.category,
                item.item_type,
                item.location,
                to_millis(&date_reported),
                item.contact_info,
                item.image_uri,
                item.reporter_name,
                item.reporter_email
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(id, title = %item.title, "Inserted local item");
        self.notify_changed();
        Ok(id)
    }

    /// Overwrite every column of an existing row
    pub fn update_item(&self, item: &LocalItem) -> Result<()> {
        let conn = self.get_connection()?;
        conn.execute(
            &format!(
                "UPDATE {} SET {} = ?1, {} = ?2, {} = ?3, {} = ?4, {} = ?5, {} = ?6, {} = ?7, {} = ?8, {} = ?9, {} = ?10, {} = ?11 WHERE {} = ?12",
                items::TABLE,
                items::TITLE,
                items::DESCRIPTION,
                items::CATEGORY,
                items::TYPE,
                items::LOCATION,
                items::DATE_REPORTED,
                items::CONTACT_INFO,
                items::IMAGE_URI,
                items::IS_RESOLVED,
                items::REPORTER_NAME,
                items::REPORTER_EMAIL,
                items::ID
            ),
            params![
                item.title,
                item.description,
                item.category,
                item.item_type,
                item.location,
                to_millis(&item.date_reported),
                item.contact_info,
                item.image_uri,
                item.is_resolved,
                item.reporter_name,
                item.reporter_email,
                item.id
            ],
        )?;
        self.notify_changed();
        Ok(())
    }

    /// Delete a row by id
    pub fn delete_item(&self, id: i64) -> Result<()> {
        let conn = self.get_connection()?;
        conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?1", items::TABLE, items::ID),
            params![id],
        )?;
        self.notify_changed();
        Ok(())
    }

    /// Flag a row as resolved
    pub fn mark_as_resolved(&self, id: i64) -> Result<()> {
        let conn = self.get_connection()?;
        conn.execute(
            &format!(
                "UPDATE {} SET {} = 1 WHERE {} = ?1",
                items::TABLE,
                items::IS_RESOLVED,
                items::ID
            ),
            params![id],
        )?;
        self.notify_changed();
        Ok(())
    }

    /// Get a row by id
    pub fn get_item_by_id(&self, id: i64) -> Result<Option<LocalItem>> {
        let conn = self.get_connection()?;
        let item = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?1", items::TABLE, items::ID),
                params![id],
                Self::map_local_item,
            )
            .optional()?;
        Ok(item)
    }

    /// Run a filtered query once, newest report first
    pub fn query(&self, filter: &LocalFilter) -> Result<Vec<LocalItem>> {
        let conn = self.get_connection()?;
        let order = format!("ORDER BY {} DESC", items::DATE_REPORTED);

        let rows = match filter {
            LocalFilter::All => {
                let mut stmt = conn.prepare(&format!("SELECT * FROM {} {order}", items::TABLE))?;
                let rows = stmt.query_map([], Self::map_local_item)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            },
            LocalFilter::ByType(item_type) => {
                let mut stmt = conn.prepare(&format!("SELECT * FROM {} WHERE {} = ?1 {order}", items::TABLE, items::TYPE))?;
                let rows = stmt.query_map(params![item_type], Self::map_local_item)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            },
            LocalFilter::ByCategory(category) => {
                let mut stmt = conn.prepare(&format!("SELECT * FROM {} WHERE {} = ?1 {order}", items::TABLE, items::CATEGORY))?;
                let rows = stmt.query_map(params![category], Self::map_local_item)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            },
            LocalFilter::Unresolved => {
                let mut stmt = conn.prepare(&format!("SELECT * FROM {} WHERE {} = 0 {order}", items::TABLE, items::IS_RESOLVED))?;
                let rows = stmt.query_map([], Self::map_local_item)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            },
            LocalFilter::Search(query) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT * FROM {} WHERE {} LIKE '%' || ?1 || '%' OR {} LIKE '%' || ?1 || '%' {order}",
                    items::TABLE,
                    items::TITLE,
                    items::DESCRIPTION
                ))?;
                let rows = stmt.query_map(params![query], Self::map_local_item)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            },
        };

        Ok(rows)
    }

    /// Observe every row
    pub fn observe_all_items(&self) -> Result<LiveQuery> {
        self.observe(LocalFilter::All)
    }

    /// Observe rows of one type
    pub fn observe_items_by_type(&self, item_type: ItemType) -> Result<LiveQuery> {
        self.observe(LocalFilter::ByType(item_type))
    }

    /// Observe rows of one category
    pub fn observe_items_by_category(&self, category: &str) -> Result<LiveQuery> {
        self.observe(LocalFilter::ByCategory(category.to_string()))
    }

    /// Observe unresolved rows
    pub fn observe_unresolved_items(&self) -> Result<LiveQuery> {
        self.observe(LocalFilter::Unresolved)
    }

    /// Observe rows whose title or description contains `query`
    pub fn observe_search(&self, query: &str) -> Result<LiveQuery> {
        self.observe(LocalFilter::Search(query.to_string()))
    }

    /// Start a live query. Must be called from within a Tokio runtime.
    pub fn observe(&self, filter: LocalFilter) -> Result<LiveQuery> {
        let initial = self.query(&filter)?;
        let (tx, rx) = watch::channel(initial);
        let mut changes = self.changes.subscribe();
        let store = self.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        // rusqlite blocks, keep it off the async workers
                        let (refresh_store, refresh_filter) = (store.clone(), filter.clone());
                        let refreshed =
                            tokio::task::spawn_blocking(move || refresh_store.query(&refresh_filter)).await;
                        match refreshed {
                            Ok(Ok(rows)) => {
                                tx.send_replace(rows);
                            },
                            Ok(Err(e)) => warn!(?filter, error = %e, "Live query refresh failed"),
                            Err(e) => warn!(?filter, error = %e, "Live query refresh task failed"),
                        }
                    },
                }
            }
        });

        Ok(LiveQuery { rx, task })
    }

    /// Map a database row to a LocalItem
    fn map_local_item(row: &Row) -> rusqlite::Result<LocalItem> {
        Ok(LocalItem {
            id: row.get(items::ID)?,
            title: row.get(items::TITLE)?,
            description: row.get(items::DESCRIPTION)?,
            category: row.get(items::CATEGORY)?,
            item_type: row.get(items::TYPE)?,
            location: row.get(items::LOCATION)?,
            date_reported: from_millis(row, items::DATE_REPORTED)?,
            contact_info: row.get(items::CONTACT_INFO)?,
            image_uri: row.get(items::IMAGE_URI)?,
            is_resolved: row.get(items::IS_RESOLVED)?,
            reporter_name: row.get(items::REPORTER_NAME)?,
            reporter_email: row.get(items::REPORTER_EMAIL)?,
        })
    }
}

/// A continuously refreshed query result
///
/// Dropping it stops the refresh task.
pub struct LiveQuery {
    rx: watch::Receiver<Vec<LocalItem>>,
    task: JoinHandle<()>,
}

impl LiveQuery {
    /// The latest snapshot
    #[must_use]
    pub fn current(&self) -> Vec<LocalItem> {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot
    pub async fn changed(&mut self) -> Result<Vec<LocalItem>> {
        self.rx
            .changed()
            .await
            .map_err(|_| LostFoundError::Other("live query closed".to_string()))?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// An independent receiver of the same snapshots
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<LocalItem>> {
        self.rx.clone()
    }
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        self.task.abort();
    }
}
