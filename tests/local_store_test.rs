use chrono::{Duration, Utc};
use std::time::Duration as StdDuration;
use tempfile::TempDir;
use tokio::time::timeout;

use lost_and_found::models::{ItemType, NewLocalItem};
use lost_and_found::{LocalFilter, LocalStore};

fn new_item(title: &str, item_type: ItemType, days_ago: i64) -> NewLocalItem {
    NewLocalItem {
        title: title.to_string(),
        description: format!("{title} near the main gate"),
        category: "Personal Items".to_string(),
        item_type,
        location: "Main gate".to_string(),
        date_reported: Some(Utc::now() - Duration::days(days_ago)),
        contact_info: "555-0100".to_string(),
        image_uri: None,
        reporter_name: "Ravi".to_string(),
        reporter_email: "ravi@iiitdm.ac.in".to_string(),
    }
}

fn open_temp_store() -> (TempDir, LocalStore) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let store = LocalStore::open(&dir.path().join("nested").join("items.db")).expect("Failed to open store");
    (dir, store)
}

#[test]
fn test_insert_and_get_item() {
    let (_dir, store) = open_temp_store();

    let id = store.insert_item(new_item("Umbrella", ItemType::Lost, 0)).unwrap();
    let item = store.get_item_by_id(id).unwrap().expect("Item should exist");

    assert_eq!(item.id, id);
    assert_eq!(item.title, "Umbrella");
    assert_eq!(item.item_type, ItemType::Lost);
    assert!(!item.is_resolved);
    assert!(item.image_uri.is_none());
}

#[test]
fn test_ids_are_autoincremented() {
    let (_dir, store) = open_temp_store();

    let first = store.insert_item(new_item("A", ItemType::Lost, 0)).unwrap();
    let second = store.insert_item(new_item("B", ItemType::Lost, 0)).unwrap();
    assert!(second > first);
}

#[test]
fn test_get_missing_item_returns_none() {
    let (_dir, store) = open_temp_store();
    assert!(store.get_item_by_id(42).unwrap().is_none());
}

#[test]
fn test_update_and_delete_item() {
    let (_dir, store) = open_temp_store();

    let id = store.insert_item(new_item("Wallet", ItemType::Found, 0)).unwrap();
    let mut item = store.get_item_by_id(id).unwrap().unwrap();
    item.title = "Brown Wallet".to_string();
    item.image_uri = Some("file:///photos/wallet.jpg".to_string());
    store.update_item(&item).unwrap();

    let updated = store.get_item_by_id(id).unwrap().unwrap();
    assert_eq!(updated.title, "Brown Wallet");
    assert_eq!(updated.image_uri.as_deref(), Some("file:///photos/wallet.jpg"));

    store.delete_item(id).unwrap();
    assert!(store.get_item_by_id(id).unwrap().is_none());
}

#[test]
fn test_mark_as_resolved() {
    let (_dir, store) = open_temp_store();

    let id = store.insert_item(new_item("Keys", ItemType::Lost, 0)).unwrap();
    store.mark_as_resolved(id).unwrap();

    assert!(store.get_item_by_id(id).unwrap().unwrap().is_resolved);
    assert!(store.query(&LocalFilter::Unresolved).unwrap().is_empty());
}

#[test]
fn test_queries_are_newest_first() {
    let (_dir, store) = open_temp_store();

    store.insert_item(new_item("Oldest", ItemType::Lost, 3)).unwrap();
    store.insert_item(new_item("Newest", ItemType::Found, 0)).unwrap();
    store.insert_item(new_item("Middle", ItemType::Lost, 1)).unwrap();

    let titles: Vec<String> = store.query(&LocalFilter::All).unwrap().into_iter().map(|i| i.title).collect();
    assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);

    let lost: Vec<String> = store
        .query(&LocalFilter::ByType(ItemType::Lost))
        .unwrap()
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(lost, vec!["Middle", "Oldest"]);
}

#[test]
fn test_category_filter_is_exact() {
    let (_dir, store) = open_temp_store();

    let mut keys = new_item("Bike key", ItemType::Lost, 0);
    keys.category = "Keys".to_string();
    store.insert_item(keys).unwrap();
    store.insert_item(new_item("Watch", ItemType::Lost, 0)).unwrap();

    assert_eq!(store.query(&LocalFilter::ByCategory("Keys".to_string())).unwrap().len(), 1);
    assert!(store.query(&LocalFilter::ByCategory("keys".to_string())).unwrap().is_empty());
}

#[test]
fn test_search_matches_title_or_description() {
    let (_dir, store) = open_temp_store();

    store.insert_item(new_item("Calculator", ItemType::Found, 0)).unwrap();
    let mut other = new_item("Bottle", ItemType::Lost, 0);
    other.description = "Steel bottle with a calculator sticker".to_string();
    store.insert_item(other).unwrap();
    store.insert_item(new_item("Scarf", ItemType::Lost, 0)).unwrap();

    let results = store.query(&LocalFilter::Search("calculator".to_string())).unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_live_query_emits_on_change() {
    let (_dir, store) = open_temp_store();
    store.insert_item(new_item("Umbrella", ItemType::Lost, 1)).unwrap();

    let mut live = store.observe_all_items().unwrap();
    assert_eq!(live.current().len(), 1);

    store.insert_item(new_item("Charger", ItemType::Found, 0)).unwrap();
    let snapshot = timeout(StdDuration::from_secs(5), live.changed())
        .await
        .expect("Live query should refresh")
        .unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].title, "Charger");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_live_queries_refresh_on_a_single_worker() {
    let (_dir, store) = open_temp_store();
    store.insert_item(new_item("Umbrella", ItemType::Lost, 1)).unwrap();

    let mut all = store.observe_all_items().unwrap();
    let mut lost = store.observe_items_by_type(ItemType::Lost).unwrap();
    let mut search = store.observe_search("wallet").unwrap();

    store.insert_item(new_item("Wallet", ItemType::Lost, 0)).unwrap();

    let wait = StdDuration::from_secs(5);
    let (all_rows, lost_rows, search_rows) = tokio::join!(
        timeout(wait, all.changed()),
        timeout(wait, lost.changed()),
        timeout(wait, search.changed()),
    );
    assert_eq!(all_rows.expect("all refreshed").unwrap().len(), 2);
    assert_eq!(lost_rows.expect("lost refreshed").unwrap().len(), 2);
    assert_eq!(search_rows.expect("search refreshed").unwrap()[0].title, "Wallet");
}

#[tokio::test]
async fn test_unresolved_live_query_drops_resolved_rows() {
    let (_dir, store) = open_temp_store();
    let id = store.insert_item(new_item("Keys", ItemType::Lost, 0)).unwrap();

    let mut live = store.observe_unresolved_items().unwrap();
    assert_eq!(live.current().len(), 1);

    store.mark_as_resolved(id).unwrap();
    let snapshot = timeout(StdDuration::from_secs(5), live.changed()).await.unwrap().unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_filtered_live_queries_start_with_matching_rows() {
    let store = LocalStore::open_in_memory().unwrap();
    store.insert_item(new_item("Umbrella", ItemType::Lost, 0)).unwrap();
    store.insert_item(new_item("Charger", ItemType::Found, 0)).unwrap();

    let found = store.observe_items_by_type(ItemType::Found).unwrap();
    let personal = store.observe_items_by_category("Personal Items").unwrap();
    let search = store.observe_search("umbrella").unwrap();

    assert_eq!(found.current().len(), 1);
    assert_eq!(personal.current().len(), 2);
    assert_eq!(search.current()[0].title, "Umbrella");
}
