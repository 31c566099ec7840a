use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::DATE_FORMAT;
use crate::models::{Item, ItemType};

/// One row of an item list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCard {
    /// Item id
    pub id: String,
    /// Title as entered
    pub title: String,
    /// Description as entered
    pub description: String,
    /// Category name
    pub category: String,
    /// Place name, or address when unnamed
    pub location: String,
    /// Creation date, e.g. `Mar 05, 2025`
    pub date: String,
    /// `LOST` or `FOUND`
    pub type_label: &'static str,
    /// Selects the lost or found badge colour
    pub is_lost: bool,
    /// First image, if any; the placeholder is shown otherwise
    pub image_url: Option<String>,
}

impl ItemCard {
    /// Render one item
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            category: item.category.clone(),
            location: item.location.display_text().to_string(),
            date: item.created_at.format(DATE_FORMAT).to_string(),
            type_label: item.item_type.as_str(),
            is_lost: item.item_type == ItemType::Lost,
            image_url: item.images.first().cloned(),
        }
    }
}

/// A single change between two list snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    /// Row removed from the old list
    Removed {
        /// Position in the old list
        position: usize,
        /// Item id
        id: String,
    },
    /// Row inserted into the new list
    Inserted {
        /// Position in the new list
        position: usize,
        /// Item id
        id: String,
    },
    /// Row kept but moved; both positions index the partially updated list
    Moved {
        /// Current position
        from: usize,
        /// Target position
        to: usize,
        /// Item id
        id: String,
    },
    /// Row kept with different content
    Changed {
        /// Position in the new list
        position: usize,
        /// Item id
        id: String,
    },
}

/// Diffing list adapter keyed by item id
#[derive(Debug, Default)]
pub struct ItemAdapter {
    items: Vec<Item>,
    cards: Vec<ItemCard>,
}

impl ItemAdapter {
    /// Empty adapter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list and report what changed.
    ///
    /// Applying the changes in order to the old list yields the new one:
    /// removals first, highest position first, then for each new position an
    /// insertion or a move into place, followed by a content change if any.
    pub fn submit(&mut self, items: Vec<Item>) -> Vec<ListChange> {
        let old: HashMap<&str, &Item> = self.items.iter().map(|item| (item.id.as_str(), item)).collect();
        let new_ids: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();

        let mut changes: Vec<ListChange> = self
            .items
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, item)| !new_ids.contains(item.id.as_str()))
            .map(|(position, item)| ListChange::Removed {
                position,
                id: item.id.clone(),
            })
            .collect();

        // Ids in display order as the changes are applied
        let mut working: Vec<&str> = self
            .items
            .iter()
            .map(|item| item.id.as_str())
            .filter(|id| new_ids.contains(id))
            .collect();

        for (position, item) in items.iter().enumerate() {
            let id = item.id.as_str();
            let Some(previous) = old.get(id) else {
                working.insert(position, id);
                changes.push(ListChange::Inserted {
                    position,
                    id: item.id.clone(),
                });
                continue;
            };

            if working.get(position) != Some(&id) {
                if let Some(from) = working.iter().position(|kept| *kept == id) {
                    working.remove(from);
                    working.insert(position, id);
                    changes.push(ListChange::Moved {
                        from,
                        to: position,
                        id: item.id.clone(),
                    });
                }
            }

            if *previous != item {
                changes.push(ListChange::Changed {
                    position,
                    id: item.id.clone(),
                });
            }
        }

        debug!(old = self.items.len(), new = items.len(), changes = changes.len(), "Updating items");
        self.cards = items.iter().map(ItemCard::from_item).collect();
        self.items = items;
        changes
    }

    /// Rendered rows in display order
    pub fn cards(&self) -> &[ItemCard] {
        &self.cards
    }

    /// Item behind the row at `position`
    pub fn item_at(&self, position: usize) -> Option<&Item> {
        self.items.get(position)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// No rows
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use chrono::TimeZone;

    fn item(id: &str, title: &str) -> Item {
        Item {
            id: id.to_string(),
            title: title.to_string(),
            ..Item::default()
        }
    }

    #[test]
    fn card_formats_date_and_location() {
        let mut source = item("a", "Umbrella");
        source.created_at = chrono::Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap();
        source.location = Location::default();
        let card = ItemCard::from_item(&source);
        assert_eq!(card.date, "Mar 05, 2025");
        assert_eq!(card.location, "Location not specified");
        assert_eq!(card.type_label, "LOST");
        assert!(card.image_url.is_none());
    }

    #[test]
    fn diff_reports_removals_insertions_and_changes() {
        let mut adapter = ItemAdapter::new();
        adapter.submit(vec![item("a", "A"), item("b", "B"), item("c", "C")]);

        let changes = adapter.submit(vec![item("d", "D"), item("a", "A"), item("c", "C2")]);
        assert_eq!(
            changes,
            vec![
                ListChange::Removed { position: 1, id: "b".to_string() },
                ListChange::Inserted { position: 0, id: "d".to_string() },
                ListChange::Changed { position: 2, id: "c".to_string() },
            ]
        );
        assert_eq!(adapter.len(), 3);
        assert_eq!(adapter.item_at(0).map(|i| i.id.as_str()), Some("d"));
    }

    fn replay(old: &[&str], changes: &[ListChange]) -> Vec<String> {
        let mut rows: Vec<String> = old.iter().map(ToString::to_string).collect();
        for change in changes {
            match change {
                ListChange::Removed { position, .. } => {
                    rows.remove(*position);
                },
                ListChange::Inserted { position, id } => rows.insert(*position, id.clone()),
                ListChange::Moved { from, to, id } => {
                    assert_eq!(&rows.remove(*from), id);
                    rows.insert(*to, id.clone());
                },
                ListChange::Changed { position, id } => assert_eq!(&rows[*position], id),
            }
        }
        rows
    }

    #[test]
    fn swapped_rows_are_reported_as_a_move() {
        let mut adapter = ItemAdapter::new();
        adapter.submit(vec![item("a", "A"), item("b", "B")]);

        let changes = adapter.submit(vec![item("b", "B"), item("a", "A")]);
        assert_eq!(
            changes,
            vec![ListChange::Moved { from: 1, to: 0, id: "b".to_string() }]
        );
        assert_eq!(replay(&["a", "b"], &changes), vec!["b", "a"]);
    }

    #[test]
    fn mixed_reorder_replays_to_the_new_order() {
        let mut adapter = ItemAdapter::new();
        adapter.submit(vec![item("a", "A"), item("b", "B"), item("c", "C"), item("d", "D")]);

        let changes = adapter.submit(vec![
            item("c", "C2"),
            item("e", "E"),
            item("a", "A"),
            item("d", "D"),
        ]);
        assert_eq!(replay(&["a", "b", "c", "d"], &changes), vec!["c", "e", "a", "d"]);
        assert!(changes.contains(&ListChange::Changed { position: 0, id: "c".to_string() }));
    }

    #[test]
    fn identical_snapshot_has_no_changes() {
        let mut adapter = ItemAdapter::new();
        let items = vec![item("a", "A")];
        adapter.submit(items.clone());
        assert!(adapter.submit(items).is_empty());
    }
}
