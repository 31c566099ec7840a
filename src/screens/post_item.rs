use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{LostFoundError, Result};
use crate::models::{Category, ContactInfo, Item, ItemType, Location};
use crate::validation::InputValidator;
use crate::viewmodel::ItemViewModel;

/// Contents of the post form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostItemForm {
    /// Title as entered
    pub title: String,
    /// Description as entered
    pub description: String,
    /// Free-text place description
    pub location: String,
    /// Contact phone
    pub contact: String,
    /// Reporter display name
    pub reporter_name: String,
    /// Reporter email
    pub reporter_email: String,
    /// Index into [`Category::all`]
    pub category_index: usize,
    /// Lost or found toggle
    pub item_type: ItemType,
    /// Picked local image, if any
    pub image_uri: Option<String>,
}

impl PostItemForm {
    /// Check the six required fields in form order; the first blank one wins
    pub fn validate(&self) -> Result<()> {
        InputValidator::validate_required("title", "Title", &self.title)?;
        InputValidator::validate_required("description", "Description", &self.description)?;
        InputValidator::validate_required("location", "Location", &self.location)?;
        InputValidator::validate_required("contact", "Contact info", &self.contact)?;
        InputValidator::validate_required("reporter_name", "Name", &self.reporter_name)?;
        InputValidator::validate_required("reporter_email", "Email", &self.reporter_email)?;
        Ok(())
    }

    fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            contact: self.contact.trim().to_string(),
            reporter_name: self.reporter_name.trim().to_string(),
            reporter_email: self.reporter_email.trim().to_string(),
            ..self.clone()
        }
    }

    fn category(&self) -> &'static str {
        Category::all()
            .get(self.category_index)
            .map_or("Other", |category| category.name)
    }

    fn to_item(&self) -> Item {
        let image_uri = self.image_uri.clone().unwrap_or_default();
        Item {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category().to_string(),
            item_type: self.item_type,
            location: Location::described(&self.location),
            date_reported: Utc::now(),
            contact_info: ContactInfo {
                phone: self.contact.clone(),
                email: self.reporter_email.clone(),
                ..ContactInfo::default()
            },
            images: self.image_uri.iter().cloned().collect(),
            image_uri,
            reporter_name: self.reporter_name.clone(),
            reporter_email: self.reporter_email.clone(),
            ..Item::default()
        }
    }
}

/// Form for reporting a lost or found item
pub struct PostItemScreen {
    items: Arc<ItemViewModel>,
    form: PostItemForm,
    field_error: Option<(&'static str, String)>,
    view_items_visible: bool,
}

impl PostItemScreen {
    /// Screen with an empty form
    pub fn new(items: Arc<ItemViewModel>) -> Self {
        Self {
            items,
            form: PostItemForm::default(),
            field_error: None,
            view_items_visible: false,
        }
    }

    /// Current form contents
    pub const fn form(&self) -> &PostItemForm {
        &self.form
    }

    /// Form as edited by the user
    pub fn form_mut(&mut self) -> &mut PostItemForm {
        &mut self.form
    }

    /// Field and message of the last rejected submit
    pub fn field_error(&self) -> Option<(&'static str, &str)> {
        self.field_error.as_ref().map(|(field, message)| (*field, message.as_str()))
    }

    /// Shown after a successful post
    pub const fn view_items_visible(&self) -> bool {
        self.view_items_visible
    }

    /// Disabled while a post is in flight
    pub fn submit_enabled(&self) -> bool {
        !self.items.is_loading().get()
    }

    /// `Posting Item...` while in flight
    pub fn submit_label(&self) -> &'static str {
        if self.items.is_loading().get() {
            "Posting Item..."
        } else {
            "Post Item"
        }
    }

    /// Take a pending holder error as a one-shot message
    pub fn take_error_message(&self) -> Option<String> {
        let error = self.items.error().get()?;
        self.items.clear_error();
        Some(format!("Error: {error}"))
    }

    /// Validate the form and post it.
    ///
    /// An incomplete form is rejected before anything reaches the holder.
    /// Returns the new item id; `None` when posting failed, in which case the
    /// holder's error carries the reason. The form is cleared after success.
    pub async fn submit(&mut self) -> Result<Option<String>> {
        let form = self.form.trimmed();
        if let Err(e) = form.validate() {
            if let LostFoundError::Validation { field, message } = &e {
                self.field_error = Some((*field, message.clone()));
            }
            debug!(error = %e, "Post form rejected");
            return Err(e);
        }
        self.field_error = None;
        self.view_items_visible = false;

        let image_uris: Vec<String> = form.image_uri.iter().cloned().collect();
        let item_id = self
            .items
            .add_item(form.to_item(), image_uris)
            .await
            .map_err(|e| LostFoundError::Other(format!("Post task failed: {e}")))?;

        if let Some(id) = &item_id {
            info!(item_id = %id, "Item posted successfully");
            self.clear_form();
        }
        Ok(item_id)
    }

    fn clear_form(&mut self) {
        self.form = PostItemForm::default();
        self.view_items_visible = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_builds_a_described_item() {
        let form = PostItemForm {
            title: "Blue Backpack".to_string(),
            location: "Library".to_string(),
            contact: "98765".to_string(),
            reporter_email: "a@iiitdm.ac.in".to_string(),
            category_index: 4,
            item_type: ItemType::Found,
            image_uri: Some("file:///tmp/bag.jpg".to_string()),
            ..PostItemForm::default()
        };
        let item = form.to_item();
        assert_eq!(item.category, "Bags & Backpacks");
        assert_eq!(item.location.place_name, "Library");
        assert_eq!(item.contact_info.phone, "98765");
        assert_eq!(item.images, vec!["file:///tmp/bag.jpg".to_string()]);
        assert_eq!(item.image_uri, "file:///tmp/bag.jpg");
    }

    #[test]
    fn out_of_range_category_falls_back_to_other() {
        let form = PostItemForm {
            category_index: 99,
            ..PostItemForm::default()
        };
        assert_eq!(form.category(), "Other");
    }
}
