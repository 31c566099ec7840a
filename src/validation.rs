use crate::error::{LostFoundError, Result};

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Reject an empty (or whitespace-only) required field
    pub fn validate_required(field: &'static str, label: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(LostFoundError::validation(field, format!("{label} is required")));
        }
        Ok(())
    }

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(LostFoundError::validation("email", "Email cannot be empty"));
        }

        if email.len() > 254 {
            return Err(LostFoundError::validation("email", "Email too long (max 254 characters)"));
        }

        let Some((local_part, domain_part)) = email.split_once('@') else {
            return Err(LostFoundError::validation("email", "Email must contain @ symbol"));
        };

        if domain_part.contains('@') {
            return Err(LostFoundError::validation("email", "Email must have exactly one @ symbol"));
        }

        if local_part.is_empty() || local_part.len() > 64 {
            return Err(LostFoundError::validation("email", "Email local part invalid"));
        }

        if domain_part.is_empty() || !domain_part.contains('.') {
            return Err(LostFoundError::validation("email", "Email domain invalid"));
        }

        Ok(())
    }

    /// Accept only addresses at exactly `domain` (case-insensitive)
    pub fn validate_institution_email(email: &str, domain: &str) -> Result<()> {
        let suffix = format!("@{}", domain.to_lowercase());
        if email.trim().to_lowercase().ends_with(&suffix) {
            Ok(())
        } else {
            Err(LostFoundError::DomainNotAllowed(domain.to_string()))
        }
    }

    /// Validate a free-text search query
    pub fn validate_search_query(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(LostFoundError::validation("query", "Search query cannot be empty"));
        }

        if query.len() > 200 {
            return Err(LostFoundError::validation("query", "Search query too long (max 200 characters)"));
        }

        Ok(())
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }
}
