//! Unit tests for validation.rs module

use lost_and_found::screens::PostItemForm;
use lost_and_found::validation::InputValidator;
use lost_and_found::LostFoundError;

fn complete_form() -> PostItemForm {
    PostItemForm {
        title: "Blue Backpack".to_string(),
        description: "Left near the library entrance".to_string(),
        location: "Library".to_string(),
        contact: "9876543210".to_string(),
        reporter_name: "Meera".to_string(),
        reporter_email: "meera@iiitdm.ac.in".to_string(),
        ..PostItemForm::default()
    }
}

fn failing_field(result: lost_and_found::Result<()>) -> &'static str {
    match result {
        Err(LostFoundError::Validation { field, .. }) => field,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_validate_required() {
    assert!(InputValidator::validate_required("title", "Title", "Umbrella").is_ok());

    let err = InputValidator::validate_required("title", "Title", "   ").unwrap_err();
    assert_eq!(err.to_string(), "Title is required");
}

#[test]
fn test_complete_post_form_passes() {
    assert!(complete_form().validate().is_ok());
}

#[test]
fn test_post_form_reports_first_missing_field() {
    let mut form = complete_form();
    form.location.clear();
    form.reporter_email.clear();
    assert_eq!(failing_field(form.validate()), "location");

    let mut form = complete_form();
    form.title = " ".to_string();
    form.description.clear();
    assert_eq!(failing_field(form.validate()), "title");

    let mut form = complete_form();
    form.reporter_name.clear();
    let err = form.validate().unwrap_err();
    assert_eq!(err.to_string(), "Name is required");
}

#[test]
fn test_post_form_does_not_require_image() {
    let mut form = complete_form();
    form.image_uri = None;
    assert!(form.validate().is_ok());
}

#[test]
fn test_validate_email() {
    assert!(InputValidator::validate_email("student@iiitdm.ac.in").is_ok());
    assert!(InputValidator::validate_email("").is_err());
    assert!(InputValidator::validate_email("no-at-sign").is_err());
    assert!(InputValidator::validate_email("two@@iiitdm.ac.in").is_err());
    assert!(InputValidator::validate_email("@iiitdm.ac.in").is_err());
    assert!(InputValidator::validate_email("user@localhost").is_err());

    let long_local = format!("{}@iiitdm.ac.in", "a".repeat(65));
    assert!(InputValidator::validate_email(&long_local).is_err());
}

#[test]
fn test_validate_institution_email() {
    let domain = "iiitdm.ac.in";
    assert!(InputValidator::validate_institution_email("cs21b001@iiitdm.ac.in", domain).is_ok());
    assert!(InputValidator::validate_institution_email("CS21B001@IIITDM.AC.IN", domain).is_ok());

    for email in ["someone@gmail.com", "someone@fake-iiitdm.ac.in", "iiitdm.ac.in", ""] {
        let err = InputValidator::validate_institution_email(email, domain).unwrap_err();
        assert!(matches!(err, LostFoundError::DomainNotAllowed(_)), "{email:?}");
        assert_eq!(err.to_string(), "Only @iiitdm.ac.in emails are allowed");
    }
}

#[test]
fn test_validate_search_query() {
    assert!(InputValidator::validate_search_query("wallet").is_ok());
    assert!(InputValidator::validate_search_query("   ").is_err());
    assert!(InputValidator::validate_search_query(&"x".repeat(201)).is_err());
    assert!(InputValidator::validate_search_query(&"x".repeat(200)).is_ok());
}

#[test]
fn test_sanitize_text() {
    assert_eq!(InputValidator::sanitize_text("  Blue Backpack \u{0007}"), "Blue Backpack");
    assert_eq!(InputValidator::sanitize_text("line one\nline two"), "line one\nline two");
    assert_eq!(InputValidator::sanitize_text("\u{0000}"), "");
}
