//! Decision request validation tests
//!
//! Boundary tests for the customer-facing decision payload in storefront-api.

use chrono::NaiveDate;

/// Validate a decision payload (mirrors the handler + engine logic for testing)
fn validate_decision(
    action: &str,
    pause_until: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), &'static str> {
    let action = match action.to_lowercase().as_str() {
        "continue" | "pause" | "cancel" => action.to_lowercase(),
        _ => return Err("Invalid action"),
    };

    if action == "pause" {
        let until = pause_until.ok_or("pause requires a pause_until date")?;
        if until <= today {
            return Err("pause_until must be a future date");
        }
    }

    Ok(())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2026, 1, 29)
}

// ============================================================================
// Valid Decisions
// ============================================================================

#[test]
fn test_valid_continue() {
    assert!(validate_decision("continue", None, today()).is_ok());
}

#[test]
fn test_valid_cancel() {
    assert!(validate_decision("cancel", None, today()).is_ok());
}

#[test]
fn test_valid_pause_with_future_date() {
    assert!(validate_decision("pause", Some(date(2026, 3, 1)), today()).is_ok());
}

#[test]
fn test_valid_pause_tomorrow() {
    assert!(validate_decision("pause", Some(date(2026, 1, 30)), today()).is_ok());
}

#[test]
fn test_valid_mixed_case_action() {
    assert!(validate_decision("Cancel", None, today()).is_ok());
    assert!(validate_decision("PAUSE", Some(date(2026, 3, 1)), today()).is_ok());
}

#[test]
fn test_valid_stray_pause_date_on_cancel() {
    // A stray date on a non-pause action is ignored, not rejected
    assert!(validate_decision("cancel", Some(date(2026, 3, 1)), today()).is_ok());
}

// ============================================================================
// Invalid Decisions - Boundary Tests
// ============================================================================

#[test]
fn test_invalid_unknown_action() {
    assert!(validate_decision("skip", None, today()).is_err());
}

#[test]
fn test_invalid_empty_action() {
    assert!(validate_decision("", None, today()).is_err());
}

#[test]
fn test_invalid_pause_without_date() {
    assert_eq!(
        validate_decision("pause", None, today()),
        Err("pause requires a pause_until date")
    );
}

#[test]
fn test_invalid_pause_today() {
    // Strictly future: today itself is rejected
    assert_eq!(
        validate_decision("pause", Some(today()), today()),
        Err("pause_until must be a future date")
    );
}

#[test]
fn test_invalid_pause_in_past() {
    assert_eq!(
        validate_decision("pause", Some(date(2026, 1, 1)), today()),
        Err("pause_until must be a future date")
    );
}

#[test]
fn test_invalid_action_with_whitespace() {
    assert!(validate_decision(" pause ", Some(date(2026, 3, 1)), today()).is_err());
}

#[test]
fn test_invalid_action_injection_shapes() {
    assert!(validate_decision("pause; drop table", None, today()).is_err());
    assert!(validate_decision("continue\n", None, today()).is_err());
}
