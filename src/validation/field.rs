//! Field-level validators
//!
//! Each validator checks one rule against a raw string and reports the
//! outcome through [`FieldValidationResult`]. Validators never panic and
//! have no side effects; an invalid value is always signalled through the
//! returned result.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Outcome of a single field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl FieldValidationResult {
    /// A passing result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    /// A failing result carrying a user-facing message
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }

    /// The error message, if the check failed
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Required field: the trimmed value must be non-empty
pub fn validate_required(value: &str, field_name: &str) -> FieldValidationResult {
    if value.trim().is_empty() {
        return FieldValidationResult::fail(format!("{field_name} is required"));
    }

    FieldValidationResult::ok()
}

/// Length bounds on the trimmed value. A missing bound is unconstrained.
pub fn validate_length(
    value: &str,
    field_name: &str,
    min: Option<usize>,
    max: Option<usize>,
) -> FieldValidationResult {
    let len = value.trim().chars().count();

    if let Some(min) = min {
        if len < min {
            return FieldValidationResult::fail(format!(
                "{field_name} must be at least {min} characters long"
            ));
        }
    }

    if let Some(max) = max {
        if len > max {
            return FieldValidationResult::fail(format!(
                "{field_name} cannot exceed {max} characters"
            ));
        }
    }

    FieldValidationResult::ok()
}

/// Optional numeric field: empty passes, anything else must parse and fall
/// within the given bounds.
pub fn validate_number(
    value: &str,
    field_name: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> FieldValidationResult {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        // Empty is valid for optional fields
        return FieldValidationResult::ok();
    }

    let Some(number) = parse_number(trimmed) else {
        return FieldValidationResult::fail(format!("{field_name} must be a valid number"));
    };

    if let Some(min) = min {
        if number < min {
            return FieldValidationResult::fail(format!("{field_name} must be at least {min}"));
        }
    }

    if let Some(max) = max {
        if number > max {
            return FieldValidationResult::fail(format!("{field_name} cannot exceed {max}"));
        }
    }

    FieldValidationResult::ok()
}

/// Required date field that must parse and lie strictly in the future,
/// evaluated against the local clock at validation time.
pub fn validate_date(value: &str, field_name: &str) -> FieldValidationResult {
    if value.trim().is_empty() {
        return FieldValidationResult::fail(format!("{field_name} is required"));
    }

    let Some(date) = parse_date_input(value.trim()) else {
        return FieldValidationResult::fail(format!("{field_name} must be a valid date"));
    };

    if date <= Local::now().naive_local() {
        return FieldValidationResult::fail(format!("{field_name} must be in the future"));
    }

    FieldValidationResult::ok()
}

/// Required email with a `local@domain.tld` shape: no whitespace, exactly
/// one `@`, and at least one interior dot after it.
pub fn validate_email(email: &str) -> FieldValidationResult {
    if email.trim().is_empty() {
        return FieldValidationResult::fail("Email is required");
    }

    if !is_email_shaped(email) {
        return FieldValidationResult::fail("Please enter a valid email address");
    }

    FieldValidationResult::ok()
}

/// Username: required, 3-30 characters, letters/digits/underscore only
pub fn validate_username(username: &str) -> FieldValidationResult {
    if username.trim().is_empty() {
        return FieldValidationResult::fail("Username is required");
    }

    let len = username.chars().count();
    if len < 3 {
        return FieldValidationResult::fail("Username must be at least 3 characters long");
    }

    if len > 30 {
        return FieldValidationResult::fail("Username cannot exceed 30 characters");
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return FieldValidationResult::fail(
            "Username can only contain letters, numbers, and underscores",
        );
    }

    FieldValidationResult::ok()
}

/// Password: required, at least 6 characters, with at least one lowercase
/// letter, one uppercase letter, and one digit.
pub fn validate_password(password: &str) -> FieldValidationResult {
    if password.is_empty() {
        return FieldValidationResult::fail("Password is required");
    }

    if password.chars().count() < 6 {
        return FieldValidationResult::fail("Password must be at least 6 characters long");
    }

    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_lowercase || !has_uppercase || !has_digit {
        return FieldValidationResult::fail(
            "Password must contain at least one lowercase letter, one uppercase letter, and one number",
        );
    }

    FieldValidationResult::ok()
}

/// Confirm-password must be present and equal to the primary password,
/// case-sensitively.
pub fn validate_confirm_password(password: &str, confirm_password: &str) -> FieldValidationResult {
    if confirm_password.is_empty() {
        return FieldValidationResult::fail("Please confirm your password");
    }

    if password != confirm_password {
        return FieldValidationResult::fail("Passwords do not match");
    }

    FieldValidationResult::ok()
}

/// Optional phone number in a loose E.164 shape: an optional `+`, a leading
/// non-zero digit, and at most 15 further digits. No separators.
pub fn validate_phone(phone: &str) -> FieldValidationResult {
    if phone.trim().is_empty() {
        // Phone is optional
        return FieldValidationResult::ok();
    }

    if !is_phone_shaped(phone) {
        return FieldValidationResult::fail("Please enter a valid phone number");
    }

    FieldValidationResult::ok()
}

/// Free-text line arrays (requirements, evaluation criteria): blank entries
/// are ignored, and at least `min_items` non-blank entries must remain.
pub fn validate_array(
    items: &[String],
    field_name: &str,
    min_items: Option<usize>,
) -> FieldValidationResult {
    let non_blank = items.iter().filter(|item| !item.trim().is_empty()).count();

    if let Some(min_items) = min_items {
        if min_items > 0 && non_blank < min_items {
            let verb = if min_items == 1 { "is" } else { "are" };
            return FieldValidationResult::fail(format!(
                "At least {min_items} {} {verb} required",
                field_name.to_lowercase()
            ));
        }
    }

    FieldValidationResult::ok()
}

/// Budget range: both empty is fine, and when both are present they must be
/// numeric with min <= max. A single bound on its own passes.
pub fn validate_budget_range(min_budget: &str, max_budget: &str) -> FieldValidationResult {
    let min_budget = min_budget.trim();
    let max_budget = max_budget.trim();

    if min_budget.is_empty() && max_budget.is_empty() {
        return FieldValidationResult::ok();
    }

    if !min_budget.is_empty() && !max_budget.is_empty() {
        let (Some(min), Some(max)) = (parse_number(min_budget), parse_number(max_budget)) else {
            return FieldValidationResult::fail("Budget values must be valid numbers");
        };

        if min > max {
            return FieldValidationResult::fail(
                "Minimum budget cannot be greater than maximum budget",
            );
        }
    }

    FieldValidationResult::ok()
}

/// Parse a finite float, rejecting NaN/infinity spellings
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a date input as entered in a form (naive local time).
///
/// Accepts `datetime-local` values with or without seconds, bare dates
/// (midnight), and RFC 3339 timestamps (converted to local time).
pub fn parse_date_input(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?);
    }

    None
}

fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || domain.is_empty() {
        return false;
    }

    // At least one dot with something on both sides
    domain
        .bytes()
        .enumerate()
        .any(|(i, b)| b == b'.' && i > 0 && i + 1 < domain.len())
}

fn is_phone_shaped(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let bytes = digits.as_bytes();

    !bytes.is_empty()
        && bytes.len() <= 16
        && (b'1'..=b'9').contains(&bytes[0])
        && bytes.iter().all(u8::is_ascii_digit)
}
