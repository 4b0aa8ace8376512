//! Whole-form composite validators
//!
//! Each composite runs its field validators in declaration order and
//! collects every failing message into one flat list. Composites never
//! short-circuit: all applicable checks run even after earlier failures,
//! so a form with several problems reports all of them at once.

use super::field::{
    validate_array, validate_budget_range, validate_confirm_password, validate_date,
    validate_email, validate_length, validate_number, validate_password, validate_phone,
    validate_required, validate_username, FieldValidationResult,
};

/// Aggregated outcome of a composite validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Build a result from collected error messages; valid iff empty
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Collects failing field results, in order
#[derive(Debug, Default)]
struct ErrorCollector {
    errors: Vec<String>,
}

impl ErrorCollector {
    fn check(&mut self, result: FieldValidationResult) {
        if let Some(error) = result.error {
            self.errors.push(error);
        }
    }

    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn finish(self) -> ValidationResult {
        ValidationResult::from_errors(self.errors)
    }
}

/// Raw values of the login form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFormValues {
    pub username: String,
    pub password: String,
}

/// Raw values of the registration form. `role` stays a raw string until
/// validation because the user may not have picked one yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationFormValues {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub role: String,
    pub company_name: String,
    pub phone: String,
}

/// Raw values of the RFP creation/edit form. Requirements and criteria are
/// kept verbatim while editing (blank lines included); blanks are only
/// dropped at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfpFormValues {
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget_min: String,
    pub budget_max: String,
    pub deadline: String,
    pub requirements: Vec<String>,
    pub evaluation_criteria: Vec<String>,
    pub terms_and_conditions: String,
    pub publish: bool,
}

impl Default for RfpFormValues {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: String::new(),
            budget_min: String::new(),
            budget_max: String::new(),
            deadline: String::new(),
            // Start with one empty line so the edit surface has a row
            requirements: vec![String::new()],
            evaluation_criteria: vec![String::new()],
            terms_and_conditions: String::new(),
            publish: false,
        }
    }
}

/// Raw values of the supplier response form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFormValues {
    pub proposal: String,
    pub proposed_budget: String,
    pub timeline: String,
    pub methodology: String,
    pub team_details: String,
    pub additional_notes: String,
}

/// Validate the login form
pub fn validate_login_form(values: &LoginFormValues) -> ValidationResult {
    let mut errors = ErrorCollector::default();

    errors.check(validate_required(&values.username, "Username"));
    errors.check(validate_required(&values.password, "Password"));

    errors.finish()
}

/// Valid values of the registration role selector
pub const REGISTRATION_ROLES: [&str; 2] = ["buyer", "supplier"];

/// Validate the registration form
pub fn validate_registration_form(values: &RegistrationFormValues) -> ValidationResult {
    let mut errors = ErrorCollector::default();

    errors.check(validate_username(&values.username));
    errors.check(validate_email(&values.email));
    errors.check(validate_password(&values.password));
    errors.check(validate_confirm_password(
        &values.password,
        &values.confirm_password,
    ));
    errors.check(validate_required(&values.full_name, "Full name"));
    errors.check(validate_length(
        &values.full_name,
        "Full name",
        Some(2),
        Some(100),
    ));

    if !REGISTRATION_ROLES.contains(&values.role.as_str()) {
        errors.push("Please select a valid role");
    }

    if !values.phone.is_empty() {
        errors.check(validate_phone(&values.phone));
    }

    if !values.company_name.is_empty() {
        errors.check(validate_length(
            &values.company_name,
            "Company name",
            Some(0),
            Some(100),
        ));
    }

    errors.finish()
}

/// Validate the RFP form.
///
/// The budget range check runs in addition to the per-field numeric checks,
/// so one bad budget value can produce both a field message and a range
/// message.
pub fn validate_rfp_form(values: &RfpFormValues) -> ValidationResult {
    let mut errors = ErrorCollector::default();

    errors.check(validate_required(&values.title, "Title"));
    errors.check(validate_length(&values.title, "Title", Some(5), Some(200)));
    errors.check(validate_required(&values.category, "Category"));
    errors.check(validate_required(&values.description, "Description"));
    errors.check(validate_length(
        &values.description,
        "Description",
        Some(10),
        Some(5000),
    ));
    errors.check(validate_date(&values.deadline, "Deadline"));
    errors.check(validate_number(
        &values.budget_min,
        "Minimum budget",
        Some(0.0),
        None,
    ));
    errors.check(validate_number(
        &values.budget_max,
        "Maximum budget",
        Some(0.0),
        None,
    ));
    errors.check(validate_budget_range(&values.budget_min, &values.budget_max));
    errors.check(validate_array(&values.requirements, "requirement", Some(1)));
    errors.check(validate_array(
        &values.evaluation_criteria,
        "evaluation criterion",
        Some(1),
    ));

    errors.finish()
}

/// Validate the supplier response form. The proposal is required; the other
/// fields only have length/number constraints when present.
pub fn validate_response_form(values: &ResponseFormValues) -> ValidationResult {
    let mut errors = ErrorCollector::default();

    let proposal_required = validate_required(&values.proposal, "Proposal");
    if proposal_required.is_valid {
        errors.check(validate_length(
            &values.proposal,
            "Proposal",
            Some(50),
            Some(5000),
        ));
    } else {
        errors.check(proposal_required);
    }

    if !values.proposed_budget.is_empty() {
        match super::field::parse_number(values.proposed_budget.trim()) {
            None => errors.push("Proposed budget must be a valid number"),
            Some(budget) if budget < 0.0 => errors.push("Proposed budget must be positive"),
            Some(_) => {}
        }
    }

    if !values.timeline.is_empty() {
        errors.check(validate_length(&values.timeline, "Timeline", Some(10), Some(500)));
    }

    if !values.methodology.is_empty() {
        errors.check(validate_length(
            &values.methodology,
            "Methodology",
            Some(20),
            Some(2000),
        ));
    }

    if !values.team_details.is_empty() {
        errors.check(validate_length(
            &values.team_details,
            "Team Details",
            Some(20),
            Some(1000),
        ));
    }

    errors.finish()
}
