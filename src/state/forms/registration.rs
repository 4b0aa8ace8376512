//! Registration form controller

use std::collections::HashMap;

use super::observer::ChangeNotifier;
use super::{PendingSubmit, SubmitOutcome};
use crate::api::{ApiError, RegisterRequest, RfpApi};
use crate::session::Session;
use crate::state::models::User;
use crate::validation::{
    validate_confirm_password, validate_email, validate_length, validate_password, validate_phone,
    validate_registration_form, validate_required, validate_username, RegistrationFormValues,
    REGISTRATION_ROLES,
};

const REGISTRATION_FIELDS: [&str; 8] = [
    "username",
    "email",
    "password",
    "confirm_password",
    "full_name",
    "role",
    "company_name",
    "phone",
];

/// Controller for the registration form
#[derive(Debug)]
pub struct RegistrationForm {
    pub values: RegistrationFormValues,
    field_errors: HashMap<String, String>,
    summary_errors: Vec<String>,
    submit_attempted: bool,
    submitting: bool,
    epoch: u64,
    notifier: ChangeNotifier,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self {
            values: RegistrationFormValues {
                // The role selector starts on the buyer option
                role: "buyer".to_string(),
                ..RegistrationFormValues::default()
            },
            field_errors: HashMap::new(),
            summary_errors: Vec::new(),
            submit_attempted: false,
            submitting: false,
            epoch: 0,
            notifier: ChangeNotifier::default(),
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) {
        self.notifier.subscribe(listener);
    }

    pub fn field_error(&self, name: &str) -> Option<&str> {
        self.field_errors.get(name).map(String::as_str)
    }

    pub fn summary_errors(&self) -> &[String] {
        &self.summary_errors
    }

    pub fn submit_attempted(&self) -> bool {
        self.submit_attempted
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Update a field. Changing the password also refreshes the confirm
    /// field's error once both are in play, so a stale "Passwords do not
    /// match" never lingers after the password is retyped.
    pub fn set_field(&mut self, name: &str, value: &str) {
        if !self.assign(name, value) {
            tracing::warn!(field = name, "ignoring unknown registration form field");
            return;
        }

        if self.submit_attempted {
            self.revalidate_field(name);
            if name == "password" && !self.values.confirm_password.is_empty() {
                self.revalidate_field("confirm_password");
            }
        }

        self.notifier.notify();
    }

    pub fn blur_field(&mut self, name: &str) {
        self.revalidate_field(name);
        self.notifier.notify();
    }

    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.submitting = false;
    }

    pub fn try_begin_submit(&mut self) -> Option<PendingSubmit<RegisterRequest>> {
        if self.submitting {
            tracing::debug!("submit ignored, already in flight");
            return None;
        }

        self.submit_attempted = true;
        self.summary_errors.clear();
        self.field_errors.clear();

        let validation = validate_registration_form(&self.values);
        if !validation.is_valid {
            self.summary_errors = validation.errors;
            for name in REGISTRATION_FIELDS {
                self.revalidate_field(name);
            }
            self.notifier.notify();
            return None;
        }

        self.submitting = true;
        self.notifier.notify();
        Some(PendingSubmit {
            epoch: self.epoch,
            payload: RegisterRequest {
                username: self.values.username.clone(),
                email: self.values.email.clone(),
                password: self.values.password.clone(),
                full_name: self.values.full_name.clone(),
                role: self.values.role.clone(),
                company_name: optional(&self.values.company_name),
                phone: optional(&self.values.phone),
            },
        })
    }

    pub fn complete_submit(
        &mut self,
        epoch: u64,
        result: Result<User, ApiError>,
    ) -> SubmitOutcome<User> {
        if epoch != self.epoch {
            tracing::debug!("discarding stale registration result");
            return SubmitOutcome::Stale;
        }

        self.submitting = false;
        let outcome = match result {
            Ok(user) => SubmitOutcome::Success(user),
            Err(err) => {
                self.summary_errors = err.summary_messages("Registration failed");
                SubmitOutcome::Failed
            }
        };
        self.notifier.notify();
        outcome
    }

    /// Validate, create the account through the session (which signs in
    /// with the new credentials), and apply the outcome.
    pub async fn submit(
        &mut self,
        session: &mut Session,
        api: &dyn RfpApi,
    ) -> SubmitOutcome<User> {
        if self.submitting {
            return SubmitOutcome::InFlight;
        }

        let Some(pending) = self.try_begin_submit() else {
            return SubmitOutcome::Invalid;
        };

        let result = session.register(api, &pending.payload).await;
        self.complete_submit(pending.epoch, result)
    }

    fn assign(&mut self, name: &str, value: &str) -> bool {
        let slot = match name {
            "username" => &mut self.values.username,
            "email" => &mut self.values.email,
            "password" => &mut self.values.password,
            "confirm_password" => &mut self.values.confirm_password,
            "full_name" => &mut self.values.full_name,
            "role" => &mut self.values.role,
            "company_name" => &mut self.values.company_name,
            "phone" => &mut self.values.phone,
            _ => return false,
        };
        *slot = value.to_string();
        true
    }

    fn revalidate_field(&mut self, name: &str) {
        let error = match name {
            "username" => validate_username(&self.values.username).error,
            "email" => validate_email(&self.values.email).error,
            "password" => validate_password(&self.values.password).error,
            "confirm_password" => {
                validate_confirm_password(&self.values.password, &self.values.confirm_password)
                    .error
            }
            "full_name" => validate_required(&self.values.full_name, "Full name")
                .error
                .or_else(|| {
                    validate_length(&self.values.full_name, "Full name", Some(2), Some(100)).error
                }),
            "role" => {
                if REGISTRATION_ROLES.contains(&self.values.role.as_str()) {
                    None
                } else {
                    Some("Please select a valid role".to_string())
                }
            }
            "company_name" => {
                if self.values.company_name.is_empty() {
                    None
                } else {
                    validate_length(&self.values.company_name, "Company name", Some(0), Some(100))
                        .error
                }
            }
            "phone" => {
                if self.values.phone.is_empty() {
                    None
                } else {
                    validate_phone(&self.values.phone).error
                }
            }
            _ => return,
        };

        match error {
            Some(error) => {
                self.field_errors.insert(name.to_string(), error);
            }
            None => {
                self.field_errors.remove(name);
            }
        }
    }
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self::new()
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthTokens, MockRfpApi};
    use crate::session::SessionStore;
    use tempfile::tempdir;

    fn sample_user() -> User {
        serde_json::from_value(serde_json::json!({
            "id": "user-1",
            "username": "supplier_01",
            "email": "supplier@example.com",
            "full_name": "Sam Supplier",
            "role": "supplier",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn filled_form() -> RegistrationForm {
        let mut form = RegistrationForm::new();
        form.set_field("username", "supplier_01");
        form.set_field("email", "supplier@example.com");
        form.set_field("password", "Secret1");
        form.set_field("confirm_password", "Secret1");
        form.set_field("full_name", "Sam Supplier");
        form.set_field("role", "supplier");
        form
    }

    #[test]
    fn test_role_defaults_to_buyer() {
        let form = RegistrationForm::new();
        assert_eq!(form.values.role, "buyer");
    }

    #[test]
    fn test_password_change_refreshes_confirm_error() {
        let mut form = filled_form();
        form.set_field("confirm_password", "Different1");
        assert!(form.try_begin_submit().is_none());
        assert_eq!(
            form.field_error("confirm_password"),
            Some("Passwords do not match")
        );

        // Fixing the password side clears the confirm error too
        form.set_field("password", "Different1");
        assert!(form.field_error("confirm_password").is_none());
    }

    #[test]
    fn test_optional_fields_absent_from_payload_when_empty() {
        let mut form = filled_form();
        let pending = form.try_begin_submit().unwrap();
        assert_eq!(pending.payload.company_name, None);
        assert_eq!(pending.payload.phone, None);
    }

    #[test]
    fn test_optional_fields_carried_when_present() {
        let mut form = filled_form();
        form.set_field("company_name", "Acme Supplies");
        form.set_field("phone", "+15551234567");

        let pending = form.try_begin_submit().unwrap();
        assert_eq!(
            pending.payload.company_name.as_deref(),
            Some("Acme Supplies")
        );
        assert_eq!(pending.payload.phone.as_deref(), Some("+15551234567"));
    }

    #[test]
    fn test_invalid_role_blocks_submit() {
        let mut form = filled_form();
        form.set_field("role", "admin");
        assert!(form.try_begin_submit().is_none());
        assert_eq!(form.field_error("role"), Some("Please select a valid role"));
    }

    #[test]
    fn test_blur_validates_immediately() {
        let mut form = RegistrationForm::new();
        form.set_field("email", "not-an-email");
        form.blur_field("email");
        assert_eq!(
            form.field_error("email"),
            Some("Please enter a valid email address")
        );
    }

    #[tokio::test]
    async fn test_submit_registers_and_signs_in() {
        let dir = tempdir().unwrap();
        let mut session = Session::new(SessionStore::with_path(dir.path().join("session.json")));

        let mut api = MockRfpApi::new();
        api.expect_register()
            .withf(|data| data.username == "supplier_01")
            .times(1)
            .returning(|_| Ok(sample_user()));
        api.expect_login().times(1).returning(|_| {
            Ok(AuthTokens {
                access_token: "tok-new".to_string(),
                token_type: String::new(),
            })
        });
        api.expect_set_token().times(1).return_const(());
        api.expect_me().times(1).returning(|| Ok(sample_user()));

        let mut form = filled_form();
        let outcome = form.submit(&mut session, &api).await;

        assert!(outcome.is_success());
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_duplicate_username_surfaces_server_message() {
        let dir = tempdir().unwrap();
        let mut session = Session::new(SessionStore::with_path(dir.path().join("session.json")));

        let mut api = MockRfpApi::new();
        api.expect_register().times(1).returning(|_| {
            Err(ApiError::Api {
                status: 400,
                message: "Username already registered".to_string(),
            })
        });

        let mut form = filled_form();
        let outcome = form.submit(&mut session, &api).await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(
            form.summary_errors(),
            ["Username already registered".to_string()]
        );
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_api() {
        let dir = tempdir().unwrap();
        let mut session = Session::new(SessionStore::with_path(dir.path().join("session.json")));

        let mut api = MockRfpApi::new();
        api.expect_register().times(0);

        let mut form = RegistrationForm::new();
        let outcome = form.submit(&mut session, &api).await;
        assert_eq!(outcome, SubmitOutcome::Invalid);
    }
}
