//! Login form controller

use std::collections::HashMap;

use super::observer::ChangeNotifier;
use super::{PendingSubmit, SubmitOutcome};
use crate::api::{ApiError, LoginRequest, RfpApi};
use crate::session::Session;
use crate::state::models::User;
use crate::validation::{validate_login_form, validate_required, LoginFormValues};

/// Controller for the login form
#[derive(Debug, Default)]
pub struct LoginForm {
    pub values: LoginFormValues,
    field_errors: HashMap<String, String>,
    summary_errors: Vec<String>,
    submit_attempted: bool,
    submitting: bool,
    epoch: u64,
    notifier: ChangeNotifier,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
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

    pub fn set_field(&mut self, name: &str, value: &str) {
        match name {
            "username" => self.values.username = value.to_string(),
            "password" => self.values.password = value.to_string(),
            _ => {
                tracing::warn!(field = name, "ignoring unknown login form field");
                return;
            }
        }
        if self.submit_attempted {
            self.revalidate_field(name);
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

    /// Validate and, if both fields are present, mark the submission in
    /// flight and hand back the credential payload.
    pub fn try_begin_submit(&mut self) -> Option<PendingSubmit<LoginRequest>> {
        if self.submitting {
            tracing::debug!("submit ignored, already in flight");
            return None;
        }

        self.submit_attempted = true;
        self.summary_errors.clear();
        self.field_errors.clear();

        let validation = validate_login_form(&self.values);
        if !validation.is_valid {
            self.summary_errors = validation.errors;
            self.revalidate_field("username");
            self.revalidate_field("password");
            self.notifier.notify();
            return None;
        }

        self.submitting = true;
        self.notifier.notify();
        Some(PendingSubmit {
            epoch: self.epoch,
            payload: LoginRequest {
                username: self.values.username.clone(),
                password: self.values.password.clone(),
            },
        })
    }

    pub fn complete_submit(
        &mut self,
        epoch: u64,
        result: Result<User, ApiError>,
    ) -> SubmitOutcome<User> {
        if epoch != self.epoch {
            tracing::debug!("discarding stale login result");
            return SubmitOutcome::Stale;
        }

        self.submitting = false;
        let outcome = match result {
            Ok(user) => SubmitOutcome::Success(user),
            Err(err) => {
                self.summary_errors = err.summary_messages("Login failed");
                SubmitOutcome::Failed
            }
        };
        self.notifier.notify();
        outcome
    }

    /// Validate, sign in through the session, and apply the outcome
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

        let result = session.login(api, &pending.payload).await;
        self.complete_submit(pending.epoch, result)
    }

    fn revalidate_field(&mut self, name: &str) {
        let error = match name {
            "username" => validate_required(&self.values.username, "Username").error,
            "password" => validate_required(&self.values.password, "Password").error,
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
