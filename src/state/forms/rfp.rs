//! RFP creation/edit form controller

use std::collections::HashMap;

use super::observer::ChangeNotifier;
use super::{PendingSubmit, SubmitOutcome};
use crate::api::{ApiError, RfpApi, RfpPayload};
use crate::state::models::Rfp;
use crate::validation::{
    validate_array, validate_budget_range, validate_date, validate_length, validate_number,
    validate_required, validate_rfp_form, RfpFormValues,
};

/// Scalar fields revalidated per-field on change/blur
const RFP_FIELDS: [&str; 7] = [
    "title",
    "category",
    "description",
    "deadline",
    "budget_min",
    "budget_max",
    "terms_and_conditions",
];

/// Whether the controller creates a new RFP or replaces an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RfpFormMode {
    Create,
    Edit(String),
}

/// Controller for the RFP form
#[derive(Debug)]
pub struct RfpForm {
    mode: RfpFormMode,
    pub values: RfpFormValues,
    field_errors: HashMap<String, String>,
    summary_errors: Vec<String>,
    submit_attempted: bool,
    submitting: bool,
    epoch: u64,
    notifier: ChangeNotifier,
}

impl RfpForm {
    /// Controller for creating a new RFP
    pub fn new() -> Self {
        Self::with_mode(RfpFormMode::Create, RfpFormValues::default())
    }

    /// Controller for editing an existing RFP, seeded from its current state
    pub fn edit(rfp: &Rfp) -> Self {
        Self::with_mode(
            RfpFormMode::Edit(rfp.id.clone()),
            crate::api::rfp_form_values(rfp),
        )
    }

    fn with_mode(mode: RfpFormMode, values: RfpFormValues) -> Self {
        Self {
            mode,
            values,
            field_errors: HashMap::new(),
            summary_errors: Vec::new(),
            submit_attempted: false,
            submitting: false,
            epoch: 0,
            notifier: ChangeNotifier::default(),
        }
    }

    pub fn mode(&self) -> &RfpFormMode {
        &self.mode
    }

    /// Subscribe to state-changed notifications
    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) {
        self.notifier.subscribe(listener);
    }

    pub fn field_error(&self, name: &str) -> Option<&str> {
        self.field_errors.get(name).map(String::as_str)
    }

    pub fn field_errors(&self) -> &HashMap<String, String> {
        &self.field_errors
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

    /// Update a scalar field. The value always changes; the field's error
    /// is only recomputed once a submit has been attempted, so a user who
    /// has not finished typing is not shouted at. Budget edits also refresh
    /// the cross-field range check.
    pub fn set_field(&mut self, name: &str, value: &str) {
        if !self.assign(name, value) {
            tracing::warn!(field = name, "ignoring unknown RFP form field");
            return;
        }

        if self.submit_attempted {
            self.revalidate_field(name);
            if name == "budget_min" || name == "budget_max" {
                self.revalidate_budget_range();
            }
        }

        self.notifier.notify();
    }

    /// Leaving a field always revalidates it, so errors disclose
    /// progressively as the user tabs through.
    pub fn blur_field(&mut self, name: &str) {
        self.revalidate_field(name);
        if name == "budget_min" || name == "budget_max" {
            self.revalidate_budget_range();
        }
        self.notifier.notify();
    }

    /// Replace one requirement line
    pub fn set_requirement(&mut self, index: usize, value: &str) {
        if let Some(slot) = self.values.requirements.get_mut(index) {
            *slot = value.to_string();
            if self.submit_attempted {
                self.revalidate_field("requirements");
            }
            self.notifier.notify();
        }
    }

    /// Append an empty requirement line
    pub fn add_requirement(&mut self) {
        self.values.requirements.push(String::new());
        self.notifier.notify();
    }

    /// Remove a requirement line; the last line always stays
    pub fn remove_requirement(&mut self, index: usize) {
        if self.values.requirements.len() <= 1 || index >= self.values.requirements.len() {
            return;
        }
        self.values.requirements.remove(index);
        if self.submit_attempted {
            self.revalidate_field("requirements");
        }
        self.notifier.notify();
    }

    /// Replace one evaluation criterion line
    pub fn set_criterion(&mut self, index: usize, value: &str) {
        if let Some(slot) = self.values.evaluation_criteria.get_mut(index) {
            *slot = value.to_string();
            if self.submit_attempted {
                self.revalidate_field("evaluation_criteria");
            }
            self.notifier.notify();
        }
    }

    /// Append an empty evaluation criterion line
    pub fn add_criterion(&mut self) {
        self.values.evaluation_criteria.push(String::new());
        self.notifier.notify();
    }

    /// Remove an evaluation criterion line; the last line always stays
    pub fn remove_criterion(&mut self, index: usize) {
        if self.values.evaluation_criteria.len() <= 1
            || index >= self.values.evaluation_criteria.len()
        {
            return;
        }
        self.values.evaluation_criteria.remove(index);
        if self.submit_attempted {
            self.revalidate_field("evaluation_criteria");
        }
        self.notifier.notify();
    }

    /// Choose between saving as draft and publishing on submit
    pub fn set_publish(&mut self, publish: bool) {
        self.values.publish = publish;
        self.notifier.notify();
    }

    /// Invalidate the controller when the user navigates away; any still
    /// in-flight completion will be discarded instead of applied.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.submitting = false;
    }

    /// Validate and, if the form passes, mark the submission in flight and
    /// hand back the wire payload. Returns `None` while a submission is
    /// already in flight or when validation fails (errors populated).
    pub fn try_begin_submit(&mut self) -> Option<PendingSubmit<RfpPayload>> {
        if self.submitting {
            tracing::debug!("submit ignored, already in flight");
            return None;
        }

        self.submit_attempted = true;
        self.summary_errors.clear();
        self.field_errors.clear();

        let validation = validate_rfp_form(&self.values);
        if !validation.is_valid {
            self.summary_errors = validation.errors;
            self.revalidate_all_fields();
            self.notifier.notify();
            return None;
        }

        let Some(payload) = RfpPayload::from_values(&self.values) else {
            // Unreachable after a passing validation, but never panic
            self.summary_errors = vec!["Deadline must be a valid date".to_string()];
            self.notifier.notify();
            return None;
        };

        self.submitting = true;
        self.notifier.notify();
        Some(PendingSubmit {
            epoch: self.epoch,
            payload,
        })
    }

    /// Apply the remote outcome of a pending submission. Completions for a
    /// superseded epoch are discarded without touching state.
    pub fn complete_submit(
        &mut self,
        epoch: u64,
        result: Result<Rfp, ApiError>,
    ) -> SubmitOutcome<Rfp> {
        if epoch != self.epoch {
            tracing::debug!("discarding stale RFP submit result");
            return SubmitOutcome::Stale;
        }

        self.submitting = false;
        let outcome = match result {
            Ok(rfp) => SubmitOutcome::Success(rfp),
            Err(err) => {
                self.summary_errors = err.summary_messages(self.default_error());
                SubmitOutcome::Failed
            }
        };
        self.notifier.notify();
        outcome
    }

    /// Validate, call the backend, and apply the outcome
    pub async fn submit(&mut self, api: &dyn RfpApi) -> SubmitOutcome<Rfp> {
        if self.submitting {
            return SubmitOutcome::InFlight;
        }

        let Some(pending) = self.try_begin_submit() else {
            return SubmitOutcome::Invalid;
        };

        let result = match &self.mode {
            RfpFormMode::Create => api.create_rfp(&pending.payload).await,
            RfpFormMode::Edit(id) => api.update_rfp(id, &pending.payload).await,
        };

        self.complete_submit(pending.epoch, result)
    }

    fn default_error(&self) -> &'static str {
        match self.mode {
            RfpFormMode::Create => "Failed to create RFP",
            RfpFormMode::Edit(_) => "Failed to update RFP",
        }
    }

    fn assign(&mut self, name: &str, value: &str) -> bool {
        let slot = match name {
            "title" => &mut self.values.title,
            "category" => &mut self.values.category,
            "description" => &mut self.values.description,
            "deadline" => &mut self.values.deadline,
            "budget_min" => &mut self.values.budget_min,
            "budget_max" => &mut self.values.budget_max,
            "terms_and_conditions" => &mut self.values.terms_and_conditions,
            _ => return false,
        };
        *slot = value.to_string();
        true
    }

    fn revalidate_all_fields(&mut self) {
        for name in RFP_FIELDS {
            self.revalidate_field(name);
        }
        self.revalidate_field("requirements");
        self.revalidate_field("evaluation_criteria");
        self.revalidate_budget_range();
    }

    fn revalidate_field(&mut self, name: &str) {
        let error = field_error(&self.values, name);
        self.apply_field_error(name, error);
    }

    fn revalidate_budget_range(&mut self) {
        let error = validate_budget_range(&self.values.budget_min, &self.values.budget_max).error;
        self.apply_field_error("budget_range", error);
    }

    fn apply_field_error(&mut self, name: &str, error: Option<String>) {
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

impl Default for RfpForm {
    fn default() -> Self {
        Self::new()
    }
}

/// First failing check for one field, mirroring the composite's rules
fn field_error(values: &RfpFormValues, name: &str) -> Option<String> {
    let result = match name {
        "title" => validate_required(&values.title, "Title")
            .error
            .or_else(|| validate_length(&values.title, "Title", Some(5), Some(200)).error),
        "category" => validate_required(&values.category, "Category").error,
        "description" => validate_required(&values.description, "Description")
            .error
            .or_else(|| {
                validate_length(&values.description, "Description", Some(10), Some(5000)).error
            }),
        "deadline" => validate_date(&values.deadline, "Deadline").error,
        "budget_min" => validate_number(&values.budget_min, "Minimum budget", Some(0.0), None).error,
        "budget_max" => validate_number(&values.budget_max, "Maximum budget", Some(0.0), None).error,
        "terms_and_conditions" => {
            if values.terms_and_conditions.is_empty() {
                None
            } else {
                validate_length(
                    &values.terms_and_conditions,
                    "Terms and conditions",
                    Some(0),
                    Some(10_000),
                )
                .error
            }
        }
        "requirements" => validate_array(&values.requirements, "requirement", Some(1)).error,
        "evaluation_criteria" => {
            validate_array(&values.evaluation_criteria, "evaluation criterion", Some(1)).error
        }
        _ => None,
    };
    result
}
