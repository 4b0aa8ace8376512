//! Supplier response form controller

use std::collections::HashMap;

use super::observer::ChangeNotifier;
use super::{PendingSubmit, SubmitOutcome};
use crate::api::{ApiError, ResponsePayload, RfpApi};
use crate::state::models::{ResponseStatus, RfpResponse};
use crate::validation::{
    validate_length, validate_required, validate_response_form, ResponseFormValues,
};

const RESPONSE_FIELDS: [&str; 5] = [
    "proposal",
    "proposed_budget",
    "timeline",
    "methodology",
    "team_details",
];

/// Controller for the response form, bound to the RFP being answered
#[derive(Debug)]
pub struct ResponseForm {
    rfp_id: String,
    pub values: ResponseFormValues,
    field_errors: HashMap<String, String>,
    summary_errors: Vec<String>,
    submit_attempted: bool,
    submitting: bool,
    epoch: u64,
    notifier: ChangeNotifier,
}

impl ResponseForm {
    pub fn new(rfp_id: impl Into<String>) -> Self {
        Self {
            rfp_id: rfp_id.into(),
            values: ResponseFormValues::default(),
            field_errors: HashMap::new(),
            summary_errors: Vec::new(),
            submit_attempted: false,
            submitting: false,
            epoch: 0,
            notifier: ChangeNotifier::default(),
        }
    }

    pub fn rfp_id(&self) -> &str {
        &self.rfp_id
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
        if !self.assign(name, value) {
            tracing::warn!(field = name, "ignoring unknown response form field");
            return;
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

    /// Validate and, if the form passes, mark the submission in flight and
    /// hand back the wire payload with the requested status (draft or
    /// submitted).
    pub fn try_begin_submit(
        &mut self,
        status: ResponseStatus,
    ) -> Option<PendingSubmit<ResponsePayload>> {
        if self.submitting {
            tracing::debug!("submit ignored, already in flight");
            return None;
        }

        self.submit_attempted = true;
        self.summary_errors.clear();
        self.field_errors.clear();

        let validation = validate_response_form(&self.values);
        if !validation.is_valid {
            self.summary_errors = validation.errors;
            for name in RESPONSE_FIELDS {
                self.revalidate_field(name);
            }
            self.notifier.notify();
            return None;
        }

        self.submitting = true;
        self.notifier.notify();
        Some(PendingSubmit {
            epoch: self.epoch,
            payload: ResponsePayload::from_values(&self.values, status),
        })
    }

    pub fn complete_submit(
        &mut self,
        epoch: u64,
        result: Result<RfpResponse, ApiError>,
    ) -> SubmitOutcome<RfpResponse> {
        if epoch != self.epoch {
            tracing::debug!("discarding stale response submit result");
            return SubmitOutcome::Stale;
        }

        self.submitting = false;
        let outcome = match result {
            Ok(response) => SubmitOutcome::Success(response),
            Err(err) => {
                self.summary_errors = err.summary_messages("Failed to submit response");
                SubmitOutcome::Failed
            }
        };
        self.notifier.notify();
        outcome
    }

    /// Validate, send the response to the backend, and apply the outcome
    pub async fn submit(
        &mut self,
        api: &dyn RfpApi,
        status: ResponseStatus,
    ) -> SubmitOutcome<RfpResponse> {
        if self.submitting {
            return SubmitOutcome::InFlight;
        }

        let Some(pending) = self.try_begin_submit(status) else {
            return SubmitOutcome::Invalid;
        };

        let result = api.submit_response(&self.rfp_id, &pending.payload).await;
        self.complete_submit(pending.epoch, result)
    }

    fn assign(&mut self, name: &str, value: &str) -> bool {
        let slot = match name {
            "proposal" => &mut self.values.proposal,
            "proposed_budget" => &mut self.values.proposed_budget,
            "timeline" => &mut self.values.timeline,
            "methodology" => &mut self.values.methodology,
            "team_details" => &mut self.values.team_details,
            "additional_notes" => &mut self.values.additional_notes,
            _ => return false,
        };
        *slot = value.to_string();
        true
    }

    fn revalidate_field(&mut self, name: &str) {
        let error = match name {
            "proposal" => {
                let required = validate_required(&self.values.proposal, "Proposal");
                if required.is_valid {
                    validate_length(&self.values.proposal, "Proposal", Some(50), Some(5000)).error
                } else {
                    required.error
                }
            }
            "proposed_budget" => budget_error(&self.values.proposed_budget),
            "timeline" => optional_length(&self.values.timeline, "Timeline", 10, 500),
            "methodology" => optional_length(&self.values.methodology, "Methodology", 20, 2000),
            "team_details" => optional_length(&self.values.team_details, "Team Details", 20, 1000),
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

fn optional_length(value: &str, field: &str, min: usize, max: usize) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        validate_length(value, field, Some(min), Some(max)).error
    }
}

fn budget_error(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    match value.trim().parse::<f64>().ok().filter(|n| n.is_finite()) {
        None => Some("Proposed budget must be a valid number".to_string()),
        Some(budget) if budget < 0.0 => Some("Proposed budget must be positive".to_string()),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockRfpApi;

    fn sample_response() -> RfpResponse {
        serde_json::from_value(serde_json::json!({
            "id": "resp-1",
            "rfp_id": "rfp-1",
            "submitted_by": "user-2",
            "proposal": "p".repeat(60),
            "status": "submitted",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn filled_form() -> ResponseForm {
        let mut form = ResponseForm::new("rfp-1");
        form.set_field("proposal", &"p".repeat(60));
        form
    }

    #[test]
    fn test_empty_submit_reports_proposal_only() {
        let mut form = ResponseForm::new("rfp-1");
        assert!(form.try_begin_submit(ResponseStatus::Submitted).is_none());
        assert_eq!(form.summary_errors(), ["Proposal is required".to_string()]);
        assert_eq!(form.field_error("proposal"), Some("Proposal is required"));
    }

    #[test]
    fn test_change_only_revalidates_after_submit_attempt() {
        let mut form = ResponseForm::new("rfp-1");
        form.set_field("timeline", "soon");
        assert!(form.field_error("timeline").is_none());

        assert!(form.try_begin_submit(ResponseStatus::Submitted).is_none());
        form.set_field("timeline", "short");
        assert_eq!(
            form.field_error("timeline"),
            Some("Timeline must be at least 10 characters long")
        );
    }

    #[test]
    fn test_blur_always_validates() {
        let mut form = ResponseForm::new("rfp-1");
        form.set_field("methodology", "agile");
        form.blur_field("methodology");
        assert_eq!(
            form.field_error("methodology"),
            Some("Methodology must be at least 20 characters long")
        );
    }

    #[test]
    fn test_negative_budget_is_rejected() {
        let mut form = filled_form();
        form.set_field("proposed_budget", "-10");
        form.blur_field("proposed_budget");
        assert_eq!(
            form.field_error("proposed_budget"),
            Some("Proposed budget must be positive")
        );
    }

    #[test]
    fn test_draft_and_submit_statuses_reach_payload() {
        let mut form = filled_form();
        let pending = form.try_begin_submit(ResponseStatus::Draft).unwrap();
        assert_eq!(pending.payload.status, ResponseStatus::Draft);
        form.complete_submit(pending.epoch, Ok(sample_response()));

        let pending = form.try_begin_submit(ResponseStatus::Submitted).unwrap();
        assert_eq!(pending.payload.status, ResponseStatus::Submitted);
    }

    #[tokio::test]
    async fn test_submit_targets_the_bound_rfp() {
        let mut api = MockRfpApi::new();
        api.expect_submit_response()
            .withf(|rfp_id, payload| rfp_id == "rfp-1" && payload.status == ResponseStatus::Submitted)
            .times(1)
            .returning(|_, _| Ok(sample_response()));

        let mut form = filled_form();
        let outcome = form.submit(&api, ResponseStatus::Submitted).await;
        assert!(outcome.is_success());
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_closed_rfp_failure_surfaces_server_message() {
        let mut api = MockRfpApi::new();
        api.expect_submit_response().times(1).returning(|_, _| {
            Err(ApiError::Api {
                status: 400,
                message: "RFP is not accepting responses".to_string(),
            })
        });

        let mut form = filled_form();
        let outcome = form.submit(&api, ResponseStatus::Submitted).await;
        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(
            form.summary_errors(),
            ["RFP is not accepting responses".to_string()]
        );
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_api() {
        let mut api = MockRfpApi::new();
        api.expect_submit_response().times(0);

        let mut form = ResponseForm::new("rfp-1");
        let outcome = form.submit(&api, ResponseStatus::Submitted).await;
        assert_eq!(outcome, SubmitOutcome::Invalid);
    }

    #[test]
    fn test_duplicate_submit_is_gated() {
        let mut form = filled_form();
        assert!(form.try_begin_submit(ResponseStatus::Submitted).is_some());
        assert!(form.try_begin_submit(ResponseStatus::Submitted).is_none());
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut form = filled_form();
        let pending = form.try_begin_submit(ResponseStatus::Submitted).unwrap();
        form.invalidate();
        assert_eq!(
            form.complete_submit(pending.epoch, Ok(sample_response())),
            SubmitOutcome::Stale
        );
    }
}
