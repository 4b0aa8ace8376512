//! Wire payload construction
//!
//! Builders take validated form values and produce the JSON bodies the
//! backend expects. Empty optional numeric fields are omitted entirely so
//! the backend can tell "not specified" from "specified as 0", blank
//! array entries are dropped, and the locally-entered deadline is
//! normalized to an absolute RFC 3339 timestamp.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::state::models::{ResponseStatus, Rfp, RfpStatus};
use crate::validation::{parse_date_input, RfpFormValues, ResponseFormValues};

/// Body of `POST /rfps` and `PUT /rfps/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfpPayload {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<f64>,
    pub deadline: String,
    pub requirements: Vec<String>,
    pub evaluation_criteria: Vec<String>,
    pub terms_and_conditions: String,
    pub status: RfpStatus,
}

impl RfpPayload {
    /// Build the wire payload from validated form values.
    ///
    /// Returns `None` only if the deadline does not parse, which composite
    /// validation has already ruled out on the submit path.
    pub fn from_values(values: &RfpFormValues) -> Option<Self> {
        let deadline = normalize_deadline(&values.deadline)?;

        Some(Self {
            title: values.title.clone(),
            description: values.description.clone(),
            category: values.category.clone(),
            budget_min: optional_number(&values.budget_min),
            budget_max: optional_number(&values.budget_max),
            deadline,
            requirements: drop_blank_lines(&values.requirements),
            evaluation_criteria: drop_blank_lines(&values.evaluation_criteria),
            terms_and_conditions: values.terms_and_conditions.clone(),
            status: if values.publish {
                RfpStatus::Published
            } else {
                RfpStatus::Draft
            },
        })
    }
}

/// Body of `POST /rfps/{id}/responses`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsePayload {
    pub proposal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_budget: Option<f64>,
    pub timeline: String,
    pub methodology: String,
    pub team_details: String,
    pub additional_notes: String,
    pub status: ResponseStatus,
}

impl ResponsePayload {
    pub fn from_values(values: &ResponseFormValues, status: ResponseStatus) -> Self {
        Self {
            proposal: values.proposal.clone(),
            proposed_budget: optional_number(&values.proposed_budget),
            timeline: values.timeline.clone(),
            methodology: values.methodology.clone(),
            team_details: values.team_details.clone(),
            additional_notes: values.additional_notes.clone(),
            status,
        }
    }
}

/// Body of `PATCH /responses/{id}` (review decisions, draft promotion)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_notes: Option<String>,
}

impl ResponseUpdate {
    pub fn status(status: ResponseStatus) -> Self {
        Self {
            status: Some(status),
            reviewer_notes: None,
        }
    }

    pub fn review(status: ResponseStatus, reviewer_notes: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            reviewer_notes: Some(reviewer_notes.into()),
        }
    }
}

/// Seed RFP form values from an existing RFP for the edit flow, rendering
/// wire types back into the raw strings the form works with.
pub fn rfp_form_values(rfp: &Rfp) -> RfpFormValues {
    let non_empty_or_blank_row = |lines: &[String]| {
        if lines.is_empty() {
            vec![String::new()]
        } else {
            lines.to_vec()
        }
    };

    RfpFormValues {
        title: rfp.title.clone(),
        description: rfp.description.clone(),
        category: rfp.category.clone(),
        budget_min: rfp.budget_min.map(render_number).unwrap_or_default(),
        budget_max: rfp.budget_max.map(render_number).unwrap_or_default(),
        deadline: rfp
            .deadline
            .with_timezone(&Local)
            .naive_local()
            .format("%Y-%m-%dT%H:%M")
            .to_string(),
        requirements: non_empty_or_blank_row(&rfp.requirements),
        evaluation_criteria: non_empty_or_blank_row(&rfp.evaluation_criteria),
        terms_and_conditions: rfp.terms_and_conditions.clone().unwrap_or_default(),
        publish: rfp.status == RfpStatus::Published,
    }
}

fn optional_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn drop_blank_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .cloned()
        .collect()
}

fn render_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Normalize a locally-entered deadline to an RFC 3339 UTC timestamp
fn normalize_deadline(input: &str) -> Option<String> {
    let naive = parse_date_input(input.trim())?;
    let local: DateTime<Local> = Local.from_local_datetime(&naive).earliest()?;
    Some(local.with_timezone(&Utc).to_rfc3339())
}
