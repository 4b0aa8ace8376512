//! Domain model definitions
//!
//! Wire shapes follow the backend's JSON field names; timestamps are
//! RFC 3339 and parsed into `DateTime<Utc>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, which gates most of the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Supplier,
}

impl Role {
    /// Buyers author RFPs and manage their lifecycle
    pub fn can_manage_rfps(&self) -> bool {
        matches!(self, Role::Buyer)
    }

    /// Buyers review and approve/reject supplier responses
    pub fn can_review_responses(&self) -> bool {
        matches!(self, Role::Buyer)
    }

    /// Suppliers submit responses to published RFPs
    pub fn can_submit_responses(&self) -> bool {
        matches!(self, Role::Supplier)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Buyer => "Buyer",
            Role::Supplier => "Supplier",
        }
    }
}

/// Authenticated account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// RFP lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RfpStatus {
    #[default]
    Draft,
    Published,
    Closed,
    Cancelled,
}

impl RfpStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RfpStatus::Draft => "Draft",
            RfpStatus::Published => "Published",
            RfpStatus::Closed => "Closed",
            RfpStatus::Cancelled => "Cancelled",
        }
    }

    /// Suppliers can only respond while the RFP is published
    pub fn accepts_responses(&self) -> bool {
        matches!(self, RfpStatus::Published)
    }
}

/// Abbreviated account info embedded in RFPs and responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// A buyer-authored Request for Proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rfp {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub budget_min: Option<f64>,
    #[serde(default)]
    pub budget_max: Option<f64>,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub evaluation_criteria: Vec<String>,
    #[serde(default)]
    pub terms_and_conditions: Option<String>,
    pub status: RfpStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub response_count: u32,
    #[serde(default)]
    pub document_ids: Vec<String>,
    #[serde(default)]
    pub creator: Option<UserSummary>,
}

/// Response review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    #[default]
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl ResponseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ResponseStatus::Draft => "Draft",
            ResponseStatus::Submitted => "Submitted",
            ResponseStatus::UnderReview => "Under review",
            ResponseStatus::Approved => "Approved",
            ResponseStatus::Rejected => "Rejected",
        }
    }

    /// Whether a reviewer decision (approve/reject) is still possible
    pub fn is_reviewable(&self) -> bool {
        matches!(self, ResponseStatus::Submitted | ResponseStatus::UnderReview)
    }
}

/// Abbreviated RFP info embedded in a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfpSummary {
    pub id: String,
    pub title: String,
    pub status: RfpStatus,
    pub deadline: DateTime<Utc>,
}

/// A supplier response to an RFP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfpResponse {
    pub id: String,
    pub rfp_id: String,
    pub submitted_by: String,
    pub proposal: String,
    #[serde(default)]
    pub proposed_budget: Option<f64>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub methodology: Option<String>,
    #[serde(default)]
    pub team_details: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
    pub status: ResponseStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewer_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub document_ids: Vec<String>,
    #[serde(default)]
    pub rfp: Option<RfpSummary>,
    #[serde(default)]
    pub submitter: Option<UserSummary>,
}
