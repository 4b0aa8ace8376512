//! Trait abstraction for the backend API to enable mocking in tests

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::payload::{ResponsePayload, ResponseUpdate, RfpPayload};
use crate::state::models::{Rfp, RfpResponse, User};

/// Body of `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Successful login payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Backend API operations, mockable for controller and session tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RfpApi: Send + Sync {
    /// Install (or clear) the bearer token attached to subsequent requests
    fn set_token(&self, token: Option<String>);

    /// List all RFPs visible to the current user
    async fn list_rfps(&self) -> Result<Vec<Rfp>, ApiError>;

    /// Fetch one RFP
    async fn get_rfp(&self, id: &str) -> Result<Rfp, ApiError>;

    /// Create an RFP
    async fn create_rfp(&self, payload: &RfpPayload) -> Result<Rfp, ApiError>;

    /// Replace an existing RFP
    async fn update_rfp(&self, id: &str, payload: &RfpPayload) -> Result<Rfp, ApiError>;

    /// Move a draft RFP to published
    async fn publish_rfp(&self, id: &str) -> Result<Rfp, ApiError>;

    /// Delete an RFP
    async fn delete_rfp(&self, id: &str) -> Result<(), ApiError>;

    /// Submit a supplier response to an RFP
    async fn submit_response(
        &self,
        rfp_id: &str,
        payload: &ResponsePayload,
    ) -> Result<RfpResponse, ApiError>;

    /// List responses visible to the current user
    async fn list_responses(&self) -> Result<Vec<RfpResponse>, ApiError>;

    /// Fetch one response
    async fn get_response(&self, id: &str) -> Result<RfpResponse, ApiError>;

    /// Partially update a response (review decision, draft promotion)
    async fn update_response(
        &self,
        id: &str,
        update: &ResponseUpdate,
    ) -> Result<RfpResponse, ApiError>;

    /// Delete a response
    async fn delete_response(&self, id: &str) -> Result<(), ApiError>;

    /// Exchange credentials for an access token
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthTokens, ApiError>;

    /// Create an account
    async fn register(&self, data: &RegisterRequest) -> Result<User, ApiError>;

    /// Fetch the authenticated user for the current token
    async fn me(&self) -> Result<User, ApiError>;
}
