//! HTTP client for the RFP backend
//!
//! Thin REST/JSON wrapper: one method per endpoint, bearer auth, and
//! mapping of error payloads (`{ message, details: [...] }`) into
//! [`ApiError`] kinds. List endpoints may wrap their payload in
//! `{ "data": [...] }`; both shapes are accepted.

use std::sync::RwLock;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::error::{ApiError, FieldDetail};
use super::payload::{ResponsePayload, ResponseUpdate, RfpPayload};
use super::traits::{AuthTokens, LoginRequest, RegisterRequest, RfpApi};
use crate::config::ClientConfig;
use crate::state::models::{Rfp, RfpResponse, User};

/// Default backend address
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Client for the RFP backend REST API
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpApiClient {
    /// Create a client from configuration. `RFP_API_URL` overrides the
    /// configured base URL.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = std::env::var("RFP_API_URL").unwrap_or_else(|_| {
            config
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
        });

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.unwrap_or(30)))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self.http.request(method, url);

        let token = self.token.read().ok().and_then(|guard| guard.clone());
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let value = self.send_value(builder).await?;

        match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => Ok(parsed),
            Err(first_err) => {
                // List payloads may be wrapped in { "data": [...] }
                if let Some(data) = value.get("data") {
                    if let Ok(parsed) = serde_json::from_value::<T>(data.clone()) {
                        return Ok(parsed);
                    }
                }
                Err(ApiError::Decode(first_err.to_string()))
            }
        }
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Err(error_from_body(status, body))
    }

    async fn send_value(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| {
                if status.is_success() {
                    ApiError::Decode(e.to_string())
                } else {
                    error_from_body(status, Value::Null)
                }
            })?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(error_from_body(status, body))
        }
    }
}

/// Error payload shapes the backend produces
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    details: Option<Vec<FieldDetail>>,
}

fn error_from_body(status: StatusCode, body: Value) -> ApiError {
    let parsed: ErrorBody = serde_json::from_value(body).unwrap_or(ErrorBody {
        message: None,
        detail: None,
        details: None,
    });

    let message = parsed
        .message
        .or(parsed.detail)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    match parsed.details {
        Some(details) if !details.is_empty() => ApiError::Validation { message, details },
        _ => ApiError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// `GET /auth/me` wraps the user in `{ message, user }`
#[derive(Debug, Deserialize)]
struct MeResponse {
    user: User,
}

#[async_trait]
impl RfpApi for HttpApiClient {
    fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    async fn list_rfps(&self) -> Result<Vec<Rfp>, ApiError> {
        self.send(self.request(Method::GET, "/rfps")).await
    }

    async fn get_rfp(&self, id: &str) -> Result<Rfp, ApiError> {
        self.send(self.request(Method::GET, &format!("/rfps/{id}")))
            .await
    }

    async fn create_rfp(&self, payload: &RfpPayload) -> Result<Rfp, ApiError> {
        tracing::debug!(title = %payload.title, "creating RFP");
        self.send(self.request(Method::POST, "/rfps").json(payload))
            .await
    }

    async fn update_rfp(&self, id: &str, payload: &RfpPayload) -> Result<Rfp, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/rfps/{id}"))
                .json(payload),
        )
        .await
    }

    async fn publish_rfp(&self, id: &str) -> Result<Rfp, ApiError> {
        self.send(self.request(Method::POST, &format!("/rfps/{id}/publish")))
            .await
    }

    async fn delete_rfp(&self, id: &str) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("/rfps/{id}")))
            .await
    }

    async fn submit_response(
        &self,
        rfp_id: &str,
        payload: &ResponsePayload,
    ) -> Result<RfpResponse, ApiError> {
        tracing::debug!(%rfp_id, "submitting response");
        self.send(
            self.request(Method::POST, &format!("/rfps/{rfp_id}/responses"))
                .json(payload),
        )
        .await
    }

    async fn list_responses(&self) -> Result<Vec<RfpResponse>, ApiError> {
        self.send(self.request(Method::GET, "/responses")).await
    }

    async fn get_response(&self, id: &str) -> Result<RfpResponse, ApiError> {
        self.send(self.request(Method::GET, &format!("/responses/{id}")))
            .await
    }

    async fn update_response(
        &self,
        id: &str,
        update: &ResponseUpdate,
    ) -> Result<RfpResponse, ApiError> {
        self.send(
            self.request(Method::PATCH, &format!("/responses/{id}"))
                .json(update),
        )
        .await
    }

    async fn delete_response(&self, id: &str) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("/responses/{id}")))
            .await
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<AuthTokens, ApiError> {
        self.send(self.request(Method::POST, "/auth/login").json(credentials))
            .await
    }

    async fn register(&self, data: &RegisterRequest) -> Result<User, ApiError> {
        self.send(self.request(Method::POST, "/auth/register").json(data))
            .await
    }

    async fn me(&self) -> Result<User, ApiError> {
        let me: MeResponse = self.send(self.request(Method::GET, "/auth/me")).await?;
        Ok(me.user)
    }
}
