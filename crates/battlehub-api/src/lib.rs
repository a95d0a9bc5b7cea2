//! Shared HTTP client for the BattleHub REST backend.
//! Every request carries the current session's bearer token when one exists.

pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use battlehub_core::{
    auth::{Authenticator, Credentials},
    session::SessionRecord,
    storage::StorageBackend,
};
use battlehub_session::SessionGate;
use reqwest::{
    header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    RequestBuilder, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{instrument, warn};

use crate::models::{
    JoinRequest, LoginResponse, MatchFee, MatchList, MatchMode, MatchSummary, MessageResponse,
    OtpRequest, ResetPasswordRequest, UserEnvelope, UserProfile, VerifyOtpRequest,
    WithdrawRequest,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Backend location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 401: the stored session is missing, expired or revoked.
    #[error("unauthorized: session is missing or expired")]
    Unauthorized,
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("rejected before sending: {0}")]
    Invalid(String),
    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Anything that can hand out the caller's bearer token.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

impl<B: StorageBackend> TokenSource for SessionGate<B> {
    fn bearer_token(&self) -> Option<String> {
        SessionGate::bearer_token(self)
    }
}

/// Token source for unauthenticated calls (login, password reset).
pub struct NoToken;

impl TokenSource for NoToken {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn headers(&self) -> Result<HeaderMap, ApiError> {
        build_headers(self.tokens.bearer_token().as_deref())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.headers(self.headers()?).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.send(self.client.post(self.url("/auth/login")).json(credentials))
            .await
    }

    /// Password reset, step one: ask the backend to mail a one-time code.
    #[instrument(skip_all)]
    pub async fn forgot_password_otp(
        &self,
        request: &OtpRequest,
    ) -> Result<MessageResponse, ApiError> {
        request.validate().map_err(ApiError::Invalid)?;
        self.send(self.client.post(self.url("/auth/forgot-password-otp")).json(request))
            .await
    }

    #[instrument(skip_all)]
    pub async fn verify_otp(
        &self,
        request: &VerifyOtpRequest,
    ) -> Result<MessageResponse, ApiError> {
        request.validate().map_err(ApiError::Invalid)?;
        self.send(self.client.post(self.url("/auth/verify-otp")).json(request))
            .await
    }

    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        request.validate().map_err(ApiError::Invalid)?;
        self.send(self.client.post(self.url("/auth/reset-password")).json(request))
            .await
    }

    #[instrument(skip(self))]
    pub async fn user_profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        let envelope: UserEnvelope = self
            .send(self.client.get(self.url(&format!("/users/{user_id}"))))
            .await?;
        Ok(envelope.user)
    }

    #[instrument(skip(self))]
    pub async fn update_upi(
        &self,
        user_id: &str,
        upi_id: &str,
    ) -> Result<MessageResponse, ApiError> {
        if upi_id.trim().is_empty() {
            return Err(ApiError::Invalid("please enter a valid UPI id".to_string()));
        }
        self.send(
            self.client
                .put(self.url(&format!("/users/{user_id}/updateUser")))
                .json(&json!({ "upiId": upi_id })),
        )
        .await
    }

    /// Submit a withdrawal after checking it against the caller's known balance.
    #[instrument(skip_all, fields(amount = request.amount))]
    pub async fn withdraw(
        &self,
        request: &WithdrawRequest,
        balance: f64,
    ) -> Result<MessageResponse, ApiError> {
        request.validate(balance).map_err(ApiError::Invalid)?;
        self.send(self.client.post(self.url("/wallet/withdraw")).json(request))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_matches(&self, mode: MatchMode) -> Result<Vec<MatchSummary>, ApiError> {
        let list: MatchList = self
            .send(self.client.get(self.url(&format!("/matches/{}", mode.as_str()))))
            .await?;
        Ok(list.matches)
    }

    #[instrument(skip(self))]
    pub async fn match_fee(&self, match_id: &str) -> Result<f64, ApiError> {
        let fee: MatchFee = self
            .send(self.client.get(self.url(&format!("/matches/matchFee/{match_id}"))))
            .await?;
        Ok(fee.entry_fee)
    }

    #[instrument(skip(self, request))]
    pub async fn join_match(
        &self,
        match_id: &str,
        mode: MatchMode,
        request: &JoinRequest,
    ) -> Result<MessageResponse, ApiError> {
        request.validate(mode).map_err(ApiError::Invalid)?;
        self.send(
            self.client
                .post(self.url(&format!("/matches/join/{match_id}")))
                .json(request),
        )
        .await
    }
}

#[async_trait]
impl Authenticator for ApiClient {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn authenticate(&self, credentials: &Credentials) -> anyhow::Result<SessionRecord> {
        Ok(self.login(credentials).await?.into_session())
    }
}

fn build_headers(token: Option<&str>) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("battlehub-cli"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(token) = token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
    }
    Ok(headers)
}

/// Map a non-success response to an error, preferring the server's own message.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    if status == StatusCode::UNAUTHORIZED {
        warn!("backend rejected the session token (401)");
        return ApiError::Unauthorized;
    }

    let parsed = serde_json::from_str::<MessageResponse>(body).unwrap_or_default();
    let message = match (parsed.message, parsed.duplicate_id) {
        (_, Some(duplicate)) => {
            format!("duplicate in-game id {duplicate} is already registered for this match")
        }
        (Some(message), None) => message,
        (None, None) if !body.trim().is_empty() => body.trim().to_string(),
        (None, None) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use battlehub_core::{session::Role, storage::InMemoryStorage};
    use battlehub_session::RecordingNavigator;
    use battlehub_storage::{encrypted_store::EncryptedStore, secret::AppSecret};

    use super::*;

    fn gate() -> Arc<SessionGate<InMemoryStorage>> {
        let store =
            EncryptedStore::new(InMemoryStorage::new(), &AppSecret::new("api")).expect("store");
        Arc::new(SessionGate::new(
            Arc::new(store),
            Arc::new(RecordingNavigator::new()),
        ))
    }

    #[test]
    fn headers_carry_bearer_token_when_present() {
        let headers = build_headers(Some("jwt-123")).expect("headers");
        assert_eq!(
            headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer jwt-123")
        );
        assert_eq!(
            headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );

        let anonymous = build_headers(None).expect("headers");
        assert!(anonymous.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn header_rejects_control_characters_in_token() {
        assert!(matches!(
            build_headers(Some("bad\ntoken")),
            Err(ApiError::Header(_))
        ));
    }

    #[test]
    fn client_reads_token_from_session_gate() {
        let gate = gate();
        let client = ApiClient::new(&ApiConfig::default(), gate.clone());
        assert!(client.headers().expect("headers").get(AUTHORIZATION).is_none());

        gate.login(&SessionRecord::new("tok", "u1", "raju", Role::User));
        assert_eq!(
            client
                .headers()
                .expect("headers")
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer tok")
        );

        gate.logout();
        assert!(client.headers().expect("headers").get(AUTHORIZATION).is_none());
    }

    #[test]
    fn urls_join_cleanly() {
        let client = ApiClient::new(
            &ApiConfig {
                base_url: "https://api.example.com/api/".into(),
            },
            Arc::new(NoToken),
        );
        assert_eq!(client.base_url(), "https://api.example.com/api");
        assert_eq!(
            client.url("/users/u1"),
            "https://api.example.com/api/users/u1"
        );
        assert_eq!(
            client.url("matches/squad"),
            "https://api.example.com/api/matches/squad"
        );
    }

    #[test]
    fn unauthorized_is_its_own_error() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, r#"{"message":"jwt expired"}"#),
            ApiError::Unauthorized
        ));
    }

    #[test]
    fn status_error_prefers_server_message() {
        match status_error(StatusCode::BAD_REQUEST, r#"{"message":"Match is full"}"#) {
            ApiError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Match is full");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match status_error(StatusCode::CONFLICT, r#"{"duplicateId":"5123"}"#) {
            ApiError::Status { message, .. } => assert!(message.contains("5123")),
            other => panic!("unexpected error: {other:?}"),
        }

        match status_error(StatusCode::INTERNAL_SERVER_ERROR, "") {
            ApiError::Status { message, .. } => assert_eq!(message, "Internal Server Error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_withdrawal_is_rejected_before_sending() {
        let client = ApiClient::new(&ApiConfig::default(), Arc::new(NoToken));
        let err = client
            .withdraw(
                &WithdrawRequest {
                    user_id: "u1".into(),
                    amount: 900.0,
                    upi_id: "raju@upi".into(),
                },
                100.0,
            )
            .await
            .expect_err("over balance");
        assert!(matches!(err, ApiError::Invalid(msg) if msg == "insufficient balance"));
    }

    #[tokio::test]
    async fn blank_upi_is_rejected_before_sending() {
        let client = ApiClient::new(&ApiConfig::default(), Arc::new(NoToken));
        let err = client.update_upi("u1", "  ").await.expect_err("blank upi");
        assert!(matches!(err, ApiError::Invalid(_)));
    }

    #[tokio::test]
    async fn password_reset_steps_are_checked_before_sending() {
        let client = ApiClient::new(&ApiConfig::default(), Arc::new(NoToken));

        let err = client
            .forgot_password_otp(&OtpRequest {
                email: String::new(),
            })
            .await
            .expect_err("blank email");
        assert!(matches!(err, ApiError::Invalid(_)));

        let err = client
            .verify_otp(&VerifyOtpRequest {
                email: "r@x.in".into(),
                otp: " ".into(),
            })
            .await
            .expect_err("blank otp");
        assert!(matches!(err, ApiError::Invalid(msg) if msg == "enter the OTP"));

        let err = client
            .reset_password(&ResetPasswordRequest {
                email: "r@x.in".into(),
                new_password: "weakpass".into(),
            })
            .await
            .expect_err("weak password");
        assert!(matches!(err, ApiError::Invalid(msg) if msg.contains("uppercase")));
    }

    #[test]
    fn rest_authenticator_name() {
        let client = ApiClient::new(&ApiConfig::default(), Arc::new(NoToken));
        assert_eq!(Authenticator::name(&client), "rest");
    }
}
