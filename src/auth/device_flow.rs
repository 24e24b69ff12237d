use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;

use super::device_code::{DevicePoll, DeviceSession};
use super::error::AuthError;
use super::token::AccessToken;
use crate::config::PlacementConfig;

const REQUEST_ENDPOINT: &str = "/auth/device_authorization";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
/// Token type the server must declare, compared case-insensitively.
const ACCEPTED_TOKEN_TYPE: &str = "placement";
/// Poll cadence when the authorization response does not name one.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Fixed amount added to the poll interval on every `slow_down` response.
/// The interval never decreases.
const SLOW_DOWN_STEP_SECS: u64 = 5;

/// OAuth2 Device Authorization Grant client for the Placement service.
///
/// Drives the two-phase device flow against a fixed authorization endpoint:
/// [`make_request`](Self::make_request) starts a session, then
/// [`poll_for_token`](Self::poll_for_token) (or the blocking
/// [`poll_for_token_loop`](Self::poll_for_token_loop)) polls it until the
/// user acts. The client owns at most one live [`DeviceSession`]; starting
/// a new request abandons the previous session.
///
/// # Example
/// ```no_run
/// use placement::auth::DeviceFlowClient;
///
/// # async fn example() -> Result<(), placement::auth::AuthError> {
/// let mut client = DeviceFlowClient::new("https://placement.example.org", "my-client");
/// let session = client.make_request().await?;
/// println!("Go to {} and enter {}", session.verification_uri, session.user_code);
/// let token = client.poll_for_token_loop().await?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceFlowClient {
    client: reqwest::Client,
    request_url: String,
    client_id: String,
    session: Option<DeviceSession>,
}

impl DeviceFlowClient {
    pub fn new(server: impl AsRef<str>, client_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            request_url: format!(
                "{}{}",
                server.as_ref().trim_end_matches('/'),
                REQUEST_ENDPOINT
            ),
            client_id: client_id.into(),
            session: None,
        }
    }

    pub fn from_config(config: &PlacementConfig) -> Self {
        Self::new(&config.server, config.client_id.clone())
    }

    /// Override the full request URL (both phases use the same endpoint).
    pub fn with_request_url(mut self, url: impl Into<String>) -> Self {
        self.request_url = url.into();
        self
    }

    /// The current session, if any (live or finished).
    pub fn session(&self) -> Option<&DeviceSession> {
        self.session.as_ref()
    }

    /// Whether a device-flow request is live and pollable.
    pub fn in_progress(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.in_progress)
    }

    /// Start a new device-authorization session.
    ///
    /// Any previous session is abandoned; sessions are never resumed. On
    /// any failure the client is left with no session.
    pub async fn make_request(&mut self) -> Result<&DeviceSession, AuthError> {
        self.session = None;
        let response = self
            .client
            .post(&self.request_url)
            .form(&[("client_id", self.client_id.as_str())])
            .send()
            .await
            .map_err(connection_error)?;
        let status = response.status();
        let body = response.text().await.map_err(connection_error)?;
        if !status.is_success() {
            return Err(AuthError::Protocol {
                status: status.as_u16(),
                message: server_error_message(&body),
            });
        }
        let payload: AuthorizationResponse = parse_json(&body)?;

        let device_code = require(payload.device_code, "device_code")?;
        let expires_in = require(payload.expires_in, "expires_in")?;
        let user_code = require(payload.user_code, "user_code")?;
        let verification_uri = require(payload.verification_uri, "verification_uri")?;
        let verification_uri_complete = payload
            .verification_uri_complete
            .unwrap_or_else(|| verification_uri.clone());

        let session = DeviceSession {
            device_code,
            user_code,
            verification_uri,
            verification_uri_complete,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in as i64),
            interval_secs: payload.interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            in_progress: true,
        };
        Ok(&*self.session.insert(session))
    }

    /// Poll the live session once.
    ///
    /// Returns the tagged [`DevicePoll`] outcome; does not sleep and does
    /// not retry. Transport failures and malformed responses are errors,
    /// left to the caller's retry policy.
    pub async fn poll_for_token(&mut self) -> Result<DevicePoll, AuthError> {
        let session = self
            .session
            .as_mut()
            .filter(|s| s.in_progress)
            .ok_or(AuthError::RequestNotInProgress)?;
        let response = self
            .client
            .post(&self.request_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("grant_type", GRANT_TYPE),
                ("device_code", session.device_code.as_str()),
            ])
            .send()
            .await
            .map_err(connection_error)?;
        let status = response.status();
        let body = response.text().await.map_err(connection_error)?;

        if status == StatusCode::BAD_REQUEST {
            // A definitive but uninterpretable server reply ends the
            // session; only transport and server-side failures leave it
            // pollable.
            let payload: TokenPollResponse = match parse_json(&body) {
                Ok(payload) => payload,
                Err(err) => {
                    session.in_progress = false;
                    return Err(err);
                }
            };
            return match payload.error.as_deref() {
                Some("authorization_pending") => Ok(DevicePoll::Pending),
                Some("slow_down") => {
                    session.interval_secs += SLOW_DOWN_STEP_SECS;
                    tracing::debug!(
                        interval_secs = session.interval_secs,
                        "received slow_down; interval raised"
                    );
                    Ok(DevicePoll::SlowDown {
                        interval_secs: session.interval_secs,
                    })
                }
                Some("access_denied") => {
                    session.in_progress = false;
                    Ok(DevicePoll::Denied)
                }
                Some("expired_token") => {
                    session.in_progress = false;
                    Ok(DevicePoll::Expired)
                }
                Some(other) => {
                    session.in_progress = false;
                    Err(AuthError::UnexpectedOutput(format!(
                        "server responded with unexpected error {other}"
                    )))
                }
                None => {
                    session.in_progress = false;
                    Err(AuthError::UnexpectedOutput(
                        "error response missing the error field".to_string(),
                    ))
                }
            };
        }

        if status.is_success() {
            session.in_progress = false;
            let payload: TokenPollResponse = parse_json(&body)?;
            let access_token = payload.access_token.ok_or_else(|| {
                AuthError::UnexpectedOutput("token response missing access_token".to_string())
            })?;
            let token_type = payload.token_type.ok_or_else(|| {
                AuthError::UnexpectedOutput("token response missing token_type".to_string())
            })?;
            if !token_type.eq_ignore_ascii_case(ACCEPTED_TOKEN_TYPE) {
                return Err(AuthError::UnexpectedOutput(format!(
                    "unexpected token type {token_type}"
                )));
            }
            return Ok(DevicePoll::Authorized {
                token: AccessToken::from(access_token),
            });
        }

        Err(AuthError::Protocol {
            status: status.as_u16(),
            message: server_error_message(&body),
        })
    }

    /// Poll until the user acts or the session deadline passes.
    ///
    /// Sleeps the session interval in effect after each pending or
    /// slow-down response. Terminal poll outcomes become typed errors.
    /// The future suspends only between iterations; dropping it cancels
    /// the flow at an iteration boundary.
    pub async fn poll_for_token_loop(&mut self) -> Result<AccessToken, AuthError> {
        if !self.in_progress() {
            return Err(AuthError::RequestNotInProgress);
        }
        loop {
            match self.session.as_mut() {
                Some(session) if session.expired() => {
                    session.in_progress = false;
                    return Err(AuthError::TimedOut("device code expired".to_string()));
                }
                Some(_) => {}
                None => return Err(AuthError::RequestNotInProgress),
            }
            match self.poll_for_token().await? {
                DevicePoll::Authorized { token } => return Ok(token),
                DevicePoll::Pending | DevicePoll::SlowDown { .. } => {}
                DevicePoll::Denied => return Err(AuthError::AccessDenied),
                DevicePoll::Expired => {
                    return Err(AuthError::TimedOut(
                        "server responds device code expired".to_string(),
                    ))
                }
            }
            let interval_secs = self
                .session
                .as_ref()
                .map(|s| s.interval_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
            tokio::time::sleep(Duration::from_secs(interval_secs)).await;
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthorizationResponse {
    device_code: Option<String>,
    expires_in: Option<f64>,
    interval: Option<u64>,
    user_code: Option<String>,
    verification_uri: Option<String>,
    verification_uri_complete: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenPollResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    error: Option<String>,
}

fn connection_error(error: reqwest::Error) -> AuthError {
    AuthError::Connection(error.to_string())
}

fn parse_json<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, AuthError> {
    serde_json::from_str(body)
        .map_err(|err| AuthError::UnexpectedOutput(format!("invalid JSON: {err}")))
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, AuthError> {
    value.ok_or_else(|| AuthError::UnexpectedOutput(format!("server response missing {field}")))
}

/// Best-effort extraction of the server's `error` field from a failure body.
fn server_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| "no error detail from server".to_string())
}
