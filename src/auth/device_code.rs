use chrono::{DateTime, Utc};

use super::token::AccessToken;

/// Server-issued state for one device-authorization attempt.
///
/// Created by [`super::DeviceFlowClient::make_request`]; polling is only
/// valid while `in_progress` is true and the session has not expired. The
/// `device_code` is never reused across sessions.
#[derive(Debug, Clone)]
pub struct DeviceSession {
    /// Opaque correlation code sent back on every poll.
    pub device_code: String,
    /// Short code the user types into the verification page.
    pub user_code: String,
    pub verification_uri: String,
    /// Verification URL with the user code already embedded; falls back to
    /// `verification_uri` when the server does not provide one.
    pub verification_uri_complete: String,
    /// Absolute deadline: request time plus the server's `expires_in`.
    pub expires_at: DateTime<Utc>,
    /// Seconds to wait between polls. Only ever grows (on `slow_down`).
    pub interval_secs: u64,
    pub in_progress: bool,
}

impl DeviceSession {
    /// Whether the session deadline has passed (wall clock).
    pub fn expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Outcome of a single poll of a device-flow session.
///
/// "Not yet" and terminal outcomes are distinct variants; malformed
/// responses and transport failures surface as [`super::AuthError`]
/// instead.
#[derive(Debug, Clone)]
pub enum DevicePoll {
    /// The user has not acted yet; wait the session interval and poll again.
    Pending,
    /// Server asked for a slower cadence; the session interval has already
    /// been raised to the value carried here.
    SlowDown { interval_secs: u64 },
    /// The user authorized the request; the session is finished.
    Authorized { token: AccessToken },
    /// The user denied the request. Terminal.
    Denied,
    /// The server reports the device code expired. Terminal.
    Expired,
}
