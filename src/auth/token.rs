use std::fmt;

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurpose;
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::Engine;
use chrono::Utc;

/// JWT-style segments are commonly emitted without base64 padding; accept
/// both padded and unpadded payloads.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Raw access token bytes returned by a successful device flow.
///
/// Opaque to this crate beyond expiration inspection; hand it to a
/// [`super::TokenStore`] for installation.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Vec<u8>);

impl AccessToken {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Decode-and-check-expiration on the token contents.
    pub fn state(&self) -> TokenState {
        token_state(&self.0)
    }
}

impl From<Vec<u8>> for AccessToken {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<String> for AccessToken {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl fmt::Debug for AccessToken {
    // Keep token material out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({} bytes)", self.0.len())
    }
}

/// Expiration state of a stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Missing,
    Unreadable,
    Expired,
    Ok,
}

/// Inspect token contents and report whether they hold an unexpired token.
///
/// Splits on `.` to find the JWT-style payload segment, base64url-decodes
/// it, and compares the numeric `exp` claim to the current wall-clock time.
/// Every decode failure maps to [`TokenState::Unreadable`]; this never
/// returns an error.
pub fn token_state(contents: &[u8]) -> TokenState {
    let payload = match contents.split(|b| *b == b'.').nth(1) {
        Some(segment) => segment,
        None => return TokenState::Unreadable,
    };
    let decoded = match URL_SAFE_LENIENT.decode(payload) {
        Ok(decoded) => decoded,
        Err(_) => return TokenState::Unreadable,
    };
    let claims: serde_json::Value = match serde_json::from_slice(&decoded) {
        Ok(claims) => claims,
        Err(_) => return TokenState::Unreadable,
    };
    let expiration = match claims.get("exp").and_then(serde_json::Value::as_f64) {
        Some(expiration) => expiration,
        None => return TokenState::Unreadable,
    };
    if expiration < Utc::now().timestamp() as f64 {
        TokenState::Expired
    } else {
        TokenState::Ok
    }
}
