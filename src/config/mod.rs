//! Environment-backed configuration for the Placement client.

use std::env;

pub const DEFAULT_SERVER: &str = "http://localhost:5000";
pub const DEFAULT_CLIENT_ID: &str = "placement_demo_notebook";
pub const DEFAULT_TOKEN_FILENAME: &str = "Placement.token";

/// Client configuration: authorization server, client identifier, and the
/// token file name used by the store.
#[derive(Debug, Clone)]
pub struct PlacementConfig {
    pub server: String,
    pub client_id: String,
    pub token_filename: String,
}

impl PlacementConfig {
    pub fn new(server: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            client_id: client_id.into(),
            token_filename: DEFAULT_TOKEN_FILENAME.to_string(),
        }
    }

    /// Load from the environment (`PLACEMENT_WEBAPP_LINK`,
    /// `DEVICE_CLIENT_ID`), reading a `.env` file if one is present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self {
            server: env::var("PLACEMENT_WEBAPP_LINK")
                .unwrap_or_else(|_| DEFAULT_SERVER.to_string()),
            client_id: env::var("DEVICE_CLIENT_ID")
                .unwrap_or_else(|_| DEFAULT_CLIENT_ID.to_string()),
            token_filename: DEFAULT_TOKEN_FILENAME.to_string(),
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER, DEFAULT_CLIENT_ID)
    }
}
