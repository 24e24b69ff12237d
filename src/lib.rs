//! Placement — client SDK for the Placement service.
//!
//! Obtains short-lived service tokens through the OAuth2 Device
//! Authorization Grant and tracks the status of placed jobs on a remote
//! access point with a rate-limited poller.
//!
//! # Quick Start
//!
//! ```no_run
//! use placement::auth::{DeviceFlowClient, FileTokenStore, TokenStore};
//! use placement::config::PlacementConfig;
//!
//! # async fn example() -> placement::error::Result<()> {
//! let config = PlacementConfig::from_env();
//! let mut client = DeviceFlowClient::from_config(&config);
//! let session = client.make_request().await?;
//! println!(
//!     "Please go to {} and type in this code: {}",
//!     session.verification_uri, session.user_code
//! );
//! let token = client.poll_for_token_loop().await?;
//! FileTokenStore::new_default().save(&config.token_filename, token.as_bytes())?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod placement;
pub mod prelude;
