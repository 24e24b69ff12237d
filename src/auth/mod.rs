//! OAuth2 device-flow client, token-state inspection, and token storage.

pub mod device_code;
pub mod device_flow;
pub mod error;
pub mod store;
pub mod token;

pub use device_code::{DevicePoll, DeviceSession};
pub use device_flow::DeviceFlowClient;
pub use error::AuthError;
pub use store::{FileTokenStore, TokenStore, TokenStoreConfig};
pub use token::{token_state, AccessToken, TokenState};
