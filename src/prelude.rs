//! Convenience re-exports for common use.

pub use crate::auth::{
    token_state, AccessToken, AuthError, DeviceFlowClient, DevicePoll, DeviceSession,
    FileTokenStore, TokenState, TokenStore,
};
pub use crate::config::PlacementConfig;
pub use crate::error::{PlacementError, Result};
pub use crate::placement::{
    JobQuery, JobRecord, MonitorOutcome, Placement, PlacementStatus, StatusCategory,
    UpdateOutcome,
};
