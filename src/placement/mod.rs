//! Placement tracking: job-status classification and the rate-limited
//! status poller for one cluster of placed jobs.

pub mod monitor;
pub mod query;
pub mod status;

pub use monitor::{
    MonitorOutcome, Placement, UpdateOutcome, MAX_STATUS_WAIT, MIN_DELAY_BETWEEN_UPDATES,
};
pub use query::{JobQuery, JobRecord, QueryError, ATTR_HOLD_REASON_CODE, ATTR_JOB_STATUS};
pub use status::{PlacementStatus, StatusCategory, HOLD_REASON_SPOOLING_INPUT};
