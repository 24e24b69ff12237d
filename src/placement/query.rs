use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub const ATTR_JOB_STATUS: &str = "JobStatus";
pub const ATTR_HOLD_REASON_CODE: &str = "HoldReasonCode";

/// A remote query failed. Soft by design: the poller logs these and keeps
/// its last-known-good status.
#[derive(Debug, Clone, Error)]
#[error("job query failed: {0}")]
pub struct QueryError(pub String);

/// One job as returned by the query interface: an attribute mapping with
/// typed accessors for the attributes the poller classifies on.
#[derive(Debug, Clone, Default)]
pub struct JobRecord {
    attributes: serde_json::Map<String, Value>,
}

impl JobRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(attribute.into(), value.into());
        self
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    /// The numeric job-status code, if present and numeric.
    pub fn status_code(&self) -> Option<i64> {
        self.get(ATTR_JOB_STATUS).and_then(Value::as_i64)
    }

    /// The scheduler's hold-reason code, if the job carries one.
    pub fn hold_reason_code(&self) -> Option<i64> {
        self.get(ATTR_HOLD_REASON_CODE).and_then(Value::as_i64)
    }
}

/// Query seam for the remote job-placement endpoint.
///
/// `constraint` is a filter expression (e.g. `ClusterId == 17`);
/// `attributes` is the projection of attribute names each returned record
/// should carry.
#[async_trait]
pub trait JobQuery: Send + Sync {
    async fn query(
        &self,
        constraint: &str,
        attributes: &[&str],
    ) -> Result<Vec<JobRecord>, QueryError>;
}
