use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use super::query::{JobQuery, ATTR_HOLD_REASON_CODE, ATTR_JOB_STATUS};
use super::status::PlacementStatus;
use crate::error::PlacementError;

/// Minimum time between two status queries for the same placement.
pub const MIN_DELAY_BETWEEN_UPDATES: Duration = Duration::from_secs(10);
/// Monitoring aborts when no update has succeeded for this long.
pub const MAX_STATUS_WAIT: Duration = Duration::from_secs(60);

/// Result of one [`Placement::update`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The cached status was recomputed from a fresh query.
    Updated,
    /// Rate limit honored; no query was issued.
    Skipped,
    /// The query failed; the cached status is unchanged.
    Failed,
}

/// How a [`Placement::monitor`] call ended. Each exit path is distinct so
/// callers can report them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// No jobs remain in progress.
    Done,
    /// Zero-budget call: one forced update, reported once.
    Checked,
    /// No successful update within [`MAX_STATUS_WAIT`]; treat as a failure
    /// and investigate.
    Stalled,
    /// The next scheduled update would land past the budget deadline.
    BudgetExhausted,
}

/// Rate-limited status tracker for the jobs of one placement (one cluster
/// identifier) on a remote access point.
///
/// Holds a cached [`PlacementStatus`] recomputed wholesale on every
/// successful query. Gate arithmetic uses the monotonic clock; the
/// wall-clock update time is kept only for display.
pub struct Placement {
    cluster: u64,
    num_procs: u64,
    constraint: String,
    query: Arc<dyn JobQuery>,
    status: PlacementStatus,
    status_last_update: Option<Instant>,
    status_next_update: Option<Instant>,
    status_updated_at: Option<DateTime<Utc>>,
}

impl Placement {
    pub fn new(cluster: u64, num_procs: u64, query: Arc<dyn JobQuery>) -> Self {
        Self {
            cluster,
            num_procs,
            constraint: format!("ClusterId == {cluster}"),
            query,
            status: PlacementStatus::default(),
            status_last_update: None,
            status_next_update: None,
            status_updated_at: None,
        }
    }

    pub fn cluster(&self) -> u64 {
        self.cluster
    }

    pub fn num_procs(&self) -> u64 {
        self.num_procs
    }

    pub fn constraint(&self) -> &str {
        &self.constraint
    }

    /// The cached status; does not query.
    pub fn last_status(&self) -> &PlacementStatus {
        &self.status
    }

    /// Wall-clock time of the last successful update, for display.
    pub fn status_updated_at(&self) -> Option<DateTime<Utc>> {
        self.status_updated_at
    }

    /// Attempt a gated refresh, then return a copy of the status.
    pub async fn status(&mut self) -> PlacementStatus {
        self.update(false).await;
        self.status.clone()
    }

    /// The job ID range of this placement ("17" or "17.0 - 17.9").
    pub fn job_id_range(&self) -> String {
        if self.num_procs == 1 {
            format!("{}", self.cluster)
        } else {
            format!("{0}.0 - {0}.{1}", self.cluster, self.num_procs - 1)
        }
    }

    /// Refresh the cached status from the remote query interface.
    ///
    /// Unless `force` is set, returns [`UpdateOutcome::Skipped`] without
    /// querying when the last update was less than
    /// [`MIN_DELAY_BETWEEN_UPDATES`] ago. Query failures are soft: logged,
    /// and the cached status keeps its last-known-good counts.
    pub async fn update(&mut self, force: bool) -> UpdateOutcome {
        let now = Instant::now();
        if !force && self.status_next_update.is_some_and(|next| now < next) {
            tracing::debug!(cluster = self.cluster, "not updating status yet -- too soon");
            return UpdateOutcome::Skipped;
        }
        let records = match self
            .query
            .query(&self.constraint, &[ATTR_JOB_STATUS, ATTR_HOLD_REASON_CODE])
            .await
        {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(cluster = self.cluster, error = %err, "unable to update status");
                return UpdateOutcome::Failed;
            }
        };
        self.status = PlacementStatus::classify(&records);
        let now = Instant::now();
        self.status_last_update = Some(now);
        self.status_next_update = Some(now + MIN_DELAY_BETWEEN_UPDATES);
        self.status_updated_at = Some(Utc::now());
        UpdateOutcome::Updated
    }

    /// Monitor the placement's jobs for up to `minutes` minutes.
    ///
    /// With an infinite budget, loops until no jobs remain in progress or
    /// no update has succeeded within [`MAX_STATUS_WAIT`]. A zero budget
    /// performs exactly one forced update and reports once. Otherwise the
    /// loop additionally stops when the next scheduled update would exceed
    /// the deadline. Suspends only on the sleep between iterations, so
    /// dropping the future cancels at an iteration boundary.
    pub async fn monitor(&mut self, minutes: f64) -> Result<MonitorOutcome, PlacementError> {
        if minutes.is_nan() || minutes < 0.0 {
            return Err(PlacementError::InvalidArgument(format!(
                "minutes cannot be negative: {minutes}"
            )));
        }
        if minutes == 0.0 {
            tracing::info!(cluster = self.cluster, "checking job status");
            self.update(true).await;
            self.log_status();
            return Ok(MonitorOutcome::Checked);
        }
        let start = Instant::now();
        let deadline = if minutes.is_finite() {
            tracing::info!(cluster = self.cluster, minutes, "monitoring jobs");
            Some(start + Duration::from_secs_f64(minutes * 60.0))
        } else {
            tracing::info!(cluster = self.cluster, "monitoring jobs");
            None
        };

        loop {
            let outcome = self.update(false).await;
            let now = Instant::now();
            // Before the first successful update, stall time is measured
            // from the start of monitoring.
            let last_update = self.status_last_update.unwrap_or(start);
            if now.duration_since(last_update) > MAX_STATUS_WAIT {
                tracing::warn!(
                    cluster = self.cluster,
                    seconds = now.duration_since(last_update).as_secs(),
                    "no status update received; stopped monitoring early"
                );
                return Ok(MonitorOutcome::Stalled);
            }
            if outcome == UpdateOutcome::Updated {
                self.log_status();
                if self.status.jobs_in_progress() == 0 {
                    tracing::info!(cluster = self.cluster, "no jobs in progress; done monitoring");
                    return Ok(MonitorOutcome::Done);
                }
            }
            if let (Some(deadline), Some(next)) = (deadline, self.status_next_update) {
                if next > deadline {
                    tracing::info!(cluster = self.cluster, "budget reached; stopped monitoring");
                    return Ok(MonitorOutcome::BudgetExhausted);
                }
            }
            tokio::time::sleep(MIN_DELAY_BETWEEN_UPDATES).await;
        }
    }

    fn log_status(&self) {
        match self.status_updated_at {
            Some(updated_at) => {
                tracing::info!(cluster = self.cluster, %updated_at, "status update");
            }
            None => {
                tracing::info!(cluster = self.cluster, "status unknown");
                return;
            }
        }
        for line in self.status.lines() {
            tracing::info!(cluster = self.cluster, "{line}");
        }
    }
}
