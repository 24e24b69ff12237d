use std::collections::BTreeMap;

use strum::{Display, EnumIter, IntoEnumIterator};

use super::query::JobRecord;

/// Hold-reason code meaning the job is held only while its input spools.
pub const HOLD_REASON_SPOOLING_INPUT: i64 = 16;

/// Status categories for placed jobs.
///
/// The first seven map one-to-one onto the scheduler's numeric status
/// codes. `TransferringInput` is synthetic: a held job whose hold reason is
/// [`HOLD_REASON_SPOOLING_INPUT`] is still making progress and is counted
/// here instead of under `Held`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum StatusCategory {
    Idle,
    Running,
    Removed,
    Completed,
    Held,
    TransferringOutput,
    Suspended,
    TransferringInput,
}

impl StatusCategory {
    /// The category for a primary scheduler status code, if it names one.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Idle),
            2 => Some(Self::Running),
            3 => Some(Self::Removed),
            4 => Some(Self::Completed),
            5 => Some(Self::Held),
            6 => Some(Self::TransferringOutput),
            7 => Some(Self::Suspended),
            _ => None,
        }
    }

    /// Whether jobs in this category still count as making progress.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Running | Self::TransferringInput | Self::TransferringOutput
        )
    }

    /// Human-readable name ("transferring input").
    pub fn label(&self) -> String {
        self.to_string().replace('_', " ")
    }
}

/// Counts of jobs per status category for one placement.
///
/// Counts are recomputed wholesale from a full record batch on every
/// successful update, never patched incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementStatus {
    counts: BTreeMap<StatusCategory, u64>,
}

impl PlacementStatus {
    /// Classify a batch of job records into category counts.
    pub fn classify<'a>(records: impl IntoIterator<Item = &'a JobRecord>) -> Self {
        let mut counts: BTreeMap<StatusCategory, u64> =
            StatusCategory::iter().map(|category| (category, 0)).collect();
        for record in records {
            let Some(code) = record.status_code() else {
                continue;
            };
            let spooling = record.hold_reason_code() == Some(HOLD_REASON_SPOOLING_INPUT);
            let category = match StatusCategory::from_code(code) {
                Some(StatusCategory::Held) if spooling => StatusCategory::TransferringInput,
                Some(category) => category,
                None => continue,
            };
            if let Some(count) = counts.get_mut(&category) {
                *count += 1;
            }
        }
        Self { counts }
    }

    pub fn count(&self, category: StatusCategory) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Jobs still idle, running, or transferring data.
    pub fn jobs_in_progress(&self) -> u64 {
        StatusCategory::iter()
            .filter(StatusCategory::is_in_progress)
            .map(|category| self.count(category))
            .sum()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// One sentence per non-empty category, in declaration order.
    pub fn lines(&self) -> Vec<String> {
        StatusCategory::iter()
            .filter_map(|category| {
                let count = self.count(category);
                let label = category.label();
                match count {
                    0 => None,
                    1 => Some(format!("1 job is {label}.")),
                    n => Some(format!("{n} jobs are {label}.")),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::query::{ATTR_HOLD_REASON_CODE, ATTR_JOB_STATUS};

    fn job(status: i64) -> JobRecord {
        JobRecord::new().with(ATTR_JOB_STATUS, status)
    }

    fn held_job(hold_reason: i64) -> JobRecord {
        job(5).with(ATTR_HOLD_REASON_CODE, hold_reason)
    }

    #[test]
    fn classify_counts_by_status_code() {
        let records = vec![job(1), job(1), job(2)];
        let status = PlacementStatus::classify(&records);
        assert_eq!(status.count(StatusCategory::Idle), 2);
        assert_eq!(status.count(StatusCategory::Running), 1);
        for category in StatusCategory::iter() {
            if !matches!(category, StatusCategory::Idle | StatusCategory::Running) {
                assert_eq!(status.count(category), 0, "{category} should be empty");
            }
        }
    }

    #[test]
    fn spooling_hold_counts_as_transferring_input() {
        let records = vec![held_job(HOLD_REASON_SPOOLING_INPUT)];
        let status = PlacementStatus::classify(&records);
        assert_eq!(status.count(StatusCategory::TransferringInput), 1);
        assert_eq!(status.count(StatusCategory::Held), 0);
    }

    #[test]
    fn other_hold_reasons_count_as_held() {
        let records = vec![held_job(1), job(5)];
        let status = PlacementStatus::classify(&records);
        assert_eq!(status.count(StatusCategory::Held), 2);
        assert_eq!(status.count(StatusCategory::TransferringInput), 0);
    }

    #[test]
    fn unknown_status_codes_are_ignored() {
        let records = vec![job(1), job(42)];
        let status = PlacementStatus::classify(&records);
        assert_eq!(status.total(), 1);
    }

    #[test]
    fn jobs_in_progress_excludes_terminal_categories() {
        let records = vec![
            job(1),
            job(2),
            job(4),
            job(6),
            held_job(HOLD_REASON_SPOOLING_INPUT),
            held_job(1),
        ];
        let status = PlacementStatus::classify(&records);
        // idle + running + transferring_output + transferring_input
        assert_eq!(status.jobs_in_progress(), 4);
    }

    #[test]
    fn lines_formats_counts_as_sentences() {
        let records = vec![job(1), job(1), held_job(HOLD_REASON_SPOOLING_INPUT)];
        let status = PlacementStatus::classify(&records);
        assert_eq!(
            status.lines(),
            vec![
                "2 jobs are idle.".to_string(),
                "1 job is transferring input.".to_string(),
            ]
        );
    }

    #[test]
    fn empty_batch_reports_no_lines() {
        let status = PlacementStatus::classify(&[]);
        assert!(status.lines().is_empty());
        assert_eq!(status.total(), 0);
    }
}
