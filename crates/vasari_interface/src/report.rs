//! Run and stage report types.
//!
//! These types are produced by the orchestrator and consumed by drivers
//! (CLI, tests), so they live here rather than in the pipeline crate.

use crate::SkipReason;
use serde::{Deserialize, Serialize};
use vasari_core::RunId;

/// Lifecycle state of a stage within one run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Not yet reached
    Pending,
    /// Skipped because a dependency was skipped
    SkippedByDependency,
    /// Skipped because the applicability predicate returned false
    SkippedByApplicability,
    /// Currently executing
    Running,
    /// Result persisted
    Completed,
    /// Completion call exhausted or failed permanently
    Failed,
}

impl From<SkipReason> for StageStatus {
    fn from(reason: SkipReason) -> Self {
        match reason {
            SkipReason::NotApplicable => StageStatus::SkippedByApplicability,
            SkipReason::DependencySkipped => StageStatus::SkippedByDependency,
        }
    }
}

/// Overall outcome of one `run()` invocation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every stage completed
    Completed,
    /// A stage failed; later stages were not attempted
    Failed,
    /// Nothing failed, but at least one stage was skipped
    PartiallyComplete,
}

/// Outcome of a single stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// The stage id.
    pub stage_id: String,

    /// Final status for this run.
    pub status: StageStatus,

    /// Error detail when the status is `Failed`.
    pub error: Option<String>,
}

impl StageReport {
    /// Report a stage outcome.
    ///
    /// A stage read back from the store reports the same status it was
    /// persisted with, so a resumed run's report matches the original.
    pub fn new(stage_id: impl Into<String>, status: StageStatus) -> Self {
        Self {
            stage_id: stage_id.into(),
            status,
            error: None,
        }
    }

    /// Report a failed stage with its error detail.
    pub fn failed(stage_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            stage_id: stage_id.into(),
            status: StageStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Complete report for one `run()` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// The run this report describes.
    pub run_id: RunId,

    /// Per-stage outcomes, in declared order. Stages after a failure stay
    /// `Pending`.
    pub stages: Vec<StageReport>,

    /// Overall outcome.
    pub overall: RunStatus,
}

impl RunReport {
    /// Assemble a report, deriving the overall status from the stage list.
    pub fn from_stages(run_id: RunId, stages: Vec<StageReport>) -> Self {
        let overall = if stages
            .iter()
            .any(|s| matches!(s.status, StageStatus::Failed | StageStatus::Pending))
        {
            RunStatus::Failed
        } else if stages.iter().any(|s| {
            matches!(
                s.status,
                StageStatus::SkippedByDependency | StageStatus::SkippedByApplicability
            )
        }) {
            RunStatus::PartiallyComplete
        } else {
            RunStatus::Completed
        };

        Self {
            run_id,
            stages,
            overall,
        }
    }

    /// The failing stage, if the run failed.
    pub fn failing_stage(&self) -> Option<&StageReport> {
        self.stages
            .iter()
            .find(|s| s.status == StageStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_completed() {
        let report = RunReport::from_stages(
            RunId::new("r"),
            vec![
                StageReport::new("a", StageStatus::Completed),
                StageReport::new("b", StageStatus::Completed),
            ],
        );
        assert_eq!(report.overall, RunStatus::Completed);
        assert!(report.failing_stage().is_none());
    }

    #[test]
    fn test_skip_means_partial() {
        let report = RunReport::from_stages(
            RunId::new("r"),
            vec![
                StageReport::new("a", StageStatus::SkippedByApplicability),
                StageReport::new("b", StageStatus::Completed),
            ],
        );
        assert_eq!(report.overall, RunStatus::PartiallyComplete);
    }

    #[test]
    fn test_failure_wins_over_skip() {
        let report = RunReport::from_stages(
            RunId::new("r"),
            vec![
                StageReport::new("a", StageStatus::SkippedByApplicability),
                StageReport::failed("b", "exhausted"),
                StageReport::new("c", StageStatus::Pending),
            ],
        );
        assert_eq!(report.overall, RunStatus::Failed);
        assert_eq!(report.failing_stage().unwrap().stage_id, "b");
    }
}
