//! Events delivered to the settings screen.

use super::kind::JobKind;
use crate::account::{AccountSnapshot, RepairSummary};

/// Completion fraction of a running job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Kind of job.
    pub kind: JobKind,
    /// Sequence the event belongs to.
    pub sequence: u64,
    /// Completion, 0 to 100.
    pub percentage: u8,
}

/// Result data of a successful job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPayload {
    /// Accounts returned by an account query.
    Accounts(AccountSnapshot),
    /// Counters of a finished repair.
    Repair(RepairSummary),
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The job finished normally.
    Success(JobPayload),
    /// The job failed; the message is meant for display.
    Failed(String),
    /// The job was cancelled or superseded before finishing.
    Cancelled,
}

impl Outcome {
    /// Returns true for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// The final event of a job; exactly one per sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalEvent {
    /// Kind of job.
    pub kind: JobKind,
    /// Sequence the event belongs to.
    pub sequence: u64,
    /// How the job ended.
    pub outcome: Outcome,
}

/// Any event a job produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// Intermediate progress.
    Progress(ProgressEvent),
    /// Final outcome.
    Terminal(TerminalEvent),
}

impl JobEvent {
    /// Kind of job that produced the event.
    #[must_use]
    pub const fn kind(&self) -> JobKind {
        match self {
            Self::Progress(e) => e.kind,
            Self::Terminal(e) => e.kind,
        }
    }

    /// Sequence the event belongs to.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        match self {
            Self::Progress(e) => e.sequence,
            Self::Terminal(e) => e.sequence,
        }
    }

    /// Returns true for terminal events.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let progress = JobEvent::Progress(ProgressEvent {
            kind: JobKind::DatabaseRepair,
            sequence: 3,
            percentage: 50,
        });
        assert_eq!(progress.kind(), JobKind::DatabaseRepair);
        assert_eq!(progress.sequence(), 3);
        assert!(!progress.is_terminal());

        let terminal = JobEvent::Terminal(TerminalEvent {
            kind: JobKind::AccountQuery,
            sequence: 9,
            outcome: Outcome::Cancelled,
        });
        assert_eq!(terminal.kind(), JobKind::AccountQuery);
        assert_eq!(terminal.sequence(), 9);
        assert!(terminal.is_terminal());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(Outcome::Cancelled.label(), "cancelled");
        assert_eq!(Outcome::Failed("x".into()).label(), "failed");
        let ok = Outcome::Success(JobPayload::Repair(RepairSummary::default()));
        assert!(ok.is_success());
        assert_eq!(ok.label(), "success");
    }
}
