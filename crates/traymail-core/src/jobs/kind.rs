//! Job kinds and handles.

use tokio_util::sync::CancellationToken;

/// The two background operations the settings screen can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Refresh the account list from the backend.
    AccountQuery,
    /// Scan and repair unread-count records.
    DatabaseRepair,
}

impl JobKind {
    /// Every job kind.
    pub const ALL: [Self; 2] = [Self::AccountQuery, Self::DatabaseRepair];

    /// Whether jobs of this kind emit progress events.
    #[must_use]
    pub const fn reports_progress(self) -> bool {
        matches!(self, Self::DatabaseRepair)
    }

    /// Get display name for the job kind.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::AccountQuery => "account query",
            Self::DatabaseRepair => "database repair",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::AccountQuery => 0,
            Self::DatabaseRepair => 1,
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One in-flight background operation.
///
/// Clones share the same cancellation token.
#[derive(Debug, Clone)]
pub struct JobHandle {
    kind: JobKind,
    sequence: u64,
    token: CancellationToken,
}

impl JobHandle {
    pub(crate) fn new(kind: JobKind, sequence: u64) -> Self {
        Self {
            kind,
            sequence,
            token: CancellationToken::new(),
        }
    }

    /// Kind of job.
    #[must_use]
    pub const fn kind(&self) -> JobKind {
        self.kind
    }

    /// Sequence number, strictly increasing per kind.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns true once the job has been cancelled or superseded.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token the worker observes for cooperative cancellation.
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}
