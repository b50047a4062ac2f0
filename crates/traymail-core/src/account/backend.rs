//! Account-storage backend interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::model::Account;
use crate::error::BackendError;
use crate::jobs::ProgressReporter;

/// Counters produced by an unread-count repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSummary {
    /// Records inspected.
    pub scanned: u64,
    /// Records rewritten because their count was inconsistent.
    pub repaired: u64,
}

impl RepairSummary {
    /// Returns true if nothing needed repairing.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.repaired == 0
    }
}

/// Storage that knows the configured accounts and their unread counters.
///
/// Implementations may be called concurrently: `list_accounts` from an
/// account query while `repair_unread_counts` runs. Any single-writer
/// discipline the storage needs is the implementation's job.
#[async_trait]
pub trait AccountBackend: Send + Sync + 'static {
    /// Return the complete, ordered list of configured accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    async fn list_accounts(&self) -> Result<Vec<Account>, BackendError>;

    /// Scan unread-count records and repair inconsistent ones in place.
    ///
    /// Implementations report completion through `progress` and must check
    /// `cancel` between records; once it is cancelled no further record may
    /// be touched. Repairs committed before that stay committed.
    ///
    /// # Errors
    ///
    /// Returns an error on an unrecoverable storage failure.
    async fn repair_unread_counts(
        &self,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<RepairSummary, BackendError>;
}
