//! Unread-count repair.

use tracing::{info, warn};

use super::event::{JobPayload, Outcome};
use super::kind::JobHandle;
use super::progress::ProgressReporter;
use crate::account::AccountBackend;

/// Scan and repair unread-count records through the backend.
///
/// A cancelled job reports `Cancelled` whatever the backend returned;
/// records repaired before the backend noticed the cancellation stay
/// repaired.
pub(crate) async fn run<B>(backend: &B, handle: &JobHandle, reporter: &ProgressReporter) -> Outcome
where
    B: AccountBackend + ?Sized,
{
    if handle.is_cancelled() {
        return Outcome::Cancelled;
    }

    reporter.set_percentage(0);
    let result = backend.repair_unread_counts(reporter, handle.token()).await;

    if handle.is_cancelled() {
        info!(
            sequence = handle.sequence(),
            progress = ?reporter.last_percentage(),
            "Database repair cancelled"
        );
        return Outcome::Cancelled;
    }

    match result {
        Ok(summary) if summary.is_clean() => {
            info!(
                sequence = handle.sequence(),
                scanned = summary.scanned,
                "Database repair finished; no corrupted records"
            );
            Outcome::Success(JobPayload::Repair(summary))
        }
        Ok(summary) => {
            info!(
                sequence = handle.sequence(),
                scanned = summary.scanned,
                repaired = summary.repaired,
                "Database repair finished"
            );
            Outcome::Success(JobPayload::Repair(summary))
        }
        Err(e) => {
            warn!(sequence = handle.sequence(), "Database repair failed: {e}");
            Outcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::account::{Account, RepairSummary};
    use crate::error::BackendError;
    use crate::jobs::{JobEvent, JobKind};

    /// Repairs every other record out of `records`, failing at `fail_at`.
    struct Scripted {
        records: u64,
        fail_at: Option<u64>,
        cancel_at: Option<u64>,
    }

    #[async_trait]
    impl AccountBackend for Scripted {
        async fn list_accounts(&self) -> Result<Vec<Account>, BackendError> {
            Ok(Vec::new())
        }

        async fn repair_unread_counts(
            &self,
            progress: &ProgressReporter,
            cancel: &CancellationToken,
        ) -> Result<RepairSummary, BackendError> {
            let mut summary = RepairSummary::default();
            for record in 0..self.records {
                if self.cancel_at == Some(record) {
                    cancel.cancel();
                }
                if cancel.is_cancelled() {
                    break;
                }
                if self.fail_at == Some(record) {
                    return Err(BackendError::RepairPartialFailure {
                        detail: "database is locked".to_string(),
                        repaired: summary.repaired,
                    });
                }
                summary.scanned += 1;
                if record % 2 == 0 {
                    summary.repaired += 1;
                }
                progress.report(record + 1, self.records);
            }
            Ok(summary)
        }
    }

    fn setup() -> (JobHandle, ProgressReporter, mpsc::UnboundedReceiver<JobEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = JobHandle::new(JobKind::DatabaseRepair, 1);
        let reporter = ProgressReporter::new(&handle, tx, 1);
        (handle, reporter, rx)
    }

    #[tokio::test]
    async fn success_carries_summary() {
        let backend = Scripted {
            records: 4,
            fail_at: None,
            cancel_at: None,
        };
        let (handle, reporter, mut rx) = setup();
        let outcome = run(&backend, &handle, &reporter).await;
        assert_eq!(
            outcome,
            Outcome::Success(JobPayload::Repair(RepairSummary {
                scanned: 4,
                repaired: 2
            }))
        );

        let mut seen = Vec::new();
        while let Ok(JobEvent::Progress(p)) = rx.try_recv() {
            seen.push(p.percentage);
        }
        assert_eq!(seen, vec![0, 25, 50, 75, 99]);
    }

    #[tokio::test]
    async fn partial_failure_becomes_failed() {
        let backend = Scripted {
            records: 10,
            fail_at: Some(5),
            cancel_at: None,
        };
        let (handle, reporter, _rx) = setup();
        let outcome = run(&backend, &handle, &reporter).await;
        assert_eq!(
            outcome,
            Outcome::Failed(
                "Repair failed after 3 records were repaired: database is locked".to_string()
            )
        );
    }

    #[tokio::test]
    async fn cancellation_wins_over_backend_result() {
        let backend = Scripted {
            records: 10,
            fail_at: None,
            cancel_at: Some(4),
        };
        let (handle, reporter, _rx) = setup();
        assert_eq!(run(&backend, &handle, &reporter).await, Outcome::Cancelled);
        assert_eq!(reporter.last_percentage(), Some(40));
    }
}
