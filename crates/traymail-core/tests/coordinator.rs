//! End-to-end behaviour of the job coordinator with scripted backends.

#![allow(clippy::unwrap_used, clippy::significant_drop_tightening)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio_test::{assert_pending, task};
use tokio_util::sync::CancellationToken;
use traymail_core::{
    Account, AccountBackend, AccountId, BackendError, CoreConfig, JobCoordinator, JobEvent,
    JobKind, JobPayload, Outcome, ProgressReporter, RepairSummary,
};

/// Backend whose calls block until the test hands out a permit.
struct Gated {
    gate: Semaphore,
    queries: AtomicUsize,
}

impl Default for Gated {
    fn default() -> Self {
        Self {
            gate: Semaphore::new(0),
            queries: AtomicUsize::new(0),
        }
    }
}

impl Gated {
    fn release(&self, permits: usize) {
        self.gate.add_permits(permits);
    }
}

#[async_trait]
impl AccountBackend for Gated {
    async fn list_accounts(&self) -> Result<Vec<Account>, BackendError> {
        let call = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
        self.gate.acquire().await.unwrap().forget();
        Ok(vec![Account::new(
            AccountId::new(i64::try_from(call).unwrap()),
            format!("call {call}"),
            "mailbox://Inbox",
        )])
    }

    async fn repair_unread_counts(
        &self,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<RepairSummary, BackendError> {
        for done in 1..=4 {
            tokio::select! {
                () = cancel.cancelled() => return Ok(RepairSummary { scanned: done - 1, repaired: 0 }),
                permit = self.gate.acquire() => permit.unwrap().forget(),
            }
            progress.report(done, 4);
        }
        Ok(RepairSummary {
            scanned: 4,
            repaired: 2,
        })
    }
}

/// Repair backend that stops at 40% and keeps reporting after cancellation.
struct StopsAtForty;

#[async_trait]
impl AccountBackend for StopsAtForty {
    async fn list_accounts(&self) -> Result<Vec<Account>, BackendError> {
        Ok(Vec::new())
    }

    async fn repair_unread_counts(
        &self,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<RepairSummary, BackendError> {
        for percentage in [10, 20, 30, 40] {
            progress.set_percentage(percentage);
        }
        cancel.cancelled().await;
        progress.set_percentage(60);
        Ok(RepairSummary {
            scanned: 10,
            repaired: 4,
        })
    }
}

struct Panicking;

#[async_trait]
impl AccountBackend for Panicking {
    async fn list_accounts(&self) -> Result<Vec<Account>, BackendError> {
        panic!("backend exploded");
    }

    async fn repair_unread_counts(
        &self,
        _progress: &ProgressReporter,
        _cancel: &CancellationToken,
    ) -> Result<RepairSummary, BackendError> {
        Err(BackendError::Unavailable)
    }
}

fn coordinator<B: AccountBackend>(backend: Arc<B>) -> JobCoordinator<B> {
    JobCoordinator::new(backend, &CoreConfig::default()).unwrap()
}

async fn collect<B: AccountBackend>(jobs: &mut JobCoordinator<B>) -> Vec<JobEvent> {
    let mut events = Vec::new();
    while let Some(event) = jobs.next_event().await {
        events.push(event);
    }
    events
}

fn percentages(events: &[JobEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Progress(p) => Some(p.percentage),
            JobEvent::Terminal(_) => None,
        })
        .collect()
}

fn terminals(events: &[JobEvent]) -> Vec<(u64, Outcome)> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Terminal(t) => Some((t.sequence, t.outcome.clone())),
            JobEvent::Progress(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn only_latest_account_query_is_delivered() {
    let backend = Arc::new(Gated::default());
    let mut jobs = coordinator(Arc::clone(&backend));

    jobs.start(JobKind::AccountQuery);
    jobs.start(JobKind::AccountQuery);
    let latest = jobs.start(JobKind::AccountQuery);
    backend.release(3);

    let events = collect(&mut jobs).await;
    assert_eq!(events.len(), 1);
    assert!(events.iter().all(|e| e.sequence() == latest.sequence()));
    assert!(matches!(
        &events[0],
        JobEvent::Terminal(t) if matches!(t.outcome, Outcome::Success(JobPayload::Accounts(_)))
    ));
}

#[tokio::test]
async fn stale_query_finishing_late_is_discarded() {
    let backend = Arc::new(Gated::default());
    let mut jobs = coordinator(Arc::clone(&backend));

    let stale = jobs.start(JobKind::AccountQuery);
    while backend.queries.load(Ordering::SeqCst) < 1 {
        tokio::task::yield_now().await;
    }
    let latest = jobs.start(JobKind::AccountQuery);
    assert!(stale.is_cancelled());
    backend.release(2);

    let events = collect(&mut jobs).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].sequence(), latest.sequence());
    match &events[0] {
        JobEvent::Terminal(t) => match &t.outcome {
            Outcome::Success(JobPayload::Accounts(accounts)) => {
                assert_eq!(accounts[0].label, "call 2");
            }
            other => panic!("unexpected outcome: {other:?}"),
        },
        JobEvent::Progress(p) => panic!("unexpected progress: {p:?}"),
    }
}

#[tokio::test]
async fn successful_repair_ends_at_full_progress() {
    let backend = Arc::new(Gated::default());
    let mut jobs = coordinator(Arc::clone(&backend));

    jobs.start(JobKind::DatabaseRepair);
    backend.release(4);

    let events = collect(&mut jobs).await;
    assert_eq!(percentages(&events), vec![0, 25, 50, 75, 99, 100]);
    assert_eq!(
        terminals(&events),
        vec![(
            1,
            Outcome::Success(JobPayload::Repair(RepairSummary {
                scanned: 4,
                repaired: 2
            }))
        )]
    );
    assert!(events.last().unwrap().is_terminal());
}

#[tokio::test]
async fn cancel_without_live_job_emits_nothing() {
    let mut jobs = coordinator(Arc::new(Gated::default()));

    assert!(!jobs.cancel(JobKind::DatabaseRepair));
    assert!(!jobs.cancel(JobKind::AccountQuery));
    assert!(jobs.drain_events().is_empty());
    assert!(jobs.next_event().await.is_none());
}

#[tokio::test]
async fn restarted_repair_delivers_second_sequence_only() {
    let backend = Arc::new(Gated::default());
    let mut jobs = coordinator(Arc::clone(&backend));

    let first = jobs.start(JobKind::DatabaseRepair);
    let second = jobs.start(JobKind::DatabaseRepair);
    assert!(first.is_cancelled());
    // The superseded worker may still take permits before noticing.
    backend.release(8);

    let events = collect(&mut jobs).await;
    assert!(events.iter().all(|e| e.sequence() == second.sequence()));
    assert_eq!(terminals(&events).len(), 1);
    assert!(terminals(&events)[0].1.is_success());
}

#[tokio::test]
async fn repair_cancelled_at_forty_never_goes_higher() {
    let mut jobs = coordinator(Arc::new(StopsAtForty));
    jobs.start(JobKind::DatabaseRepair);

    let mut seen = Vec::new();
    while let Some(event) = jobs.next_event().await {
        let at_forty = matches!(&event, JobEvent::Progress(p) if p.percentage == 40);
        seen.push(event);
        if at_forty {
            break;
        }
    }
    assert!(jobs.cancel(JobKind::DatabaseRepair));
    assert!(jobs.is_running(JobKind::DatabaseRepair));

    seen.extend(collect(&mut jobs).await);
    assert!(percentages(&seen).iter().all(|&p| p <= 40));
    assert_eq!(terminals(&seen), vec![(1, Outcome::Cancelled)]);
    assert!(!jobs.is_running(JobKind::DatabaseRepair));
}

#[tokio::test]
async fn panicking_worker_reports_failure() {
    let mut jobs = coordinator(Arc::new(Panicking));
    jobs.start(JobKind::AccountQuery);

    let events = collect(&mut jobs).await;
    assert_eq!(
        terminals(&events),
        vec![(
            1,
            Outcome::Failed("The account query worker panicked".to_string())
        )]
    );
}

#[tokio::test]
async fn backend_failure_is_reported_with_message() {
    let mut jobs = coordinator(Arc::new(Panicking));
    jobs.start(JobKind::DatabaseRepair);

    let events = collect(&mut jobs).await;
    assert_eq!(
        terminals(&events),
        vec![(
            1,
            Outcome::Failed("Account storage is unavailable".to_string())
        )]
    );
}

#[tokio::test]
async fn handler_sees_every_delivered_event() {
    let backend = Arc::new(Gated::default());
    let mut jobs = coordinator(Arc::clone(&backend));
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delivered);
    jobs.on_event(move |event| sink.lock().unwrap().push(event.clone()));

    jobs.start(JobKind::DatabaseRepair);
    backend.release(4);
    let events = collect(&mut jobs).await;

    assert_eq!(*delivered.lock().unwrap(), events);
}

#[tokio::test]
async fn dropped_wait_loses_no_events() {
    let backend = Arc::new(Gated::default());
    let mut jobs = coordinator(Arc::clone(&backend));
    jobs.start(JobKind::AccountQuery);

    {
        let mut wait = task::spawn(jobs.next_event());
        assert_pending!(wait.poll());
    }

    backend.release(1);
    let event = jobs.next_event().await.unwrap();
    assert!(event.is_terminal());
    assert!(jobs.next_event().await.is_none());
}

#[tokio::test]
async fn drain_after_cancel_keeps_terminal() {
    let backend = Arc::new(Gated::default());
    let mut jobs = coordinator(Arc::clone(&backend));
    jobs.start(JobKind::AccountQuery);
    jobs.cancel_all();
    backend.release(1);

    let events = collect(&mut jobs).await;
    assert_eq!(terminals(&events), vec![(1, Outcome::Cancelled)]);
    assert!(!jobs.has_live_jobs());
}
