//! Single authority for starting, cancelling and reporting background jobs.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::event::{JobEvent, Outcome, ProgressEvent, TerminalEvent};
use super::kind::{JobHandle, JobKind};
use super::progress::ProgressReporter;
use super::{account_query, repair};
use crate::account::AccountBackend;
use crate::config::CoreConfig;
use crate::{Error, Result};

/// Callback receiving every delivered event.
pub type EventHandler = Box<dyn FnMut(&JobEvent) + Send>;

/// Per-kind bookkeeping.
#[derive(Debug, Default)]
struct Slot {
    /// Last sequence number handed out.
    issued: u64,
    live: Option<LiveJob>,
}

#[derive(Debug)]
struct LiveJob {
    handle: JobHandle,
    last_percentage: Option<u8>,
}

/// Runs account queries and database repairs off the control context and
/// relays their events back to it.
///
/// The coordinator is owned by the consumer. Workers run as tasks on a
/// Tokio runtime and send raw events over a channel; filtering and handler
/// calls only happen inside [`next_event`](Self::next_event) and
/// [`drain_events`](Self::drain_events), so the consumer never sees events
/// concurrently.
///
/// Only events whose sequence matches the live handle of their kind are
/// delivered. Starting a job supersedes the live one of the same kind, and
/// its events are never delivered afterwards.
pub struct JobCoordinator<B: AccountBackend + ?Sized> {
    backend: Arc<B>,
    runtime: Handle,
    progress_step: u8,
    slots: [Slot; 2],
    events_tx: mpsc::UnboundedSender<JobEvent>,
    events_rx: mpsc::UnboundedReceiver<JobEvent>,
    ready: VecDeque<JobEvent>,
    handler: Option<EventHandler>,
}

impl<B: AccountBackend + ?Sized> JobCoordinator<B> {
    /// Create a coordinator running jobs on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if called outside a Tokio runtime.
    pub fn new(backend: Arc<B>, config: &CoreConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?;
        Ok(Self::with_runtime(backend, config, runtime))
    }

    /// Create a coordinator running jobs on the given runtime.
    #[must_use]
    pub fn with_runtime(backend: Arc<B>, config: &CoreConfig, runtime: Handle) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            runtime,
            progress_step: config.progress_step(),
            slots: Default::default(),
            events_tx,
            events_rx,
            ready: VecDeque::new(),
            handler: None,
        }
    }

    /// Start a job of `kind`, superseding any live job of the same kind.
    ///
    /// Returns immediately; the worker runs on the runtime.
    pub fn start(&mut self, kind: JobKind) -> JobHandle {
        let slot = &mut self.slots[kind.index()];
        if let Some(previous) = slot.live.take() {
            previous.handle.cancel();
            debug!(
                %kind,
                sequence = previous.handle.sequence(),
                "Superseding running job"
            );
        }
        // Anything already accepted for this kind belongs to an older sequence.
        self.ready.retain(|event| event.kind() != kind);

        slot.issued += 1;
        let handle = JobHandle::new(kind, slot.issued);
        slot.live = Some(LiveJob {
            handle: handle.clone(),
            last_percentage: None,
        });
        debug!(%kind, sequence = handle.sequence(), "Starting job");

        self.spawn_worker(handle.clone());
        handle
    }

    /// Cancel the live job of `kind`.
    ///
    /// Returns false, and emits nothing, if no job of that kind is live.
    /// The job stays live until its `Cancelled` terminal event is delivered.
    pub fn cancel(&mut self, kind: JobKind) -> bool {
        let Some(live) = self.slots[kind.index()].live.as_ref() else {
            return false;
        };
        live.handle.cancel();
        debug!(%kind, sequence = live.handle.sequence(), "Cancelling job");
        self.ready
            .retain(|event| event.kind() != kind || event.is_terminal());
        true
    }

    /// Cancel every live job.
    pub fn cancel_all(&mut self) {
        for kind in JobKind::ALL {
            self.cancel(kind);
        }
    }

    /// Register the consumer callback, replacing the previous one.
    pub fn on_event<F>(&mut self, handler: F)
    where
        F: FnMut(&JobEvent) + Send + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    /// Returns true while a job of `kind` is live.
    #[must_use]
    pub const fn is_running(&self, kind: JobKind) -> bool {
        self.slots[kind.index()].live.is_some()
    }

    /// Handle of the live job of `kind`, if any.
    #[must_use]
    pub fn live_handle(&self, kind: JobKind) -> Option<&JobHandle> {
        self.slots[kind.index()].live.as_ref().map(|live| &live.handle)
    }

    /// Returns true while any job is live.
    #[must_use]
    pub fn has_live_jobs(&self) -> bool {
        self.slots.iter().any(|slot| slot.live.is_some())
    }

    /// Wait for the next deliverable event.
    ///
    /// The event is passed to the registered handler and returned. Returns
    /// `None` once no job is live and nothing is left to deliver. Dropping
    /// the future before it completes loses no events.
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                self.deliver(&event);
                return Some(event);
            }
            if !self.has_live_jobs() {
                return None;
            }
            let event = self.events_rx.recv().await?;
            self.accept(event);
        }
    }

    /// Deliver every event that is available right now, without waiting.
    pub fn drain_events(&mut self) -> Vec<JobEvent> {
        while let Ok(event) = self.events_rx.try_recv() {
            self.accept(event);
        }
        let events: Vec<JobEvent> = self.ready.drain(..).collect();
        for event in &events {
            self.deliver(event);
        }
        events
    }

    fn deliver(&mut self, event: &JobEvent) {
        if let Some(handler) = self.handler.as_mut() {
            handler(event);
        }
    }

    /// Filter a raw worker event and queue what survives.
    fn accept(&mut self, event: JobEvent) {
        let kind = event.kind();
        let sequence = event.sequence();
        let slot = &mut self.slots[kind.index()];

        let Some(live) = slot.live.as_mut() else {
            trace!(%kind, sequence, "Dropping event: no live job");
            return;
        };
        if live.handle.sequence() != sequence {
            trace!(
                %kind,
                sequence,
                live = live.handle.sequence(),
                "Dropping stale event"
            );
            return;
        }

        match event {
            JobEvent::Progress(progress) => {
                if live.handle.is_cancelled() {
                    trace!(%kind, sequence, "Dropping progress of cancelled job");
                    return;
                }
                if live
                    .last_percentage
                    .is_some_and(|last| progress.percentage < last)
                {
                    return;
                }
                live.last_percentage = Some(progress.percentage);
                self.ready.push_back(JobEvent::Progress(progress));
            }
            JobEvent::Terminal(mut terminal) => {
                let cancelled = live.handle.is_cancelled();
                let last_percentage = live.last_percentage;
                slot.live = None;

                if cancelled {
                    terminal.outcome = Outcome::Cancelled;
                } else if kind.reports_progress()
                    && terminal.outcome.is_success()
                    && last_percentage != Some(100)
                {
                    self.ready.push_back(JobEvent::Progress(ProgressEvent {
                        kind,
                        sequence,
                        percentage: 100,
                    }));
                }

                debug!(%kind, sequence, outcome = terminal.outcome.label(), "Job finished");
                self.ready.push_back(JobEvent::Terminal(terminal));
            }
        }
    }

    fn spawn_worker(&self, handle: JobHandle) {
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        let runtime = self.runtime.clone();
        let step = self.progress_step;

        // The supervisor turns a panicking worker into a `Failed` outcome so
        // every sequence gets exactly one terminal event.
        self.runtime.spawn(async move {
            let kind = handle.kind();
            let sequence = handle.sequence();
            let worker = runtime.spawn(run_worker(backend, handle, events.clone(), step));

            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => {
                    warn!(%kind, sequence, "Worker panicked");
                    Outcome::Failed(format!("The {kind} worker panicked"))
                }
                Err(e) => Outcome::Failed(e.to_string()),
            };

            let terminal = JobEvent::Terminal(TerminalEvent {
                kind,
                sequence,
                outcome,
            });
            if events.send(terminal).is_err() {
                trace!(%kind, sequence, "Coordinator gone; dropping terminal event");
            }
        });
    }
}

impl<B: AccountBackend + ?Sized> Drop for JobCoordinator<B> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

impl<B: AccountBackend + ?Sized> std::fmt::Debug for JobCoordinator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobCoordinator")
            .field("slots", &self.slots)
            .field("ready", &self.ready.len())
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

async fn run_worker<B>(
    backend: Arc<B>,
    handle: JobHandle,
    events: mpsc::UnboundedSender<JobEvent>,
    step: u8,
) -> Outcome
where
    B: AccountBackend + ?Sized,
{
    match handle.kind() {
        JobKind::AccountQuery => account_query::run(backend.as_ref(), &handle).await,
        JobKind::DatabaseRepair => {
            let reporter = ProgressReporter::new(&handle, events, step);
            repair::run(backend.as_ref(), &handle, &reporter).await
        }
    }
}
