//! Progress reporting from inside a worker.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::event::{JobEvent, ProgressEvent};
use super::kind::{JobHandle, JobKind};

/// Highest percentage a running job may report.
///
/// 100 is emitted by the coordinator together with a successful outcome.
pub const MAX_RUNNING_PERCENTAGE: u8 = 99;

/// Sink a backend uses to report repair progress.
///
/// Reports are throttled: a value is only forwarded when it is at least
/// `step` points above the last forwarded one (the first report always
/// goes through). Values never decrease, are capped at
/// [`MAX_RUNNING_PERCENTAGE`], and stop once the job is cancelled.
#[derive(Debug)]
pub struct ProgressReporter {
    kind: JobKind,
    sequence: u64,
    step: u8,
    cancel: CancellationToken,
    events: UnboundedSender<JobEvent>,
    last: Mutex<Option<u8>>,
}

impl ProgressReporter {
    pub(crate) fn new(handle: &JobHandle, events: UnboundedSender<JobEvent>, step: u8) -> Self {
        Self {
            kind: handle.kind(),
            sequence: handle.sequence(),
            step: step.max(1),
            cancel: handle.token().clone(),
            events,
            last: Mutex::new(None),
        }
    }

    /// Report `done` out of `total` records processed.
    ///
    /// A `total` of zero counts as no progress.
    pub fn report(&self, done: u64, total: u64) {
        self.set_percentage(percentage_of(done, total));
    }

    /// Report a completion percentage directly.
    pub fn set_percentage(&self, percentage: u8) {
        if self.cancel.is_cancelled() {
            return;
        }

        let percentage = percentage.min(MAX_RUNNING_PERCENTAGE);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = *last
            && (percentage <= previous || percentage - previous < self.step)
        {
            return;
        }
        *last = Some(percentage);

        let event = JobEvent::Progress(ProgressEvent {
            kind: self.kind,
            sequence: self.sequence,
            percentage,
        });
        if self.events.send(event).is_err() {
            trace!("Coordinator gone; dropping progress {percentage}%");
        }
    }

    /// Last percentage forwarded, if any.
    #[must_use]
    pub fn last_percentage(&self) -> Option<u8> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true once the job has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn percentage_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = u128::from(done.min(total));
    (done * 100 / u128::from(total)) as u8
}
