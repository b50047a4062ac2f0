//! Background jobs behind the settings screen.
//!
//! Two kinds of job exist: an account query refreshing the account list, and
//! a database repair fixing corrupted unread counters. The
//! [`JobCoordinator`] owns at most one live job of each kind and relays
//! their events to a single consumer:
//!
//! - zero or more [`ProgressEvent`]s (repairs only), non-decreasing;
//! - exactly one [`TerminalEvent`], always last.
//!
//! # Example
//!
//! ```ignore
//! let mut jobs = JobCoordinator::new(backend, &config)?;
//! jobs.start(JobKind::DatabaseRepair);
//!
//! while let Some(event) = jobs.next_event().await {
//!     match event {
//!         JobEvent::Progress(p) => bar.set(p.percentage),
//!         JobEvent::Terminal(t) => show_outcome(&t.outcome),
//!     }
//! }
//! ```

mod account_query;
mod coordinator;
mod event;
mod kind;
mod progress;
mod repair;

pub use coordinator::{EventHandler, JobCoordinator};
pub use event::{JobEvent, JobPayload, Outcome, ProgressEvent, TerminalEvent};
pub use kind::{JobHandle, JobKind};
pub use progress::{MAX_RUNNING_PERCENTAGE, ProgressReporter};
