//! # traymail-core
//!
//! Core logic behind the settings screen of a tray unread-mail notifier.
//!
//! This crate provides:
//! - Account model and the storage backend seam
//! - Background account queries and unread-count repairs with progress
//! - Thunderbird profile path validation
//! - A UI-agnostic settings controller
//! - Core configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod config;
mod error;
pub mod jobs;
pub mod profile;
pub mod settings;

pub use account::{Account, AccountBackend, AccountId, AccountSnapshot, RepairSummary};
pub use config::CoreConfig;
pub use error::{BackendError, Error, Result};
pub use jobs::{
    JobCoordinator, JobEvent, JobHandle, JobKind, JobPayload, Outcome, ProgressEvent,
    ProgressReporter, TerminalEvent,
};
pub use profile::{
    FeatureAvailability, FileSystem, InvalidReason, MemoryFileSystem, ParserType,
    ProfileValidationResult, SystemFileSystem, validate_profile_path,
};
pub use settings::{
    AcceptedSettings, AccountListState, RepairState, SettingsController, SettingsTab,
};
