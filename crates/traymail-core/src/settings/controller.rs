//! Settings screen controller.

use tracing::{debug, warn};

use super::state::{AcceptedSettings, AccountListState, RepairState, SettingsTab};
use crate::account::{AccountBackend, AccountSnapshot};
use crate::config::CoreConfig;
use crate::jobs::{JobCoordinator, JobEvent, JobHandle, JobKind, JobPayload, Outcome};
use crate::profile::{
    FeatureAvailability, FileSystem, ParserType, ProfileValidationResult, SystemFileSystem,
    validate_profile_path,
};
use crate::{Error, Result};

/// UI-agnostic state and commands behind the settings screen.
///
/// The renderer reads the state accessors; user actions call the command
/// methods; [`pump`](Self::pump) or [`pump_pending`](Self::pump_pending)
/// applies job events as they arrive.
pub struct SettingsController<B: AccountBackend + ?Sized, F: FileSystem = SystemFileSystem> {
    jobs: JobCoordinator<B>,
    fs: F,
    profile_path: String,
    parser: ParserType,
    validation: ProfileValidationResult,
    tab: SettingsTab,
    accounts: AccountSnapshot,
    account_state: AccountListState,
    repair_state: RepairState,
}

impl<B: AccountBackend + ?Sized, F: FileSystem> SettingsController<B, F> {
    /// Create a controller showing the configured default profile and parser.
    pub fn new(jobs: JobCoordinator<B>, fs: F, config: &CoreConfig) -> Self {
        let profile_path = config.default_profile_path.clone();
        let parser = config.default_parser;
        let validation = validate_profile_path(&fs, &profile_path, parser);
        Self {
            jobs,
            fs,
            profile_path,
            parser,
            validation,
            tab: SettingsTab::default(),
            accounts: AccountSnapshot::default(),
            account_state: AccountListState::default(),
            repair_state: RepairState::default(),
        }
    }

    /// Typed profile path.
    #[must_use]
    pub fn profile_path(&self) -> &str {
        &self.profile_path
    }

    /// Selected parser.
    #[must_use]
    pub const fn parser(&self) -> ParserType {
        self.parser
    }

    /// Result of the latest validation.
    #[must_use]
    pub const fn validation(&self) -> &ProfileValidationResult {
        &self.validation
    }

    /// Actions currently enabled.
    #[must_use]
    pub const fn features(&self) -> FeatureAvailability {
        self.validation.features()
    }

    /// Active tab.
    #[must_use]
    pub const fn tab(&self) -> SettingsTab {
        self.tab
    }

    /// Latest published account list.
    #[must_use]
    pub const fn accounts(&self) -> &AccountSnapshot {
        &self.accounts
    }

    /// Account list state.
    #[must_use]
    pub const fn account_state(&self) -> &AccountListState {
        &self.account_state
    }

    /// Repair state.
    #[must_use]
    pub const fn repair_state(&self) -> &RepairState {
        &self.repair_state
    }

    /// The job coordinator.
    #[must_use]
    pub const fn jobs(&self) -> &JobCoordinator<B> {
        &self.jobs
    }

    /// The job coordinator, for registering an event handler.
    pub const fn jobs_mut(&mut self) -> &mut JobCoordinator<B> {
        &mut self.jobs
    }

    /// The profile path text changed.
    pub fn set_profile_path(&mut self, path: impl Into<String>) -> &ProfileValidationResult {
        self.profile_path = path.into();
        self.revalidate()
    }

    /// The parser selection changed.
    pub fn set_parser(&mut self, parser: ParserType) -> &ProfileValidationResult {
        self.parser = parser;
        self.revalidate()
    }

    fn revalidate(&mut self) -> &ProfileValidationResult {
        self.validation = validate_profile_path(&self.fs, &self.profile_path, self.parser);
        match &self.validation.reason {
            None => debug!("Profile path {:?} is valid", self.validation.expanded),
            Some(reason) => debug!("Profile path {:?} rejected: {reason}", self.profile_path),
        }
        &self.validation
    }

    /// Switch tabs; opening the Accounts tab refreshes the account list.
    pub fn activate_tab(&mut self, tab: SettingsTab) -> Option<JobHandle> {
        self.tab = tab;
        if tab == SettingsTab::Accounts && self.features().account_refresh {
            return self.refresh_accounts().ok();
        }
        None
    }

    /// Start an account query.
    ///
    /// # Errors
    ///
    /// Returns `Error::FeatureUnavailable` if the profile or parser does
    /// not allow it.
    pub fn refresh_accounts(&mut self) -> Result<JobHandle> {
        if !self.features().account_refresh {
            return Err(Error::FeatureUnavailable("account refresh"));
        }
        self.account_state = AccountListState::Loading;
        Ok(self.jobs.start(JobKind::AccountQuery))
    }

    /// Start an unread-count repair.
    ///
    /// # Errors
    ///
    /// Returns `Error::FeatureUnavailable` if the profile or parser does
    /// not allow it.
    pub fn start_repair(&mut self) -> Result<JobHandle> {
        if !self.features().repair {
            return Err(Error::FeatureUnavailable("database repair"));
        }
        self.repair_state = RepairState::Running { percentage: 0 };
        Ok(self.jobs.start(JobKind::DatabaseRepair))
    }

    /// Cancel a running repair. Returns false if none was running.
    pub fn cancel_repair(&mut self) -> bool {
        self.jobs.cancel(JobKind::DatabaseRepair)
    }

    /// Wait for the next job event and apply it.
    ///
    /// Returns `None` when no job is running.
    pub async fn pump(&mut self) -> Option<JobEvent> {
        let event = self.jobs.next_event().await?;
        self.apply(&event);
        Some(event)
    }

    /// Apply every job event available right now. Returns how many.
    pub fn pump_pending(&mut self) -> usize {
        let events = self.jobs.drain_events();
        for event in &events {
            self.apply(event);
        }
        events.len()
    }

    /// Update presentation state from a delivered job event.
    pub fn apply(&mut self, event: &JobEvent) {
        match event {
            JobEvent::Progress(progress) => {
                if progress.kind == JobKind::DatabaseRepair {
                    self.repair_state = RepairState::Running {
                        percentage: progress.percentage,
                    };
                }
            }
            JobEvent::Terminal(terminal) => match (terminal.kind, &terminal.outcome) {
                (JobKind::AccountQuery, Outcome::Success(JobPayload::Accounts(snapshot))) => {
                    self.accounts = snapshot.clone();
                    self.account_state = AccountListState::Loaded;
                }
                (JobKind::AccountQuery, Outcome::Failed(message)) => {
                    self.account_state = AccountListState::Failed(message.clone());
                }
                (JobKind::AccountQuery, Outcome::Cancelled) => {
                    self.account_state = AccountListState::Idle;
                }
                (JobKind::DatabaseRepair, Outcome::Success(JobPayload::Repair(summary))) => {
                    self.repair_state = RepairState::Finished(*summary);
                }
                (JobKind::DatabaseRepair, Outcome::Failed(message)) => {
                    self.repair_state = RepairState::Failed(message.clone());
                }
                (JobKind::DatabaseRepair, Outcome::Cancelled) => {
                    self.repair_state = RepairState::Cancelled;
                }
                (kind, Outcome::Success(_)) => {
                    warn!(%kind, "Ignoring success with mismatched payload");
                }
            },
        }
    }

    /// Accept the dialog.
    ///
    /// Running jobs are cancelled, their states settle immediately, and the
    /// derived settings are returned for persistence.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidProfilePath` if the profile path is invalid;
    /// nothing is cancelled in that case.
    pub fn accept(&mut self) -> Result<AcceptedSettings> {
        let profile_path = self.validation.clone().into_result()?;
        self.jobs.cancel_all();
        if self.account_state == AccountListState::Loading {
            self.account_state = AccountListState::Idle;
        }
        if self.repair_state.is_running() {
            self.repair_state = RepairState::Cancelled;
        }
        Ok(AcceptedSettings {
            profile_path,
            parser: self.parser,
            enabled_accounts: self.accounts.enabled_ids(),
        })
    }
}

impl<B: AccountBackend + ?Sized, F: FileSystem> std::fmt::Debug for SettingsController<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsController")
            .field("profile_path", &self.profile_path)
            .field("parser", &self.parser)
            .field("validation", &self.validation)
            .field("tab", &self.tab)
            .field("accounts", &self.accounts.len())
            .field("account_state", &self.account_state)
            .field("repair_state", &self.repair_state)
            .finish_non_exhaustive()
    }
}
