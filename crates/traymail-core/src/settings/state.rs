//! Presentation state of the settings screen.

use std::path::PathBuf;

use crate::account::{AccountId, RepairSummary};
use crate::profile::ParserType;

/// Settings tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsTab {
    /// Profile path and parser.
    #[default]
    General,
    /// Watched accounts.
    Accounts,
    /// Tray icon appearance.
    Appearance,
    /// New-mail notification rules.
    NewEmail,
    /// Mail client command line, repair and update check.
    Advanced,
}

/// State of the account list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccountListState {
    /// Never queried.
    #[default]
    Idle,
    /// A query is running.
    Loading,
    /// The last query succeeded.
    Loaded,
    /// The last query failed; the previous list is kept.
    Failed(String),
}

/// State of the unread-count repair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RepairState {
    /// Not started.
    #[default]
    Idle,
    /// Running.
    Running {
        /// Last delivered completion percentage.
        percentage: u8,
    },
    /// Finished normally.
    Finished(RepairSummary),
    /// Failed with a displayable message.
    Failed(String),
    /// Cancelled by the user.
    Cancelled,
}

impl RepairState {
    /// Returns true while a repair is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Settings derived on accept, handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedSettings {
    /// Expanded profile directory.
    pub profile_path: PathBuf,
    /// Selected parser.
    pub parser: ParserType,
    /// Enabled accounts from the current snapshot.
    pub enabled_accounts: Vec<AccountId>,
}
