//! Account model types.

use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Unique identifier for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl AccountId {
    /// Create a new account ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One monitored mailbox as reported by the account-storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Backend identifier.
    pub id: AccountId,
    /// Display label.
    pub label: String,
    /// Reference into the storage backend (for Thunderbird, the folder URI).
    pub backend_ref: String,
    /// Unread message count.
    pub unread_count: u32,
    /// Whether the account is watched.
    pub enabled: bool,
}

impl Account {
    /// Create an enabled account with no unread messages.
    #[must_use]
    pub fn new(id: AccountId, label: impl Into<String>, backend_ref: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            backend_ref: backend_ref.into(),
            unread_count: 0,
            enabled: true,
        }
    }

    /// Set the unread count.
    #[must_use]
    pub const fn with_unread(mut self, unread_count: u32) -> Self {
        self.unread_count = unread_count;
        self
    }

    /// Set whether the account is watched.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Immutable, ordered list of accounts published by one successful query.
///
/// Cloning is cheap; a refresh replaces the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSnapshot(Arc<[Account]>);

impl AccountSnapshot {
    /// Sum of unread counts over enabled accounts.
    #[must_use]
    pub fn total_unread(&self) -> u64 {
        self.0
            .iter()
            .filter(|a| a.enabled)
            .map(|a| u64::from(a.unread_count))
            .sum()
    }

    /// Identifiers of enabled accounts, in snapshot order.
    #[must_use]
    pub fn enabled_ids(&self) -> Vec<AccountId> {
        self.0.iter().filter(|a| a.enabled).map(|a| a.id).collect()
    }
}

impl From<Vec<Account>> for AccountSnapshot {
    fn from(accounts: Vec<Account>) -> Self {
        Self(accounts.into())
    }
}

impl Deref for AccountSnapshot {
    type Target = [Account];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    mod account_id_tests {
        use super::*;

        #[test]
        fn display() {
            let id = AccountId::new(123);
            assert_eq!(format!("{id}"), "123");
        }

        #[test]
        fn equality() {
            assert_eq!(AccountId::new(1), AccountId::new(1));
            assert_ne!(AccountId::new(1), AccountId::new(2));
        }
    }

    mod account_tests {
        use super::*;

        #[test]
        fn new_is_enabled_and_read() {
            let account = Account::new(AccountId::new(1), "Inbox", "imap://user@host/INBOX");
            assert!(account.enabled);
            assert_eq!(account.unread_count, 0);
            assert_eq!(account.label, "Inbox");
        }

        #[test]
        fn builders() {
            let account = Account::new(AccountId::new(1), "Inbox", "mailbox://local/Inbox")
                .with_unread(7)
                .with_enabled(false);
            assert_eq!(account.unread_count, 7);
            assert!(!account.enabled);
        }
    }

    mod snapshot_tests {
        use super::*;

        fn sample() -> AccountSnapshot {
            vec![
                Account::new(AccountId::new(1), "Work", "imap://work/INBOX").with_unread(3),
                Account::new(AccountId::new(2), "Spam", "imap://work/Junk")
                    .with_unread(40)
                    .with_enabled(false),
                Account::new(AccountId::new(3), "Home", "imap://home/INBOX").with_unread(2),
            ]
            .into()
        }

        #[test]
        fn default_is_empty() {
            assert!(AccountSnapshot::default().is_empty());
        }

        #[test]
        fn keeps_order() {
            let snapshot = sample();
            let labels: Vec<&str> = snapshot.iter().map(|a| a.label.as_str()).collect();
            assert_eq!(labels, ["Work", "Spam", "Home"]);
        }

        #[test]
        fn total_unread_skips_disabled() {
            assert_eq!(sample().total_unread(), 5);
        }

        #[test]
        fn enabled_ids() {
            assert_eq!(
                sample().enabled_ids(),
                vec![AccountId::new(1), AccountId::new(3)]
            );
        }

        #[test]
        fn clones_share_storage() {
            let a = sample();
            let b = a.clone();
            assert!(std::ptr::eq(a.as_ptr(), b.as_ptr()));
        }
    }
}
