//! Unread-count parser selection.

use serde::{Deserialize, Serialize};

/// File the SQLite parser reads inside a profile directory.
pub const SQLITE_MARKER: &str = "global-messages-db.sqlite";

/// How unread counts are read from a Thunderbird profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserType {
    /// Thunderbird's global message database.
    #[default]
    Sqlite,
    /// Per-folder Mork summary files.
    Mork,
}

impl ParserType {
    /// Get display name for the parser.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Sqlite => "SQLite (global message database)",
            Self::Mork => "Mork (folder summary files)",
        }
    }

    /// Entry the profile directory must contain for this parser, if any.
    #[must_use]
    pub const fn layout_marker(self) -> Option<&'static str> {
        match self {
            Self::Sqlite => Some(SQLITE_MARKER),
            Self::Mork => None,
        }
    }

    /// Whether the account list can be queried from the backend.
    #[must_use]
    pub const fn supports_account_query(self) -> bool {
        matches!(self, Self::Sqlite)
    }

    /// Whether unread counters can be repaired.
    #[must_use]
    pub const fn supports_repair(self) -> bool {
        matches!(self, Self::Sqlite)
    }
}

impl std::fmt::Display for ParserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Sqlite => "sqlite",
            Self::Mork => "mork",
        })
    }
}

impl std::str::FromStr for ParserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "mork" => Ok(Self::Mork),
            other => Err(format!("unknown parser '{other}', expected 'sqlite' or 'mork'")),
        }
    }
}
