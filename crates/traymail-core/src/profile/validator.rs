//! Profile path validation.

use std::path::PathBuf;

use super::fs::FileSystem;
use super::parser::ParserType;
use crate::{Error, Result};

/// Why a profile path was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// Nothing was typed.
    Empty,
    /// A placeholder refers to a variable without a value.
    Unresolved(String),
    /// The expanded path does not exist.
    NotFound,
    /// The expanded path is a file.
    NotADirectory,
    /// The directory lacks the entry the selected parser reads.
    WrongLayout {
        /// Entry that was expected inside the directory.
        marker: &'static str,
    },
}

impl InvalidReason {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Empty => "no path given",
            Self::Unresolved(_) => "unresolved placeholder",
            Self::NotFound => "not found",
            Self::NotADirectory => "not a directory",
            Self::WrongLayout { .. } => "wrong layout",
        }
    }
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolved(name) => write!(f, "{}: {name}", self.message()),
            Self::WrongLayout { marker } => write!(f, "{}: missing {marker}", self.message()),
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for InvalidReason {}

/// Which settings actions the current profile path allows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureAvailability {
    /// Refreshing the account list.
    pub account_refresh: bool,
    /// Repairing unread counters.
    pub repair: bool,
}

/// Outcome of validating one profile path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileValidationResult {
    /// Path as typed.
    pub path: String,
    /// Parser the path was checked against.
    pub parser: ParserType,
    /// Path after placeholder expansion (empty if expansion failed).
    pub expanded: PathBuf,
    /// Rejection reason; `None` for a valid path.
    pub reason: Option<InvalidReason>,
}

impl ProfileValidationResult {
    /// Returns true if the path can be used.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.reason.is_none()
    }

    /// Actions enabled by this result.
    #[must_use]
    pub const fn features(&self) -> FeatureAvailability {
        let valid = self.is_valid();
        FeatureAvailability {
            account_refresh: valid && self.parser.supports_account_query(),
            repair: valid && self.parser.supports_repair(),
        }
    }

    /// Convert into the expanded path, or an error for an invalid path.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidProfilePath` if the path was rejected.
    pub fn into_result(self) -> Result<PathBuf> {
        match self.reason {
            None => Ok(self.expanded),
            Some(reason) => Err(Error::InvalidProfilePath(reason)),
        }
    }
}

/// Platform default location of Thunderbird profiles, unexpanded.
#[must_use]
pub const fn default_profile_path() -> &'static str {
    if cfg!(windows) {
        "%AppData%\\Thunderbird\\Profiles"
    } else {
        "~/Library/Thunderbird/Profiles"
    }
}

/// Validate a typed profile path for the selected parser.
///
/// Pure with respect to `fs`: the same path, parser and filesystem state
/// always give the same result, and nothing is written.
pub fn validate_profile_path<F>(fs: &F, path: &str, parser: ParserType) -> ProfileValidationResult
where
    F: FileSystem + ?Sized,
{
    let result = |expanded: PathBuf, reason: Option<InvalidReason>| ProfileValidationResult {
        path: path.to_string(),
        parser,
        expanded,
        reason,
    };

    let typed = path.trim();
    if typed.is_empty() {
        return result(PathBuf::new(), Some(InvalidReason::Empty));
    }

    let expanded = match fs.expand(typed) {
        Ok(expanded) => expanded,
        Err(name) => return result(PathBuf::new(), Some(InvalidReason::Unresolved(name))),
    };

    let reason = if !fs.path_exists(&expanded) {
        Some(InvalidReason::NotFound)
    } else if !fs.is_directory(&expanded) {
        Some(InvalidReason::NotADirectory)
    } else {
        parser.layout_marker().and_then(|marker| {
            let entries = fs.list_entries(&expanded);
            (!entries.iter().any(|entry| entry == marker))
                .then_some(InvalidReason::WrongLayout { marker })
        })
    };

    result(expanded, reason)
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
    use proptest::prelude::*;

    use super::*;
    use crate::profile::MemoryFileSystem;
    use crate::profile::parser::SQLITE_MARKER;

    fn fs() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_home("/home/tester")
            .with_var("AppData", "/home/tester/roaming")
            .with_file("/profiles/sqlite/global-messages-db.sqlite")
            .with_dir("/profiles/mork/Mail")
            .with_file("/profiles/notes.txt")
    }

    #[test]
    fn test_empty_path() {
        let result = validate_profile_path(&fs(), "   ", ParserType::Mork);
        assert_eq!(result.reason, Some(InvalidReason::Empty));
        assert!(!result.is_valid());
    }

    #[test]
    fn test_home_shorthand_not_found() {
        let result = validate_profile_path(
            &fs(),
            "~/Library/Thunderbird/Profiles",
            ParserType::Sqlite,
        );
        assert!(result.expanded.is_absolute());
        assert_eq!(
            result.expanded,
            PathBuf::from("/home/tester/Library/Thunderbird/Profiles")
        );
        assert_eq!(result.reason, Some(InvalidReason::NotFound));
        assert_eq!(result.reason.unwrap().message(), "not found");
    }

    #[test]
    fn test_unresolved_placeholder() {
        let result = validate_profile_path(&fs(), "%LOCALAPPDATA%/tb", ParserType::Mork);
        assert_eq!(
            result.reason,
            Some(InvalidReason::Unresolved("LOCALAPPDATA".to_string()))
        );
    }

    #[test]
    fn test_home_shorthand_without_home() {
        let result = validate_profile_path(
            &MemoryFileSystem::new(),
            "~/Library/Thunderbird/Profiles",
            ParserType::Sqlite,
        );
        assert_eq!(
            result.reason,
            Some(InvalidReason::Unresolved("~".to_string()))
        );
        assert!(!result.features().repair);
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let result = validate_profile_path(&fs(), "/profiles/notes.txt", ParserType::Mork);
        assert_eq!(result.reason, Some(InvalidReason::NotADirectory));
    }

    #[test]
    fn test_sqlite_requires_marker() {
        let result = validate_profile_path(&fs(), "/profiles/mork", ParserType::Sqlite);
        assert_eq!(
            result.reason,
            Some(InvalidReason::WrongLayout {
                marker: SQLITE_MARKER
            })
        );
        assert_eq!(
            result.reason.unwrap().to_string(),
            "wrong layout: missing global-messages-db.sqlite"
        );
    }

    #[test]
    fn test_sqlite_valid() {
        let result = validate_profile_path(&fs(), "/profiles/sqlite", ParserType::Sqlite);
        assert!(result.is_valid());
        assert_eq!(
            result.features(),
            FeatureAvailability {
                account_refresh: true,
                repair: true
            }
        );
    }

    #[test]
    fn test_mork_accepts_any_directory() {
        let result = validate_profile_path(&fs(), "/profiles/mork", ParserType::Mork);
        assert!(result.is_valid());
        assert_eq!(result.features(), FeatureAvailability::default());
    }

    #[test]
    fn test_invalid_path_disables_features() {
        let result = validate_profile_path(&fs(), "/nowhere", ParserType::Sqlite);
        assert_eq!(result.features(), FeatureAvailability::default());
    }

    #[test]
    fn test_into_result() {
        let ok = validate_profile_path(&fs(), "/profiles/sqlite", ParserType::Sqlite);
        assert_eq!(ok.into_result().unwrap(), PathBuf::from("/profiles/sqlite"));

        let bad = validate_profile_path(&fs(), "/nowhere", ParserType::Sqlite);
        assert!(matches!(
            bad.into_result(),
            Err(Error::InvalidProfilePath(InvalidReason::NotFound))
        ));
    }

    #[test]
    fn test_windows_placeholder() {
        let fs = fs().with_file("/home/tester/roaming/Thunderbird/Profiles/global-messages-db.sqlite");
        let result = validate_profile_path(&fs, "%AppData%/Thunderbird/Profiles", ParserType::Sqlite);
        assert!(result.is_valid());
    }

    #[test]
    fn test_keeps_typed_path() {
        let result = validate_profile_path(&fs(), "~/x", ParserType::Mork);
        assert_eq!(result.path, "~/x");
        assert_eq!(result.parser, ParserType::Mork);
    }

    #[test]
    fn test_default_profile_path_has_placeholder() {
        let path = default_profile_path();
        assert!(path.starts_with('~') || path.starts_with('%'));
        assert!(path.contains("Thunderbird"));
    }

    proptest! {
        #[test]
        fn validation_is_deterministic(
            path in "(~|/profiles|%AppData%|\\$HOME)?(/[a-z]{1,6}){0,3}",
            mork in any::<bool>(),
        ) {
            let fs = fs();
            let parser = if mork { ParserType::Mork } else { ParserType::Sqlite };
            let first = validate_profile_path(&fs, &path, parser);
            let second = validate_profile_path(&fs, &path, parser);
            prop_assert_eq!(first, second);
        }
    }
}
