//! Thunderbird profile directory validation.
//!
//! Validation is synchronous and side-effect free. It runs again whenever
//! the typed path or the selected parser changes, and its result decides
//! which settings actions are enabled. It never starts a job.

mod expand;
mod fs;
mod parser;
mod validator;

pub use fs::{FileSystem, MemoryFileSystem, SystemFileSystem};
pub use parser::{ParserType, SQLITE_MARKER};
pub use validator::{
    FeatureAvailability, InvalidReason, ProfileValidationResult, default_profile_path,
    validate_profile_path,
};
