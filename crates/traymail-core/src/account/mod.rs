//! Account model and the storage backend seam.
//!
//! The backend itself lives outside this crate; the core only depends on
//! the [`AccountBackend`] operations and their errors.

mod backend;
mod model;

pub use backend::{AccountBackend, RepairSummary};
pub use model::{Account, AccountId, AccountSnapshot};
