//! Settings screen coordination.
//!
//! Decoupled from any GUI toolkit: the controller keeps the state a
//! renderer needs and turns user actions into jobs and validations.

mod controller;
mod state;

pub use controller::SettingsController;
pub use state::{AcceptedSettings, AccountListState, RepairState, SettingsTab};
