//! Media session lifecycle
//!
//! This module provides the `SessionManager` that:
//! - Joins the transport once per room credential
//! - Leaves it exactly once, whatever triggers teardown
//! - Pushes state, participant and device changes to observers
//!
//! and the `DeviceControl` that mutes and unmutes local media.

mod devices;
mod manager;
mod state;

pub use devices::DeviceControl;
pub use manager::SessionManager;
pub use state::{DeviceState, LifecycleGuards, SessionSnapshot, SessionState};
