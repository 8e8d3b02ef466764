//! Background tasks module
//!
//! This module contains the timers and listeners that run alongside the
//! presentation state: cancellable status reverts and event listeners.

pub mod listener;
pub mod transient_status;

// Re-export main types
pub use listener::ListenerHandle;
pub use transient_status::TransientStatus;
