//! Core traits for platform-agnostic scope functionality.
//!
//! State shared between interrupt context and task context goes through
//! [`SharedState`], so the same code runs against a critical-section mutex on
//! the target and a plain `RefCell` in host tests.

pub mod sync;

pub use sync::{CriticalState, MockState, SharedState};
