//! Core infrastructure
//!
//! This module contains the platform-independent building blocks of the
//! scope: the cyclic task scheduler, event flags, logging and shared state.

pub mod flags;
pub mod logging;
pub mod scheduler;
pub mod traits;
