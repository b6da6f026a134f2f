//! Mock platform implementation for testing
//!
//! This module provides mock implementations of the collaborator traits that
//! can be used for testing without actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled

#![cfg(any(test, feature = "mock"))]

mod adc;
mod display;
mod serial;

pub use adc::MockAdc;
pub use display::{Frame, MockRenderer};
pub use serial::MockSerial;
