//! Platform abstraction traits
//!
//! This module defines the traits that collaborator implementations must provide.

pub mod adc;
pub mod display;
pub mod serial;

// Re-export trait interfaces
pub use adc::{Sample, SampleSource};
pub use display::{Color, Renderer};
pub use serial::SerialReceiver;
