//! Platform abstraction layer
//!
//! The scope core talks to its collaborators (ADC, serial receiver, renderer)
//! only through the traits in this module. Drivers live outside this crate.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{Color, Renderer, Sample, SampleSource, SerialReceiver};
