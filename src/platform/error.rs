//! Platform error types
//!
//! This module defines error types for collaborator operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All collaborator implementations map their driver-specific errors to these
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// Framebuffer/plot operation failed
    Display(DisplayError),
}

/// Display-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Framebuffer not initialized
    NotInitialized,
    /// Plot data does not fit the drawing area
    OutOfBounds,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Display(e) => write!(f, "Display error: {:?}", e),
        }
    }
}
