//! Renderer interface trait
//!
//! This module defines the plotting interface of the framebuffer driver.

use super::adc::Sample;
use crate::platform::Result;

/// Framebuffer colors used by the scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    /// Background
    Black,
    /// Trace
    White,
}

/// Plot renderer
///
/// Both operations are fire-and-forget and must not block for longer than the
/// calling task's period.
pub trait Renderer {
    /// Plot a time-domain trace
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Display` if the frame could not be drawn.
    fn plot(&mut self, samples: &[Sample], background: Color, foreground: Color) -> Result<()>;

    /// Plot a magnitude spectrum
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Display` if the frame could not be drawn.
    fn plot_spectrum(
        &mut self,
        magnitudes: &[f32],
        background: Color,
        foreground: Color,
    ) -> Result<()>;
}
