//! Mock renderer for testing

use crate::platform::error::DisplayError;
use crate::platform::traits::{Color, Renderer, Sample};
use crate::platform::{PlatformError, Result};
use std::vec::Vec;

/// A frame captured by [`MockRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Time-domain trace
    Trace(Vec<Sample>),
    /// Magnitude spectrum
    Spectrum(Vec<f32>),
}

/// Mock renderer
///
/// Records every plotted frame so tests can verify what was drawn.
#[derive(Debug, Default)]
pub struct MockRenderer {
    frames: Vec<Frame>,
    fail: bool,
}

impl MockRenderer {
    /// Create a renderer with no frames
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent plots fail with `DisplayError::NotInitialized`
    pub fn set_failing(&mut self, fail: bool) {
        self.fail = fail;
    }

    /// All frames drawn so far
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of time-domain traces drawn
    pub fn trace_count(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| matches!(f, Frame::Trace(_)))
            .count()
    }

    /// Number of spectra drawn
    pub fn spectrum_count(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| matches!(f, Frame::Spectrum(_)))
            .count()
    }

    /// Forget recorded frames
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(PlatformError::Display(DisplayError::NotInitialized))
        } else {
            Ok(())
        }
    }
}

impl Renderer for MockRenderer {
    fn plot(&mut self, samples: &[Sample], _background: Color, _foreground: Color) -> Result<()> {
        self.check()?;
        self.frames.push(Frame::Trace(samples.iter().copied().collect()));
        Ok(())
    }

    fn plot_spectrum(
        &mut self,
        magnitudes: &[f32],
        _background: Color,
        _foreground: Color,
    ) -> Result<()> {
        self.check()?;
        self.frames.push(Frame::Spectrum(magnitudes.iter().copied().collect()));
        Ok(())
    }
}
