//! Analog input interface trait
//!
//! This module defines the sampling interface the ADC driver must provide.

/// A single quantized input reading
pub type Sample = u8;

/// Analog input polled once per sampler release
///
/// # Safety Invariants
///
/// - ADC peripheral must be initialized before use
/// - Only the sampler task reads from it
pub trait SampleSource {
    /// Read the current input value
    ///
    /// There is no error channel: the driver always returns a value.
    fn read_sample(&mut self) -> Sample;
}
