//! Spectral view of the sample ring
//!
//! The analyzer hands a chronological copy of the ring to a
//! [`SpectralTransform`] and stores the result in a [`FrequencyDomain`] that
//! the PDS renderer plots.

use microfft::real::rfft_64;

use crate::platform::Sample;

/// Time-domain to frequency-domain transform
///
/// `out` receives `time_domain.len() / 2` magnitudes; implementations must not
/// have side effects beyond writing `out`.
pub trait SpectralTransform {
    /// Transform `time_domain` into `out`
    fn transform(&mut self, time_domain: &[Sample], out: &mut [f32]);
}

/// Power density of a 64-sample window
///
/// Writes `|X_k|^2 / 64` for `k in 0..32`. Inputs shorter than 64 samples are
/// zero-padded, longer ones truncated.
#[derive(Debug, Default, Clone, Copy)]
pub struct PowerDensity64;

impl PowerDensity64 {
    /// Window length
    pub const LENGTH: usize = 64;
}

impl SpectralTransform for PowerDensity64 {
    fn transform(&mut self, time_domain: &[Sample], out: &mut [f32]) {
        let mut window = [0.0f32; Self::LENGTH];
        for (slot, sample) in window.iter_mut().zip(time_domain) {
            *slot = f32::from(*sample);
        }

        let spectrum = rfft_64(&mut window);
        // microfft packs the Nyquist bin into the imaginary part of DC
        spectrum[0].im = 0.0;

        let scale = 1.0 / Self::LENGTH as f32;
        for (bin, value) in out.iter_mut().zip(spectrum.iter()) {
            *bin = value.norm_sqr() * scale;
        }
    }
}

/// Latest spectrum produced by the analyzer
#[derive(Debug, Clone)]
pub struct FrequencyDomain<const M: usize> {
    bins: [f32; M],
    updates: u32,
}

impl<const M: usize> Default for FrequencyDomain<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const M: usize> FrequencyDomain<M> {
    /// All-zero spectrum
    pub const fn new() -> Self {
        Self {
            bins: [0.0; M],
            updates: 0,
        }
    }

    /// Overwrite the whole spectrum from `time_domain`
    pub fn update<T: SpectralTransform + ?Sized>(
        &mut self,
        transform: &mut T,
        time_domain: &[Sample],
    ) {
        transform.transform(time_domain, &mut self.bins);
        self.updates = self.updates.wrapping_add(1);
    }

    /// Spectrum bins
    pub fn bins(&self) -> &[f32; M] {
        &self.bins
    }

    /// Number of analyzer updates so far
    pub fn updates(&self) -> u32 {
        self.updates
    }
}
