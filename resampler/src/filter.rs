//! Windowed-sinc low-pass filter design.

use std::f64::consts::PI;
use std::ops::Deref;

use crate::ResamplerError;

/// Default number of filter taps.
pub const DEFAULT_TAP_COUNT: usize = 127;

/// Low-pass FIR taps with unity DC gain.
///
/// Built once by [`design`] and never modified afterwards. Dereferences to
/// the tap slice.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoefficients {
    taps: Vec<f64>,
    cutoff: f64,
}

impl FilterCoefficients {
    /// Index of the zero-offset tap (`len / 2`).
    pub fn center(&self) -> usize {
        self.taps.len() / 2
    }

    /// Normalized cutoff the filter was designed for.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Sum of all taps (1.0 up to rounding).
    pub fn sum(&self) -> f64 {
        self.taps.iter().sum()
    }
}

impl Deref for FilterCoefficients {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.taps
    }
}

/// Designs a Hamming-windowed sinc low-pass filter.
///
/// `cutoff` is normalized to the sample rate the filter runs at (0.5 is
/// Nyquist). Tap `i` sits at offset `t = i - tap_count / 2`; the ideal
/// response is `2 * cutoff` at `t == 0` and `sin(2π·cutoff·t) / (π·t)`
/// elsewhere. The windowed response is scaled to sum to 1.
pub fn design(tap_count: usize, cutoff: f64) -> Result<FilterCoefficients, ResamplerError> {
    if tap_count < 3 {
        return Err(ResamplerError::InvalidTapCount(tap_count));
    }
    if !(cutoff > 0.0 && cutoff <= 0.5) {
        return Err(ResamplerError::InvalidCutoff(cutoff));
    }

    let center = (tap_count / 2) as f64;
    let window = hamming_window(tap_count);
    let mut taps: Vec<f64> = window
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let t = i as f64 - center;
            let h = if t == 0.0 {
                2.0 * cutoff
            } else {
                (2.0 * PI * cutoff * t).sin() / (PI * t)
            };
            h * w
        })
        .collect();

    // Unity DC gain.
    let sum: f64 = taps.iter().sum();
    for h in &mut taps {
        *h /= sum;
    }

    Ok(FilterCoefficients { taps, cutoff })
}

fn hamming_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}
