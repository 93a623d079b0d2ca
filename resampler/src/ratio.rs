//! Rate ratio reduction.

use std::fmt;

use crate::ResamplerError;

/// Greatest common divisor (Euclid).
pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Reduces `output_rate / input_rate` to lowest terms.
///
/// Returns `(up, down)` where `up = output_rate / g` and
/// `down = input_rate / g` for `g = gcd(input_rate, output_rate)`.
pub fn reduce(input_rate: u32, output_rate: u32) -> Result<(u32, u32), ResamplerError> {
    if input_rate == 0 || output_rate == 0 {
        return Err(ResamplerError::InvalidRate { input_rate, output_rate });
    }
    let g = gcd(input_rate, output_rate);
    Ok((output_rate / g, input_rate / g))
}

/// Input/output sample rates together with their reduced up/down factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRatio {
    input_rate: u32,
    output_rate: u32,
    up: u32,
    down: u32,
}

impl RateRatio {
    /// Creates a ratio for converting `input_rate` Hz to `output_rate` Hz.
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self, ResamplerError> {
        let (up, down) = reduce(input_rate, output_rate)?;
        Ok(Self { input_rate, output_rate, up, down })
    }

    /// Input sample rate in Hz.
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Output sample rate in Hz.
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Interpolation factor (reduced output rate).
    pub fn up(&self) -> u32 {
        self.up
    }

    /// Decimation factor (reduced input rate).
    pub fn down(&self) -> u32 {
        self.down
    }

    /// Normalized low-pass cutoff for the anti-aliasing filter, in cycles
    /// per sample of the `up`-fold upsampled stream.
    pub fn cutoff(&self) -> f64 {
        0.5 / self.up.max(self.down) as f64
    }

    /// Nominal output length for `input_frames` input frames:
    /// `floor(input_frames * output_rate / input_rate)`.
    pub fn output_len(&self, input_frames: usize) -> usize {
        (input_frames as u64 * self.up as u64 / self.down as u64) as usize
    }
}

impl fmt::Display for RateRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.up, self.down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(120000, 100000), 20000);
        assert_eq!(gcd(48000, 44100), 300);
        assert_eq!(gcd(7, 13), 1);
        assert_eq!(gcd(5, 0), 5);
    }

    #[test]
    fn test_reduce_common_rates() {
        assert_eq!(reduce(120000, 100000).unwrap(), (5, 6));
        assert_eq!(reduce(48000, 44100).unwrap(), (147, 160));
        assert_eq!(reduce(100000, 50000).unwrap(), (1, 2));
        assert_eq!(reduce(50000, 100000).unwrap(), (2, 1));
        assert_eq!(reduce(16000, 16000).unwrap(), (1, 1));
    }

    #[test]
    fn test_reduce_coprime_and_exact() {
        let rates = [1u32, 3, 8000, 11025, 16000, 22050, 44100, 48000, 96000, 120000, 2_400_000];
        for &input in &rates {
            for &output in &rates {
                let (up, down) = reduce(input, output).unwrap();
                assert_eq!(gcd(up, down), 1, "{input} -> {output}");
                // up/down == output/input, cross-multiplied
                assert_eq!(up as u64 * input as u64, down as u64 * output as u64);
            }
        }
    }

    #[test]
    fn test_reduce_zero_rate() {
        assert!(matches!(
            reduce(0, 48000),
            Err(ResamplerError::InvalidRate { input_rate: 0, output_rate: 48000 })
        ));
        assert!(reduce(48000, 0).is_err());
    }

    #[test]
    fn test_ratio_accessors() {
        let r = RateRatio::new(120000, 100000).unwrap();
        assert_eq!(r.input_rate(), 120000);
        assert_eq!(r.output_rate(), 100000);
        assert_eq!(r.up(), 5);
        assert_eq!(r.down(), 6);
        assert!((r.cutoff() - 0.5 / 6.0).abs() < 1e-12);
        assert_eq!(r.to_string(), "5/6");
    }

    #[test]
    fn test_output_len() {
        let r = RateRatio::new(120000, 100000).unwrap();
        assert_eq!(r.output_len(12000), 10000);
        assert_eq!(r.output_len(1000), 833);
        assert_eq!(r.output_len(0), 0);

        // 10 minutes at 2.4 MHz does not overflow
        let r = RateRatio::new(2_400_000, 2_048_000).unwrap();
        assert_eq!(r.output_len(1_440_000_000), 1_228_800_000);
    }
}
