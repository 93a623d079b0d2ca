//! Resampler configuration.

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, IqResampler};
use crate::filter::DEFAULT_TAP_COUNT;
use crate::sinc::{SincResampler, DEFAULT_CHUNK_SIZE, DEFAULT_ROLLOFF};
use crate::streaming::{Interpolation, StreamingResampler};
use crate::ResamplerError;

/// Describes a resampler: rates, backend and backend tuning.
///
/// Deserializes from YAML (or any serde format); every field except the
/// two rates has a default.
///
/// ```
/// use iqrate_resampler::{Backend, Config, IqResampler};
///
/// let cfg = Config::from_yaml("input_rate: 120000\noutput_rate: 100000\n").unwrap();
/// assert_eq!(cfg.tap_count, 127);
/// assert_eq!(cfg.backend, Backend::Streaming);
///
/// let mut resampler = cfg.build().unwrap();
/// let out = resampler.process(&[0.0; 2400]).unwrap();
/// assert_eq!(out.len() % 2, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Input sample rate in Hz.
    pub input_rate: u32,
    /// Output sample rate in Hz.
    pub output_rate: u32,
    /// Filter length (default: 127).
    #[serde(default = "default_tap_count")]
    pub tap_count: usize,
    /// Implementation to build (default: streaming).
    #[serde(default)]
    pub backend: Backend,
    /// Interpolation mode of the streaming backend (default: linear).
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Passband edge for the sinc and soxr backends, relative to the lower
    /// Nyquist frequency (default: 0.9).
    #[serde(default = "default_rolloff")]
    pub rolloff: f32,
    /// Frames per internal call of the sinc backend (default: 1024).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_tap_count() -> usize {
    DEFAULT_TAP_COUNT
}

fn default_rolloff() -> f32 {
    DEFAULT_ROLLOFF
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Config {
    /// Creates a config for the given rates with all other fields defaulted.
    pub fn new(input_rate: u32, output_rate: u32) -> Self {
        Self {
            input_rate,
            output_rate,
            tap_count: DEFAULT_TAP_COUNT,
            backend: Backend::default(),
            interpolation: Interpolation::default(),
            rolloff: DEFAULT_ROLLOFF,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Parses a YAML document.
    pub fn from_yaml(s: &str) -> Result<Self, ResamplerError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Checks the fields shared by every backend.
    pub fn validate(&self) -> Result<(), ResamplerError> {
        if self.input_rate == 0 || self.output_rate == 0 {
            return Err(ResamplerError::InvalidRate {
                input_rate: self.input_rate,
                output_rate: self.output_rate,
            });
        }
        if self.tap_count < 3 {
            return Err(ResamplerError::InvalidTapCount(self.tap_count));
        }
        if !(self.rolloff > 0.0 && self.rolloff < 1.0) {
            return Err(ResamplerError::InvalidRolloff(self.rolloff));
        }
        if self.chunk_size == 0 {
            return Err(ResamplerError::InvalidChunkSize(self.chunk_size));
        }
        Ok(())
    }

    /// Builds the configured backend.
    pub fn build(&self) -> Result<Box<dyn IqResampler>, ResamplerError> {
        self.validate()?;
        match self.backend {
            Backend::Streaming => Ok(Box::new(StreamingResampler::with_interpolation(
                self.input_rate,
                self.output_rate,
                self.tap_count,
                self.interpolation,
            )?)),
            Backend::Sinc => Ok(Box::new(SincResampler::new(
                self.input_rate,
                self.output_rate,
                self.tap_count,
                self.rolloff,
                self.chunk_size,
            )?)),
            Backend::Soxr => self.build_soxr(),
        }
    }

    #[cfg(feature = "soxr")]
    fn build_soxr(&self) -> Result<Box<dyn IqResampler>, ResamplerError> {
        Ok(Box::new(crate::soxr::SoxrResampler::new(
            self.input_rate,
            self.output_rate,
            self.rolloff,
        )?))
    }

    #[cfg(not(feature = "soxr"))]
    fn build_soxr(&self) -> Result<Box<dyn IqResampler>, ResamplerError> {
        Err(ResamplerError::Construction(
            "soxr backend not compiled in (enable the `soxr` feature)".to_string(),
        ))
    }
}
