//! Backend abstraction shared by all resampler implementations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ResamplerError;

/// Streaming I/Q sample rate converter.
///
/// Input and output blocks are interleaved `[I0, Q0, I1, Q1, ...]`.
/// Implementations keep whatever state they need between calls so that
/// consecutive blocks of one stream are resampled continuously.
///
/// # Contract
///
/// - A block with an odd number of values fails with
///   [`ResamplerError::InvalidInput`] and leaves the state untouched.
/// - An empty block yields an empty output and leaves the state untouched.
/// - [`reset`](IqResampler::reset) returns the instance to its freshly
///   constructed condition; identical inputs after a reset give identical
///   outputs.
/// - [`flush`](IqResampler::flush) ends the stream and returns whatever the
///   backend still holds. Call `reset` before feeding a new stream.
///
/// An instance belongs to a single stream. The rate ratio is fixed for its
/// lifetime.
pub trait IqResampler {
    /// Resamples one block and advances the stream state.
    fn process(&mut self, block: &[f32]) -> Result<Vec<f32>, ResamplerError>;

    /// Drops all carried-over stream state.
    fn reset(&mut self);

    /// Drains buffered input and filter delay at end of stream.
    fn flush(&mut self) -> Result<Vec<f32>, ResamplerError>;

    /// Input sample rate in Hz.
    fn input_rate(&self) -> u32;

    /// Output sample rate in Hz.
    fn output_rate(&self) -> u32;
}

impl<T: IqResampler + ?Sized> IqResampler for Box<T> {
    fn process(&mut self, block: &[f32]) -> Result<Vec<f32>, ResamplerError> {
        (**self).process(block)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn flush(&mut self) -> Result<Vec<f32>, ResamplerError> {
        (**self).flush()
    }

    fn input_rate(&self) -> u32 {
        (**self).input_rate()
    }

    fn output_rate(&self) -> u32 {
        (**self).output_rate()
    }
}

/// Selects the resampler implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// [`StreamingResampler`](crate::StreamingResampler): history-based
    /// rational resampler.
    #[default]
    Streaming,
    /// [`SincResampler`](crate::SincResampler): rubato windowed-sinc
    /// polyphase resampler.
    Sinc,
    /// libsoxr resampler. Requires the `soxr` feature.
    Soxr,
}

impl Backend {
    /// Returns the config name of the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Streaming => "streaming",
            Backend::Sinc => "sinc",
            Backend::Soxr => "soxr",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = ResamplerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "streaming" => Ok(Backend::Streaming),
            "sinc" | "rubato" => Ok(Backend::Sinc),
            "soxr" => Ok(Backend::Soxr),
            other => Err(ResamplerError::Config(format!("unknown backend: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("streaming".parse::<Backend>().unwrap(), Backend::Streaming);
        assert_eq!("SINC".parse::<Backend>().unwrap(), Backend::Sinc);
        assert_eq!("rubato".parse::<Backend>().unwrap(), Backend::Sinc);
        assert_eq!("soxr".parse::<Backend>().unwrap(), Backend::Soxr);
        assert!(matches!("ipp".parse::<Backend>(), Err(ResamplerError::Config(_))));
    }

    #[test]
    fn test_backend_display_round_trip() {
        for b in [Backend::Streaming, Backend::Sinc, Backend::Soxr] {
            assert_eq!(b.to_string().parse::<Backend>().unwrap(), b);
        }
        assert_eq!(Backend::default(), Backend::Streaming);
    }
}
