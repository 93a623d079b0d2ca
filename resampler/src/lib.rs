//! Streaming sample rate conversion for interleaved I/Q data.
//!
//! This crate provides:
//!
//! - [`ratio`]: rate ratio reduction to coprime up/down factors
//! - [`filter`]: Hamming-windowed sinc anti-aliasing filter design
//! - [`StreamingResampler`]: history-based rational resampler with linear or
//!   polyphase interpolation
//! - [`SincResampler`]: rubato windowed-sinc backend
//! - `SoxrResampler`: libsoxr backend (feature `soxr`)
//! - [`Config`]: serde configuration that builds any backend behind the
//!   [`IqResampler`] trait
//!
//! # Example
//!
//! ```rust
//! use iqrate_resampler::StreamingResampler;
//!
//! // 120 kHz -> 100 kHz, 127 taps
//! let mut resampler = StreamingResampler::new(120000, 100000, 127).unwrap();
//!
//! // 100ms of a constant I/Q pair
//! let block: Vec<f32> = [1.0f32, 0.5].repeat(12000);
//! let out = resampler.process(&block).unwrap();
//! assert!(out.len() / 2 <= 10000);
//!
//! resampler.reset();
//! ```

mod backend;
pub mod config;
mod error;
#[cfg(feature = "soxr")]
mod ffi;
pub mod filter;
pub mod iq;
pub mod ratio;
mod sinc;
#[cfg(feature = "soxr")]
mod soxr;
mod streaming;

pub use backend::{Backend, IqResampler};
pub use config::Config;
pub use error::ResamplerError;
pub use filter::{design, FilterCoefficients, DEFAULT_TAP_COUNT};
pub use ratio::{reduce, RateRatio};
pub use sinc::{SincResampler, DEFAULT_CHUNK_SIZE, DEFAULT_ROLLOFF};
#[cfg(feature = "soxr")]
pub use soxr::SoxrResampler;
pub use streaming::{Interpolation, StreamState, StreamingResampler, MAX_PROTOTYPE_TAPS};
