//! SoX Resampler backend.

use std::os::raw::c_void;
use std::ptr;

use tracing::{debug, warn};

use crate::backend::IqResampler;
use crate::ffi::{self, Soxr, DATATYPE_F32_INTERLEAVED, RECIPE_HQ};
use crate::iq;
use crate::ratio::RateRatio;
use crate::ResamplerError;

/// Extra output frames reserved per call on top of the nominal length.
const OUTPUT_SLACK: usize = 64;

/// Output frames requested per drain call in `flush`.
const FLUSH_FRAMES: usize = 4096;

/// libsoxr wrapper resampling interleaved float32 I/Q as two channels.
///
/// soxr keeps its own delay line and phase, so blocks of any size can be
/// fed. The handle is released on drop.
pub struct SoxrResampler {
    ratio: RateRatio,
    handle: *mut Soxr,
    out_buf: Vec<f32>,
}

// Safety: the handle is owned exclusively and only touched through &mut self.
unsafe impl Send for SoxrResampler {}

impl Drop for SoxrResampler {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ffi::soxr_delete(self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}

impl SoxrResampler {
    /// Creates a high-quality soxr resampler whose passband ends at
    /// `rolloff` times the lower Nyquist frequency.
    pub fn new(input_rate: u32, output_rate: u32, rolloff: f32) -> Result<Self, ResamplerError> {
        let ratio = RateRatio::new(input_rate, output_rate)?;
        if !(rolloff > 0.0 && rolloff < 1.0) {
            return Err(ResamplerError::InvalidRolloff(rolloff));
        }

        let handle = unsafe {
            let io_spec = ffi::soxr_io_spec(DATATYPE_F32_INTERLEAVED, DATATYPE_F32_INTERLEAVED);
            let mut quality_spec = ffi::soxr_quality_spec(RECIPE_HQ, 0);
            quality_spec.passband_end = rolloff as f64;

            let mut error: ffi::ErrorPtr = ptr::null();
            let handle = ffi::soxr_create(
                input_rate as f64,
                output_rate as f64,
                2,
                &mut error,
                &io_spec,
                &quality_spec,
                ptr::null(),
            );

            if handle.is_null() {
                let msg = ffi::check(error)
                    .err()
                    .unwrap_or_else(|| "soxr_create returned null".to_string());
                return Err(ResamplerError::Construction(msg));
            }
            handle
        };

        debug!(
            "soxr resampler {} Hz -> {} Hz, rolloff {}",
            input_rate, output_rate, rolloff
        );

        Ok(Self { ratio, handle, out_buf: Vec::new() })
    }

    /// Returns the reduced rate ratio.
    pub fn ratio(&self) -> &RateRatio {
        &self.ratio
    }

    /// Resamples one interleaved I/Q block.
    pub fn process(&mut self, block: &[f32]) -> Result<Vec<f32>, ResamplerError> {
        let frames = iq::pair_count(block)?;
        if frames == 0 {
            return Ok(Vec::new());
        }

        let capacity = self.ratio.output_len(frames) + OUTPUT_SLACK;
        self.out_buf.resize(capacity * 2, 0.0);

        let mut out = Vec::with_capacity(capacity * 2);
        let mut consumed = 0;
        while consumed < frames {
            let mut input_done = 0usize;
            let mut output_done = 0usize;
            let err = unsafe {
                ffi::soxr_process(
                    self.handle,
                    block[consumed * 2..].as_ptr() as *const c_void,
                    frames - consumed,
                    &mut input_done,
                    self.out_buf.as_mut_ptr() as *mut c_void,
                    capacity,
                    &mut output_done,
                )
            };
            ffi::check(err).map_err(ResamplerError::Backend)?;

            out.extend_from_slice(&self.out_buf[..output_done * 2]);
            consumed += input_done;

            if input_done == 0 && output_done == 0 {
                warn!("soxr stalled with {} of {} frames consumed", consumed, frames);
                break;
            }
        }

        Ok(out)
    }

    /// Signals end of input and drains soxr's delay line.
    pub fn flush(&mut self) -> Result<Vec<f32>, ResamplerError> {
        self.out_buf.resize(FLUSH_FRAMES * 2, 0.0);

        let mut out = Vec::new();
        loop {
            let mut input_done = 0usize;
            let mut output_done = 0usize;
            // A null input tells soxr no more samples will follow.
            let err = unsafe {
                ffi::soxr_process(
                    self.handle,
                    ptr::null(),
                    0,
                    &mut input_done,
                    self.out_buf.as_mut_ptr() as *mut c_void,
                    FLUSH_FRAMES,
                    &mut output_done,
                )
            };
            ffi::check(err).map_err(ResamplerError::Backend)?;

            if output_done == 0 {
                break;
            }
            out.extend_from_slice(&self.out_buf[..output_done * 2]);
        }

        debug!("soxr resampler {} flushed {} frames", self.ratio, out.len() / 2);
        Ok(out)
    }

    /// Clears soxr's delay line and phase.
    pub fn reset(&mut self) {
        let err = unsafe { ffi::soxr_clear(self.handle) };
        if let Err(msg) = ffi::check(err) {
            warn!("soxr clear failed: {}", msg);
        }
        debug!("soxr resampler {} reset", self.ratio);
    }
}

impl IqResampler for SoxrResampler {
    fn process(&mut self, block: &[f32]) -> Result<Vec<f32>, ResamplerError> {
        SoxrResampler::process(self, block)
    }

    fn reset(&mut self) {
        SoxrResampler::reset(self)
    }

    fn flush(&mut self) -> Result<Vec<f32>, ResamplerError> {
        SoxrResampler::flush(self)
    }

    fn input_rate(&self) -> u32 {
        self.ratio.input_rate()
    }

    fn output_rate(&self) -> u32 {
        self.ratio.output_rate()
    }
}
