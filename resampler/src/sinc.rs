//! Rubato-based resampler backend.
//!
//! Windowed-sinc polyphase resampling using the rubato library, a pure
//! Rust implementation without any FFI dependencies.

use rubato::{
    Resampler as RubatoResampler, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};
use tracing::debug;

use crate::backend::IqResampler;
use crate::iq;
use crate::ratio::RateRatio;
use crate::ResamplerError;

/// Default number of frames handed to rubato per internal call.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default passband edge relative to the lower Nyquist frequency.
pub const DEFAULT_ROLLOFF: f32 = 0.9;

/// Two-channel windowed-sinc resampler backed by rubato.
///
/// rubato consumes fixed-size chunks, so incoming frames are queued per
/// channel and resampled whenever a full chunk is available. Frames left
/// over stay queued for the next call and are drained by
/// [`flush`](SincResampler::flush). The first
/// [`output_delay`](SincResampler::output_delay) frames rubato produces are
/// dropped, so output sample 0 lines up with input sample 0.
pub struct SincResampler {
    ratio: RateRatio,
    resampler: SincFixedIn<f32>,
    /// Queued input frames not yet handed to rubato.
    pending_i: Vec<f32>,
    pending_q: Vec<f32>,
    /// Leading delay frames still to drop.
    skip: usize,
    frames_in: u64,
    frames_out: u64,
}

impl SincResampler {
    /// Creates a resampler with a `tap_count`-long sinc and a passband edge
    /// at `rolloff` times the lower Nyquist frequency.
    pub fn new(
        input_rate: u32,
        output_rate: u32,
        tap_count: usize,
        rolloff: f32,
        chunk_size: usize,
    ) -> Result<Self, ResamplerError> {
        let ratio = RateRatio::new(input_rate, output_rate)?;
        if tap_count < 3 {
            return Err(ResamplerError::InvalidTapCount(tap_count));
        }
        if !(rolloff > 0.0 && rolloff < 1.0) {
            return Err(ResamplerError::InvalidRolloff(rolloff));
        }
        if chunk_size == 0 {
            return Err(ResamplerError::InvalidChunkSize(chunk_size));
        }

        let params = SincInterpolationParameters {
            sinc_len: tap_count,
            f_cutoff: rolloff,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };
        let resampler = SincFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            1.0,
            params,
            chunk_size,
            2,
        )?;
        let skip = resampler.output_delay();

        debug!(
            "sinc resampler {} Hz -> {} Hz, {} taps, rolloff {}, chunk {}, delay {}",
            input_rate, output_rate, tap_count, rolloff, chunk_size, skip
        );

        Ok(Self {
            ratio,
            resampler,
            pending_i: Vec::with_capacity(chunk_size * 2),
            pending_q: Vec::with_capacity(chunk_size * 2),
            skip,
            frames_in: 0,
            frames_out: 0,
        })
    }

    /// Returns the reduced rate ratio.
    pub fn ratio(&self) -> &RateRatio {
        &self.ratio
    }

    /// Number of input frames queued for the next chunk.
    pub fn pending_frames(&self) -> usize {
        self.pending_i.len()
    }

    /// Filter delay in output frames.
    pub fn output_delay(&self) -> usize {
        self.resampler.output_delay()
    }

    /// Resamples one interleaved I/Q block.
    pub fn process(&mut self, block: &[f32]) -> Result<Vec<f32>, ResamplerError> {
        let frames = iq::pair_count(block)?;
        if frames == 0 {
            return Ok(Vec::new());
        }

        iq::split_into(block, &mut self.pending_i, &mut self.pending_q);
        self.frames_in += frames as u64;

        let mut out = Vec::with_capacity(self.ratio.output_len(self.pending_i.len()) * 2);
        loop {
            let need = self.resampler.input_frames_next();
            if self.pending_i.len() < need {
                break;
            }

            let wave: [&[f32]; 2] = [&self.pending_i[..need], &self.pending_q[..need]];
            let chunk = self.resampler.process(&wave[..], None)?;
            self.pending_i.drain(..need);
            self.pending_q.drain(..need);
            self.emit(&chunk, &mut out);
        }

        Ok(out)
    }

    /// Resamples the queued frames and drains rubato's delay line.
    ///
    /// The total output since the last reset is then exactly
    /// `floor(frames_in * output_rate / input_rate)` frames.
    pub fn flush(&mut self) -> Result<Vec<f32>, ResamplerError> {
        let target = self.ratio.output_len(self.frames_in as usize) as u64;
        let mut out = Vec::new();

        if !self.pending_i.is_empty() {
            let wave: [&[f32]; 2] = [&self.pending_i, &self.pending_q];
            let chunk = self.resampler.process_partial(Some(&wave[..]), None)?;
            self.pending_i.clear();
            self.pending_q.clear();
            self.emit(&chunk, &mut out);
        }

        while self.frames_out < target {
            let chunk = self.resampler.process_partial(None::<&[&[f32]]>, None)?;
            if chunk[0].is_empty() {
                break;
            }
            self.emit(&chunk, &mut out);
        }

        // Zero padding past the end of the input.
        let excess = (self.frames_out.saturating_sub(target) as usize).min(out.len() / 2);
        out.truncate(out.len() - excess * 2);
        self.frames_out -= excess as u64;

        debug!(
            "sinc resampler {} flushed {} frames, {} in, {} out",
            self.ratio,
            out.len() / 2,
            self.frames_in,
            self.frames_out
        );
        Ok(out)
    }

    /// Clears rubato's delay line and the input queue.
    pub fn reset(&mut self) {
        self.resampler.reset();
        self.pending_i.clear();
        self.pending_q.clear();
        self.skip = self.resampler.output_delay();
        self.frames_in = 0;
        self.frames_out = 0;
        debug!("sinc resampler {} reset", self.ratio);
    }

    /// Appends one rubato output chunk, dropping the leading delay.
    fn emit(&mut self, chunk: &[Vec<f32>], out: &mut Vec<f32>) {
        let frames = chunk[0].len().min(chunk[1].len());
        let skip = self.skip.min(frames);
        self.skip -= skip;
        out.extend(iq::interleave(&chunk[0][skip..], &chunk[1][skip..], frames - skip));
        self.frames_out += (frames - skip) as u64;
    }
}

impl IqResampler for SincResampler {
    fn process(&mut self, block: &[f32]) -> Result<Vec<f32>, ResamplerError> {
        SincResampler::process(self, block)
    }

    fn reset(&mut self) {
        SincResampler::reset(self)
    }

    fn flush(&mut self) -> Result<Vec<f32>, ResamplerError> {
        SincResampler::flush(self)
    }

    fn input_rate(&self) -> u32 {
        self.ratio.input_rate()
    }

    fn output_rate(&self) -> u32 {
        self.ratio.output_rate()
    }
}
