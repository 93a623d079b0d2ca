//! History-based streaming resampler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::backend::IqResampler;
use crate::filter::{self, FilterCoefficients};
use crate::iq;
use crate::ratio::RateRatio;
use crate::ResamplerError;

/// Largest polyphase prototype (`tap_count * up`) accepted at construction.
pub const MAX_PROTOTYPE_TAPS: usize = 1 << 22;

/// How output samples are evaluated between input samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Straight-line interpolation between the two nearest input samples.
    /// The designed filter is kept but not applied.
    #[default]
    Linear,
    /// Filter-weighted interpolation through a windowed-sinc prototype of
    /// `tap_count * up` taps running on the `up`-fold upsampled stream, so
    /// every output sees about `tap_count` input samples.
    Polyphase,
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolation::Linear => f.write_str("linear"),
            Interpolation::Polyphase => f.write_str("polyphase"),
        }
    }
}

impl FromStr for Interpolation {
    type Err = ResamplerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Interpolation::Linear),
            "polyphase" | "filtered" => Ok(Interpolation::Polyphase),
            other => Err(ResamplerError::Config(format!("unknown interpolation: {other}"))),
        }
    }
}

/// Lifecycle of a [`StreamingResampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Histories are all zero.
    Initialized,
    /// At least one non-empty block has been processed since the last reset.
    Streaming,
}

/// Rational-ratio I/Q resampler that carries the tail of each block into
/// the next call.
///
/// Every call prefixes each channel with its `tap_count`-sample history and
/// walks output positions at `input_rate / output_rate` input samples per
/// output sample, starting at the first new sample. Positions closer than
/// `tap_count / 2` samples to the end of the block are not emitted in that
/// call, so splitting a stream into many small blocks yields slightly fewer
/// samples than one large block.
pub struct StreamingResampler {
    ratio: RateRatio,
    filter: FilterCoefficients,
    interpolation: Interpolation,
    /// Upsampled-rate prototype; only built for polyphase mode.
    prototype: Option<FilterCoefficients>,
    history_i: Vec<f32>,
    history_q: Vec<f32>,
    /// Reused `history ++ block` buffers.
    ext_i: Vec<f32>,
    ext_q: Vec<f32>,
    state: StreamState,
}

impl StreamingResampler {
    /// Creates a linear-interpolating resampler.
    pub fn new(input_rate: u32, output_rate: u32, tap_count: usize) -> Result<Self, ResamplerError> {
        Self::with_interpolation(input_rate, output_rate, tap_count, Interpolation::Linear)
    }

    /// Creates a resampler with an explicit interpolation mode.
    pub fn with_interpolation(
        input_rate: u32,
        output_rate: u32,
        tap_count: usize,
        interpolation: Interpolation,
    ) -> Result<Self, ResamplerError> {
        let ratio = RateRatio::new(input_rate, output_rate)?;
        let filter = filter::design(tap_count, ratio.cutoff())?;
        let prototype = match interpolation {
            Interpolation::Linear => None,
            Interpolation::Polyphase => Some(design_prototype(&ratio, tap_count)?),
        };

        debug!(
            "streaming resampler {} Hz -> {} Hz, ratio {}, {} taps, cutoff {:.6}, {} interpolation",
            input_rate,
            output_rate,
            ratio,
            tap_count,
            filter.cutoff(),
            interpolation
        );

        Ok(Self {
            ratio,
            filter,
            interpolation,
            prototype,
            history_i: vec![0.0; tap_count],
            history_q: vec![0.0; tap_count],
            ext_i: Vec::new(),
            ext_q: Vec::new(),
            state: StreamState::Initialized,
        })
    }

    /// Returns the reduced rate ratio.
    pub fn ratio(&self) -> &RateRatio {
        &self.ratio
    }

    /// Returns the designed anti-aliasing filter.
    pub fn filter(&self) -> &FilterCoefficients {
        &self.filter
    }

    /// Returns the polyphase prototype, if this instance uses one.
    pub fn prototype(&self) -> Option<&FilterCoefficients> {
        self.prototype.as_ref()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Number of samples carried per channel between calls.
    pub fn history_len(&self) -> usize {
        self.history_i.len()
    }

    /// Returns the I and Q histories, oldest sample first.
    pub fn history(&self) -> (&[f32], &[f32]) {
        (&self.history_i, &self.history_q)
    }

    /// Upper bound on the number of I/Q pairs one call emits for
    /// `input_frames` input pairs.
    pub fn expected_output_len(&self, input_frames: usize) -> usize {
        self.ratio.output_len(input_frames)
    }

    /// Resamples one interleaved I/Q block.
    ///
    /// Fails with [`ResamplerError::InvalidInput`] for odd-length blocks
    /// without touching the history.
    pub fn process(&mut self, block: &[f32]) -> Result<Vec<f32>, ResamplerError> {
        let frames = iq::pair_count(block)?;
        if frames == 0 {
            return Ok(Vec::new());
        }

        let hist = self.history_i.len();
        self.ext_i.clear();
        self.ext_q.clear();
        self.ext_i.extend_from_slice(&self.history_i);
        self.ext_q.extend_from_slice(&self.history_q);
        iq::split_into(block, &mut self.ext_i, &mut self.ext_q);

        let up = self.ratio.up() as u64;
        let down = self.ratio.down() as u64;
        let center = self.filter.center();
        let nominal = self.ratio.output_len(frames);

        // pos < ext_len - center, with pos = hist + offset / up and
        // ext_len = hist + frames.
        let limit = (frames as i64 - center as i64) * up as i64;

        let mut out = Vec::with_capacity(nominal * 2);
        for k in 0..nominal as u64 {
            let offset = k * down;
            if offset as i64 >= limit {
                break;
            }
            let idx = hist + (offset / up) as usize;
            let (vi, vq) = match &self.prototype {
                None => {
                    let frac = (offset % up) as f32 / up as f32;
                    (
                        lerp(&self.ext_i, idx, frac),
                        lerp(&self.ext_q, idx, frac),
                    )
                }
                Some(prototype) => {
                    let phase_pos = hist as u64 * up + offset;
                    polyphase(&self.ext_i, &self.ext_q, prototype, up, phase_pos)
                        .unwrap_or((self.ext_i[idx], self.ext_q[idx]))
                }
            };
            out.push(vi);
            out.push(vq);
        }

        update_history(&mut self.history_i, &self.ext_i[hist..]);
        update_history(&mut self.history_q, &self.ext_q[hist..]);
        self.state = StreamState::Streaming;

        trace!(
            "resampled {} -> {} frames (nominal {})",
            frames,
            out.len() / 2,
            nominal
        );
        Ok(out)
    }

    /// Zeroes both histories.
    pub fn reset(&mut self) {
        self.history_i.fill(0.0);
        self.history_q.fill(0.0);
        self.state = StreamState::Initialized;
        debug!("streaming resampler {} reset", self.ratio);
    }
}

impl IqResampler for StreamingResampler {
    fn process(&mut self, block: &[f32]) -> Result<Vec<f32>, ResamplerError> {
        StreamingResampler::process(self, block)
    }

    fn reset(&mut self) {
        StreamingResampler::reset(self)
    }

    /// Positions held back by edge truncation are not recovered, so there is
    /// nothing to drain.
    fn flush(&mut self) -> Result<Vec<f32>, ResamplerError> {
        Ok(Vec::new())
    }

    fn input_rate(&self) -> u32 {
        self.ratio.input_rate()
    }

    fn output_rate(&self) -> u32 {
        self.ratio.output_rate()
    }
}

/// Designs the polyphase prototype: `tap_count` taps per phase at the
/// upsampled rate, cut off at the lower of the two Nyquist frequencies.
fn design_prototype(
    ratio: &RateRatio,
    tap_count: usize,
) -> Result<FilterCoefficients, ResamplerError> {
    let len = tap_count
        .checked_mul(ratio.up() as usize)
        .filter(|&len| len <= MAX_PROTOTYPE_TAPS)
        .ok_or_else(|| {
            ResamplerError::Construction(format!(
                "polyphase prototype for ratio {} with {} taps exceeds {} taps",
                ratio, tap_count, MAX_PROTOTYPE_TAPS
            ))
        })?;
    filter::design(len, ratio.cutoff())
}

fn lerp(x: &[f32], idx: usize, frac: f32) -> f32 {
    match x.get(idx + 1) {
        Some(&next) => x[idx] * (1.0 - frac) + next * frac,
        None => x[idx],
    }
}

/// Evaluates both channels at upsampled position `pos` (in units of
/// `1 / up` input samples). Input sample `e` sits at upsampled index
/// `e * up` and meets tap `center + e * up - pos`.
///
/// Returns `None` when no tap lines up with an input sample.
fn polyphase(
    xi: &[f32],
    xq: &[f32],
    filter: &FilterCoefficients,
    up: u64,
    pos: u64,
) -> Option<(f32, f32)> {
    let base = pos.checked_sub(filter.center() as u64)?;
    let first = base.div_ceil(up);
    let last = ((base + filter.len() as u64 - 1) / up).min(xi.len() as u64 - 1);

    let mut acc_i = 0.0f64;
    let mut acc_q = 0.0f64;
    let mut weight = 0.0f64;
    for e in first..=last {
        let h = filter[(e * up - base) as usize];
        acc_i += h * xi[e as usize] as f64;
        acc_q += h * xq[e as usize] as f64;
        weight += h;
    }

    // Normalize per phase so every phase has unity DC gain.
    if weight.abs() < 1e-12 {
        return None;
    }
    Some(((acc_i / weight) as f32, (acc_q / weight) as f32))
}

/// Shifts `fresh` into the tail of `history`.
fn update_history(history: &mut [f32], fresh: &[f32]) {
    let len = history.len();
    let n = fresh.len();
    if n >= len {
        history.copy_from_slice(&fresh[n - len..]);
    } else {
        history.copy_within(n.., 0);
        history[len - n..].copy_from_slice(fresh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const INPUT_RATE: u32 = 120000;
    const OUTPUT_RATE: u32 = 100000;

    fn tone(frames: usize, sample_rate: f32, freq: f32) -> Vec<f32> {
        let mut out = Vec::with_capacity(frames * 2);
        for n in 0..frames {
            let phase = 2.0 * PI * freq * n as f32 / sample_rate;
            out.push(phase.cos());
            out.push(phase.sin());
        }
        out
    }

    fn power(block: &[f32]) -> f32 {
        let sum: f32 = block.chunks_exact(2).map(|p| p[0] * p[0] + p[1] * p[1]).sum();
        sum / (block.len() / 2) as f32
    }

    /// Mean phase increment over the first 100 pairs, converted to Hz.
    fn detect_frequency(block: &[f32], sample_rate: f32) -> f32 {
        let phases: Vec<f32> = block
            .chunks_exact(2)
            .take(100)
            .map(|p| p[1].atan2(p[0]))
            .collect();
        let mut total = 0.0;
        for w in phases.windows(2) {
            let mut d = w[1] - w[0];
            while d > PI {
                d -= 2.0 * PI;
            }
            while d < -PI {
                d += 2.0 * PI;
            }
            total += d;
        }
        total / (phases.len() - 1) as f32 / (2.0 * PI) * sample_rate
    }

    fn dc(frames: usize, i: f32, q: f32) -> Vec<f32> {
        [i, q].repeat(frames)
    }

    fn mean_iq(block: &[f32]) -> (f32, f32) {
        let n = (block.len() / 2) as f32;
        let (si, sq) = block
            .chunks_exact(2)
            .fold((0.0, 0.0), |(si, sq), p| (si + p[0], sq + p[1]));
        (si / n, sq / n)
    }

    fn linear() -> StreamingResampler {
        StreamingResampler::new(INPUT_RATE, OUTPUT_RATE, filter::DEFAULT_TAP_COUNT).unwrap()
    }

    fn polyphase_resampler() -> StreamingResampler {
        StreamingResampler::with_interpolation(
            INPUT_RATE,
            OUTPUT_RATE,
            filter::DEFAULT_TAP_COUNT,
            Interpolation::Polyphase,
        )
        .unwrap()
    }

    #[test]
    fn new_starts_initialized() {
        let r = linear();
        assert_eq!(r.state(), StreamState::Initialized);
        assert_eq!(r.history_len(), 127);
        assert_eq!(r.ratio().up(), 5);
        assert_eq!(r.ratio().down(), 6);
        assert_eq!(r.filter().len(), 127);
        assert_eq!(r.interpolation(), Interpolation::Linear);
        let (hi, hq) = r.history();
        assert!(hi.iter().chain(hq).all(|&v| v == 0.0));
    }

    #[test]
    fn new_rejects_bad_parameters() {
        assert!(matches!(
            StreamingResampler::new(0, OUTPUT_RATE, 127),
            Err(ResamplerError::InvalidRate { .. })
        ));
        assert!(matches!(
            StreamingResampler::new(INPUT_RATE, OUTPUT_RATE, 2),
            Err(ResamplerError::InvalidTapCount(2))
        ));
    }

    #[test]
    fn output_size_120k_to_100k() {
        let mut r = linear();
        let out = r.process(&tone(12000, INPUT_RATE as f32, 10000.0)).unwrap();
        let frames = out.len() / 2;
        // nominal 10000, minus the tail held back for the next call
        assert!((frames as i64 - 10000).abs() <= 100, "got {frames}");
        assert_eq!(frames, 9948);
        assert!(frames <= r.expected_output_len(12000));
    }

    #[test]
    fn output_size_short_block() {
        let mut r = linear();
        let out = r.process(&tone(1000, INPUT_RATE as f32, 12000.0)).unwrap();
        let frames = out.len() / 2;
        assert!((frames as i64 - 833).abs() <= 60, "got {frames}");
    }

    #[test]
    fn dc_preserved() {
        let mut r = linear();
        let out = r.process(&dc(12000, 1.0, 0.5)).unwrap();
        let (mi, mq) = mean_iq(&out);
        assert!((mi - 1.0).abs() < 0.05, "I mean {mi}");
        assert!((mq - 0.5).abs() < 0.05, "Q mean {mq}");
    }

    #[test]
    fn power_preserved() {
        let mut r = linear();
        let input = tone(12000, INPUT_RATE as f32, INPUT_RATE as f32 * 0.1);
        let out = r.process(&input).unwrap();
        let (pin, pout) = (power(&input), power(&out));
        assert!((pout - pin).abs() < pin * 0.1, "in {pin} out {pout}");
    }

    #[test]
    fn frequency_preserved() {
        let mut r = linear();
        let freq = 10000.0;
        let out = r.process(&tone(12000, INPUT_RATE as f32, freq)).unwrap();
        let detected = detect_frequency(&out, OUTPUT_RATE as f32);
        assert!((detected - freq).abs() < freq * 0.05, "detected {detected}");
    }

    #[test]
    fn reset_is_idempotent() {
        let mut r = linear();
        let input = tone(1000, INPUT_RATE as f32, 10000.0);

        let a = r.process(&input).unwrap();
        assert_eq!(r.state(), StreamState::Streaming);
        r.reset();
        assert_eq!(r.state(), StreamState::Initialized);
        let b = r.process(&input).unwrap();
        r.reset();
        let c = r.process(&input).unwrap();

        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn reset_zeroes_history() {
        let mut r = linear();
        r.process(&dc(500, 1.0, -1.0)).unwrap();
        let (hi, hq) = r.history();
        assert!(hi.iter().all(|&v| v == 1.0));
        assert!(hq.iter().all(|&v| v == -1.0));

        r.reset();
        let (hi, hq) = r.history();
        assert!(hi.iter().chain(hq).all(|&v| v == 0.0));
    }

    #[test]
    fn streaming_multiple_blocks() {
        let mut r = linear();
        let mut total = 0;
        for _ in 0..5 {
            let out = r.process(&tone(1000, INPUT_RATE as f32, 10000.0)).unwrap();
            total += out.len() / 2;
        }
        // Each call holds back about tap_count / 2 input samples.
        assert!((total as i64 - 4166).abs() <= 300, "got {total}");
    }

    #[test]
    fn flush_has_nothing_to_drain() {
        let mut r = linear();
        r.process(&dc(500, 1.0, -1.0)).unwrap();
        let before = r.history().0.to_vec();
        assert!(IqResampler::flush(&mut r).unwrap().is_empty());
        assert_eq!(r.history().0, before.as_slice());
    }

    #[test]
    fn odd_input_rejected_without_mutation() {
        let mut r = linear();
        r.process(&dc(200, 0.25, 0.75)).unwrap();
        let before = (r.history().0.to_vec(), r.history().1.to_vec());

        let err = r.process(&vec![1.0f32; 123]).unwrap_err();
        assert!(matches!(err, ResamplerError::InvalidInput { len: 123 }));

        assert_eq!(r.history().0, before.0.as_slice());
        assert_eq!(r.history().1, before.1.as_slice());
    }

    #[test]
    fn empty_input() {
        let mut r = linear();
        assert!(r.process(&[]).unwrap().is_empty());
        assert_eq!(r.state(), StreamState::Initialized);

        r.process(&dc(300, 0.5, 0.5)).unwrap();
        let before = r.history().0.to_vec();
        assert!(r.process(&[]).unwrap().is_empty());
        assert_eq!(r.history().0, before.as_slice());
        assert_eq!(r.state(), StreamState::Streaming);
    }

    #[test]
    fn small_input_yields_nothing() {
        let mut r = linear();
        let input = tone(10, INPUT_RATE as f32, 10000.0);
        let out = r.process(&input).unwrap();
        assert!(out.is_empty());

        // The samples still land in the history tail.
        let (hi, hq) = r.history();
        let expected_i: Vec<f32> = input.iter().step_by(2).copied().collect();
        let expected_q: Vec<f32> = input.iter().skip(1).step_by(2).copied().collect();
        assert_eq!(&hi[117..], expected_i.as_slice());
        assert_eq!(&hq[117..], expected_q.as_slice());
        assert!(hi[..117].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn short_block_shifts_history() {
        let mut r = StreamingResampler::new(2, 1, 4).unwrap();
        r.process(&[1.0, -1.0, 2.0, -2.0]).unwrap();
        assert_eq!(r.history().0, &[0.0, 0.0, 1.0, 2.0]);
        assert_eq!(r.history().1, &[0.0, 0.0, -1.0, -2.0]);

        r.process(&[3.0, -3.0]).unwrap();
        assert_eq!(r.history().0, &[0.0, 1.0, 2.0, 3.0]);

        r.process(&[4.0, -4.0, 5.0, -5.0, 6.0, -6.0, 7.0, -7.0, 8.0, -8.0]).unwrap();
        assert_eq!(r.history().0, &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(r.history().1, &[-5.0, -6.0, -7.0, -8.0]);
    }

    #[test]
    fn linear_values_exact() {
        // 2x upsampling of a ramp lands halfway between input samples.
        let mut r = StreamingResampler::new(1, 2, 3).unwrap();
        let input: Vec<f32> = (0..8).flat_map(|n| [n as f32, -(n as f32)]).collect();
        let out = r.process(&input).unwrap();
        // limit = (8 - 1) * 2 = 14 positions
        assert_eq!(out.len() / 2, 14);
        for (k, pair) in out.chunks_exact(2).enumerate() {
            let expected = k as f32 * 0.5;
            assert!((pair[0] - expected).abs() < 1e-6, "k={k} got {}", pair[0]);
            assert!((pair[1] + expected).abs() < 1e-6);
        }
    }

    #[test]
    fn filter_tap_counts() {
        for &taps in &[31, 63, 127, 255] {
            let mut r = StreamingResampler::new(INPUT_RATE, OUTPUT_RATE, taps).unwrap();
            let out = r.process(&tone(1000, INPUT_RATE as f32, 10000.0)).unwrap();
            assert!(!out.is_empty(), "taps={taps}");
            assert!((r.filter().sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn various_ratios() {
        let cases = [
            (120000, 100000, 1200),
            (48000, 44100, 4800),
            (100000, 50000, 1000),
            (50000, 100000, 1000),
        ];
        for (input_rate, output_rate, frames) in cases {
            for mode in [Interpolation::Linear, Interpolation::Polyphase] {
                let mut r =
                    StreamingResampler::with_interpolation(input_rate, output_rate, 127, mode)
                        .unwrap();
                let input = tone(frames, input_rate as f32, input_rate as f32 / 10.0);
                let out = r.process(&input).unwrap();
                assert!(!out.is_empty(), "{input_rate} -> {output_rate} ({mode})");
                assert_eq!(out.len() % 2, 0);
                assert!(out.len() / 2 <= r.expected_output_len(frames));
            }
        }
    }

    #[test]
    fn polyphase_dc_preserved() {
        let mut r = polyphase_resampler();
        let out = r.process(&dc(12000, 1.0, 0.5)).unwrap();
        let (mi, mq) = mean_iq(&out);
        assert!((mi - 1.0).abs() < 0.05, "I mean {mi}");
        assert!((mq - 0.5).abs() < 0.05, "Q mean {mq}");

        // Away from the zero history every phase has unity gain.
        let tail = &out[2000..];
        for pair in tail.chunks_exact(2) {
            assert!((pair[0] - 1.0).abs() < 1e-4);
            assert!((pair[1] - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn polyphase_power_and_frequency() {
        let mut r = polyphase_resampler();
        let freq = INPUT_RATE as f32 * 0.1;
        let input = tone(12000, INPUT_RATE as f32, freq);
        let out = r.process(&input).unwrap();

        let (pin, pout) = (power(&input), power(&out));
        assert!((pout - pin).abs() < pin * 0.1, "in {pin} out {pout}");

        let detected = detect_frequency(&out[400..], OUTPUT_RATE as f32);
        assert!((detected - freq).abs() < freq * 0.05, "detected {detected}");
    }

    #[test]
    fn polyphase_rejects_above_output_nyquist() {
        // 58 kHz is representable at 120 kHz but would fold to -42 kHz at a
        // 100 kHz output; the anti-aliasing filter cuts off at 50 kHz.
        let input = tone(12000, INPUT_RATE as f32, 58000.0);

        let mut r = polyphase_resampler();
        let out = r.process(&input).unwrap();
        let alias = power(&out[2000..]);

        assert!(alias < 0.05, "alias power {alias}");
    }

    #[test]
    fn polyphase_prototype_size() {
        let r = polyphase_resampler();
        let proto = r.prototype().unwrap();
        assert_eq!(proto.len(), 127 * 5);
        assert!((proto.cutoff() - 0.5 / 6.0).abs() < 1e-12);
        assert!(linear().prototype().is_none());

        let r = StreamingResampler::with_interpolation(48000, 44100, 127, Interpolation::Polyphase)
            .unwrap();
        assert_eq!(r.prototype().unwrap().len(), 127 * 147);
    }

    #[test]
    fn polyphase_rejects_oversized_prototype() {
        // 48000 -> 44101 does not reduce: up = 44101
        let err = StreamingResampler::with_interpolation(48000, 44101, 127, Interpolation::Polyphase)
            .err()
            .unwrap();
        assert!(matches!(err, ResamplerError::Construction(_)));
        assert!(err.is_construction());

        // Linear mode needs no prototype.
        assert!(StreamingResampler::new(48000, 44101, 127).is_ok());
    }

    #[test]
    fn polyphase_rejects_alias_at_large_up_factor() {
        // 48 kHz -> 44.1 kHz is 147/160: more phases than taps. 23 kHz
        // would fold to 21.1 kHz at the output.
        let mut r =
            StreamingResampler::with_interpolation(48000, 44100, 127, Interpolation::Polyphase)
                .unwrap();
        let out = r.process(&tone(9600, 48000.0, 23000.0)).unwrap();
        let frames = out.len() / 2;
        let alias = power(&out[200..(frames - 100) * 2]);
        assert!(alias < 0.05, "alias power {alias}");

        // A passband tone goes through at unit power.
        r.reset();
        let out = r.process(&tone(9600, 48000.0, 5000.0)).unwrap();
        let frames = out.len() / 2;
        let pout = power(&out[200..(frames - 100) * 2]);
        assert!((pout - 1.0).abs() < 0.1, "passband power {pout}");
    }

    #[test]
    fn polyphase_interpolates_between_samples_at_large_up_factor() {
        let mut r =
            StreamingResampler::with_interpolation(48000, 44100, 127, Interpolation::Polyphase)
                .unwrap();
        let slope = 0.01f32;
        let input: Vec<f32> = (0..4000)
            .flat_map(|n| [n as f32 * slope, -(n as f32) * slope])
            .collect();
        let out = r.process(&input).unwrap();
        let frames = out.len() / 2;
        assert!(frames > 3000);

        // Output k sits at input position k * 160 / 147; sample-and-hold
        // would be off by up to one input step.
        for k in 200..frames - 100 {
            let expected = k as f32 * 160.0 / 147.0 * slope;
            let (vi, vq) = (out[2 * k], out[2 * k + 1]);
            assert!((vi - expected).abs() < 2e-3, "k={k} I {vi} expected {expected}");
            assert!((vq + expected).abs() < 2e-3, "k={k} Q {vq}");
        }
    }

    #[test]
    fn polyphase_reset_is_idempotent() {
        let mut r = polyphase_resampler();
        let input = tone(1500, INPUT_RATE as f32, 7000.0);
        let a = r.process(&input).unwrap();
        r.process(&input).unwrap();
        r.reset();
        let b = r.process(&input).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn polyphase_continuity_across_blocks() {
        // With history carried over, the first output of the second block
        // sees real samples on both sides and matches the steady state.
        let mut r = polyphase_resampler();
        r.process(&dc(1000, 1.0, 0.5)).unwrap();
        let out = r.process(&dc(1000, 1.0, 0.5)).unwrap();
        assert!((out[0] - 1.0).abs() < 1e-4);
        assert!((out[1] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn interpolation_from_str() {
        assert_eq!("linear".parse::<Interpolation>().unwrap(), Interpolation::Linear);
        assert_eq!("Polyphase".parse::<Interpolation>().unwrap(), Interpolation::Polyphase);
        assert_eq!("filtered".parse::<Interpolation>().unwrap(), Interpolation::Polyphase);
        assert!("sinc".parse::<Interpolation>().is_err());
        assert_eq!(Interpolation::Polyphase.to_string(), "polyphase");
    }

    #[test]
    fn update_history_cases() {
        let mut h = [1.0, 2.0, 3.0];
        update_history(&mut h, &[]);
        assert_eq!(h, [1.0, 2.0, 3.0]);
        update_history(&mut h, &[4.0]);
        assert_eq!(h, [2.0, 3.0, 4.0]);
        update_history(&mut h, &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(h, [6.0, 7.0, 8.0]);
    }
}
