//! iqresample - Resample raw interleaved float32 I/Q files.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use iqrate_resampler::{Backend, Config, Interpolation, IqResampler};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Bytes per interleaved I/Q frame (two little-endian f32).
const FRAME_BYTES: usize = 8;

/// Resample raw interleaved float32 I/Q files.
///
/// Input and output are headerless little-endian f32 pairs (I, Q). Rates and
/// tuning come from an optional YAML config file; flags override it.
#[derive(Parser, Debug)]
#[command(name = "iqresample")]
#[command(about = "Resample raw interleaved float32 I/Q files")]
#[command(version)]
struct Args {
    /// Input file (raw LE f32 I/Q)
    input: PathBuf,

    /// Output file (raw LE f32 I/Q)
    output: PathBuf,

    /// Resampler config file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input sample rate in Hz
    #[arg(long)]
    input_rate: Option<u32>,

    /// Output sample rate in Hz
    #[arg(long)]
    output_rate: Option<u32>,

    /// Filter length
    #[arg(long)]
    taps: Option<usize>,

    /// Backend: streaming, sinc or soxr
    #[arg(long)]
    backend: Option<Backend>,

    /// Streaming interpolation: linear or polyphase
    #[arg(long)]
    interpolation: Option<Interpolation>,

    /// Passband edge for the sinc and soxr backends
    #[arg(long)]
    rolloff: Option<f32>,

    /// I/Q frames per processing block
    #[arg(long, default_value_t = 12000)]
    block_frames: usize,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Totals reported after a run.
#[derive(Debug, Default, PartialEq)]
struct Summary {
    blocks: usize,
    frames_in: u64,
    frames_out: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cfg = resolve_config(&args)?;
    let summary = run(&args, &cfg)?;

    println!(
        "{}: {} frames in, {} frames out, {} blocks ({} Hz -> {} Hz, {})",
        args.output.display(),
        summary.frames_in,
        summary.frames_out,
        summary.blocks,
        cfg.input_rate,
        cfg.output_rate,
        cfg.backend,
    );
    Ok(())
}

/// Loads the config file, if any, and applies flag overrides.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            Config::from_yaml(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => {
            let input_rate = args
                .input_rate
                .context("--input-rate is required without --config")?;
            let output_rate = args
                .output_rate
                .context("--output-rate is required without --config")?;
            Config::new(input_rate, output_rate)
        }
    };

    if let Some(rate) = args.input_rate {
        cfg.input_rate = rate;
    }
    if let Some(rate) = args.output_rate {
        cfg.output_rate = rate;
    }
    if let Some(taps) = args.taps {
        cfg.tap_count = taps;
    }
    if let Some(backend) = args.backend {
        cfg.backend = backend;
    }
    if let Some(interpolation) = args.interpolation {
        cfg.interpolation = interpolation;
    }
    if let Some(rolloff) = args.rolloff {
        cfg.rolloff = rolloff;
    }
    Ok(cfg)
}

/// Streams `args.input` through the configured resampler into `args.output`.
fn run(args: &Args, cfg: &Config) -> Result<Summary> {
    if args.block_frames == 0 {
        bail!("--block-frames must be positive");
    }

    let mut resampler = cfg.build().context("failed to create resampler")?;
    debug!("resampler config: {:?}", cfg);

    let input = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let output = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let mut reader = BufReader::new(input);
    let mut writer = BufWriter::new(output);

    let mut buf = vec![0u8; args.block_frames * FRAME_BYTES];
    let mut summary = Summary::default();
    loop {
        let n = read_full(&mut reader, &mut buf)
            .with_context(|| format!("failed to read {}", args.input.display()))?;
        if n == 0 {
            break;
        }
        if n % FRAME_BYTES != 0 {
            bail!(
                "{} ends with a partial I/Q frame ({} trailing bytes)",
                args.input.display(),
                n % FRAME_BYTES
            );
        }

        let samples = decode_samples(&buf[..n]);
        let out = resampler.process(&samples)?;
        writer
            .write_all(&encode_samples(&out))
            .with_context(|| format!("failed to write {}", args.output.display()))?;

        summary.blocks += 1;
        summary.frames_in += (samples.len() / 2) as u64;
        summary.frames_out += (out.len() / 2) as u64;
        debug!(
            "block {}: {} frames in, {} frames out",
            summary.blocks,
            samples.len() / 2,
            out.len() / 2
        );
    }

    let tail = resampler.flush()?;
    writer
        .write_all(&encode_samples(&tail))
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    summary.frames_out += (tail.len() / 2) as u64;
    debug!("flushed {} frames", tail.len() / 2);
    writer.flush()?;

    Ok(summary)
}

/// Fills `buf` until it is full or the reader hits EOF.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn decode_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn encode_samples(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
