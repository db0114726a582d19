//! Signal Codec Explorer Command-Line Interface
//!
//! This CLI provides tools for:
//! - Running any mode/algorithm pair end to end (input, channel, receiver)
//! - Line-encoding and decoding bit strings
//! - Writing modulated waveforms to text files and demodulating them back
//! - Timing every codec with fixed inputs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::hint::black_box;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use wavecodec_core::prelude::*;
use wavecodec_core::simulation::analog_demo_message;

/// Longest bit string printed in full
const MAX_PRINTED_BITS: usize = 64;

#[derive(Parser)]
#[command(name = "wavecodec")]
#[command(author, version, about = "Signal codec explorer CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (JSON); defaults to $WAVECODEC_CONFIG or ./wavecodec.json
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one algorithm end to end
    Simulate {
        /// Mode (Digital-to-Digital, Digital-to-Analog, Analog-to-Analog, Analog-to-Digital)
        #[arg(short, long)]
        mode: String,

        /// Algorithm name (see `list`)
        #[arg(short, long)]
        algorithm: String,

        /// Input bit string for the digital modes
        #[arg(short, long)]
        bits: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Line-encode a bit string
    Encode {
        /// Line scheme (NRZ-L, NRZI, Bipolar-AMI, Pseudoternary, Manchester, Diff. Manchester)
        #[arg(short, long)]
        scheme: String,

        /// Bit string to encode
        #[arg(short, long)]
        bits: String,
    },

    /// Decode a line signal back to bits
    Decode {
        /// Line scheme
        #[arg(short, long)]
        scheme: String,

        /// Comma-separated signal levels, two per bit (e.g. "1,1,-1,-1")
        #[arg(short, long, allow_hyphen_values = true)]
        levels: String,
    },

    /// Modulate a bit string onto the carrier
    Modulate {
        /// Digital scheme (ASK, PSK, BFSK, 4-QAM)
        #[arg(short, long)]
        scheme: String,

        /// Bit string to modulate
        #[arg(short, long)]
        bits: String,

        /// Write samples to this file, one per line
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Demodulate a sample file written by `modulate`
    Demodulate {
        /// Digital scheme
        #[arg(short, long)]
        scheme: String,

        /// Input file with one sample per line
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List modes and their algorithms
    List,

    /// Print the effective configuration as JSON
    Config,

    /// Time every codec with fixed inputs
    Bench {
        /// Calls per operation
        #[arg(short, long, default_value = "100")]
        iterations: u32,

        /// Input length in bits for the digital codecs
        #[arg(short, long, default_value = "256")]
        bits: usize,
    },
}

fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    let config = match path {
        Some(path) => CodecConfig::load_from(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => CodecConfig::load().context("Failed to load configuration")?,
    };
    debug!(?config, "effective configuration");
    Ok(config)
}

fn describe(signal: &Signal) -> String {
    match signal {
        Signal::Bits(bits) if bits.len() <= MAX_PRINTED_BITS => format_bits(bits),
        Signal::Bits(bits) => format!(
            "{}... ({} bits)",
            format_bits(&bits[..MAX_PRINTED_BITS]),
            bits.len()
        ),
        Signal::Samples(samples) => describe_samples(samples),
    }
}

fn describe_samples(samples: &[f64]) -> String {
    if samples.is_empty() {
        return "0 samples".to_string();
    }
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    format!("{} samples, range [{:.4}, {:.4}]", samples.len(), min, max)
}

fn parse_levels(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("Invalid signal level: {:?}", s))
        })
        .collect()
}

fn write_samples_text(samples: &[f64], path: &Path) -> Result<()> {
    let file = File::create(path).context("Failed to create output file")?;
    let mut writer = BufWriter::new(file);

    for sample in samples {
        writeln!(writer, "{}", sample)?;
    }

    writer.flush()?;
    Ok(())
}

fn read_samples_text(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path).context("Failed to open input file")?;
    let reader = BufReader::new(file);

    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let sample = line
            .parse::<f64>()
            .with_context(|| format!("Invalid sample on line {}: {:?}", index + 1, line))?;
        samples.push(sample);
    }

    Ok(samples)
}

fn cmd_simulate(
    config: &CodecConfig,
    mode: String,
    algorithm: String,
    bits: Option<String>,
    json: bool,
) -> Result<()> {
    let mode: Mode = mode.parse()?;
    if mode.takes_bits() && bits.is_none() {
        bail!("{} needs --bits", mode);
    }

    let simulator = Simulator::new(config)?;
    let result = simulator.run(mode, &algorithm, bits.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("=== {} : {} ===", result.mode, result.algorithm);
    println!();
    println!("  Input:        {}", describe(&result.input));
    println!("  Transmitted:  {}", describe(&result.transmitted));
    println!("  Recovered:    {}", describe(&result.recovered));
    if let Some(matched) = result.bits_match() {
        println!();
        println!("  Round trip:   {}", if matched { "OK" } else { "MISMATCH" });
    }

    Ok(())
}

fn cmd_encode(scheme: String, bits: String) -> Result<()> {
    let scheme: LineScheme = scheme.parse()?;
    let bits = parse_bits(bits.trim())?;

    let signal = scheme.encode(&bits);
    info!("Encoded {} bits into {} samples with {}", bits.len(), signal.len(), scheme);

    let levels: Vec<String> = signal.iter().map(|l| format!("{}", l)).collect();
    println!("{}", levels.join(","));
    Ok(())
}

fn cmd_decode(scheme: String, levels: String) -> Result<()> {
    let scheme: LineScheme = scheme.parse()?;
    let signal = parse_levels(&levels)?;

    let bits = scheme.decode(&signal);
    info!("Decoded {} samples into {} bits with {}", signal.len(), bits.len(), scheme);

    println!("{}", format_bits(&bits));
    Ok(())
}

fn cmd_modulate(
    config: &CodecConfig,
    scheme: String,
    bits: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let scheme: DigitalScheme = scheme.parse()?;
    let bits = parse_bits(bits.trim())?;
    let modem = config.digital_modem()?;

    let waveform = modem.modulate(&bits, scheme);
    info!("Modulated {} bits with {}", bits.len(), scheme);
    info!(
        "Duration: {:.3} s",
        waveform.len() as f64 / modem.params().sample_rate
    );

    match output {
        Some(path) => {
            write_samples_text(&waveform, &path)?;
            println!("Wrote {} samples to {:?}", waveform.len(), path);
        }
        None => {
            println!("Scheme:              {}", scheme.info().full_name);
            println!("Samples per symbol:  {}", modem.samples_per_symbol(scheme));
            println!("Waveform:            {}", describe_samples(&waveform));
        }
    }
    Ok(())
}

fn cmd_demodulate(config: &CodecConfig, scheme: String, input: PathBuf) -> Result<()> {
    let scheme: DigitalScheme = scheme.parse()?;
    let waveform = read_samples_text(&input)?;
    let modem = config.digital_modem()?;

    let bits = modem.demodulate(&waveform, scheme);
    info!("Demodulated {} samples into {} bits with {}", waveform.len(), bits.len(), scheme);

    println!("{}", format_bits(&bits));
    Ok(())
}

fn cmd_list() -> Result<()> {
    println!("=== Available Modes and Algorithms ===");

    for &mode in Mode::all() {
        println!();
        println!("{}:", mode);
        let infos: Vec<SchemeInfo> = match mode {
            Mode::DigitalToDigital => LineScheme::all().iter().map(|s| s.info()).collect(),
            Mode::DigitalToAnalog => DigitalScheme::all().iter().map(|s| s.info()).collect(),
            Mode::AnalogToAnalog => AnalogScheme::all().iter().map(|s| s.info()).collect(),
            Mode::AnalogToDigital => SourceScheme::all().iter().map(|s| s.info()).collect(),
        };
        for info in infos {
            println!("  {:<18} {}", info.name, info.full_name);
            println!("  {:<18} {}", "", info.description);
        }
    }

    println!();
    println!("Usage: wavecodec simulate -m Digital-to-Analog -a ASK -b 1011");
    Ok(())
}

fn cmd_config(config: &CodecConfig) -> Result<()> {
    println!("{}", config.to_json()?);
    Ok(())
}

/// Mean wall-clock time of `iterations` calls
fn time_op<R>(iterations: u32, mut op: impl FnMut() -> R) -> Duration {
    let start = Instant::now();
    for _ in 0..iterations {
        black_box(op());
    }
    start.elapsed() / iterations.max(1)
}

fn print_timing(name: &str, elapsed: Duration) {
    println!("  {:<32} {:>10.4} ms", name, elapsed.as_secs_f64() * 1000.0);
}

fn cmd_bench(config: &CodecConfig, iterations: u32, num_bits: usize) -> Result<()> {
    if iterations == 0 {
        bail!("--iterations must be at least 1");
    }

    let bits: BitStream = (0..num_bits).map(|i| ((i * 7 + i / 3) % 2) as u8).collect();
    let digital = config.digital_modem()?;
    let analog = config.analog_modem();
    let pcm = config.pcm()?;
    let delta = config.delta()?;
    let message = analog_demo_message(&config.carrier);

    println!("=== Codec Timing ({} iterations, {} bits) ===", iterations, num_bits);

    println!();
    println!("Line coding:");
    for &scheme in LineScheme::all() {
        let signal = scheme.encode(&bits);
        print_timing(&format!("encode {}", scheme), time_op(iterations, || scheme.encode(&bits)));
        print_timing(&format!("decode {}", scheme), time_op(iterations, || scheme.decode(&signal)));
    }

    println!();
    println!("Source coding ({} samples):", message.len());
    let frame = pcm.encode(&message);
    print_timing("encode PCM", time_op(iterations, || pcm.encode(&message)));
    print_timing(
        "decode PCM",
        time_op(iterations, || pcm.decode(&frame.bits, frame.min_val, frame.max_val)),
    );
    let delta_bits = delta.encode(&message);
    print_timing("encode Delta", time_op(iterations, || delta.encode(&message)));
    print_timing("decode Delta", time_op(iterations, || delta.decode(&delta_bits)));

    println!();
    println!("Digital modulation:");
    for &scheme in DigitalScheme::all() {
        let waveform = digital.modulate(&bits, scheme);
        print_timing(
            &format!("modulate {}", scheme),
            time_op(iterations, || digital.modulate(&bits, scheme)),
        );
        print_timing(
            &format!("demodulate {}", scheme),
            time_op(iterations, || digital.demodulate(&waveform, scheme)),
        );
    }

    println!();
    println!("Analog modulation ({} samples):", message.len());
    for &scheme in AnalogScheme::all() {
        let signal = analog.modulate(&message, scheme);
        print_timing(
            &format!("modulate {}", scheme),
            time_op(iterations, || analog.modulate(&message, scheme)),
        );
        print_timing(
            &format!("demodulate {}", scheme),
            time_op(iterations, || analog.demodulate(&signal, scheme)),
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            mode,
            algorithm,
            bits,
            json,
        } => cmd_simulate(&config, mode, algorithm, bits, json),

        Commands::Encode { scheme, bits } => cmd_encode(scheme, bits),

        Commands::Decode { scheme, levels } => cmd_decode(scheme, levels),

        Commands::Modulate {
            scheme,
            bits,
            output,
        } => cmd_modulate(&config, scheme, bits, output),

        Commands::Demodulate { scheme, input } => cmd_demodulate(&config, scheme, input),

        Commands::List => cmd_list(),

        Commands::Config => cmd_config(&config),

        Commands::Bench { iterations, bits } => cmd_bench(&config, iterations, bits),
    }
}
