//! Mode/algorithm dispatch
//!
//! A front end picks one of four [`Mode`]s and an algorithm name; the
//! [`Simulator`] parses the name into the matching scheme once, runs the
//! forward transform and its inverse, and returns all three stages for
//! display.
//!
//! Digital modes take a bit string from the caller. Analog modes ignore it
//! and generate a fixed demo source.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::line_code::LineScheme;
use crate::params::CarrierParams;
use crate::source_coding::{DeltaModulator, PcmCodec, SourceScheme};
use crate::types::{parse_bits, scheme_key, BitStream};
use crate::waveform::{AnalogModem, AnalogScheme, DigitalModem, DigitalScheme};

/// Delta step used by the analog-to-digital demo
pub const DEMO_DELTA_STEP: f64 = 0.4;
/// Number of points in the analog-to-digital demo source
pub const DEMO_SOURCE_POINTS: usize = 50;

/// Conversion mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    DigitalToDigital,
    DigitalToAnalog,
    AnalogToAnalog,
    AnalogToDigital,
}

impl Mode {
    pub fn all() -> &'static [Mode] {
        &[
            Self::DigitalToDigital,
            Self::DigitalToAnalog,
            Self::AnalogToAnalog,
            Self::AnalogToDigital,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DigitalToDigital => "Digital-to-Digital",
            Self::DigitalToAnalog => "Digital-to-Analog",
            Self::AnalogToAnalog => "Analog-to-Analog",
            Self::AnalogToDigital => "Analog-to-Digital",
        }
    }

    /// Whether the mode consumes a caller-supplied bit string
    pub fn takes_bits(&self) -> bool {
        matches!(self, Self::DigitalToDigital | Self::DigitalToAnalog)
    }

    /// Algorithm names offered for this mode
    pub fn algorithms(&self) -> Vec<&'static str> {
        match self {
            Self::DigitalToDigital => LineScheme::all().iter().map(|s| s.name()).collect(),
            Self::DigitalToAnalog => DigitalScheme::all().iter().map(|s| s.name()).collect(),
            Self::AnalogToAnalog => AnalogScheme::all().iter().map(|s| s.name()).collect(),
            Self::AnalogToDigital => SourceScheme::all().iter().map(|s| s.name()).collect(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Mode {
    type Err = CodecError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match scheme_key(s).as_str() {
            "DIGITALTODIGITAL" | "D2D" => Ok(Self::DigitalToDigital),
            "DIGITALTOANALOG" | "D2A" => Ok(Self::DigitalToAnalog),
            "ANALOGTOANALOG" | "A2A" => Ok(Self::AnalogToAnalog),
            "ANALOGTODIGITAL" | "A2D" => Ok(Self::AnalogToDigital),
            _ => Err(CodecError::UnknownScheme(s.to_string())),
        }
    }
}

/// A signal at one stage of a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Signal {
    Bits(BitStream),
    Samples(Vec<f64>),
}

impl Signal {
    pub fn len(&self) -> usize {
        match self {
            Self::Bits(bits) => bits.len(),
            Self::Samples(samples) => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bits(&self) -> Option<&[u8]> {
        match self {
            Self::Bits(bits) => Some(bits),
            Self::Samples(_) => None,
        }
    }

    pub fn as_samples(&self) -> Option<&[f64]> {
        match self {
            Self::Samples(samples) => Some(samples),
            Self::Bits(_) => None,
        }
    }
}

/// Input, channel signal and receiver output of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub mode: Mode,
    /// Canonical algorithm name
    pub algorithm: String,
    pub input: Signal,
    pub transmitted: Signal,
    pub recovered: Signal,
}

impl SimulationResult {
    /// Whether the receiver reproduced a bit input exactly
    pub fn bits_match(&self) -> Option<bool> {
        match (&self.input, &self.recovered) {
            (Signal::Bits(sent), Signal::Bits(received)) => Some(sent == received),
            _ => None,
        }
    }
}

/// `0.5·sin(2π·2t)` for `t` in `[0, 1)` at the carrier's sample rate
pub fn analog_demo_message(params: &CarrierParams) -> Vec<f64> {
    let len = params.samples_for(1.0);
    params.sine(2.0, 0.5, len)
}

/// `sin(θ) + 1.2` at 50 points with `θ` spanning `[0, 2π]` inclusive
pub fn sampled_demo_source() -> Vec<f64> {
    let last = (DEMO_SOURCE_POINTS - 1) as f64;
    (0..DEMO_SOURCE_POINTS)
        .map(|k| (2.0 * PI * k as f64 / last).sin() + 1.2)
        .collect()
}

/// Runs any mode/algorithm pair against one configuration
#[derive(Debug, Clone)]
pub struct Simulator {
    digital: DigitalModem,
    analog: AnalogModem,
    pcm: PcmCodec,
    delta: DeltaModulator,
    carrier: CarrierParams,
}

impl Simulator {
    /// Build a simulator from a validated configuration
    pub fn new(config: &CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            digital: config.digital_modem()?,
            analog: config.analog_modem(),
            pcm: config.pcm()?,
            delta: DeltaModulator::new(DEMO_DELTA_STEP)?,
            carrier: config.carrier,
        })
    }

    pub fn digital_modem(&self) -> &DigitalModem {
        &self.digital
    }

    pub fn analog_modem(&self) -> &AnalogModem {
        &self.analog
    }

    /// Run `algorithm` in `mode`.
    ///
    /// Digital modes require `input` as a `0`/`1` string; analog modes
    /// ignore it.
    pub fn run(&self, mode: Mode, algorithm: &str, input: Option<&str>) -> Result<SimulationResult> {
        info!(%mode, algorithm, "running simulation");
        let result = match mode {
            Mode::DigitalToDigital => {
                let scheme: LineScheme = algorithm.parse()?;
                let bits = Self::required_bits(mode, input)?;
                let signal = scheme.encode(&bits);
                let decoded = scheme.decode(&signal);
                SimulationResult {
                    mode,
                    algorithm: scheme.name().to_string(),
                    input: Signal::Bits(bits),
                    transmitted: Signal::Samples(signal),
                    recovered: Signal::Bits(decoded),
                }
            }
            Mode::DigitalToAnalog => {
                let scheme: DigitalScheme = algorithm.parse()?;
                let bits = Self::required_bits(mode, input)?;
                let waveform = self.digital.modulate(&bits, scheme);
                let decoded = self.digital.demodulate(&waveform, scheme);
                SimulationResult {
                    mode,
                    algorithm: scheme.name().to_string(),
                    input: Signal::Bits(bits),
                    transmitted: Signal::Samples(waveform),
                    recovered: Signal::Bits(decoded),
                }
            }
            Mode::AnalogToAnalog => {
                let scheme: AnalogScheme = algorithm.parse()?;
                Self::ignore_input(mode, input);
                let message = analog_demo_message(&self.carrier);
                let signal = self.analog.modulate(&message, scheme);
                let recovered = self.analog.demodulate(&signal, scheme);
                SimulationResult {
                    mode,
                    algorithm: scheme.name().to_string(),
                    input: Signal::Samples(message),
                    transmitted: Signal::Samples(signal),
                    recovered: Signal::Samples(recovered),
                }
            }
            Mode::AnalogToDigital => {
                let scheme: SourceScheme = algorithm.parse()?;
                Self::ignore_input(mode, input);
                let source = sampled_demo_source();
                let (bits, recovered) = match scheme {
                    SourceScheme::Pcm => {
                        let frame = self.pcm.encode(&source);
                        let recovered = self.pcm.decode(&frame.bits, frame.min_val, frame.max_val);
                        (frame.bits, recovered)
                    }
                    SourceScheme::Delta => {
                        let bits = self.delta.encode(&source);
                        let recovered = self.delta.decode(&bits);
                        (bits, recovered)
                    }
                };
                SimulationResult {
                    mode,
                    algorithm: scheme.name().to_string(),
                    input: Signal::Samples(source),
                    transmitted: Signal::Bits(bits),
                    recovered: Signal::Samples(recovered),
                }
            }
        };
        debug!(
            input = result.input.len(),
            transmitted = result.transmitted.len(),
            recovered = result.recovered.len(),
            "simulation complete"
        );
        Ok(result)
    }

    fn required_bits(mode: Mode, input: Option<&str>) -> Result<BitStream> {
        let text = input.ok_or_else(|| {
            CodecError::InvalidParameter(format!("{} needs an input bit string", mode))
        })?;
        parse_bits(text.trim())
    }

    fn ignore_input(mode: Mode, input: Option<&str>) {
        if input.is_some() {
            debug!(%mode, "ignoring input bits, using the demo source");
        }
    }
}
