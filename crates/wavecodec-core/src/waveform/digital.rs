//! Digital modulation (bits onto a carrier)
//!
//! Every symbol interval restarts the carrier at `t = 0`, so each symbol is
//! the same reference segment scaled, negated or swapped. The modulator
//! computes those segments once per call and concatenates them; the
//! demodulator computes the matching references once and makes one
//! decision per `samples_per_symbol` chunk.
//!
//! | Scheme | Bit 1 | Bit 0 | Decision |
//! |--------|-------|-------|----------|
//! | ASK    | `A·sin(2πFc t)` | silence | `Σ|s|` above half the reference energy |
//! | BPSK   | `A·sin(2πFc t)` | `-A·sin(2πFc t)` | correlation with the reference `> 0` |
//! | BFSK   | `A·sin(2π(Fc+Δf) t)` | `A·sin(2π(Fc-Δf) t)` | larger correlation magnitude, ties to 0 |
//!
//! 4-QAM carries a bit pair `(i, q)` per symbol of length `2T`:
//!
//! ```text
//! s(t) = i_amp·A·cos(2πFc t) - q_amp·A·sin(2πFc t),  i_amp, q_amp ∈ {+1, -1}
//! ```
//!
//! A trailing partial symbol is discarded on demodulation, and an odd bit
//! count is zero-padded on QAM modulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::dsp::{abs_sum, correlate};
use crate::error::{CodecError, Result};
use crate::params::CarrierParams;
use crate::types::{scheme_key, Bit, BitStream, SchemeInfo};

/// Default symbol duration in seconds
pub const DEFAULT_SYMBOL_DURATION: f64 = 1.0;
/// Default BFSK frequency deviation in Hz
pub const DEFAULT_FREQ_DEVIATION: f64 = 2.0;

/// Digital modulation schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigitalScheme {
    /// Amplitude Shift Keying (on-off keying)
    Ask,
    /// Binary Phase Shift Keying
    Bpsk,
    /// Binary Frequency Shift Keying
    Bfsk,
    /// 4-point Quadrature Amplitude Modulation
    Qam4,
}

impl DigitalScheme {
    /// All digital schemes, in display order
    pub fn all() -> &'static [DigitalScheme] {
        &[Self::Ask, Self::Bpsk, Self::Bfsk, Self::Qam4]
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Bits carried by one symbol
    pub fn bits_per_symbol(&self) -> usize {
        match self {
            Self::Qam4 => 2,
            _ => 1,
        }
    }

    /// Scheme information
    pub fn info(&self) -> SchemeInfo {
        match self {
            Self::Ask => SchemeInfo {
                name: "ASK",
                full_name: "Amplitude Shift Keying",
                description: "Carrier on for 1, off for 0; energy detection",
            },
            Self::Bpsk => SchemeInfo {
                name: "PSK",
                full_name: "Binary Phase Shift Keying",
                description: "Carrier phase 0 for 1, phase π for 0; coherent correlation",
            },
            Self::Bfsk => SchemeInfo {
                name: "BFSK",
                full_name: "Binary Frequency Shift Keying",
                description: "Carrier at Fc+Δf for 1, Fc-Δf for 0; stronger correlation wins",
            },
            Self::Qam4 => SchemeInfo {
                name: "4-QAM",
                full_name: "4-point Quadrature Amplitude Modulation",
                description: "Two bits per symbol on the cosine and sine carriers",
            },
        }
    }
}

impl fmt::Display for DigitalScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DigitalScheme {
    type Err = CodecError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match scheme_key(s).as_str() {
            "ASK" | "OOK" => Ok(Self::Ask),
            "PSK" | "BPSK" => Ok(Self::Bpsk),
            "FSK" | "BFSK" => Ok(Self::Bfsk),
            "QAM" | "4QAM" | "QAM4" | "QPSK" => Ok(Self::Qam4),
            _ => Err(CodecError::UnknownScheme(s.to_string())),
        }
    }
}

/// Bits decided from one symbol interval
pub(crate) type SymbolBits = (Bit, Option<Bit>);

/// Reference waveforms and threshold for one scheme, built once per call
#[derive(Debug, Clone)]
pub(crate) struct SymbolDetector {
    scheme: DigitalScheme,
    primary: Vec<f64>,
    secondary: Vec<f64>,
    threshold: f64,
}

impl SymbolDetector {
    /// Decide the bit(s) carried by one full symbol interval
    pub(crate) fn decide(&self, symbol: &[f64]) -> SymbolBits {
        match self.scheme {
            DigitalScheme::Ask => ((abs_sum(symbol) > self.threshold) as Bit, None),
            DigitalScheme::Bpsk => ((correlate(symbol, &self.primary) > 0.0) as Bit, None),
            DigitalScheme::Bfsk => {
                let mark = correlate(symbol, &self.primary).abs();
                let space = correlate(symbol, &self.secondary).abs();
                ((mark > space) as Bit, None)
            }
            DigitalScheme::Qam4 => {
                let i_corr = correlate(symbol, &self.primary);
                let q_corr = correlate(symbol, &self.secondary);
                ((i_corr > 0.0) as Bit, Some((q_corr < 0.0) as Bit))
            }
        }
    }
}

/// Modulator/demodulator for the digital schemes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DigitalModem {
    params: CarrierParams,
    symbol_duration: f64,
    freq_deviation: f64,
}

impl DigitalModem {
    /// Create a modem with the default symbol duration and BFSK deviation
    pub fn new(params: CarrierParams) -> Self {
        Self {
            params,
            symbol_duration: DEFAULT_SYMBOL_DURATION,
            freq_deviation: DEFAULT_FREQ_DEVIATION,
        }
    }

    /// Set the symbol duration `T` in seconds
    pub fn with_symbol_duration(mut self, symbol_duration: f64) -> Result<Self> {
        if !(symbol_duration.is_finite() && symbol_duration > 0.0) {
            return Err(CodecError::InvalidParameter(format!(
                "symbol duration must be positive, got {}",
                symbol_duration
            )));
        }
        self.symbol_duration = symbol_duration;
        Ok(self)
    }

    /// Set the BFSK frequency deviation in Hz.
    ///
    /// Must be positive: with no deviation the mark and space tones coincide
    /// and every symbol decodes as 0.
    pub fn with_freq_deviation(mut self, freq_deviation: f64) -> Result<Self> {
        if !(freq_deviation.is_finite() && freq_deviation > 0.0) {
            return Err(CodecError::InvalidParameter(format!(
                "frequency deviation must be positive, got {}",
                freq_deviation
            )));
        }
        self.freq_deviation = freq_deviation;
        Ok(self)
    }

    pub fn params(&self) -> &CarrierParams {
        &self.params
    }

    pub fn freq_deviation(&self) -> f64 {
        self.freq_deviation
    }

    /// Samples per symbol: `round(Fs·T)`, or `round(2·Fs·T)` for 4-QAM
    pub fn samples_per_symbol(&self, scheme: DigitalScheme) -> usize {
        let duration = match scheme {
            DigitalScheme::Qam4 => 2.0 * self.symbol_duration,
            _ => self.symbol_duration,
        };
        self.params.samples_for(duration)
    }

    /// Modulate bits onto the carrier
    pub fn modulate(&self, bits: &[Bit], scheme: DigitalScheme) -> Vec<f64> {
        let sps = self.samples_per_symbol(scheme);
        let amp = self.params.amplitude;
        let fc = self.params.carrier_freq;
        trace!(bits = bits.len(), sps, %scheme, "modulate");

        match scheme {
            DigitalScheme::Ask => {
                let carrier = self.params.sine(fc, amp, sps);
                let mut out = Vec::with_capacity(bits.len() * sps);
                for &bit in bits {
                    if bit != 0 {
                        out.extend_from_slice(&carrier);
                    } else {
                        out.resize(out.len() + sps, 0.0);
                    }
                }
                out
            }
            DigitalScheme::Bpsk => {
                let carrier = self.params.sine(fc, amp, sps);
                let mut out = Vec::with_capacity(bits.len() * sps);
                for &bit in bits {
                    if bit != 0 {
                        out.extend_from_slice(&carrier);
                    } else {
                        out.extend(carrier.iter().map(|s| -s));
                    }
                }
                out
            }
            DigitalScheme::Bfsk => {
                let mark = self.params.sine(fc + self.freq_deviation, amp, sps);
                let space = self.params.sine(fc - self.freq_deviation, amp, sps);
                let mut out = Vec::with_capacity(bits.len() * sps);
                for &bit in bits {
                    out.extend_from_slice(if bit != 0 { &mark } else { &space });
                }
                out
            }
            DigitalScheme::Qam4 => {
                let i_carrier = self.params.cosine(fc, amp, sps);
                let q_carrier = self.params.sine(fc, amp, sps);
                let pairs = bits.chunks(2);
                if bits.len() % 2 == 1 {
                    debug!(bits = bits.len(), "padding odd QAM input with a zero bit");
                }
                let mut out = Vec::with_capacity(pairs.len() * sps);
                for pair in pairs {
                    let i_amp = if pair[0] != 0 { 1.0 } else { -1.0 };
                    let q_amp = if pair.get(1).is_some_and(|&q| q != 0) { 1.0 } else { -1.0 };
                    out.extend(
                        i_carrier
                            .iter()
                            .zip(&q_carrier)
                            .map(|(c, s)| i_amp * c - q_amp * s),
                    );
                }
                out
            }
        }
    }

    /// Recover bits from a modulated waveform
    pub fn demodulate(&self, waveform: &[f64], scheme: DigitalScheme) -> BitStream {
        let sps = self.samples_per_symbol(scheme);
        let remainder = waveform.len() % sps;
        if remainder != 0 {
            debug!(dropped = remainder, sps, %scheme, "dropping partial symbol");
        }
        let detector = self.detector(scheme);
        trace!(samples = waveform.len(), symbols = waveform.len() / sps, %scheme, "demodulate");

        #[cfg(feature = "parallel")]
        let decisions = crate::parallel::decide_symbols(&detector, waveform, sps);
        #[cfg(not(feature = "parallel"))]
        let decisions: Vec<SymbolBits> = waveform
            .chunks_exact(sps)
            .map(|symbol| detector.decide(symbol))
            .collect();

        let mut bits = Vec::with_capacity(decisions.len() * scheme.bits_per_symbol());
        for (first, second) in decisions {
            bits.push(first);
            bits.extend(second);
        }
        bits
    }

    /// Build the reference waveforms a demodulator needs for `scheme`
    pub(crate) fn detector(&self, scheme: DigitalScheme) -> SymbolDetector {
        let sps = self.samples_per_symbol(scheme);
        let amp = self.params.amplitude;
        let fc = self.params.carrier_freq;

        match scheme {
            DigitalScheme::Ask => {
                let reference = self.params.sine(fc, amp, sps);
                let threshold = abs_sum(&reference) / 2.0;
                SymbolDetector {
                    scheme,
                    primary: reference,
                    secondary: Vec::new(),
                    threshold,
                }
            }
            DigitalScheme::Bpsk => SymbolDetector {
                scheme,
                primary: self.params.sine(fc, amp, sps),
                secondary: Vec::new(),
                threshold: 0.0,
            },
            DigitalScheme::Bfsk => SymbolDetector {
                scheme,
                primary: self.params.sine(fc + self.freq_deviation, 1.0, sps),
                secondary: self.params.sine(fc - self.freq_deviation, 1.0, sps),
                threshold: 0.0,
            },
            DigitalScheme::Qam4 => SymbolDetector {
                scheme,
                primary: self.params.cosine(fc, 1.0, sps),
                secondary: self.params.sine(fc, 1.0, sps),
                threshold: 0.0,
            },
        }
    }
}

impl Default for DigitalModem {
    fn default() -> Self {
        Self::new(CarrierParams::default())
    }
}
