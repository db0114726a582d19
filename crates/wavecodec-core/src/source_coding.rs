//! Source coding (analog-to-digital and back)
//!
//! Two converters between sampled analog signals and bit streams:
//!
//! - **PCM**: normalize each sample into the signal's own `[min, max]` range,
//!   quantize to one of `2^bit_depth` levels by truncation, and emit the level
//!   as `bit_depth` bits, MSB first. Lossy: the round trip is off by at most
//!   one quantization step `(max - min) / (2^bit_depth - 1)`.
//! - **Delta modulation**: one bit per sample saying whether the input is
//!   above a running staircase approximation, which then steps up or down by
//!   `step_size`. The decoder replays the same staircase from the bits, so its
//!   output equals the encoder's approximation exactly. The staircase only
//!   tracks the input with a slew of one step per sample.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::error::{CodecError, Result};
use crate::types::{scheme_key, Bit, BitStream, SchemeInfo};

/// Default PCM bits per sample
pub const DEFAULT_BIT_DEPTH: u32 = 3;
/// Largest supported PCM bit depth
pub const MAX_BIT_DEPTH: u32 = 32;
/// Default delta-modulation step
pub const DEFAULT_DELTA_STEP: f64 = 0.1;

/// Source coding schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceScheme {
    /// Pulse Code Modulation
    Pcm,
    /// Delta Modulation
    Delta,
}

impl SourceScheme {
    /// All source schemes, in display order
    pub fn all() -> &'static [SourceScheme] {
        &[Self::Pcm, Self::Delta]
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Scheme information
    pub fn info(&self) -> SchemeInfo {
        match self {
            Self::Pcm => SchemeInfo {
                name: "PCM",
                full_name: "Pulse Code Modulation",
                description: "Quantize each sample to 2^n levels and send the level as n bits",
            },
            Self::Delta => SchemeInfo {
                name: "Delta Modulation",
                full_name: "Delta Modulation",
                description: "One bit per sample: step the staircase up (1) or down (0)",
            },
        }
    }
}

impl fmt::Display for SourceScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SourceScheme {
    type Err = CodecError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match scheme_key(s).as_str() {
            "PCM" | "PULSECODEMODULATION" => Ok(Self::Pcm),
            "DELTA" | "DELTAMODULATION" | "DM" => Ok(Self::Delta),
            _ => Err(CodecError::UnknownScheme(s.to_string())),
        }
    }
}

/// PCM output: the bits plus the range needed to undo the normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcmFrame {
    /// Encoded bits, `bit_depth` per sample
    pub bits: BitStream,
    /// Smallest input sample
    pub min_val: f64,
    /// Largest input sample
    pub max_val: f64,
}

/// PCM quantizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcmCodec {
    bit_depth: u32,
}

impl Default for PcmCodec {
    fn default() -> Self {
        Self {
            bit_depth: DEFAULT_BIT_DEPTH,
        }
    }
}

impl PcmCodec {
    /// Create a PCM codec with `bit_depth` bits per sample (1 to 32)
    pub fn new(bit_depth: u32) -> Result<Self> {
        if !(1..=MAX_BIT_DEPTH).contains(&bit_depth) {
            return Err(CodecError::InvalidParameter(format!(
                "PCM bit depth must be 1-{}, got {}",
                MAX_BIT_DEPTH, bit_depth
            )));
        }
        Ok(Self { bit_depth })
    }

    /// Bits per sample
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Highest quantization level, `2^bit_depth - 1`
    pub fn max_level(&self) -> u64 {
        (1u64 << self.bit_depth) - 1
    }

    /// Worst-case reconstruction error for a signal spanning `[min, max]`
    pub fn step(&self, min_val: f64, max_val: f64) -> f64 {
        (max_val - min_val) / self.max_level() as f64
    }

    /// Quantize `samples` into bits.
    ///
    /// A constant signal has no range to normalize against and encodes as
    /// all-zero bits. An empty signal yields no bits and a `(0, 0)` range.
    pub fn encode(&self, samples: &[f64]) -> PcmFrame {
        trace!(samples = samples.len(), bit_depth = self.bit_depth, "PCM encode");
        if samples.is_empty() {
            return PcmFrame {
                bits: Vec::new(),
                min_val: 0.0,
                max_val: 0.0,
            };
        }

        let min_val = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max_val = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let depth = self.bit_depth as usize;

        if max_val == min_val {
            debug!(value = min_val, "constant PCM input, emitting all-zero levels");
            return PcmFrame {
                bits: vec![0; samples.len() * depth],
                min_val,
                max_val,
            };
        }

        let max_level = self.max_level();
        let span = max_val - min_val;
        let mut bits = Vec::with_capacity(samples.len() * depth);
        for &sample in samples {
            let normalized = ((sample - min_val) / span).clamp(0.0, 1.0);
            let level = ((normalized * max_level as f64) as u64).min(max_level);
            bits.extend((0..depth).rev().map(|i| ((level >> i) & 1) as Bit));
        }

        PcmFrame {
            bits,
            min_val,
            max_val,
        }
    }

    /// Reconstruct samples from bits and the encoder's range.
    ///
    /// A trailing chunk shorter than `bit_depth` is a truncated transmission
    /// and is dropped.
    pub fn decode(&self, bits: &[Bit], min_val: f64, max_val: f64) -> Vec<f64> {
        let chunks = bits.chunks_exact(self.bit_depth as usize);
        if !chunks.remainder().is_empty() {
            debug!(
                dropped = chunks.remainder().len(),
                "dropping partial PCM chunk"
            );
        }

        let max_level = self.max_level() as f64;
        let span = max_val - min_val;
        chunks
            .map(|chunk| {
                let level = chunk
                    .iter()
                    .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit != 0));
                (level as f64 / max_level) * span + min_val
            })
            .collect()
    }

    /// Reconstruct on the normalized `[0, 1]` scale, for receivers that never
    /// learned the encoder's range
    pub fn decode_normalized(&self, bits: &[Bit]) -> Vec<f64> {
        self.decode(bits, 0.0, 1.0)
    }
}

/// Running approximation carried across samples by delta modulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaState {
    /// Current staircase value
    pub approximation: f64,
}

impl Default for DeltaState {
    fn default() -> Self {
        Self { approximation: 0.0 }
    }
}

impl DeltaState {
    /// Step the staircase up for a `1`, down for a `0`
    #[inline]
    pub fn advance(self, bit: Bit, step_size: f64) -> Self {
        let delta = if bit != 0 { step_size } else { -step_size };
        Self {
            approximation: self.approximation + delta,
        }
    }
}

/// Delta modulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaModulator {
    step_size: f64,
}

impl Default for DeltaModulator {
    fn default() -> Self {
        Self {
            step_size: DEFAULT_DELTA_STEP,
        }
    }
}

impl DeltaModulator {
    /// Create a delta modulator with a positive `step_size`
    pub fn new(step_size: f64) -> Result<Self> {
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(CodecError::InvalidParameter(format!(
                "delta step size must be positive, got {}",
                step_size
            )));
        }
        Ok(Self { step_size })
    }

    /// Step size
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Encode one bit per sample against a staircase starting at 0
    pub fn encode(&self, samples: &[f64]) -> BitStream {
        trace!(samples = samples.len(), step = self.step_size, "delta encode");
        samples
            .iter()
            .scan(DeltaState::default(), |state, &sample| {
                let bit = (sample > state.approximation) as Bit;
                *state = state.advance(bit, self.step_size);
                Some(bit)
            })
            .collect()
    }

    /// Replay the staircase from the bits, starting at 0
    pub fn decode(&self, bits: &[Bit]) -> Vec<f64> {
        bits.iter()
            .scan(DeltaState::default(), |state, &bit| {
                *state = state.advance(bit, self.step_size);
                Some(state.approximation)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::format_bits;

    #[test]
    fn test_pcm_scenario() {
        let pcm = PcmCodec::new(2).unwrap();
        let frame = pcm.encode(&[0.0, 0.5, 1.0]);
        // Levels 0, trunc(1.5) = 1, 3
        assert_eq!(format_bits(&frame.bits), "000111");
        assert_eq!(frame.min_val, 0.0);
        assert_eq!(frame.max_val, 1.0);

        let decoded = pcm.decode(&frame.bits, frame.min_val, frame.max_val);
        assert_eq!(decoded.len(), 3);
        assert!((decoded[0] - 0.0).abs() < 1e-12);
        assert!((decoded[1] - 1.0 / 3.0).abs() < 1e-12);
        assert!((decoded[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pcm_default_depth() {
        let pcm = PcmCodec::default();
        assert_eq!(pcm.bit_depth(), 3);
        assert_eq!(pcm.max_level(), 7);
        let frame = pcm.encode(&[-1.0, 1.0]);
        assert_eq!(format_bits(&frame.bits), "000111");
    }

    #[test]
    fn test_pcm_constant_signal() {
        let pcm = PcmCodec::new(3).unwrap();
        let frame = pcm.encode(&[0.7, 0.7, 0.7, 0.7]);
        assert_eq!(frame.bits, vec![0; 12]);
        assert_eq!(frame.min_val, 0.7);
        assert_eq!(frame.max_val, 0.7);
        let decoded = pcm.decode(&frame.bits, frame.min_val, frame.max_val);
        assert_eq!(decoded, vec![0.7; 4]);
    }

    #[test]
    fn test_pcm_empty() {
        let pcm = PcmCodec::default();
        let frame = pcm.encode(&[]);
        assert!(frame.bits.is_empty());
        assert!(pcm.decode(&[], 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_pcm_partial_chunk_dropped() {
        let pcm = PcmCodec::new(3).unwrap();
        let decoded = pcm.decode(&[1, 1, 1, 0, 1], 0.0, 7.0);
        assert_eq!(decoded, vec![7.0]);
    }

    #[test]
    fn test_pcm_normalized_decode() {
        let pcm = PcmCodec::new(2).unwrap();
        let decoded = pcm.decode_normalized(&[1, 1, 0, 0]);
        assert_eq!(decoded, vec![1.0, 0.0]);
    }

    #[test]
    fn test_pcm_invalid_depth() {
        assert_eq!(PcmCodec::new(0).unwrap_err().reason(), "invalid_parameter");
        assert!(PcmCodec::new(33).is_err());
        assert!(PcmCodec::new(32).is_ok());
    }

    #[test]
    fn test_pcm_step() {
        let pcm = PcmCodec::new(3).unwrap();
        assert!((pcm.step(0.0, 7.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_delta_encode() {
        let dm = DeltaModulator::new(0.5).unwrap();
        // approx: 0 -> 0.5 -> 1.0 -> 0.5 -> 0.0
        let bits = dm.encode(&[1.0, 1.0, 0.2, 0.2]);
        assert_eq!(format_bits(&bits), "1100");
        assert_eq!(dm.decode(&bits), vec![0.5, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_delta_equal_sample_steps_down() {
        let dm = DeltaModulator::new(0.1).unwrap();
        assert_eq!(dm.encode(&[0.0]), vec![0]);
    }

    #[test]
    fn test_delta_empty() {
        let dm = DeltaModulator::default();
        assert!(dm.encode(&[]).is_empty());
        assert!(dm.decode(&[]).is_empty());
    }

    #[test]
    fn test_delta_invalid_step() {
        assert!(DeltaModulator::new(0.0).is_err());
        assert!(DeltaModulator::new(-0.1).is_err());
        assert!(DeltaModulator::new(f64::NAN).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("PCM (Pulse Code Mod)".parse::<SourceScheme>().unwrap(), SourceScheme::Pcm);
        assert_eq!("Delta Modulation".parse::<SourceScheme>().unwrap(), SourceScheme::Delta);
        assert!("ADPCM".parse::<SourceScheme>().is_err());
    }
}
