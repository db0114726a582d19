//! Line coding (digital-to-digital)
//!
//! Every scheme maps one bit onto exactly [`SAMPLES_PER_BIT`] consecutive
//! samples drawn from the levels `+1`, `0` and `-1`:
//!
//! | Scheme | `0` | `1` | Carried state |
//! |---|---|---|---|
//! | NRZ-L | `(+1,+1)` | `(-1,-1)` | none |
//! | NRZI | hold level | toggle level | last level, starts `+1` |
//! | Bipolar-AMI | `(0,0)` | alternate `±1` | last mark polarity, starts `-1` |
//! | Pseudoternary | alternate `±1` | `(0,0)` | last space polarity, starts `-1` |
//! | Manchester | `(+1,-1)` | `(-1,+1)` | none |
//! | Diff. Manchester | transition at start | no transition at start | level, starts `-1` |
//!
//! Differential schemes thread a [`LineState`] through the bits as a fold.
//! The state is seeded fresh on every call: encoders start from
//! [`LineState::encoder`], decoders from their own mirror
//! [`LineState::decoder`].
//!
//! Decoders read one pair per bit (the first sample, except Differential
//! Manchester which reads both). A trailing odd sample is ignored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::error::CodecError;
use crate::types::{scheme_key, Bit, BitStream, SchemeInfo};

/// Samples emitted per input bit
pub const SAMPLES_PER_BIT: usize = 2;

/// Line coding schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineScheme {
    /// Non-Return-to-Zero Level
    NrzL,
    /// Non-Return-to-Zero Inverted
    Nrzi,
    /// Bipolar Alternate Mark Inversion
    BipolarAmi,
    /// Pseudoternary (AMI with the roles of 0 and 1 swapped)
    Pseudoternary,
    /// Manchester (IEEE 802.3 convention: 0 is high-to-low)
    Manchester,
    /// Differential Manchester
    DiffManchester,
}

impl LineScheme {
    /// All line schemes, in display order
    pub fn all() -> &'static [LineScheme] {
        &[
            Self::NrzL,
            Self::Nrzi,
            Self::BipolarAmi,
            Self::Pseudoternary,
            Self::Manchester,
            Self::DiffManchester,
        ]
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Scheme information
    pub fn info(&self) -> SchemeInfo {
        let (name, full_name, description) = match self {
            Self::NrzL => (
                "NRZ-L",
                "Non-Return-to-Zero Level",
                "0 is high (+1), 1 is low (-1) for the whole bit",
            ),
            Self::Nrzi => (
                "NRZI",
                "Non-Return-to-Zero Inverted",
                "1 toggles the line level at the start of the bit, 0 holds it",
            ),
            Self::BipolarAmi => (
                "Bipolar-AMI",
                "Bipolar Alternate Mark Inversion",
                "0 is zero volts, each 1 alternates between +1 and -1",
            ),
            Self::Pseudoternary => (
                "Pseudoternary",
                "Pseudoternary",
                "1 is zero volts, each 0 alternates between +1 and -1",
            ),
            Self::Manchester => (
                "Manchester",
                "Manchester",
                "0 is a high-to-low mid-bit transition, 1 is low-to-high",
            ),
            Self::DiffManchester => (
                "Diff. Manchester",
                "Differential Manchester",
                "Always a mid-bit transition; 0 adds a transition at the start of the bit",
            ),
        };
        SchemeInfo {
            name,
            full_name,
            description,
        }
    }

    /// Encode bits into a line signal of `2 * bits.len()` samples
    pub fn encode(&self, bits: &[Bit]) -> Vec<f64> {
        trace!(scheme = self.name(), bits = bits.len(), "line encode");
        let mut signal = Vec::with_capacity(bits.len() * SAMPLES_PER_BIT);
        let mut state = LineState::encoder(*self);
        for &bit in bits {
            let (pair, next) = state.encode_bit(*self, bit);
            signal.extend_from_slice(&pair);
            state = next;
        }
        signal
    }

    /// Decode a line signal back into bits, one bit per sample pair
    pub fn decode(&self, signal: &[f64]) -> BitStream {
        let pairs = signal.chunks_exact(SAMPLES_PER_BIT);
        if !pairs.remainder().is_empty() {
            debug!(
                scheme = self.name(),
                len = signal.len(),
                "ignoring trailing odd sample in line signal"
            );
        }

        let mut bits = Vec::with_capacity(signal.len() / SAMPLES_PER_BIT);
        let mut state = LineState::decoder(*self);
        for pair in pairs {
            let (bit, next) = state.decode_pair(*self, [pair[0], pair[1]]);
            bits.push(bit);
            state = next;
        }
        bits
    }
}

impl fmt::Display for LineScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LineScheme {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match scheme_key(s).as_str() {
            "NRZL" | "NRZ" => Ok(Self::NrzL),
            "NRZI" => Ok(Self::Nrzi),
            "BIPOLARAMI" | "AMI" | "BIPOLAR" => Ok(Self::BipolarAmi),
            "PSEUDOTERNARY" => Ok(Self::Pseudoternary),
            "MANCHESTER" => Ok(Self::Manchester),
            "DIFFMANCHESTER" | "DIFFERENTIALMANCHESTER" | "DMANCHESTER" => {
                Ok(Self::DiffManchester)
            }
            _ => Err(CodecError::UnknownScheme(s.to_string())),
        }
    }
}

/// Polarity of a received sample: `+1`, `-1`, or `0` inside the half-level
/// dead zone
#[inline]
fn polarity(sample: f64) -> i8 {
    if sample > 0.5 {
        1
    } else if sample < -0.5 {
        -1
    } else {
        0
    }
}

/// State carried across bit boundaries by the differential schemes.
///
/// One scalar covers every scheme: the current line level (NRZI, Diff.
/// Manchester encoder), the polarity of the last non-zero pulse (AMI,
/// Pseudoternary), or the previous bit's level (NRZI decoder) and end level
/// (Diff. Manchester decoder). Stateless schemes carry it through unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineState {
    /// Level carried into the next bit
    pub level: f64,
}

impl LineState {
    /// Initial encoder state for `scheme`
    pub fn encoder(scheme: LineScheme) -> Self {
        let level = match scheme {
            LineScheme::Nrzi => 1.0,
            // First mark/space is emitted as +1
            LineScheme::BipolarAmi | LineScheme::Pseudoternary => -1.0,
            LineScheme::DiffManchester => -1.0,
            LineScheme::NrzL | LineScheme::Manchester => 0.0,
        };
        Self { level }
    }

    /// Initial decoder state for `scheme`, mirroring [`LineState::encoder`]
    pub fn decoder(scheme: LineScheme) -> Self {
        let level = match scheme {
            LineScheme::Nrzi => 1.0,
            // Line assumed low before the first bit
            LineScheme::DiffManchester => -1.0,
            _ => 0.0,
        };
        Self { level }
    }

    /// Emit the sample pair for one bit and the state for the next
    pub fn encode_bit(self, scheme: LineScheme, bit: Bit) -> ([f64; 2], Self) {
        let one = bit != 0;
        match scheme {
            LineScheme::NrzL => {
                let v = if one { -1.0 } else { 1.0 };
                ([v, v], self)
            }
            LineScheme::Nrzi => {
                let level = if one { -self.level } else { self.level };
                ([level, level], Self { level })
            }
            LineScheme::BipolarAmi => {
                if one {
                    let level = -self.level;
                    ([level, level], Self { level })
                } else {
                    ([0.0, 0.0], self)
                }
            }
            LineScheme::Pseudoternary => {
                if one {
                    ([0.0, 0.0], self)
                } else {
                    let level = -self.level;
                    ([level, level], Self { level })
                }
            }
            LineScheme::Manchester => {
                if one {
                    ([-1.0, 1.0], self)
                } else {
                    ([1.0, -1.0], self)
                }
            }
            LineScheme::DiffManchester => {
                let start = if one { self.level } else { -self.level };
                let end = -start;
                ([start, end], Self { level: end })
            }
        }
    }

    /// Recover one bit from its sample pair and the state for the next
    pub fn decode_pair(self, scheme: LineScheme, pair: [f64; 2]) -> (Bit, Self) {
        let [first, second] = pair;
        match scheme {
            LineScheme::NrzL => (if first > 0.0 { 0 } else { 1 }, self),
            LineScheme::Nrzi => {
                let changed = polarity(first) != polarity(self.level);
                (changed as Bit, Self { level: first })
            }
            LineScheme::BipolarAmi => ((polarity(first) != 0) as Bit, self),
            LineScheme::Pseudoternary => ((polarity(first) == 0) as Bit, self),
            LineScheme::Manchester => (if polarity(first) == 1 { 0 } else { 1 }, self),
            LineScheme::DiffManchester => {
                let same = polarity(first) == polarity(self.level);
                (same as Bit, Self { level: second })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{format_bits, parse_bits};

    fn encode_str(scheme: LineScheme, bits: &str) -> Vec<f64> {
        scheme.encode(&parse_bits(bits).unwrap())
    }

    #[test]
    fn test_nrz_l_scenario() {
        let signal = encode_str(LineScheme::NrzL, "0101");
        assert_eq!(signal, vec![1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0]);
        assert_eq!(format_bits(&LineScheme::NrzL.decode(&signal)), "0101");
    }

    #[test]
    fn test_bipolar_ami_scenario() {
        // First mark goes positive, the next one negative
        let signal = encode_str(LineScheme::BipolarAmi, "0110");
        assert_eq!(signal, vec![0.0, 0.0, 1.0, 1.0, -1.0, -1.0, 0.0, 0.0]);
        assert_eq!(format_bits(&LineScheme::BipolarAmi.decode(&signal)), "0110");
    }

    #[test]
    fn test_pseudoternary() {
        let signal = encode_str(LineScheme::Pseudoternary, "0010");
        assert_eq!(signal, vec![1.0, 1.0, -1.0, -1.0, 0.0, 0.0, 1.0, 1.0]);
        assert_eq!(format_bits(&LineScheme::Pseudoternary.decode(&signal)), "0010");
    }

    #[test]
    fn test_nrzi() {
        let signal = encode_str(LineScheme::Nrzi, "0110");
        assert_eq!(signal, vec![1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(format_bits(&LineScheme::Nrzi.decode(&signal)), "0110");
    }

    #[test]
    fn test_manchester() {
        let signal = encode_str(LineScheme::Manchester, "01");
        assert_eq!(signal, vec![1.0, -1.0, -1.0, 1.0]);
        assert_eq!(format_bits(&LineScheme::Manchester.decode(&signal)), "01");
    }

    #[test]
    fn test_diff_manchester() {
        let signal = encode_str(LineScheme::DiffManchester, "1001");
        // 1: no start transition from the idle -1 level
        assert_eq!(
            signal,
            vec![-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0]
        );
        assert_eq!(format_bits(&LineScheme::DiffManchester.decode(&signal)), "1001");
    }

    #[test]
    fn test_diff_manchester_always_transitions_mid_bit() {
        let signal = encode_str(LineScheme::DiffManchester, "0011010111");
        for pair in signal.chunks_exact(2) {
            assert_eq!(pair[0], -pair[1]);
        }
    }

    #[test]
    fn test_empty_input() {
        for scheme in LineScheme::all() {
            assert!(scheme.encode(&[]).is_empty());
            assert!(scheme.decode(&[]).is_empty());
        }
    }

    #[test]
    fn test_odd_trailing_sample_ignored() {
        let mut signal = encode_str(LineScheme::Manchester, "101");
        signal.push(1.0);
        assert_eq!(format_bits(&LineScheme::Manchester.decode(&signal)), "101");
    }

    #[test]
    fn test_state_seeds() {
        assert_eq!(LineState::encoder(LineScheme::Nrzi).level, 1.0);
        assert_eq!(LineState::encoder(LineScheme::BipolarAmi).level, -1.0);
        assert_eq!(LineState::encoder(LineScheme::Pseudoternary).level, -1.0);
        assert_eq!(LineState::encoder(LineScheme::DiffManchester).level, -1.0);
        assert_eq!(LineState::decoder(LineScheme::Nrzi).level, 1.0);
        assert_eq!(LineState::decoder(LineScheme::DiffManchester).level, -1.0);
    }

    #[test]
    fn test_state_is_fresh_per_call() {
        let first = encode_str(LineScheme::BipolarAmi, "1");
        let second = encode_str(LineScheme::BipolarAmi, "1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("NRZ-L".parse::<LineScheme>().unwrap(), LineScheme::NrzL);
        assert_eq!("nrzi".parse::<LineScheme>().unwrap(), LineScheme::Nrzi);
        assert_eq!("Bipolar-AMI".parse::<LineScheme>().unwrap(), LineScheme::BipolarAmi);
        assert_eq!(
            "Diff. Manchester".parse::<LineScheme>().unwrap(),
            LineScheme::DiffManchester
        );
        let err = "Morse".parse::<LineScheme>().unwrap_err();
        assert_eq!(err.reason(), "unknown_scheme");
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for scheme in LineScheme::all() {
            assert_eq!(scheme.to_string().parse::<LineScheme>().unwrap(), *scheme);
        }
    }
}
