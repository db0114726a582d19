//! # Wavecodec Core Library
//!
//! Textbook signal codecs: paired transforms between bit streams and sampled
//! waveforms, each with its inverse.
//!
//! ## Components
//!
//! - **Line coding** ([`line_code`]): NRZ-L, NRZI, Bipolar-AMI,
//!   Pseudoternary, Manchester and Differential Manchester, two samples per
//!   bit.
//! - **Source coding** ([`source_coding`]): PCM quantization and delta
//!   modulation between analog samples and bits.
//! - **Digital modulation** ([`waveform::digital`]): ASK, BPSK, BFSK and
//!   4-QAM over a sinusoidal carrier.
//! - **Analog modulation** ([`waveform::analog`]): AM, FM and PM with
//!   approximate demodulators.
//!
//! The components are independent. They share only the carrier parameters
//! `(Fs, Fc, Amp)` in [`CarrierParams`], and every call starts from a fixed
//! initial state, so identical inputs give identical outputs.
//!
//! ## Example
//!
//! ```rust
//! use wavecodec_core::prelude::*;
//!
//! let bits = parse_bits("0110").unwrap();
//!
//! let line = LineScheme::BipolarAmi.encode(&bits);
//! assert_eq!(line, vec![0.0, 0.0, 1.0, 1.0, -1.0, -1.0, 0.0, 0.0]);
//! assert_eq!(LineScheme::BipolarAmi.decode(&line), bits);
//!
//! let modem = DigitalModem::new(CarrierParams::default());
//! let waveform = modem.modulate(&bits, DigitalScheme::Bpsk);
//! assert_eq!(modem.demodulate(&waveform, DigitalScheme::Bpsk), bits);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel`: decide digital-demodulator symbols with rayon

pub mod config;
pub mod dsp;
pub mod error;
pub mod line_code;
pub mod params;
pub mod simulation;
pub mod source_coding;
pub mod types;
pub mod waveform;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use config::CodecConfig;
pub use error::{CodecError, Result};
pub use line_code::{LineScheme, LineState};
pub use params::CarrierParams;
pub use simulation::{Mode, Signal, SimulationResult, Simulator};
pub use source_coding::{DeltaModulator, DeltaState, PcmCodec, PcmFrame, SourceScheme};
pub use types::{format_bits, parse_bits, Bit, BitStream, SchemeInfo};
pub use waveform::{AnalogModem, AnalogScheme, DigitalModem, DigitalScheme};

/// Everything needed to run the codecs
pub mod prelude {
    pub use crate::config::CodecConfig;
    pub use crate::error::{CodecError, Result};
    pub use crate::line_code::LineScheme;
    pub use crate::params::CarrierParams;
    pub use crate::simulation::{Mode, Signal, SimulationResult, Simulator};
    pub use crate::source_coding::{DeltaModulator, PcmCodec, SourceScheme};
    pub use crate::types::{format_bits, parse_bits, Bit, BitStream, SchemeInfo};
    pub use crate::waveform::{AnalogModem, AnalogScheme, DigitalModem, DigitalScheme};
}
