//! Parallel Processing Module
//!
//! Rayon-backed symbol decisions for the digital demodulators. Enable with
//! the `parallel` feature flag:
//!
//! ```toml
//! [dependencies]
//! wavecodec-core = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! With the feature on, [`DigitalModem::demodulate`] decides its symbols
//! here. Results match the sequential path exactly: each symbol is decided
//! independently against the same references.
//!
//! Differential line codes and delta modulation are left-to-right folds and
//! stay sequential.

use rayon::prelude::*;

use crate::types::BitStream;
use crate::waveform::digital::{SymbolBits, SymbolDetector};
use crate::waveform::{DigitalModem, DigitalScheme};

/// Decide every full symbol of `waveform` in parallel
pub(crate) fn decide_symbols(
    detector: &SymbolDetector,
    waveform: &[f64],
    samples_per_symbol: usize,
) -> Vec<SymbolBits> {
    waveform
        .par_chunks_exact(samples_per_symbol)
        .map(|symbol| detector.decide(symbol))
        .collect()
}

/// Batch demodulator for many independent waveforms
pub struct ParallelDemodulator {
    modem: DigitalModem,
}

impl ParallelDemodulator {
    pub fn new(modem: DigitalModem) -> Self {
        Self { modem }
    }

    /// Demodulate each waveform on its own thread
    pub fn demodulate_batch(&self, waveforms: &[&[f64]], scheme: DigitalScheme) -> Vec<BitStream> {
        waveforms
            .par_iter()
            .map(|waveform| self.modem.demodulate(waveform, scheme))
            .collect()
    }

    /// Modulate each bit stream on its own thread
    pub fn modulate_batch(&self, payloads: &[&[u8]], scheme: DigitalScheme) -> Vec<Vec<f64>> {
        payloads
            .par_iter()
            .map(|bits| self.modem.modulate(bits, scheme))
            .collect()
    }
}
