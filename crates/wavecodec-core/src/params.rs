//! Carrier parameters shared by the modems
//!
//! `(Fs, Fc, Amp)` is fixed per modem instance. The modulator and the
//! demodulator are built from the same value so the receiver's reference
//! carrier matches the transmitter's.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{CodecError, Result};

/// Default sampling frequency in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 1000.0;
/// Default carrier frequency in Hz
pub const DEFAULT_CARRIER_FREQ: f64 = 5.0;
/// Default carrier amplitude
pub const DEFAULT_AMPLITUDE: f64 = 1.0;

/// Sampling frequency, carrier frequency and carrier amplitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierParams {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Carrier frequency in Hz
    pub carrier_freq: f64,
    /// Carrier amplitude
    pub amplitude: f64,
}

impl Default for CarrierParams {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            carrier_freq: DEFAULT_CARRIER_FREQ,
            amplitude: DEFAULT_AMPLITUDE,
        }
    }
}

impl CarrierParams {
    /// Create carrier parameters
    pub fn new(sample_rate: f64, carrier_freq: f64, amplitude: f64) -> Self {
        Self {
            sample_rate,
            carrier_freq,
            amplitude,
        }
    }

    /// Check that the parameters describe a usable carrier
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(CodecError::InvalidParameter(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !(self.carrier_freq.is_finite() && self.carrier_freq > 0.0) {
            return Err(CodecError::InvalidParameter(format!(
                "carrier frequency must be positive, got {}",
                self.carrier_freq
            )));
        }
        if !(self.amplitude.is_finite() && self.amplitude >= 0.0) {
            return Err(CodecError::InvalidParameter(format!(
                "amplitude must be non-negative, got {}",
                self.amplitude
            )));
        }
        Ok(())
    }

    /// Number of samples covering `duration` seconds (rounded, at least 1)
    pub fn samples_for(&self, duration: f64) -> usize {
        ((self.sample_rate * duration).round() as usize).max(1)
    }

    /// Angular frequency in radians per sample for `freq` Hz
    #[inline]
    pub fn omega(&self, freq: f64) -> f64 {
        2.0 * PI * freq / self.sample_rate
    }

    /// `amplitude · sin(2π·freq·n/Fs)` for `n` in `0..len`
    pub fn sine(&self, freq: f64, amplitude: f64, len: usize) -> Vec<f64> {
        let omega = self.omega(freq);
        (0..len).map(|n| amplitude * (omega * n as f64).sin()).collect()
    }

    /// `amplitude · cos(2π·freq·n/Fs)` for `n` in `0..len`
    pub fn cosine(&self, freq: f64, amplitude: f64, len: usize) -> Vec<f64> {
        let omega = self.omega(freq);
        (0..len).map(|n| amplitude * (omega * n as f64).cos()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = CarrierParams::default();
        assert_eq!(p.sample_rate, 1000.0);
        assert_eq!(p.carrier_freq, 5.0);
        assert_eq!(p.amplitude, 1.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_samples_for() {
        let p = CarrierParams::default();
        assert_eq!(p.samples_for(1.0), 1000);
        assert_eq!(p.samples_for(2.0), 2000);
        assert_eq!(p.samples_for(0.0015), 2);
        assert_eq!(p.samples_for(0.0), 1);
    }

    #[test]
    fn test_sine_starts_at_zero() {
        let p = CarrierParams::default();
        let s = p.sine(5.0, 1.0, 1000);
        assert_eq!(s.len(), 1000);
        assert!(s[0].abs() < 1e-12);
        // Quarter period of 5 Hz at 1 kHz is 50 samples
        assert!((s[50] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_bad_rate() {
        let p = CarrierParams::new(0.0, 5.0, 1.0);
        assert_eq!(p.validate().unwrap_err().reason(), "invalid_parameter");
        let p = CarrierParams::new(1000.0, -1.0, 1.0);
        assert!(p.validate().is_err());
    }
}
