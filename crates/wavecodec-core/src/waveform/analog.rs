//! Analog modulation (a sampled message onto a carrier)
//!
//! ```text
//! AM:  s[n] = (1 + m[n]) · A·cos(2πFc n/Fs)
//! FM:  s[n] = A·cos(2πFc n/Fs + 2π·kf·Σ_{k≤n} m[k]/Fs)
//! PM:  s[n] = A·cos(2πFc n/Fs + kp·m[n])
//! ```
//!
//! The demodulators are approximations built from moving averages and
//! finite differences. They recover the shape of the message, not its exact
//! amplitude, and every output has the input's length.
//!
//! AM expects the message in roughly `[-1, 1]`; beyond that the envelope
//! folds over and the detector no longer follows the message.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

use crate::dsp::{moving_average, remove_mean, unwrap_phase};
use crate::error::{CodecError, Result};
use crate::params::CarrierParams;
use crate::types::{scheme_key, SchemeInfo};

/// Default FM frequency sensitivity (Hz per unit amplitude)
pub const DEFAULT_FM_SENSITIVITY: f64 = 5.0;
/// Default PM phase sensitivity (radians per unit amplitude)
pub const DEFAULT_PM_SENSITIVITY: f64 = PI / 2.0;

/// Analog modulation schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalogScheme {
    /// Amplitude Modulation
    Am,
    /// Frequency Modulation
    Fm,
    /// Phase Modulation
    Pm,
}

impl AnalogScheme {
    /// All analog schemes, in display order
    pub fn all() -> &'static [AnalogScheme] {
        &[Self::Am, Self::Fm, Self::Pm]
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Scheme information
    pub fn info(&self) -> SchemeInfo {
        match self {
            Self::Am => SchemeInfo {
                name: "AM",
                full_name: "Amplitude Modulation",
                description: "Message rides on the carrier envelope; envelope detection",
            },
            Self::Fm => SchemeInfo {
                name: "FM",
                full_name: "Frequency Modulation",
                description: "Message shifts the instantaneous frequency; difference discriminator",
            },
            Self::Pm => SchemeInfo {
                name: "PM",
                full_name: "Phase Modulation",
                description: "Message shifts the carrier phase; quadrature phase detector",
            },
        }
    }
}

impl fmt::Display for AnalogScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AnalogScheme {
    type Err = CodecError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match scheme_key(s).as_str() {
            "AM" | "AMPLITUDEMODULATION" => Ok(Self::Am),
            "FM" | "FREQUENCYMODULATION" => Ok(Self::Fm),
            "PM" | "PHASEMODULATION" => Ok(Self::Pm),
            _ => Err(CodecError::UnknownScheme(s.to_string())),
        }
    }
}

/// Modulator/demodulator for the analog schemes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogModem {
    params: CarrierParams,
    fm_sensitivity: f64,
    pm_sensitivity: f64,
}

impl Default for AnalogModem {
    fn default() -> Self {
        Self::new(CarrierParams::default())
    }
}

impl AnalogModem {
    /// Create a modem with the default FM and PM sensitivities
    pub fn new(params: CarrierParams) -> Self {
        Self {
            params,
            fm_sensitivity: DEFAULT_FM_SENSITIVITY,
            pm_sensitivity: DEFAULT_PM_SENSITIVITY,
        }
    }

    /// Set the FM frequency sensitivity `kf`
    pub fn with_fm_sensitivity(mut self, kf: f64) -> Self {
        self.fm_sensitivity = kf;
        self
    }

    /// Set the PM phase sensitivity `kp`
    pub fn with_pm_sensitivity(mut self, kp: f64) -> Self {
        self.pm_sensitivity = kp;
        self
    }

    pub fn params(&self) -> &CarrierParams {
        &self.params
    }

    pub fn fm_sensitivity(&self) -> f64 {
        self.fm_sensitivity
    }

    pub fn pm_sensitivity(&self) -> f64 {
        self.pm_sensitivity
    }

    /// Modulate `message` with `scheme`
    pub fn modulate(&self, message: &[f64], scheme: AnalogScheme) -> Vec<f64> {
        trace!(samples = message.len(), %scheme, "analog modulate");
        match scheme {
            AnalogScheme::Am => self.modulate_am(message),
            AnalogScheme::Fm => self.modulate_fm(message),
            AnalogScheme::Pm => self.modulate_pm(message),
        }
    }

    /// Demodulate `signal` with `scheme`
    pub fn demodulate(&self, signal: &[f64], scheme: AnalogScheme) -> Vec<f64> {
        trace!(samples = signal.len(), %scheme, "analog demodulate");
        match scheme {
            AnalogScheme::Am => self.demodulate_am(signal),
            AnalogScheme::Fm => self.demodulate_fm(signal),
            AnalogScheme::Pm => self.demodulate_pm(signal),
        }
    }

    pub fn modulate_am(&self, message: &[f64]) -> Vec<f64> {
        let omega = self.params.omega(self.params.carrier_freq);
        let amp = self.params.amplitude;
        message
            .iter()
            .enumerate()
            .map(|(n, m)| (1.0 + m) * amp * (omega * n as f64).cos())
            .collect()
    }

    /// Envelope detector: `|s|` with its mean removed
    pub fn demodulate_am(&self, signal: &[f64]) -> Vec<f64> {
        let mut envelope: Vec<f64> = signal.iter().map(|s| s.abs()).collect();
        remove_mean(&mut envelope);
        envelope
    }

    pub fn modulate_fm(&self, message: &[f64]) -> Vec<f64> {
        let omega = self.params.omega(self.params.carrier_freq);
        let amp = self.params.amplitude;
        let dt = 1.0 / self.params.sample_rate;
        let deviation = 2.0 * PI * self.fm_sensitivity;

        let mut integral = 0.0;
        message
            .iter()
            .enumerate()
            .map(|(n, m)| {
                integral += m * dt;
                amp * (omega * n as f64 + deviation * integral).cos()
            })
            .collect()
    }

    /// Difference discriminator.
    ///
    /// `|s[n+1] - s[n]|` tracks the instantaneous frequency; a moving average
    /// of half a carrier period smooths it, and the mean is removed. The
    /// output is padded back to the input's length by repeating its last
    /// value. Fewer than two samples carry no frequency information and
    /// demodulate to zeros.
    pub fn demodulate_fm(&self, signal: &[f64]) -> Vec<f64> {
        if signal.len() < 2 {
            return vec![0.0; signal.len()];
        }

        let envelope: Vec<f64> = signal.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        let window = self.carrier_window(0.5);
        let mut out = moving_average(&envelope, window);
        remove_mean(&mut out);
        if let Some(&last) = out.last() {
            out.push(last);
        }
        out
    }

    pub fn modulate_pm(&self, message: &[f64]) -> Vec<f64> {
        let omega = self.params.omega(self.params.carrier_freq);
        let amp = self.params.amplitude;
        message
            .iter()
            .enumerate()
            .map(|(n, m)| amp * (omega * n as f64 + self.pm_sensitivity * m).cos())
            .collect()
    }

    /// Quadrature phase detector.
    ///
    /// Mixes with `cos`/`sin` at `Fc`, smooths both arms over one carrier
    /// period, takes `atan2(Q, I)`, unwraps, subtracts the carrier ramp
    /// `2πFc t` and removes the mean.
    pub fn demodulate_pm(&self, signal: &[f64]) -> Vec<f64> {
        if signal.is_empty() {
            return Vec::new();
        }

        let fc = self.params.carrier_freq;
        let cos_ref = self.params.cosine(fc, 1.0, signal.len());
        let sin_ref = self.params.sine(fc, 1.0, signal.len());
        let in_phase: Vec<f64> = signal.iter().zip(&cos_ref).map(|(s, c)| s * c).collect();
        let quadrature: Vec<f64> = signal.iter().zip(&sin_ref).map(|(s, q)| s * q).collect();

        let window = self.carrier_window(1.0);
        let in_phase = moving_average(&in_phase, window);
        let quadrature = moving_average(&quadrature, window);

        let phase: Vec<f64> = quadrature
            .iter()
            .zip(&in_phase)
            .map(|(q, i)| q.atan2(*i))
            .collect();

        let omega = self.params.omega(fc);
        let mut out: Vec<f64> = unwrap_phase(&phase)
            .into_iter()
            .enumerate()
            .map(|(n, p)| p - omega * n as f64)
            .collect();
        remove_mean(&mut out);
        out
    }

    /// Moving-average window covering `periods` carrier periods (at least 1)
    fn carrier_window(&self, periods: f64) -> usize {
        let window = (periods * self.params.sample_rate / self.params.carrier_freq).round();
        if window.is_finite() && window >= 1.0 {
            window as usize
        } else {
            1
        }
    }
}

/// Check that `kf` and `kp` are usable sensitivities
pub(crate) fn validate_sensitivity(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(CodecError::InvalidParameter(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{correlate, mean};

    fn message() -> Vec<f64> {
        (0..1000)
            .map(|n| 0.5 * (2.0 * PI * 2.0 * n as f64 / 1000.0).sin())
            .collect()
    }

    fn interior_correlation(recovered: &[f64], message: &[f64]) -> f64 {
        let edge = 100;
        let end = message.len() - edge;
        let m = &message[edge..end];
        let r = &recovered[edge..end];
        let m_mean = mean(m);
        let r_mean = mean(r);
        m.iter()
            .zip(r)
            .map(|(a, b)| (a - m_mean) * (b - r_mean))
            .sum()
    }

    #[test]
    fn test_am_modulate() {
        let modem = AnalogModem::default();
        let signal = modem.modulate_am(&[0.0, 0.5, -0.5]);
        assert_eq!(signal.len(), 3);
        assert!((signal[0] - 1.0).abs() < 1e-12);
        let omega = 2.0 * PI * 5.0 / 1000.0;
        assert!((signal[1] - 1.5 * omega.cos()).abs() < 1e-12);
    }

    #[test]
    fn test_am_recovers_shape() {
        let modem = AnalogModem::default();
        let msg = message();
        let recovered = modem.demodulate(&modem.modulate(&msg, AnalogScheme::Am), AnalogScheme::Am);
        assert_eq!(recovered.len(), msg.len());
        assert!(mean(&recovered).abs() < 1e-9);
        assert!(interior_correlation(&recovered, &msg) > 0.0);
    }

    #[test]
    fn test_fm_unmodulated_is_carrier() {
        let modem = AnalogModem::default();
        let signal = modem.modulate_fm(&[0.0; 100]);
        let carrier = CarrierParams::default().cosine(5.0, 1.0, 100);
        for (a, b) in signal.iter().zip(&carrier) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fm_recovers_shape() {
        let modem = AnalogModem::default();
        let msg = message();
        let recovered = modem.demodulate(&modem.modulate(&msg, AnalogScheme::Fm), AnalogScheme::Fm);
        assert_eq!(recovered.len(), msg.len());
        assert!(recovered.iter().all(|v| v.is_finite()));
        // Last sample repeats the one before it
        assert_eq!(recovered[999], recovered[998]);
        assert!(interior_correlation(&recovered, &msg) > 0.0);
    }

    #[test]
    fn test_fm_short_input() {
        let modem = AnalogModem::default();
        assert!(modem.demodulate_fm(&[]).is_empty());
        assert_eq!(modem.demodulate_fm(&[0.3]), vec![0.0]);
        assert_eq!(modem.demodulate_fm(&[0.3, 0.7]).len(), 2);
    }

    #[test]
    fn test_pm_modulate() {
        let modem = AnalogModem::default().with_pm_sensitivity(PI);
        let signal = modem.modulate_pm(&[1.0]);
        assert!((signal[0] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pm_demodulate_shape() {
        let modem = AnalogModem::default();
        let msg = message();
        let recovered = modem.demodulate(&modem.modulate(&msg, AnalogScheme::Pm), AnalogScheme::Pm);
        assert_eq!(recovered.len(), msg.len());
        assert!(recovered.iter().all(|v| v.is_finite()));
        assert!(mean(&recovered).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input() {
        let modem = AnalogModem::default();
        for &scheme in AnalogScheme::all() {
            assert!(modem.modulate(&[], scheme).is_empty());
            assert!(modem.demodulate(&[], scheme).is_empty());
        }
    }

    #[test]
    fn test_carrier_window() {
        let modem = AnalogModem::default();
        assert_eq!(modem.carrier_window(0.5), 100);
        assert_eq!(modem.carrier_window(1.0), 200);
        let fast = AnalogModem::new(CarrierParams::new(10.0, 40.0, 1.0));
        assert_eq!(fast.carrier_window(0.5), 1);
    }

    #[test]
    fn test_am_zero_message_correlates_with_carrier() {
        let modem = AnalogModem::default();
        let signal = modem.modulate_am(&[0.0; 200]);
        let carrier = CarrierParams::default().cosine(5.0, 1.0, 200);
        assert!((correlate(&signal, &carrier) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_validate_sensitivity() {
        assert!(validate_sensitivity("kf", 5.0).is_ok());
        assert!(validate_sensitivity("kf", f64::NAN).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("AM (Amplitude Mod)".parse::<AnalogScheme>().unwrap(), AnalogScheme::Am);
        assert_eq!("fm".parse::<AnalogScheme>().unwrap(), AnalogScheme::Fm);
        assert_eq!("Phase Modulation".parse::<AnalogScheme>().unwrap(), AnalogScheme::Pm);
        assert!("SSB".parse::<AnalogScheme>().is_err());
    }
}
