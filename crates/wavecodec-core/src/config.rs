//! # Configuration
//!
//! JSON configuration holding every tunable default of the engine: the
//! carrier, the symbol duration and the per-scheme parameters.
//!
//! ## Search Path
//!
//! [`CodecConfig::load`] uses the first file found:
//! 1. Path in the `WAVECODEC_CONFIG` environment variable
//! 2. `./wavecodec.json`
//!
//! and falls back to the defaults when neither exists.
//!
//! ## Example
//!
//! ```json
//! {
//!   "carrier": { "sample_rate": 1000.0, "carrier_freq": 5.0, "amplitude": 1.0 },
//!   "symbol_duration": 1.0,
//!   "pcm_bit_depth": 3,
//!   "delta_step": 0.1
//! }
//! ```
//!
//! Missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CodecError, Result};
use crate::params::CarrierParams;
use crate::source_coding::{
    DeltaModulator, PcmCodec, DEFAULT_BIT_DEPTH, DEFAULT_DELTA_STEP, MAX_BIT_DEPTH,
};
use crate::waveform::analog::{
    validate_sensitivity, AnalogModem, DEFAULT_FM_SENSITIVITY, DEFAULT_PM_SENSITIVITY,
};
use crate::waveform::digital::{DigitalModem, DEFAULT_FREQ_DEVIATION, DEFAULT_SYMBOL_DURATION};

/// Environment variable naming a configuration file
pub const CONFIG_ENV_VAR: &str = "WAVECODEC_CONFIG";
/// Configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "wavecodec.json";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Carrier shared by both modems
    pub carrier: CarrierParams,
    /// Digital symbol duration `T` in seconds
    pub symbol_duration: f64,
    /// PCM bits per sample
    pub pcm_bit_depth: u32,
    /// Delta-modulation step size
    pub delta_step: f64,
    /// BFSK frequency deviation in Hz
    pub fsk_deviation: f64,
    /// FM frequency sensitivity `kf`
    pub fm_sensitivity: f64,
    /// PM phase sensitivity `kp` in radians
    pub pm_sensitivity: f64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            carrier: CarrierParams::default(),
            symbol_duration: DEFAULT_SYMBOL_DURATION,
            pcm_bit_depth: DEFAULT_BIT_DEPTH,
            delta_step: DEFAULT_DELTA_STEP,
            fsk_deviation: DEFAULT_FREQ_DEVIATION,
            fm_sensitivity: DEFAULT_FM_SENSITIVITY,
            pm_sensitivity: DEFAULT_PM_SENSITIVITY,
        }
    }
}

impl CodecConfig {
    /// Load configuration from the default search path.
    ///
    /// Returns the defaults if no file is found.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = Path::new(&path);
            if path.exists() {
                return Self::load_from(path);
            }
            debug!(path = %path.display(), "{} points to a missing file", CONFIG_ENV_VAR);
        }

        for path in Self::config_search_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CodecError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loading configuration");
        Self::parse(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn parse(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Configuration files checked after the environment variable
    pub fn config_search_paths() -> Vec<PathBuf> {
        vec![PathBuf::from(".").join(CONFIG_FILE_NAME)]
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.carrier
            .validate()
            .map_err(|e| CodecError::Config(e.to_string()))?;

        if !(self.symbol_duration.is_finite() && self.symbol_duration > 0.0) {
            return Err(CodecError::Config(
                "symbol_duration must be positive".to_string(),
            ));
        }
        if !(1..=MAX_BIT_DEPTH).contains(&self.pcm_bit_depth) {
            return Err(CodecError::Config(format!(
                "pcm_bit_depth must be 1-{}",
                MAX_BIT_DEPTH
            )));
        }
        if !(self.delta_step.is_finite() && self.delta_step > 0.0) {
            return Err(CodecError::Config("delta_step must be positive".to_string()));
        }
        if !(self.fsk_deviation.is_finite() && self.fsk_deviation > 0.0) {
            return Err(CodecError::Config(
                "fsk_deviation must be positive".to_string(),
            ));
        }
        let nyquist = self.carrier.sample_rate / 2.0;
        if self.carrier.carrier_freq + self.fsk_deviation >= nyquist {
            return Err(CodecError::Config(format!(
                "carrier_freq + fsk_deviation must stay below Nyquist ({} Hz)",
                nyquist
            )));
        }
        validate_sensitivity("fm_sensitivity", self.fm_sensitivity)
            .and_then(|_| validate_sensitivity("pm_sensitivity", self.pm_sensitivity))
            .map_err(|e| CodecError::Config(e.to_string()))?;

        Ok(())
    }

    /// Digital modem for this configuration
    pub fn digital_modem(&self) -> Result<DigitalModem> {
        Ok(DigitalModem::new(self.carrier)
            .with_symbol_duration(self.symbol_duration)?
            .with_freq_deviation(self.fsk_deviation)?)
    }

    /// Analog modem for this configuration
    pub fn analog_modem(&self) -> AnalogModem {
        AnalogModem::new(self.carrier)
            .with_fm_sensitivity(self.fm_sensitivity)
            .with_pm_sensitivity(self.pm_sensitivity)
    }

    pub fn pcm(&self) -> Result<PcmCodec> {
        PcmCodec::new(self.pcm_bit_depth)
    }

    pub fn delta(&self) -> Result<DeltaModulator> {
        DeltaModulator::new(self.delta_step)
    }
}
