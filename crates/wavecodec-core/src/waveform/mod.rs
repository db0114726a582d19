//! Carrier modulation
//!
//! Two modems share the same [`CarrierParams`]:
//!
//! - [`DigitalModem`]: bits onto a sinusoidal carrier (ASK, BPSK, BFSK, 4-QAM)
//!   and back, with one decision per symbol interval.
//! - [`AnalogModem`]: a sampled message onto a carrier (AM, FM, PM) and the
//!   matching approximate demodulators.
//!
//! ```rust
//! use wavecodec_core::params::CarrierParams;
//! use wavecodec_core::waveform::{DigitalModem, DigitalScheme};
//!
//! let modem = DigitalModem::new(CarrierParams::default());
//! let waveform = modem.modulate(&[1, 0], DigitalScheme::Ask);
//! assert_eq!(modem.demodulate(&waveform, DigitalScheme::Ask), vec![1, 0]);
//! ```
//!
//! [`CarrierParams`]: crate::params::CarrierParams

pub mod analog;
pub mod digital;

pub use analog::{AnalogModem, AnalogScheme};
pub use digital::{DigitalModem, DigitalScheme};
