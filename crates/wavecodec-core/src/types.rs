//! Core types shared by every codec
//!
//! Bits and samples are plain vectors, the way the rest of the engine
//! passes them around:
//!
//! - A **bit** is a `u8`; `0` is a zero bit and any non-zero value is a one.
//! - A **sample** is an `f64` amplitude. Sequences are implicitly indexed at
//!   the sample rate `Fs`, so sample `n` sits at time `n / Fs`.
//!
//! Text bit strings (`"01101"`) only exist at the boundary. [`parse_bits`]
//! validates them and [`format_bits`] renders decoder output back to text.

use serde::Serialize;

use crate::error::{CodecError, Result};

/// A single binary symbol (`0` or `1`)
pub type Bit = u8;

/// An ordered sequence of bits
pub type BitStream = Vec<Bit>;

/// Descriptive information about a scheme, for listings and front ends
#[derive(Debug, Clone, Serialize)]
pub struct SchemeInfo {
    /// Short name (e.g., "NRZ-L", "4-QAM")
    pub name: &'static str,
    /// Full name (e.g., "Non-Return-to-Zero Level")
    pub full_name: &'static str,
    /// Brief description of the encoding rule
    pub description: &'static str,
}

/// Parse a text bit string into bits.
///
/// Only `'0'` and `'1'` are accepted; anything else is reported with its
/// position so the caller can point at it.
pub fn parse_bits(text: &str) -> Result<BitStream> {
    text.chars()
        .enumerate()
        .map(|(position, symbol)| match symbol {
            '0' => Ok(0),
            '1' => Ok(1),
            _ => Err(CodecError::InvalidSymbol { position, symbol }),
        })
        .collect()
}

/// Render bits as a `0`/`1` string
pub fn format_bits(bits: &[Bit]) -> String {
    bits.iter().map(|&b| if b != 0 { '1' } else { '0' }).collect()
}

/// Normalize a scheme name for matching.
///
/// Drops any parenthesised suffix ("AM (Amplitude Mod)"), then keeps only
/// alphanumerics, uppercased. "Diff. Manchester", "diff-manchester" and
/// "DIFFMANCHESTER" all compare equal.
pub(crate) fn scheme_key(name: &str) -> String {
    let head = name.split('(').next().unwrap_or(name);
    head.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
