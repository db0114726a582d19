//! Error types for the codec engine.

use thiserror::Error;

/// Codec error type
///
/// The transforms themselves never fail; these errors come from the
/// boundary (parsing bit strings and scheme names, validating parameters
/// and configuration).
#[derive(Error, Debug)]
pub enum CodecError {
    /// A bit string contained something other than `0` or `1`
    #[error("invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol {
        /// Zero-based character position in the input
        position: usize,
        /// The offending character
        symbol: char,
    },

    /// A scheme, algorithm or mode name did not match any known variant
    #[error("unknown scheme: {0}")]
    UnknownScheme(String),

    /// A numeric parameter is outside its valid range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Stable, machine-readable reason for this failure.
    ///
    /// Front ends key their messages off this rather than the display text.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidSymbol { .. } => "invalid_symbol",
            Self::UnknownScheme(_) => "unknown_scheme",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        let err = CodecError::InvalidSymbol { position: 3, symbol: 'x' };
        assert_eq!(err.reason(), "invalid_symbol");
        assert_eq!(err.to_string(), "invalid symbol 'x' at position 3");

        let err = CodecError::UnknownScheme("FOO".into());
        assert_eq!(err.reason(), "unknown_scheme");
        assert_eq!(err.to_string(), "unknown scheme: FOO");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CodecError = io.into();
        assert_eq!(err.reason(), "io");
    }
}
