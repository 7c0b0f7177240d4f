// Decode error taxonomy.
//
// Every failure is a caller-input problem: the codec is deterministic and
// never retries. Positions are zero-based character offsets into the input.

use thiserror::Error;

/// Error returned when an encoded polyline cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// A character outside the `'?'..='~'` window.
    #[error("Invalid Google Polyline \"{polyline}\". '{character}' at position {position}")]
    InvalidCharacter {
        polyline: String,
        position: usize,
        character: char,
    },

    /// The input ended mid-value or mid-coordinate. `position` is where the
    /// missing chunk would begin.
    #[error("Invalid Google Polyline \"{polyline}\". Input ends inside a coordinate at position {position}")]
    TruncatedInput { polyline: String, position: usize },

    /// A value chunk run starting at `position` carries more than 64 bits.
    #[error("Invalid Google Polyline \"{polyline}\". Value at position {position} overflows 64 bits")]
    ValueOverflow { polyline: String, position: usize },
}

impl PolylineError {
    /// The offending input.
    pub fn polyline(&self) -> &str {
        match self {
            Self::InvalidCharacter { polyline, .. }
            | Self::TruncatedInput { polyline, .. }
            | Self::ValueOverflow { polyline, .. } => polyline,
        }
    }

    /// Zero-based character offset at which decoding diverged.
    pub fn position(&self) -> usize {
        match self {
            Self::InvalidCharacter { position, .. }
            | Self::TruncatedInput { position, .. }
            | Self::ValueOverflow { position, .. } => *position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_character_message() {
        let err = PolylineError::InvalidCharacter {
            polyline: "ab cd".into(),
            position: 2,
            character: ' ',
        };
        assert_eq!(
            err.to_string(),
            "Invalid Google Polyline \"ab cd\". ' ' at position 2"
        );
        assert_eq!(err.position(), 2);
        assert_eq!(err.polyline(), "ab cd");
    }

    #[test]
    fn truncated_accessors() {
        let err = PolylineError::TruncatedInput {
            polyline: "_p~iF".into(),
            position: 5,
        };
        assert_eq!(err.position(), 5);
        assert!(err.to_string().contains("position 5"));
    }
}
