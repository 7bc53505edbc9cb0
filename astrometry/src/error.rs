//! Error types shared by the astrometry routines.

use thiserror::Error;

/// Errors raised by angle parsing, frame transforms and elementwise queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstrometryError {
    /// Angle text could not be decoded as a three-part sexagesimal value.
    #[error("Cannot parse '{input}' as a sexagesimal angle: {reason}")]
    Format { input: String, reason: String },

    /// Frame transform direction outside 1..=6.
    #[error("Invalid frame transform selector {0}, expected a value in 1..=6")]
    InvalidSelector(u8),

    /// Elementwise inputs must have the same length.
    #[error("Input arrays must have the same length (got {0} and {1})")]
    MismatchedLengths(usize, usize),
}

impl AstrometryError {
    pub(crate) fn format(input: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
