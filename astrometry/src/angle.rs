//! Sexagesimal angle decoding.
//!
//! Catalog positions often arrive as text such as `"12:30:00"` (hours of right
//! ascension) or `"-05 30 00"` (degrees of declination). This module turns such
//! strings into decimal degrees.
//!
//! # Format
//!
//! ```text
//! [-]A<delim>M<delim>S
//! ```
//!
//! - Exactly three tokens after splitting on the delimiter; `S` may carry a
//!   fractional part.
//! - A leading `-` negates the whole value, so `"-00:30:00"` is half a degree
//!   below zero even though the first token is zero.
//! - Colon and single space are the two delimiters recognised by
//!   [`detect_delimiter`].
//!
//! # Examples
//!
//! ```rust
//! use astrometry::angle::{hms_to_deg, dms_to_deg};
//!
//! assert_eq!(hms_to_deg("12:30:00", ':').unwrap(), 187.5);
//! assert_eq!(dms_to_deg("-10 30 00", ' ').unwrap(), -10.5);
//! ```

use ndarray::Array1;

use crate::error::AstrometryError;

/// Colon delimiter, as in `12:30:00`.
pub const COLON: char = ':';

/// Space delimiter, as in `12 30 00`.
pub const SPACE: char = ' ';

/// Delimiters probed by [`detect_delimiter`], in priority order.
pub const DELIMITERS: [char; 2] = [COLON, SPACE];

/// Unit of the leading sexagesimal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SexagesimalUnit {
    /// Hours, minutes, seconds of time (right ascension)
    Hours,
    /// Degrees, arcminutes, arcseconds (declination, latitude)
    Degrees,
}

impl SexagesimalUnit {
    /// Decode `text` split on `delim` into decimal degrees.
    pub fn to_degrees(self, text: &str, delim: char) -> Result<f64, AstrometryError> {
        let (sign, [lead, minutes, seconds]) = split_fields(text, delim)?;
        let value = (seconds / 60.0 + minutes) / 60.0 + lead;
        let degrees = match self {
            Self::Hours => value / 24.0 * 360.0,
            Self::Degrees => value,
        };
        Ok(sign * degrees)
    }
}

/// Find the delimiter that splits `text` into exactly three fields.
///
/// Colon is tried before space. Returns `None` when neither works.
pub fn detect_delimiter(text: &str) -> Option<char> {
    let trimmed = text.trim();
    DELIMITERS
        .into_iter()
        .find(|&delim| trimmed.split(delim).count() == 3)
}

/// Convert an `H:M:S` hour-angle string into degrees.
pub fn hms_to_deg(text: &str, delim: char) -> Result<f64, AstrometryError> {
    SexagesimalUnit::Hours.to_degrees(text, delim)
}

/// Convert a `D:M:S` string into degrees.
pub fn dms_to_deg(text: &str, delim: char) -> Result<f64, AstrometryError> {
    SexagesimalUnit::Degrees.to_degrees(text, delim)
}

/// Convert an hour-angle string, detecting the delimiter first.
pub fn parse_hms(text: &str) -> Result<f64, AstrometryError> {
    parse_auto(SexagesimalUnit::Hours, text)
}

/// Convert a degree string, detecting the delimiter first.
pub fn parse_dms(text: &str) -> Result<f64, AstrometryError> {
    parse_auto(SexagesimalUnit::Degrees, text)
}

/// Decode every entry of `values` with a fixed delimiter.
///
/// Fails on the first malformed entry; no partial output is returned.
pub fn sexagesimal_to_deg_many<S: AsRef<str>>(
    values: &[S],
    unit: SexagesimalUnit,
    delim: char,
) -> Result<Array1<f64>, AstrometryError> {
    values
        .iter()
        .map(|value| unit.to_degrees(value.as_ref(), delim))
        .collect::<Result<Vec<_>, _>>()
        .map(Array1::from)
}

fn parse_auto(unit: SexagesimalUnit, text: &str) -> Result<f64, AstrometryError> {
    let delim = detect_delimiter(text).ok_or_else(|| {
        AstrometryError::format(text, "expected three fields separated by ':' or ' '")
    })?;
    unit.to_degrees(text, delim)
}

fn split_fields(text: &str, delim: char) -> Result<(f64, [f64; 3]), AstrometryError> {
    let trimmed = text.trim();
    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed),
    };

    let tokens: Vec<&str> = body.split(delim).collect();
    if tokens.len() != 3 {
        return Err(AstrometryError::format(
            text,
            format!("expected 3 fields separated by {delim:?}, found {}", tokens.len()),
        ));
    }

    let mut fields = [0.0; 3];
    for (field, token) in fields.iter_mut().zip(&tokens) {
        *field = token
            .trim()
            .parse::<f64>()
            .map_err(|_| AstrometryError::format(text, format!("'{token}' is not a number")))?;
    }

    Ok((sign, fields))
}
