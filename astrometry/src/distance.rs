//! Great-circle angular distance on the celestial sphere.
//!
//! Uses the haversine formulation, which stays well conditioned for the small
//! separations typical of cone searches:
//!
//! ```text
//! d = 2 * asin( sqrt( sin²(Δδ/2) + cos δ₁ cos δ₂ sin²(Δα/2) ) )
//! ```
//!
//! The `asin` argument is clamped to `[0, 1]` so rounding near antipodal points
//! cannot produce NaN.

use ndarray::{Array1, ArrayView1, Zip};

use crate::error::AstrometryError;

/// Angular distance between two points, all values in degrees.
///
/// # Examples
///
/// ```rust
/// use astrometry::distance::angular_separation;
///
/// let d = angular_separation(0.0, 0.0, 0.0, 1.0);
/// assert!((d - 1.0).abs() < 1e-12);
/// ```
pub fn angular_separation(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let dec1_rad = dec1.to_radians();
    let dec2_rad = dec2.to_radians();
    let d_ra = (ra1 - ra2).to_radians();
    let d_dec = dec1_rad - dec2_rad;

    let h = (d_dec / 2.0).sin().powi(2)
        + dec1_rad.cos() * dec2_rad.cos() * (d_ra / 2.0).sin().powi(2);

    (2.0 * h.sqrt().clamp(0.0, 1.0).asin()).to_degrees()
}

/// Distances from every `(ra[i], dec[i])` to a single reference point.
///
/// Evaluated in parallel; output index `i` always corresponds to input `i`.
pub fn angular_separation_many(
    ra: ArrayView1<f64>,
    dec: ArrayView1<f64>,
    ra0: f64,
    dec0: f64,
) -> Result<Array1<f64>, AstrometryError> {
    if ra.len() != dec.len() {
        return Err(AstrometryError::MismatchedLengths(ra.len(), dec.len()));
    }

    Ok(Zip::from(&ra)
        .and(&dec)
        .par_map_collect(|&r, &d| angular_separation(r, d, ra0, dec0)))
}
