//! Rotations between equatorial, galactic and ecliptic coordinates.
//!
//! Each of the six supported directions is a fixed composition of three
//! rotations described by four constants (ψ, sin θ, cos θ, φ). The constants are
//! tabulated for two equinoxes and never recomputed at runtime.
//!
//! # Reference values (J2000, Hipparcos explanatory supplement)
//!
//! ```text
//! eps    = 23.4392911111°   obliquity of the ecliptic
//! alphaG = 192.85948°       RA of the galactic north pole
//! deltaG = 27.12825°        Dec of the galactic north pole
//! lomega = 32.93192°        galactic longitude of the celestial equator
//! alphaE = 180.02322°       ecliptic longitude of the galactic north pole
//! deltaE = 29.811438523°    ecliptic latitude of the galactic north pole
//! Eomega = 6.3839743°       galactic longitude of the ecliptic equator
//! ```
//!
//! # Examples
//!
//! ```rust
//! use astrometry::frames::{euler, Equinox, FrameTransform};
//!
//! // The galactic north pole maps to b = +90°
//! let (_, b) = euler(192.85948, 27.12825, FrameTransform::EquatorialToGalactic, Equinox::J2000);
//! assert!((b - 90.0).abs() < 1e-3);
//! ```

use std::f64::consts::TAU;

use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

use crate::error::AstrometryError;

/// Reference epoch of the equatorial and ecliptic frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Equinox {
    /// FK5 / ICRS-aligned equinox J2000.0
    #[default]
    J2000,
    /// FK4 equinox B1950.0
    B1950,
}

impl std::fmt::Display for Equinox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Equinox::J2000 => write!(f, "J2000"),
            Equinox::B1950 => write!(f, "B1950"),
        }
    }
}

/// Direction of a frame rotation.
///
/// The discriminants match the conventional integer selectors 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameTransform {
    EquatorialToGalactic = 1,
    GalacticToEquatorial = 2,
    EquatorialToEcliptic = 3,
    EclipticToEquatorial = 4,
    EclipticToGalactic = 5,
    GalacticToEcliptic = 6,
}

impl FrameTransform {
    /// All directions in selector order.
    pub const ALL: [FrameTransform; 6] = [
        FrameTransform::EquatorialToGalactic,
        FrameTransform::GalacticToEquatorial,
        FrameTransform::EquatorialToEcliptic,
        FrameTransform::EclipticToEquatorial,
        FrameTransform::EclipticToGalactic,
        FrameTransform::GalacticToEcliptic,
    ];

    /// Look up a direction from its integer selector.
    pub fn from_select(select: u8) -> Result<Self, AstrometryError> {
        match select {
            1..=6 => Ok(Self::ALL[usize::from(select - 1)]),
            other => Err(AstrometryError::InvalidSelector(other)),
        }
    }

    /// Integer selector of this direction.
    pub fn select(self) -> u8 {
        self as u8
    }

    /// The direction that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::EquatorialToGalactic => Self::GalacticToEquatorial,
            Self::GalacticToEquatorial => Self::EquatorialToGalactic,
            Self::EquatorialToEcliptic => Self::EclipticToEquatorial,
            Self::EclipticToEquatorial => Self::EquatorialToEcliptic,
            Self::EclipticToGalactic => Self::GalacticToEcliptic,
            Self::GalacticToEcliptic => Self::EclipticToGalactic,
        }
    }

    /// Rotation constants for this direction at the given equinox.
    pub fn constants(self, equinox: Equinox) -> &'static RotationConstants {
        let table = match equinox {
            Equinox::J2000 => &J2000_CONSTANTS,
            Equinox::B1950 => &B1950_CONSTANTS,
        };
        &table[usize::from(self.select() - 1)]
    }
}

/// Constants of one three-rotation composition, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationConstants {
    pub psi: f64,
    pub stheta: f64,
    pub ctheta: f64,
    pub phi: f64,
}

const fn rc(psi: f64, stheta: f64, ctheta: f64, phi: f64) -> RotationConstants {
    RotationConstants {
        psi,
        stheta,
        ctheta,
        phi,
    }
}

/// J2000 constants indexed by `select - 1`.
pub const J2000_CONSTANTS: [RotationConstants; 6] = [
    rc(0.57477043300, 0.88998808748, 0.45598377618, 4.9368292465),
    rc(4.9368292465, -0.88998808748, 0.45598377618, 0.57477043300),
    rc(0.0, 0.39777715593, 0.91748206207, 0.0),
    rc(0.0, -0.39777715593, 0.91748206207, 0.0),
    rc(0.11142137093, 0.86766622025, 0.49714719172, 4.71279419371),
    rc(4.71279419371, -0.86766622025, 0.49714719172, 0.11142137093),
];

/// B1950 constants indexed by `select - 1`.
pub const B1950_CONSTANTS: [RotationConstants; 6] = [
    rc(0.57595865315, 0.88781538514, 0.46019978478, 4.9261918136),
    rc(4.9261918136, -0.88781538514, 0.46019978478, 0.57595865315),
    rc(0.0, 0.39788119938, 0.91743694670, 0.0),
    rc(0.0, -0.39788119938, 0.91743694670, 0.0),
    rc(0.11129056012, 0.86766174755, 0.49715499774, 4.7005372834),
    rc(4.7005372834, -0.86766174755, 0.49715499774, 0.11129056012),
];

/// Rotate a single `(lon, lat)` pair, both in degrees.
///
/// Output longitude is normalised into `[0, 360)`. The `asin` argument for the
/// output latitude is clamped to `[-1, 1]` on both sides.
pub fn euler(lon: f64, lat: f64, transform: FrameTransform, equinox: Equinox) -> (f64, f64) {
    let c = transform.constants(equinox);

    let a = lon.to_radians() - c.phi;
    let b = lat.to_radians();
    let (sb, cb) = b.sin_cos();
    let cbsa = cb * a.sin();

    let b_sin = (-c.stheta * cbsa + c.ctheta * sb).clamp(-1.0, 1.0);
    let lat_out = b_sin.asin().to_degrees();

    let a_out = (c.ctheta * cbsa + c.stheta * sb).atan2(cb * a.cos());
    let lon_out = (a_out + c.psi).rem_euclid(TAU).to_degrees();

    // rem_euclid may round up to exactly TAU
    if lon_out >= 360.0 {
        (lon_out - 360.0, lat_out)
    } else {
        (lon_out, lat_out)
    }
}

/// Rotate using the integer selector convention (1..=6).
pub fn euler_select(
    lon: f64,
    lat: f64,
    select: u8,
    equinox: Equinox,
) -> Result<(f64, f64), AstrometryError> {
    let transform = FrameTransform::from_select(select)?;
    Ok(euler(lon, lat, transform, equinox))
}

/// Rotate equal-length arrays of longitudes and latitudes.
pub fn euler_many(
    lon: ArrayView1<f64>,
    lat: ArrayView1<f64>,
    transform: FrameTransform,
    equinox: Equinox,
) -> Result<(Array1<f64>, Array1<f64>), AstrometryError> {
    if lon.len() != lat.len() {
        return Err(AstrometryError::MismatchedLengths(lon.len(), lat.len()));
    }

    let pairs = Zip::from(&lon)
        .and(&lat)
        .par_map_collect(|&l, &b| euler(l, b, transform, equinox));

    let lon_out = pairs.iter().map(|&(l, _)| l).collect();
    let lat_out = pairs.iter().map(|&(_, b)| b).collect();
    Ok((lon_out, lat_out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;
    use proptest::prelude::*;

    /// Smallest absolute difference between two longitudes, in degrees.
    fn lon_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_selector_bounds() {
        assert_eq!(
            FrameTransform::from_select(0),
            Err(AstrometryError::InvalidSelector(0))
        );
        assert_eq!(
            FrameTransform::from_select(7),
            Err(AstrometryError::InvalidSelector(7))
        );
        for (i, t) in FrameTransform::ALL.iter().enumerate() {
            assert_eq!(FrameTransform::from_select(i as u8 + 1).unwrap(), *t);
            assert_eq!(t.select() as usize, i + 1);
        }
    }

    #[test]
    fn test_inverse_pairs() {
        for t in FrameTransform::ALL {
            assert_eq!(t.inverse().inverse(), t);
            assert_ne!(t.inverse(), t);
        }
        assert_eq!(FrameTransform::EclipticToGalactic.inverse().select(), 6);
    }

    #[test]
    fn test_galactic_north_pole() {
        let (_, b) = euler(
            192.85948,
            27.12825,
            FrameTransform::EquatorialToGalactic,
            Equinox::J2000,
        );
        assert_abs_diff_eq!(b, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_celestial_pole_in_galactic() {
        // l of the north celestial pole is the complement of lomega
        let (l, b) = euler(0.0, 90.0, FrameTransform::EquatorialToGalactic, Equinox::J2000);
        assert_abs_diff_eq!(l, 122.93192, epsilon = 1e-4);
        assert_abs_diff_eq!(b, 27.12825, epsilon = 1e-4);
    }

    #[test]
    fn test_galactic_center() {
        let (ra, dec) = euler(0.0, 0.0, FrameTransform::GalacticToEquatorial, Equinox::J2000);
        assert_abs_diff_eq!(ra, 266.40499, epsilon = 1e-4);
        assert_abs_diff_eq!(dec, -28.93617, epsilon = 1e-4);
    }

    #[test]
    fn test_ecliptic_obliquity() {
        let (lon, lat) = euler(90.0, 0.0, FrameTransform::EquatorialToEcliptic, Equinox::J2000);
        assert_abs_diff_eq!(lon, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lat, -23.4392911111, epsilon = 1e-6);
    }

    #[test]
    fn test_longitude_range() {
        for t in FrameTransform::ALL {
            for lon in [-720.0, -90.0, 0.0, 123.4, 359.999, 1000.0] {
                let (l, _) = euler(lon, 12.0, t, Equinox::B1950);
                assert!((0.0..360.0).contains(&l), "{t:?} lon={lon} -> {l}");
            }
        }
    }

    #[test]
    fn test_equinoxes_differ() {
        let j = euler(10.0, 10.0, FrameTransform::EquatorialToGalactic, Equinox::J2000);
        let b = euler(10.0, 10.0, FrameTransform::EquatorialToGalactic, Equinox::B1950);
        assert!(lon_diff(j.0, b.0) > 0.1);
    }

    #[test]
    fn test_euler_select_matches_enum() {
        let via_select = euler_select(45.0, -30.0, 5, Equinox::J2000).unwrap();
        let via_enum = euler(45.0, -30.0, FrameTransform::EclipticToGalactic, Equinox::J2000);
        assert_eq!(via_select, via_enum);
        assert!(euler_select(45.0, -30.0, 9, Equinox::J2000).is_err());
    }

    #[test]
    fn test_euler_many() {
        let lon = array![0.0, 192.85948, 83.633];
        let lat = array![90.0, 27.12825, 22.0145];
        let (l, b) = euler_many(
            lon.view(),
            lat.view(),
            FrameTransform::EquatorialToGalactic,
            Equinox::J2000,
        )
        .unwrap();

        assert_eq!(l.len(), 3);
        for i in 0..3 {
            let (el, eb) = euler(
                lon[i],
                lat[i],
                FrameTransform::EquatorialToGalactic,
                Equinox::J2000,
            );
            assert_relative_eq!(l[i], el);
            assert_relative_eq!(b[i], eb);
        }

        let short = array![1.0];
        assert!(euler_many(
            lon.view(),
            short.view(),
            FrameTransform::EquatorialToGalactic,
            Equinox::J2000
        )
        .is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            lon in 0.0..360.0f64,
            lat in -89.0..89.0f64,
            select in 1u8..=6,
            b1950 in any::<bool>(),
        ) {
            let equinox = if b1950 { Equinox::B1950 } else { Equinox::J2000 };
            let forward = FrameTransform::from_select(select).unwrap();
            let (l1, b1) = euler(lon, lat, forward, equinox);
            let (l2, b2) = euler(l1, b1, forward.inverse(), equinox);

            // Tabulated constants are only orthonormal to ~1e-11
            prop_assert!((b2 - lat).abs() < 1e-5, "lat {} -> {}", lat, b2);
            prop_assert!(lon_diff(l2, lon) < 1e-5, "lon {} -> {}", lon, l2);
        }
    }
}
