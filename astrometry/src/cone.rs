//! Cone search over arrays of sky positions.
//!
//! A cone is a reference point plus an angular radius. Searching computes the
//! haversine distance from the reference point to every candidate and keeps
//! the candidates at or inside the radius. Matches are reported in input
//! order, never re-sorted by distance.
//!
//! # Output modes
//!
//! | Mode | Contents |
//! |------|----------|
//! | [`ConeSearchMode::Indices`] | positions of matching candidates |
//! | [`ConeSearchMode::IndicesAndDistances`] | positions plus their distances |
//! | [`ConeSearchMode::MaskAndDistances`] | boolean mask and distances for every candidate |
//!
//! # Examples
//!
//! ```rust
//! use astrometry::cone::{cone_search, Cone, ConeSearchMode};
//! use ndarray::array;
//!
//! let ra = array![10.0, 10.5, 20.0];
//! let dec = array![0.0, 0.0, 0.0];
//! let cone = Cone::new(10.0, 0.0, 1.0);
//!
//! let result = cone_search(ra.view(), dec.view(), &cone, ConeSearchMode::Indices).unwrap();
//! assert_eq!(result.indices(), vec![0, 1]);
//! ```

use ndarray::{Array1, ArrayView1};

use crate::distance::{angular_separation, angular_separation_many};
use crate::error::AstrometryError;

/// A circular region on the sky, all values in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub ra: f64,
    pub dec: f64,
    pub radius: f64,
}

impl Cone {
    pub fn new(ra: f64, dec: f64, radius: f64) -> Self {
        Self { ra, dec, radius }
    }

    /// Angular distance from the cone center to `(ra, dec)`.
    pub fn separation(&self, ra: f64, dec: f64) -> f64 {
        angular_separation(ra, dec, self.ra, self.dec)
    }

    /// True if `(ra, dec)` lies on or inside the cone boundary.
    pub fn contains(&self, ra: f64, dec: f64) -> bool {
        self.separation(ra, dec) <= self.radius
    }
}

impl std::fmt::Display for Cone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "distance from ({:.3}, {:.3}) <= {:.3}",
            self.ra, self.dec, self.radius
        )
    }
}

/// Shape of the value returned by [`cone_search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConeSearchMode {
    #[default]
    Indices,
    IndicesAndDistances,
    MaskAndDistances,
}

/// Result of a cone search; the variant follows the requested mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ConeSearchResult {
    Indices(Vec<usize>),
    IndicesAndDistances {
        indices: Vec<usize>,
        distances: Array1<f64>,
    },
    MaskAndDistances {
        mask: Array1<bool>,
        distances: Array1<f64>,
    },
}

impl ConeSearchResult {
    /// Positions of the matching candidates, in input order.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Self::Indices(indices) | Self::IndicesAndDistances { indices, .. } => indices.clone(),
            Self::MaskAndDistances { mask, .. } => mask
                .iter()
                .enumerate()
                .filter_map(|(i, &hit)| hit.then_some(i))
                .collect(),
        }
    }

    /// Number of matching candidates.
    pub fn len(&self) -> usize {
        match self {
            Self::Indices(indices) | Self::IndicesAndDistances { indices, .. } => indices.len(),
            Self::MaskAndDistances { mask, .. } => mask.iter().filter(|&&hit| hit).count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Search candidate positions for those inside `cone`.
///
/// The radius is inclusive. An empty match set is a normal result; a negative
/// radius simply matches nothing and NaN positions never match.
///
/// # Errors
///
/// * `AstrometryError::MismatchedLengths` - `ra` and `dec` differ in length
pub fn cone_search(
    ra: ArrayView1<f64>,
    dec: ArrayView1<f64>,
    cone: &Cone,
    mode: ConeSearchMode,
) -> Result<ConeSearchResult, AstrometryError> {
    match mode {
        ConeSearchMode::Indices => {
            let (indices, _) = cone_matches(ra, dec, cone)?;
            Ok(ConeSearchResult::Indices(indices))
        }
        ConeSearchMode::IndicesAndDistances => {
            let (indices, distances) = cone_matches(ra, dec, cone)?;
            Ok(ConeSearchResult::IndicesAndDistances { indices, distances })
        }
        ConeSearchMode::MaskAndDistances => {
            let distances = angular_separation_many(ra, dec, cone.ra, cone.dec)?;
            let mask = distances.mapv(|d| d <= cone.radius);
            Ok(ConeSearchResult::MaskAndDistances { mask, distances })
        }
    }
}

/// Matching positions and their distances, aligned by position.
pub fn cone_matches(
    ra: ArrayView1<f64>,
    dec: ArrayView1<f64>,
    cone: &Cone,
) -> Result<(Vec<usize>, Array1<f64>), AstrometryError> {
    let distances = angular_separation_many(ra, dec, cone.ra, cone.dec)?;

    let indices: Vec<usize> = distances
        .iter()
        .enumerate()
        .filter_map(|(i, &d)| (d <= cone.radius).then_some(i))
        .collect();
    let matched = indices.iter().map(|&i| distances[i]).collect();

    log::debug!(
        "Cone search {}: {} of {} candidates matched",
        cone,
        indices.len(),
        distances.len()
    );

    Ok((indices, matched))
}
