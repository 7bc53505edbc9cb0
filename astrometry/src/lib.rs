//! Positional astronomy primitives.
//!
//! Small, pure building blocks for working with catalog positions:
//!
//! - [`angle`]: sexagesimal (`H:M:S` / `D:M:S`) text to decimal degrees
//! - [`distance`]: great-circle angular separation
//! - [`frames`]: equatorial / galactic / ecliptic rotations for J2000 and B1950
//! - [`cone`]: cone search over arrays of positions
//!
//! All angles at the public API are in degrees. Array routines take
//! `ndarray` views and evaluate elements in parallel while preserving index
//! correspondence.

pub mod angle;
pub mod cone;
pub mod distance;
pub mod error;
pub mod frames;

pub use angle::{dms_to_deg, hms_to_deg, SexagesimalUnit};
pub use cone::{cone_matches, cone_search, Cone, ConeSearchMode, ConeSearchResult};
pub use distance::{angular_separation, angular_separation_many};
pub use error::AstrometryError;
pub use frames::{euler, euler_many, euler_select, Equinox, FrameTransform};
