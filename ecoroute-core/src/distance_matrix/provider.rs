//! Distance-matrix provider trait and the location type it consumes.

use std::fmt;

use geo::Coord;

use super::error::DistanceMatrixError;
use crate::Cost;

/// Row-major matrix of travel costs as returned by a provider.
pub type DistanceMatrixRows = Vec<Vec<Cost>>;

/// A place the fleet must visit.
///
/// Street addresses are geocoded by the provider; coordinates are passed
/// through as `latitude,longitude`. The coordinate's `x` is longitude and `y`
/// is latitude, matching `geo`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Location {
    /// Free-form street address.
    Address(String),
    /// Longitude/latitude pair.
    Coordinate(Coord<f64>),
}

impl Location {
    /// Location identified by a street address.
    #[must_use]
    pub fn address(address: impl Into<String>) -> Self {
        Self::Address(address.into())
    }

    /// Location at `latitude`, `longitude`.
    #[must_use]
    pub const fn coordinate(latitude: f64, longitude: f64) -> Self {
        Self::Coordinate(Coord {
            x: longitude,
            y: latitude,
        })
    }
}

impl fmt::Display for Location {
    /// Render the location in the form mapping services accept as a waypoint.
    ///
    /// ```
    /// use ecoroute_core::Location;
    ///
    /// assert_eq!(Location::coordinate(35.1, -90.0).to_string(), "35.1,-90");
    /// assert_eq!(Location::address("1 Main St").to_string(), "1 Main St");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => f.write_str(address),
            Self::Coordinate(coord) => write!(f, "{},{}", coord.y, coord.x),
        }
    }
}

/// Fetch pairwise travel costs for a set of locations.
///
/// Implementers must return a square `n×n` matrix where
/// `n == locations.len()`. `matrix[i][j]` is the cost of travelling from
/// `locations[i]` to `locations[j]`. A provider either returns the complete
/// matrix or an error; partial matrices are never returned.
///
/// # Examples
///
/// ```rust
/// use ecoroute_core::{DistanceMatrixError, DistanceMatrixProvider, DistanceMatrixRows, Location};
///
/// struct Flat;
///
/// impl DistanceMatrixProvider for Flat {
///     fn distance_matrix(
///         &self,
///         locations: &[Location],
///     ) -> Result<DistanceMatrixRows, DistanceMatrixError> {
///         if locations.is_empty() {
///             return Err(DistanceMatrixError::EmptyInput);
///         }
///         let n = locations.len();
///         Ok((0..n)
///             .map(|i| (0..n).map(|j| if i == j { 0 } else { 10 }).collect())
///             .collect())
///     }
/// }
///
/// let matrix = Flat.distance_matrix(&[Location::address("Depot")])?;
/// assert_eq!(matrix, vec![vec![0]]);
/// # Ok::<(), DistanceMatrixError>(())
/// ```
pub trait DistanceMatrixProvider {
    /// Return the cost matrix for `locations`.
    ///
    /// Implementations must return `Err(DistanceMatrixError::EmptyInput)`
    /// when `locations` is empty.
    fn distance_matrix(
        &self,
        locations: &[Location],
    ) -> Result<DistanceMatrixRows, DistanceMatrixError>;
}
