//! Acquire pairwise travel costs between delivery locations.
//!
//! The [`DistanceMatrixProvider`] trait abstracts the retrieval of an `N×N`
//! cost matrix for an ordered list of [`Location`] values. Row `i` holds the
//! costs from location `i` to every location, so the caller's ordering (depot
//! first or otherwise) is preserved end to end.
//!
//! Errors are returned when inputs are invalid, e.g. an empty slice, or when
//! the upstream service cannot produce a complete matrix.

mod error;
mod provider;

pub use error::DistanceMatrixError;
pub use provider::{DistanceMatrixProvider, DistanceMatrixRows, Location};
