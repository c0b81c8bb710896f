//! Deterministic distance-matrix providers used by unit and behaviour tests.

use crate::{DistanceMatrixError, DistanceMatrixProvider, DistanceMatrixRows, Location};

/// Provider returning a cost of one between distinct locations.
#[derive(Default, Debug, Copy, Clone)]
pub struct UnitDistanceMatrixProvider;

impl DistanceMatrixProvider for UnitDistanceMatrixProvider {
    fn distance_matrix(
        &self,
        locations: &[Location],
    ) -> Result<DistanceMatrixRows, DistanceMatrixError> {
        if locations.is_empty() {
            return Err(DistanceMatrixError::EmptyInput);
        }
        let n = locations.len();
        Ok((0..n)
            .map(|i| (0..n).map(|j| i64::from(i != j)).collect())
            .collect())
    }
}

/// Provider replaying a fixed matrix regardless of the locations' content.
///
/// The matrix must have one row per requested location; anything else is
/// reported as a parse failure, mirroring a truncated service response.
#[derive(Debug, Clone, Default)]
pub struct FixedDistanceMatrixProvider {
    rows: DistanceMatrixRows,
}

impl FixedDistanceMatrixProvider {
    /// Provider returning `rows` for every call.
    #[must_use]
    pub const fn new(rows: DistanceMatrixRows) -> Self {
        Self { rows }
    }
}

impl DistanceMatrixProvider for FixedDistanceMatrixProvider {
    fn distance_matrix(
        &self,
        locations: &[Location],
    ) -> Result<DistanceMatrixRows, DistanceMatrixError> {
        if locations.is_empty() {
            return Err(DistanceMatrixError::EmptyInput);
        }
        if self.rows.len() != locations.len() {
            return Err(DistanceMatrixError::ParseError {
                message: format!(
                    "expected {} rows, fixture holds {}",
                    locations.len(),
                    self.rows.len()
                ),
            });
        }
        Ok(self.rows.clone())
    }
}
