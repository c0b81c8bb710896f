//! Error taxonomy shared by problem construction and solvers.
//!
//! [`SolveError`] separates malformed input, provably infeasible problems and
//! failures of external collaborators so callers can decide whether a retry
//! makes sense. A search that runs out of time is *not* an error; see
//! [`SolveResponse::search_complete`](crate::SolveResponse::search_complete).

use thiserror::Error;

use crate::{Cost, Demand, DistanceMatrixError};

/// Structural problems detected while building a
/// [`RoutingProblem`](crate::RoutingProblem).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInputError {
    /// The matrix row count disagrees with the number of demands.
    #[error("distance matrix has {matrix_rows} rows but {demands} demands were supplied")]
    DimensionMismatch {
        /// Number of rows in the supplied matrix.
        matrix_rows: usize,
        /// Length of the demand array.
        demands: usize,
    },
    /// A matrix row does not have one column per node.
    #[error("distance matrix row {row} has {columns} columns but {expected} expected")]
    NonSquareMatrix {
        /// Offending row.
        row: usize,
        /// Columns found in that row.
        columns: usize,
        /// Columns required for a square matrix.
        expected: usize,
    },
    /// The fleet is empty.
    #[error("at least one vehicle is required")]
    NoVehicles,
    /// The capacity array length disagrees with the vehicle count.
    #[error("{capacities} capacities supplied for {vehicle_count} vehicles")]
    VehicleCountMismatch {
        /// Requested number of vehicles.
        vehicle_count: usize,
        /// Length of the capacity array.
        capacities: usize,
    },
    /// A vehicle capacity was zero or negative.
    #[error("vehicle {vehicle} has non-positive capacity {capacity}")]
    NonPositiveCapacity {
        /// Vehicle index.
        vehicle: usize,
        /// Rejected capacity.
        capacity: Demand,
    },
    /// A stop demand was negative.
    #[error("node {node} has negative demand {demand}")]
    NegativeDemand {
        /// Node index.
        node: usize,
        /// Rejected demand.
        demand: Demand,
    },
    /// The stop demands add up to more than a load can represent.
    #[error("total stop demand exceeds the largest representable load")]
    DemandOverflow,
    /// The depot index does not name a node.
    #[error("depot index {depot} is out of range for {nodes} nodes")]
    DepotOutOfRange {
        /// Requested depot index.
        depot: usize,
        /// Number of nodes in the problem.
        nodes: usize,
    },
    /// A matrix entry was negative.
    #[error("distance from {from} to {to} is negative ({distance})")]
    NegativeDistance {
        /// Origin node.
        from: usize,
        /// Destination node.
        to: usize,
        /// Rejected distance.
        distance: Cost,
    },
}

/// Why no capacity-respecting assignment exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfeasibleReason {
    /// One stop demands more than the largest vehicle can carry.
    #[error("node {node} demands {demand} but the largest vehicle carries {max_capacity}")]
    DemandExceedsVehicle {
        /// Node that cannot be served.
        node: usize,
        /// Its demand.
        demand: Demand,
        /// Largest capacity in the fleet.
        max_capacity: Demand,
    },
    /// Total demand is larger than total fleet capacity.
    #[error("total demand {total_demand} exceeds total fleet capacity {total_capacity}")]
    FleetTooSmall {
        /// Sum of all stop demands.
        total_demand: Demand,
        /// Sum of all vehicle capacities.
        total_capacity: Demand,
    },
    /// Construction ran out of room for a stop despite aggregate capacity.
    #[error("node {node} could not be placed on any vehicle without exceeding capacity")]
    Unplaceable {
        /// Node left unassigned.
        node: usize,
    },
}

/// Machine-distinguishable category of a [`SolveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolveErrorKind {
    /// Malformed dimensions or values.
    InvalidInput,
    /// No feasible assignment exists.
    InfeasibleProblem,
    /// A collaborator such as the distance-matrix service failed.
    ExternalServiceFailure,
}

/// Errors returned by [`Solver::solve`](crate::Solver::solve).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The request was structurally invalid.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
    /// The request is well formed but cannot be satisfied.
    #[error("infeasible problem: {0}")]
    InfeasibleProblem(#[from] InfeasibleReason),
    /// Fetching the distance matrix failed.
    #[error("external service failure: {0}")]
    ExternalServiceFailure(#[from] DistanceMatrixError),
}

impl SolveError {
    /// Category of this error.
    ///
    /// # Examples
    /// ```
    /// use ecoroute_core::{InvalidInputError, SolveError, SolveErrorKind};
    ///
    /// let err = SolveError::from(InvalidInputError::NoVehicles);
    /// assert_eq!(err.kind(), SolveErrorKind::InvalidInput);
    /// assert!(!err.is_retryable());
    /// ```
    #[must_use]
    pub const fn kind(&self) -> SolveErrorKind {
        match self {
            Self::InvalidInput(_) => SolveErrorKind::InvalidInput,
            Self::InfeasibleProblem(_) => SolveErrorKind::InfeasibleProblem,
            Self::ExternalServiceFailure(_) => SolveErrorKind::ExternalServiceFailure,
        }
    }

    /// Whether repeating the same call may succeed.
    ///
    /// Only external service failures are retryable; invalid and infeasible
    /// problems fail the same way every time.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalServiceFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SolveError::from(InvalidInputError::NoVehicles), SolveErrorKind::InvalidInput, false)]
    #[case(
        SolveError::from(InfeasibleReason::Unplaceable { node: 3 }),
        SolveErrorKind::InfeasibleProblem,
        false
    )]
    #[case(
        SolveError::from(DistanceMatrixError::EmptyInput),
        SolveErrorKind::ExternalServiceFailure,
        true
    )]
    fn kind_and_retryability(
        #[case] err: SolveError,
        #[case] kind: SolveErrorKind,
        #[case] retryable: bool,
    ) {
        assert_eq!(err.kind(), kind);
        assert_eq!(err.is_retryable(), retryable);
    }

    #[rstest]
    fn messages_name_the_offending_value() {
        let err = SolveError::from(InvalidInputError::NegativeDistance {
            from: 1,
            to: 2,
            distance: -4,
        });
        assert_eq!(
            err.to_string(),
            "invalid input: distance from 1 to 2 is negative (-4)"
        );
    }
}
