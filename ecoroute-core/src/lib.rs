//! Core domain types for the Ecoroute delivery routing engine.
//!
//! The crate models a capacitated vehicle routing problem: a depot, a set of
//! delivery stops with integer demands, a fleet of capacity-limited vehicles
//! and a matrix of travel costs. Constructors validate their input and return
//! `Result` so that malformed problems are rejected before any search runs.
//!
//! Solvers live in separate crates and plug in through the [`Solver`] trait;
//! distance matrices are supplied by a [`DistanceMatrixProvider`].

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod capacity;
pub mod distance_matrix;
pub mod error;
pub mod index;
pub mod problem;
pub mod solution;
pub mod solver;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use capacity::{CapacityTracker, CapacityViolation};
pub use distance_matrix::{DistanceMatrixError, DistanceMatrixProvider, DistanceMatrixRows, Location};
pub use error::{InfeasibleReason, InvalidInputError, SolveError, SolveErrorKind};
pub use index::{IndexManager, VariableIndex};
pub use problem::{DistanceMatrix, RoutingProblem};
pub use solution::{Assignment, Route, Solution};
pub use solver::{
    Diagnostics, FirstSolutionStrategy, LocalSearchMetaheuristic, Neighbourhood, SearchParameters,
    SolveRequest, SolveResponse, Solver,
};

/// Integer travel cost between two nodes.
pub type Cost = i64;

/// Integer quantity delivered at a stop or carried by a vehicle.
pub type Demand = i64;
