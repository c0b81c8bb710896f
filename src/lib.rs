//! Facade crate for the Ecoroute delivery routing engine.
//!
//! This crate re-exports the core domain types and exposes the local-search
//! solver and the HTTP distance-matrix provider behind feature flags.

#![forbid(unsafe_code)]

pub use ecoroute_core::{
    Cost, Demand, Diagnostics, DistanceMatrixError, DistanceMatrixProvider, DistanceMatrixRows,
    FirstSolutionStrategy, LocalSearchMetaheuristic, Location, Neighbourhood, Route,
    SearchParameters, SolveError, SolveErrorKind, SolveRequest, SolveResponse, Solver,
};

#[cfg(feature = "solver")]
pub use ecoroute_solver::{LocalSearchSolver, LocalSearchSolverConfig};

#[cfg(feature = "provider-http")]
pub use ecoroute_data::{CostMetric, HttpDistanceMatrixProvider, HttpDistanceMatrixProviderConfig};
