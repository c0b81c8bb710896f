//! Local-search solver for capacitated delivery routing.
//!
//! This crate provides [`LocalSearchSolver`], the default implementation of the
//! [`Solver`](ecoroute_core::Solver) trait. A solve runs in three sequential
//! phases over one immutable [`RoutingProblem`](ecoroute_core::RoutingProblem):
//!
//! 1. a [`ConstructionHeuristic`] builds a feasible first assignment;
//! 2. the [`LocalSearchEngine`] improves it with 2-opt, relocate and exchange
//!    moves, optionally escaping local optima with guided local search, until
//!    the time budget or iteration cap is reached;
//! 3. the [`SolutionExtractor`] walks the frozen solution into per-vehicle
//!    routes with load and distance traces.
//!
//! Every step is deterministic; only the wall-clock budget can make two runs
//! on the same input differ.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod construction;
mod extract;
mod search;
mod solver;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use construction::{
    CheapestInsertion, ConstructionHeuristic, FirstFitDecreasing, PathCheapestArc,
    construct_with_fallback, construction_heuristic,
};
pub use extract::SolutionExtractor;
pub use search::{LocalSearchEngine, SearchOutcome};
pub use solver::{IllegalTransition, LocalSearchSolver, LocalSearchSolverConfig, SolvePhase};
