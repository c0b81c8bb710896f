//! `LocalSearchSolver`: construction, improvement and extraction in sequence.

mod phase;

use std::time::{Duration, Instant};

use ecoroute_core::{
    Diagnostics, InfeasibleReason, RoutingProblem, SearchParameters, Solution, SolveError,
    SolveRequest, SolveResponse, Solver,
};
use log::{debug, error, info};

use crate::construction::construct_with_fallback;
use crate::extract::SolutionExtractor;
use crate::search::LocalSearchEngine;

pub use phase::{IllegalTransition, SolvePhase};

/// Upper bound on any request's time budget unless configured otherwise.
const DEFAULT_MAX_TIME_LIMIT: Duration = Duration::from_secs(300);

/// Configuration for [`LocalSearchSolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSearchSolverConfig {
    /// Requests asking for a longer budget are clamped to this.
    pub max_time_limit: Duration,
    /// Iteration cap applied when a request does not set one.
    pub default_iteration_limit: Option<u64>,
}

impl Default for LocalSearchSolverConfig {
    fn default() -> Self {
        Self {
            max_time_limit: DEFAULT_MAX_TIME_LIMIT,
            default_iteration_limit: None,
        }
    }
}

impl LocalSearchSolverConfig {
    /// Clamp request budgets to `limit`.
    #[must_use]
    pub const fn with_max_time_limit(mut self, limit: Duration) -> Self {
        self.max_time_limit = limit;
        self
    }

    /// Cap iterations for requests that leave the cap unset.
    #[must_use]
    pub const fn with_default_iteration_limit(mut self, limit: u64) -> Self {
        self.default_iteration_limit = Some(limit);
        self
    }
}

/// Deterministic local-search solver for capacitated routing.
///
/// # Examples
/// ```
/// use ecoroute_core::{SearchParameters, SolveRequest, Solver};
/// use ecoroute_solver::LocalSearchSolver;
///
/// let request = SolveRequest::new(
///     vec![vec![0, 2, 2], vec![2, 0, 1], vec![2, 1, 0]],
///     vec![0, 1, 1],
///     vec![2],
/// )
/// .with_parameters(SearchParameters::default().with_iteration_limit(20));
/// let response = LocalSearchSolver::default().solve(&request)?;
/// assert_eq!(response.objective, 5);
/// assert_eq!(response.routes.len(), 1);
/// # Ok::<(), ecoroute_core::SolveError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalSearchSolver {
    config: LocalSearchSolverConfig,
}

impl LocalSearchSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: LocalSearchSolverConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &LocalSearchSolverConfig {
        &self.config
    }

    fn effective_parameters(&self, requested: &SearchParameters) -> SearchParameters {
        let mut parameters = requested.clone();
        if parameters.time_limit() > self.config.max_time_limit {
            debug!(
                "clamping time limit {:?} to {:?}",
                parameters.time_limit(),
                self.config.max_time_limit
            );
            parameters = parameters.with_time_limit(self.config.max_time_limit);
        }
        if parameters.iteration_limit.is_none() {
            parameters.iteration_limit = self.config.default_iteration_limit;
        }
        parameters
    }
}

impl Solver for LocalSearchSolver {
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        let started_at = Instant::now();
        let mut phase = PhaseTracker::default();
        let problem = request.to_problem()?;
        let parameters = self.effective_parameters(&request.parameters);

        phase.enter(SolvePhase::Constructing);
        let initial = match check_fleet_capacity(&problem)
            .and_then(|()| construct_with_fallback(parameters.first_solution_strategy, &problem))
        {
            Ok(assignment) => assignment,
            Err(reason) => {
                phase.enter(SolvePhase::Infeasible);
                info!("problem with {} stops is infeasible: {reason}", problem.stop_count());
                return Err(reason.into());
            }
        };

        phase.enter(SolvePhase::Searching);
        let outcome = LocalSearchEngine::new(&problem, &parameters, started_at).run(initial);
        phase.enter(SolvePhase::Solved);

        let solution = Solution::freeze(&outcome.best, &problem);
        let routes = SolutionExtractor::new(&problem).extract(&solution);
        let objective = SolutionExtractor::objective(&routes);
        debug_assert_eq!(objective, solution.objective());

        let diagnostics = Diagnostics {
            solve_time_ms: u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            iterations: outcome.iterations,
            initial_objective: outcome.initial_cost,
            penalty_escapes: outcome.penalty_escapes,
        };
        info!(
            "solved {} stops on {} of {} vehicles: objective {objective} (initial {}), {} passes, complete: {}",
            problem.stop_count(),
            routes.len(),
            problem.vehicle_count(),
            outcome.initial_cost,
            outcome.iterations,
            outcome.search_complete
        );

        Ok(SolveResponse {
            routes,
            objective,
            search_complete: outcome.search_complete,
            diagnostics,
        })
    }
}

/// Reject problems no assignment can satisfy before construction starts.
fn check_fleet_capacity(problem: &RoutingProblem) -> Result<(), InfeasibleReason> {
    let max_capacity = problem.max_capacity();
    if let Some(node) = problem
        .stops()
        .find(|&node| problem.demand(node) > max_capacity)
    {
        return Err(InfeasibleReason::DemandExceedsVehicle {
            node,
            demand: problem.demand(node),
            max_capacity,
        });
    }
    let total_demand = problem.total_demand();
    let total_capacity = problem.total_capacity();
    if total_demand > total_capacity {
        return Err(InfeasibleReason::FleetTooSmall {
            total_demand,
            total_capacity,
        });
    }
    Ok(())
}

/// Tracks the phase of one solve and logs each transition.
#[derive(Debug, Default)]
struct PhaseTracker {
    phase: SolvePhase,
}

impl PhaseTracker {
    fn enter(&mut self, next: SolvePhase) {
        match self.phase.advance(next) {
            Ok(phase) => {
                debug!("solve phase {} -> {phase}", self.phase);
                self.phase = phase;
            }
            Err(err) => {
                error!("{err}");
                debug_assert!(false, "{err}");
            }
        }
    }
}
