//! Solver requests, responses and the [`Solver`] trait.

use std::time::Duration;

use crate::{Cost, Demand, InvalidInputError, Route, RoutingProblem, SolveError};

/// How the first feasible assignment is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum FirstSolutionStrategy {
    /// Repeatedly insert the stop with the cheapest feasible insertion.
    #[default]
    CheapestInsertion,
    /// Fill vehicles one at a time by extending with the cheapest arc.
    PathCheapestArc,
}

/// How the search behaves once no improving move remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum LocalSearchMetaheuristic {
    /// Stop at the first local optimum.
    GreedyDescent,
    /// Penalise arcs of local optima and keep searching until the budget
    /// runs out.
    #[default]
    GuidedLocalSearch,
}

/// Move families explored by local search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Neighbourhood {
    /// Reverse a segment of one route.
    TwoOpt,
    /// Move one stop to another vehicle.
    Relocate,
    /// Swap two stops between two vehicles.
    Exchange,
}

impl Neighbourhood {
    /// Every neighbourhood in evaluation order.
    pub const ALL: [Self; 3] = [Self::TwoOpt, Self::Relocate, Self::Exchange];
}

/// Default search budget in milliseconds.
pub const DEFAULT_TIME_LIMIT_MS: u64 = 1_000;

/// Default guided local search `λ` factor in thousandths.
pub const DEFAULT_LAMBDA_FACTOR: u32 = 100;

/// Tuning knobs for construction and search.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use ecoroute_core::{LocalSearchMetaheuristic, SearchParameters};
///
/// let params = SearchParameters::default()
///     .with_time_limit(Duration::from_millis(250))
///     .with_iteration_limit(50)
///     .with_metaheuristic(LocalSearchMetaheuristic::GreedyDescent);
/// assert_eq!(params.time_limit(), Duration::from_millis(250));
/// assert_eq!(params.iteration_limit, Some(50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchParameters {
    /// Wall-clock budget for the whole solve in milliseconds.
    pub time_limit_ms: u64,
    /// Maximum number of neighbourhood passes; `None` for no cap.
    pub iteration_limit: Option<u64>,
    /// Construction heuristic.
    pub first_solution_strategy: FirstSolutionStrategy,
    /// Behaviour at local optima.
    pub local_search_metaheuristic: LocalSearchMetaheuristic,
    /// Enabled move families.
    pub neighbourhoods: Vec<Neighbourhood>,
    /// Guided local search `α` in thousandths: `λ = α · cost / arcs`.
    pub lambda_factor: u32,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
            iteration_limit: None,
            first_solution_strategy: FirstSolutionStrategy::default(),
            local_search_metaheuristic: LocalSearchMetaheuristic::default(),
            neighbourhoods: Neighbourhood::ALL.to_vec(),
            lambda_factor: DEFAULT_LAMBDA_FACTOR,
        }
    }
}

impl SearchParameters {
    /// Search budget as a [`Duration`].
    #[must_use]
    pub const fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    /// Set the search budget, saturating at `u64::MAX` milliseconds.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Cap the number of neighbourhood passes.
    #[must_use]
    pub const fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// Choose the construction heuristic.
    #[must_use]
    pub const fn with_first_solution_strategy(mut self, strategy: FirstSolutionStrategy) -> Self {
        self.first_solution_strategy = strategy;
        self
    }

    /// Choose the metaheuristic.
    #[must_use]
    pub const fn with_metaheuristic(mut self, metaheuristic: LocalSearchMetaheuristic) -> Self {
        self.local_search_metaheuristic = metaheuristic;
        self
    }

    /// Restrict the search to `neighbourhoods`.
    #[must_use]
    pub fn with_neighbourhoods(mut self, neighbourhoods: impl IntoIterator<Item = Neighbourhood>) -> Self {
        self.neighbourhoods = neighbourhoods.into_iter().collect();
        self
    }

    /// Set the guided local search `α` in thousandths.
    #[must_use]
    pub const fn with_lambda_factor(mut self, lambda_factor: u32) -> Self {
        self.lambda_factor = lambda_factor;
        self
    }
}

/// Input to [`Solver::solve`].
///
/// # Examples
/// ```
/// use ecoroute_core::SolveRequest;
///
/// let request = SolveRequest::new(
///     vec![vec![0, 4], vec![4, 0]],
///     vec![0, 3],
///     vec![5, 5],
/// )
/// .with_vehicle_count(2);
/// assert_eq!(request.vehicle_count(), 2);
/// assert_eq!(request.depot, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveRequest {
    /// Square matrix of travel costs, depot included.
    pub distance_matrix: Vec<Vec<Cost>>,
    /// Demand per node; the depot's entry is ignored.
    pub demands: Vec<Demand>,
    /// Capacity per vehicle.
    pub vehicle_capacities: Vec<Demand>,
    /// Fleet size; defaults to the number of capacities.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vehicle_count: Option<usize>,
    /// Depot node index.
    #[cfg_attr(feature = "serde", serde(default))]
    pub depot: usize,
    /// Search tuning.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parameters: SearchParameters,
}

impl SolveRequest {
    /// Request with the depot at node 0 and default parameters.
    #[must_use]
    pub fn new(
        distance_matrix: Vec<Vec<Cost>>,
        demands: Vec<Demand>,
        vehicle_capacities: Vec<Demand>,
    ) -> Self {
        Self {
            distance_matrix,
            demands,
            vehicle_capacities,
            vehicle_count: None,
            depot: 0,
            parameters: SearchParameters::default(),
        }
    }

    /// Set an explicit fleet size.
    #[must_use]
    pub const fn with_vehicle_count(mut self, vehicle_count: usize) -> Self {
        self.vehicle_count = Some(vehicle_count);
        self
    }

    /// Move the depot.
    #[must_use]
    pub const fn with_depot(mut self, depot: usize) -> Self {
        self.depot = depot;
        self
    }

    /// Replace the search parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: SearchParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Effective fleet size.
    #[must_use]
    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count.unwrap_or(self.vehicle_capacities.len())
    }

    /// Validate the request into a [`RoutingProblem`].
    ///
    /// # Errors
    ///
    /// Propagates any [`InvalidInputError`] from [`RoutingProblem::new`].
    pub fn to_problem(&self) -> Result<RoutingProblem, InvalidInputError> {
        RoutingProblem::new(
            self.distance_matrix.clone(),
            self.demands.clone(),
            self.vehicle_capacities.clone(),
            self.vehicle_count(),
            self.depot,
        )
    }
}

/// Run statistics reported alongside the routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostics {
    /// Wall-clock time spent solving, in milliseconds.
    pub solve_time_ms: u64,
    /// Neighbourhood passes performed.
    pub iterations: u64,
    /// Objective of the constructed solution before improvement.
    pub initial_objective: Cost,
    /// Times guided local search penalised a local optimum.
    pub penalty_escapes: u64,
}

/// Result of a successful solve.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveResponse {
    /// Routes of vehicles with at least one stop, by vehicle id.
    pub routes: Vec<Route>,
    /// Sum of `total_distance` over `routes`.
    pub objective: Cost,
    /// `false` when the time budget or iteration cap ended the search before
    /// local optimality was proven.
    pub search_complete: bool,
    /// Run statistics.
    pub diagnostics: Diagnostics,
}

/// Assign delivery stops to vehicles and order each vehicle's visits.
///
/// Implementations should return [`SolveError`] for invalid or infeasible
/// requests rather than panicking. A search that runs out of time is a
/// successful solve with `search_complete == false`.
/// Solvers must be `Send + Sync` to operate safely across threads.
pub trait Solver: Send + Sync {
    /// Solve a request, producing routes or an error.
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolveError>;
}
