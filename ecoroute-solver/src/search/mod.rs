//! Time-bounded improvement of a feasible assignment.
//!
//! Each pass of the search scans the enabled neighbourhoods for the best
//! strictly improving move and applies it. When no such move exists the
//! search either stops, for greedy descent, or penalises the costliest arcs
//! of the current solution and continues on augmented costs, for guided local
//! search. The wall-clock budget and the iteration cap are checked at the top
//! of every pass, and the best assignment seen, measured on true distances,
//! is always returned.

mod moves;
mod penalties;

use std::time::Instant;

use ecoroute_core::{
    Assignment, CapacityTracker, Cost, LocalSearchMetaheuristic, RoutingProblem, SearchParameters,
};
use log::{debug, trace};

use self::moves::{CostModel, best_improvement};
use self::penalties::{ArcPenalties, arcs_in_use};

/// Travel cost of linking `from` to `to` inside a route.
///
/// The only depot-to-depot link is the one closing an empty route, which
/// costs nothing regardless of the matrix diagonal.
pub(crate) fn link_cost(problem: &RoutingProblem, from: usize, to: usize) -> Cost {
    if from == to && from == problem.depot() {
        return 0;
    }
    problem.arc(from, to)
}

/// What a search run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Best feasible assignment observed.
    pub best: Assignment,
    /// True cost of `best`.
    pub best_cost: Cost,
    /// True cost of the assignment the search started from.
    pub initial_cost: Cost,
    /// Neighbourhood passes performed.
    pub iterations: u64,
    /// Local optima escaped by penalising arcs.
    pub penalty_escapes: u64,
    /// Whether the search stopped because no further improvement was possible
    /// rather than because a budget ran out.
    pub search_complete: bool,
}

/// Neighbourhood search over one problem.
///
/// # Examples
/// ```
/// use std::time::Instant;
/// use ecoroute_core::{Assignment, LocalSearchMetaheuristic, RoutingProblem, SearchParameters};
/// use ecoroute_solver::LocalSearchEngine;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let problem = RoutingProblem::new(
///     vec![
///         vec![0, 3, 1, 1],
///         vec![3, 0, 2, 4],
///         vec![1, 2, 0, 2],
///         vec![1, 4, 2, 0],
///     ],
///     vec![0, 1, 1, 1],
///     vec![3],
///     1,
///     0,
/// )?;
/// let params = SearchParameters::default()
///     .with_metaheuristic(LocalSearchMetaheuristic::GreedyDescent);
/// let engine = LocalSearchEngine::new(&problem, &params, Instant::now());
/// let outcome = engine.run(Assignment::from_routes(vec![vec![1, 3, 2]]));
/// assert!(outcome.best_cost <= outcome.initial_cost);
/// assert!(outcome.search_complete);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LocalSearchEngine<'a> {
    problem: &'a RoutingProblem,
    parameters: &'a SearchParameters,
    started_at: Instant,
}

impl<'a> LocalSearchEngine<'a> {
    /// Engine for `problem` whose time budget is counted from `started_at`.
    #[must_use]
    pub const fn new(
        problem: &'a RoutingProblem,
        parameters: &'a SearchParameters,
        started_at: Instant,
    ) -> Self {
        Self {
            problem,
            parameters,
            started_at,
        }
    }

    /// Improve `initial` until a stopping condition holds.
    ///
    /// `initial` must be feasible; every applied move preserves feasibility.
    #[must_use]
    pub fn run(&self, initial: Assignment) -> SearchOutcome {
        let problem = self.problem;
        let tracker = CapacityTracker::new(problem);
        let time_limit = self.parameters.time_limit();
        let guided = self.parameters.local_search_metaheuristic
            == LocalSearchMetaheuristic::GuidedLocalSearch;

        let initial_cost = initial.cost(problem);
        let mut best = initial.clone();
        let mut best_cost = initial_cost;
        let mut current = initial;
        let mut penalties = ArcPenalties::new(problem.node_count());
        let mut lambda: Cost = 0;
        let mut iterations: u64 = 0;
        let mut penalty_escapes: u64 = 0;

        let search_complete = loop {
            if self.started_at.elapsed() >= time_limit {
                debug!("time budget of {time_limit:?} spent after {iterations} passes");
                break false;
            }
            if self
                .parameters
                .iteration_limit
                .is_some_and(|limit| iterations >= limit)
            {
                debug!("iteration cap reached after {iterations} passes");
                break false;
            }
            iterations += 1;

            let model = CostModel::new(problem, &penalties, lambda);
            if let Some(candidate) =
                best_improvement(&model, &tracker, &current, &self.parameters.neighbourhoods)
            {
                moves::apply(&mut current, candidate.mv);
                debug_assert!(
                    current.is_feasible(problem),
                    "move {:?} broke feasibility",
                    candidate.mv
                );
                let cost = current.cost(problem);
                if cost < best_cost {
                    trace!("pass {iterations}: new best {cost} (was {best_cost})");
                    best.clone_from(&current);
                    best_cost = cost;
                    penalties.decay();
                }
                continue;
            }

            if !guided {
                debug!("local optimum {best_cost} proven after {iterations} passes");
                break true;
            }
            if lambda == 0 {
                lambda = guided_lambda(
                    self.parameters.lambda_factor,
                    current.cost(problem),
                    arcs_in_use(problem, &current).len(),
                );
                if lambda == 0 {
                    debug!("no arc cost to penalise; local optimum {best_cost} is final");
                    break true;
                }
            }
            if penalties.penalise(problem, &current) == 0 {
                debug!("no arc cost to penalise; local optimum {best_cost} is final");
                break true;
            }
            penalty_escapes += 1;
        };

        SearchOutcome {
            best,
            best_cost,
            initial_cost,
            iterations,
            penalty_escapes,
            search_complete,
        }
    }
}

/// `λ = α · cost / arcs`, expressed in the search's scaled cost units.
///
/// `lambda_factor` is `α` in thousandths, which matches the cost scale, so
/// the scaling cancels. Any positive factor on a positive cost yields at
/// least one unit so penalties always have an effect.
fn guided_lambda(lambda_factor: u32, cost: Cost, arcs: usize) -> Cost {
    if lambda_factor == 0 || cost <= 0 {
        return 0;
    }
    let arcs = Cost::try_from(arcs).unwrap_or(Cost::MAX);
    Cost::from(lambda_factor)
        .saturating_mul(cost)
        .checked_div(arcs)
        .unwrap_or(0)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoroute_core::Neighbourhood;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    /// Two clusters on a line that a single crossing assignment serves badly.
    #[fixture]
    fn problem() -> RoutingProblem {
        let positions: [i64; 7] = [0, -6, -5, -4, 4, 5, 6];
        let matrix = positions
            .iter()
            .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
            .collect();
        RoutingProblem::new(matrix, vec![0, 1, 1, 1, 1, 1, 1], vec![3, 3], 2, 0)
            .expect("valid problem")
    }

    fn crossing() -> Assignment {
        Assignment::from_routes(vec![vec![1, 4, 2], vec![5, 3, 6]])
    }

    #[rstest]
    fn greedy_descent_reaches_the_optimum(problem: RoutingProblem) {
        let params = SearchParameters::default()
            .with_metaheuristic(LocalSearchMetaheuristic::GreedyDescent);
        let outcome = LocalSearchEngine::new(&problem, &params, Instant::now()).run(crossing());
        assert!(outcome.search_complete);
        assert_eq!(outcome.best_cost, 24);
        assert!(outcome.best_cost < outcome.initial_cost);
        assert!(outcome.best.is_feasible(&problem));
        assert_eq!(outcome.penalty_escapes, 0);
    }

    #[rstest]
    fn iteration_cap_stops_the_search(problem: RoutingProblem) {
        let params = SearchParameters::default()
            .with_metaheuristic(LocalSearchMetaheuristic::GreedyDescent)
            .with_iteration_limit(1);
        let outcome = LocalSearchEngine::new(&problem, &params, Instant::now()).run(crossing());
        assert!(!outcome.search_complete);
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.best_cost < outcome.initial_cost);
    }

    #[rstest]
    fn zero_budget_returns_the_initial_assignment(problem: RoutingProblem) {
        let params = SearchParameters::default().with_time_limit(Duration::ZERO);
        let outcome = LocalSearchEngine::new(&problem, &params, Instant::now()).run(crossing());
        assert!(!outcome.search_complete);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.best, crossing());
        assert_eq!(outcome.best_cost, outcome.initial_cost);
    }

    #[rstest]
    fn guided_search_escapes_and_keeps_the_best(problem: RoutingProblem) {
        let params = SearchParameters::default()
            .with_time_limit(Duration::from_secs(30))
            .with_iteration_limit(200);
        let outcome = LocalSearchEngine::new(&problem, &params, Instant::now()).run(crossing());
        assert!(!outcome.search_complete);
        assert_eq!(outcome.iterations, 200);
        assert!(outcome.penalty_escapes > 0);
        assert_eq!(outcome.best_cost, 24);
        assert_eq!(outcome.best.cost(&problem), outcome.best_cost);
        assert!(outcome.best.is_feasible(&problem));
    }

    #[rstest]
    fn iteration_capped_runs_are_deterministic(problem: RoutingProblem) {
        let params = SearchParameters::default()
            .with_time_limit(Duration::from_secs(30))
            .with_iteration_limit(50);
        let first = LocalSearchEngine::new(&problem, &params, Instant::now()).run(crossing());
        let second = LocalSearchEngine::new(&problem, &params, Instant::now()).run(crossing());
        assert_eq!(first, second);
    }

    #[rstest]
    fn nothing_to_search_is_complete() {
        let problem =
            RoutingProblem::new(vec![vec![0]], vec![0], vec![1], 1, 0).expect("valid problem");
        let params = SearchParameters::default();
        let outcome =
            LocalSearchEngine::new(&problem, &params, Instant::now()).run(Assignment::empty(1));
        assert!(outcome.search_complete);
        assert_eq!(outcome.best_cost, 0);
    }

    #[rstest]
    fn single_neighbourhood_limits_the_moves(problem: RoutingProblem) {
        let params = SearchParameters::default()
            .with_metaheuristic(LocalSearchMetaheuristic::GreedyDescent)
            .with_neighbourhoods([Neighbourhood::TwoOpt]);
        let outcome = LocalSearchEngine::new(&problem, &params, Instant::now()).run(crossing());
        assert!(outcome.search_complete);
        let mut stops: Vec<Vec<usize>> = outcome.best.routes().to_vec();
        for route in &mut stops {
            route.sort_unstable();
        }
        assert_eq!(stops, vec![vec![1, 2, 4], vec![3, 5, 6]]);
    }

    #[rstest]
    #[case(100, 60, 6, 1_000)]
    #[case(100, 7, 7, 100)]
    #[case(1, 1, 1_000, 1)]
    #[case(0, 60, 6, 0)]
    #[case(100, 0, 6, 0)]
    fn lambda_scales_with_average_arc_cost(
        #[case] factor: u32,
        #[case] cost: Cost,
        #[case] arcs: usize,
        #[case] expected: Cost,
    ) {
        assert_eq!(guided_lambda(factor, cost, arcs), expected);
    }
}
