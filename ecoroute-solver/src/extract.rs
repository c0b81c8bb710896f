//! Convert a frozen [`Solution`] into caller-facing [`Route`] records.

use ecoroute_core::{Cost, Route, RoutingProblem, Solution};
use log::warn;

/// Walks successor links from each vehicle's start slot to its end slot.
///
/// # Examples
/// ```
/// use ecoroute_core::{Assignment, RoutingProblem, Solution};
/// use ecoroute_solver::SolutionExtractor;
///
/// # fn main() -> Result<(), ecoroute_core::InvalidInputError> {
/// let problem = RoutingProblem::new(
///     vec![vec![0, 2, 3], vec![2, 0, 4], vec![3, 4, 0]],
///     vec![0, 1, 2],
///     vec![3, 3],
///     2,
///     0,
/// )?;
/// let solution = Solution::freeze(&Assignment::from_routes(vec![vec![], vec![2, 1]]), &problem);
/// let routes = SolutionExtractor::new(&problem).extract(&solution);
/// assert_eq!(routes.len(), 1);
/// assert_eq!(routes[0].vehicle_id, 1);
/// assert_eq!(routes[0].node_sequence, vec![0, 2, 1, 0]);
/// assert_eq!(routes[0].load_sequence, vec![0, 2, 1, 0]);
/// assert_eq!(routes[0].total_distance, 9);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SolutionExtractor<'a> {
    problem: &'a RoutingProblem,
}

impl<'a> SolutionExtractor<'a> {
    /// Extractor for solutions of `problem`.
    #[must_use]
    pub const fn new(problem: &'a RoutingProblem) -> Self {
        Self { problem }
    }

    /// Routes of every vehicle with at least one stop, in vehicle order.
    #[must_use]
    pub fn extract(&self, solution: &Solution) -> Vec<Route> {
        let vehicles = solution.index_manager().vehicle_count();
        (0..vehicles)
            .filter(|&vehicle| solution.is_vehicle_used(vehicle))
            .filter_map(|vehicle| self.route_of(solution, vehicle))
            .collect()
    }

    /// Sum of `total_distance` over `routes`.
    #[must_use]
    pub fn objective(routes: &[Route]) -> Cost {
        routes
            .iter()
            .map(|route| route.total_distance)
            .fold(0, Cost::saturating_add)
    }

    fn route_of(&self, solution: &Solution, vehicle: usize) -> Option<Route> {
        let manager = solution.index_manager();
        let start = manager.start(vehicle)?;
        let end = manager.end(vehicle)?;
        let depot = self.problem.depot();

        let mut node_sequence = vec![depot];
        let mut current = start;
        // Each variable index is visited at most once on a well-formed chain.
        for _ in 0..manager.size() {
            let Some(next) = solution.next(current) else {
                break;
            };
            if next == end {
                node_sequence.push(depot);
                return Some(self.build(vehicle, node_sequence));
            }
            node_sequence.push(manager.node_of(next)?);
            current = next;
        }

        warn!("route of vehicle {vehicle} does not reach its end slot; dropping it");
        debug_assert!(false, "broken successor chain for vehicle {vehicle}");
        None
    }

    fn build(&self, vehicle_id: usize, node_sequence: Vec<usize>) -> Route {
        let load_sequence = node_sequence
            .iter()
            .map(|&node| self.problem.demand(node))
            .collect();
        let total_distance = node_sequence
            .windows(2)
            .filter_map(|pair| match pair {
                [from, to] => Some(self.problem.arc(*from, *to)),
                _ => None,
            })
            .fold(0, Cost::saturating_add);
        Route {
            vehicle_id,
            node_sequence,
            load_sequence,
            total_distance,
        }
    }
}
