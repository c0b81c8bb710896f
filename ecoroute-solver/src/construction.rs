//! Heuristics producing the first feasible assignment.
//!
//! Every heuristic is greedy and deterministic: ties are broken by lowest
//! node index, then lowest vehicle, then lowest position. A greedy pass can
//! strand a stop even when a feasible packing exists, so
//! [`construct_with_fallback`] retries with the other strategy and then with
//! [`FirstFitDecreasing`] before reporting the problem infeasible.

use ecoroute_core::{
    Assignment, CapacityTracker, Demand, FirstSolutionStrategy, InfeasibleReason, RoutingProblem,
};
use log::debug;

use crate::search::link_cost;

/// Build one feasible [`Assignment`] for a problem.
pub trait ConstructionHeuristic: Send + Sync {
    /// Place every stop on some vehicle without exceeding any capacity.
    ///
    /// # Errors
    ///
    /// Returns [`InfeasibleReason::Unplaceable`] naming a stop that cannot be
    /// placed on any vehicle.
    fn construct(&self, problem: &RoutingProblem) -> Result<Assignment, InfeasibleReason>;
}

/// Heuristic implementing `strategy`.
///
/// # Examples
/// ```
/// use ecoroute_core::{FirstSolutionStrategy, RoutingProblem};
/// use ecoroute_solver::construction_heuristic;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let problem = RoutingProblem::new(
///     vec![vec![0, 1, 2], vec![1, 0, 1], vec![2, 1, 0]],
///     vec![0, 1, 1],
///     vec![2],
///     1,
///     0,
/// )?;
/// let heuristic = construction_heuristic(FirstSolutionStrategy::PathCheapestArc);
/// let assignment = heuristic.construct(&problem)?;
/// assert_eq!(assignment.route(0), &[1, 2]);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn construction_heuristic(strategy: FirstSolutionStrategy) -> Box<dyn ConstructionHeuristic> {
    match strategy {
        FirstSolutionStrategy::CheapestInsertion => Box::new(CheapestInsertion),
        FirstSolutionStrategy::PathCheapestArc => Box::new(PathCheapestArc),
    }
}

/// Construct with `strategy`, then with the other strategy, then with
/// [`FirstFitDecreasing`], returning the first assignment found.
///
/// # Errors
///
/// Returns the error of the `strategy` heuristic when every attempt fails.
///
/// # Examples
/// ```
/// use ecoroute_core::{FirstSolutionStrategy, RoutingProblem};
/// use ecoroute_solver::construct_with_fallback;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let positions: [i64; 6] = [0, 1, 10, 2, 11, 20];
/// let matrix = positions
///     .iter()
///     .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
///     .collect();
/// let problem = RoutingProblem::new(matrix, vec![0, 3, 3, 2, 2, 2], vec![6, 6], 2, 0)?;
/// let assignment = construct_with_fallback(FirstSolutionStrategy::CheapestInsertion, &problem)?;
/// assert!(assignment.is_feasible(&problem));
/// # Ok(())
/// # }
/// ```
pub fn construct_with_fallback(
    strategy: FirstSolutionStrategy,
    problem: &RoutingProblem,
) -> Result<Assignment, InfeasibleReason> {
    let first_error = match construction_heuristic(strategy).construct(problem) {
        Ok(assignment) => return Ok(assignment),
        Err(reason) => reason,
    };
    let other = match strategy {
        FirstSolutionStrategy::CheapestInsertion => FirstSolutionStrategy::PathCheapestArc,
        FirstSolutionStrategy::PathCheapestArc => FirstSolutionStrategy::CheapestInsertion,
    };
    debug!("{strategy:?} construction failed: {first_error}; retrying with {other:?}");
    if let Ok(assignment) = construction_heuristic(other).construct(problem) {
        return Ok(assignment);
    }
    debug!("{other:?} construction failed; retrying with first fit decreasing");
    FirstFitDecreasing
        .construct(problem)
        .map_err(|_| first_error)
}

/// Cheapest position for `node` in `route` and the cost of inserting it
/// there.
fn cheapest_position(problem: &RoutingProblem, route: &[usize], node: usize) -> (usize, i128) {
    let depot = problem.depot();
    let mut best = (0, i128::MAX);
    for position in 0..=route.len() {
        let prev = position
            .checked_sub(1)
            .and_then(|p| route.get(p))
            .copied()
            .unwrap_or(depot);
        let next = route.get(position).copied().unwrap_or(depot);
        let delta = i128::from(problem.arc(prev, node)) + i128::from(problem.arc(node, next))
            - i128::from(link_cost(problem, prev, next));
        if delta < best.1 {
            best = (position, delta);
        }
    }
    best
}

/// Repeatedly insert the stop whose cheapest feasible insertion costs least.
#[derive(Debug, Default, Clone, Copy)]
pub struct CheapestInsertion;

#[derive(Debug, Clone, Copy)]
struct Insertion {
    vehicle: usize,
    position: usize,
    load: Demand,
    delta: i128,
}

impl CheapestInsertion {
    fn cheapest_for(
        problem: &RoutingProblem,
        tracker: &CapacityTracker<'_>,
        assignment: &Assignment,
        loads: &[Demand],
        node: usize,
    ) -> Option<Insertion> {
        let mut best: Option<Insertion> = None;
        for (vehicle, &load_so_far) in loads.iter().enumerate() {
            let Some(load) = tracker.can_append(vehicle, load_so_far, node) else {
                continue;
            };
            let (position, delta) = cheapest_position(problem, assignment.route(vehicle), node);
            if best.is_none_or(|b| delta < b.delta) {
                best = Some(Insertion {
                    vehicle,
                    position,
                    load,
                    delta,
                });
            }
        }
        best
    }
}

impl ConstructionHeuristic for CheapestInsertion {
    fn construct(&self, problem: &RoutingProblem) -> Result<Assignment, InfeasibleReason> {
        let tracker = CapacityTracker::new(problem);
        let mut assignment = Assignment::empty(problem.vehicle_count());
        let mut loads: Vec<Demand> = vec![0; problem.vehicle_count()];
        let mut unassigned: Vec<usize> = problem.stops().collect();

        while !unassigned.is_empty() {
            let mut chosen: Option<(usize, usize, Insertion)> = None;
            for (slot, &node) in unassigned.iter().enumerate() {
                let insertion = Self::cheapest_for(problem, &tracker, &assignment, &loads, node)
                    .ok_or(InfeasibleReason::Unplaceable { node })?;
                if chosen.is_none_or(|(_, _, best)| insertion.delta < best.delta) {
                    chosen = Some((slot, node, insertion));
                }
            }
            let Some((slot, node, insertion)) = chosen else {
                break;
            };
            if let Some(route) = assignment.route_mut(insertion.vehicle) {
                route.insert(insertion.position, node);
            }
            if let Some(load) = loads.get_mut(insertion.vehicle) {
                *load = insertion.load;
            }
            unassigned.remove(slot);
        }

        debug!(
            "cheapest insertion placed {} stops, initial cost {}",
            assignment.assigned_count(),
            assignment.cost(problem)
        );
        Ok(assignment)
    }
}

/// Fill vehicles one at a time, always extending with the cheapest arc to a
/// stop that still fits.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathCheapestArc;

impl ConstructionHeuristic for PathCheapestArc {
    fn construct(&self, problem: &RoutingProblem) -> Result<Assignment, InfeasibleReason> {
        let tracker = CapacityTracker::new(problem);
        let mut assignment = Assignment::empty(problem.vehicle_count());
        let mut unassigned: Vec<usize> = problem.stops().collect();

        for vehicle in 0..problem.vehicle_count() {
            if unassigned.is_empty() {
                break;
            }
            let mut current = problem.depot();
            let mut load: Demand = 0;
            while let Some((slot, node, next_load)) = unassigned
                .iter()
                .enumerate()
                .filter_map(|(slot, &node)| {
                    tracker
                        .can_append(vehicle, load, node)
                        .map(|next_load| (slot, node, next_load))
                })
                .min_by_key(|&(_, node, _)| (problem.arc(current, node), node))
            {
                if let Some(route) = assignment.route_mut(vehicle) {
                    route.push(node);
                }
                unassigned.remove(slot);
                current = node;
                load = next_load;
            }
        }

        if let Some(&node) = unassigned.first() {
            return Err(InfeasibleReason::Unplaceable { node });
        }
        debug!(
            "path cheapest arc placed {} stops, initial cost {}",
            assignment.assigned_count(),
            assignment.cost(problem)
        );
        Ok(assignment)
    }
}

/// Place stops in order of decreasing demand, each on the lowest-numbered
/// vehicle that still has room, at that route's cheapest position.
///
/// This packs tighter than the cost-driven heuristics but is still greedy: it
/// can miss a packing that exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstFitDecreasing;

impl ConstructionHeuristic for FirstFitDecreasing {
    fn construct(&self, problem: &RoutingProblem) -> Result<Assignment, InfeasibleReason> {
        let tracker = CapacityTracker::new(problem);
        let mut assignment = Assignment::empty(problem.vehicle_count());
        let mut loads: Vec<Demand> = vec![0; problem.vehicle_count()];
        let mut stops: Vec<usize> = problem.stops().collect();
        stops.sort_by_key(|&node| (std::cmp::Reverse(problem.demand(node)), node));

        for node in stops {
            let (vehicle, load) = loads
                .iter()
                .enumerate()
                .find_map(|(vehicle, &load_so_far)| {
                    tracker
                        .can_append(vehicle, load_so_far, node)
                        .map(|load| (vehicle, load))
                })
                .ok_or(InfeasibleReason::Unplaceable { node })?;
            let (position, _) = cheapest_position(problem, assignment.route(vehicle), node);
            if let Some(route) = assignment.route_mut(vehicle) {
                route.insert(position, node);
            }
            if let Some(slot) = loads.get_mut(vehicle) {
                *slot = load;
            }
        }

        debug!(
            "first fit decreasing placed {} stops, initial cost {}",
            assignment.assigned_count(),
            assignment.cost(problem)
        );
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoroute_core::Cost;
    use rstest::{fixture, rstest};

    /// Depot in the middle of a line with two stops on each side.
    #[fixture]
    fn line() -> RoutingProblem {
        let positions: [i64; 5] = [0, -2, -1, 1, 2];
        let matrix = positions
            .iter()
            .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
            .collect();
        RoutingProblem::new(matrix, vec![0, 2, 2, 2, 2], vec![4, 4], 2, 0).expect("valid problem")
    }

    #[rstest]
    #[case(FirstSolutionStrategy::CheapestInsertion)]
    #[case(FirstSolutionStrategy::PathCheapestArc)]
    fn builds_feasible_assignment(line: RoutingProblem, #[case] strategy: FirstSolutionStrategy) {
        let assignment = construction_heuristic(strategy)
            .construct(&line)
            .expect("feasible");
        assert!(assignment.is_feasible(&line));
        assert_eq!(assignment.cost(&line), 8);
    }

    #[rstest]
    fn cheapest_insertion_breaks_ties_by_lowest_index(line: RoutingProblem) {
        let assignment = CheapestInsertion.construct(&line).expect("feasible");
        assert_eq!(assignment.routes(), &[vec![1, 2], vec![4, 3]]);
    }

    #[rstest]
    fn path_cheapest_arc_fills_first_vehicle_first(line: RoutingProblem) {
        let assignment = PathCheapestArc.construct(&line).expect("feasible");
        assert_eq!(assignment.routes(), &[vec![2, 1], vec![3, 4]]);
    }

    #[rstest]
    #[case(FirstSolutionStrategy::CheapestInsertion)]
    #[case(FirstSolutionStrategy::PathCheapestArc)]
    fn oversized_stop_is_unplaceable(#[case] strategy: FirstSolutionStrategy) {
        let problem = RoutingProblem::new(
            vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]],
            vec![0, 1, 9],
            vec![5],
            1,
            0,
        )
        .expect("valid problem");
        let err = construction_heuristic(strategy)
            .construct(&problem)
            .expect_err("stop 2 cannot fit");
        assert_eq!(err, InfeasibleReason::Unplaceable { node: 2 });
    }

    /// Two trucks whose capacities only add up if the heavy stops share one.
    #[fixture]
    fn tight_packing() -> RoutingProblem {
        let positions: [i64; 6] = [0, 1, 10, 2, 11, 20];
        let matrix = positions
            .iter()
            .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
            .collect();
        RoutingProblem::new(matrix, vec![0, 3, 3, 2, 2, 2], vec![6, 6], 2, 0)
            .expect("valid problem")
    }

    #[rstest]
    fn cheapest_insertion_strands_a_stop_on_tight_packing(tight_packing: RoutingProblem) {
        let err = CheapestInsertion
            .construct(&tight_packing)
            .expect_err("greedy packing dead ends");
        assert!(matches!(err, InfeasibleReason::Unplaceable { .. }));
    }

    #[rstest]
    fn first_fit_decreasing_finds_tight_packing(tight_packing: RoutingProblem) {
        let assignment = FirstFitDecreasing
            .construct(&tight_packing)
            .expect("feasible");
        assert!(assignment.is_feasible(&tight_packing));
        assert_eq!(assignment.route(0), &[1, 2]);
        let mut second = assignment.route(1).to_vec();
        second.sort_unstable();
        assert_eq!(second, vec![3, 4, 5]);
    }

    #[rstest]
    #[case(FirstSolutionStrategy::CheapestInsertion)]
    #[case(FirstSolutionStrategy::PathCheapestArc)]
    fn fallback_recovers_from_greedy_dead_end(
        tight_packing: RoutingProblem,
        #[case] strategy: FirstSolutionStrategy,
    ) {
        let assignment = construct_with_fallback(strategy, &tight_packing).expect("feasible");
        assert!(assignment.is_feasible(&tight_packing));
        assert_eq!(assignment.assigned_count(), 5);
    }

    #[rstest]
    fn fallback_keeps_the_requested_strategy_when_it_succeeds(line: RoutingProblem) {
        let assignment =
            construct_with_fallback(FirstSolutionStrategy::PathCheapestArc, &line).expect("feasible");
        assert_eq!(assignment.routes(), &[vec![2, 1], vec![3, 4]]);
    }

    #[rstest]
    fn fallback_reports_the_first_error_when_all_fail() {
        let problem = RoutingProblem::new(
            vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]],
            vec![0, 1, 9],
            vec![5],
            1,
            0,
        )
        .expect("valid problem");
        let err = construct_with_fallback(FirstSolutionStrategy::CheapestInsertion, &problem)
            .expect_err("stop 2 cannot fit");
        assert_eq!(err, InfeasibleReason::Unplaceable { node: 2 });
    }

    #[rstest]
    fn insertion_costs_do_not_wrap_on_huge_arcs() {
        let far = Cost::MAX - 1;
        let problem = RoutingProblem::new(
            vec![vec![0, far, far], vec![far, 0, far], vec![far, far, 0]],
            vec![0, 1, 1],
            vec![2],
            1,
            0,
        )
        .expect("valid problem");
        let assignment = CheapestInsertion.construct(&problem).expect("feasible");
        assert_eq!(assignment.routes(), &[vec![2, 1]]);
    }

    #[rstest]
    fn empty_problem_yields_empty_routes() {
        let problem =
            RoutingProblem::new(vec![vec![0]], vec![0], vec![3, 3], 2, 0).expect("valid problem");
        let assignment = CheapestInsertion.construct(&problem).expect("feasible");
        assert_eq!(assignment.assigned_count(), 0);
        assert_eq!(assignment.vehicle_count(), 2);
    }

    #[rstest]
    fn non_zero_depot_is_never_routed() {
        let problem = RoutingProblem::new(
            vec![vec![0, 3, 1], vec![3, 0, 2], vec![1, 2, 0]],
            vec![1, 1, 0],
            vec![2],
            1,
            2,
        )
        .expect("valid problem");
        let assignment = CheapestInsertion.construct(&problem).expect("feasible");
        assert_eq!(assignment.routes(), &[vec![1, 0]]);
    }
}
