//! Search state, its frozen snapshot and the routes reported to callers.
//!
//! An [`Assignment`] is the mutable state the construction and local-search
//! phases work on: one ordered list of stops per vehicle, depots implicit.
//! When the search ends it is frozen into a [`Solution`], which records the
//! successor of every routing variable and the objective. [`Route`] values
//! are derived from a solution for output.

use crate::{CapacityTracker, Cost, Demand, IndexManager, RoutingProblem, VariableIndex};

/// Per-vehicle visit order under construction or improvement.
///
/// Routes hold non-depot stops only; every route implicitly leaves from and
/// returns to the depot.
///
/// # Examples
/// ```
/// use ecoroute_core::{Assignment, RoutingProblem};
///
/// # fn main() -> Result<(), ecoroute_core::InvalidInputError> {
/// let problem = RoutingProblem::new(
///     vec![vec![0, 2, 3], vec![2, 0, 4], vec![3, 4, 0]],
///     vec![0, 1, 1],
///     vec![2],
///     1,
///     0,
/// )?;
/// let assignment = Assignment::from_routes(vec![vec![1, 2]]);
/// assert!(assignment.is_feasible(&problem));
/// assert_eq!(assignment.cost(&problem), 9);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    routes: Vec<Vec<usize>>,
}

impl Assignment {
    /// An assignment with `vehicle_count` empty routes.
    #[must_use]
    pub fn empty(vehicle_count: usize) -> Self {
        Self {
            routes: vec![Vec::new(); vehicle_count],
        }
    }

    /// Wrap explicit per-vehicle stop lists.
    #[must_use]
    pub const fn from_routes(routes: Vec<Vec<usize>>) -> Self {
        Self { routes }
    }

    /// Number of vehicles covered.
    #[must_use]
    pub fn vehicle_count(&self) -> usize {
        self.routes.len()
    }

    /// Stops served by `vehicle`, or an empty slice for unknown vehicles.
    #[must_use]
    pub fn route(&self, vehicle: usize) -> &[usize] {
        self.routes.get(vehicle).map_or(&[], Vec::as_slice)
    }

    /// Mutable stop list of `vehicle`.
    pub fn route_mut(&mut self, vehicle: usize) -> Option<&mut Vec<usize>> {
        self.routes.get_mut(vehicle)
    }

    /// All routes in vehicle order.
    #[must_use]
    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    /// Number of stops placed on any vehicle.
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }

    /// Total true travel cost over all vehicles.
    #[must_use]
    pub fn cost(&self, problem: &RoutingProblem) -> Cost {
        self.routes
            .iter()
            .map(|route| problem.route_cost(route))
            .fold(0, Cost::saturating_add)
    }

    /// Number of arcs travelled, depot legs included.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.routes
            .iter()
            .filter(|route| !route.is_empty())
            .map(|route| route.len() + 1)
            .sum()
    }

    /// Whether every stop is visited exactly once and no vehicle overflows.
    #[must_use]
    pub fn is_feasible(&self, problem: &RoutingProblem) -> bool {
        if self.routes.len() != problem.vehicle_count() {
            return false;
        }
        let mut seen = vec![false; problem.node_count()];
        for route in &self.routes {
            for &node in route {
                if node == problem.depot() {
                    return false;
                }
                match seen.get_mut(node) {
                    Some(slot) if !*slot => *slot = true,
                    _ => return false,
                }
            }
        }
        if problem.stops().any(|node| !seen.get(node).copied().unwrap_or(false)) {
            return false;
        }
        let tracker = CapacityTracker::new(problem);
        self.routes
            .iter()
            .enumerate()
            .all(|(vehicle, route)| tracker.check(vehicle, route).is_ok())
    }
}

/// Immutable result of a search, stored as successor links.
///
/// Each vehicle's chain runs from its start slot through its stops to its end
/// slot. End slots and unassigned stops have no successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    manager: IndexManager,
    next: Vec<Option<VariableIndex>>,
    objective: Cost,
}

impl Solution {
    /// Snapshot `assignment` for `problem`.
    ///
    /// # Examples
    /// ```
    /// use ecoroute_core::{Assignment, IndexManager, RoutingProblem, Solution};
    ///
    /// # fn main() -> Result<(), ecoroute_core::InvalidInputError> {
    /// let problem = RoutingProblem::new(
    ///     vec![vec![0, 2, 3], vec![2, 0, 4], vec![3, 4, 0]],
    ///     vec![0, 1, 1],
    ///     vec![2, 2],
    ///     2,
    ///     0,
    /// )?;
    /// let solution = Solution::freeze(&Assignment::from_routes(vec![vec![2], vec![]]), &problem);
    /// let manager = solution.index_manager();
    /// let start = manager.start(0).expect("vehicle 0");
    /// let first = solution.next(start).expect("successor");
    /// assert_eq!(manager.node_of(first), Some(2));
    /// assert_eq!(solution.objective(), 6);
    /// assert!(!solution.is_vehicle_used(1));
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn freeze(assignment: &Assignment, problem: &RoutingProblem) -> Self {
        let manager = IndexManager::for_problem(problem);
        let mut next = vec![None; manager.size()];
        for vehicle in 0..manager.vehicle_count() {
            let (Some(start), Some(end)) = (manager.start(vehicle), manager.end(vehicle)) else {
                continue;
            };
            let mut current = start;
            for &node in assignment.route(vehicle) {
                let Some(index) = manager.variable_index_of(vehicle, node) else {
                    continue;
                };
                if let Some(slot) = next.get_mut(current.get()) {
                    *slot = Some(index);
                }
                current = index;
            }
            if let Some(slot) = next.get_mut(current.get()) {
                *slot = Some(end);
            }
        }
        Self {
            manager,
            next,
            objective: assignment.cost(problem),
        }
    }

    /// Index layout the successor links refer to.
    #[must_use]
    pub const fn index_manager(&self) -> &IndexManager {
        &self.manager
    }

    /// Successor of `index`, or `None` at an end slot or unassigned stop.
    #[must_use]
    pub fn next(&self, index: VariableIndex) -> Option<VariableIndex> {
        self.next.get(index.get()).copied().flatten()
    }

    /// Total true distance of the snapshot.
    #[must_use]
    pub const fn objective(&self) -> Cost {
        self.objective
    }

    /// Whether `vehicle` leaves the depot at all.
    #[must_use]
    pub fn is_vehicle_used(&self, vehicle: usize) -> bool {
        match (self.manager.start(vehicle), self.manager.end(vehicle)) {
            (Some(start), Some(end)) => self.next(start).is_some_and(|first| first != end),
            _ => false,
        }
    }
}

/// One vehicle's trip as reported to callers.
///
/// `node_sequence` starts and ends at the depot. `load_sequence[i]` is the
/// demand delivered at `node_sequence[i]`, so both depot positions carry
/// zero.
///
/// # Examples
/// ```
/// use ecoroute_core::Route;
///
/// let route = Route {
///     vehicle_id: 0,
///     node_sequence: vec![0, 3, 1, 0],
///     load_sequence: vec![0, 2, 1, 0],
///     total_distance: 12,
/// };
/// assert_eq!(route.stops(), &[3, 1]);
/// assert_eq!(route.cumulative_loads(), vec![0, 2, 3, 3]);
/// assert_eq!(route.total_load(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Vehicle serving the route.
    pub vehicle_id: usize,
    /// Visited nodes, depot first and last.
    pub node_sequence: Vec<usize>,
    /// Demand delivered at each position of `node_sequence`.
    pub load_sequence: Vec<Demand>,
    /// Sum of arc costs along `node_sequence`.
    pub total_distance: Cost,
}

impl Route {
    /// Stops between the two depot visits.
    #[must_use]
    pub fn stops(&self) -> &[usize] {
        let len = self.node_sequence.len();
        if len < 2 {
            return &[];
        }
        self.node_sequence.get(1..len - 1).unwrap_or(&[])
    }

    /// Running load carried after each position.
    #[must_use]
    pub fn cumulative_loads(&self) -> Vec<Demand> {
        self.load_sequence
            .iter()
            .scan(0, |load: &mut Demand, &demand| {
                *load = load.saturating_add(demand);
                Some(*load)
            })
            .collect()
    }

    /// Total quantity delivered on the route.
    #[must_use]
    pub fn total_load(&self) -> Demand {
        self.load_sequence
            .iter()
            .copied()
            .fold(0, Demand::saturating_add)
    }
}
