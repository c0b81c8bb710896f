//! Cumulative capacity dimension evaluated along a route.

use thiserror::Error;

use crate::{Demand, RoutingProblem};

/// A prefix of a route carried more than its vehicle allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("vehicle {vehicle} would carry {load} after position {position}, above capacity {capacity}")]
pub struct CapacityViolation {
    /// Vehicle whose capacity was exceeded.
    pub vehicle: usize,
    /// Zero-based position in the stop sequence where the excess appears.
    pub position: usize,
    /// Running load at that position.
    pub load: Demand,
    /// Capacity of the vehicle.
    pub capacity: Demand,
}

/// Tracks the running load of a vehicle as stops are visited.
///
/// Depot visits carry no demand and never change the load.
///
/// # Examples
/// ```
/// use ecoroute_core::{CapacityTracker, RoutingProblem};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let problem = RoutingProblem::new(
///     vec![vec![0; 3]; 3],
///     vec![0, 2, 3],
///     vec![4],
///     1,
///     0,
/// )?;
/// let tracker = CapacityTracker::new(&problem);
/// assert_eq!(tracker.cumulative_loads(&[1, 2]), vec![2, 5]);
/// assert!(tracker.check(0, &[1, 2]).is_err());
/// assert_eq!(tracker.can_append(0, 2, 2), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CapacityTracker<'a> {
    problem: &'a RoutingProblem,
}

impl<'a> CapacityTracker<'a> {
    /// Track loads for `problem`.
    #[must_use]
    pub const fn new(problem: &'a RoutingProblem) -> Self {
        Self { problem }
    }

    /// Running load after each stop of `route`.
    #[must_use]
    pub fn cumulative_loads(&self, route: &[usize]) -> Vec<Demand> {
        route
            .iter()
            .scan(0, |load: &mut Demand, &node| {
                *load = load.saturating_add(self.problem.demand(node));
                Some(*load)
            })
            .collect()
    }

    /// Total load delivered along `route`.
    #[must_use]
    pub fn load(&self, route: &[usize]) -> Demand {
        route
            .iter()
            .map(|&node| self.problem.demand(node))
            .fold(0, Demand::saturating_add)
    }

    /// Verify every prefix of `route` fits in `vehicle`.
    ///
    /// # Errors
    ///
    /// Returns the first [`CapacityViolation`] found along the route.
    pub fn check(&self, vehicle: usize, route: &[usize]) -> Result<Demand, CapacityViolation> {
        let capacity = self.problem.capacity(vehicle);
        let mut total = 0;
        for (position, load) in self.cumulative_loads(route).into_iter().enumerate() {
            if load > capacity {
                return Err(CapacityViolation {
                    vehicle,
                    position,
                    load,
                    capacity,
                });
            }
            total = load;
        }
        Ok(total)
    }

    /// Load after appending `node` to a route already carrying
    /// `load_so_far`, or `None` when the vehicle would overflow.
    #[must_use]
    pub fn can_append(&self, vehicle: usize, load_so_far: Demand, node: usize) -> Option<Demand> {
        let load = load_so_far.checked_add(self.problem.demand(node))?;
        (load <= self.problem.capacity(vehicle)).then_some(load)
    }

    /// Whether `vehicle` can serve `route` plus `extra` in any order.
    ///
    /// Demands are non-negative, so the running load peaks at the last stop
    /// and total load decides feasibility wherever `extra` is inserted.
    #[must_use]
    pub fn fits_with(&self, vehicle: usize, route: &[usize], extra: usize) -> bool {
        self.can_append(vehicle, self.load(route), extra).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn problem() -> RoutingProblem {
        RoutingProblem::new(vec![vec![0; 4]; 4], vec![5, 1, 2, 3], vec![5, 3], 2, 0)
            .expect("valid problem")
    }

    #[rstest]
    fn running_loads_accumulate(problem: RoutingProblem) {
        let tracker = CapacityTracker::new(&problem);
        assert_eq!(tracker.cumulative_loads(&[3, 1, 2]), vec![3, 4, 6]);
        assert_eq!(tracker.load(&[3, 1, 2]), 6);
    }

    #[rstest]
    fn depot_visits_do_not_change_load(problem: RoutingProblem) {
        let tracker = CapacityTracker::new(&problem);
        assert_eq!(tracker.cumulative_loads(&[0, 1, 0]), vec![0, 1, 1]);
    }

    #[rstest]
    fn check_reports_first_overflowing_prefix(problem: RoutingProblem) {
        let tracker = CapacityTracker::new(&problem);
        let violation = tracker.check(1, &[1, 3, 2]).expect_err("overflow");
        assert_eq!(
            violation,
            CapacityViolation {
                vehicle: 1,
                position: 1,
                load: 4,
                capacity: 3,
            }
        );
        assert_eq!(tracker.check(0, &[1, 3]), Ok(4));
    }

    #[rstest]
    #[case(0, 4, 1, Some(5))]
    #[case(0, 4, 2, None)]
    #[case(1, 0, 3, Some(3))]
    #[case(1, 1, 3, None)]
    fn can_append_respects_capacity(
        problem: RoutingProblem,
        #[case] vehicle: usize,
        #[case] load: Demand,
        #[case] node: usize,
        #[case] expected: Option<Demand>,
    ) {
        let tracker = CapacityTracker::new(&problem);
        assert_eq!(tracker.can_append(vehicle, load, node), expected);
    }

    #[rstest]
    fn fits_with_uses_total_load(problem: RoutingProblem) {
        let tracker = CapacityTracker::new(&problem);
        assert!(tracker.fits_with(0, &[1, 2], 1));
        assert!(!tracker.fits_with(1, &[1], 3));
    }

    #[rstest]
    fn unbounded_capacity_never_wraps() {
        let problem =
            RoutingProblem::new(vec![vec![0; 3]; 3], vec![0, 1, 1], vec![Demand::MAX], 1, 0)
                .expect("valid problem");
        let tracker = CapacityTracker::new(&problem);
        assert_eq!(tracker.check(0, &[1, 2]), Ok(2));
        assert_eq!(tracker.can_append(0, Demand::MAX - 1, 1), Some(Demand::MAX));
        assert_eq!(tracker.can_append(0, Demand::MAX, 1), None);
        assert!(tracker.fits_with(0, &[1], 2));
    }
}
