//! The immutable routing problem handed to every solver component.

use crate::{Cost, Demand, InvalidInputError};

/// Square matrix of non-negative travel costs stored as a flat row-major arena.
///
/// # Examples
/// ```
/// use ecoroute_core::DistanceMatrix;
///
/// # fn main() -> Result<(), ecoroute_core::InvalidInputError> {
/// let matrix = DistanceMatrix::from_rows(vec![vec![0, 4], vec![6, 0]])?;
/// assert_eq!(matrix.size(), 2);
/// assert_eq!(matrix.arc(0, 1), 4);
/// assert_eq!(matrix.arc(1, 0), 6);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    size: usize,
    arcs: Vec<Cost>,
}

impl DistanceMatrix {
    /// Validate and flatten a row-major matrix.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::NonSquareMatrix`] when a row length differs
    /// from the row count and [`InvalidInputError::NegativeDistance`] for any
    /// negative entry.
    pub fn from_rows(rows: Vec<Vec<Cost>>) -> Result<Self, InvalidInputError> {
        let size = rows.len();
        let mut arcs = Vec::with_capacity(size.saturating_mul(size));
        for (from, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(InvalidInputError::NonSquareMatrix {
                    row: from,
                    columns: row.len(),
                    expected: size,
                });
            }
            if let Some((to, &distance)) = row.iter().enumerate().find(|(_, d)| **d < 0) {
                return Err(InvalidInputError::NegativeDistance { from, to, distance });
            }
            arcs.extend(row);
        }
        Ok(Self { size, arcs })
    }

    /// Number of nodes covered by the matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Cost of travelling from `from` to `to`.
    ///
    /// Indices are validated when the problem is built; an out-of-range lookup
    /// is a programming error and yields zero in release builds.
    #[must_use]
    pub fn arc(&self, from: usize, to: usize) -> Cost {
        let cost = self.offset(from, to).and_then(|idx| self.arcs.get(idx)).copied();
        debug_assert!(
            cost.is_some(),
            "matrix lookup out of range: from={from}, to={to}, size={}",
            self.size
        );
        cost.unwrap_or(0)
    }

    /// Iterate the matrix row by row.
    pub fn rows(&self) -> impl Iterator<Item = &[Cost]> {
        self.arcs.chunks(self.size.max(1))
    }

    fn offset(&self, from: usize, to: usize) -> Option<usize> {
        (from < self.size && to < self.size).then(|| from * self.size + to)
    }
}

/// Validated capacitated vehicle routing problem.
///
/// The problem owns the distance matrix, the demand of every node and the
/// capacity of every vehicle. Once built it is never mutated; solver
/// components borrow it for the whole run.
///
/// # Examples
/// ```
/// use ecoroute_core::RoutingProblem;
///
/// # fn main() -> Result<(), ecoroute_core::InvalidInputError> {
/// let problem = RoutingProblem::new(
///     vec![vec![0, 2, 3], vec![2, 0, 4], vec![3, 4, 0]],
///     vec![0, 1, 2],
///     vec![5],
///     1,
///     0,
/// )?;
/// assert_eq!(problem.node_count(), 3);
/// assert_eq!(problem.route_cost(&[1, 2]), 9);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingProblem {
    distances: DistanceMatrix,
    demands: Vec<Demand>,
    capacities: Vec<Demand>,
    depot: usize,
}

impl RoutingProblem {
    /// Validate and construct a problem.
    ///
    /// The depot's demand is ignored: it always carries zero load.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] when the matrix is not `N×N` for `N`
    /// demands, the capacity count differs from `vehicle_count`, the fleet is
    /// empty, a capacity is not positive, a demand or distance is negative,
    /// the stop demands overflow [`Demand`], or the depot index is out of
    /// range.
    pub fn new(
        distance_matrix: Vec<Vec<Cost>>,
        demands: Vec<Demand>,
        capacities: Vec<Demand>,
        vehicle_count: usize,
        depot: usize,
    ) -> Result<Self, InvalidInputError> {
        if distance_matrix.len() != demands.len() {
            return Err(InvalidInputError::DimensionMismatch {
                matrix_rows: distance_matrix.len(),
                demands: demands.len(),
            });
        }
        if vehicle_count == 0 {
            return Err(InvalidInputError::NoVehicles);
        }
        if capacities.len() != vehicle_count {
            return Err(InvalidInputError::VehicleCountMismatch {
                vehicle_count,
                capacities: capacities.len(),
            });
        }
        if let Some((vehicle, &capacity)) = capacities.iter().enumerate().find(|(_, c)| **c <= 0) {
            return Err(InvalidInputError::NonPositiveCapacity { vehicle, capacity });
        }
        if let Some((node, &demand)) = demands.iter().enumerate().find(|(_, d)| **d < 0) {
            return Err(InvalidInputError::NegativeDemand { node, demand });
        }
        if depot >= demands.len() {
            return Err(InvalidInputError::DepotOutOfRange {
                depot,
                nodes: demands.len(),
            });
        }
        let total_demand = demands
            .iter()
            .enumerate()
            .filter(|(node, _)| *node != depot)
            .try_fold(0, |total: Demand, (_, &demand)| total.checked_add(demand));
        if total_demand.is_none() {
            return Err(InvalidInputError::DemandOverflow);
        }
        let distances = DistanceMatrix::from_rows(distance_matrix)?;
        Ok(Self {
            distances,
            demands,
            capacities,
            depot,
        })
    }

    /// Number of nodes, depot included.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.distances.size()
    }

    /// Number of vehicles in the fleet.
    #[must_use]
    pub fn vehicle_count(&self) -> usize {
        self.capacities.len()
    }

    /// Index of the depot node.
    #[must_use]
    pub const fn depot(&self) -> usize {
        self.depot
    }

    /// Demand delivered at `node`; zero for the depot and unknown nodes.
    #[must_use]
    pub fn demand(&self, node: usize) -> Demand {
        if node == self.depot {
            return 0;
        }
        self.demands.get(node).copied().unwrap_or(0)
    }

    /// Capacity of `vehicle`; zero for unknown vehicles.
    #[must_use]
    pub fn capacity(&self, vehicle: usize) -> Demand {
        self.capacities.get(vehicle).copied().unwrap_or(0)
    }

    /// Largest capacity in the fleet.
    #[must_use]
    pub fn max_capacity(&self) -> Demand {
        self.capacities.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all stop demands.
    ///
    /// Construction rejects demands whose sum overflows, so this is exact.
    #[must_use]
    pub fn total_demand(&self) -> Demand {
        self.stops()
            .map(|node| self.demand(node))
            .fold(0, Demand::saturating_add)
    }

    /// Sum of all vehicle capacities, saturating at [`Demand::MAX`].
    #[must_use]
    pub fn total_capacity(&self) -> Demand {
        self.capacities
            .iter()
            .copied()
            .fold(0, Demand::saturating_add)
    }

    /// The travel cost matrix.
    #[must_use]
    pub const fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Cost of the arc `from → to`.
    #[must_use]
    pub fn arc(&self, from: usize, to: usize) -> Cost {
        self.distances.arc(from, to)
    }

    /// Non-depot nodes in ascending order.
    pub fn stops(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.node_count()).filter(move |&node| node != self.depot)
    }

    /// Number of non-depot nodes.
    #[must_use]
    pub const fn stop_count(&self) -> usize {
        self.node_count().saturating_sub(1)
    }

    /// Cost of visiting `stops` in order, leaving from and returning to the
    /// depot. An empty route costs nothing. Saturates at [`Cost::MAX`].
    #[must_use]
    pub fn route_cost(&self, stops: &[usize]) -> Cost {
        let (Some(&first), Some(&last)) = (stops.first(), stops.last()) else {
            return 0;
        };
        stops
            .windows(2)
            .filter_map(|pair| match pair {
                [from, to] => Some(self.arc(*from, *to)),
                _ => None,
            })
            .fold(self.arc(self.depot, first), Cost::saturating_add)
            .saturating_add(self.arc(last, self.depot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn matrix() -> Vec<Vec<Cost>> {
        vec![vec![0, 2, 3], vec![2, 0, 4], vec![3, 4, 0]]
    }

    #[rstest]
    fn builds_valid_problem(matrix: Vec<Vec<Cost>>) {
        let problem = RoutingProblem::new(matrix, vec![0, 1, 2], vec![3, 3], 2, 0)
            .expect("valid problem");
        assert_eq!(problem.node_count(), 3);
        assert_eq!(problem.vehicle_count(), 2);
        assert_eq!(problem.total_demand(), 3);
        assert_eq!(problem.total_capacity(), 6);
        assert_eq!(problem.stops().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[rstest]
    fn rejects_demand_length_mismatch(matrix: Vec<Vec<Cost>>) {
        let err = RoutingProblem::new(matrix, vec![0, 1], vec![3], 1, 0).expect_err("mismatch");
        assert_eq!(
            err,
            InvalidInputError::DimensionMismatch {
                matrix_rows: 3,
                demands: 2
            }
        );
    }

    #[rstest]
    fn rejects_non_square_matrix() {
        let err = RoutingProblem::new(vec![vec![0, 1], vec![1]], vec![0, 1], vec![3], 1, 0)
            .expect_err("jagged");
        assert!(matches!(
            err,
            InvalidInputError::NonSquareMatrix { row: 1, columns: 1, expected: 2 }
        ));
    }

    #[rstest]
    #[case(vec![3, 0], InvalidInputError::NonPositiveCapacity { vehicle: 1, capacity: 0 })]
    #[case(vec![-1, 4], InvalidInputError::NonPositiveCapacity { vehicle: 0, capacity: -1 })]
    fn rejects_non_positive_capacity(
        matrix: Vec<Vec<Cost>>,
        #[case] capacities: Vec<Demand>,
        #[case] expected: InvalidInputError,
    ) {
        let err = RoutingProblem::new(matrix, vec![0, 1, 2], capacities, 2, 0)
            .expect_err("bad capacity");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn rejects_vehicle_count_mismatch(matrix: Vec<Vec<Cost>>) {
        let err = RoutingProblem::new(matrix, vec![0, 1, 2], vec![3], 2, 0).expect_err("mismatch");
        assert!(matches!(err, InvalidInputError::VehicleCountMismatch { .. }));
    }

    #[rstest]
    fn rejects_empty_fleet(matrix: Vec<Vec<Cost>>) {
        let err = RoutingProblem::new(matrix, vec![0, 1, 2], Vec::new(), 0, 0).expect_err("empty");
        assert_eq!(err, InvalidInputError::NoVehicles);
    }

    #[rstest]
    fn rejects_out_of_range_depot(matrix: Vec<Vec<Cost>>) {
        let err = RoutingProblem::new(matrix, vec![0, 1, 2], vec![3], 1, 3).expect_err("depot");
        assert_eq!(err, InvalidInputError::DepotOutOfRange { depot: 3, nodes: 3 });
    }

    #[rstest]
    fn rejects_negative_distance() {
        let err = RoutingProblem::new(vec![vec![0, -5], vec![1, 0]], vec![0, 1], vec![3], 1, 0)
            .expect_err("negative");
        assert_eq!(
            err,
            InvalidInputError::NegativeDistance {
                from: 0,
                to: 1,
                distance: -5
            }
        );
    }

    #[rstest]
    fn rejects_negative_demand(matrix: Vec<Vec<Cost>>) {
        let err = RoutingProblem::new(matrix, vec![0, -1, 2], vec![3], 1, 0).expect_err("demand");
        assert_eq!(err, InvalidInputError::NegativeDemand { node: 1, demand: -1 });
    }

    #[rstest]
    fn rejects_demands_whose_sum_overflows(matrix: Vec<Vec<Cost>>) {
        let err = RoutingProblem::new(matrix, vec![0, Demand::MAX, 1], vec![3], 1, 0)
            .expect_err("overflow");
        assert_eq!(err, InvalidInputError::DemandOverflow);
    }

    #[rstest]
    fn huge_depot_demand_does_not_count_towards_overflow(matrix: Vec<Vec<Cost>>) {
        let problem = RoutingProblem::new(matrix, vec![Demand::MAX, Demand::MAX, 0], vec![3], 1, 0)
            .expect("depot demand is ignored");
        assert_eq!(problem.total_demand(), Demand::MAX);
    }

    #[rstest]
    fn fleet_capacity_saturates(matrix: Vec<Vec<Cost>>) {
        let problem =
            RoutingProblem::new(matrix, vec![0, 1, 1], vec![Demand::MAX, Demand::MAX], 2, 0)
                .expect("valid problem");
        assert_eq!(problem.total_capacity(), Demand::MAX);
    }

    #[rstest]
    fn route_cost_saturates_on_huge_arcs() {
        let far: Cost = 4_000_000_000_000_000_000;
        let problem = RoutingProblem::new(
            vec![vec![0, far, far], vec![far, 0, far], vec![far, far, 0]],
            vec![0, 1, 1],
            vec![2],
            1,
            0,
        )
        .expect("valid problem");
        assert_eq!(problem.route_cost(&[1, 2]), Cost::MAX);
    }

    #[rstest]
    fn depot_demand_is_ignored(matrix: Vec<Vec<Cost>>) {
        let problem =
            RoutingProblem::new(matrix, vec![7, 1, 2], vec![3], 1, 0).expect("valid problem");
        assert_eq!(problem.demand(0), 0);
        assert_eq!(problem.total_demand(), 3);
    }

    #[rstest]
    fn route_cost_closes_the_tour(matrix: Vec<Vec<Cost>>) {
        let problem =
            RoutingProblem::new(matrix, vec![0, 1, 2], vec![3], 1, 0).expect("valid problem");
        assert_eq!(problem.route_cost(&[]), 0);
        assert_eq!(problem.route_cost(&[1]), 4);
        assert_eq!(problem.route_cost(&[2, 1]), 9);
    }

    #[rstest]
    fn asymmetric_matrices_are_kept_as_given() {
        let matrix = DistanceMatrix::from_rows(vec![vec![0, 1], vec![9, 0]]).expect("valid");
        assert_eq!(matrix.arc(0, 1), 1);
        assert_eq!(matrix.arc(1, 0), 9);
        let rows: Vec<&[Cost]> = matrix.rows().collect();
        assert_eq!(rows, vec![&[0, 1][..], &[9, 0][..]]);
    }
}
