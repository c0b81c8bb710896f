//! Test-only utilities for `ecoroute-solver`.
//!
//! The helpers in this module are available to unit tests and to downstream
//! crates' tests. They are gated behind the `test-support` feature (and
//! `cfg(test)`).

use ecoroute_core::{Cost, Demand, SolveRequest};

/// Demand profile of the sixteen-stop depot plan used across the test suite.
pub const DEPOT_PLAN_DEMANDS: [Demand; 16] = [0, 1, 1, 2, 4, 2, 4, 8, 8, 1, 2, 1, 2, 4, 4, 8];

/// Fleet serving [`DEPOT_PLAN_DEMANDS`].
pub const DEPOT_PLAN_CAPACITIES: [Demand; 4] = [15, 15, 15, 15];

/// Distance matrix for points on a line, `|a - b|` between every pair.
#[must_use]
pub fn line_rows(positions: &[Cost]) -> Vec<Vec<Cost>> {
    positions
        .iter()
        .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
        .collect()
}

/// Manhattan distance matrix for integer grid points.
#[must_use]
pub fn manhattan_rows(points: &[(Cost, Cost)]) -> Vec<Vec<Cost>> {
    points
        .iter()
        .map(|&(ax, ay)| {
            points
                .iter()
                .map(|&(bx, by)| (ax - bx).abs() + (ay - by).abs())
                .collect()
        })
        .collect()
}

/// Points of a `columns`-wide grid with `spacing` between neighbours,
/// filled row by row.
#[must_use]
pub fn grid_points(count: usize, columns: usize, spacing: Cost) -> Vec<(Cost, Cost)> {
    let columns = columns.max(1);
    (0..count)
        .map(|index| {
            let column = index
                .checked_rem(columns)
                .and_then(|column| Cost::try_from(column).ok())
                .unwrap_or(0);
            let row = index
                .checked_div(columns)
                .and_then(|row| Cost::try_from(row).ok())
                .unwrap_or(0);
            (column * spacing, row * spacing)
        })
        .collect()
}

/// The sixteen-stop plan on a 4×4 grid of 1 km blocks, depot in the corner.
#[must_use]
pub fn depot_plan_request() -> SolveRequest {
    let rows = manhattan_rows(&grid_points(DEPOT_PLAN_DEMANDS.len(), 4, 1_000));
    SolveRequest::new(
        rows,
        DEPOT_PLAN_DEMANDS.to_vec(),
        DEPOT_PLAN_CAPACITIES.to_vec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn grid_fills_rows_first() {
        assert_eq!(
            grid_points(5, 2, 10),
            vec![(0, 0), (10, 0), (0, 10), (10, 10), (0, 20)]
        );
    }

    #[rstest]
    fn depot_plan_fits_the_fleet() {
        let demand: Demand = DEPOT_PLAN_DEMANDS.iter().sum();
        let capacity: Demand = DEPOT_PLAN_CAPACITIES.iter().sum();
        assert!(demand <= capacity);
        assert!(depot_plan_request().to_problem().is_ok());
    }
}
