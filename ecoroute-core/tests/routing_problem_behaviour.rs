//! Behavioural tests for `RoutingProblem` validation.

use std::cell::RefCell;

use ecoroute_core::{Cost, Demand, InvalidInputError, RoutingProblem, SolveError, SolveErrorKind};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Debug, Default)]
struct ProblemWorld {
    matrix: RefCell<Vec<Vec<Cost>>>,
    demands: RefCell<Vec<Demand>>,
    capacities: RefCell<Vec<Demand>>,
    depot: RefCell<usize>,
    outcome: RefCell<Option<Result<RoutingProblem, InvalidInputError>>>,
}

impl ProblemWorld {
    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_error(&self) -> InvalidInputError {
        self.outcome
            .borrow()
            .clone()
            .expect("outcome should be recorded before assertions")
            .expect_err("expected construction to fail")
    }
}

#[fixture]
fn world() -> ProblemWorld {
    ProblemWorld::default()
}

#[given("a three node distance matrix")]
fn given_matrix(world: &ProblemWorld) {
    world
        .matrix
        .replace(vec![vec![0, 4, 6], vec![4, 0, 3], vec![6, 3, 0]]);
}

#[given("demands of zero, two and three")]
fn given_demands(world: &ProblemWorld) {
    world.demands.replace(vec![0, 2, 3]);
}

#[given("demands for only two nodes")]
fn given_short_demands(world: &ProblemWorld) {
    world.demands.replace(vec![0, 2]);
}

#[given("two vehicles of capacity four")]
fn given_two_vehicles(world: &ProblemWorld) {
    world.capacities.replace(vec![4, 4]);
}

#[given("one vehicle with zero capacity")]
fn given_zero_capacity(world: &ProblemWorld) {
    world.capacities.replace(vec![0]);
}

#[given("the depot is node {depot}")]
fn given_depot(world: &ProblemWorld, depot: usize) {
    world.depot.replace(depot);
}

#[when("the routing problem is built")]
fn when_built(world: &ProblemWorld) {
    let capacities = world.capacities.borrow().clone();
    let vehicle_count = capacities.len();
    let outcome = RoutingProblem::new(
        world.matrix.borrow().clone(),
        world.demands.borrow().clone(),
        capacities,
        vehicle_count,
        *world.depot.borrow(),
    );
    world.outcome.replace(Some(outcome));
}

#[then("the problem has {nodes} nodes and {vehicles} vehicles")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_problem_shape(world: &ProblemWorld, nodes: usize, vehicles: usize) {
    let outcome = world.outcome.borrow();
    let problem = outcome
        .as_ref()
        .expect("outcome recorded")
        .as_ref()
        .expect("expected a valid problem");
    assert_eq!(problem.node_count(), nodes);
    assert_eq!(problem.vehicle_count(), vehicles);
}

#[then("construction fails with a dimension mismatch")]
fn then_dimension_mismatch(world: &ProblemWorld) {
    let err = world.expect_error();
    assert!(matches!(err, InvalidInputError::DimensionMismatch { .. }));
    assert_eq!(SolveError::from(err).kind(), SolveErrorKind::InvalidInput);
}

#[then("construction fails with a non-positive capacity")]
fn then_non_positive_capacity(world: &ProblemWorld) {
    let err = world.expect_error();
    assert_eq!(
        err,
        InvalidInputError::NonPositiveCapacity {
            vehicle: 0,
            capacity: 0
        }
    );
}

#[then("construction fails with an out of range depot")]
fn then_depot_out_of_range(world: &ProblemWorld) {
    let err = world.expect_error();
    assert_eq!(err, InvalidInputError::DepotOutOfRange { depot: 7, nodes: 3 });
    assert!(!SolveError::from(err).is_retryable());
}

#[scenario(path = "tests/features/routing_problem.feature", index = 0)]
fn consistent_problem(world: ProblemWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/routing_problem.feature", index = 1)]
fn demand_mismatch(world: ProblemWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/routing_problem.feature", index = 2)]
fn zero_capacity(world: ProblemWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/routing_problem.feature", index = 3)]
fn depot_out_of_range(world: ProblemWorld) {
    let _ = world;
}
