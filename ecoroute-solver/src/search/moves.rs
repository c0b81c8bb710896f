//! Neighbourhood moves, their cost deltas and the single mutation point.
//!
//! Every move is evaluated as a delta over the current assignment before
//! anything is mutated. Capacity is checked during evaluation, so a move
//! returned by [`best_improvement`] is always feasible for both touched
//! vehicles.

use ecoroute_core::{Assignment, CapacityTracker, Cost, Demand, Neighbourhood, RoutingProblem};

use super::link_cost;
use super::penalties::ArcPenalties;

/// Search-side cost: a scaled [`Cost`] widened so no sum of arcs overflows.
pub(crate) type Scaled = i128;

/// Fixed-point scale applied to true arc costs so fractional `λ` values
/// survive integer arithmetic.
pub(crate) const COST_SCALE: Scaled = 1_000;

/// Arc costs as seen by the search: scaled true cost plus `λ` times the
/// arc's penalty.
///
/// Any `i64` cost times the scale, plus any `i64` `λ` times a `u32` penalty,
/// fits in `i128` with room for the handful of terms a move delta adds up.
pub(crate) struct CostModel<'a> {
    problem: &'a RoutingProblem,
    penalties: &'a ArcPenalties,
    lambda: Cost,
}

impl<'a> CostModel<'a> {
    pub(crate) const fn new(
        problem: &'a RoutingProblem,
        penalties: &'a ArcPenalties,
        lambda: Cost,
    ) -> Self {
        Self {
            problem,
            penalties,
            lambda,
        }
    }

    fn arc(&self, from: usize, to: usize) -> Scaled {
        let base = Scaled::from(link_cost(self.problem, from, to)) * COST_SCALE;
        if self.lambda == 0 {
            return base;
        }
        base + Scaled::from(self.lambda) * Scaled::from(self.penalties.get(from, to))
    }

    const fn depot(&self) -> usize {
        self.problem.depot()
    }
}

/// A single neighbourhood move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// Reverse `route[from..=to]` of one vehicle.
    TwoOpt {
        vehicle: usize,
        from: usize,
        to: usize,
    },
    /// Move one stop to a position on another vehicle.
    Relocate {
        from_vehicle: usize,
        from_position: usize,
        to_vehicle: usize,
        to_position: usize,
    },
    /// Swap two stops on different vehicles.
    Exchange {
        first_vehicle: usize,
        first_position: usize,
        second_vehicle: usize,
        second_position: usize,
    },
}

/// A move and its cost change under the search's cost model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) mv: Move,
    pub(crate) delta: Scaled,
}

#[derive(Debug, Default)]
struct Best(Option<Candidate>);

impl Best {
    fn offer(&mut self, delta: Scaled, mv: Move) {
        if delta < 0 && self.0.is_none_or(|best| delta < best.delta) {
            self.0 = Some(Candidate { mv, delta });
        }
    }
}

fn node_at(route: &[usize], position: usize, depot: usize) -> usize {
    route.get(position).copied().unwrap_or(depot)
}

fn before(route: &[usize], position: usize, depot: usize) -> usize {
    position
        .checked_sub(1)
        .map_or(depot, |p| node_at(route, p, depot))
}

fn after(route: &[usize], position: usize, depot: usize) -> usize {
    node_at(route, position + 1, depot)
}

/// The strictly improving move with the lowest delta across `enabled`
/// neighbourhoods, or `None` at a local optimum.
///
/// Neighbourhoods are scanned in [`Neighbourhood::ALL`] order; ties keep the
/// first move found.
pub(crate) fn best_improvement(
    model: &CostModel<'_>,
    tracker: &CapacityTracker<'_>,
    assignment: &Assignment,
    enabled: &[Neighbourhood],
) -> Option<Candidate> {
    let mut best = Best::default();
    let loads: Vec<Demand> = assignment
        .routes()
        .iter()
        .map(|route| tracker.load(route))
        .collect();
    for neighbourhood in Neighbourhood::ALL {
        if !enabled.contains(&neighbourhood) {
            continue;
        }
        match neighbourhood {
            Neighbourhood::TwoOpt => scan_two_opt(model, assignment, &mut best),
            Neighbourhood::Relocate => scan_relocate(model, tracker, assignment, &mut best),
            Neighbourhood::Exchange => scan_exchange(model, tracker, assignment, &loads, &mut best),
        }
    }
    best.0
}

/// Segment reversal never changes a route's total load, so 2-opt needs no
/// capacity check.
fn scan_two_opt(model: &CostModel<'_>, assignment: &Assignment, best: &mut Best) {
    let depot = model.depot();
    for (vehicle, route) in assignment.routes().iter().enumerate() {
        for from in 0..route.len() {
            let head = before(route, from, depot);
            let first = node_at(route, from, depot);
            let mut inner: Scaled = 0;
            for to in (from + 1)..route.len() {
                let previous = node_at(route, to - 1, depot);
                let last = node_at(route, to, depot);
                inner += model.arc(last, previous) - model.arc(previous, last);
                let tail = after(route, to, depot);
                let delta = model.arc(head, last) + model.arc(first, tail)
                    - model.arc(head, first)
                    - model.arc(last, tail)
                    + inner;
                best.offer(delta, Move::TwoOpt { vehicle, from, to });
            }
        }
    }
}

fn scan_relocate(
    model: &CostModel<'_>,
    tracker: &CapacityTracker<'_>,
    assignment: &Assignment,
    best: &mut Best,
) {
    let depot = model.depot();
    let routes = assignment.routes();
    for (from_vehicle, source) in routes.iter().enumerate() {
        for (from_position, &node) in source.iter().enumerate() {
            let prev = before(source, from_position, depot);
            let next = after(source, from_position, depot);
            let removal = model.arc(prev, next) - model.arc(prev, node) - model.arc(node, next);
            for (to_vehicle, target) in routes.iter().enumerate() {
                if to_vehicle == from_vehicle {
                    continue;
                }
                if !tracker.fits_with(to_vehicle, target, node) {
                    continue;
                }
                for to_position in 0..=target.len() {
                    let p = before(target, to_position, depot);
                    let q = node_at(target, to_position, depot);
                    let insertion = model.arc(p, node) + model.arc(node, q) - model.arc(p, q);
                    best.offer(
                        removal + insertion,
                        Move::Relocate {
                            from_vehicle,
                            from_position,
                            to_vehicle,
                            to_position,
                        },
                    );
                }
            }
        }
    }
}

fn scan_exchange(
    model: &CostModel<'_>,
    tracker: &CapacityTracker<'_>,
    assignment: &Assignment,
    loads: &[Demand],
    best: &mut Best,
) {
    let depot = model.depot();
    let problem = model.problem;
    let routes = assignment.routes();
    for (first_vehicle, first) in routes.iter().enumerate() {
        let first_load = loads.get(first_vehicle).copied().unwrap_or(0);
        for (second_vehicle, second) in routes.iter().enumerate().skip(first_vehicle + 1) {
            let second_load = loads.get(second_vehicle).copied().unwrap_or(0);
            for (first_position, &s) in first.iter().enumerate() {
                let (a1, b1) = (
                    before(first, first_position, depot),
                    after(first, first_position, depot),
                );
                for (second_position, &t) in second.iter().enumerate() {
                    let fits = tracker
                        .can_append(first_vehicle, first_load.saturating_sub(problem.demand(s)), t)
                        .is_some()
                        && tracker
                            .can_append(
                                second_vehicle,
                                second_load.saturating_sub(problem.demand(t)),
                                s,
                            )
                            .is_some();
                    if !fits {
                        continue;
                    }
                    let (a2, b2) = (
                        before(second, second_position, depot),
                        after(second, second_position, depot),
                    );
                    let delta = model.arc(a1, t) + model.arc(t, b1)
                        - model.arc(a1, s)
                        - model.arc(s, b1)
                        + model.arc(a2, s)
                        + model.arc(s, b2)
                        - model.arc(a2, t)
                        - model.arc(t, b2);
                    best.offer(
                        delta,
                        Move::Exchange {
                            first_vehicle,
                            first_position,
                            second_vehicle,
                            second_position,
                        },
                    );
                }
            }
        }
    }
}

/// Apply `mv` to `assignment`. This is the only place search state changes.
pub(crate) fn apply(assignment: &mut Assignment, mv: Move) {
    match mv {
        Move::TwoOpt { vehicle, from, to } => {
            if let Some(segment) = assignment
                .route_mut(vehicle)
                .and_then(|route| route.get_mut(from..=to))
            {
                segment.reverse();
            }
        }
        Move::Relocate {
            from_vehicle,
            from_position,
            to_vehicle,
            to_position,
        } => {
            let node = assignment
                .route_mut(from_vehicle)
                .filter(|route| from_position < route.len())
                .map(|route| route.remove(from_position));
            if let Some(node) = node
                && let Some(route) = assignment.route_mut(to_vehicle)
            {
                route.insert(to_position.min(route.len()), node);
            }
        }
        Move::Exchange {
            first_vehicle,
            first_position,
            second_vehicle,
            second_position,
        } => {
            let first_stop = assignment.route(first_vehicle).get(first_position).copied();
            let second_stop = assignment.route(second_vehicle).get(second_position).copied();
            if let (Some(s), Some(t)) = (first_stop, second_stop) {
                if let Some(slot) = assignment
                    .route_mut(first_vehicle)
                    .and_then(|route| route.get_mut(first_position))
                {
                    *slot = t;
                }
                if let Some(slot) = assignment
                    .route_mut(second_vehicle)
                    .and_then(|route| route.get_mut(second_position))
                {
                    *slot = s;
                }
            }
        }
    }
}
