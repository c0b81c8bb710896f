//! Arc penalties for guided local search.

use ecoroute_core::{Assignment, Cost, RoutingProblem};

/// Penalty counter per directed arc, stored as a flat `N×N` arena.
#[derive(Debug, Clone)]
pub(crate) struct ArcPenalties {
    size: usize,
    counts: Vec<u32>,
}

impl ArcPenalties {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            size,
            counts: vec![0; size.saturating_mul(size)],
        }
    }

    pub(crate) fn get(&self, from: usize, to: usize) -> u32 {
        self.offset(from, to)
            .and_then(|idx| self.counts.get(idx))
            .copied()
            .unwrap_or(0)
    }

    /// Halve every counter.
    pub(crate) fn decay(&mut self) {
        for count in &mut self.counts {
            *count >>= 1;
        }
    }

    /// Add one penalty to each arc of `assignment` whose utility
    /// `cost / (1 + penalty)` is maximal. Returns the number of arcs
    /// penalised; zero when every arc in use is free.
    pub(crate) fn penalise(&mut self, problem: &RoutingProblem, assignment: &Assignment) -> usize {
        let arcs = arcs_in_use(problem, assignment);
        let Some(&(from, to)) = arcs.iter().max_by(|a, b| {
            self.utility_key(problem, **a)
                .cmp_with(self.utility_key(problem, **b))
        }) else {
            return 0;
        };
        let top = self.utility_key(problem, (from, to));
        if top.cost <= 0 {
            return 0;
        }
        let mut penalised = 0;
        for arc in arcs {
            if self.utility_key(problem, arc).cmp_with(top).is_eq()
                && let Some(idx) = self.offset(arc.0, arc.1)
                && let Some(count) = self.counts.get_mut(idx)
            {
                *count = count.saturating_add(1);
                penalised += 1;
            }
        }
        penalised
    }

    fn utility_key(&self, problem: &RoutingProblem, (from, to): (usize, usize)) -> Utility {
        Utility {
            cost: problem.arc(from, to),
            penalty: self.get(from, to),
        }
    }

    fn offset(&self, from: usize, to: usize) -> Option<usize> {
        (from < self.size && to < self.size).then(|| from * self.size + to)
    }
}

/// `cost / (1 + penalty)` kept as a fraction so comparisons stay exact.
#[derive(Debug, Clone, Copy)]
struct Utility {
    cost: Cost,
    penalty: u32,
}

impl Utility {
    fn cmp_with(self, other: Self) -> std::cmp::Ordering {
        let lhs = i128::from(self.cost) * (1 + i128::from(other.penalty));
        let rhs = i128::from(other.cost) * (1 + i128::from(self.penalty));
        lhs.cmp(&rhs)
    }
}

/// Directed arcs travelled by `assignment`, depot legs included.
pub(crate) fn arcs_in_use(problem: &RoutingProblem, assignment: &Assignment) -> Vec<(usize, usize)> {
    let depot = problem.depot();
    let mut arcs = Vec::with_capacity(assignment.arc_count());
    for route in assignment.routes().iter().filter(|route| !route.is_empty()) {
        let mut previous = depot;
        for &node in route {
            arcs.push((previous, node));
            previous = node;
        }
        arcs.push((previous, depot));
    }
    arcs
}
