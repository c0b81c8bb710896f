//! Translation between logical nodes and routing-variable indices.
//!
//! Every non-depot node owns one variable index. Each vehicle additionally
//! owns a private start slot and end slot, both bound to the depot, so route
//! boundaries never alias across vehicles. Indices are plain integers into a
//! flat arena; nothing here holds references into a route.
//!
//! Layout for `N` nodes and `V` vehicles:
//!
//! ```text
//! 0 .. N-1            non-depot nodes in ascending node order
//! N-1 + 2v            start slot of vehicle v
//! N-1 + 2v + 1        end slot of vehicle v
//! ```

use crate::RoutingProblem;

/// Opaque index of a routing variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableIndex(usize);

impl VariableIndex {
    /// Raw arena offset.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Bidirectional node ↔ variable index mapping.
///
/// # Examples
/// ```
/// use ecoroute_core::IndexManager;
///
/// let manager = IndexManager::new(4, 2, 0);
/// let start = manager.start(1).expect("vehicle 1 exists");
/// assert_eq!(manager.node_of(start), Some(0));
/// let var = manager.variable_index_of(1, 3).expect("node 3 exists");
/// assert_eq!(manager.node_of(var), Some(3));
/// assert_ne!(manager.start(0), manager.start(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexManager {
    node_count: usize,
    vehicle_count: usize,
    depot: usize,
}

impl IndexManager {
    /// Build a manager for `node_count` nodes and `vehicle_count` vehicles.
    #[must_use]
    pub const fn new(node_count: usize, vehicle_count: usize, depot: usize) -> Self {
        Self {
            node_count,
            vehicle_count,
            depot,
        }
    }

    /// Build a manager matching `problem`.
    #[must_use]
    pub fn for_problem(problem: &RoutingProblem) -> Self {
        Self::new(problem.node_count(), problem.vehicle_count(), problem.depot())
    }

    /// Total number of variable indices.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.stop_slots() + 2 * self.vehicle_count
    }

    /// Number of vehicles covered by the mapping.
    #[must_use]
    pub const fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    /// Start slot of `vehicle`.
    #[must_use]
    pub const fn start(&self, vehicle: usize) -> Option<VariableIndex> {
        if vehicle < self.vehicle_count {
            Some(VariableIndex(self.stop_slots() + 2 * vehicle))
        } else {
            None
        }
    }

    /// End slot of `vehicle`.
    #[must_use]
    pub const fn end(&self, vehicle: usize) -> Option<VariableIndex> {
        if vehicle < self.vehicle_count {
            Some(VariableIndex(self.stop_slots() + 2 * vehicle + 1))
        } else {
            None
        }
    }

    /// Logical node behind `index`; start and end slots map to the depot.
    #[must_use]
    pub fn node_of(&self, index: VariableIndex) -> Option<usize> {
        let raw = index.get();
        if raw < self.stop_slots() {
            return Some(if raw < self.depot { raw } else { raw + 1 });
        }
        (raw < self.size()).then_some(self.depot)
    }

    /// Variable index of `node` as visited by `vehicle`.
    ///
    /// Non-depot nodes have one index shared by all vehicles; the depot maps
    /// to the vehicle's start slot.
    #[must_use]
    pub fn variable_index_of(&self, vehicle: usize, node: usize) -> Option<VariableIndex> {
        if vehicle >= self.vehicle_count || node >= self.node_count {
            return None;
        }
        if node == self.depot {
            return self.start(vehicle);
        }
        Some(VariableIndex(if node < self.depot { node } else { node - 1 }))
    }

    const fn stop_slots(&self) -> usize {
        self.node_count.saturating_sub(1)
    }
}
