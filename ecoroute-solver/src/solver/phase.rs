//! Lifecycle of a single solve.

use std::fmt;

use thiserror::Error;

/// A phase change outside the solve lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal solve phase transition from {from} to {to}")]
pub struct IllegalTransition {
    /// Phase the solve was in.
    pub from: SolvePhase,
    /// Phase that was requested.
    pub to: SolvePhase,
}

/// Phase a solve is in.
///
/// ```text
/// Unsolved → Constructing → Searching → Solved
///                         ↘ Infeasible
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SolvePhase {
    /// Input accepted, nothing built yet.
    #[default]
    Unsolved,
    /// Building the first feasible assignment.
    Constructing,
    /// Improving the assignment.
    Searching,
    /// Routes are available.
    Solved,
    /// No feasible assignment exists.
    Infeasible,
}

impl SolvePhase {
    /// Whether the phase ends the solve.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Solved | Self::Infeasible)
    }

    /// Move to `next` if the lifecycle allows it.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalTransition`] for any edge not in the lifecycle.
    ///
    /// # Examples
    /// ```
    /// use ecoroute_solver::SolvePhase;
    ///
    /// let phase = SolvePhase::Unsolved.advance(SolvePhase::Constructing);
    /// assert_eq!(phase, Ok(SolvePhase::Constructing));
    /// assert!(SolvePhase::Unsolved.advance(SolvePhase::Solved).is_err());
    /// ```
    pub const fn advance(self, next: Self) -> Result<Self, IllegalTransition> {
        match (self, next) {
            (Self::Unsolved, Self::Constructing)
            | (Self::Constructing, Self::Searching | Self::Infeasible)
            | (Self::Searching, Self::Solved) => Ok(next),
            _ => Err(IllegalTransition { from: self, to: next }),
        }
    }
}

impl fmt::Display for SolvePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unsolved => "unsolved",
            Self::Constructing => "constructing",
            Self::Searching => "searching",
            Self::Solved => "solved",
            Self::Infeasible => "infeasible",
        };
        f.write_str(name)
    }
}
