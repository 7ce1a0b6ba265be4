/*!
Incremental satisfiability, as used by analyses.

# Solvers

- [SimpleSatSolver] wraps an [engine](engine) built from a [CNF], and supports clause addition and removal, along with solves bounded by a time limit.
- [AdvancedSatSolver] adds an assumption stack, a choice of [selection strategy](crate::config::SelectionStrategy), and a record of recent solutions.

A solver is created for each analysis (or propagation) and is exclusively owned by it.
Creating a solver replays the clauses of the CNF into a fresh engine.

# Results

Each solve returns a [SatResult].
[Timeout](SatResult::Timeout) is distinct from [Unsatisfiable](SatResult::Unsatisfiable), and callers must never read a timeout as unsatisfiability.

```rust
# use std::sync::Arc;
# use fm_sat::{solver::{SatResult, SimpleSatSolver}, structures::{CNF, variables::Variables}};
let variables = Arc::new(Variables::new(["A", "B"]));
let cnf = CNF::from_clauses(variables, [vec![1, 2], vec![-1]]).unwrap();
let mut solver = SimpleSatSolver::new(&cnf).unwrap();

assert_eq!(solver.has_solution(), Ok(SatResult::Satisfiable));
assert_eq!(solver.has_solution_with(&[-2]), Ok(SatResult::Unsatisfiable));
```

[CNF]: crate::structures::CNF
*/

pub mod advanced;
pub mod engine;
pub mod simple;

pub use advanced::AdvancedSatSolver;
pub use engine::ClauseKey;
pub use simple::SimpleSatSolver;

/// The result of a solve.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SatResult {
    /// The clauses (and assumptions) are satisfiable.
    Satisfiable,

    /// The clauses (and assumptions) are unsatisfiable.
    Unsatisfiable,

    /// The solve did not complete within the time limit, or was terminated.
    Timeout,
}

impl SatResult {
    /// True only on a definite [Satisfiable](SatResult::Satisfiable).
    pub fn is_sat(&self) -> bool {
        matches!(self, Self::Satisfiable)
    }

    /// True only on a definite [Unsatisfiable](SatResult::Unsatisfiable).
    pub fn is_unsat(&self) -> bool {
        matches!(self, Self::Unsatisfiable)
    }
}

impl std::fmt::Display for SatResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "TRUE"),
            Self::Unsatisfiable => write!(f, "FALSE"),
            Self::Timeout => write!(f, "TIMEOUT"),
        }
    }
}
