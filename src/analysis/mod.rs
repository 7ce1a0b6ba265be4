/*!
Analyses of a formula, each run against an [AdvancedSatSolver] and its assumption stack.

An analysis implements [Analysis], and is run through [execute], which:
- Pushes the assumptions the analysis is asked to hold under.
- Runs the analysis, with the solver interrupted by cancellation of the [Monitor].
- Restores the assumption stack to its prior length, whether or not the analysis succeeded.

So, an analysis may push (and leave) literals on the stack as it sees fit, and several analyses may share a solver in turn.

Results are returned together with the assumptions in force when they were computed, as an [AnalysisResult].

# Failure

Within an analysis a [Timeout](crate::solver::SatResult::Timeout) from the solver is never read as unsatisfiability.
Each analysis says what it does instead, typically leaving a candidate unclassified.

[run_on_cnf] builds a fresh solver for a single analysis, and degrades to no result if the formula is contradictory or the analysis fails.
Cancellation is the exception, and is always returned as an error.

```rust
# use std::sync::Arc;
# use fm_sat::{analysis::{run_on_cnf, core_dead::CoreDeadAnalysis}, config::Config, monitor::Monitor};
# use fm_sat::structures::{CNF, variables::Variables};
let variables = Arc::new(Variables::new(["A", "B", "C"]));
let cnf = CNF::from_clauses(variables, [vec![1], vec![-1, 2], vec![-3, -2]]).unwrap();

let mut monitor = Monitor::default();
let result = run_on_cnf(&cnf, Config::default(), &mut CoreDeadAnalysis::default(), &[], &mut monitor)
    .unwrap()
    .unwrap();

assert_eq!(result.result.unwrap().literals(), &[-3, 1, 2]);
```
*/

pub mod atomic_set;
pub mod cause;
pub mod core_dead;
pub mod determined;
pub mod has_solution;
pub mod implication;
pub mod redundancy;
pub mod solutions;

use crate::{
    config::Config,
    misc::log::targets::{self},
    monitor::Monitor,
    solver::AdvancedSatSolver,
    structures::{literal::CLiteral, CNF},
    types::err::ErrorKind,
};

pub trait Analysis {
    type Output;

    /// Runs the analysis against `solver`, under the assumptions currently on the stack of the solver.
    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind>;

    /// The output of the analysis on a formula which is contradictory, if there is a definite one.
    ///
    /// Otherwise, no result.
    fn contradiction_output(&self) -> Option<Self::Output> {
        None
    }
}

/// A result, with the assumptions under which it was computed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisResult<T> {
    pub assumptions: Vec<CLiteral>,
    pub result: T,
}

impl<T> AnalysisResult<T> {
    /// True if the result may be reused under the `current` assumptions.
    ///
    /// This requires the assumptions to match element for element, as a stack, and so in order.
    pub fn is_valid_for(&self, current: &[CLiteral]) -> bool {
        self.assumptions.len() == current.len() && current.starts_with(&self.assumptions)
    }
}

/// Runs `analysis` against `solver` with `assumptions` pushed to the stack.
///
/// The stack of `solver` is restored to its length on entry before returning, on success or failure.
pub fn execute<A: Analysis>(
    analysis: &mut A,
    solver: &mut AdvancedSatSolver,
    assumptions: &[CLiteral],
    monitor: &mut Monitor,
) -> Result<AnalysisResult<A::Output>, ErrorKind> {
    let length = solver.assignment_len();
    solver.assignment_push_all(assumptions)?;
    let recorded = solver.assignments().to_vec();

    solver.set_callback_terminate(monitor.terminate_callback());

    // A solve ended by cancellation returns Timeout, and so the output may be partial.
    let result = match monitor.check_cancel() {
        Ok(()) => analysis
            .analyze(solver, monitor)
            .and_then(|output| monitor.check_cancel().map(|_| output)),
        Err(e) => Err(e),
    };
    solver.assignment_clear(length);

    Ok(AnalysisResult {
        assumptions: recorded,
        result: result?,
    })
}

/// Runs `analysis` on a fresh solver over `cnf`.
///
/// Ok(None) is no result, either as `cnf` is contradictory (and the analysis has no definite output on a contradiction) or as the analysis failed.
pub fn run_on_cnf<A: Analysis>(
    cnf: &CNF,
    config: Config,
    analysis: &mut A,
    assumptions: &[CLiteral],
    monitor: &mut Monitor,
) -> Result<Option<AnalysisResult<A::Output>>, ErrorKind> {
    let contradiction = |analysis: &A| {
        log::info!(target: targets::ANALYSIS, "Contradictory formula");
        analysis.contradiction_output().map(|result| AnalysisResult {
            assumptions: assumptions.to_vec(),
            result,
        })
    };

    let mut solver = match AdvancedSatSolver::with_config(cnf, config) {
        Ok(solver) => solver,
        Err(ErrorKind::Contradiction) => return Ok(contradiction(analysis)),
        Err(e) => return Err(e),
    };

    match execute(analysis, &mut solver, assumptions, monitor) {
        Ok(result) => Ok(Some(result)),
        Err(ErrorKind::Cancelled) => Err(ErrorKind::Cancelled),
        Err(ErrorKind::Contradiction) => Ok(contradiction(analysis)),
        Err(e) => {
            log::warn!(target: targets::ANALYSIS, "Analysis failed: {e}");
            Ok(None)
        }
    }
}

/// Zeroes each entry of `model` which differs from `other`.
///
/// Both are indexed by variable - 1, and `other` may be shorter.
pub(crate) fn update_solution(model: &mut [CLiteral], other: &[CLiteral]) {
    for (index, literal) in model.iter_mut().enumerate() {
        if *literal != 0 && other.get(index) != Some(literal) {
            *literal = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{solver::SatResult, structures::variables::Variables};

    pub(crate) fn cnf(clauses: &[&[i32]], var_count: usize) -> CNF {
        let variables = Arc::new(Variables::new((1..=var_count).map(|v| format!("v{v}"))));
        CNF::from_clauses(variables, clauses.iter().map(|c| c.to_vec())).unwrap()
    }

    pub(crate) fn solver(clauses: &[&[i32]], var_count: usize) -> AdvancedSatSolver {
        AdvancedSatSolver::with_config(&cnf(clauses, var_count), Config::unbounded()).unwrap()
    }

    struct StackLength;

    impl Analysis for StackLength {
        type Output = usize;

        fn analyze(
            &mut self,
            solver: &mut AdvancedSatSolver,
            _: &mut Monitor,
        ) -> Result<usize, ErrorKind> {
            let length = solver.assignment_len();
            solver.assignment_push(2)?;
            Ok(length)
        }
    }

    #[test]
    fn execute_restores_stack() {
        let mut solver = solver(&[], 3);
        solver.assignment_push(1).unwrap();

        let mut monitor = Monitor::default();
        let result = execute(&mut StackLength, &mut solver, &[-3], &mut monitor).unwrap();

        assert_eq!(result.result, 2);
        assert_eq!(result.assumptions, vec![1, -3]);
        assert_eq!(solver.assignments(), &[1]);
    }

    #[test]
    fn execute_cancelled() {
        let mut solver = solver(&[], 3);
        let mut monitor = Monitor::default();
        monitor.cancel();
        assert_eq!(
            execute(&mut StackLength, &mut solver, &[1], &mut monitor),
            Err(ErrorKind::Cancelled)
        );
        assert!(solver.assignments().is_empty());
    }

    /// Cancels, and then solves, as if cancelled from elsewhere during the solve.
    struct CancelledSolve;

    impl Analysis for CancelledSolve {
        type Output = Option<SatResult>;

        fn analyze(
            &mut self,
            solver: &mut AdvancedSatSolver,
            monitor: &mut Monitor,
        ) -> Result<Self::Output, ErrorKind> {
            monitor.cancel_handle().cancel();
            match solver.has_solution()? {
                SatResult::Timeout => Ok(None),
                result => Ok(Some(result)),
            }
        }
    }

    #[test]
    fn cancelled_during_solve() {
        let mut solver = solver(&[&[1, 2]], 2);
        let mut monitor = Monitor::default();
        assert_eq!(
            execute(&mut CancelledSolve, &mut solver, &[-1], &mut monitor),
            Err(ErrorKind::Cancelled)
        );
        assert!(solver.assignments().is_empty());

        let cnf = cnf(&[&[1, 2]], 2);
        let mut monitor = Monitor::default();
        let result = run_on_cnf(&cnf, Config::unbounded(), &mut CancelledSolve, &[], &mut monitor);
        assert_eq!(result, Err(ErrorKind::Cancelled));
    }

    #[test]
    fn prefix_validity() {
        let result = AnalysisResult {
            assumptions: vec![1, -2],
            result: (),
        };
        assert!(result.is_valid_for(&[1, -2]));
        assert!(!result.is_valid_for(&[1, -2, 3]));
        assert!(!result.is_valid_for(&[-2, 1]));
        assert!(!result.is_valid_for(&[1]));
    }

    #[test]
    fn contradiction_is_no_result() {
        let cnf = cnf(&[&[1], &[-1]], 1);
        let mut monitor = Monitor::default();
        let result = run_on_cnf(&cnf, Config::default(), &mut StackLength, &[], &mut monitor);
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn update() {
        let mut model = vec![1, -2, 3, 0];
        update_solution(&mut model, &[1, 2, 3, 4]);
        assert_eq!(model, vec![1, 0, 3, 0]);
    }
}
