//! Satisfiability, with a witness.

use crate::{
    analysis::Analysis,
    monitor::Monitor,
    solver::{AdvancedSatSolver, SatResult},
    structures::literal_set::LiteralSet,
    types::err::ErrorKind,
};

/// Finds a model under the assumptions, if one exists.
///
/// A timeout is an error, as the analysis asks for a definite answer.
#[derive(Debug, Default)]
pub struct HasSolutionAnalysis {}

impl Analysis for HasSolutionAnalysis {
    type Output = Option<LiteralSet>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        _: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        match solver.has_solution()? {
            SatResult::Satisfiable => Ok(Some(LiteralSet::from_model(solver.solution()))),
            SatResult::Unsatisfiable => Ok(None),
            SatResult::Timeout => Err(ErrorKind::Timeout),
        }
    }

    fn contradiction_output(&self) -> Option<Self::Output> {
        Some(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::{
            execute, run_on_cnf,
            tests::{cnf, solver},
        },
        config::Config,
    };

    #[test]
    fn witness() {
        let mut solver = solver(&[&[1, 2], &[-1]], 2);
        let mut monitor = Monitor::default();
        let result = execute(&mut HasSolutionAnalysis::default(), &mut solver, &[], &mut monitor);
        assert_eq!(result.unwrap().result, Some(LiteralSet::new([-1, 2])));

        let result = execute(&mut HasSolutionAnalysis::default(), &mut solver, &[-2], &mut monitor);
        assert_eq!(result.unwrap().result, None);
    }

    #[test]
    fn contradiction_has_no_solution() {
        let cnf = cnf(&[&[1], &[]], 1);
        let mut monitor = Monitor::default();
        let result = run_on_cnf(
            &cnf,
            Config::default(),
            &mut HasSolutionAnalysis::default(),
            &[],
            &mut monitor,
        );
        assert_eq!(result.unwrap().map(|r| r.result), Some(None));
    }
}
