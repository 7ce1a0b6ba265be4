/*!
Variables determined by the values of every other variable.

A variable *x* is determined if no two models differ only on *x*.

# Overview

Each clause which mentions *x* is either *x* ∨ *R* or ¬*x* ∨ *R*, for some residual clause *R*.
If some assignment to the other variables satisfies every clause without *x*, and every residual, then either value of *x* extends it to a model, and *x* is not determined.
Otherwise, *x* is determined.

So, the residuals are added to the solver, a single solve decides whether *x* is determined, and the residuals are removed before the next variable.
As each residual implies the clause it was taken from, the clauses which mention *x* need not be removed.

An empty residual (from a unit clause on *x*) determines *x* without a solve.
On a timeout the variable is not determined.
*/

use crate::{
    analysis::Analysis,
    misc::log::targets::{self},
    monitor::Monitor,
    solver::{advanced::model_satisfies, AdvancedSatSolver, SatResult},
    structures::{
        literal::{CLiteral, Var},
        literal_set::{clean_literal_set, LiteralSet},
    },
    types::err::ErrorKind,
};

/// Finds the determined variables among those given, as positive literals.
#[derive(Debug, Default)]
pub struct DeterminedAnalysis {
    variables: Vec<Var>,
}

impl DeterminedAnalysis {
    pub fn new<I: IntoIterator<Item = Var>>(variables: I) -> Self {
        DeterminedAnalysis {
            variables: variables.into_iter().collect(),
        }
    }
}

impl Analysis for DeterminedAnalysis {
    type Output = LiteralSet;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        monitor.set_remaining_work(self.variables.len());
        let mut determined = Vec::new();

        for var in &self.variables {
            monitor.step()?;
            solver.check_literal(*var as CLiteral)?;

            if is_determined(solver, *var)? {
                determined.push(*var as CLiteral);
            }
        }

        log::debug!(target: targets::ANALYSIS, "Determined: {determined:?}");
        Ok(LiteralSet::new(determined))
    }
}

fn is_determined(solver: &mut AdvancedSatSolver, var: Var) -> Result<bool, ErrorKind> {
    let mut residuals = Vec::new();
    for clause in solver.cnf().clauses() {
        if clause.contains_variable(var) {
            if let Some(residual) = clean_literal_set(clause.literals(), &[var]) {
                residuals.push(residual);
            }
        }
    }

    if residuals.iter().any(LiteralSet::is_empty) {
        return Ok(true);
    }

    let satisfied = |model: &[CLiteral]| {
        residuals
            .iter()
            .all(|residual| residual.iter().any(|literal| model_satisfies(model, literal)))
    };
    if solver.known_solution(satisfied).is_some() {
        return Ok(false);
    }

    let mut added = 0;
    let mut result = Ok(true);
    for residual in &residuals {
        match solver.add_clause(residual) {
            Ok(_) => added += 1,
            Err(ErrorKind::Contradiction) => break,
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    if added == residuals.len() {
        result = match solver.has_solution() {
            Ok(SatResult::Unsatisfiable) => Ok(true),
            Ok(SatResult::Satisfiable) | Ok(SatResult::Timeout) => Ok(false),
            Err(e) => Err(e),
        };
    }

    solver.remove_last_clauses(added)?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{execute, tests::solver};

    fn determined(clauses: &[&[i32]], var_count: usize, variables: &[Var]) -> LiteralSet {
        let mut solver = solver(clauses, var_count);
        let clause_count = solver.clause_count();
        let mut analysis = DeterminedAnalysis::new(variables.iter().copied());
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor).unwrap();
        assert_eq!(solver.clause_count(), clause_count);
        result.result
    }

    #[test]
    fn definition() {
        // 3 ⇔ (1 ∧ 2)
        let clauses: &[&[i32]] = &[&[-3, 1], &[-3, 2], &[3, -1, -2]];
        assert_eq!(determined(clauses, 4, &[3, 4]), LiteralSet::new([3]));
    }

    #[test]
    fn free_child() {
        // 2 ⇒ 1, as an optional child.
        assert!(determined(&[&[-2, 1]], 2, &[2]).is_empty());
    }

    #[test]
    fn unit() {
        assert_eq!(determined(&[&[1], &[-1, 2]], 2, &[1, 2]), LiteralSet::new([1, 2]));
    }

    #[test]
    fn unmentioned_variable_is_free() {
        assert!(determined(&[&[1, 2]], 3, &[3]).is_empty());
    }
}
