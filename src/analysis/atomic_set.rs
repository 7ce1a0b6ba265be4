/*!
Atomic sets, i.e. groups of variables which have the same value in every model.

The forced literals (core and dead) form the first set, and are the only set with negative literals.
Every other variable is in exactly one set, of positive literals, which may be a singleton.

# Overview

Two variables are candidates for the same set if they agree on each known model.
Candidates *x* and *y* are in the same set if both *x* ∧ ¬*y* and ¬*x* ∧ *y* are unsatisfiable.
Each satisfiable check gives a model which may separate further candidates.

On a timeout two variables are placed in different sets.
*/

use crate::{
    analysis::{core_dead::find_forced, Analysis},
    misc::log::targets::{self},
    monitor::Monitor,
    solver::{advanced::model_satisfies, AdvancedSatSolver, SatResult},
    structures::{
        literal::{CLiteral, Literal},
        literal_set::LiteralSet,
    },
    types::err::ErrorKind,
};

/// Partitions the variables into atomic sets, under the assumptions.
///
/// Assumed variables are in no set.
/// The output is None if there is no model under the assumptions.
#[derive(Debug, Default)]
pub struct AtomicSetAnalysis {}

impl Analysis for AtomicSetAnalysis {
    type Output = Option<Vec<LiteralSet>>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        let assumed = LiteralSet::new(solver.assignments().iter().copied());

        let Some(forced) = find_forced(solver, None, monitor)? else {
            return Ok(None);
        };

        let mut models: Vec<Vec<CLiteral>> = solver
            .solutions()
            .filter(|model| {
                solver
                    .assignments()
                    .iter()
                    .all(|literal| model_satisfies(model, *literal))
            })
            .cloned()
            .collect();
        if models.is_empty() {
            match solver.find_solution()? {
                Some(model) => models.push(model),
                None => return Ok(None),
            }
        }

        let var_count = solver.var_count();
        let mut placed = vec![false; var_count + 1];
        for literal in assumed.iter().chain(forced.iter()) {
            placed[literal.var() as usize] = true;
        }

        monitor.set_remaining_work(var_count);
        let mut sets = vec![forced];

        for x in 1..=var_count {
            if placed[x] {
                continue;
            }
            monitor.step()?;
            placed[x] = true;
            let mut set = vec![x as CLiteral];

            for y in (x + 1)..=var_count {
                if placed[y] || !agree(&models, x, y) {
                    continue;
                }
                if equivalent(solver, &mut models, x as CLiteral, y as CLiteral)? {
                    placed[y] = true;
                    set.push(y as CLiteral);
                }
            }
            sets.push(LiteralSet::new(set));
        }

        log::debug!(target: targets::ANALYSIS, "{} atomic sets", sets.len());
        Ok(Some(sets))
    }
}

/// True if the variables `x` and `y` have the same value on each model.
fn agree(models: &[Vec<CLiteral>], x: usize, y: usize) -> bool {
    models
        .iter()
        .all(|model| (model[x - 1] > 0) == (model[y - 1] > 0))
}

fn equivalent(
    solver: &mut AdvancedSatSolver,
    models: &mut Vec<Vec<CLiteral>>,
    x: CLiteral,
    y: CLiteral,
) -> Result<bool, ErrorKind> {
    for assumptions in [[x, -y], [-x, y]] {
        match solver.has_solution_with(&assumptions)? {
            SatResult::Unsatisfiable => {}
            SatResult::Satisfiable => {
                models.push(solver.solution().to_vec());
                return Ok(false);
            }
            SatResult::Timeout => return Ok(false),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{execute, tests::solver};

    #[test]
    fn sets() {
        // 1 core, 4 dead, 2 ⇔ 3, 5 free.
        let clauses: &[&[i32]] = &[&[1], &[-4], &[-2, 3], &[2, -3], &[-5, 1]];
        let mut solver = solver(clauses, 5);
        let mut monitor = Monitor::default();
        let result = execute(&mut AtomicSetAnalysis::default(), &mut solver, &[], &mut monitor)
            .unwrap()
            .result
            .unwrap();

        assert_eq!(
            result,
            vec![
                LiteralSet::new([1, -4]),
                LiteralSet::new([2, 3]),
                LiteralSet::new([5]),
            ]
        );
    }

    #[test]
    fn under_assumptions() {
        // Given 1, the variables 2 and 3 are equivalent.
        let clauses: &[&[i32]] = &[&[-1, -2, 3], &[-1, 2, -3]];
        let mut solver = solver(clauses, 3);
        let mut monitor = Monitor::default();
        let result = execute(&mut AtomicSetAnalysis::default(), &mut solver, &[1], &mut monitor)
            .unwrap()
            .result
            .unwrap();
        assert_eq!(result, vec![LiteralSet::default(), LiteralSet::new([2, 3])]);

        let result = execute(&mut AtomicSetAnalysis::default(), &mut solver, &[], &mut monitor)
            .unwrap()
            .result
            .unwrap();
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn unsatisfiable() {
        let mut solver = solver(&[&[1, 2], &[-1, 2], &[-2]], 2);
        let mut monitor = Monitor::default();
        let result = execute(&mut AtomicSetAnalysis::default(), &mut solver, &[], &mut monitor);
        assert_eq!(result.unwrap().result, None);
    }
}
