/*!
Variables forced to a single value, i.e. core and dead features.

# Overview

A model found with the [Positive](SelectionStrategy::Positive) strategy and a model found with the [Negative](SelectionStrategy::Negative) strategy are compared.
A variable with different values in the two models is not forced, and any other variable is a candidate.

Each candidate is then tested by assuming its value in the models is false:
- If unsatisfiable, the variable is forced, and the value is kept on the assumption stack for the remaining tests.
- If satisfiable, the model found rules out each candidate it disagrees with.
  The [Fixed](SelectionStrategy::Fixed) strategy prefers the negation of each candidate, so a model tends to rule out many candidates.
- On a timeout the candidate is left unclassified.

Candidates are tested against a stack which grows with each forced value, so later tests are typically cheaper than earlier tests.
*/

use crate::{
    analysis::{update_solution, Analysis},
    config::SelectionStrategy,
    misc::log::targets::{self},
    monitor::Monitor,
    solver::{AdvancedSatSolver, SatResult},
    structures::{
        literal::{CLiteral, Literal, Var},
        literal_set::LiteralSet,
    },
    types::err::ErrorKind,
};

/// Finds the literals forced under the assumptions, positive for core and negative for dead.
///
/// Assumed variables are not reported.
/// The output is None if there is no model under the assumptions, or the first solve times out.
#[derive(Debug, Default)]
pub struct CoreDeadAnalysis {
    /// Candidate variables, or every variable if None.
    variables: Option<Vec<Var>>,
}

impl CoreDeadAnalysis {
    /// An analysis restricted to the given variables.
    pub fn for_variables<I: IntoIterator<Item = Var>>(variables: I) -> Self {
        CoreDeadAnalysis {
            variables: Some(variables.into_iter().collect()),
        }
    }
}

impl Analysis for CoreDeadAnalysis {
    type Output = Option<LiteralSet>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        let forced = find_forced(solver, self.variables.as_deref(), monitor)?;
        if let Some(forced) = &forced {
            log::debug!(target: targets::ANALYSIS, "Forced: {forced}");
        }
        Ok(forced)
    }
}

/// Finds forced literals among `candidates` (or every variable), leaving each on the assumption stack of `solver`.
///
/// The selection strategy of `solver` is restored before returning, on success or failure.
pub(crate) fn find_forced(
    solver: &mut AdvancedSatSolver,
    candidates: Option<&[Var]>,
    monitor: &mut Monitor,
) -> Result<Option<LiteralSet>, ErrorKind> {
    let strategy = solver.selection_strategy();
    let forced = forced_literals(solver, candidates, monitor);
    solver.set_selection_strategy(strategy);
    forced
}

fn forced_literals(
    solver: &mut AdvancedSatSolver,
    candidates: Option<&[Var]>,
    monitor: &mut Monitor,
) -> Result<Option<LiteralSet>, ErrorKind> {
    let start = solver.assignment_len();

    solver.set_selection_strategy(SelectionStrategy::Positive);
    let Some(mut model) = solver.find_solution()? else {
        log::debug!(target: targets::ANALYSIS, "No model under the assumptions");
        return Ok(None);
    };

    solver.set_selection_strategy(SelectionStrategy::Negative);
    if let Some(other) = solver.find_solution()? {
        update_solution(&mut model, &other);
    }

    for literal in solver.assignments() {
        model[literal.var() as usize - 1] = 0;
    }
    if let Some(candidates) = candidates {
        let mut wanted = vec![false; model.len()];
        for var in candidates {
            solver.check_literal(*var as CLiteral)?;
            wanted[*var as usize - 1] = true;
        }
        for (literal, wanted) in model.iter_mut().zip(wanted) {
            if !wanted {
                *literal = 0;
            }
        }
    }

    let preferred: Vec<CLiteral> = model.iter().map(|literal| -literal).collect();
    solver.set_fixed_strategy(&preferred);
    monitor.set_remaining_work(model.iter().filter(|literal| **literal != 0).count());

    for index in 0..model.len() {
        let literal = model[index];
        if literal == 0 {
            continue;
        }
        monitor.step()?;

        solver.assignment_push(-literal)?;
        match solver.has_solution()? {
            SatResult::Unsatisfiable => solver.assignment_replace_last(literal)?,

            SatResult::Timeout => {
                log::debug!(target: targets::ANALYSIS, "Timeout on {literal}");
                solver.assignment_pop()?;
            }

            SatResult::Satisfiable => {
                solver.assignment_pop()?;
                let solution = solver.solution().to_vec();
                update_solution(&mut model, &solution);
                solver.set_order_shuffle();
            }
        }
    }

    Ok(Some(LiteralSet::new(
        solver.assignments()[start..].iter().copied(),
    )))
}
