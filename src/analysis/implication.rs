//! Implications between sets of literals.

use crate::{
    analysis::Analysis,
    misc::log::targets::{self},
    monitor::Monitor,
    solver::{advanced::model_satisfies, AdvancedSatSolver, SatResult},
    structures::{literal::CLiteral, literal_set::LiteralSet},
    types::err::ErrorKind,
};

/// The conjunction of `premise` implies the disjunction of `conclusion`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Implication {
    pub premise: LiteralSet,
    pub conclusion: LiteralSet,
}

impl Implication {
    pub fn new(premise: LiteralSet, conclusion: LiteralSet) -> Self {
        Implication {
            premise,
            conclusion,
        }
    }

    /// True if `model` satisfies the premise and falsifies the conclusion.
    fn refuted_by(&self, model: &[CLiteral]) -> bool {
        self.premise.iter().all(|literal| model_satisfies(model, literal))
            && self
                .conclusion
                .iter()
                .all(|literal| model_satisfies(model, -literal))
    }
}

/// Finds the indices of the implications which hold under the assumptions, in ascending order.
///
/// An implication holds if assuming the premise and the negation of the conclusion is unsatisfiable.
/// On a timeout an implication does not hold.
#[derive(Debug, Default)]
pub struct ImplicationAnalysis {
    implications: Vec<Implication>,
}

impl ImplicationAnalysis {
    pub fn new(implications: Vec<Implication>) -> Self {
        ImplicationAnalysis { implications }
    }
}

impl Analysis for ImplicationAnalysis {
    type Output = Vec<usize>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        monitor.set_remaining_work(self.implications.len());
        let mut holds = Vec::new();

        for (index, implication) in self.implications.iter().enumerate() {
            monitor.step()?;

            if solver
                .known_solution(|model| implication.refuted_by(model))
                .is_some()
            {
                continue;
            }

            let mut assumptions = implication.premise.literals().to_vec();
            assumptions.extend(implication.conclusion.iter().map(|literal| -literal));

            match solver.has_solution_with(&assumptions)? {
                SatResult::Unsatisfiable => holds.push(index),
                SatResult::Satisfiable => {}
                SatResult::Timeout => {
                    log::debug!(target: targets::ANALYSIS, "Timeout on implication {index}")
                }
            }
        }
        Ok(holds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{execute, tests::solver};

    fn implication(premise: &[i32], conclusion: &[i32]) -> Implication {
        Implication::new(
            LiteralSet::new(premise.iter().copied()),
            LiteralSet::new(conclusion.iter().copied()),
        )
    }

    #[test]
    fn chain() {
        let mut solver = solver(&[&[-1, 2], &[-2, 3]], 4);
        let mut analysis = ImplicationAnalysis::new(vec![
            implication(&[1], &[3]),
            implication(&[3], &[1]),
            implication(&[1, 4], &[2]),
            implication(&[4], &[3, 4]),
            implication(&[], &[1, -1]),
        ]);
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor).unwrap();
        assert_eq!(result.result, vec![0, 2, 3, 4]);
    }

    #[test]
    fn recorded_model_refutes() {
        let mut solver = solver(&[&[1, 2]], 2);
        solver.has_solution_with(&[1, -2]).unwrap();

        let mut analysis = ImplicationAnalysis::new(vec![implication(&[1], &[2])]);
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor).unwrap();
        assert!(result.result.is_empty());
    }
}
