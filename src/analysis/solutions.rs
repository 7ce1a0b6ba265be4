/*!
Enumeration, counting, and coverage of models.

Models are enumerated by adding a blocking clause (the negation of a model) after each model is found.
Blocking clauses are removed before an analysis returns, so the solver is left as it was found.
*/

use std::time::{Duration, Instant};

use crate::{
    analysis::Analysis,
    misc::log::targets::{self},
    monitor::Monitor,
    solver::{advanced::model_satisfies, AdvancedSatSolver, SatResult},
    structures::{literal::CLiteral, literal_set::LiteralSet},
    types::err::ErrorKind,
};

/// Finds up to `max` distinct models under the assumptions.
///
/// Enumeration stops early on a timeout.
#[derive(Debug)]
pub struct SolutionsAnalysis {
    max: usize,
}

impl SolutionsAnalysis {
    pub fn new(max: usize) -> Self {
        SolutionsAnalysis { max }
    }
}

impl Analysis for SolutionsAnalysis {
    type Output = Vec<LiteralSet>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        let mut solutions = Vec::new();
        let max = self.max;
        if max == 0 {
            return Ok(solutions);
        }
        let exhausted = enumerate(solver, monitor, |model| {
            solutions.push(LiteralSet::from_model(model));
            solutions.len() < max
        });

        match exhausted {
            Ok(Enumeration::Timeout) => {
                log::info!(target: targets::ANALYSIS, "Timeout after {} solutions", solutions.len())
            }
            Ok(_) => {}
            Err(e) => return Err(e),
        }
        Ok(solutions)
    }

    fn contradiction_output(&self) -> Option<Self::Output> {
        Some(Vec::new())
    }
}

/// Counts the models under the assumptions.
///
/// A count is exact if non-negative.
/// If the count is cut short by a timeout (of a solve, or the limit of the analysis) after *n* models, the count is -(*n* + 1).
#[derive(Debug, Default)]
pub struct CountSolutionsAnalysis {
    limit: Option<Duration>,
}

impl CountSolutionsAnalysis {
    /// An analysis which stops counting once `limit` has elapsed.
    pub fn with_limit(limit: Duration) -> Self {
        CountSolutionsAnalysis { limit: Some(limit) }
    }
}

impl Analysis for CountSolutionsAnalysis {
    type Output = i64;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        let start = Instant::now();
        let limit = self.limit;
        let mut count: i64 = 0;
        let mut out_of_time = false;

        let enumeration = enumerate(solver, monitor, |_| {
            count += 1;
            out_of_time = limit.is_some_and(|limit| start.elapsed() > limit);
            !out_of_time
        })?;

        match (enumeration, out_of_time) {
            (Enumeration::Timeout, _) | (_, true) => {
                log::info!(target: targets::ANALYSIS, "Count cut short after {count} solutions");
                Ok(-(count + 1))
            }
            _ => Ok(count),
        }
    }

    fn contradiction_output(&self) -> Option<Self::Output> {
        Some(0)
    }
}

/// Finds models which together satisfy each of the given literals, where possible.
///
/// Each model is built greedily, by assuming as many uncovered literals as remain satisfiable.
/// A literal which is unsatisfiable (or times out) on its own is not covered.
#[derive(Debug, Default)]
pub struct OneWiseCoverage {
    literals: Vec<CLiteral>,
}

impl OneWiseCoverage {
    pub fn new<I: IntoIterator<Item = CLiteral>>(literals: I) -> Self {
        let mut unique = Vec::new();
        for literal in literals {
            if !unique.contains(&literal) {
                unique.push(literal);
            }
        }
        OneWiseCoverage { literals: unique }
    }
}

impl Analysis for OneWiseCoverage {
    type Output = Vec<LiteralSet>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        for literal in &self.literals {
            solver.check_literal(*literal)?;
        }
        monitor.set_remaining_work(self.literals.len());

        let mut uncovered = self.literals.clone();
        let mut configurations = Vec::new();

        while let Some(first) = uncovered.first().copied() {
            monitor.check_cancel()?;
            let length = solver.assignment_len();

            solver.assignment_push(first)?;
            let mut model = match solver.find_solution()? {
                Some(model) => model,
                None => {
                    log::debug!(target: targets::ANALYSIS, "Unable to cover {first}");
                    solver.assignment_clear(length);
                    uncovered.remove(0);
                    monitor.step()?;
                    continue;
                }
            };

            for literal in uncovered[1..].to_vec() {
                if model_satisfies(&model, literal) {
                    continue;
                }
                solver.assignment_push(literal)?;
                match solver.find_solution()? {
                    Some(extended) => model = extended,
                    None => {
                        solver.assignment_pop()?;
                    }
                }
            }
            solver.assignment_clear(length);

            let before = uncovered.len();
            uncovered.retain(|literal| !model_satisfies(&model, *literal));
            for _ in uncovered.len()..before {
                monitor.step()?;
            }
            configurations.push(LiteralSet::from_model(&model));
        }

        Ok(configurations)
    }
}

/// How an enumeration ended.
#[derive(Debug, PartialEq, Eq)]
enum Enumeration {
    /// Every model was found.
    Exhausted,

    /// The callback asked to stop.
    Stopped,

    Timeout,
}

/// Calls `on_model` on each model under the assumptions of `solver`, until `on_model` returns false.
fn enumerate(
    solver: &mut AdvancedSatSolver,
    monitor: &mut Monitor,
    mut on_model: impl FnMut(&[CLiteral]) -> bool,
) -> Result<Enumeration, ErrorKind> {
    let mut blocking_clauses = 0;
    let mut enumeration = || -> Result<Enumeration, ErrorKind> {
        loop {
            monitor.check_cancel()?;
            match solver.has_solution()? {
                SatResult::Satisfiable => {}
                SatResult::Unsatisfiable => return Ok(Enumeration::Exhausted),
                SatResult::Timeout => return Ok(Enumeration::Timeout),
            }

            let model = solver.solution().to_vec();
            if !on_model(&model) {
                return Ok(Enumeration::Stopped);
            }

            let blocking = LiteralSet::from_model(&model).negate();
            match solver.add_clause(&blocking) {
                Ok(_) => blocking_clauses += 1,
                Err(ErrorKind::Contradiction) => return Ok(Enumeration::Exhausted),
                Err(e) => return Err(e),
            }
        }
    };

    let result = enumeration();
    solver.remove_last_clauses(blocking_clauses)?;
    result
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
    fn all_solutions() {
        let mut solver = solver(&[&[1, 2], &[-1, -2]], 3);
        let mut monitor = Monitor::default();
        let result = execute(&mut SolutionsAnalysis::new(100), &mut solver, &[], &mut monitor);
        let mut solutions = result.unwrap().result;
        solutions.sort();
        assert_eq!(solutions.len(), 4);
        solutions.dedup();
        assert_eq!(solutions.len(), 4);
        assert_eq!(solver.clause_count(), 2);
    }

    #[test]
    fn max_solutions() {
        let mut solver = solver(&[], 4);
        let mut monitor = Monitor::default();
        let result = execute(&mut SolutionsAnalysis::new(3), &mut solver, &[-1], &mut monitor);
        let solutions = result.unwrap().result;
        assert_eq!(solutions.len(), 3);
        assert!(solutions.iter().all(|s| s.contains_literal(-1)));
    }

    #[test]
    fn count() {
        let mut solver = solver(&[&[1, 2, 3]], 3);
        let mut monitor = Monitor::default();
        let result = execute(&mut CountSolutionsAnalysis::default(), &mut solver, &[], &mut monitor);
        assert_eq!(result.unwrap().result, 7);

        let result = execute(&mut CountSolutionsAnalysis::default(), &mut solver, &[-1, -2], &mut monitor);
        assert_eq!(result.unwrap().result, 1);
    }

    #[test]
    fn count_limit() {
        let mut solver = solver(&[], 12);
        let mut analysis = CountSolutionsAnalysis::with_limit(Duration::ZERO);
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor);
        assert_eq!(result.unwrap().result, -2);
    }

    #[test]
    fn count_contradiction() {
        let cnf = cnf(&[&[1], &[-1]], 1);
        let mut monitor = Monitor::default();
        let count = run_on_cnf(&cnf, Config::default(), &mut CountSolutionsAnalysis::default(), &[], &mut monitor);
        assert_eq!(count.unwrap().map(|count| count.result), Some(0));

        let solutions = run_on_cnf(&cnf, Config::default(), &mut SolutionsAnalysis::new(2), &[], &mut monitor);
        assert_eq!(solutions.unwrap().map(|solutions| solutions.result), Some(Vec::new()));
    }

    #[test]
    fn count_no_variables() {
        let mut solver = solver(&[], 0);
        let mut monitor = Monitor::default();
        let result = execute(&mut CountSolutionsAnalysis::default(), &mut solver, &[], &mut monitor);
        assert_eq!(result.unwrap().result, 1);
    }

    #[test]
    fn coverage() {
        // 1 and 2 exclude each other, and 3 is dead.
        let mut solver = solver(&[&[-1, -2], &[-3]], 3);
        let mut analysis = OneWiseCoverage::new([1, 2, 3, -1]);
        let mut monitor = Monitor::default();
        let configurations = execute(&mut analysis, &mut solver, &[], &mut monitor)
            .unwrap()
            .result;

        assert_eq!(configurations.len(), 2);
        assert!(configurations[0].contains_literal(1));
        assert!(configurations[1].contains_literal(2));
        assert!(configurations.iter().any(|c| c.contains_literal(-1)));
        assert!(configurations.iter().all(|c| c.contains_literal(-3)));
    }
}
