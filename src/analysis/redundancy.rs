/*!
Redundant groups of clauses, i.e. redundant constraints.

A clause is redundant if it is implied by the other clauses, and so its negation is unsatisfiable against them.
A group of clauses (typically the clauses of a single constraint) is redundant if each of its clauses is.

# Overview

Every group is added to the solver.
Then, in order of descending length, each group is removed and tested against the clauses which remain:
- A redundant group stays removed, so is not used to show some later group is redundant.
- Any other group is added back.

Shorter groups are stronger, and are tested last so they remain to witness the redundancy of longer groups.

On a timeout a clause is not redundant.
*/

use crate::{
    analysis::Analysis,
    misc::log::targets::{self},
    monitor::Monitor,
    solver::{advanced::model_satisfies, AdvancedSatSolver, ClauseKey, SatResult},
    structures::literal_set::LiteralSet,
    types::err::ErrorKind,
};

/// Finds the indices of redundant groups, in ascending order.
///
/// Clauses of the groups are not part of the solver on entry or exit.
#[derive(Debug, Default)]
pub struct RedundancyAnalysis {
    groups: Vec<Vec<LiteralSet>>,
}

impl RedundancyAnalysis {
    pub fn new(groups: Vec<Vec<LiteralSet>>) -> Self {
        RedundancyAnalysis { groups }
    }

    /// An analysis of each clause as a group of its own.
    pub fn for_clauses<I: IntoIterator<Item = LiteralSet>>(clauses: I) -> Self {
        RedundancyAnalysis {
            groups: clauses.into_iter().map(|clause| vec![clause]).collect(),
        }
    }
}

impl Analysis for RedundancyAnalysis {
    type Output = Vec<usize>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        monitor.set_remaining_work(self.groups.len() + 1);

        let mut keys: Vec<Vec<ClauseKey>> = Vec::with_capacity(self.groups.len());
        let result = self.classify(solver, &mut keys, monitor);

        for group_keys in keys {
            for key in group_keys {
                solver.remove_clause(key)?;
            }
        }
        result
    }
}

impl RedundancyAnalysis {
    fn classify(
        &self,
        solver: &mut AdvancedSatSolver,
        keys: &mut Vec<Vec<ClauseKey>>,
        monitor: &mut Monitor,
    ) -> Result<Vec<usize>, ErrorKind> {
        for group in &self.groups {
            let mut group_keys = Vec::with_capacity(group.len());
            for clause in group {
                match solver.add_clause(clause) {
                    Ok(key) => group_keys.push(key),
                    Err(e) => {
                        keys.push(group_keys);
                        return Err(e);
                    }
                }
            }
            keys.push(group_keys);
        }
        monitor.step()?;

        let mut redundant = Vec::new();
        for index in descending_length(&self.groups) {
            monitor.step()?;

            for key in std::mem::take(&mut keys[index]) {
                solver.remove_clause(key)?;
            }

            let mut is_redundant = true;
            for clause in &self.groups[index] {
                if !is_redundant_clause(solver, clause)? {
                    is_redundant = false;
                    break;
                }
            }

            match is_redundant {
                true => {
                    log::debug!(target: targets::REDUNDANCY, "Group {index} is redundant");
                    redundant.push(index);
                }
                false => keys[index] = solver.add_clauses(&self.groups[index])?,
            }
        }

        redundant.sort_unstable();
        Ok(redundant)
    }
}

/// Finds the indices of tautological groups, in ascending order.
///
/// A group is tautological if each of its clauses is implied by the solver alone, typically an empty formula.
/// So, an empty group is tautological.
#[derive(Debug, Default)]
pub struct TautologyAnalysis {
    groups: Vec<Vec<LiteralSet>>,
}

impl TautologyAnalysis {
    pub fn new(groups: Vec<Vec<LiteralSet>>) -> Self {
        TautologyAnalysis { groups }
    }
}

impl Analysis for TautologyAnalysis {
    type Output = Vec<usize>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        monitor.set_remaining_work(self.groups.len());
        let mut tautologies = Vec::new();

        'groups: for (index, group) in self.groups.iter().enumerate() {
            monitor.step()?;
            for clause in group {
                if !is_redundant_clause(solver, clause)? {
                    continue 'groups;
                }
            }
            tautologies.push(index);
        }
        Ok(tautologies)
    }
}

/// Indices of `groups`, by descending count of literals, and otherwise as given.
pub(crate) fn descending_length(groups: &[Vec<LiteralSet>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by_key(|index| {
        std::cmp::Reverse(groups[*index].iter().map(LiteralSet::len).sum::<usize>())
    });
    order
}

/// True if the negation of `clause` is unsatisfiable, under the assumptions of `solver`.
///
/// A recorded model which falsifies `clause` is used in place of a solve.
pub fn is_redundant_clause(
    solver: &mut AdvancedSatSolver,
    clause: &LiteralSet,
) -> Result<bool, ErrorKind> {
    let falsified = |model: &[i32]| clause.iter().all(|literal| model_satisfies(model, -literal));
    if solver.known_solution(falsified).is_some() {
        return Ok(false);
    }

    match solver.has_solution_with(clause.negate().literals())? {
        SatResult::Unsatisfiable => Ok(true),
        SatResult::Satisfiable => Ok(false),
        SatResult::Timeout => {
            log::debug!(target: targets::REDUNDANCY, "Timeout on {clause}");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{execute, tests::solver};

    fn sets(clauses: &[&[i32]]) -> Vec<LiteralSet> {
        clauses.iter().map(|c| LiteralSet::new(c.iter().copied())).collect()
    }

    #[test]
    fn implied_clause() {
        let mut solver = solver(&[&[-1, 2], &[-2, 3]], 3);
        let mut analysis = RedundancyAnalysis::for_clauses(sets(&[&[-1, 3], &[1, 2]]));
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor).unwrap();
        assert_eq!(result.result, vec![0]);
        assert_eq!(solver.clause_count(), 2);
    }

    #[test]
    fn equivalent_pair_keeps_one() {
        let mut solver = solver(&[], 2);
        let mut analysis = RedundancyAnalysis::for_clauses(sets(&[&[1, 2], &[1, 2, 2]]));
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor).unwrap();
        assert_eq!(result.result.len(), 1);
    }

    #[test]
    fn longest_first() {
        // The unit makes the longer clause redundant, not the other way around.
        let mut solver = solver(&[], 3);
        let mut analysis = RedundancyAnalysis::for_clauses(sets(&[&[1], &[1, 2, 3]]));
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor).unwrap();
        assert_eq!(result.result, vec![1]);
    }

    #[test]
    fn single_clause_is_not_redundant() {
        let mut solver = solver(&[], 2);
        let mut analysis = RedundancyAnalysis::for_clauses(sets(&[&[1, -2]]));
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor).unwrap();
        assert!(result.result.is_empty());

        let mut analysis = RedundancyAnalysis::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor).unwrap();
        assert!(result.result.is_empty());
    }

    #[test]
    fn groups() {
        let mut solver = solver(&[&[-1, 2], &[-2, 3]], 3);
        let groups = vec![sets(&[&[-1, 3], &[-1, 2]]), sets(&[&[-1, 3], &[1]])];
        let mut monitor = Monitor::default();
        let result = execute(&mut RedundancyAnalysis::new(groups), &mut solver, &[], &mut monitor);
        assert_eq!(result.unwrap().result, vec![0]);
    }

    #[test]
    fn tautologies() {
        let mut solver = solver(&[&[1]], 2);
        let groups = vec![sets(&[&[1, -1, 2]]), Vec::default(), sets(&[&[1]]), sets(&[&[2, -2], &[2]])];
        let mut monitor = Monitor::default();
        let result = execute(&mut TautologyAnalysis::new(groups), &mut solver, &[], &mut monitor);
        // The unit is implied by the solver, though not a tautology of an empty formula.
        assert_eq!(result.unwrap().result, vec![0, 1, 2]);
    }

    #[test]
    fn under_assumptions() {
        let mut solver = solver(&[&[-1, 2]], 3);
        let mut analysis = RedundancyAnalysis::for_clauses(sets(&[&[2, 3]]));
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[1], &mut monitor).unwrap();
        assert_eq!(result.result, vec![0]);
    }
}
