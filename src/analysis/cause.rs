/*!
Groups of clauses responsible for a forced literal or a redundant clause.

Both analyses add groups of clauses (typically, one group per constraint) to the solver one at a time.
After each addition, every fact not yet explained is checked, and the facts which now hold are attributed to the group just added.
So, a fact is attributed to the first group in the order of addition after which it holds.

The order of addition is a heuristic, given by [GroupOrder].
Any order gives a correct attribution, though different orders may attribute a fact to different groups.

Groups added are removed before an analysis returns.
*/

use crate::{
    analysis::{redundancy::is_redundant_clause, Analysis},
    misc::log::targets::{self},
    monitor::Monitor,
    solver::{advanced::model_satisfies, AdvancedSatSolver, SatResult},
    structures::{literal::CLiteral, literal_set::LiteralSet},
    types::err::ErrorKind,
};

/// The order in which groups are added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupOrder {
    /// By ascending count of literals, and otherwise as given.
    #[default]
    ShortestFirst,

    AsGiven,
}

impl GroupOrder {
    pub(crate) fn order(&self, groups: &[Vec<LiteralSet>]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..groups.len()).collect();
        if *self == GroupOrder::ShortestFirst {
            order.sort_by_key(|index| groups[*index].iter().map(LiteralSet::len).sum::<usize>());
        }
        order
    }
}

/// Attributes each of the given forced literals to a group.
///
/// The output is indexed by group, with the literals attributed to the group (if any).
/// A literal which does not hold after every group has been added is not attributed.
#[derive(Debug, Default)]
pub struct CoreDeadCauseAnalysis {
    literals: LiteralSet,
    groups: Vec<Vec<LiteralSet>>,
    order: GroupOrder,
}

impl CoreDeadCauseAnalysis {
    pub fn new(literals: LiteralSet, groups: Vec<Vec<LiteralSet>>) -> Self {
        CoreDeadCauseAnalysis {
            literals,
            groups,
            order: GroupOrder::default(),
        }
    }

    pub fn with_order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }
}

impl Analysis for CoreDeadCauseAnalysis {
    type Output = Vec<Option<LiteralSet>>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        let mut remaining: Vec<CLiteral> = self.literals.literals().to_vec();
        attribute(solver, &self.groups, self.order, monitor, |solver, contradiction| {
            let mut explained = Vec::new();
            if contradiction {
                explained.append(&mut remaining);
                return Ok(LiteralSet::new(explained));
            }

            let mut index = 0;
            while index < remaining.len() {
                let literal = remaining[index];
                let refuted = |model: &[CLiteral]| model_satisfies(model, -literal);
                let holds = if solver.known_solution(refuted).is_some() {
                    false
                } else {
                    solver.has_solution_with(&[-literal])? == SatResult::Unsatisfiable
                };

                match holds {
                    true => explained.push(remaining.swap_remove(index)),
                    false => index += 1,
                }
            }
            Ok(LiteralSet::new(explained))
        })
        .map(|attributed| {
            attributed
                .into_iter()
                .map(|set| set.filter(|set| !set.is_empty()))
                .collect()
        })
    }
}

/// Attributes each of the given redundant clauses to a group.
///
/// The output is indexed by group, with the clauses attributed to the group (if any).
/// The given clauses should not be among the groups.
#[derive(Debug, Default)]
pub struct RedundancyCauseAnalysis {
    clauses: Vec<LiteralSet>,
    groups: Vec<Vec<LiteralSet>>,
    order: GroupOrder,
}

impl RedundancyCauseAnalysis {
    pub fn new(clauses: Vec<LiteralSet>, groups: Vec<Vec<LiteralSet>>) -> Self {
        RedundancyCauseAnalysis {
            clauses,
            groups,
            order: GroupOrder::default(),
        }
    }

    pub fn with_order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }
}

impl Analysis for RedundancyCauseAnalysis {
    type Output = Vec<Option<Vec<LiteralSet>>>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        let mut remaining = self.clauses.clone();
        attribute(solver, &self.groups, self.order, monitor, |solver, contradiction| {
            if contradiction {
                return Ok(std::mem::take(&mut remaining));
            }

            let mut explained = Vec::new();
            let mut index = 0;
            while index < remaining.len() {
                match is_redundant_clause(solver, &remaining[index])? {
                    true => explained.push(remaining.remove(index)),
                    false => index += 1,
                }
            }
            Ok(explained)
        })
        .map(|attributed| {
            attributed
                .into_iter()
                .map(|clauses| clauses.filter(|clauses| !clauses.is_empty()))
                .collect()
        })
    }
}

/// Adds each group in `order`, calling `explain` after each addition.
///
/// `explain` is told whether the groups added so far are contradictory, and returns the facts explained by the group.
pub(crate) fn attribute<T>(
    solver: &mut AdvancedSatSolver,
    groups: &[Vec<LiteralSet>],
    order: GroupOrder,
    monitor: &mut Monitor,
    mut explain: impl FnMut(&mut AdvancedSatSolver, bool) -> Result<T, ErrorKind>,
) -> Result<Vec<Option<T>>, ErrorKind> {
    monitor.set_remaining_work(groups.len());
    let mut attributed: Vec<Option<T>> = groups.iter().map(|_| None).collect();
    let mut added = 0;

    let mut add_all = || -> Result<(), ErrorKind> {
        for index in order.order(groups) {
            monitor.step()?;

            let mut contradiction = false;
            for clause in &groups[index] {
                match solver.add_clause(clause) {
                    Ok(_) => added += 1,
                    Err(ErrorKind::Contradiction) => {
                        contradiction = true;
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
            if !contradiction {
                contradiction = solver.has_solution()? == SatResult::Unsatisfiable;
            }

            attributed[index] = Some(explain(solver, contradiction)?);
            if contradiction {
                log::debug!(target: targets::ANALYSIS, "Groups contradictory with group {index}");
                break;
            }
        }
        Ok(())
    };

    let result = add_all();
    solver.remove_last_clauses(added)?;
    result.map(|_| attributed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{execute, tests::solver};

    fn group(clauses: &[&[i32]]) -> Vec<LiteralSet> {
        clauses.iter().map(|c| LiteralSet::new(c.iter().copied())).collect()
    }

    #[test]
    fn dead_cause() {
        // The tree: 2 ⇒ 1 and 3 ⇒ 1. Constraints: 2 ⇒ ¬1, and 3 ⇒ 2.
        let mut solver = solver(&[&[-2, 1], &[-3, 1]], 3);
        let groups = vec![group(&[&[-2, -1]]), group(&[&[-3, 2]])];
        let mut analysis = CoreDeadCauseAnalysis::new(LiteralSet::new([-2, -3]), groups);
        let mut monitor = Monitor::default();

        let result = execute(&mut analysis, &mut solver, &[], &mut monitor)
            .unwrap()
            .result;
        assert_eq!(
            result,
            vec![Some(LiteralSet::new([-2])), Some(LiteralSet::new([-3]))]
        );
        assert_eq!(solver.clause_count(), 2);

        // Added the other way around, neither constraint alone kills a feature.
        let groups = vec![group(&[&[-3, 2]]), group(&[&[-2, -1]])];
        let mut analysis = CoreDeadCauseAnalysis::new(LiteralSet::new([-2, -3]), groups)
            .with_order(GroupOrder::AsGiven);
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor)
            .unwrap()
            .result;
        assert_eq!(result, vec![None, Some(LiteralSet::new([-3, -2]))]);
    }

    #[test]
    fn shortest_first() {
        let mut solver = solver(&[], 3);
        let groups = vec![group(&[&[-1, 2, 3], &[-3]]), group(&[&[-1]])];
        let mut analysis = CoreDeadCauseAnalysis::new(LiteralSet::new([-1]), groups);
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor)
            .unwrap()
            .result;
        assert_eq!(result, vec![None, Some(LiteralSet::new([-1]))]);
    }

    #[test]
    fn redundancy_cause() {
        let mut solver = solver(&[], 3);
        let groups = vec![group(&[&[-1, 2]]), group(&[&[-2, 3]])];
        let clauses = group(&[&[-1, 3], &[-1, 2, 3]]);
        let mut analysis = RedundancyCauseAnalysis::new(clauses, groups).with_order(GroupOrder::AsGiven);
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor)
            .unwrap()
            .result;
        assert_eq!(
            result,
            vec![
                Some(group(&[&[-1, 2, 3]])),
                Some(group(&[&[-1, 3]])),
            ]
        );
        assert_eq!(solver.clause_count(), 0);
    }

    #[test]
    fn contradiction_explains_everything() {
        let mut solver = solver(&[&[1]], 2);
        let groups = vec![group(&[&[-1]])];
        let mut analysis = CoreDeadCauseAnalysis::new(LiteralSet::new([2]), groups);
        let mut monitor = Monitor::default();
        let result = execute(&mut analysis, &mut solver, &[], &mut monitor)
            .unwrap()
            .result;
        assert_eq!(result, vec![Some(LiteralSet::new([2]))]);
    }
}
