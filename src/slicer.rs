/*!
Projection of a CNF onto a subset of its variables, by elimination of the remaining ('dirty') variables.

The result is a CNF over a fresh mapping of the kept ('clean') names, in their original order, such that an assignment to the clean variables extends to a model of the input if and only if it satisfies the result.

# Overview

Each dirty variable *v* is eliminated by resolution:

- The clauses which mention *v* are split into those with *v* and those with ¬*v*.
- Each pair of clauses from either side gives a resolvent, without *v*.
  Tautologies and clauses already present are discarded.
- The clauses which mention *v* are removed, and the resolvents added.

Clauses are kept in two lists, *clean* (no dirty variable) and *dirty*.
A new clean clause is only kept if it is not implied by the clean clauses kept so far, and likewise a new dirty clause is only kept if it is not implied by the clean clauses together with the other dirty clauses.
Implication is checked with a solver, and a solve which times out is read as 'not implied'.

The order of elimination is given by an [EliminationOrder].
By default, the next variable is one whose elimination grows the clause count the least.

If at some point no dirty clause mentions a clean variable, the dirty clauses are independent of the clean clauses.
So, elimination stops early, after checking the dirty clauses are satisfiable.

If the input is unsatisfiable (e.g. some resolvent is empty), the result is a single empty clause.

```rust
# use std::sync::Arc;
# use fm_sat::{monitor::Monitor, slicer::CnfSlicer, structures::{variables::Variables, CNF}};
// A ⇒ B, B ⇒ C, with B removed.
let variables = Arc::new(Variables::new(["A", "B", "C"]));
let cnf = CNF::from_clauses(variables, [vec![-1, 2], vec![-2, 3]]).unwrap();

let sliced = CnfSlicer::new(["B"]).slice(&cnf, &mut Monitor::default()).unwrap();
assert_eq!(sliced.variables().names().collect::<Vec<_>>(), vec!["A", "C"]);
assert_eq!(sliced.clauses().len(), 1);
assert_eq!(sliced.clauses()[0].literals(), &[-1, 2]);
```
*/

use std::{collections::HashSet, sync::Arc};

use crate::{
    config::Config,
    misc::log::targets::{self},
    monitor::Monitor,
    solver::{SatResult, SimpleSatSolver},
    structures::{
        literal::{CLiteral, Var},
        literal_set::{clean_literal_set, LiteralSet},
        CNF,
    },
    types::err::ErrorKind,
};

/// The order in which dirty variables are eliminated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EliminationOrder {
    /// A variable with the least value of *p*·*n* - (*p* + *n*), for *p* and *n* the count of dirty clauses with the positive and negative literal of the variable.
    /// Ties go to the variable given first.
    #[default]
    MinimumClauses,

    /// The order of the names given.
    AsGiven,
}

/// Removes a collection of names from a CNF.
#[derive(Clone, Debug)]
pub struct CnfSlicer {
    dirty: Vec<String>,
    order: EliminationOrder,
    config: Config,
}

impl CnfSlicer {
    /// A slicer which removes `dirty`.
    pub fn new<I, S>(dirty: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CnfSlicer {
            dirty: dirty.into_iter().map(|name| name.into()).collect(),
            order: EliminationOrder::default(),
            config: Config::default(),
        }
    }

    pub fn with_order(mut self, order: EliminationOrder) -> Self {
        self.order = order;
        self
    }

    /// The configuration of the solvers used to check for redundant clauses.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The projection of `cnf` onto the names of `cnf` which are not dirty.
    ///
    /// Fails with [UnknownVariable](ErrorKind::UnknownVariable) if some dirty name is not part of the mapping of `cnf`, and with [Cancelled](ErrorKind::Cancelled) if `monitor` is cancelled.
    pub fn slice(&self, cnf: &CNF, monitor: &mut Monitor) -> Result<CNF, ErrorKind> {
        let mut dirty_variables: Vec<Var> = Vec::with_capacity(self.dirty.len());
        for name in &self.dirty {
            let var = cnf.variables().variable(name)?;
            if !dirty_variables.contains(&var) {
                dirty_variables.push(var);
            }
        }

        let clean_variables = Arc::new(cnf.variables().without(&self.dirty));
        log::info!(target: targets::SLICER,
            "Slicing {} of {} variables from {} clauses",
            dirty_variables.len(),
            cnf.variables().size(),
            cnf.clauses().len()
        );

        let clauses = match self.eliminate(cnf, &dirty_variables, monitor) {
            Ok(clauses) => clauses,
            Err(ErrorKind::Contradiction) => {
                log::info!(target: targets::SLICER, "Unsatisfiable formula");
                vec![LiteralSet::default()]
            }
            Err(e) => return Err(e),
        };

        let mut sliced = CNF::new(clean_variables.clone());
        for clause in clauses {
            let mut literals = Vec::with_capacity(clause.len());
            for literal in clause.iter() {
                literals.push(cnf.variables().translate(literal, &clean_variables)?);
            }
            sliced.add_clause(LiteralSet::new(literals))?;
        }

        log::info!(target: targets::SLICER, "Sliced formula has {} clauses", sliced.clauses().len());
        Ok(sliced)
    }

    /// The clean clauses which remain after eliminating each of `dirty_variables`, over the mapping of `cnf`.
    ///
    /// Returns [Contradiction](ErrorKind::Contradiction) as soon as `cnf` is found to be unsatisfiable.
    fn eliminate(
        &self,
        cnf: &CNF,
        dirty_variables: &[Var],
        monitor: &mut Monitor,
    ) -> Result<Vec<LiteralSet>, ErrorKind> {
        let base = CNF::new(cnf.shared_variables());
        let mut is_dirty = vec![false; cnf.variables().size() + 1];
        for var in dirty_variables {
            is_dirty[*var as usize] = true;
        }

        let mut state = Elimination {
            clean_solver: SimpleSatSolver::with_config(&base, self.config.clone())?,
            config: &self.config,
            base,
            is_dirty,
            clean: Vec::default(),
            dirty: Vec::default(),
        };

        let mut seen = HashSet::new();
        let mut new_clean = Vec::default();
        for clause in cnf.clauses() {
            let Some(clause) = clean_literal_set(clause.literals(), &[]) else {
                continue;
            };
            if clause.is_empty() {
                return Err(ErrorKind::Contradiction);
            }
            if !seen.insert(clause.clone()) {
                continue;
            }
            match state.mentions_dirty(&clause) {
                true => state.dirty.push(clause),
                false => new_clean.push(clause),
            }
        }

        state.add_clean(new_clean)?;
        state.prune_dirty()?;

        let mut remaining = dirty_variables.to_vec();
        let mut check_independence = true;
        monitor.set_remaining_work(remaining.len());

        while !state.dirty.is_empty() {
            if check_independence && !state.has_mixed_clause() {
                match state.dirty_satisfiable()? {
                    SatResult::Satisfiable => {
                        log::debug!(target: targets::SLICER,
                            "{} dirty clauses independent of clean variables",
                            state.dirty.len()
                        );
                        break;
                    }
                    SatResult::Unsatisfiable => return Err(ErrorKind::Contradiction),
                    SatResult::Timeout => check_independence = false,
                }
            }

            monitor.step()?;
            let Some(var) = next_variable(self.order, &state.dirty, &mut remaining) else {
                break;
            };
            state.eliminate_variable(var)?;
        }

        Ok(state.clean)
    }
}

/// The working lists of an elimination.
struct Elimination<'c> {
    config: &'c Config,

    /// An empty formula over the mapping of the input, from which fresh solvers are made.
    base: CNF,

    /// Indexed by variable.
    is_dirty: Vec<bool>,

    clean: Vec<LiteralSet>,
    dirty: Vec<LiteralSet>,

    /// A solver over `clean`.
    clean_solver: SimpleSatSolver,
}

impl Elimination<'_> {
    fn mentions_dirty(&self, clause: &LiteralSet) -> bool {
        clause.variables().any(|var| self.is_dirty[var as usize])
    }

    /// True if some dirty clause also mentions a clean variable.
    fn has_mixed_clause(&self) -> bool {
        self.dirty
            .iter()
            .any(|clause| clause.variables().any(|var| !self.is_dirty[var as usize]))
    }

    fn solver_over<'a>(
        &self,
        clauses: impl Iterator<Item = &'a LiteralSet>,
    ) -> Result<SimpleSatSolver, ErrorKind> {
        let mut solver = SimpleSatSolver::with_config(&self.base, self.config.clone())?;
        solver.add_clauses(clauses)?;
        Ok(solver)
    }

    fn dirty_satisfiable(&self) -> Result<SatResult, ErrorKind> {
        let mut solver = self.solver_over(self.dirty.iter())?;
        solver.has_solution()
    }

    /// Keeps each of `clauses` not implied by the clean clauses, shortest first.
    fn add_clean(&mut self, mut clauses: Vec<LiteralSet>) -> Result<(), ErrorKind> {
        clauses.sort_by_key(LiteralSet::len);
        for clause in clauses {
            if implied(&mut self.clean_solver, &clause)? {
                continue;
            }
            self.clean_solver.add_clause(&clause)?;
            self.clean.push(clause);
        }
        Ok(())
    }

    /// Drops each dirty clause implied by the clean clauses and the shorter dirty clauses.
    fn prune_dirty(&mut self) -> Result<(), ErrorKind> {
        if self.dirty.is_empty() {
            return Ok(());
        }
        let mut candidates = std::mem::take(&mut self.dirty);
        candidates.sort_by_key(LiteralSet::len);

        let mut solver = self.solver_over(self.clean.iter())?;
        for clause in candidates {
            if implied(&mut solver, &clause)? {
                continue;
            }
            solver.add_clause(&clause)?;
            self.dirty.push(clause);
        }
        log::debug!(target: targets::SLICER, "{} dirty clauses after pruning", self.dirty.len());
        Ok(())
    }

    fn eliminate_variable(&mut self, var: Var) -> Result<(), ErrorKind> {
        let literal = var as CLiteral;
        self.is_dirty[var as usize] = false;

        let (mut positive, mut negative, mut rest) = (Vec::new(), Vec::new(), Vec::new());
        for clause in std::mem::take(&mut self.dirty) {
            if clause.contains_literal(literal) {
                positive.push(clause);
            } else if clause.contains_literal(-literal) {
                negative.push(clause);
            } else {
                rest.push(clause);
            }
        }

        let mut present: HashSet<&LiteralSet> = self.clean.iter().chain(rest.iter()).collect();
        let mut new_clean = Vec::new();
        let mut new_dirty = Vec::new();

        for p in &positive {
            for n in &negative {
                let combined: Vec<CLiteral> = p.iter().chain(n.iter()).collect();
                let Some(resolvent) = clean_literal_set(&combined, &[var]) else {
                    continue;
                };
                if resolvent.is_empty() {
                    return Err(ErrorKind::Contradiction);
                }
                if present.contains(&resolvent)
                    || new_clean.contains(&resolvent)
                    || new_dirty.contains(&resolvent)
                {
                    continue;
                }
                let dirty = resolvent.variables().any(|v| self.is_dirty[v as usize]);
                match dirty {
                    true => new_dirty.push(resolvent),
                    false => new_clean.push(resolvent),
                }
            }
        }

        log::debug!(target: targets::SLICER,
            "Eliminating {var}: {} positive, {} negative, {} clean and {} dirty resolvents",
            positive.len(),
            negative.len(),
            new_clean.len(),
            new_dirty.len()
        );

        self.dirty = rest;
        self.add_clean(new_clean)?;

        if !new_dirty.is_empty() {
            new_dirty.sort_by_key(LiteralSet::len);
            let mut solver = self.solver_over(self.clean.iter().chain(self.dirty.iter()))?;
            for clause in new_dirty {
                if implied(&mut solver, &clause)? {
                    continue;
                }
                solver.add_clause(&clause)?;
                self.dirty.push(clause);
            }
        }
        Ok(())
    }
}

/// True if the clauses of `solver` imply `clause`, i.e. the negation of `clause` is unsatisfiable.
fn implied(solver: &mut SimpleSatSolver, clause: &LiteralSet) -> Result<bool, ErrorKind> {
    let negation: Vec<CLiteral> = clause.iter().map(|literal| -literal).collect();
    Ok(solver.has_solution_with(&negation)? == SatResult::Unsatisfiable)
}

/// Removes and returns the next variable to eliminate from `remaining`.
///
/// Variables no longer mentioned by any dirty clause are dropped along the way, and None is returned if no remaining variable is mentioned.
fn next_variable(
    order: EliminationOrder,
    dirty: &[LiteralSet],
    remaining: &mut Vec<Var>,
) -> Option<Var> {
    let occurrences = |var: Var| -> (i64, i64) {
        let (mut positive, mut negative) = (0, 0);
        for clause in dirty {
            if clause.contains_literal(var as CLiteral) {
                positive += 1;
            } else if clause.contains_literal(-(var as CLiteral)) {
                negative += 1;
            }
        }
        (positive, negative)
    };

    let counts: Vec<(i64, i64)> = remaining.iter().map(|var| occurrences(*var)).collect();
    let mut best: Option<(usize, i64)> = None;
    for (index, (positive, negative)) in counts.iter().enumerate() {
        if positive + negative == 0 {
            continue;
        }
        let cost = match order {
            EliminationOrder::MinimumClauses => positive * negative - (positive + negative),
            EliminationOrder::AsGiven => 0,
        };
        if best.is_none_or(|(_, best_cost)| cost < best_cost) {
            best = Some((index, cost));
        }
    }

    let chosen = best.map(|(index, _)| remaining[index]);
    let mut index = 0;
    remaining.retain(|var| {
        let keep = counts[index].0 + counts[index].1 > 0 && Some(*var) != chosen;
        index += 1;
        keep
    });
    chosen
}

#[cfg(test)]
mod tests {
    use rand_core::{RngCore, SeedableRng};

    use super::*;
    use crate::{generic::minimal_pcg::MinimalPCG32, structures::variables::Variables};

    fn cnf(names: &[&str], clauses: &[&[i32]]) -> CNF {
        let variables = Arc::new(Variables::new(names.iter().copied()));
        CNF::from_clauses(variables, clauses.iter().map(|c| c.to_vec())).unwrap()
    }

    fn slice(cnf: &CNF, dirty: &[&str]) -> CNF {
        CnfSlicer::new(dirty.iter().copied())
            .with_config(Config::unbounded())
            .slice(cnf, &mut Monitor::default())
            .unwrap()
    }

    fn satisfiable(cnf: &CNF, assumptions: &[CLiteral]) -> bool {
        let mut solver = SimpleSatSolver::with_config(cnf, Config::unbounded()).unwrap();
        solver.has_solution_with(assumptions).unwrap() == SatResult::Satisfiable
    }

    #[test]
    fn chain() {
        let cnf = cnf(&["a", "b", "c"], &[&[-1, 2], &[-2, 3]]);
        let sliced = slice(&cnf, &["b"]);
        assert_eq!(sliced.variables().size(), 2);
        assert_eq!(sliced.clauses(), &[LiteralSet::new([-1, 2])]);
    }

    #[test]
    fn nothing_dirty() {
        let cnf = cnf(&["a", "b"], &[&[1, 2], &[1, 2], &[-1, 1]]);
        let sliced = slice(&cnf, &[]);
        assert_eq!(sliced.clauses(), &[LiteralSet::new([1, 2])]);
    }

    #[test]
    fn redundant_clean_clauses() {
        let cnf = cnf(&["a", "b", "c"], &[&[1, 2, 3], &[1], &[-1, 2]]);
        let sliced = slice(&cnf, &[]);
        assert_eq!(sliced.clauses(), &[LiteralSet::new([1]), LiteralSet::new([-1, 2])]);
    }

    #[test]
    fn unsatisfiable() {
        let cnf = cnf(&["a", "b"], &[&[2], &[-2]]);
        let sliced = slice(&cnf, &["b"]);
        assert_eq!(sliced.variables().size(), 1);
        assert_eq!(sliced.clauses(), &[LiteralSet::default()]);
    }

    #[test]
    fn independent_dirty_clauses() {
        let independent = cnf(&["a", "b", "c"], &[&[1], &[2, 3], &[-2, -3]]);
        let sliced = slice(&independent, &["b", "c"]);
        assert_eq!(sliced.clauses(), &[LiteralSet::new([1])]);

        let dependent = cnf(&["a", "b", "c"], &[&[1], &[2, 3], &[-2, 3], &[-3]]);
        let sliced = slice(&dependent, &["b", "c"]);
        assert_eq!(sliced.clauses(), &[LiteralSet::default()]);
    }

    #[test]
    fn unknown_name() {
        let cnf = cnf(&["a"], &[&[1]]);
        let result = CnfSlicer::new(["z"]).slice(&cnf, &mut Monitor::default());
        assert_eq!(result, Err(ErrorKind::UnknownVariable("z".to_string())));
    }

    #[test]
    fn cancelled() {
        let cnf = cnf(&["a", "b", "c"], &[&[-1, 2], &[-2, 3]]);
        let mut monitor = Monitor::default();
        monitor.cancel();
        let result = CnfSlicer::new(["b"]).slice(&cnf, &mut monitor);
        assert_eq!(result, Err(ErrorKind::Cancelled));
    }

    #[test]
    fn orders_agree() {
        let cnf = cnf(
            &["a", "b", "c", "d", "e"],
            &[&[-1, 2], &[-2, 3, 4], &[-4, 5], &[-3, -5], &[1, 4]],
        );
        for order in [EliminationOrder::MinimumClauses, EliminationOrder::AsGiven] {
            let sliced = CnfSlicer::new(["b", "d"])
                .with_order(order)
                .with_config(Config::unbounded())
                .slice(&cnf, &mut Monitor::default())
                .unwrap();
            // a, c, e in the sliced mapping.
            for bits in 0..8_i32 {
                let projected: Vec<CLiteral> = (0..3)
                    .map(|i| if bits & (1 << i) != 0 { i + 1 } else { -(i + 1) })
                    .collect();
                let full: Vec<CLiteral> = [1, 3, 5]
                    .iter()
                    .zip(&projected)
                    .map(|(var, p)| if *p > 0 { *var } else { -var })
                    .collect();
                assert_eq!(satisfiable(&sliced, &projected), satisfiable(&cnf, &full));
            }
        }
    }

    #[test]
    fn random_projections() {
        let mut rng = MinimalPCG32::from_seed(7_u64.to_le_bytes());
        let names = ["a", "b", "c", "d", "e", "f"];

        for _ in 0..25 {
            let mut clauses: Vec<Vec<i32>> = Vec::new();
            for _ in 0..7 {
                let mut clause = Vec::new();
                for _ in 0..3 {
                    let var = (rng.next_u32() % 6) as i32 + 1;
                    clause.push(if rng.next_u32() % 2 == 0 { var } else { -var });
                }
                clauses.push(clause);
            }
            let clause_refs: Vec<&[i32]> = clauses.iter().map(|c| c.as_slice()).collect();
            let cnf = cnf(&names, &clause_refs);
            let sliced = slice(&cnf, &["b", "e"]);

            let kept = [1, 3, 4, 6];
            for bits in 0..16_i32 {
                let projected: Vec<CLiteral> = (0..4)
                    .map(|i| if bits & (1 << i) != 0 { i + 1 } else { -(i + 1) })
                    .collect();
                let full: Vec<CLiteral> = kept
                    .iter()
                    .zip(&projected)
                    .map(|(var, p)| if *p > 0 { *var } else { -var })
                    .collect();
                assert_eq!(satisfiable(&sliced, &projected), satisfiable(&cnf, &full));
            }
        }
    }
}
