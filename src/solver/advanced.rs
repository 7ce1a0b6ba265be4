/*!
A solver with an assumption stack, selection strategies, and a record of recent solutions.

# The assumption stack

Literals pushed to the stack are assumed by every solve until popped.
The stack is strictly last-in first-out:
- [assignment_pop](AdvancedSatSolver::assignment_pop) removes exactly the most recently pushed literal.
- [assignment_replace_last](AdvancedSatSolver::assignment_replace_last) substitutes the top literal, without disturbing the rest of the stack.

Stack operations may be freely interleaved with solves, and learnt clauses persist throughout.

```rust
# use std::sync::Arc;
# use fm_sat::{solver::{AdvancedSatSolver, SatResult}, structures::{CNF, variables::Variables}};
let variables = Arc::new(Variables::new(["A", "B"]));
let cnf = CNF::from_clauses(variables, [vec![-1, 2]]).unwrap();
let mut solver = AdvancedSatSolver::new(&cnf).unwrap();

solver.assignment_push(1).unwrap();
solver.assignment_push(-2).unwrap();
assert_eq!(solver.has_solution(), Ok(SatResult::Unsatisfiable));

solver.assignment_replace_last(2).unwrap();
assert_eq!(solver.has_solution(), Ok(SatResult::Satisfiable));
assert_eq!(solver.assignments(), &[1, 2]);
```

# Selection strategies

Switching strategy reconfigures the decisions of the engine, and so changes which model is found.
See [SelectionStrategy] for details.
*/

use std::time::Duration;

use crate::{
    config::{Config, SelectionStrategy},
    generic::ring_buffer::RingBuffer,
    misc::log::targets::{self},
    solver::{
        engine::{CallbackTerminate, Counters},
        ClauseKey, SatResult, SimpleSatSolver,
    },
    structures::{
        literal::{CLiteral, Var},
        literal_set::LiteralSet,
        CNF,
    },
    types::err::{self, ErrorKind},
};

pub struct AdvancedSatSolver {
    solver: SimpleSatSolver,

    /// The assumption stack.
    assumptions: Vec<CLiteral>,

    /// Recent models, most recent first.
    solutions: RingBuffer<Vec<CLiteral>>,
}

impl AdvancedSatSolver {
    /// A solver over the clauses of `cnf`, with the default configuration.
    pub fn new(cnf: &CNF) -> Result<Self, ErrorKind> {
        Self::with_config(cnf, Config::default())
    }

    pub fn with_config(cnf: &CNF, config: Config) -> Result<Self, ErrorKind> {
        let buffer = config.solution_buffer.value;
        Ok(AdvancedSatSolver {
            solver: SimpleSatSolver::with_config(cnf, config)?,
            assumptions: Vec::default(),
            solutions: RingBuffer::new(buffer),
        })
    }

    pub fn cnf(&self) -> &CNF {
        self.solver.cnf()
    }

    pub fn config(&self) -> &Config {
        self.solver.config()
    }

    pub fn counters(&self) -> &Counters {
        self.solver.counters()
    }

    /// The count of variables of the solver.
    pub fn var_count(&self) -> usize {
        self.solver.engine().var_count()
    }

    /// Checks `literal` is non-zero and refers to a variable of the solver.
    pub fn check_literal(&self, literal: CLiteral) -> Result<(), ErrorKind> {
        self.solver.engine().check_literal(literal)
    }

    // Clauses
    //
    // Recorded solutions are dropped on addition, as they may falsify the new clause.
    // Removal keeps them, as a model remains a model of fewer clauses.

    pub fn add_clause(&mut self, clause: &LiteralSet) -> Result<ClauseKey, ErrorKind> {
        self.solutions.clear();
        self.solver.add_clause(clause)
    }

    pub fn add_clauses<'a, I>(&mut self, clauses: I) -> Result<Vec<ClauseKey>, ErrorKind>
    where
        I: IntoIterator<Item = &'a LiteralSet>,
    {
        self.solutions.clear();
        self.solver.add_clauses(clauses)
    }

    pub fn remove_clause(&mut self, key: ClauseKey) -> Result<(), ErrorKind> {
        self.solver.remove_clause(key)
    }

    pub fn remove_last_clause(&mut self) -> Result<(), ErrorKind> {
        self.solver.remove_last_clause()
    }

    pub fn remove_last_clauses(&mut self, count: usize) -> Result<(), ErrorKind> {
        self.solver.remove_last_clauses(count)
    }

    /// A count of clauses currently added, including those of the CNF.
    pub fn clause_count(&self) -> usize {
        self.solver.clause_count()
    }

    // Assumptions

    pub fn assignments(&self) -> &[CLiteral] {
        &self.assumptions
    }

    pub fn assignment_len(&self) -> usize {
        self.assumptions.len()
    }

    /// The assumption stack, as a literal set.
    pub fn assignment_set(&self) -> LiteralSet {
        LiteralSet::new(self.assumptions.iter().copied())
    }

    pub fn assignment_push(&mut self, literal: CLiteral) -> Result<(), ErrorKind> {
        self.solver.engine().check_literal(literal)?;
        log::trace!(target: targets::ASSUMPTION, "Push {literal}");
        self.assumptions.push(literal);
        Ok(())
    }

    pub fn assignment_push_all(&mut self, literals: &[CLiteral]) -> Result<(), ErrorKind> {
        for literal in literals {
            self.solver.engine().check_literal(*literal)?;
        }
        self.assumptions.extend_from_slice(literals);
        Ok(())
    }

    /// Pops the most recently pushed literal.
    pub fn assignment_pop(&mut self) -> Result<CLiteral, ErrorKind> {
        match self.assumptions.pop() {
            Some(literal) => {
                log::trace!(target: targets::ASSUMPTION, "Pop {literal}");
                Ok(literal)
            }
            None => Err(err::SolverError::EmptyAssumptions.into()),
        }
    }

    /// Replaces the most recently pushed literal with `literal`.
    pub fn assignment_replace_last(&mut self, literal: CLiteral) -> Result<(), ErrorKind> {
        self.solver.engine().check_literal(literal)?;
        match self.assumptions.last_mut() {
            Some(last) => {
                log::trace!(target: targets::ASSUMPTION, "Replace {last} with {literal}");
                *last = literal;
                Ok(())
            }
            None => Err(err::SolverError::EmptyAssumptions.into()),
        }
    }

    /// Pops literals until at most `length` remain.
    pub fn assignment_clear(&mut self, length: usize) {
        self.assumptions.truncate(length);
    }

    // Solves

    /// Solves under the assumption stack.
    pub fn has_solution(&mut self) -> Result<SatResult, ErrorKind> {
        let result = self.solver.has_solution_with(&self.assumptions)?;
        if result.is_sat() {
            self.solutions.push(self.solver.solution().to_vec());
        }
        Ok(result)
    }

    /// Solves under the assumption stack extended with `literals`, without revising the stack.
    pub fn has_solution_with(&mut self, literals: &[CLiteral]) -> Result<SatResult, ErrorKind> {
        let mut assumptions = self.assumptions.clone();
        assumptions.extend_from_slice(literals);
        let result = self.solver.has_solution_with(&assumptions)?;
        if result.is_sat() {
            self.solutions.push(self.solver.solution().to_vec());
        }
        Ok(result)
    }

    /// A model under the assumption stack, if one is found.
    ///
    /// None on both [Unsatisfiable](SatResult::Unsatisfiable) and [Timeout](SatResult::Timeout).
    pub fn find_solution(&mut self) -> Result<Option<Vec<CLiteral>>, ErrorKind> {
        match self.has_solution()? {
            SatResult::Satisfiable => Ok(Some(self.solver.solution().to_vec())),
            _ => Ok(None),
        }
    }

    /// The model of the most recent satisfiable solve, indexed by variable - 1.
    pub fn solution(&self) -> &[CLiteral] {
        self.solver.solution()
    }

    /// Recent models, most recent first.
    pub fn solutions(&self) -> impl Iterator<Item = &Vec<CLiteral>> {
        self.solutions.iter()
    }

    pub fn clear_solutions(&mut self) {
        self.solutions.clear()
    }

    /// A recorded model which agrees with the assumption stack and satisfies `condition`.
    ///
    /// Any such model is a model of the current clauses, so may stand in for a satisfiable solve.
    pub fn known_solution(&self, condition: impl Fn(&[CLiteral]) -> bool) -> Option<&[CLiteral]> {
        self.solutions
            .iter()
            .find(|model| {
                self.assumptions
                    .iter()
                    .all(|literal| model_satisfies(model, *literal))
                    && condition(model)
            })
            .map(|model| model.as_slice())
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.solver.time_limit()
    }

    pub fn set_time_limit(&mut self, time_limit: Option<Duration>) {
        self.solver.set_time_limit(time_limit);
    }

    pub fn set_callback_terminate(&mut self, callback: Box<CallbackTerminate>) {
        self.solver.set_callback_terminate(callback);
    }

    // Strategy

    pub fn selection_strategy(&self) -> SelectionStrategy {
        self.solver.engine().heuristic().strategy()
    }

    pub fn set_selection_strategy(&mut self, strategy: SelectionStrategy) {
        log::trace!(target: targets::SOLVER, "Selection strategy {strategy}");
        self.solver
            .engine_mut()
            .heuristic_mut()
            .set_strategy(strategy);
    }

    /// Switches to the [Fixed](SelectionStrategy::Fixed) strategy, preferring the literals of `preferred` (indexed by variable - 1).
    pub fn set_fixed_strategy(&mut self, preferred: &[CLiteral]) {
        let heuristic = self.solver.engine_mut().heuristic_mut();
        heuristic.set_preferred(preferred);
        heuristic.set_strategy(SelectionStrategy::Fixed);
    }

    pub fn order(&self) -> &[Var] {
        self.solver.engine().heuristic().order()
    }

    /// Sets the order in which ordered strategies choose variables.
    pub fn set_order(&mut self, order: &[Var]) -> Result<(), ErrorKind> {
        for var in order {
            self.solver.engine().check_literal(*var as CLiteral)?;
        }
        self.solver.engine_mut().heuristic_mut().set_order(order);
        Ok(())
    }

    /// Restores the order to `1..=n`.
    pub fn set_order_fix(&mut self) {
        self.solver.engine_mut().heuristic_mut().fix_order();
    }

    /// Shuffles the order, with the seeded source of randomness of the solver.
    pub fn set_order_shuffle(&mut self) {
        self.solver.engine_mut().shuffle_order();
    }
}

/// True if `model` (indexed by variable - 1) assigns `literal` true.
pub fn model_satisfies(model: &[CLiteral], literal: CLiteral) -> bool {
    match (literal.unsigned_abs() as usize).checked_sub(1) {
        Some(index) => model.get(index) == Some(&literal),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::structures::variables::Variables;

    fn solver(clauses: &[&[i32]], var_count: usize) -> AdvancedSatSolver {
        let variables = Arc::new(Variables::new((1..=var_count).map(|v| format!("v{v}"))));
        let cnf = CNF::from_clauses(variables, clauses.iter().map(|c| c.to_vec())).unwrap();
        AdvancedSatSolver::with_config(&cnf, Config::unbounded()).unwrap()
    }

    mod stack {
        use super::*;

        #[test]
        fn lifo() {
            let mut solver = solver(&[], 4);
            solver.assignment_push(1).unwrap();
            solver.assignment_push(-2).unwrap();
            solver.assignment_push(3).unwrap();

            assert_eq!(solver.assignment_pop(), Ok(3));
            solver.assignment_replace_last(2).unwrap();
            assert_eq!(solver.assignments(), &[1, 2]);

            solver.assignment_clear(0);
            assert_eq!(
                solver.assignment_pop(),
                Err(ErrorKind::Solver(err::SolverError::EmptyAssumptions))
            );
        }

        #[test]
        fn malformed_push() {
            let mut solver = solver(&[], 2);
            assert_eq!(solver.assignment_push(3), Err(ErrorKind::MalformedClause(3)));
            assert_eq!(solver.assignment_push(0), Err(ErrorKind::MalformedClause(0)));
            assert!(solver.assignments().is_empty());
        }

        #[test]
        fn scoped_check() {
            let mut solver = solver(&[&[1, 2]], 2);
            solver.assignment_push(-1).unwrap();
            assert_eq!(solver.has_solution_with(&[-2]), Ok(SatResult::Unsatisfiable));
            assert_eq!(solver.assignments(), &[-1]);
            assert_eq!(solver.has_solution(), Ok(SatResult::Satisfiable));
        }
    }

    mod strategy {
        use super::*;

        #[test]
        fn positive_and_negative_models() {
            let mut solver = solver(&[&[-1, 2], &[-3, -4]], 4);

            solver.set_selection_strategy(SelectionStrategy::Positive);
            let positive = solver.find_solution().unwrap().unwrap();
            assert!(positive.contains(&1) && positive.contains(&2));

            solver.set_selection_strategy(SelectionStrategy::Negative);
            let negative = solver.find_solution().unwrap().unwrap();
            assert_eq!(negative, vec![-1, -2, -3, -4]);
        }

        #[test]
        fn fixed_preference() {
            let mut solver = solver(&[], 3);
            solver.set_fixed_strategy(&[1, -2, 3]);
            assert_eq!(solver.find_solution().unwrap(), Some(vec![1, -2, 3]));
        }

        #[test]
        fn order() {
            let mut solver = solver(&[&[1, 2]], 2);
            solver.set_selection_strategy(SelectionStrategy::Negative);
            solver.set_order(&[2, 1]).unwrap();
            // Deciding ¬2 first forces 1.
            assert_eq!(solver.find_solution().unwrap(), Some(vec![1, -2]));

            solver.set_order_fix();
            assert_eq!(solver.order(), &[1, 2]);
            assert_eq!(solver.find_solution().unwrap(), Some(vec![-1, 2]));

            assert!(solver.set_order(&[3]).is_err());
        }

        #[test]
        fn shuffle_keeps_variables() {
            let mut solver = solver(&[], 20);
            solver.set_order_shuffle();
            let mut order = solver.order().to_vec();
            order.sort();
            assert_eq!(order, (1..=20).collect::<Vec<Var>>());
        }
    }

    #[test]
    fn solutions_recorded() {
        let mut solver = solver(&[&[1, 2]], 2);
        solver.has_solution().unwrap();
        solver.has_solution_with(&[-1]).unwrap();
        assert_eq!(solver.solutions().count(), 2);
        assert_eq!(solver.solutions().next(), Some(&vec![-1, 2]));

        solver.assignment_push(-1).unwrap();
        assert_eq!(
            solver.known_solution(|model| model_satisfies(model, 2)),
            Some([-1, 2].as_slice())
        );
        solver.assignment_replace_last(1).unwrap();
        assert!(solver.known_solution(|model| model_satisfies(model, -2)).is_none());

        solver.add_clause(&LiteralSet::new([-2])).unwrap();
        assert_eq!(solver.solutions().count(), 0);
    }
}
