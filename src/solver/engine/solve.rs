//! Determines the satisfiability of the clauses of an engine, under a list of assumptions.
//!
//! # Overview
//!
//! Each solve starts from an empty valuation, values every unit clause, and propagates.
//! Then, roughly:
//!
//! ```rust,ignore
//! loop {
//!     match self.propagate() {
//!         Some(conflict) if self.level() == 0 => return Unsatisfiable,
//!         Some(conflict) => {
//!             let asserting = self.analyze(conflict)?;
//!             self.backjump(asserting.level);
//!             self.learn(asserting);
//!         }
//!         None => match the next assumption {
//!             Some(false) => return Unsatisfiable,
//!             Some(assumption) => decide on the assumption,
//!             None => match self.make_decision() {
//!                 Some(decision) => decide on the decision,
//!                 None => return Satisfiable,
//!             },
//!         },
//!     }
//! }
//! ```
//!
//! Assumptions are decided on before any other literal, with assumption *i* decided at level *i + 1*.
//! If an assumption is already true an empty level is opened, to keep this correspondence.
//!
//! # Time
//!
//! On each iteration the deadline (from the [time limit](crate::config::Config::time_limit)) and the [terminate callback](super::callbacks) are checked.
//! If either is met the solve ends with [Timeout](SatResult::Timeout), which is never a claim of unsatisfiability.

use std::time::{Duration, Instant};

use crate::{
    generic::luby::Luby,
    misc::log::targets::{self},
    solver::SatResult,
    structures::literal::CLiteral,
    types::err::ErrorKind,
};

use super::{analysis::Asserting, literal_value, Engine};

impl Engine {
    /// Solves under `assumptions`, within `time_limit` (if given).
    pub fn solve(
        &mut self,
        assumptions: &[CLiteral],
        time_limit: Option<Duration>,
    ) -> Result<SatResult, ErrorKind> {
        for assumption in assumptions {
            self.check_literal(*assumption)?;
        }

        let start = Instant::now();
        self.counters.solves += 1;
        let result = self.solve_inner(assumptions, start, time_limit);
        self.counters.time += start.elapsed();

        match &result {
            Ok(SatResult::Timeout) => {
                self.counters.timeouts += 1;
                log::debug!(target: targets::SOLVER, "Timeout after {:?}", start.elapsed());
            }
            Ok(report) => {
                log::trace!(target: targets::SOLVER, "{report} under {} assumptions", assumptions.len())
            }
            Err(e) => log::warn!(target: targets::SOLVER, "Solve failed: {e}"),
        }
        result
    }

    fn solve_inner(
        &mut self,
        assumptions: &[CLiteral],
        start: Instant,
        time_limit: Option<Duration>,
    ) -> Result<SatResult, ErrorKind> {
        self.model.clear();
        self.clear_valuation();

        if self.has_empty_clause() {
            return Ok(SatResult::Unsatisfiable);
        }

        for index in 0..self.units.len() {
            let key = self.units[index];
            let Some(unit) = self.clauses.get(key).map(|clause| clause.literals[0]) else {
                continue;
            };
            match literal_value(&self.values, unit) {
                Some(true) => {}
                Some(false) => return Ok(SatResult::Unsatisfiable),
                None => self.assign(unit, Some(key)),
            }
        }

        let deadline = time_limit.and_then(|limit| start.checked_add(limit));

        let mut luby = Luby::default();
        let mut restart_limit = self.config.luby_u.value as usize * luby.current() as usize;
        let mut fresh_conflicts = 0;

        loop {
            self.counters.total_iterations += 1;

            if deadline.is_some_and(|deadline| Instant::now() >= deadline)
                || self.check_callback_terminate()
            {
                self.backjump(0);
                return Ok(SatResult::Timeout);
            }

            if let Some(conflict) = self.propagate() {
                self.counters.total_conflicts += 1;
                fresh_conflicts += 1;

                if self.level() == 0 {
                    return Ok(SatResult::Unsatisfiable);
                }

                let asserting = self.analyze(conflict)?;
                self.backjump(asserting.level);
                self.learn(asserting);
                self.decay_activity();
                continue;
            }

            if self.config.restart.value && fresh_conflicts >= restart_limit {
                self.counters.restarts += 1;
                fresh_conflicts = 0;
                if luby.next().is_none() {
                    luby = Luby::default();
                }
                restart_limit = self.config.luby_u.value as usize * luby.current() as usize;
                self.backjump(0);
                self.reduce_learnt();
                continue;
            }

            let mut decision = None;
            while self.level() < assumptions.len() {
                let assumption = assumptions[self.level()];
                match literal_value(&self.values, assumption) {
                    Some(true) => self.new_level(),
                    Some(false) => {
                        log::trace!(target: targets::SOLVER, "Assumption {assumption} is false");
                        self.backjump(0);
                        return Ok(SatResult::Unsatisfiable);
                    }
                    None => {
                        decision = Some(assumption);
                        break;
                    }
                }
            }

            let decision = match decision {
                Some(assumption) => assumption,
                None => match self.make_decision() {
                    Some(decision) => decision,
                    None => {
                        self.record_model();
                        return Ok(SatResult::Satisfiable);
                    }
                },
            };

            self.new_level();
            self.assign(decision, None);
        }
    }

    /// Stores the clause of `asserting` and values the asserted literal.
    fn learn(&mut self, asserting: Asserting) {
        let asserted = asserting.literals[0];
        let key = self.add_learnt(asserting.literals);
        self.assign(asserted, Some(key));
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::Config, solver::engine::Engine, solver::SatResult};

    fn engine(var_count: usize, clauses: &[&[i32]]) -> Engine {
        let mut engine = Engine::new(var_count, Config::unbounded());
        for clause in clauses {
            engine.add_clause(clause).unwrap();
        }
        engine
    }

    mod basic {
        use super::*;

        #[test]
        fn satisfiable_model() {
            let mut engine = engine(3, &[&[1, 2], &[-1, 3], &[-3, -2]]);
            assert_eq!(engine.solve(&[], None), Ok(SatResult::Satisfiable));

            let model = engine.model().to_vec();
            assert_eq!(model.len(), 3);
            for clause in [[1, 2], [-1, 3], [-3, -2]] {
                assert!(clause.iter().any(|literal| model.contains(literal)));
            }
        }

        #[test]
        fn conflict() {
            let mut engine = engine(2, &[&[1, 2], &[1, -2], &[-1, 2], &[-1, -2]]);
            assert_eq!(engine.solve(&[], None), Ok(SatResult::Unsatisfiable));
            assert!(engine.model().is_empty());
        }

        #[test]
        fn no_clauses() {
            let mut engine = engine(4, &[]);
            assert_eq!(engine.solve(&[], None), Ok(SatResult::Satisfiable));
            assert_eq!(engine.model(), &[-1, -2, -3, -4]);
        }

        #[test]
        fn pigeons() {
            // Four pigeons, three holes.
            let var = |pigeon: i32, hole: i32| pigeon * 3 + hole + 1;
            let mut clauses: Vec<Vec<i32>> = Vec::new();
            for pigeon in 0..4 {
                clauses.push((0..3).map(|hole| var(pigeon, hole)).collect());
            }
            for hole in 0..3 {
                for a in 0..4 {
                    for b in (a + 1)..4 {
                        clauses.push(vec![-var(a, hole), -var(b, hole)]);
                    }
                }
            }
            let mut engine = Engine::new(12, Config::unbounded());
            for clause in &clauses {
                engine.add_clause(clause).unwrap();
            }
            assert_eq!(engine.solve(&[], None), Ok(SatResult::Unsatisfiable));
        }
    }

    mod assumptions {
        use super::*;

        #[test]
        fn respected() {
            let mut engine = engine(3, &[&[1, 2, 3]]);
            assert_eq!(engine.solve(&[-1, -2], None), Ok(SatResult::Satisfiable));
            assert!(engine.model().contains(&3));
            assert_eq!(engine.solve(&[-1, -2, -3], None), Ok(SatResult::Unsatisfiable));
            // Assumptions do not persist.
            assert_eq!(engine.solve(&[], None), Ok(SatResult::Satisfiable));
        }

        #[test]
        fn implied_assumption() {
            let mut engine = engine(3, &[&[1], &[-1, 2]]);
            assert_eq!(engine.solve(&[2, 1, -3], None), Ok(SatResult::Satisfiable));
            assert_eq!(engine.solve(&[-2], None), Ok(SatResult::Unsatisfiable));
        }

        #[test]
        fn malformed() {
            let mut engine = engine(2, &[]);
            assert!(engine.solve(&[3], None).is_err());
        }
    }

    mod removal {
        use super::*;

        #[test]
        fn remove_restores() {
            let mut engine = engine(2, &[&[1, 2], &[1, -2], &[-1, 2]]);
            let key = engine.add_clause(&[-1, -2]).unwrap();
            assert_eq!(engine.solve(&[], None), Ok(SatResult::Unsatisfiable));

            engine.remove_clause(key).unwrap();
            assert_eq!(engine.learnt_count(), 0);
            assert_eq!(engine.solve(&[], None), Ok(SatResult::Satisfiable));
            assert_eq!(engine.model(), &[1, 2]);
        }
    }

    mod time {
        use super::*;

        #[test]
        fn terminate() {
            let mut engine = engine(3, &[&[1, 2, 3]]);
            engine.set_callback_terminate(Box::new(|| true));
            assert_eq!(engine.solve(&[], None), Ok(SatResult::Timeout));
            engine.clear_callback_terminate();
            assert_eq!(engine.solve(&[], None), Ok(SatResult::Satisfiable));
        }

        #[test]
        fn zero_limit() {
            let mut engine = engine(3, &[&[1, 2, 3]]);
            let result = engine.solve(&[], Some(std::time::Duration::ZERO));
            assert_eq!(result, Ok(SatResult::Timeout));
        }
    }
}
