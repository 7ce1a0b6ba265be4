//! A solver over a fixed CNF, with clause addition and removal.

use std::time::Duration;

use crate::{
    config::Config,
    misc::log::targets::{self},
    solver::{
        engine::{CallbackTerminate, Counters, Engine},
        ClauseKey, SatResult,
    },
    structures::{literal::CLiteral, literal_set::LiteralSet, CNF},
    types::err::{self, ErrorKind},
};

pub struct SimpleSatSolver {
    cnf: CNF,
    engine: Engine,

    /// Keys of added clauses, in order of addition.
    keys: Vec<ClauseKey>,

    time_limit: Option<Duration>,
}

impl SimpleSatSolver {
    /// A solver over the clauses of `cnf`, with the default configuration.
    pub fn new(cnf: &CNF) -> Result<Self, ErrorKind> {
        Self::with_config(cnf, Config::default())
    }

    /// A solver over the clauses of `cnf`.
    ///
    /// Fails with [Contradiction](ErrorKind::Contradiction) if some clause is empty, or two unit clauses conflict.
    pub fn with_config(cnf: &CNF, config: Config) -> Result<Self, ErrorKind> {
        let time_limit = config.time_limit.value;
        let mut solver = SimpleSatSolver {
            cnf: cnf.clone(),
            engine: Engine::new(cnf.variables().size(), config),
            keys: Vec::with_capacity(cnf.clauses().len()),
            time_limit,
        };

        for clause in cnf.clauses() {
            let key = solver.engine.add_clause(clause.literals())?;
            solver.keys.push(key);
        }
        log::trace!(target: targets::SOLVER, "Solver over {} clauses", solver.keys.len());
        Ok(solver)
    }

    pub fn cnf(&self) -> &CNF {
        &self.cnf
    }

    pub fn config(&self) -> &Config {
        &self.engine.config
    }

    pub fn counters(&self) -> &Counters {
        &self.engine.counters
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Adds `clause`, returning a key for removal of the clause.
    pub fn add_clause(&mut self, clause: &LiteralSet) -> Result<ClauseKey, ErrorKind> {
        let key = self.engine.add_clause(clause.literals())?;
        self.keys.push(key);
        Ok(key)
    }

    /// Adds each of `clauses`, stopping at the first failure.
    pub fn add_clauses<'a, I>(&mut self, clauses: I) -> Result<Vec<ClauseKey>, ErrorKind>
    where
        I: IntoIterator<Item = &'a LiteralSet>,
    {
        let mut keys = Vec::new();
        for clause in clauses {
            keys.push(self.add_clause(clause)?);
        }
        Ok(keys)
    }

    pub fn remove_clause(&mut self, key: ClauseKey) -> Result<(), ErrorKind> {
        self.engine.remove_clause(key)?;
        self.keys.retain(|k| *k != key);
        Ok(())
    }

    /// Removes the most recently added clause.
    pub fn remove_last_clause(&mut self) -> Result<(), ErrorKind> {
        match self.keys.pop() {
            Some(key) => self.engine.remove_clause(key),
            None => Err(err::SolverError::MissingClause.into()),
        }
    }

    /// Removes the `count` most recently added clauses.
    pub fn remove_last_clauses(&mut self, count: usize) -> Result<(), ErrorKind> {
        for _ in 0..count {
            self.remove_last_clause()?;
        }
        Ok(())
    }

    /// A count of clauses currently added, including those of the CNF.
    pub fn clause_count(&self) -> usize {
        self.keys.len()
    }

    pub fn has_solution(&mut self) -> Result<SatResult, ErrorKind> {
        self.engine.solve(&[], self.time_limit)
    }

    /// Solves under `assumptions`, without retaining the assumptions.
    pub fn has_solution_with(&mut self, assumptions: &[CLiteral]) -> Result<SatResult, ErrorKind> {
        self.engine.solve(assumptions, self.time_limit)
    }

    /// The model of the most recent satisfiable solve, indexed by variable - 1.
    ///
    /// Empty if the most recent solve was not satisfiable.
    pub fn solution(&self) -> &[CLiteral] {
        self.engine.model()
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    pub fn set_time_limit(&mut self, time_limit: Option<Duration>) {
        self.time_limit = time_limit;
    }

    pub fn set_callback_terminate(&mut self, callback: Box<CallbackTerminate>) {
        self.engine.set_callback_terminate(callback);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::structures::variables::Variables;

    fn cnf(clauses: &[&[i32]], var_count: usize) -> CNF {
        let variables = Arc::new(Variables::new((1..=var_count).map(|v| format!("v{v}"))));
        CNF::from_clauses(variables, clauses.iter().map(|c| c.to_vec())).unwrap()
    }

    #[test]
    fn contradiction_on_empty() {
        let cnf = cnf(&[&[1], &[]], 1);
        assert!(matches!(
            SimpleSatSolver::new(&cnf),
            Err(ErrorKind::Contradiction)
        ));
    }

    #[test]
    fn unsat_without_contradiction() {
        let cnf = cnf(&[&[1, 2], &[-1, 2], &[-2]], 2);
        let mut solver = SimpleSatSolver::new(&cnf).unwrap();
        assert_eq!(solver.has_solution(), Ok(SatResult::Unsatisfiable));
    }

    #[test]
    fn add_and_remove_last() {
        let cnf = cnf(&[&[1, 2]], 2);
        let mut solver = SimpleSatSolver::with_config(&cnf, Config::unbounded()).unwrap();

        solver.add_clause(&LiteralSet::new([-1])).unwrap();
        solver.add_clause(&LiteralSet::new([-2])).unwrap();
        assert_eq!(solver.has_solution(), Ok(SatResult::Unsatisfiable));

        solver.remove_last_clause().unwrap();
        assert_eq!(solver.has_solution(), Ok(SatResult::Satisfiable));
        assert_eq!(solver.solution(), &[-1, 2]);

        solver.remove_last_clauses(2).unwrap();
        assert_eq!(solver.clause_count(), 0);
        assert!(solver.remove_last_clause().is_err());
    }

    #[test]
    fn scoped_assumptions() {
        let cnf = cnf(&[&[1, 2]], 2);
        let mut solver = SimpleSatSolver::new(&cnf).unwrap();
        assert_eq!(solver.has_solution_with(&[-1, -2]), Ok(SatResult::Unsatisfiable));
        assert_eq!(solver.has_solution(), Ok(SatResult::Satisfiable));
    }
}
