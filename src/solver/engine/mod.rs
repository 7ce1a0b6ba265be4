/*!
The incremental CDCL engine behind the [solvers](crate::solver).

The engine is a conflict-driven clause-learning solver with two watched literals, first-UIP learning, VSIDS activity, phase saving, and Luby restarts.

Procedures are split across modules, each an `impl Engine` block:
- [clause_db] --- storage of clauses, addition, and removal.
- [bcp] --- boolean constraint propagation.
- [analysis] --- conflict analysis.
- [backjump] --- recovery from a conflict.
- [decision] --- choosing a literal, according to a [selection strategy](crate::config::SelectionStrategy).
- [solve] --- the solve loop, under a list of assumptions.

Each solve starts from an empty valuation, so clauses may be freely added and removed between solves.
Learnt clauses persist between solves, until some original clause is removed.
*/

pub mod analysis;
pub mod backjump;
pub mod bcp;
pub mod callbacks;
pub mod clause_db;
pub mod counters;
pub mod decision;
pub mod solve;

use rand::SeedableRng;
use slotmap::SlotMap;

use crate::{
    config::{Activity, Config},
    generic::{index_heap::IndexHeap, minimal_pcg::MinimalPCG32},
    structures::literal::{CLiteral, Literal, Var},
    types::err::ErrorKind,
};

pub use callbacks::CallbackTerminate;
pub use clause_db::{ClauseKey, StoredClause};
pub use counters::Counters;
pub use decision::Heuristic;

/// A decision level, with zero the level of facts.
pub type LevelIndex = usize;

/// The engine.
pub struct Engine {
    /// The count of variables, each of `1..=var_count`.
    var_count: usize,

    /// Every clause, original and learnt.
    clauses: SlotMap<ClauseKey, StoredClause>,

    /// Keys to unit clauses, as these are not watched.
    units: Vec<ClauseKey>,

    /// Keys to learnt clauses, in order of learning.
    learnt: Vec<ClauseKey>,

    /// A count of stored empty clauses.
    empty_clauses: usize,

    /// The limit on learnt clauses before a reduction, revised after each reduction.
    learnt_limit: usize,

    /// Clauses watching a literal, indexed by [Literal::index].
    watches: Vec<Vec<ClauseKey>>,

    /// The current (partial) valuation, indexed by variable.
    values: Vec<Option<bool>>,

    /// The decision level of each valued variable.
    levels: Vec<LevelIndex>,

    /// The clause which forced the value of a variable, if any.
    reasons: Vec<Option<ClauseKey>>,

    /// Valued literals, in order.
    trail: Vec<CLiteral>,

    /// The length of the trail at the start of each decision level.
    trail_limits: Vec<usize>,

    /// The next literal of the trail to propagate.
    q_head: usize,

    /// Activity of each variable, with unvalued variables active on the heap.
    activity: IndexHeap<Activity>,

    /// The current bump to activity.
    bump: Activity,

    /// The last value of each variable.
    phase: Vec<bool>,

    /// Scratch space for conflict analysis.
    seen: Vec<bool>,

    /// How to choose a literal to decide on.
    heuristic: Heuristic,

    /// The most recent model, if the most recent solve was satisfiable.
    model: Vec<CLiteral>,

    rng: MinimalPCG32,

    pub config: Config,

    pub counters: Counters,

    callback_terminate: Option<Box<CallbackTerminate>>,
}

impl Engine {
    /// An engine over variables `1..=var_count`, without any clauses.
    pub fn new(var_count: usize, config: Config) -> Self {
        let mut activity = IndexHeap::default();
        for var in 1..=var_count {
            activity.add(var, 0.0);
            activity.activate(var);
        }

        Engine {
            var_count,
            clauses: SlotMap::with_key(),
            units: Vec::default(),
            learnt: Vec::default(),
            empty_clauses: 0,
            learnt_limit: 1000,
            watches: vec![Vec::default(); 2 * (var_count + 1)],
            values: vec![None; var_count + 1],
            levels: vec![0; var_count + 1],
            reasons: vec![None; var_count + 1],
            trail: Vec::with_capacity(var_count),
            trail_limits: Vec::default(),
            q_head: 0,
            activity,
            bump: 1.0,
            phase: vec![false; var_count + 1],
            seen: vec![false; var_count + 1],
            heuristic: Heuristic::new(config.selection.value, var_count),
            model: Vec::default(),
            rng: MinimalPCG32::seed_from_u64(config.random_seed.value),
            config,
            counters: Counters::default(),
            callback_terminate: None,
        }
    }

    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// The current decision level.
    pub fn level(&self) -> LevelIndex {
        self.trail_limits.len()
    }

    /// The value of `literal` on the current valuation, if any.
    pub fn value_of(&self, literal: CLiteral) -> Option<bool> {
        literal_value(&self.values, literal)
    }

    /// The model of the most recent satisfiable solve, indexed by variable - 1.
    pub fn model(&self) -> &[CLiteral] {
        &self.model
    }

    /// Checks `literal` is non-zero and within the variables of the engine.
    pub fn check_literal(&self, literal: CLiteral) -> Result<(), ErrorKind> {
        match literal != 0 && (literal.var() as usize) <= self.var_count {
            true => Ok(()),
            false => Err(ErrorKind::MalformedClause(literal)),
        }
    }

    pub fn heuristic(&self) -> &Heuristic {
        &self.heuristic
    }

    pub fn heuristic_mut(&mut self) -> &mut Heuristic {
        &mut self.heuristic
    }

    /// Values `literal` at the current level, with an optional reason.
    fn assign(&mut self, literal: CLiteral, reason: Option<ClauseKey>) {
        let var = literal.var() as usize;
        self.values[var] = Some(literal.polarity());
        self.levels[var] = self.level();
        self.reasons[var] = reason;
        self.trail.push(literal);
    }

    /// Opens a fresh decision level.
    fn new_level(&mut self) {
        self.trail_limits.push(self.trail.len());
    }

    /// Stores the current (complete) valuation as the model.
    fn record_model(&mut self) {
        self.model.clear();
        for var in 1..=self.var_count {
            let polarity = self.values[var].unwrap_or(false);
            self.model.push(CLiteral::new(var as Var, polarity));
        }
    }
}

/// The value of `literal` on `values`, if any.
#[inline]
fn literal_value(values: &[Option<bool>], literal: CLiteral) -> Option<bool> {
    values[literal.var() as usize].map(|value| value == literal.polarity())
}
