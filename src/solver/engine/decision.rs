/*!
Choosing a literal to decide on, according to a [selection strategy](crate::config::SelectionStrategy).

- With the [Original](SelectionStrategy::Original) strategy the unvalued variable of highest activity is chosen, with phase saving (if configured) and a negative phase otherwise.
- With any other strategy the first unvalued variable of the [order](Heuristic::order) is chosen, and the phase is given by the strategy.
  If every variable of the order is valued (e.g. the order covers only some variables) the most active unvalued variable is chosen instead.

As values are only undone by a backjump, a cursor into the order is kept between decisions and reset on each backjump.
*/

use rand::{seq::SliceRandom, Rng};

use crate::{
    config::SelectionStrategy,
    generic::minimal_pcg::MinimalPCG32,
    structures::literal::{CLiteral, Literal, Var},
};

use super::Engine;

/// The state of the selection strategy of an engine.
#[derive(Clone, Debug)]
pub struct Heuristic {
    strategy: SelectionStrategy,

    /// The order in which variables are chosen by an ordered strategy.
    order: Vec<Var>,

    /// The literal to prefer for each variable with the [Fixed](SelectionStrategy::Fixed) strategy, indexed by variable - 1.
    ///
    /// A zero entry prefers the negative literal.
    preferred: Vec<CLiteral>,

    cursor: usize,
}

impl Heuristic {
    pub fn new(strategy: SelectionStrategy, var_count: usize) -> Self {
        Heuristic {
            strategy,
            order: (1..=var_count as Var).collect(),
            preferred: vec![0; var_count],
            cursor: 0,
        }
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: SelectionStrategy) {
        self.strategy = strategy;
        self.cursor = 0;
    }

    /// Sets the literal to prefer for each variable, for use with the [Fixed](SelectionStrategy::Fixed) strategy.
    pub fn set_preferred(&mut self, preferred: &[CLiteral]) {
        for (index, entry) in self.preferred.iter_mut().enumerate() {
            *entry = preferred.get(index).copied().unwrap_or(0);
        }
    }

    pub fn order(&self) -> &[Var] {
        &self.order
    }

    /// Sets the order of variables.
    pub fn set_order(&mut self, order: &[Var]) {
        self.order = order.to_vec();
        self.cursor = 0;
    }

    /// Restores the order of variables to `1..=n`.
    pub fn fix_order(&mut self) {
        let count = self.preferred.len() as Var;
        self.order = (1..=count).collect();
        self.cursor = 0;
    }

    /// Shuffles the order of variables.
    pub fn shuffle_order(&mut self, rng: &mut MinimalPCG32) {
        self.order.shuffle(rng);
        self.cursor = 0;
    }

    pub(super) fn reset_cursor(&mut self) {
        self.cursor = 0;
    }
}

impl Engine {
    /// Chooses an unvalued literal to decide on, or None if the valuation is complete.
    pub(super) fn make_decision(&mut self) -> Option<CLiteral> {
        let var = match self.heuristic.strategy {
            SelectionStrategy::Original => self.most_active_unvalued(),
            _ => self.next_in_order().or_else(|| self.most_active_unvalued()),
        }?;

        let polarity = match self.heuristic.strategy {
            SelectionStrategy::Original => match self.config.phase_saving.value {
                true => self.phase[var as usize],
                false => false,
            },
            SelectionStrategy::Positive => true,
            SelectionStrategy::Negative => false,
            SelectionStrategy::Random => self.rng.random_bool(0.5),
            SelectionStrategy::Fixed => self.heuristic.preferred[var as usize - 1] > 0,
        };

        self.counters.total_decisions += 1;
        Some(CLiteral::new(var, polarity))
    }

    fn most_active_unvalued(&mut self) -> Option<Var> {
        while let Some(var) = self.activity.pop_max() {
            if self.values[var].is_none() {
                return Some(var as Var);
            }
        }
        None
    }

    fn next_in_order(&mut self) -> Option<Var> {
        while self.heuristic.cursor < self.heuristic.order.len() {
            let var = self.heuristic.order[self.heuristic.cursor];
            if self.values[var as usize].is_none() {
                return Some(var);
            }
            self.heuristic.cursor += 1;
        }
        None
    }

    /// Shuffles the order of variables, with the source of randomness of the engine.
    pub fn shuffle_order(&mut self) {
        self.heuristic.shuffle_order(&mut self.rng);
    }
}
