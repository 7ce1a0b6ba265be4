/*!
Recovery from a conflict.

A backjump undoes every value of every level above the target level.
Undone variables are placed back on the activity heap, and have their last value saved as their phase.

A solve always starts from an empty valuation, via [clear_valuation](Engine::clear_valuation).
*/

use crate::structures::literal::Literal;

use super::{Engine, LevelIndex};

impl Engine {
    /// Undoes each level above `target`.
    ///
    /// Passing a target at or above the current level is safe, as nothing happens.
    pub(super) fn backjump(&mut self, target: LevelIndex) {
        if self.level() <= target {
            return;
        }
        let limit = self.trail_limits[target];
        self.unassign_to(limit);
        self.trail_limits.truncate(target);
    }

    /// Undoes every value, including facts at level zero.
    pub fn clear_valuation(&mut self) {
        self.unassign_to(0);
        self.trail_limits.clear();
    }

    fn unassign_to(&mut self, limit: usize) {
        while self.trail.len() > limit {
            let Some(literal) = self.trail.pop() else {
                break;
            };
            let var = literal.var() as usize;
            self.values[var] = None;
            self.reasons[var] = None;
            self.phase[var] = literal.polarity();
            self.activity.activate(var);
        }
        self.q_head = self.q_head.min(self.trail.len());
        self.heuristic.reset_cursor();
    }
}
