/*!
Boolean constraint propagation.

For each literal on the trail which has not been propagated, every clause watching the negation of the literal is visited:
- If the other watched literal is true, the clause is satisfied and the watch is kept.
- Otherwise, a replacement watch is searched for among the unwatched literals of the clause.
- If no replacement is found, the other watched literal is either assigned (with the clause as the reason) or, if false, the clause is a conflict.

Watches on removed clauses are dropped as they are found.
*/

use crate::structures::literal::{CLiteral, Literal};

use super::{literal_value, ClauseKey, Engine};

impl Engine {
    /// Propagates every queued literal, returning the key to a conflicting clause, if found.
    pub(super) fn propagate(&mut self) -> Option<ClauseKey> {
        while self.q_head < self.trail.len() {
            let false_literal = self.trail[self.q_head].negate();
            self.q_head += 1;

            if let Some(conflict) = self.propagate_literal(false_literal) {
                self.q_head = self.trail.len();
                return Some(conflict);
            }
        }
        None
    }

    /// Visits the clauses watching `false_literal`, which has just been valued false.
    fn propagate_literal(&mut self, false_literal: CLiteral) -> Option<ClauseKey> {
        let mut watch_list = std::mem::take(&mut self.watches[false_literal.index()]);
        let mut conflict = None;
        let mut index = 0;

        while index < watch_list.len() {
            let key = watch_list[index];
            let Some(clause) = self.clauses.get_mut(key) else {
                watch_list.swap_remove(index);
                continue;
            };

            let literals = &mut clause.literals;
            if literals[0] == false_literal {
                literals.swap(0, 1);
            }
            if literals[1] != false_literal {
                // The watch is from a previous arrangement of the clause.
                watch_list.swap_remove(index);
                continue;
            }

            let other = literals[0];
            if literal_value(&self.values, other) == Some(true) {
                index += 1;
                continue;
            }

            let replacement = (2..literals.len())
                .find(|position| literal_value(&self.values, literals[*position]) != Some(false));

            if let Some(position) = replacement {
                literals.swap(1, position);
                let watch = literals[1];
                self.watches[watch.index()].push(key);
                watch_list.swap_remove(index);
                continue;
            }

            match literal_value(&self.values, other) {
                Some(false) => {
                    conflict = Some(key);
                    break;
                }
                _ => {
                    self.assign(other, Some(key));
                    index += 1;
                }
            }
        }

        self.watches[false_literal.index()] = watch_list;
        conflict
    }
}
