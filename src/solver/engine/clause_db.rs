/*!
Storage of clauses.

Clauses are stored in a [SlotMap], and are accessed through a [ClauseKey].
Keys are versioned, so a key to a removed clause is never mistaken for a key to some later clause.

A clause with two or more literals is watched by its first two literals.
On removal of a clause watch lists are not revised, instead any watch for a missing clause is dropped the next time the watch list is visited during [BCP](crate::solver::engine::bcp).

Learnt clauses are consequences of the original clauses at the time they were learnt, and so all learnt clauses are forgotten whenever an original clause is removed.
*/

use crate::{
    misc::log::targets::{self},
    structures::literal::{CLiteral, Literal},
    types::err::{self, ErrorKind},
};

use super::Engine;

slotmap::new_key_type! {
    /// A key to some clause of an engine.
    pub struct ClauseKey;
}

/// A clause, as stored by an engine.
#[derive(Clone, Debug)]
pub struct StoredClause {
    /// The literals of the clause, with watched literals first.
    pub literals: Vec<CLiteral>,

    /// Whether the clause was learnt during a solve.
    pub learnt: bool,
}

impl Engine {
    /// Stores `literals` as an original clause.
    ///
    /// Fails with [Contradiction](ErrorKind::Contradiction) if the clause is empty, or is a unit clause whose negation is also stored as a unit clause.
    /// In either case the clause is not stored.
    pub fn add_clause(&mut self, literals: &[CLiteral]) -> Result<ClauseKey, ErrorKind> {
        for literal in literals {
            self.check_literal(*literal)?;
        }

        let mut literals = literals.to_vec();
        literals.sort_unstable();
        literals.dedup();

        match literals.as_slice() {
            [] => {
                log::trace!(target: targets::SOLVER, "Rejected empty clause");
                return Err(ErrorKind::Contradiction);
            }
            [unit] => {
                let negation = unit.negate();
                let conflict = self.units.iter().any(|key| {
                    self.clauses
                        .get(*key)
                        .is_some_and(|clause| clause.literals == [negation])
                });
                if conflict {
                    log::trace!(target: targets::SOLVER, "Rejected unit {unit}, as {negation} is a unit");
                    return Err(ErrorKind::Contradiction);
                }
            }
            _ => {}
        }

        Ok(self.store(literals, false))
    }

    /// Stores `literals` as a learnt clause.
    pub(super) fn add_learnt(&mut self, literals: Vec<CLiteral>) -> ClauseKey {
        let key = self.store(literals, true);
        self.learnt.push(key);
        key
    }

    fn store(&mut self, literals: Vec<CLiteral>, learnt: bool) -> ClauseKey {
        let length = literals.len();
        let watched = match length {
            0 | 1 => None,
            _ => Some((literals[0], literals[1])),
        };

        let key = self.clauses.insert(StoredClause { literals, learnt });

        match (length, watched) {
            (0, _) => self.empty_clauses += 1,
            (1, _) => self.units.push(key),
            (_, Some((a, b))) => {
                self.watches[a.index()].push(key);
                self.watches[b.index()].push(key);
            }
            _ => {}
        }
        key
    }

    /// Removes the clause of `key`.
    ///
    /// If the clause is original, every learnt clause is also removed.
    pub fn remove_clause(&mut self, key: ClauseKey) -> Result<(), ErrorKind> {
        let Some(clause) = self.clauses.remove(key) else {
            return Err(err::SolverError::MissingClause.into());
        };

        match clause.literals.len() {
            0 => self.empty_clauses -= 1,
            1 => self.units.retain(|unit| *unit != key),
            _ => {}
        }

        if !clause.learnt {
            self.forget_learnt();
        }
        Ok(())
    }

    /// Removes every learnt clause.
    pub fn forget_learnt(&mut self) {
        if self.learnt.is_empty() {
            return;
        }
        log::trace!(target: targets::SOLVER, "Forgetting {} learnt clauses", self.learnt.len());
        for key in std::mem::take(&mut self.learnt) {
            self.clauses.remove(key);
        }
        let clauses = &self.clauses;
        self.units.retain(|key| clauses.contains_key(*key));
    }

    pub fn get_clause(&self, key: ClauseKey) -> Option<&StoredClause> {
        self.clauses.get(key)
    }

    /// A count of original clauses.
    pub fn original_count(&self) -> usize {
        self.clauses.len() - self.learnt.len()
    }

    /// A count of learnt clauses.
    pub fn learnt_count(&self) -> usize {
        self.learnt.len()
    }

    /// True if some stored clause is empty.
    pub fn has_empty_clause(&self) -> bool {
        self.empty_clauses > 0
    }

    /// Removes roughly half of the learnt clauses, preferring the longest.
    ///
    /// Binary clauses, and clauses which are the reason for some value, are kept.
    pub(super) fn reduce_learnt(&mut self) {
        if self.learnt.len() <= self.learnt_limit {
            return;
        }

        let mut learnt = std::mem::take(&mut self.learnt);
        learnt.sort_by_key(|key| {
            std::cmp::Reverse(self.clauses.get(*key).map_or(0, |c| c.literals.len()))
        });

        let target = learnt.len() / 2;
        let mut kept = Vec::with_capacity(learnt.len());
        let mut removed = 0;

        for key in learnt {
            let removable = removed < target
                && self.clauses.get(key).is_some_and(|clause| {
                    clause.literals.len() > 2 && !self.is_reason(key, clause.literals[0])
                });
            if removable {
                self.clauses.remove(key);
                removed += 1;
            } else {
                kept.push(key);
            }
        }

        log::trace!(target: targets::SOLVER, "Reduced learnt clauses by {removed}");
        self.learnt = kept;
        self.learnt_limit += self.learnt_limit / 10;
    }

    /// True if `key` is the reason for the value of `literal`.
    fn is_reason(&self, key: ClauseKey, literal: CLiteral) -> bool {
        let var = literal.var() as usize;
        self.values[var].is_some() && self.reasons[var] == Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn empty_is_contradiction() {
        let mut engine = Engine::new(2, Config::default());
        assert_eq!(engine.add_clause(&[]), Err(ErrorKind::Contradiction));
        assert!(!engine.has_empty_clause());
    }

    #[test]
    fn complementary_units() {
        let mut engine = Engine::new(2, Config::default());
        assert!(engine.add_clause(&[1]).is_ok());
        assert_eq!(engine.add_clause(&[-1]), Err(ErrorKind::Contradiction));
        assert!(engine.add_clause(&[-2]).is_ok());
    }

    #[test]
    fn malformed() {
        let mut engine = Engine::new(2, Config::default());
        assert_eq!(engine.add_clause(&[1, 3]), Err(ErrorKind::MalformedClause(3)));
        assert_eq!(engine.add_clause(&[0]), Err(ErrorKind::MalformedClause(0)));
    }

    #[test]
    fn removal() {
        let mut engine = Engine::new(3, Config::default());
        let key = engine.add_clause(&[1, 2, 3]).unwrap();
        assert_eq!(engine.original_count(), 1);
        assert!(engine.remove_clause(key).is_ok());
        assert_eq!(engine.original_count(), 0);
        assert!(engine.remove_clause(key).is_err());
    }
}
