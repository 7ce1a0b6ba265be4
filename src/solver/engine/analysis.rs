/*!
Conflict analysis.

Given a conflicting clause, resolution is applied against the reasons for literals valued at the current level, in reverse trail order, until exactly one literal of the current level remains (the first unique implication point).

The result is a learnt clause whose first literal is asserted after a backjump to the second highest level among the literals of the clause.
Every variable met during resolution has its activity bumped.
*/

use crate::{
    structures::literal::{CLiteral, Literal},
    types::err::{self, ErrorKind},
};

use super::{ClauseKey, Engine, LevelIndex};

/// An asserting clause, and the level to backjump to before asserting the first literal.
pub struct Asserting {
    pub literals: Vec<CLiteral>,
    pub level: LevelIndex,
}

impl Engine {
    /// Analyses the conflict of `conflict` at the current (non-zero) level.
    pub(super) fn analyze(&mut self, conflict: ClauseKey) -> Result<Asserting, ErrorKind> {
        let current = self.level();

        let mut learnt: Vec<CLiteral> = vec![0];
        let mut path_count = 0;
        let mut resolved: Option<CLiteral> = None;
        let mut trail_index = self.trail.len();
        let mut reason = conflict;

        loop {
            let literals = match self.clauses.get(reason) {
                Some(clause) => clause.literals.clone(),
                None => return Err(err::SolverError::MissingClause.into()),
            };

            for literal in literals {
                if Some(literal) == resolved {
                    continue;
                }
                let var = literal.var() as usize;
                if self.seen[var] || self.levels[var] == 0 {
                    continue;
                }
                self.seen[var] = true;
                self.bump_activity(var);
                if self.levels[var] >= current {
                    path_count += 1;
                } else {
                    learnt.push(literal);
                }
            }

            let next = loop {
                if trail_index == 0 {
                    return Err(err::SolverError::NoAssertion.into());
                }
                trail_index -= 1;
                let literal = self.trail[trail_index];
                if self.seen[literal.var() as usize] {
                    break literal;
                }
            };

            self.seen[next.var() as usize] = false;
            resolved = Some(next);
            path_count -= 1;

            if path_count == 0 {
                learnt[0] = next.negate();
                break;
            }

            reason = match self.reasons[next.var() as usize] {
                Some(key) => key,
                None => return Err(err::SolverError::NoAssertion.into()),
            };
        }

        for literal in &learnt[1..] {
            self.seen[literal.var() as usize] = false;
        }

        // Place a literal of the backjump level second, so the clause is watched correctly after the backjump.
        let mut level = 0;
        let mut second = 1;
        for (position, literal) in learnt.iter().enumerate().skip(1) {
            let literal_level = self.levels[literal.var() as usize];
            if literal_level > level {
                level = literal_level;
                second = position;
            }
        }
        if learnt.len() > 1 {
            learnt.swap(1, second);
        }

        Ok(Asserting {
            literals: learnt,
            level,
        })
    }

    /// Bumps the activity of `var`, rescaling all activity if required.
    fn bump_activity(&mut self, var: usize) {
        let bump = self.bump;
        self.activity
            .apply_to_value_at_value_index(var, |activity| activity + bump);

        if *self.activity.value_at(var) > 1e100 {
            self.activity.apply_to_all(|activity| activity * 1e-100);
            self.bump *= 1e-100;
        }
        self.activity.heapify_if_active(var);
    }

    /// Decays activity, by growing the bump applied to future conflicts.
    pub(super) fn decay_activity(&mut self) {
        self.bump *= self.config.activity_decay.value;
    }
}
