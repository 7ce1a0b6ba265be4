/*!
Sorted, duplicate-free sequences of literals.

A literal set is read as a clause (a disjunction) or as a partial assignment (a conjunction), depending on use.

Literals are sorted by integer value, so negative literals come before positive literals: `[-3, -1, 2]`.
Two literal sets are equal exactly when their literals are equal as sorted sequences.

Set operations match literals exactly, e.g. `[1, -2].remove_all([2])` is `[1, -2]`.
Methods which match by variable instead say so in their name.

```rust
# use fm_sat::structures::literal_set::LiteralSet;
let set = LiteralSet::new([2, -1, -3, 2]);
assert_eq!(set.literals(), &[-3, -1, 2]);

assert_eq!(set.remove_all(&LiteralSet::new([1, 2])).literals(), &[-3, -1]);
assert!(set.contains_variable(1));
assert!(!set.contains_literal(1));
```
*/

use crate::structures::literal::{CLiteral, Literal, Var};

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LiteralSet {
    literals: Vec<CLiteral>,
}

impl LiteralSet {
    /// A literal set from `literals`, sorted and without duplicates.
    pub fn new<I: IntoIterator<Item = CLiteral>>(literals: I) -> Self {
        let mut literals: Vec<CLiteral> = literals.into_iter().collect();
        literals.sort_unstable();
        literals.dedup();
        LiteralSet { literals }
    }

    /// A literal set from a full assignment, as returned by a solver, skipping unassigned (zero) entries.
    pub fn from_model(model: &[CLiteral]) -> Self {
        LiteralSet::new(model.iter().copied().filter(|literal| *literal != 0))
    }

    pub fn literals(&self) -> &[CLiteral] {
        &self.literals
    }

    pub fn iter(&self) -> impl Iterator<Item = CLiteral> + '_ {
        self.literals.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn into_vec(self) -> Vec<CLiteral> {
        self.literals
    }

    pub fn contains_literal(&self, literal: CLiteral) -> bool {
        self.literals.binary_search(&literal).is_ok()
    }

    /// True if either literal of `var` is in the set.
    pub fn contains_variable(&self, var: Var) -> bool {
        let var = var as CLiteral;
        self.contains_literal(var) || self.contains_literal(-var)
    }

    pub fn contains_all(&self, other: &LiteralSet) -> bool {
        other.iter().all(|literal| self.contains_literal(literal))
    }

    pub fn contains_any(&self, other: &LiteralSet) -> bool {
        other.iter().any(|literal| self.contains_literal(literal))
    }

    /// True if some literal of `other` is the negation of some literal of the set.
    pub fn has_conflicts(&self, other: &LiteralSet) -> bool {
        other.iter().any(|literal| self.contains_literal(-literal))
    }

    /// True if the set contains some literal and its negation.
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .take_while(|literal| **literal < 0)
            .any(|literal| self.contains_literal(-literal))
    }

    /// The literals of the set not in `other`.
    pub fn remove_all(&self, other: &LiteralSet) -> LiteralSet {
        LiteralSet {
            literals: self
                .iter()
                .filter(|literal| !other.contains_literal(*literal))
                .collect(),
        }
    }

    /// The literals of the set also in `other`.
    pub fn retain_all(&self, other: &LiteralSet) -> LiteralSet {
        LiteralSet {
            literals: self
                .iter()
                .filter(|literal| other.contains_literal(*literal))
                .collect(),
        }
    }

    /// The literals of the set whose variable does not appear in `other`.
    pub fn remove_all_variables(&self, other: &LiteralSet) -> LiteralSet {
        LiteralSet {
            literals: self
                .iter()
                .filter(|literal| !other.contains_variable(literal.var()))
                .collect(),
        }
    }

    /// The literals of the set whose variable appears in `other`.
    pub fn retain_all_variables(&self, other: &LiteralSet) -> LiteralSet {
        LiteralSet {
            literals: self
                .iter()
                .filter(|literal| other.contains_variable(literal.var()))
                .collect(),
        }
    }

    /// The union of the set with `other`.
    pub fn add_all(&self, other: &LiteralSet) -> LiteralSet {
        LiteralSet::new(self.iter().chain(other.iter()))
    }

    /// The set with each literal negated.
    pub fn negate(&self) -> LiteralSet {
        let mut literals: Vec<CLiteral> = self.literals.iter().map(|literal| -*literal).collect();
        literals.sort_unstable();
        LiteralSet { literals }
    }

    /// The set without `literal`.
    pub fn without_literal(&self, literal: CLiteral) -> LiteralSet {
        LiteralSet {
            literals: self.iter().filter(|other| *other != literal).collect(),
        }
    }

    /// The variables of the set, in literal order.
    pub fn variables(&self) -> impl Iterator<Item = Var> + '_ {
        self.iter().map(|literal| literal.var())
    }

    /// The literals of the set with positive polarity.
    pub fn positive(&self) -> LiteralSet {
        LiteralSet {
            literals: self.iter().filter(|literal| *literal > 0).collect(),
        }
    }

    /// The literals of the set with negative polarity.
    pub fn negative(&self) -> LiteralSet {
        LiteralSet {
            literals: self.iter().filter(|literal| *literal < 0).collect(),
        }
    }
}

/// A literal set from `literals` without any literal of `unwanted`, or None if `literals` contains some literal and its negation.
///
/// Unwanted variables are removed before the tautology check, so a clause which is only a tautology on unwanted variables is kept.
pub fn clean_literal_set(literals: &[CLiteral], unwanted: &[Var]) -> Option<LiteralSet> {
    let cleaned = LiteralSet::new(
        literals
            .iter()
            .copied()
            .filter(|literal| !unwanted.contains(&literal.var())),
    );
    match cleaned.is_tautology() {
        true => None,
        false => Some(cleaned),
    }
}

impl std::fmt::Display for LiteralSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (index, literal) in self.literals.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{literal}")?;
        }
        write!(f, "]")
    }
}

impl From<Vec<CLiteral>> for LiteralSet {
    fn from(literals: Vec<CLiteral>) -> Self {
        LiteralSet::new(literals)
    }
}

impl FromIterator<CLiteral> for LiteralSet {
    fn from_iter<I: IntoIterator<Item = CLiteral>>(iter: I) -> Self {
        LiteralSet::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_by_value() {
        let set = LiteralSet::new([2, -1, -3]);
        assert_eq!(set.literals(), &[-3, -1, 2]);
        assert_eq!(set.to_string(), "[-3, -1, 2]");
    }

    #[test]
    fn exact_matching() {
        let set = LiteralSet::new([1, -2, 3]);
        let other = LiteralSet::new([2, 3]);

        assert_eq!(set.remove_all(&other).literals(), &[-2, 1]);
        assert_eq!(set.retain_all(&other).literals(), &[3]);
        assert_eq!(set.remove_all_variables(&other).literals(), &[1]);
        assert_eq!(set.retain_all_variables(&other).literals(), &[-2, 3]);
        assert!(set.has_conflicts(&other));
    }

    #[test]
    fn negate() {
        let set = LiteralSet::new([-3, -1, 2]);
        assert_eq!(set.negate().literals(), &[-2, 1, 3]);
        assert_eq!(set.negate().negate(), set);
    }

    #[test]
    fn tautology() {
        assert!(LiteralSet::new([1, -1]).is_tautology());
        assert!(!LiteralSet::new([1, -2]).is_tautology());
        assert!(clean_literal_set(&[1, 2, -1], &[]).is_none());
    }

    #[test]
    fn clean_strips_unwanted() {
        let cleaned = clean_literal_set(&[3, 1, -2, 1], &[2]);
        assert_eq!(cleaned.map(LiteralSet::into_vec), Some(vec![1, 3]));

        // The only tautology is on an unwanted variable.
        let cleaned = clean_literal_set(&[2, -2, 1], &[2]);
        assert_eq!(cleaned.map(LiteralSet::into_vec), Some(vec![1]));
    }

    #[test]
    fn clean_idempotent() {
        let once = clean_literal_set(&[4, -1, 4, 2], &[]);
        let twice = once
            .as_ref()
            .and_then(|set| clean_literal_set(set.literals(), &[]));
        assert_eq!(once, twice);
    }
}
