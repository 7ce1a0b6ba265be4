/*!
A bijective mapping between feature names and variables.

Variables are `1..=n`, in the order the names were given.
The mapping is fixed on creation, and is shared between the formulas derived from a feature model snapshot via an [Arc](std::sync::Arc).

```rust
# use fm_sat::structures::variables::Variables;
let variables = Variables::new(["Root", "A", "B"]);

assert_eq!(variables.variable("A"), Ok(2));
assert_eq!(variables.literal("B", false), Ok(-3));
assert_eq!(variables.name(-3), Ok("B"));
assert!(variables.variable("C").is_err());
```
*/

use std::collections::HashMap;

use crate::{
    structures::{
        literal::{CLiteral, Literal, Var},
        literal_set::LiteralSet,
    },
    types::err::ErrorKind,
};

/// A name↔variable mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Variables {
    /// Names, indexed by variable - 1.
    names: Vec<String>,

    /// Variables, indexed by name.
    index: HashMap<String, Var>,
}

impl Variables {
    /// A mapping over `names`, in order.
    ///
    /// A repeated name keeps the variable of the first occurrence.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut variables = Variables::default();
        for name in names {
            let name: String = name.into();
            if variables.index.contains_key(&name) {
                continue;
            }
            variables.names.push(name.clone());
            variables.index.insert(name, variables.names.len() as Var);
        }
        variables
    }

    /// The count of variables, i.e. the maximum variable.
    pub fn size(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The variable of `name`.
    pub fn variable(&self, name: &str) -> Result<Var, ErrorKind> {
        match self.index.get(name) {
            Some(var) => Ok(*var),
            None => Err(ErrorKind::UnknownVariable(name.to_string())),
        }
    }

    /// The literal of `name` with `polarity`.
    pub fn literal(&self, name: &str, polarity: bool) -> Result<CLiteral, ErrorKind> {
        CLiteral::try_new(self.variable(name)?, polarity)
    }

    /// True if `name` has a variable, false otherwise.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The name of the variable of `literal`.
    pub fn name(&self, literal: CLiteral) -> Result<&str, ErrorKind> {
        self.check_literal(literal)?;
        Ok(&self.names[literal.var() as usize - 1])
    }

    /// Names in variable order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|name| name.as_str())
    }

    /// Checks `literal` is non-zero and refers to a variable of the mapping.
    pub fn check_literal(&self, literal: CLiteral) -> Result<(), ErrorKind> {
        match literal != 0 && (literal.var() as usize) <= self.names.len() {
            true => Ok(()),
            false => Err(ErrorKind::MalformedClause(literal)),
        }
    }

    /// The names of the variables of `literals` with the given polarity, or all if `polarity` is None.
    pub fn names_of(
        &self,
        literals: &LiteralSet,
        polarity: Option<bool>,
    ) -> Result<Vec<String>, ErrorKind> {
        let mut names = Vec::new();
        for literal in literals.iter() {
            if polarity.map_or(true, |p| literal.polarity() == p) {
                names.push(self.name(literal)?.to_string());
            }
        }
        Ok(names)
    }

    /// The literal set given by `names`, each with `polarity`.
    pub fn literal_set<I, S>(&self, names: I, polarity: bool) -> Result<LiteralSet, ErrorKind>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut literals = Vec::new();
        for name in names {
            literals.push(self.literal(name.as_ref(), polarity)?);
        }
        Ok(LiteralSet::new(literals))
    }

    /// A mapping over the names not in `excluded`, preserving order.
    pub fn without<S: AsRef<str>>(&self, excluded: &[S]) -> Variables {
        let excluded: Vec<&str> = excluded.iter().map(|name| name.as_ref()).collect();
        Variables::new(self.names().filter(|name| !excluded.contains(name)))
    }

    /// Translates `literal` from `self` to `target`, by name.
    pub fn translate(&self, literal: CLiteral, target: &Variables) -> Result<CLiteral, ErrorKind> {
        let name = self.name(literal)?;
        target.literal(name, literal.polarity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_in_order() {
        let variables = Variables::new(["a", "b", "c", "b"]);
        assert_eq!(variables.size(), 3);
        assert_eq!(variables.variable("a"), Ok(1));
        assert_eq!(variables.variable("c"), Ok(3));
        assert_eq!(
            variables.names().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn malformed() {
        let variables = Variables::new(["a"]);
        assert_eq!(variables.name(0), Err(ErrorKind::MalformedClause(0)));
        assert_eq!(variables.name(-2), Err(ErrorKind::MalformedClause(-2)));
        assert_eq!(
            variables.literal("x", true),
            Err(ErrorKind::UnknownVariable("x".to_string()))
        );
    }

    #[test]
    fn names_by_polarity() {
        let variables = Variables::new(["a", "b", "c"]);
        let set = LiteralSet::new([1, -2, 3]);
        assert_eq!(variables.names_of(&set, Some(true)), Ok(vec!["a".into(), "c".into()]));
        assert_eq!(variables.names_of(&set, Some(false)), Ok(vec!["b".into()]));
    }

    #[test]
    fn translate() {
        let variables = Variables::new(["a", "b", "c"]);
        let smaller = variables.without(&["a"]);
        assert_eq!(smaller.size(), 2);
        assert_eq!(variables.translate(-3, &smaller), Ok(-2));
        assert!(variables.translate(1, &smaller).is_err());
    }
}
