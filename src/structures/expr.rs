/*!
Propositional expressions over feature names, as given by cross-tree constraints.

An expression is translated to clauses directly: first to negation normal form, and then by distributing disjunctions over conjunctions.
The translation may grow exponentially on deeply nested disjunctions of conjunctions, though constraints of feature models are typically small.

```rust
# use fm_sat::structures::{expr::Expr, variables::Variables};
let variables = Variables::new(["A", "B", "C"]);
let constraint = Expr::var("A").implies(Expr::var("B").or(Expr::var("C")));

let clauses = constraint.to_clauses(&variables).unwrap();
assert_eq!(clauses.len(), 1);
assert_eq!(clauses[0].literals(), &[-1, 2, 3]);
```
*/

use std::collections::HashSet;

use crate::{
    structures::{
        literal::CLiteral,
        literal_set::{clean_literal_set, LiteralSet},
        variables::Variables,
    },
    types::err::ErrorKind,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    True,
    False,
    Var(String),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Implies(Box<Expr>, Box<Expr>),
    Iff(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Expr {
        Expr::Var(name.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    pub fn and(self, other: Expr) -> Expr {
        Expr::And(vec![self, other])
    }

    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(vec![self, other])
    }

    pub fn implies(self, other: Expr) -> Expr {
        Expr::Implies(Box::new(self), Box::new(other))
    }

    pub fn iff(self, other: Expr) -> Expr {
        Expr::Iff(Box::new(self), Box::new(other))
    }

    /// The names of variables in the expression, in order of first occurrence.
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::True | Expr::False => {}
            Expr::Var(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name)
                }
            }
            Expr::Not(e) => e.collect_names(names),
            Expr::And(es) | Expr::Or(es) => es.iter().for_each(|e| e.collect_names(names)),
            Expr::Implies(a, b) | Expr::Iff(a, b) => {
                a.collect_names(names);
                b.collect_names(names);
            }
        }
    }

    /// Clauses equivalent to the expression, without tautologies or duplicates.
    ///
    /// An unsatisfiable expression may produce the empty clause.
    pub fn to_clauses(&self, variables: &Variables) -> Result<Vec<LiteralSet>, ErrorKind> {
        let raw = self.nnf(true).distribute(variables)?;

        let mut clauses: Vec<LiteralSet> = Vec::with_capacity(raw.len());
        let mut seen = HashSet::new();
        for literals in raw {
            if let Some(clause) = clean_literal_set(&literals, &[]) {
                if seen.insert(clause.clone()) {
                    clauses.push(clause);
                }
            }
        }
        Ok(clauses)
    }

    /// The expression in negation normal form, negated if `polarity` is false.
    fn nnf(&self, polarity: bool) -> Nnf {
        match self {
            Expr::True => Nnf::Constant(polarity),
            Expr::False => Nnf::Constant(!polarity),
            Expr::Var(name) => Nnf::Literal(name.clone(), polarity),
            Expr::Not(e) => e.nnf(!polarity),
            Expr::And(es) => {
                let parts = es.iter().map(|e| e.nnf(polarity)).collect();
                match polarity {
                    true => Nnf::And(parts),
                    false => Nnf::Or(parts),
                }
            }
            Expr::Or(es) => {
                let parts = es.iter().map(|e| e.nnf(polarity)).collect();
                match polarity {
                    true => Nnf::Or(parts),
                    false => Nnf::And(parts),
                }
            }
            Expr::Implies(a, b) => match polarity {
                true => Nnf::Or(vec![a.nnf(false), b.nnf(true)]),
                false => Nnf::And(vec![a.nnf(true), b.nnf(false)]),
            },
            Expr::Iff(a, b) => match polarity {
                true => Nnf::And(vec![
                    Nnf::Or(vec![a.nnf(false), b.nnf(true)]),
                    Nnf::Or(vec![a.nnf(true), b.nnf(false)]),
                ]),
                false => Nnf::Or(vec![
                    Nnf::And(vec![a.nnf(true), b.nnf(false)]),
                    Nnf::And(vec![a.nnf(false), b.nnf(true)]),
                ]),
            },
        }
    }
}

fn write_joined(f: &mut std::fmt::Formatter<'_>, es: &[Expr], op: &str) -> std::fmt::Result {
    write!(f, "(")?;
    for (index, e) in es.iter().enumerate() {
        if index > 0 {
            write!(f, " {op} ")?;
        }
        write!(f, "{e}")?;
    }
    write!(f, ")")
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::True => write!(f, "true"),
            Expr::False => write!(f, "false"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Not(e) => write!(f, "¬{e}"),
            Expr::And(es) => write_joined(f, es, "∧"),
            Expr::Or(es) => write_joined(f, es, "∨"),
            Expr::Implies(a, b) => write!(f, "({a} ⇒ {b})"),
            Expr::Iff(a, b) => write!(f, "({a} ⇔ {b})"),
        }
    }
}

/// An expression in negation normal form.
enum Nnf {
    Constant(bool),
    Literal(String, bool),
    And(Vec<Nnf>),
    Or(Vec<Nnf>),
}

impl Nnf {
    /// Clauses (as unsorted literal vectors) equivalent to the expression.
    ///
    /// No clauses is true, and a single empty clause is false.
    fn distribute(&self, variables: &Variables) -> Result<Vec<Vec<CLiteral>>, ErrorKind> {
        match self {
            Nnf::Constant(true) => Ok(Vec::new()),
            Nnf::Constant(false) => Ok(vec![Vec::new()]),
            Nnf::Literal(name, polarity) => Ok(vec![vec![variables.literal(name, *polarity)?]]),
            Nnf::And(parts) => {
                let mut clauses = Vec::new();
                for part in parts {
                    clauses.extend(part.distribute(variables)?);
                }
                Ok(clauses)
            }
            Nnf::Or(parts) => {
                let mut clauses: Vec<Vec<CLiteral>> = vec![Vec::new()];
                for part in parts {
                    let part_clauses = part.distribute(variables)?;
                    let mut product = Vec::with_capacity(clauses.len() * part_clauses.len());
                    for clause in &clauses {
                        for part_clause in &part_clauses {
                            let mut combined = clause.clone();
                            combined.extend_from_slice(part_clause);
                            product.push(combined);
                        }
                    }
                    clauses = product;
                }
                Ok(clauses)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Variables {
        Variables::new(["A", "B", "C"])
    }

    #[test]
    fn implication() {
        let clauses = Expr::var("B").implies(Expr::var("C")).to_clauses(&abc()).unwrap();
        assert_eq!(clauses, vec![LiteralSet::new([-2, 3])]);
    }

    #[test]
    fn iff() {
        let clauses = Expr::var("A").iff(Expr::var("B")).to_clauses(&abc()).unwrap();
        assert_eq!(
            clauses,
            vec![LiteralSet::new([-1, 2]), LiteralSet::new([1, -2])]
        );
    }

    #[test]
    fn negated_iff_distributes() {
        let clauses = Expr::var("A")
            .iff(Expr::var("B"))
            .not()
            .to_clauses(&abc())
            .unwrap();
        // (A ∧ ¬B) ∨ (¬A ∧ B), without the two tautological products.
        assert_eq!(
            clauses,
            vec![LiteralSet::new([1, 2]), LiteralSet::new([-2, -1])]
        );
    }

    #[test]
    fn constants() {
        assert!(Expr::True.to_clauses(&abc()).unwrap().is_empty());
        assert_eq!(Expr::False.to_clauses(&abc()).unwrap(), vec![LiteralSet::default()]);
        assert!(Expr::var("A")
            .or(Expr::var("A").not())
            .to_clauses(&abc())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unknown_name() {
        assert_eq!(
            Expr::var("D").to_clauses(&abc()),
            Err(ErrorKind::UnknownVariable("D".to_string()))
        );
    }

    #[test]
    fn names() {
        let e = Expr::var("B").implies(Expr::var("A").and(Expr::var("B")));
        assert_eq!(e.variable_names(), vec!["B", "A"]);
    }
}
