/*!
A formula in conjunctive normal form.

A [CNF] owns a shared [Variables] mapping and a collection of clauses.
Every literal of every clause refers to a variable of the mapping, and this is checked when a clause is added.

A CNF is not revised after it has been handed to a solver or analysis.
Derived formulas (sliced, filtered, etc.) are new CNFs, which may share the mapping.
*/

use std::sync::Arc;

use crate::{
    structures::{literal::CLiteral, literal_set::LiteralSet, variables::Variables},
    types::err::ErrorKind,
};

#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CNF {
    variables: Arc<Variables>,
    clauses: Vec<LiteralSet>,
}

impl CNF {
    /// An empty (and so trivially satisfiable) formula over `variables`.
    pub fn new(variables: Arc<Variables>) -> Self {
        CNF {
            variables,
            clauses: Vec::default(),
        }
    }

    /// A formula over `variables` from `clauses`, each given as a sequence of literals.
    pub fn from_clauses<I, C>(variables: Arc<Variables>, clauses: I) -> Result<Self, ErrorKind>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = CLiteral>,
    {
        let mut cnf = CNF::new(variables);
        for clause in clauses {
            cnf.add_clause(LiteralSet::new(clause))?;
        }
        Ok(cnf)
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// The shared mapping, for use in a derived formula.
    pub fn shared_variables(&self) -> Arc<Variables> {
        self.variables.clone()
    }

    pub fn clauses(&self) -> &[LiteralSet] {
        &self.clauses
    }

    /// Adds `clause`, after checking each literal belongs to the mapping.
    ///
    /// A tautology (a clause with both literals of some variable) is dropped.
    pub fn add_clause(&mut self, clause: LiteralSet) -> Result<(), ErrorKind> {
        for literal in clause.iter() {
            self.variables.check_literal(literal)?;
        }
        if !clause.is_tautology() {
            self.clauses.push(clause);
        }
        Ok(())
    }

    pub fn add_clauses<I: IntoIterator<Item = LiteralSet>>(
        &mut self,
        clauses: I,
    ) -> Result<(), ErrorKind> {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    /// Appends the clauses of `other`, translating by name if the mappings differ.
    pub fn append(&mut self, other: &CNF) -> Result<(), ErrorKind> {
        if Arc::ptr_eq(&self.variables, &other.variables) || self.variables == other.variables {
            self.clauses.extend(other.clauses.iter().cloned());
            return Ok(());
        }
        for clause in &other.clauses {
            let translated = other.translate_clause(clause, &self.variables)?;
            self.add_clause(translated)?;
        }
        Ok(())
    }

    /// A copy of the formula over `target`, translating each literal by name.
    ///
    /// Fails with [UnknownVariable](ErrorKind::UnknownVariable) if some clause mentions a name not in `target`.
    pub fn adapt(&self, target: Arc<Variables>) -> Result<CNF, ErrorKind> {
        let mut adapted = CNF::new(target);
        for clause in &self.clauses {
            let translated = self.translate_clause(clause, &adapted.variables)?;
            adapted.clauses.push(translated);
        }
        Ok(adapted)
    }

    /// A copy of the formula with the clauses satisfying `keep`.
    pub fn filtered(&self, keep: impl Fn(&LiteralSet) -> bool) -> CNF {
        CNF {
            variables: self.variables.clone(),
            clauses: self.clauses.iter().filter(|c| keep(c)).cloned().collect(),
        }
    }

    /// True if some clause is empty, and so the formula is unsatisfiable.
    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(|clause| clause.is_empty())
    }

    fn translate_clause(
        &self,
        clause: &LiteralSet,
        target: &Variables,
    ) -> Result<LiteralSet, ErrorKind> {
        let mut literals = Vec::with_capacity(clause.len());
        for literal in clause.iter() {
            literals.push(self.variables.translate(literal, target)?);
        }
        Ok(LiteralSet::new(literals))
    }
}

impl std::fmt::Display for CNF {
    /// The formula in DIMACS form, with a comment naming each variable.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, name) in self.variables.names().enumerate() {
            writeln!(f, "c {} {name}", index + 1)?;
        }
        writeln!(f, "p cnf {} {}", self.variables.size(), self.clauses.len())?;
        for clause in &self.clauses {
            for literal in clause.iter() {
                write!(f, "{literal} ")?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}
