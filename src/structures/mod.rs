//! Key structures, such as variables, literals, and clauses.
//!
//! ## Variables
//! A [variable](variables) is a positive integer associated with a feature name.
//! The variables of a formula are `1..=n`, and `0` is reserved as a 'no literal' sentinel.
//!
//! ## Literals
//! A [literal](literal) is a signed integer, with the sign giving the polarity of the literal.
//!
//! ## Literal sets
//! A [literal set](literal_set) is a sorted, duplicate-free sequence of literals, read as a clause or as a (partial) assignment depending on use.
//!
//! ## CNFs
//! A [CNF] owns a variable mapping and a collection of clauses, read as the conjunction of the clauses.
//!
//! ## Expressions
//! An [expression](expr) is a propositional formula over feature names, given as a cross-tree constraint.

pub mod cnf;
pub mod dimacs;
pub mod expr;
pub mod literal;
pub mod literal_set;
pub mod variables;

pub use cnf::CNF;
