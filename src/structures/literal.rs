//! Literals are variables paired with a (boolean) polarity.
//!
//! Here, a literal is an [i32], with the sign of the integer indicating the polarity of the literal.
//! Methods on the [Literal] trait give a uniform way of moving between the integer and the (variable, polarity) representation.
//!
//! ```rust
//! # use fm_sat::structures::literal::{Literal, CLiteral};
//! let literal = CLiteral::new(79, false);
//!
//! assert_eq!(literal, -79);
//! assert!(!literal.polarity());
//! assert_eq!(literal.var(), 79);
//! assert!(literal.negate().polarity());
//! ```

use crate::types::err::ErrorKind;

/// A variable, i.e. some positive integer.
pub type Var = u32;

/// The canonical representation of a literal.
pub type CLiteral = i32;

/// Something which has methods for returning a variable and a polarity, etc.
pub trait Literal: Copy + Ord + std::hash::Hash {
    /// A fresh literal, specified by pairing a variable with a boolean.
    ///
    /// The variable must be representable as a literal, see [try_new](Literal::try_new).
    fn new(var: Var, polarity: bool) -> Self;

    /// A fresh literal, or [UnknownVariable](ErrorKind::UnknownVariable) if the variable has no representation as a literal.
    fn try_new(var: Var, polarity: bool) -> Result<Self, ErrorKind>;

    /// The negation of the literal.
    fn negate(&self) -> Self;

    /// The variable of the literal.
    fn var(&self) -> Var;

    /// The polarity of the literal.
    fn polarity(&self) -> bool;

    /// A dense index of the literal, distinct for each literal of a variable.
    fn index(&self) -> usize;
}

impl Literal for CLiteral {
    fn new(var: Var, polarity: bool) -> Self {
        debug_assert!(CLiteral::try_from(var).is_ok());
        match polarity {
            true => var as CLiteral,
            false => -(var as CLiteral),
        }
    }

    fn try_new(var: Var, polarity: bool) -> Result<Self, ErrorKind> {
        match CLiteral::try_from(var) {
            Ok(literal) if polarity => Ok(literal),
            Ok(literal) => Ok(-literal),
            Err(_) => Err(ErrorKind::UnknownVariable(var.to_string())),
        }
    }

    fn negate(&self) -> Self {
        -self
    }

    fn var(&self) -> Var {
        self.unsigned_abs()
    }

    fn polarity(&self) -> bool {
        self.is_positive()
    }

    fn index(&self) -> usize {
        2 * (self.unsigned_abs() as usize) + (*self < 0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_distinct() {
        assert_ne!(3_i32.index(), (-3_i32).index());
        assert_eq!(3_i32.index() / 2, 3);
        assert_eq!((-3_i32).index() / 2, 3);
    }

    #[test]
    fn checked_representation() {
        assert_eq!(CLiteral::try_new(5, false), Ok(-5));
        assert_eq!(CLiteral::try_new(CLiteral::MAX as Var, true), Ok(CLiteral::MAX));
        assert_eq!(
            CLiteral::try_new(Var::MAX, true),
            Err(ErrorKind::UnknownVariable(Var::MAX.to_string()))
        );
    }
}
