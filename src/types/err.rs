//! Error types used in the library.
//!
//! - [Contradiction](ErrorKind::Contradiction) is raised when a solver instance is made unsatisfiable without any assumptions, e.g. by adding an empty clause.
//! - [Cancelled](ErrorKind::Cancelled) is raised from a [monitor](crate::monitor) checkpoint and unwinds an analysis without committing partial results.
//! - [UnknownVariable](ErrorKind::UnknownVariable) and [MalformedClause](ErrorKind::MalformedClause) are programmer errors, and are never coerced into some default.
//!
//! Note, a solve which runs out of time is *not* an error.
//! Instead, [SatResult::Timeout](crate::solver::SatResult::Timeout) is returned, and callers treat this as 'unknown'.
//! [Timeout](ErrorKind::Timeout) is only used by methods which must give a definite answer.
//
//  As with the solver, err::{self} is often used to prefix use of the types with `err::`.

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The base instance (without assumptions) is unsatisfiable.
    Contradiction,

    /// Some solve did not complete within its budget, and a definite answer was required.
    Timeout,

    /// The monitor of an analysis was cancelled.
    Cancelled,

    /// A name which is not part of the variable mapping.
    UnknownVariable(String),

    /// A literal outside of the range of the variable mapping, or the zero literal.
    MalformedClause(i32),

    Parse(ParseError),
    Model(ModelError),
    Solver(SolverError),
    Job(JobError),
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contradiction => write!(f, "contradiction"),
            Self::Timeout => write!(f, "timeout"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::UnknownVariable(name) => write!(f, "unknown variable '{name}'"),
            Self::MalformedClause(literal) => write!(f, "malformed literal {literal}"),
            Self::Parse(e) => write!(f, "parse error: {e:?}"),
            Self::Model(e) => write!(f, "model error: {e:?}"),
            Self::Solver(e) => write!(f, "solver error: {e:?}"),
            Self::Job(e) => write!(f, "job error: {e:?}"),
        }
    }
}

impl std::error::Error for ErrorKind {}

/// Errors when reading a formula.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The preamble of a DIMACS file was missing or could not be read.
    ProblemSpecification,

    /// Some line could not be read, with the line number.
    Line(usize),

    /// A clause was not terminated by `0`.
    MissingDelimiter,

    /// The contents of a file could not be read.
    Io(String),
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

/// Errors in the structure of a feature model.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ModelError {
    /// Two features share a name.
    DuplicateName(String),

    /// The parent index of some feature is out of range, with the index of the feature.
    MissingParent(usize),

    /// No feature is without a parent.
    NoRoot,

    /// More than one feature is without a parent, with the index of the second.
    MultipleRoots(usize),

    /// Some feature is its own ancestor, with the index of the feature.
    Cycle(usize),
}

impl From<ModelError> for ErrorKind {
    fn from(e: ModelError) -> Self {
        ErrorKind::Model(e)
    }
}

/// Errors internal to a solver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SolverError {
    /// A key to a clause which is no longer stored.
    MissingClause,

    /// An attempt to pop from an empty assumption stack.
    EmptyAssumptions,

    /// Conflict analysis did not end on an asserting clause.
    NoAssertion,
}

impl From<SolverError> for ErrorKind {
    fn from(e: SolverError) -> Self {
        ErrorKind::Solver(e)
    }
}

/// Errors from a background job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobError {
    /// The worker thread panicked.
    Panicked,

    /// The worker thread finished without sending a result.
    Disconnected,
}

impl From<JobError> for ErrorKind {
    fn from(e: JobError) -> Self {
        ErrorKind::Job(e)
    }
}
