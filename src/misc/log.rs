/*!
Miscelanous items related to [logging](log).

Calls to the log macro are made throughout the library, always with one of the [targets] below.
So, for example, `RUST_LOG=slicer=debug` gives a summary of each eliminated variable without noise from the solver.

Note, no log implementation is provided by the library.
The cli installs [env_logger](https://docs.rs/env_logger) when built with the `log` feature.
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to [solves](crate::solver).
    pub const SOLVER: &str = "solver";

    /// Logs related to the [assumption stack](crate::solver::AdvancedSatSolver).
    pub const ASSUMPTION: &str = "assumption";

    /// Logs related to [analyses](crate::analysis).
    pub const ANALYSIS: &str = "analysis";

    /// Logs related to [redundancy](crate::analysis::redundancy).
    pub const REDUNDANCY: &str = "redundancy";

    /// Logs related to [slicing](crate::slicer).
    pub const SLICER: &str = "slicer";

    /// Logs related to the [propagator](crate::configuration::propagator).
    pub const PROPAGATOR: &str = "propagator";

    /// Logs related to the [analyzer](crate::analyzer).
    pub const ANALYZER: &str = "analyzer";

    /// Logs related to [jobs](crate::job).
    pub const JOB: &str = "job";
}
