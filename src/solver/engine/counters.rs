/// Counts for various things which count, roughly.
///
/// Counts accumulate over every solve of an engine.
#[derive(Clone, Debug, Default)]
pub struct Counters {
    /// A count of every solve.
    pub solves: usize,

    /// A count of every conflict seen during a solve.
    pub total_conflicts: usize,

    /// A count of all decisions made.
    pub total_decisions: usize,

    /// The total number of iterations through a solve.
    pub total_iterations: usize,

    /// The number of restarts.
    pub restarts: usize,

    /// A count of solves which ran out of time (or were terminated).
    pub timeouts: usize,

    /// The time taken by all solves.
    pub time: std::time::Duration,
}
