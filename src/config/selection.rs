/*!
Strategies for selecting the literal to decide on during a solve.

Switching strategy changes which model a solve returns, and several analyses rely on this.
For example, [core/dead](crate::analysis::core_dead) analysis solves once with [Positive](SelectionStrategy::Positive) and once with [Negative](SelectionStrategy::Negative), and compares the two models.

- [Original](SelectionStrategy::Original) chooses the most active variable, with phase saving.
- [Positive](SelectionStrategy::Positive), [Negative](SelectionStrategy::Negative), and [Random](SelectionStrategy::Random) choose the first unvalued variable of the order of the solver, with a fixed (or random) phase.
- [Fixed](SelectionStrategy::Fixed) chooses the first unvalued variable of the order of the solver, with the phase given by a literal array.
*/

/// Supported selection strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectionStrategy {
    #[default]
    Original,
    Positive,
    Negative,
    Random,
    Fixed,
}

impl SelectionStrategy {
    pub const MIN: SelectionStrategy = SelectionStrategy::Original;
    pub const MAX: SelectionStrategy = SelectionStrategy::Fixed;
}

impl std::fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Random => write!(f, "random"),
            Self::Fixed => write!(f, "fixed"),
        }
    }
}

impl std::str::FromStr for SelectionStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "original" | "org" => Ok(Self::Original),
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "random" => Ok(Self::Random),
            "fixed" => Ok(Self::Fixed),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str() {
        assert_eq!("positive".parse(), Ok(SelectionStrategy::Positive));
        assert_eq!("ORG".parse(), Ok(SelectionStrategy::Original));
        assert!("lean".parse::<SelectionStrategy>().is_err());
    }

    #[test]
    fn display_parses() {
        for strategy in [
            SelectionStrategy::Original,
            SelectionStrategy::Positive,
            SelectionStrategy::Negative,
            SelectionStrategy::Random,
            SelectionStrategy::Fixed,
        ] {
            assert_eq!(strategy.to_string().parse(), Ok(strategy));
        }
    }
}
