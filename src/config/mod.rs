/*!
Configuration of a solver, and so of the analyses which use the solver.

All configuration is contained in a [Config], which a solver takes ownership of on creation.
Some values (e.g. the [time limit](Config::time_limit)) may be revised on the solver afterwards.

```rust
# use fm_sat::config::{Config, SelectionStrategy};
let mut config = Config::default();
config.time_limit.value = Some(std::time::Duration::from_millis(250));
config.selection.value = SelectionStrategy::Negative;
```
*/

mod config_option;
pub use config_option::ConfigOption;

mod selection;
pub use selection::SelectionStrategy;

use std::time::Duration;

use crate::generic::luby::LubyRepresentation;

/// Representation of variable activity.
pub type Activity = f64;

/// The default time limit of a solve, in milliseconds.
pub const DEFAULT_TIME_LIMIT_MS: u64 = 1000;

/// The primary configuration structure.
#[derive(Clone, Debug)]
pub struct Config {
    /// The factor by which the activity bump grows after each conflict, i.e. the inverse of the decay of activity.
    pub activity_decay: ConfigOption<Activity>,

    /// The `u` value to multiply the luby sequence by when determining whether to perform a restart.
    pub luby_u: ConfigOption<LubyRepresentation>,

    /// Default to the last set value of a variable when deciding with the [Original](SelectionStrategy::Original) strategy.
    pub phase_saving: ConfigOption<bool>,

    /// The seed of the source of randomness.
    pub random_seed: ConfigOption<u64>,

    /// Permit (scheduled) restarts.
    pub restart: ConfigOption<bool>,

    /// The initial selection strategy.
    pub selection: ConfigOption<SelectionStrategy>,

    /// The number of recent solutions kept by an advanced solver.
    pub solution_buffer: ConfigOption<usize>,

    /// The time limit for a single solve, if any.
    pub time_limit: ConfigOption<Option<Duration>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            activity_decay: ConfigOption {
                name: "activity_decay",
                min: 1.0,
                max: 2.0,
                value: 1.0 / 0.95,
            },

            luby_u: ConfigOption {
                name: "luby",
                min: LubyRepresentation::MIN + 1,
                max: LubyRepresentation::MAX,
                value: 128,
            },

            phase_saving: ConfigOption {
                name: "phase_saving",
                min: false,
                max: true,
                value: true,
            },

            random_seed: ConfigOption {
                name: "random_seed",
                min: u64::MIN,
                max: u64::MAX,
                value: 0,
            },

            restart: ConfigOption {
                name: "restart",
                min: false,
                max: true,
                value: true,
            },

            selection: ConfigOption {
                name: "selection",
                min: SelectionStrategy::MIN,
                max: SelectionStrategy::MAX,
                value: SelectionStrategy::Original,
            },

            solution_buffer: ConfigOption {
                name: "solution_buffer",
                min: 0,
                max: usize::MAX,
                value: 1000,
            },

            time_limit: ConfigOption {
                name: "time_limit",
                min: None,
                max: Some(Duration::MAX),
                value: Some(Duration::from_millis(DEFAULT_TIME_LIMIT_MS)),
            },
        }
    }
}

impl Config {
    /// A configuration without a time limit, e.g. for tests which must not time out.
    pub fn unbounded() -> Self {
        let mut config = Config::default();
        config.time_limit.value = None;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp() {
        let mut config = Config::default();
        config.activity_decay.set(4.0);
        assert_eq!(config.activity_decay.value, 2.0);
        config.luby_u.set(0);
        assert_eq!(config.luby_u.value, 1);
    }

    #[test]
    fn unbounded() {
        assert!(Config::unbounded().time_limit.value.is_none());
        assert_eq!(
            Config::default().time_limit.value,
            Some(Duration::from_millis(1000))
        );
    }
}
