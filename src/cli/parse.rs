use std::{path::PathBuf, time::Duration};

use clap::{value_parser, Arg, ArgMatches, Command};

use fm_sat::config::{self, Config, SelectionStrategy};

pub fn cli() -> Command {
    Command::new("fm_cli")
        .about("Analyses a formula given in DIMACS form, with variables named by 'c <variable> <name>' comments")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)

        .arg(Arg::new("path")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("The DIMACS form CNF file to analyse."))

        .arg(Arg::new("time_limit")
            .long("time-limit")
            .short('t')
            .value_name("MILLISECONDS")
            .value_parser(value_parser!(u64))
            .required(false)
            .num_args(1)
            .global(true)
            .help(format!("Time limit for a single solve, in milliseconds.
Default: {}

A limit of 0 removes the limit.", config::DEFAULT_TIME_LIMIT_MS)))

        .arg(Arg::new("strategy")
            .long("strategy")
            .value_parser(["original", "positive", "negative", "random"])
            .required(false)
            .num_args(1)
            .global(true)
            .help("The initial strategy for choosing a literal to decide on.")
            .long_help("The initial strategy for choosing a literal to decide on.
Default: original

original: The most active variable, with the last value it was given.
positive: The first unvalued variable, valued true.
negative: The first unvalued variable, valued false.
random: The first unvalued variable, with a random value."))

        .arg(Arg::new("seed")
            .long("seed")
            .value_parser(value_parser!(u64))
            .required(false)
            .num_args(1)
            .global(true)
            .help("The seed of the source of randomness."))

        .subcommand(Command::new("valid")
            .about("Determines whether the formula has a model."))

        .subcommand(Command::new("core-dead")
            .about("Lists the variables true in every model and false in every model."))

        .subcommand(Command::new("atomic-sets")
            .about("Partitions the variables into sets which are equal in every model."))

        .subcommand(Command::new("count")
            .about("Counts the models of the formula.")
            .long_about("Counts the models of the formula.
If some solve times out after n models the count is reported as at least n."))

        .subcommand(Command::new("solutions")
            .about("Lists models of the formula, by the names of the true variables.")
            .arg(Arg::new("max")
                .long("max")
                .short('m')
                .value_parser(value_parser!(usize))
                .required(false)
                .num_args(1)
                .default_value("10")
                .help("The most models to list.")))

        .subcommand(Command::new("slice")
            .about("Removes variables from the formula, keeping every implication between the others, and writes the result in DIMACS form.")
            .arg(Arg::new("remove")
                .long("remove")
                .short('r')
                .value_name("NAMES")
                .required(true)
                .num_args(1..)
                .value_delimiter(',')
                .help("The names of the variables to remove, separated by commas.")))

        .subcommand(Command::new("redundant")
            .about("Lists clauses implied by the other clauses of the formula."))
}

/// The work asked for by a subcommand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    Valid,
    CoreDead,
    AtomicSets,
    Count,
    Solutions { max: usize },
    Slice { remove: Vec<String> },
    Redundant,
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::CoreDead => "core-dead",
            Self::AtomicSets => "atomic-sets",
            Self::Count => "count",
            Self::Solutions { .. } => "solutions",
            Self::Slice { .. } => "slice",
            Self::Redundant => "redundant",
        }
    }
}

pub fn task_from_args(args: &ArgMatches) -> Option<Task> {
    match args.subcommand()? {
        ("valid", _) => Some(Task::Valid),
        ("core-dead", _) => Some(Task::CoreDead),
        ("atomic-sets", _) => Some(Task::AtomicSets),
        ("count", _) => Some(Task::Count),

        ("solutions", sub_args) => {
            let max = match sub_args.try_get_one::<usize>("max") {
                Ok(Some(max)) => *max,
                _ => 10,
            };
            Some(Task::Solutions { max })
        }

        ("slice", sub_args) => {
            let remove = match sub_args.try_get_many::<String>("remove") {
                Ok(Some(names)) => names.cloned().collect(),
                _ => Vec::default(),
            };
            Some(Task::Slice { remove })
        }

        ("redundant", _) => Some(Task::Redundant),

        _ => None,
    }
}

pub fn config_from_args(args: &ArgMatches) -> Config {
    let mut the_config = Config::default();

    if let Ok(Some(millis)) = args.try_get_one::<u64>("time_limit") {
        the_config.time_limit.value = match millis {
            0 => None,
            _ => Some(Duration::from_millis(*millis)),
        };
    };

    if let Ok(Some(strategy)) = args.try_get_one::<String>("strategy") {
        if let Ok(strategy) = strategy.parse::<SelectionStrategy>() {
            the_config.selection.value = strategy
        }
    };

    if let Ok(Some(seed)) = args.try_get_one::<u64>("seed") {
        the_config.random_seed.value = *seed
    };

    the_config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options() {
        let matches = cli()
            .try_get_matches_from(["fm_cli", "model.cnf", "count", "--time-limit", "0", "--strategy", "negative"])
            .unwrap();
        let config = config_from_args(&matches);
        assert_eq!(config.time_limit.value, None);
        assert_eq!(config.selection.value, SelectionStrategy::Negative);
        assert_eq!(task_from_args(&matches), Some(Task::Count));
    }

    #[test]
    fn slice_names() {
        let matches = cli()
            .try_get_matches_from(["fm_cli", "model.cnf", "slice", "--remove", "A,B", "C"])
            .unwrap();
        assert_eq!(
            task_from_args(&matches),
            Some(Task::Slice {
                remove: vec!["A".to_string(), "B".to_string(), "C".to_string()]
            })
        );
    }

    #[test]
    fn subcommand_required() {
        assert!(cli().try_get_matches_from(["fm_cli", "model.cnf"]).is_err());
    }
}
