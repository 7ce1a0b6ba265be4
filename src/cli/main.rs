#[cfg(not(target_env = "msvc"))]
#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = Jemalloc;

use std::path::PathBuf;

use fm_sat::{
    analysis::{
        atomic_set::AtomicSetAnalysis,
        core_dead::CoreDeadAnalysis,
        has_solution::HasSolutionAnalysis,
        redundancy::RedundancyAnalysis,
        run_on_cnf,
        solutions::{CountSolutionsAnalysis, SolutionsAnalysis},
    },
    config::Config,
    job::LongRunningJob,
    monitor::Monitor,
    slicer::CnfSlicer,
    structures::{literal_set::LiteralSet, CNF},
    types::err::ErrorKind,
};

mod parse;
mod read;

use parse::Task;

fn main() {
    #[cfg(feature = "log")]
    env_logger::init();

    let matches = parse::cli().get_matches();
    let config = parse::config_from_args(&matches);

    let Some(task) = parse::task_from_args(&matches) else {
        println!("c No task was given.");
        std::process::exit(2);
    };

    let Some(path) = matches.get_one::<PathBuf>("path") else {
        println!("c Some path to a CNF formula is required.");
        std::process::exit(2);
    };

    println!("c Reading DIMACS file from {path:?}");
    let cnf = match read::read_formula(path) {
        Ok(cnf) => cnf,
        Err(e) => {
            println!("c {e}");
            std::process::exit(2);
        }
    };

    let job = LongRunningJob::spawn(task.name(), move |monitor| run(&task, &cnf, config, monitor));

    match job.join() {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(e) => {
            println!("c Analysis failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Runs `task` on `cnf`, giving the lines to report.
fn run(task: &Task, cnf: &CNF, config: Config, monitor: &mut Monitor) -> Result<Vec<String>, ErrorKind> {
    let variables = cnf.variables();
    let names = |literals: &LiteralSet, polarity: Option<bool>| -> Result<String, ErrorKind> {
        Ok(variables.names_of(literals, polarity)?.join(" "))
    };
    let unknown = || vec!["s UNKNOWN".to_string()];

    match task {
        Task::Valid => {
            let result = run_on_cnf(cnf, config, &mut HasSolutionAnalysis::default(), &[], monitor)?;
            Ok(match result.map(|result| result.result) {
                Some(Some(model)) => vec![
                    "s SATISFIABLE".to_string(),
                    format!("v {}", names(&model, Some(true))?),
                ],
                Some(None) => vec!["s UNSATISFIABLE".to_string()],
                None => unknown(),
            })
        }

        Task::CoreDead => {
            let result = run_on_cnf(cnf, config, &mut CoreDeadAnalysis::default(), &[], monitor)?;
            match result.and_then(|result| result.result) {
                Some(forced) => Ok(vec![
                    format!("c Core: {}", names(&forced, Some(true))?),
                    format!("c Dead: {}", names(&forced, Some(false))?),
                ]),
                None => Ok(unknown()),
            }
        }

        Task::AtomicSets => {
            let result = run_on_cnf(cnf, config, &mut AtomicSetAnalysis::default(), &[], monitor)?;
            match result.and_then(|result| result.result) {
                Some(sets) => {
                    let mut lines = Vec::with_capacity(sets.len());
                    for set in &sets {
                        lines.push(format!("c Atomic set: {}", names(set, None)?));
                    }
                    Ok(lines)
                }
                None => Ok(unknown()),
            }
        }

        Task::Count => {
            let result = run_on_cnf(cnf, config, &mut CountSolutionsAnalysis::default(), &[], monitor)?;
            Ok(match result.map(|result| result.result) {
                Some(count) if count >= 0 => vec![format!("c Solutions: {count}")],
                Some(count) => vec![format!("c Solutions: at least {}", -count - 1)],
                None => unknown(),
            })
        }

        Task::Solutions { max } => {
            let result = run_on_cnf(cnf, config, &mut SolutionsAnalysis::new(*max), &[], monitor)?;
            match result {
                Some(result) => {
                    let mut lines = Vec::with_capacity(result.result.len());
                    for solution in &result.result {
                        lines.push(format!("v {}", names(solution, Some(true))?));
                    }
                    Ok(lines)
                }
                None => Ok(unknown()),
            }
        }

        Task::Slice { remove } => {
            let sliced = CnfSlicer::new(remove).with_config(config).slice(cnf, monitor)?;
            Ok(vec![sliced.to_string().trim_end().to_string()])
        }

        Task::Redundant => {
            let base = CNF::new(cnf.shared_variables());
            let mut analysis = RedundancyAnalysis::for_clauses(cnf.clauses().iter().cloned());
            let result = run_on_cnf(&base, config, &mut analysis, &[], monitor)?;
            match result {
                Some(result) => {
                    let mut lines = Vec::with_capacity(result.result.len());
                    for index in result.result {
                        lines.push(format!("c Redundant clause {index}: {}", cnf.clauses()[index]));
                    }
                    Ok(lines)
                }
                None => Ok(unknown()),
            }
        }
    }
}
