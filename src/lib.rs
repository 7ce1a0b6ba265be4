//! A library for the analysis of feature models through satisfiability.
//!
//! fm_sat translates a feature model (a tree of features with cross-tree constraints) to a formula in conjunctive normal form, and answers questions about the model by incremental solves of the formula.
//! For example: whether the model has any valid configuration, which features are core or dead, which constraints are redundant, and which features of a partial configuration are forced.
//!
//! # Orientation
//!
//! The library is layered, from formulas up to feature models:
//! - [Structures](structures) for variables, literals, and [CNF](structures::CNF) formulas.
//!   A CNF owns a mapping from feature names to variables, and formulas over different mappings are related by name.
//! - [Solvers](solver) built from a CNF.
//!   The [advanced solver](solver::AdvancedSatSolver) keeps a stack of assumptions, and every analysis runs under the assumptions on the stack.
//!   Solves are built on a small conflict-driven clause-learning engine, bounded by the [time limit](config::Config::time_limit).
//! - [Analyses](analysis) such as core/dead features, atomic sets, redundant clauses, and the causes of each.
//! - The [slicer], to remove variables from a formula while keeping every implication between the others.
//! - [Feature models](model), their translation to formulas, and a cache of derived formulas.
//! - The [analyzer], caching each analysis of a feature model until reset, and the [configuration] propagator, for the interactive completion of a configuration.
//!
//! Long running work may be cancelled through a [monitor], and may be run on a worker thread as a [job].
//!
//! A timeout is never read as unsatisfiability.
//! Instead, each analysis documents what it does on a timeout, and a question which cannot be answered within the limit is answered with None.
//!
//! # Examples
//!
//! + Core and dead features of a CNF, with variables named by features.
//!
//! ```rust
//! # use std::sync::Arc;
//! # use fm_sat::{analysis::{run_on_cnf, core_dead::CoreDeadAnalysis}, config::Config, monitor::Monitor};
//! use fm_sat::structures::{variables::Variables, CNF};
//!
//! // Root, with Root ⇒ Engine and Turbo ⇒ ¬Engine.
//! let variables = Arc::new(Variables::new(["Root", "Engine", "Turbo"]));
//! let cnf = CNF::from_clauses(variables, [vec![1], vec![-1, 2], vec![-3, -2]]).unwrap();
//!
//! let result = run_on_cnf(&cnf, Config::default(), &mut CoreDeadAnalysis::default(), &[], &mut Monitor::default())
//!     .unwrap()
//!     .and_then(|result| result.result)
//!     .unwrap();
//!
//! let core = cnf.variables().names_of(&result, Some(true)).unwrap();
//! let dead = cnf.variables().names_of(&result, Some(false)).unwrap();
//! assert_eq!(core, vec!["Root", "Engine"]);
//! assert_eq!(dead, vec!["Turbo"]);
//! ```
//!
//! + Propagation of a partial configuration.
//!
//! ```rust
//! # use std::sync::Arc;
//! # use fm_sat::{configuration::{Configuration, Selection, propagator::ConfigurationPropagator}, monitor::Monitor};
//! # use fm_sat::model::{Feature, FeatureModel, formula::FeatureModelFormula};
//! # use fm_sat::structures::expr::Expr;
//! let mut model = FeatureModel::default();
//! let root = model.add_feature(Feature::root("Car"));
//! model.add_feature(Feature::child("Radio", root));
//! model.add_feature(Feature::child("Speakers", root));
//! model.add_constraint(Expr::var("Radio").implies(Expr::var("Speakers")));
//!
//! let formula = Arc::new(FeatureModelFormula::new(model).unwrap());
//! let configuration = Configuration::new(formula.shared_model());
//! let mut propagator = ConfigurationPropagator::new(formula, configuration);
//!
//! propagator.configuration_mut().set_manual("Radio", Selection::Selected).unwrap();
//! propagator.resolve(&mut Monitor::default()).unwrap();
//!
//! let speakers = propagator.configuration().feature("Speakers").unwrap();
//! assert_eq!(speakers.selection(), Selection::Selected);
//! ```
//!
//! # Logs
//!
//! Calls to [log!](log) are made throughout, each with one of the targets listed in [misc::log].
//! No logger is installed by the library.
//!
//! For example, when used with [env_logger](https://docs.rs/env_logger/latest/env_logger/):
//! - Each eliminated variable of a slice can be found with `RUST_LOG=slicer=debug …`
//! - Each redundant constraint can be found with `RUST_LOG=redundancy=debug …`

#![allow(clippy::single_match)]
#![allow(clippy::collapsible_else_if)]

pub mod analysis;
pub mod analyzer;
pub mod slicer;

pub mod config;
pub mod configuration;
pub mod model;
pub mod structures;
pub mod types;

pub mod generic;
pub mod solver;

pub mod job;
pub mod misc;
pub mod monitor;
