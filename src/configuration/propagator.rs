/*!
Propagation of manual selections to automatic selections, and the other questions asked of a configuration.

# Formulas

On [load](ConfigurationPropagator::load) the propagator takes two formulas from a [FeatureModelFormula]:
- *clauses*, the complete formula (or, unless abstract features are configured, the formula with abstract features sliced away).
- *clauses without hidden*, the same formula with hidden features also sliced away.

Each operation makes a fresh solver over one of these, with the current selections pushed as assumptions.
So, an operation never sees the state of another.

# Propagation

[resolve](ConfigurationPropagator::resolve) clears the automatic selections, drops manual selections which conflict with earlier manual selections, and then sets the automatic selection of each feature forced by the remaining manual selections.

[update](ConfigurationPropagator::update) computes the same automatic selections, though walks the features from a given feature so that features near a recent edit are updated first.
It may also flag manual selections which are implied by the other manual selections, by setting the automatic selection to the manual selection.

In either case, if the formula itself is unsatisfiable nothing is set, and the [report](UpdateReport) notes the contradiction.
*/

use std::{sync::Arc, time::Duration};

use crate::{
    analysis::{
        core_dead::find_forced,
        execute,
        has_solution::HasSolutionAnalysis,
        solutions::{CountSolutionsAnalysis, OneWiseCoverage, SolutionsAnalysis},
        update_solution,
    },
    config::{Config, SelectionStrategy},
    configuration::{Configuration, SelectableFeature, Selection},
    misc::log::targets::{self},
    model::formula::{CnfVariant, FeatureModelFormula},
    monitor::Monitor,
    solver::{AdvancedSatSolver, SatResult},
    structures::{
        literal::{CLiteral, Literal},
        literal_set::LiteralSet,
        CNF,
    },
    types::err::ErrorKind,
};

/// The outcome of a propagation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// The formula is unsatisfiable, regardless of any selection.
    pub contradiction: bool,

    /// Features whose manual selection was cleared, as it conflicted with earlier manual selections.
    pub rolled_back: Vec<String>,
}

#[derive(Clone)]
struct Loaded {
    clauses: Arc<CNF>,
    without_hidden: Arc<CNF>,
}

pub struct ConfigurationPropagator {
    formula: Arc<FeatureModelFormula>,
    configuration: Configuration,
    loaded: Option<Loaded>,
    config: Config,
}

/// True if `feature` is part of the formula with or without hidden features, as given by `consider_hidden`.
fn relevant(feature: &SelectableFeature, ignore_abstract: bool, consider_hidden: bool) -> bool {
    (ignore_abstract || !feature.is_abstract()) && (consider_hidden || !feature.is_hidden())
}

fn names_of_selected(cnf: &CNF, sets: &[LiteralSet]) -> Result<Vec<Vec<String>>, ErrorKind> {
    sets.iter()
        .map(|set| cnf.variables().names_of(set, Some(true)))
        .collect()
}

impl ConfigurationPropagator {
    pub fn new(formula: Arc<FeatureModelFormula>, configuration: Configuration) -> Self {
        ConfigurationPropagator {
            formula,
            configuration,
            loaded: None,
            config: Config::default(),
        }
    }

    /// The configuration of each solver made by the propagator.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut Configuration {
        &mut self.configuration
    }

    pub fn into_configuration(self) -> Configuration {
        self.configuration
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// The formula without hidden features, if loaded.
    ///
    /// Open clauses are over the mapping of this formula.
    pub fn clauses_without_hidden(&self) -> Option<&CNF> {
        self.loaded.as_ref().map(|loaded| loaded.without_hidden.as_ref())
    }

    /// Takes the formulas used by the propagator from the feature model formula, slicing if required.
    ///
    /// Each other operation loads on first use.
    pub fn load(&mut self, monitor: &mut Monitor) -> Result<(), ErrorKind> {
        self.loaded(monitor).map(|_| ())
    }

    fn loaded(&mut self, monitor: &mut Monitor) -> Result<Loaded, ErrorKind> {
        if let Some(loaded) = &self.loaded {
            return Ok(loaded.clone());
        }

        let (with_hidden, without_hidden) = match self.configuration.ignore_abstract() {
            true => (CnfVariant::Complete, CnfVariant::NoHidden),
            false => (CnfVariant::NoAbstract, CnfVariant::NoHiddenNoAbstract),
        };
        let loaded = Loaded {
            clauses: self.formula.cnf_variant(with_hidden, monitor)?,
            without_hidden: self.formula.cnf_variant(without_hidden, monitor)?,
        };
        log::info!(target: targets::PROPAGATOR,
            "Loaded {} clauses, {} without hidden features",
            loaded.clauses.clauses().len(),
            loaded.without_hidden.clauses().len()
        );

        self.loaded = Some(loaded.clone());
        Ok(loaded)
    }

    /// A fresh solver over `cnf`, with the selection of each relevant feature pushed.
    ///
    /// A feature is relevant if defined (or if `deselect_undefined`, in which case it is pushed as unselected), configurable, and either visible or `consider_hidden`.
    fn solver_for(
        &self,
        cnf: &CNF,
        deselect_undefined: bool,
        consider_hidden: bool,
        monitor: &Monitor,
    ) -> Result<AdvancedSatSolver, ErrorKind> {
        let mut solver = AdvancedSatSolver::with_config(cnf, self.config.clone())?;
        solver.set_callback_terminate(monitor.terminate_callback());

        let ignore_abstract = self.configuration.ignore_abstract();
        for feature in self.configuration.features() {
            let selection = feature.selection();
            if (deselect_undefined || selection != Selection::Undefined)
                && relevant(feature, ignore_abstract, consider_hidden)
                && cnf.variables().contains(feature.name())
            {
                let literal = cnf
                    .variables()
                    .literal(feature.name(), selection == Selection::Selected)?;
                solver.assignment_push(literal)?;
            }
        }
        Ok(solver)
    }

    /// A fresh solver over the formula with hidden features if `consider_hidden`, and otherwise without, with the current selections pushed.
    ///
    /// Fails with [Contradiction](ErrorKind::Contradiction) if the formula is unsatisfiable.
    pub fn solver_for_current_configuration(
        &mut self,
        deselect_undefined: bool,
        consider_hidden: bool,
        monitor: &mut Monitor,
    ) -> Result<AdvancedSatSolver, ErrorKind> {
        let loaded = self.loaded(monitor)?;
        let cnf = match consider_hidden {
            true => &loaded.clauses,
            false => &loaded.without_hidden,
        };
        self.solver_for(cnf, deselect_undefined, consider_hidden, monitor)
    }

    /// Whether the current solver has a model, or None on a timeout.
    fn satisfiable(
        &mut self,
        deselect_undefined: bool,
        consider_hidden: bool,
        monitor: &mut Monitor,
    ) -> Result<Option<bool>, ErrorKind> {
        let mut solver =
            match self.solver_for_current_configuration(deselect_undefined, consider_hidden, monitor) {
                Ok(solver) => solver,
                Err(ErrorKind::Contradiction) => return Ok(Some(false)),
                Err(e) => return Err(e),
            };

        match execute(&mut HasSolutionAnalysis::default(), &mut solver, &[], monitor) {
            Ok(result) => Ok(Some(result.result.is_some())),
            Err(ErrorKind::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// True if some completion of the current selections is valid.
    pub fn can_be_valid(&mut self, monitor: &mut Monitor) -> Result<Option<bool>, ErrorKind> {
        self.satisfiable(false, true, monitor)
    }

    /// True if the configuration, with each undefined feature unselected, is valid.
    pub fn is_valid(&mut self, monitor: &mut Monitor) -> Result<Option<bool>, ErrorKind> {
        self.satisfiable(true, true, monitor)
    }

    /// As [is_valid](ConfigurationPropagator::is_valid), ignoring hidden features.
    pub fn is_valid_no_hidden(&mut self, monitor: &mut Monitor) -> Result<Option<bool>, ErrorKind> {
        self.satisfiable(true, false, monitor)
    }

    /// Pushes the manual selection of each relevant feature to a fresh solver over `cnf`, clearing each selection which conflicts with those before.
    ///
    /// A selection which times out is also cleared.
    /// Returns the solver, with the remaining manual selections pushed, and the names of cleared features.
    /// None if `cnf` is unsatisfiable.
    fn roll_back_manual(
        &mut self,
        cnf: &CNF,
        consider_hidden: bool,
        monitor: &mut Monitor,
    ) -> Result<Option<(AdvancedSatSolver, Vec<String>)>, ErrorKind> {
        let mut solver = match AdvancedSatSolver::with_config(cnf, self.config.clone()) {
            Ok(solver) => solver,
            Err(ErrorKind::Contradiction) => return Ok(None),
            Err(e) => return Err(e),
        };
        solver.set_callback_terminate(monitor.terminate_callback());
        if solver.has_solution()? == SatResult::Unsatisfiable {
            return Ok(None);
        }

        let ignore_abstract = self.configuration.ignore_abstract();
        let mut rolled_back = Vec::new();
        for feature in self.configuration.features_mut() {
            if feature.manual() == Selection::Undefined
                || !relevant(feature, ignore_abstract, consider_hidden)
            {
                continue;
            }
            let Ok(literal) = cnf
                .variables()
                .literal(feature.name(), feature.manual() == Selection::Selected)
            else {
                continue;
            };
            monitor.step()?;

            solver.assignment_push(literal)?;
            match solver.has_solution()? {
                SatResult::Satisfiable => {}
                SatResult::Unsatisfiable | SatResult::Timeout => {
                    solver.assignment_pop()?;
                    log::info!(target: targets::PROPAGATOR, "Rolled back manual selection of {}", feature.name());
                    feature.set_manual(Selection::Undefined);
                    rolled_back.push(feature.name().to_string());
                }
            }
        }
        Ok(Some((solver, rolled_back)))
    }

    /// Sets the automatic selection of each feature forced by the manual selections.
    pub fn resolve(&mut self, monitor: &mut Monitor) -> Result<UpdateReport, ErrorKind> {
        let loaded = self.loaded(monitor)?;
        self.configuration.reset_automatic_values();
        let mut report = UpdateReport::default();

        let Some((mut solver, rolled_back)) =
            self.roll_back_manual(&loaded.without_hidden, false, monitor)?
        else {
            log::info!(target: targets::PROPAGATOR, "Unsatisfiable formula");
            report.contradiction = true;
            return Ok(report);
        };
        report.rolled_back = rolled_back;

        let Some(forced) = find_forced(&mut solver, None, monitor)? else {
            log::debug!(target: targets::PROPAGATOR, "No model found for the manual selections");
            return Ok(report);
        };

        let variables = loaded.without_hidden.variables();
        for literal in forced.iter() {
            self.configuration
                .feature_mut(variables.name(literal)?)?
                .set_automatic(Selection::of_literal(literal));
        }
        log::debug!(target: targets::PROPAGATOR, "Resolved {} features", forced.len());
        Ok(report)
    }

    /// Sets the automatic selection of each feature forced by the manual selections, starting from the feature named `start` (if any).
    ///
    /// If `redundant_manual`, a manual selection implied by the other manual selections is flagged by an automatic selection equal to the manual selection.
    pub fn update(
        &mut self,
        redundant_manual: bool,
        start: Option<&str>,
        monitor: &mut Monitor,
    ) -> Result<UpdateReport, ErrorKind> {
        let loaded = self.loaded(monitor)?;
        self.configuration.reset_automatic_values();
        monitor.set_remaining_work(self.configuration.features().len() + 3);
        let mut report = UpdateReport::default();

        let mut solver = match self.solver_for(&loaded.clauses, false, true, monitor) {
            Ok(solver) => solver,
            Err(ErrorKind::Contradiction) => {
                report.contradiction = true;
                return Ok(report);
            }
            Err(e) => return Err(e),
        };
        monitor.step()?;

        solver.set_selection_strategy(SelectionStrategy::Positive);
        let model = match solver.find_solution()? {
            Some(model) => model,
            None => match self.roll_back_manual(&loaded.clauses, true, monitor)? {
                None => {
                    report.contradiction = true;
                    return Ok(report);
                }
                Some((_, rolled_back)) if rolled_back.is_empty() => {
                    log::debug!(target: targets::PROPAGATOR, "No model found for the manual selections");
                    return Ok(report);
                }
                Some((rolled_solver, rolled_back)) => {
                    report.rolled_back = rolled_back;
                    solver = rolled_solver;
                    solver.set_selection_strategy(SelectionStrategy::Positive);
                    match solver.find_solution()? {
                        Some(model) => model,
                        None => return Ok(report),
                    }
                }
            },
        };
        monitor.step()?;

        solver.set_selection_strategy(SelectionStrategy::Negative);
        let other = solver.find_solution()?;

        let variables = loaded.clauses.variables();
        let mut candidates: Vec<CLiteral> = vec![0; model.len()];
        for feature in self.configuration.features() {
            if feature.selection() != Selection::Undefined {
                continue;
            }
            if let Ok(var) = variables.variable(feature.name()) {
                candidates[var as usize - 1] = model[var as usize - 1];
            }
        }

        let manual: Vec<CLiteral> = solver.assignments().to_vec();
        let mut manual_position: Vec<Option<usize>> = vec![None; model.len()];
        for (position, literal) in manual.iter().enumerate() {
            let index = literal.var() as usize - 1;
            candidates[index] = 0;
            if redundant_manual {
                manual_position[index] = Some(position);
            }
        }
        if let Some(other) = other {
            update_solution(&mut candidates, &other);
        }
        solver.set_selection_strategy(SelectionStrategy::Positive);
        monitor.step()?;

        let count = self.configuration.features().len();
        let start = start
            .and_then(|name| {
                self.configuration
                    .features()
                    .iter()
                    .position(|feature| feature.name() == name)
            })
            .unwrap_or(0);

        for offset in 0..count {
            monitor.step()?;
            let feature = &mut self.configuration.features_mut()[(start + offset) % count];
            let Ok(var) = variables.variable(feature.name()) else {
                continue;
            };
            let index = var as usize - 1;

            if let Some(position) = manual_position[index] {
                let mut flipped = manual.clone();
                flipped[position] = -flipped[position];

                // The check is against the manual selections alone.
                let stack = solver.assignments().to_vec();
                solver.assignment_clear(0);
                let result = solver.has_solution_with(&flipped);
                solver.assignment_push_all(&stack)?;

                if result? == SatResult::Unsatisfiable {
                    feature.set_automatic(Selection::of_literal(manual[position]));
                }
                continue;
            }

            let literal = candidates[index];
            if literal == 0 {
                continue;
            }
            solver.assignment_push(-literal)?;
            match solver.has_solution()? {
                SatResult::Unsatisfiable => {
                    solver.assignment_replace_last(literal)?;
                    feature.set_automatic(Selection::of_literal(literal));
                }
                SatResult::Timeout => {
                    solver.assignment_pop()?;
                }
                SatResult::Satisfiable => {
                    solver.assignment_pop()?;
                    let solution = solver.solution().to_vec();
                    update_solution(&mut candidates, &solution);
                    solver.set_order_shuffle();
                }
            }
        }

        log::debug!(target: targets::PROPAGATOR,
            "Updated from {start}, with {} manual selections",
            manual.len()
        );
        Ok(report)
    }

    /// Counts the completions of the current selections, without hidden features.
    ///
    /// Each solve is limited by `time_limit`, and a count cut short by a timeout after *n* completions is -(*n* + 1).
    pub fn number(
        &mut self,
        time_limit: Option<Duration>,
        monitor: &mut Monitor,
    ) -> Result<i64, ErrorKind> {
        let mut solver = match self.solver_for_current_configuration(false, false, monitor) {
            Ok(solver) => solver,
            Err(ErrorKind::Contradiction) => return Ok(0),
            Err(e) => return Err(e),
        };
        solver.set_time_limit(time_limit);
        let count = execute(&mut CountSolutionsAnalysis::default(), &mut solver, &[], monitor)?;
        Ok(count.result)
    }

    /// Up to `max` completions of the current selections, each as the names of selected features.
    pub fn get_solutions(
        &mut self,
        max: usize,
        monitor: &mut Monitor,
    ) -> Result<Vec<Vec<String>>, ErrorKind> {
        let mut solver = match self.solver_for_current_configuration(false, false, monitor) {
            Ok(solver) => solver,
            Err(ErrorKind::Contradiction) => return Ok(Vec::default()),
            Err(e) => return Err(e),
        };
        let solutions = execute(&mut SolutionsAnalysis::new(max), &mut solver, &[], monitor)?;
        names_of_selected(solver.cnf(), &solutions.result)
    }

    /// Completions of the current selections which together give each of `features` the selection `selection`, where possible.
    pub fn cover_features(
        &mut self,
        features: &[&str],
        selection: bool,
        monitor: &mut Monitor,
    ) -> Result<Vec<Vec<String>>, ErrorKind> {
        let mut solver = match self.solver_for_current_configuration(false, false, monitor) {
            Ok(solver) => solver,
            Err(ErrorKind::Contradiction) => return Ok(Vec::default()),
            Err(e) => return Err(e),
        };

        let mut literals = Vec::with_capacity(features.len());
        for name in features {
            literals.push(solver.cnf().variables().literal(name, selection)?);
        }
        let mut coverage = OneWiseCoverage::new(literals);
        let configurations = execute(&mut coverage, &mut solver, &[], monitor)?;
        names_of_selected(solver.cnf(), &configurations.result)
    }

    /// The clauses of the formula without hidden features not satisfied by the current selections, with each undefined feature read as unselected.
    ///
    /// Only clauses which mention some feature not mentioned by an earlier open clause are returned.
    /// For each such feature, the selection which would satisfy the clause is recommended, and the clause is recorded as open for the feature.
    /// The recommendations and open clauses of `open_features` are cleared first.
    pub fn find_open_clauses(
        &mut self,
        open_features: &[&str],
        monitor: &mut Monitor,
    ) -> Result<Vec<LiteralSet>, ErrorKind> {
        let loaded = self.loaded(monitor)?;
        for name in open_features {
            let feature = self.configuration.feature_mut(name)?;
            feature.set_recommended(Selection::Undefined);
            feature.clear_open_clauses();
        }

        let cnf = &loaded.without_hidden;
        let variables = cnf.variables();
        let mut marked = vec![false; variables.size() + 1];
        let mut open_clauses: Vec<LiteralSet> = Vec::new();
        monitor.set_remaining_work(cnf.clauses().len());

        'clauses: for clause in cnf.clauses() {
            monitor.step()?;

            let mut selections = Vec::with_capacity(clause.len());
            for literal in clause.iter() {
                let selection = self.configuration.feature(variables.name(literal)?)?.selection();
                let satisfied = match selection {
                    Selection::Selected => literal > 0,
                    Selection::Unselected | Selection::Undefined => literal < 0,
                };
                if satisfied {
                    continue 'clauses;
                }
                selections.push((literal, selection));
            }

            let mut new_literals = false;
            for (literal, selection) in selections {
                let var = literal.var() as usize;
                if marked[var] {
                    continue;
                }
                marked[var] = true;
                new_literals = true;

                let feature = self.configuration.feature_mut(variables.name(literal)?)?;
                feature.set_recommended(match selection {
                    Selection::Selected => Selection::Unselected,
                    Selection::Unselected | Selection::Undefined => Selection::Selected,
                });
                feature.add_open_clause(open_clauses.len(), clause.clone());
            }

            if new_literals {
                open_clauses.push(clause.clone());
            }
        }

        log::debug!(target: targets::PROPAGATOR, "{} open clauses", open_clauses.len());
        Ok(open_clauses)
    }
}
