/*!
Analyses of a feature model, with results cached until [reset](FeatureModelAnalyzer::reset).

An analyzer owns a [FeatureModelFormula] snapshot.
Each [kind](AnalysisKind) of analysis is run at most once per snapshot, on request, through a registry of factory functions.
A factory builds the analysis for the snapshot, picks the formula it runs on, and wraps the output as an [AnalysisOutput].

| Kind                    | Formula          | Analysis                                                        |
|-------------------------|------------------|-----------------------------------------------------------------|
| Validity                | complete         | [HasSolutionAnalysis]                                           |
| CoreDead                | complete         | [CoreDeadAnalysis]                                              |
| AtomicSets              | complete         | [AtomicSetAnalysis]                                             |
| FalseOptional           | complete         | [ImplicationAnalysis], parent to child of each optional feature |
| Determined              | complete         | [DeterminedAnalysis], over hidden features                      |
| RedundantConstraints    | tree only        | [RedundancyAnalysis], over constraint groups                    |
| TautologicalConstraints | empty            | [TautologyAnalysis], over constraint groups                     |
| VoidCause               | tree only        | The first constraint group after which the formula is void      |
| DeadCauses              | tree only        | [CoreDeadCauseAnalysis], of dead features                       |
| FalseOptionalCauses     | tree only        | [RedundancyCauseAnalysis], of false-optional features           |

# Snapshots

[reset](FeatureModelAnalyzer::reset) cancels any analysis in progress, clears every cached result and side table, and starts a new generation.
A result computed for an earlier generation is never cached, and is returned as [Cancelled](ErrorKind::Cancelled).

The analyzer may be shared between threads.
No lock is held while an analysis runs.

```rust
# use std::sync::Arc;
# use fm_sat::{analyzer::FeatureModelAnalyzer, model::{Feature, FeatureModel, formula::FeatureModelFormula}};
# use fm_sat::structures::expr::Expr;
let mut model = FeatureModel::default();
let root = model.add_feature(Feature::root("A"));
model.add_feature(Feature::child("B", root));
model.add_feature(Feature::child("C", root));
model.add_constraint(Expr::var("C").implies(Expr::var("B").not()));
model.add_constraint(Expr::var("C"));

let analyzer = FeatureModelAnalyzer::new(Arc::new(FeatureModelFormula::new(model).unwrap()));
assert_eq!(analyzer.is_valid(), Ok(Some(true)));
assert_eq!(analyzer.core_features(), Ok(Some(vec!["A".to_string(), "C".to_string()])));
assert_eq!(analyzer.dead_features(), Ok(Some(vec!["B".to_string()])));
```
*/

pub mod properties;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    analysis::{
        atomic_set::AtomicSetAnalysis,
        cause::{attribute, CoreDeadCauseAnalysis, GroupOrder, RedundancyCauseAnalysis},
        core_dead::CoreDeadAnalysis,
        determined::DeterminedAnalysis,
        has_solution::HasSolutionAnalysis,
        implication::{Implication, ImplicationAnalysis},
        redundancy::{RedundancyAnalysis, TautologyAnalysis},
        run_on_cnf, Analysis,
    },
    config::Config,
    misc::log::targets::{self},
    model::{
        formula::{lock, CnfVariant, FeatureModelFormula},
        FeatureModel,
    },
    monitor::{CancelHandle, Monitor},
    solver::AdvancedSatSolver,
    structures::{
        literal::{CLiteral, Literal, Var},
        literal_set::LiteralSet,
        CNF,
    },
    types::err::ErrorKind,
};

use properties::{
    AnalysisReport, ConstraintProperties, ConstraintStatus, FeatureProperties, FeatureStatus,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Validity,
    CoreDead,
    AtomicSets,
    FalseOptional,
    Determined,
    RedundantConstraints,
    TautologicalConstraints,
    VoidCause,
    DeadCauses,
    FalseOptionalCauses,
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validity => write!(f, "validity"),
            Self::CoreDead => write!(f, "core-dead"),
            Self::AtomicSets => write!(f, "atomic-sets"),
            Self::FalseOptional => write!(f, "false-optional"),
            Self::Determined => write!(f, "determined"),
            Self::RedundantConstraints => write!(f, "redundant-constraints"),
            Self::TautologicalConstraints => write!(f, "tautological-constraints"),
            Self::VoidCause => write!(f, "void-cause"),
            Self::DeadCauses => write!(f, "dead-causes"),
            Self::FalseOptionalCauses => write!(f, "false-optional-causes"),
        }
    }
}

/// The output of some kind of analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalysisOutput {
    /// A model, if any.
    Model(Option<LiteralSet>),

    /// Literals, if found.
    Literals(Option<LiteralSet>),

    /// A partition of literals, if found.
    Partition(Option<Vec<LiteralSet>>),

    /// Indices of features or constraints, by the kind of analysis.
    Indices(Vec<usize>),

    /// Literals attributed to each constraint.
    LiteralCauses(Vec<Option<LiteralSet>>),

    /// Clauses attributed to each constraint.
    ClauseCauses(Vec<Option<Vec<LiteralSet>>>),
}

/// Runs some kind of analysis on a snapshot.
///
/// Ok(None) is no result.
type Factory = fn(
    &FeatureModelAnalyzer,
    &FeatureModelFormula,
    &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind>;

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 10] = [
        AnalysisKind::Validity,
        AnalysisKind::CoreDead,
        AnalysisKind::AtomicSets,
        AnalysisKind::FalseOptional,
        AnalysisKind::Determined,
        AnalysisKind::RedundantConstraints,
        AnalysisKind::TautologicalConstraints,
        AnalysisKind::VoidCause,
        AnalysisKind::DeadCauses,
        AnalysisKind::FalseOptionalCauses,
    ];

    fn factory(&self) -> Factory {
        match self {
            Self::Validity => validity,
            Self::CoreDead => core_dead,
            Self::AtomicSets => atomic_sets,
            Self::FalseOptional => false_optional,
            Self::Determined => determined,
            Self::RedundantConstraints => redundant_constraints,
            Self::TautologicalConstraints => tautological_constraints,
            Self::VoidCause => void_cause,
            Self::DeadCauses => dead_causes,
            Self::FalseOptionalCauses => false_optional_causes,
        }
    }
}

struct Cached {
    generation: u64,
    output: Option<AnalysisOutput>,
}

struct State {
    formula: Arc<FeatureModelFormula>,
    generation: u64,
    cancel: CancelHandle,
    results: HashMap<AnalysisKind, Cached>,

    feature_properties: Option<Vec<FeatureProperties>>,
    constraint_properties: Option<Vec<ConstraintProperties>>,
}

impl State {
    fn reset(&mut self) {
        self.cancel.cancel();
        self.cancel = CancelHandle::default();
        self.generation += 1;
        self.results.clear();
        self.feature_properties = None;
        self.constraint_properties = None;
        log::info!(target: targets::ANALYZER, "Reset to generation {}", self.generation);
    }
}

pub struct FeatureModelAnalyzer {
    state: Mutex<State>,
    config: Config,
}

/// The variables of a formula follow the order of features.
fn feature_of(literal: CLiteral) -> usize {
    literal.var() as usize - 1
}

fn variable_of(feature: usize) -> Var {
    (feature + 1) as Var
}

/// Pairs of (parent, child) for each optional feature.
fn optional_pairs(model: &FeatureModel) -> Vec<(usize, usize)> {
    model
        .features()
        .iter()
        .enumerate()
        .filter(|(index, _)| model.is_optional(*index))
        .filter_map(|(index, feature)| feature.parent.map(|parent| (parent, index)))
        .collect()
}

fn run<A: Analysis>(
    analyzer: &FeatureModelAnalyzer,
    cnf: &CNF,
    analysis: &mut A,
    monitor: &mut Monitor,
) -> Result<Option<A::Output>, ErrorKind> {
    let result = run_on_cnf(cnf, analyzer.config.clone(), analysis, &[], monitor)?;
    Ok(result.map(|result| result.result))
}

fn validity(
    analyzer: &FeatureModelAnalyzer,
    formula: &FeatureModelFormula,
    monitor: &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind> {
    let cnf = formula.cnf()?;
    let output = run(analyzer, &cnf, &mut HasSolutionAnalysis::default(), monitor)?;
    Ok(output.map(AnalysisOutput::Model))
}

fn core_dead(
    analyzer: &FeatureModelAnalyzer,
    formula: &FeatureModelFormula,
    monitor: &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind> {
    let cnf = formula.cnf()?;
    let output = run(analyzer, &cnf, &mut CoreDeadAnalysis::default(), monitor)?;
    Ok(output.map(AnalysisOutput::Literals))
}

fn atomic_sets(
    analyzer: &FeatureModelAnalyzer,
    formula: &FeatureModelFormula,
    monitor: &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind> {
    let cnf = formula.cnf()?;
    let output = run(analyzer, &cnf, &mut AtomicSetAnalysis::default(), monitor)?;
    Ok(output.map(AnalysisOutput::Partition))
}

fn false_optional(
    analyzer: &FeatureModelAnalyzer,
    formula: &FeatureModelFormula,
    monitor: &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind> {
    let cnf = formula.cnf()?;
    let implications = optional_pairs(formula.model())
        .into_iter()
        .map(|(parent, child)| {
            Implication::new(
                LiteralSet::new([variable_of(parent) as CLiteral]),
                LiteralSet::new([variable_of(child) as CLiteral]),
            )
        })
        .collect();
    let output = run(analyzer, &cnf, &mut ImplicationAnalysis::new(implications), monitor)?;
    Ok(output.map(AnalysisOutput::Indices))
}

fn determined(
    analyzer: &FeatureModelAnalyzer,
    formula: &FeatureModelFormula,
    monitor: &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind> {
    let cnf = formula.cnf()?;
    let model = formula.model();
    let hidden = (0..model.features().len())
        .filter(|index| model.is_hidden_in_tree(*index))
        .map(variable_of);
    let output = run(analyzer, &cnf, &mut DeterminedAnalysis::new(hidden), monitor)?;
    Ok(output.map(|determined| AnalysisOutput::Literals(Some(determined))))
}

fn redundant_constraints(
    analyzer: &FeatureModelAnalyzer,
    formula: &FeatureModelFormula,
    monitor: &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind> {
    let tree = formula.cnf_variant(CnfVariant::TreeOnly, monitor)?;
    let groups = formula.constraint_groups()?;
    let output = run(analyzer, &tree, &mut RedundancyAnalysis::new(groups.to_vec()), monitor)?;
    Ok(output.map(AnalysisOutput::Indices))
}

fn tautological_constraints(
    analyzer: &FeatureModelAnalyzer,
    formula: &FeatureModelFormula,
    monitor: &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind> {
    let empty = CNF::new(formula.variables());
    let groups = formula.constraint_groups()?;
    let output = run(analyzer, &empty, &mut TautologyAnalysis::new(groups.to_vec()), monitor)?;
    Ok(output.map(AnalysisOutput::Indices))
}

/// The first group, in the order given, after which the solver is contradictory.
struct VoidCauseAnalysis {
    groups: Vec<Vec<LiteralSet>>,
}

impl Analysis for VoidCauseAnalysis {
    type Output = Option<usize>;

    fn analyze(
        &mut self,
        solver: &mut AdvancedSatSolver,
        monitor: &mut Monitor,
    ) -> Result<Self::Output, ErrorKind> {
        let attributed = attribute(
            solver,
            &self.groups,
            GroupOrder::AsGiven,
            monitor,
            |_, contradiction| Ok(contradiction),
        )?;
        Ok(attributed.iter().position(|void| *void == Some(true)))
    }
}

fn void_cause(
    analyzer: &FeatureModelAnalyzer,
    formula: &FeatureModelFormula,
    monitor: &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind> {
    let tree = formula.cnf_variant(CnfVariant::TreeOnly, monitor)?;
    let mut analysis = VoidCauseAnalysis {
        groups: formula.constraint_groups()?.to_vec(),
    };
    let output = run(analyzer, &tree, &mut analysis, monitor)?;
    Ok(output.map(|index| AnalysisOutput::Indices(index.into_iter().collect())))
}

fn dead_causes(
    analyzer: &FeatureModelAnalyzer,
    formula: &FeatureModelFormula,
    monitor: &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind> {
    let Some(forced) = analyzer.forced()? else {
        return Ok(None);
    };
    let tree = formula.cnf_variant(CnfVariant::TreeOnly, monitor)?;
    let groups = formula.constraint_groups()?.to_vec();
    let mut analysis = CoreDeadCauseAnalysis::new(forced.negative(), groups);
    let output = run(analyzer, &tree, &mut analysis, monitor)?;
    Ok(output.map(AnalysisOutput::LiteralCauses))
}

fn false_optional_causes(
    analyzer: &FeatureModelAnalyzer,
    formula: &FeatureModelFormula,
    monitor: &mut Monitor,
) -> Result<Option<AnalysisOutput>, ErrorKind> {
    let Some(pairs) = analyzer.false_optional_pairs()? else {
        return Ok(None);
    };
    let clauses = pairs
        .into_iter()
        .map(|(parent, child)| {
            LiteralSet::new([-(variable_of(parent) as CLiteral), variable_of(child) as CLiteral])
        })
        .collect();
    let tree = formula.cnf_variant(CnfVariant::TreeOnly, monitor)?;
    let groups = formula.constraint_groups()?.to_vec();
    let mut analysis = RedundancyCauseAnalysis::new(clauses, groups);
    let output = run(analyzer, &tree, &mut analysis, monitor)?;
    Ok(output.map(AnalysisOutput::ClauseCauses))
}

impl FeatureModelAnalyzer {
    pub fn new(formula: Arc<FeatureModelFormula>) -> Self {
        FeatureModelAnalyzer {
            state: Mutex::new(State {
                formula,
                generation: 0,
                cancel: CancelHandle::default(),
                results: HashMap::default(),
                feature_properties: None,
                constraint_properties: None,
            }),
            config: Config::default(),
        }
    }

    /// The configuration of each solver made by the analyzer.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The current snapshot.
    pub fn formula(&self) -> Arc<FeatureModelFormula> {
        lock(&self.state).formula.clone()
    }

    /// A handle which cancels analyses of the current generation.
    pub fn cancel_handle(&self) -> CancelHandle {
        lock(&self.state).cancel.clone()
    }

    pub fn generation(&self) -> u64 {
        lock(&self.state).generation
    }

    pub fn is_cached(&self, kind: AnalysisKind) -> bool {
        let state = lock(&self.state);
        state
            .results
            .get(&kind)
            .is_some_and(|cached| cached.generation == state.generation)
    }

    /// Cancels analyses in progress and clears every result.
    pub fn reset(&self) {
        lock(&self.state).reset();
    }

    /// Resets the analyzer to a new snapshot.
    ///
    /// The snapshot is replaced under the same lock as the new generation is made, so no analysis of the new generation reads the old snapshot.
    pub fn replace_formula(&self, formula: Arc<FeatureModelFormula>) {
        let mut state = lock(&self.state);
        state.reset();
        state.formula = formula;
    }

    fn monitor(&self) -> Monitor {
        Monitor::with_handle(self.cancel_handle())
    }

    /// The output of `kind` for the current snapshot, from the cache if present.
    pub fn result(&self, kind: AnalysisKind) -> Result<Option<AnalysisOutput>, ErrorKind> {
        let (formula, generation, mut monitor) = {
            let state = lock(&self.state);
            if let Some(cached) = state.results.get(&kind) {
                if cached.generation == state.generation {
                    return Ok(cached.output.clone());
                }
            }
            (
                state.formula.clone(),
                state.generation,
                Monitor::with_handle(state.cancel.clone()),
            )
        };

        monitor.set_task(kind.to_string());
        log::debug!(target: targets::ANALYZER, "Running {kind}");
        let output = (kind.factory())(self, &formula, &mut monitor)?;

        let mut state = lock(&self.state);
        if state.generation != generation {
            log::info!(target: targets::ANALYZER, "Dropped stale result of {kind}");
            return Err(ErrorKind::Cancelled);
        }
        state.results.insert(
            kind,
            Cached {
                generation,
                output: output.clone(),
            },
        );
        Ok(output)
    }

    fn indices(&self, kind: AnalysisKind) -> Result<Option<Vec<usize>>, ErrorKind> {
        match self.result(kind)? {
            Some(AnalysisOutput::Indices(indices)) => Ok(Some(indices)),
            _ => Ok(None),
        }
    }

    /// Core and dead features, as positive and negative literals.
    fn forced(&self) -> Result<Option<LiteralSet>, ErrorKind> {
        match self.result(AnalysisKind::CoreDead)? {
            Some(AnalysisOutput::Literals(forced)) => Ok(forced),
            _ => Ok(None),
        }
    }

    /// (parent, child) for each false-optional child.
    fn false_optional_pairs(&self) -> Result<Option<Vec<(usize, usize)>>, ErrorKind> {
        let Some(forced) = self.forced()? else {
            return Ok(None);
        };
        let Some(holding) = self.indices(AnalysisKind::FalseOptional)? else {
            return Ok(None);
        };

        let pairs = optional_pairs(self.formula().model());
        Ok(Some(
            holding
                .into_iter()
                .filter_map(|index| pairs.get(index).copied())
                .filter(|(_, child)| !forced.contains_variable(variable_of(*child)))
                .collect(),
        ))
    }

    fn names_of(&self, set: &LiteralSet, polarity: Option<bool>) -> Result<Vec<String>, ErrorKind> {
        self.formula().variables().names_of(set, polarity)
    }

    fn feature_names(&self, indices: &[usize]) -> Vec<String> {
        let formula = self.formula();
        indices
            .iter()
            .filter_map(|index| formula.model().feature(*index))
            .map(|feature| feature.name.clone())
            .collect()
    }

    /// None if inconclusive.
    pub fn is_valid(&self) -> Result<Option<bool>, ErrorKind> {
        match self.result(AnalysisKind::Validity)? {
            Some(AnalysisOutput::Model(model)) => Ok(Some(model.is_some())),
            _ => Ok(None),
        }
    }

    pub fn core_features(&self) -> Result<Option<Vec<String>>, ErrorKind> {
        match self.forced()? {
            Some(forced) => self.names_of(&forced, Some(true)).map(Some),
            None => Ok(None),
        }
    }

    pub fn dead_features(&self) -> Result<Option<Vec<String>>, ErrorKind> {
        match self.forced()? {
            Some(forced) => self.names_of(&forced, Some(false)).map(Some),
            None => Ok(None),
        }
    }

    /// Features which are neither core nor dead.
    pub fn common_features(&self) -> Result<Option<Vec<String>>, ErrorKind> {
        let Some(forced) = self.forced()? else {
            return Ok(None);
        };
        let formula = self.formula();
        let common = (0..formula.model().features().len())
            .filter(|index| !forced.contains_variable(variable_of(*index)))
            .collect::<Vec<_>>();
        Ok(Some(self.feature_names(&common)))
    }

    /// The atomic sets, with the core and dead features first.
    pub fn atomic_sets(&self) -> Result<Option<Vec<Vec<String>>>, ErrorKind> {
        let Some(AnalysisOutput::Partition(Some(sets))) = self.result(AnalysisKind::AtomicSets)? else {
            return Ok(None);
        };
        let mut named = Vec::with_capacity(sets.len());
        for set in &sets {
            named.push(self.names_of(set, None)?);
        }
        Ok(Some(named))
    }

    pub fn false_optional_features(&self) -> Result<Option<Vec<String>>, ErrorKind> {
        let Some(pairs) = self.false_optional_pairs()? else {
            return Ok(None);
        };
        let children = pairs.into_iter().map(|(_, child)| child).collect::<Vec<_>>();
        Ok(Some(self.feature_names(&children)))
    }

    fn indeterminate_hidden(&self) -> Result<Option<Vec<usize>>, ErrorKind> {
        let Some(AnalysisOutput::Literals(Some(determined))) = self.result(AnalysisKind::Determined)? else {
            return Ok(None);
        };
        let formula = self.formula();
        let model = formula.model();
        Ok(Some(
            (0..model.features().len())
                .filter(|index| model.is_hidden_in_tree(*index))
                .filter(|index| !determined.contains_variable(variable_of(*index)))
                .collect(),
        ))
    }

    /// Hidden features which are not determined by the other features.
    pub fn indeterminate_hidden_features(&self) -> Result<Option<Vec<String>>, ErrorKind> {
        Ok(self
            .indeterminate_hidden()?
            .map(|indices| self.feature_names(&indices)))
    }

    pub fn redundant_constraints(&self) -> Result<Option<Vec<usize>>, ErrorKind> {
        self.indices(AnalysisKind::RedundantConstraints)
    }

    pub fn tautological_constraints(&self) -> Result<Option<Vec<usize>>, ErrorKind> {
        self.indices(AnalysisKind::TautologicalConstraints)
    }

    /// Stores `table` with `store` if the generation is unchanged.
    fn store_table<T: Clone>(
        &self,
        generation: u64,
        table: &T,
        store: impl FnOnce(&mut State) -> &mut Option<T>,
    ) -> Result<(), ErrorKind> {
        let mut state = lock(&self.state);
        if state.generation != generation {
            return Err(ErrorKind::Cancelled);
        }
        *store(&mut state) = Some(table.clone());
        Ok(())
    }

    /// The properties of each feature, indexed as the features of the model.
    pub fn feature_properties(&self) -> Result<Vec<FeatureProperties>, ErrorKind> {
        let generation = {
            let state = lock(&self.state);
            if let Some(table) = &state.feature_properties {
                return Ok(table.clone());
            }
            state.generation
        };

        let count = self.formula().model().features().len();
        let mut table = vec![FeatureProperties::default(); count];
        if let Some(forced) = self.forced()? {
            for literal in forced.iter() {
                table[feature_of(literal)].status = match literal.polarity() {
                    true => FeatureStatus::Core,
                    false => FeatureStatus::Dead,
                };
            }
        }
        for (_, child) in self.false_optional_pairs()?.unwrap_or_default() {
            table[child].status = FeatureStatus::FalseOptional;
        }
        for index in self.indeterminate_hidden()?.unwrap_or_default() {
            table[index].indeterminate_hidden = true;
        }

        self.store_table(generation, &table, |state| &mut state.feature_properties)?;
        Ok(table)
    }

    /// The properties of each constraint, indexed as the constraints of the model.
    ///
    /// In a void model the only statuses are [Tautology](ConstraintStatus::Tautology) and [Void](ConstraintStatus::Void).
    pub fn constraint_properties(&self) -> Result<Vec<ConstraintProperties>, ErrorKind> {
        let generation = {
            let state = lock(&self.state);
            if let Some(table) = &state.constraint_properties {
                return Ok(table.clone());
            }
            state.generation
        };

        let count = self.formula().model().constraints().len();
        let mut table = vec![ConstraintProperties::default(); count];
        let set_status = |table: &mut Vec<ConstraintProperties>, indices: Vec<usize>, status| {
            for index in indices {
                if let Some(properties) = table.get_mut(index) {
                    if properties.status == ConstraintStatus::Normal {
                        properties.status = status;
                    }
                }
            }
        };

        let tautologies = self.tautological_constraints()?.unwrap_or_default();
        set_status(&mut table, tautologies, ConstraintStatus::Tautology);

        match self.is_valid()? {
            Some(false) => {
                let void = self.indices(AnalysisKind::VoidCause)?.unwrap_or_default();
                set_status(&mut table, void, ConstraintStatus::Void);
            }

            Some(true) => {
                let redundant = self.redundant_constraints()?.unwrap_or_default();
                set_status(&mut table, redundant, ConstraintStatus::Redundant);

                if let Some(AnalysisOutput::LiteralCauses(causes)) =
                    self.result(AnalysisKind::DeadCauses)?
                {
                    for (index, cause) in causes.iter().enumerate() {
                        if let Some(literals) = cause {
                            table[index].dead_features = self.names_of(literals, None)?;
                        }
                    }
                }

                if let Some(AnalysisOutput::ClauseCauses(causes)) =
                    self.result(AnalysisKind::FalseOptionalCauses)?
                {
                    for (index, cause) in causes.iter().enumerate() {
                        for clause in cause.iter().flatten() {
                            let mut children = self.names_of(clause, Some(true))?;
                            table[index].false_optional_features.append(&mut children);
                        }
                    }
                }
            }

            None => log::info!(target: targets::ANALYZER, "Constraint properties without validity"),
        }

        self.store_table(generation, &table, |state| &mut state.constraint_properties)?;
        Ok(table)
    }

    /// True if selecting each of `a` forces some of `b` to be selected.
    ///
    /// Trivially true if `b` is empty, and None if inconclusive.
    pub fn check_implies(&self, a: &[&str], b: &[&str]) -> Result<Option<bool>, ErrorKind> {
        if b.is_empty() {
            return Ok(Some(true));
        }
        let formula = self.formula();
        let variables = formula.variables();
        let implication = Implication::new(
            variables.literal_set(a.iter(), true)?,
            variables.literal_set(b.iter(), true)?,
        );

        let cnf = formula.cnf()?;
        let mut monitor = self.monitor();
        let mut analysis = ImplicationAnalysis::new(vec![implication]);
        let holding = run(self, &cnf, &mut analysis, &mut monitor)?;
        Ok(holding.map(|holding| !holding.is_empty()))
    }

    /// The count of features which are not abstract.
    pub fn count_concrete(&self) -> usize {
        let formula = self.formula();
        let features = formula.model().features();
        features.iter().filter(|feature| !feature.is_abstract).count()
    }

    /// The count of features which are hidden, or below a hidden feature.
    pub fn count_hidden(&self) -> usize {
        self.formula().model().hidden_names().len()
    }

    /// The count of features without children.
    pub fn count_terminal(&self) -> usize {
        let formula = self.formula();
        let model = formula.model();
        (0..model.features().len())
            .filter(|index| !model.has_children(*index))
            .count()
    }

    /// Runs every analysis, filling each side table.
    pub fn analyze_all(&self) -> Result<AnalysisReport, ErrorKind> {
        let report = AnalysisReport {
            valid: self.is_valid()?,
            features: self.feature_properties()?,
            constraints: self.constraint_properties()?,
            atomic_sets: self.atomic_sets()?,
        };
        log::info!(target: targets::ANALYZER,
            "Analyzed {} features and {} constraints",
            report.features.len(),
            report.constraints.len()
        );
        Ok(report)
    }
}
