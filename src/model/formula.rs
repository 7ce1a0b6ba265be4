/*!
The formulas derived from a snapshot of a feature model, computed on demand and cached.

Each [variant](CnfVariant) is computed at most once between calls to [reset](FeatureModelFormula::reset).
Sliced variants are over a smaller [mapping](crate::structures::variables::Variables), without the removed names.
All other variants share the mapping of the complete formula.

A lock is held for each variant, so concurrent requests for the same variant wait for a single computation.
*/

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    config::Config,
    misc::log::targets::{self},
    model::{builder, FeatureModel},
    monitor::Monitor,
    slicer::CnfSlicer,
    structures::{literal_set::LiteralSet, variables::Variables, CNF},
    types::err::ErrorKind,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CnfVariant {
    Complete,
    NoHidden,
    NoAbstract,
    NoHiddenNoAbstract,
    TreeOnly,
    ConstraintsOnly,
}

impl CnfVariant {
    const COUNT: usize = 6;

    fn index(&self) -> usize {
        match self {
            Self::Complete => 0,
            Self::NoHidden => 1,
            Self::NoAbstract => 2,
            Self::NoHiddenNoAbstract => 3,
            Self::TreeOnly => 4,
            Self::ConstraintsOnly => 5,
        }
    }
}

pub struct FeatureModelFormula {
    model: Arc<FeatureModel>,
    variables: Arc<Variables>,

    cnfs: [Mutex<Option<Arc<CNF>>>; CnfVariant::COUNT],
    groups: Mutex<Option<Arc<Vec<Vec<LiteralSet>>>>>,

    /// The configuration of solvers used when slicing.
    config: Config,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FeatureModelFormula {
    /// Formulas of `model`, after validation of the model.
    pub fn new(model: FeatureModel) -> Result<Self, ErrorKind> {
        model.validate()?;
        let variables = Arc::new(builder::variables(&model));
        Ok(FeatureModelFormula {
            model: Arc::new(model),
            variables,
            cnfs: Default::default(),
            groups: Mutex::default(),
            config: Config::default(),
        })
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn model(&self) -> &FeatureModel {
        &self.model
    }

    pub fn shared_model(&self) -> Arc<FeatureModel> {
        self.model.clone()
    }

    /// The mapping of the complete formula.
    pub fn variables(&self) -> Arc<Variables> {
        self.variables.clone()
    }

    /// The tree and constraint clauses.
    pub fn cnf(&self) -> Result<Arc<CNF>, ErrorKind> {
        self.cnf_variant(CnfVariant::Complete, &mut Monitor::default())
    }

    /// The formula of `variant`, computed if not cached.
    ///
    /// `monitor` is only used when slicing.
    pub fn cnf_variant(
        &self,
        variant: CnfVariant,
        monitor: &mut Monitor,
    ) -> Result<Arc<CNF>, ErrorKind> {
        let mut cached = lock(&self.cnfs[variant.index()]);
        if let Some(cnf) = cached.as_ref() {
            return Ok(cnf.clone());
        }

        let cnf = match variant {
            CnfVariant::Complete => builder::build_cnf(&self.model, self.variables.clone())?,

            CnfVariant::TreeOnly => {
                let mut cnf = CNF::new(self.variables.clone());
                cnf.add_clauses(builder::tree_clauses(&self.model, &self.variables)?)?;
                cnf
            }

            CnfVariant::ConstraintsOnly => {
                let mut cnf = CNF::new(self.variables.clone());
                for group in self.constraint_groups()?.iter() {
                    cnf.add_clauses(group.iter().cloned())?;
                }
                cnf
            }

            CnfVariant::NoHidden | CnfVariant::NoAbstract | CnfVariant::NoHiddenNoAbstract => {
                let mut removed = Vec::new();
                if variant != CnfVariant::NoAbstract {
                    removed.extend(self.model.hidden_names());
                }
                if variant != CnfVariant::NoHidden {
                    removed.extend(self.model.abstract_names());
                }
                let complete = self.cnf()?;
                CnfSlicer::new(removed)
                    .with_config(self.config.clone())
                    .slice(&complete, monitor)?
            }
        };

        log::debug!(target: targets::ANALYZER, "Built {variant:?} formula with {} clauses", cnf.clauses().len());
        let cnf = Arc::new(cnf);
        *cached = Some(cnf.clone());
        Ok(cnf)
    }

    /// The clauses of each constraint, indexed as the constraints of the model.
    pub fn constraint_groups(&self) -> Result<Arc<Vec<Vec<LiteralSet>>>, ErrorKind> {
        let mut cached = lock(&self.groups);
        if let Some(groups) = cached.as_ref() {
            return Ok(groups.clone());
        }
        let groups = Arc::new(builder::constraint_groups(&self.model, &self.variables)?);
        *cached = Some(groups.clone());
        Ok(groups)
    }

    /// Clears every cached formula.
    pub fn reset(&self) {
        for cnf in &self.cnfs {
            *lock(cnf) = None;
        }
        *lock(&self.groups) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Feature, GroupKind},
        structures::expr::Expr,
    };

    fn formula() -> FeatureModelFormula {
        let mut model = FeatureModel::default();
        let root = model.add_feature(Feature::root("Root").abstract_feature());
        let a = model.add_feature(Feature::child("A", root).grouped(GroupKind::Or));
        model.add_feature(Feature::child("A1", a).hidden());
        model.add_feature(Feature::child("A2", a));
        model.add_feature(Feature::child("B", root));
        model.add_constraint(Expr::var("B").implies(Expr::var("A1")));
        FeatureModelFormula::new(model)
            .unwrap()
            .with_config(Config::unbounded())
    }

    #[test]
    fn cached() {
        let formula = formula();
        let first = formula.cnf().unwrap();
        let second = formula.cnf().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        formula.reset();
        let third = formula.cnf().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first, third);
    }

    #[test]
    fn views() {
        let formula = formula();
        let mut monitor = Monitor::default();

        let tree = formula.cnf_variant(CnfVariant::TreeOnly, &mut monitor).unwrap();
        let constraints = formula.cnf_variant(CnfVariant::ConstraintsOnly, &mut monitor).unwrap();
        let complete = formula.cnf().unwrap();
        assert_eq!(
            tree.clauses().len() + constraints.clauses().len(),
            complete.clauses().len()
        );
        assert_eq!(constraints.clauses(), &[LiteralSet::new([-5, 3])]);

        let no_hidden = formula.cnf_variant(CnfVariant::NoHidden, &mut monitor).unwrap();
        assert!(!no_hidden.variables().contains("A1"));
        assert_eq!(no_hidden.variables().size(), 4);

        let neither = formula.cnf_variant(CnfVariant::NoHiddenNoAbstract, &mut monitor).unwrap();
        assert_eq!(
            neither.variables().names().collect::<Vec<_>>(),
            vec!["A", "A2", "B"]
        );
    }

    #[test]
    fn invalid_model() {
        let model = FeatureModel::default();
        assert!(FeatureModelFormula::new(model).is_err());
    }
}
