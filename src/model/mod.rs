/*!
A flat description of a feature model: a tree of features, and cross-tree constraints.

The model is only a description.
It is translated to clauses by the [builder], and the formulas derived from a model are cached by a [FeatureModelFormula](formula::FeatureModelFormula).

Features are indexed by order of addition, and this order also fixes the variables of the formula, `1..=n`.

```rust
# use fm_sat::{model::{Feature, FeatureModel, GroupKind}, structures::expr::Expr};
let mut model = FeatureModel::default();
let root = model.add_feature(Feature::root("Car").grouped(GroupKind::And));
let engine = model.add_feature(Feature::child("Engine", root).grouped(GroupKind::Alternative).mandatory());
model.add_feature(Feature::child("Petrol", engine));
model.add_feature(Feature::child("Electric", engine));
model.add_feature(Feature::child("Radio", root));
model.add_constraint(Expr::var("Radio").implies(Expr::var("Electric")));

assert!(model.validate().is_ok());
assert!(!model.is_optional(engine));
assert_eq!(model.children(root).collect::<Vec<_>>(), vec![1, 4]);
```
*/

pub mod builder;
pub mod formula;

use crate::{
    structures::expr::Expr,
    types::err::{ErrorKind, ModelError},
};

/// The relation between a feature and its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupKind {
    /// Each child is optional, unless mandatory.
    #[default]
    And,

    /// At least one child.
    Or,

    /// Exactly one child.
    Alternative,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    pub name: String,

    /// The index of the parent, if any.
    pub parent: Option<usize>,

    /// Only meaningful within an [And](GroupKind::And) group.
    pub mandatory: bool,

    /// The group of the children of the feature.
    pub group: GroupKind,

    pub is_abstract: bool,
    pub is_hidden: bool,
}

impl Feature {
    pub fn root(name: impl Into<String>) -> Self {
        Feature {
            name: name.into(),
            parent: None,
            mandatory: true,
            group: GroupKind::default(),
            is_abstract: false,
            is_hidden: false,
        }
    }

    pub fn child(name: impl Into<String>, parent: usize) -> Self {
        Feature {
            parent: Some(parent),
            mandatory: false,
            ..Feature::root(name)
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn grouped(mut self, group: GroupKind) -> Self {
        self.group = group;
        self
    }

    pub fn abstract_feature(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureModel {
    features: Vec<Feature>,
    constraints: Vec<Expr>,
}

impl FeatureModel {
    /// Adds `feature`, returning its index.
    pub fn add_feature(&mut self, feature: Feature) -> usize {
        self.features.push(feature);
        self.features.len() - 1
    }

    /// Adds `constraint`, returning its index.
    pub fn add_constraint(&mut self, constraint: Expr) -> usize {
        self.constraints.push(constraint);
        self.constraints.len() - 1
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    pub fn constraints(&self) -> &[Expr] {
        &self.constraints
    }

    /// The index of the feature named `name`.
    pub fn feature_index(&self, name: &str) -> Result<usize, ErrorKind> {
        self.features
            .iter()
            .position(|feature| feature.name == name)
            .ok_or_else(|| ErrorKind::UnknownVariable(name.to_string()))
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|feature| feature.name.as_str())
    }

    /// The index of the root, i.e. the first feature without a parent.
    pub fn root(&self) -> Option<usize> {
        self.features.iter().position(|feature| feature.parent.is_none())
    }

    /// The indices of the children of the feature at `index`, in order.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.features
            .iter()
            .enumerate()
            .filter(move |(_, feature)| feature.parent == Some(index))
            .map(|(child, _)| child)
    }

    pub fn has_children(&self, index: usize) -> bool {
        self.children(index).next().is_some()
    }

    /// True if the feature at `index` has a parent, and is not a mandatory member of an [And](GroupKind::And) group.
    pub fn is_optional(&self, index: usize) -> bool {
        let Some(feature) = self.features.get(index) else {
            return false;
        };
        match feature.parent.and_then(|parent| self.features.get(parent)) {
            None => false,
            Some(parent) => !(feature.mandatory && parent.group == GroupKind::And),
        }
    }

    /// True if the feature at `index`, or some ancestor, is hidden.
    pub fn is_hidden_in_tree(&self, index: usize) -> bool {
        let mut current = Some(index);
        let mut steps = 0;
        while let Some(index) = current {
            let Some(feature) = self.features.get(index) else {
                return false;
            };
            if feature.is_hidden {
                return true;
            }
            current = feature.parent;
            steps += 1;
            if steps > self.features.len() {
                return false;
            }
        }
        false
    }

    /// The names of features hidden in the tree, in order.
    pub fn hidden_names(&self) -> Vec<String> {
        (0..self.features.len())
            .filter(|index| self.is_hidden_in_tree(*index))
            .map(|index| self.features[index].name.clone())
            .collect()
    }

    /// The names of abstract features, in order.
    pub fn abstract_names(&self) -> Vec<String> {
        self.features
            .iter()
            .filter(|feature| feature.is_abstract)
            .map(|feature| feature.name.clone())
            .collect()
    }

    /// Checks the tree is well-formed, and each constraint mentions only known features.
    pub fn validate(&self) -> Result<(), ErrorKind> {
        let mut root = None;
        for (index, feature) in self.features.iter().enumerate() {
            if self.features[..index]
                .iter()
                .any(|other| other.name == feature.name)
            {
                return Err(ModelError::DuplicateName(feature.name.clone()).into());
            }
            match feature.parent {
                None if root.is_some() => return Err(ModelError::MultipleRoots(index).into()),
                None => root = Some(index),
                Some(parent) if parent >= self.features.len() => {
                    return Err(ModelError::MissingParent(index).into())
                }
                Some(_) => {}
            }
        }
        if root.is_none() {
            return Err(ModelError::NoRoot.into());
        }

        for index in 0..self.features.len() {
            let mut current = self.features[index].parent;
            let mut steps = 0;
            while let Some(ancestor) = current {
                steps += 1;
                if ancestor == index || steps > self.features.len() {
                    return Err(ModelError::Cycle(index).into());
                }
                current = self.features[ancestor].parent;
            }
        }

        for constraint in &self.constraints {
            for name in constraint.variable_names() {
                self.feature_index(name)?;
            }
        }
        Ok(())
    }
}
