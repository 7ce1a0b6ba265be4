/*!
Partial configurations of a feature model.

A [Configuration] holds one [SelectableFeature] for each feature of a model, in the order of the model.
Each feature has a *manual* selection (made by a user) and an *automatic* selection (derived by the [propagator]).
The [selection](SelectableFeature::selection) of a feature is the automatic selection, if defined, and otherwise the manual selection.

Recommendations and open clauses are set by [find_open_clauses](propagator::ConfigurationPropagator::find_open_clauses), to help complete an invalid configuration.
*/

pub mod propagator;

use std::sync::Arc;

use crate::{
    model::FeatureModel,
    structures::literal_set::LiteralSet,
    types::err::ErrorKind,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    Selected,
    Unselected,
    #[default]
    Undefined,
}

impl Selection {
    /// The selection of a literal, by polarity.
    pub fn of_literal(literal: i32) -> Self {
        match literal.is_positive() {
            true => Selection::Selected,
            false => Selection::Unselected,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Selected => write!(f, "selected"),
            Self::Unselected => write!(f, "unselected"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectableFeature {
    name: String,
    manual: Selection,
    automatic: Selection,
    recommended: Selection,

    /// Open clauses which mention the feature, with the index of the clause in the list of open clauses.
    open_clauses: Vec<(usize, LiteralSet)>,

    is_abstract: bool,

    /// Hidden, or below a hidden feature.
    is_hidden: bool,
}

impl SelectableFeature {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manual(&self) -> Selection {
        self.manual
    }

    pub fn automatic(&self) -> Selection {
        self.automatic
    }

    pub fn recommended(&self) -> Selection {
        self.recommended
    }

    pub fn open_clauses(&self) -> &[(usize, LiteralSet)] {
        &self.open_clauses
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    pub fn selection(&self) -> Selection {
        match self.automatic {
            Selection::Undefined => self.manual,
            automatic => automatic,
        }
    }

    pub(crate) fn set_automatic(&mut self, selection: Selection) {
        self.automatic = selection;
    }

    pub(crate) fn set_manual(&mut self, selection: Selection) {
        self.manual = selection;
    }

    pub(crate) fn set_recommended(&mut self, selection: Selection) {
        self.recommended = selection;
    }

    pub(crate) fn add_open_clause(&mut self, index: usize, clause: LiteralSet) {
        self.open_clauses.push((index, clause));
    }

    pub(crate) fn clear_open_clauses(&mut self) {
        self.open_clauses.clear();
    }
}

#[derive(Clone, Debug)]
pub struct Configuration {
    model: Arc<FeatureModel>,
    features: Vec<SelectableFeature>,

    /// Whether abstract features are part of a configuration.
    ignore_abstract: bool,
}

impl Configuration {
    /// A configuration of `model` with every feature undefined, and abstract features not part of the configuration.
    pub fn new(model: Arc<FeatureModel>) -> Self {
        let features = model
            .features()
            .iter()
            .enumerate()
            .map(|(index, feature)| SelectableFeature {
                name: feature.name.clone(),
                manual: Selection::Undefined,
                automatic: Selection::Undefined,
                recommended: Selection::Undefined,
                open_clauses: Vec::default(),
                is_abstract: feature.is_abstract,
                is_hidden: model.is_hidden_in_tree(index),
            })
            .collect();

        Configuration {
            model,
            features,
            ignore_abstract: false,
        }
    }

    /// Sets whether abstract features are configured as any other feature.
    pub fn with_ignore_abstract(mut self, ignore_abstract: bool) -> Self {
        self.ignore_abstract = ignore_abstract;
        self
    }

    pub fn ignore_abstract(&self) -> bool {
        self.ignore_abstract
    }

    pub fn model(&self) -> &FeatureModel {
        &self.model
    }

    pub fn features(&self) -> &[SelectableFeature] {
        &self.features
    }

    pub(crate) fn features_mut(&mut self) -> &mut [SelectableFeature] {
        &mut self.features
    }

    pub fn feature(&self, name: &str) -> Result<&SelectableFeature, ErrorKind> {
        self.features
            .iter()
            .find(|feature| feature.name == name)
            .ok_or_else(|| ErrorKind::UnknownVariable(name.to_string()))
    }

    pub(crate) fn feature_mut(&mut self, name: &str) -> Result<&mut SelectableFeature, ErrorKind> {
        self.features
            .iter_mut()
            .find(|feature| feature.name == name)
            .ok_or_else(|| ErrorKind::UnknownVariable(name.to_string()))
    }

    /// Sets the manual selection of the feature named `name`.
    pub fn set_manual(&mut self, name: &str, selection: Selection) -> Result<(), ErrorKind> {
        self.feature_mut(name)?.set_manual(selection);
        Ok(())
    }

    pub fn reset_automatic_values(&mut self) {
        for feature in &mut self.features {
            feature.automatic = Selection::Undefined;
        }
    }

    /// Clears every manual and automatic selection.
    pub fn reset_values(&mut self) {
        for feature in &mut self.features {
            feature.manual = Selection::Undefined;
            feature.automatic = Selection::Undefined;
        }
    }

    /// The names of features with `selection`, in order.
    pub fn names_with(&self, selection: Selection) -> Vec<&str> {
        self.features
            .iter()
            .filter(|feature| feature.selection() == selection)
            .map(|feature| feature.name.as_str())
            .collect()
    }

    pub fn selected_names(&self) -> Vec<&str> {
        self.names_with(Selection::Selected)
    }

    pub fn unselected_names(&self) -> Vec<&str> {
        self.names_with(Selection::Unselected)
    }

    pub fn undefined_names(&self) -> Vec<&str> {
        self.names_with(Selection::Undefined)
    }
}
