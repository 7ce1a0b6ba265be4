//! Properties of features and constraints, as found by an [analyzer](super::FeatureModelAnalyzer).

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FeatureStatus {
    #[default]
    Normal,

    /// Selected in every valid configuration.
    Core,

    /// Selected in no valid configuration.
    Dead,

    /// Optional, though selected whenever its parent is selected.
    FalseOptional,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureProperties {
    pub status: FeatureStatus,

    /// Hidden, and not determined by the other features.
    pub indeterminate_hidden: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConstraintStatus {
    #[default]
    Normal,

    /// Implied by the tree and the other constraints.
    Redundant,

    /// Implied by nothing at all.
    Tautology,

    /// Makes the model void.
    Void,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintProperties {
    pub status: ConstraintStatus,

    /// Names of the dead features attributed to the constraint.
    pub dead_features: Vec<String>,

    /// Names of the false-optional features attributed to the constraint.
    pub false_optional_features: Vec<String>,
}

/// Everything an analyzer knows of a model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    /// None if inconclusive.
    pub valid: Option<bool>,

    /// Indexed as the features of the model.
    pub features: Vec<FeatureProperties>,

    /// Indexed as the constraints of the model.
    pub constraints: Vec<ConstraintProperties>,

    pub atomic_sets: Option<Vec<Vec<String>>>,
}

impl AnalysisReport {
    /// Indices of features with `status`.
    pub fn features_with(&self, status: FeatureStatus) -> Vec<usize> {
        self.features
            .iter()
            .enumerate()
            .filter(|(_, properties)| properties.status == status)
            .map(|(index, _)| index)
            .collect()
    }

    /// Indices of constraints with `status`.
    pub fn constraints_with(&self, status: ConstraintStatus) -> Vec<usize> {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, properties)| properties.status == status)
            .map(|(index, _)| index)
            .collect()
    }
}
