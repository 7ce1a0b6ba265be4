/*!
Translation of a [FeatureModel] to clauses.

The variables are the feature names, in order.
The clauses of the tree and of the constraints are kept apart, so either may be used alone:

| Relation                        | Clauses                          |
|---------------------------------|----------------------------------|
| The root                        | *r*                              |
| A child *c* of *p*              | ¬*c* ∨ *p*                       |
| A mandatory child *c* of *p*    | ¬*p* ∨ *c*                       |
| An Or group *c₁*, …, *cₙ*       | ¬*p* ∨ *c₁* ∨ … ∨ *cₙ*           |
| An Alternative group            | As an Or group, and ¬*cᵢ* ∨ ¬*cⱼ* for *i* < *j* |

A constraint is translated [directly](crate::structures::expr).
*/

use std::{collections::HashSet, sync::Arc};

use crate::{
    model::{FeatureModel, GroupKind},
    structures::{literal::CLiteral, literal_set::LiteralSet, variables::Variables, CNF},
    types::err::{ErrorKind, ModelError},
};

/// The variables of `model`, one for each feature, in order.
pub fn variables(model: &FeatureModel) -> Variables {
    Variables::new(model.feature_names())
}

/// The clauses of the feature tree, without duplicates.
pub fn tree_clauses(model: &FeatureModel, variables: &Variables) -> Result<Vec<LiteralSet>, ErrorKind> {
    let mut clauses = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |clause: LiteralSet| {
        if seen.insert(clause.clone()) {
            clauses.push(clause);
        }
    };

    for (index, feature) in model.features().iter().enumerate() {
        let literal = variables.literal(&feature.name, true)?;

        let Some(parent_index) = feature.parent else {
            push(LiteralSet::new([literal]));
            continue;
        };
        let Some(parent) = model.feature(parent_index) else {
            return Err(ModelError::MissingParent(index).into());
        };
        let parent_literal = variables.literal(&parent.name, true)?;
        push(LiteralSet::new([-literal, parent_literal]));

        if parent.group == GroupKind::And {
            if feature.mandatory {
                push(LiteralSet::new([-parent_literal, literal]));
            }
            continue;
        }

        // Groups are written once, from the first child.
        if model.children(parent_index).next() != Some(index) {
            continue;
        }
        let mut children: Vec<CLiteral> = Vec::new();
        for child in model.children(parent_index) {
            children.push(variables.literal(&model.features()[child].name, true)?);
        }

        let mut group = children.clone();
        group.push(-parent_literal);
        push(LiteralSet::new(group));

        if parent.group == GroupKind::Alternative {
            for (i, a) in children.iter().enumerate() {
                for b in &children[i + 1..] {
                    push(LiteralSet::new([-a, -b]));
                }
            }
        }
    }
    Ok(clauses)
}

/// The clauses of each constraint, in order of the constraints.
pub fn constraint_groups(
    model: &FeatureModel,
    variables: &Variables,
) -> Result<Vec<Vec<LiteralSet>>, ErrorKind> {
    model
        .constraints()
        .iter()
        .map(|constraint| constraint.to_clauses(variables))
        .collect()
}

/// The formula of `model`: the tree clauses, followed by the clauses of each constraint not already present.
pub fn build_cnf(model: &FeatureModel, variables: Arc<Variables>) -> Result<CNF, ErrorKind> {
    let mut clauses = tree_clauses(model, &variables)?;
    let mut seen: HashSet<LiteralSet> = clauses.iter().cloned().collect();
    for group in constraint_groups(model, &variables)? {
        for clause in group {
            if seen.insert(clause.clone()) {
                clauses.push(clause);
            }
        }
    }

    let mut cnf = CNF::new(variables);
    cnf.add_clauses(clauses)?;
    Ok(cnf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::Feature, structures::expr::Expr};

    fn set(literals: &[i32]) -> LiteralSet {
        LiteralSet::new(literals.iter().copied())
    }

    #[test]
    fn and_group() {
        let mut model = FeatureModel::default();
        let root = model.add_feature(Feature::root("A"));
        model.add_feature(Feature::child("B", root));
        model.add_feature(Feature::child("C", root).mandatory());

        let variables = variables(&model);
        let clauses = tree_clauses(&model, &variables).unwrap();
        assert_eq!(
            clauses,
            vec![set(&[1]), set(&[-2, 1]), set(&[-3, 1]), set(&[-1, 3])]
        );
    }

    #[test]
    fn alternative_group() {
        let mut model = FeatureModel::default();
        let root = model.add_feature(Feature::root("A").grouped(GroupKind::Alternative));
        model.add_feature(Feature::child("B", root));
        model.add_feature(Feature::child("C", root));
        model.add_feature(Feature::child("D", root));

        let variables = variables(&model);
        let clauses = tree_clauses(&model, &variables).unwrap();
        assert!(clauses.contains(&set(&[-1, 2, 3, 4])));
        assert!(clauses.contains(&set(&[-2, -3])));
        assert!(clauses.contains(&set(&[-2, -4])));
        assert!(clauses.contains(&set(&[-3, -4])));
        assert_eq!(clauses.len(), 8);
    }

    #[test]
    fn or_group_ignores_mandatory() {
        let mut model = FeatureModel::default();
        let root = model.add_feature(Feature::root("A").grouped(GroupKind::Or));
        model.add_feature(Feature::child("B", root).mandatory());
        model.add_feature(Feature::child("C", root));

        let variables = variables(&model);
        let clauses = tree_clauses(&model, &variables).unwrap();
        assert_eq!(
            clauses,
            vec![set(&[1]), set(&[-2, 1]), set(&[-1, 2, 3]), set(&[-3, 1])]
        );
    }

    #[test]
    fn constraints() {
        let mut model = FeatureModel::default();
        let root = model.add_feature(Feature::root("A"));
        model.add_feature(Feature::child("B", root));
        model.add_feature(Feature::child("C", root));
        model.add_constraint(Expr::var("B").implies(Expr::var("C")));
        model.add_constraint(Expr::var("C").or(Expr::var("C").not()));
        model.add_constraint(Expr::var("B").iff(Expr::var("C")));

        let variables = Arc::new(variables(&model));
        let groups = constraint_groups(&model, &variables).unwrap();
        assert_eq!(groups[0], vec![set(&[-2, 3])]);
        assert!(groups[1].is_empty());
        assert_eq!(groups[2].len(), 2);

        let cnf = build_cnf(&model, variables).unwrap();
        // Three tree clauses, and [-2, 3] is not repeated.
        assert_eq!(cnf.clauses().len(), 5);
    }

    #[test]
    fn repeats_dropped_in_order() {
        let mut model = FeatureModel::default();
        let root = model.add_feature(Feature::root("A"));
        model.add_feature(Feature::child("B", root).mandatory());
        model.add_constraint(Expr::var("A").implies(Expr::var("B")));
        model.add_constraint(Expr::var("B").not().or(Expr::var("A")));
        model.add_constraint(Expr::var("A"));
        model.add_constraint(Expr::var("B"));
        model.add_constraint(Expr::var("B"));

        let cnf = build_cnf(&model, Arc::new(variables(&model))).unwrap();
        assert_eq!(
            cnf.clauses(),
            &[set(&[1]), set(&[-2, 1]), set(&[-1, 2]), set(&[2])]
        );
    }

    #[test]
    fn unknown_name() {
        let mut model = FeatureModel::default();
        model.add_feature(Feature::root("A"));
        model.add_constraint(Expr::var("Z"));
        let variables = Arc::new(variables(&model));
        assert_eq!(
            build_cnf(&model, variables),
            Err(ErrorKind::UnknownVariable("Z".into()))
        );
    }
}
