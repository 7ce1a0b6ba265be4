use std::{sync::Arc, time::Duration};

use fm_sat::{
    analysis::{
        core_dead::CoreDeadAnalysis, has_solution::HasSolutionAnalysis, run_on_cnf,
        solutions::CountSolutionsAnalysis,
    },
    analyzer::{properties::ConstraintStatus, FeatureModelAnalyzer},
    config::Config,
    configuration::{propagator::ConfigurationPropagator, Configuration, Selection},
    job::LongRunningJob,
    model::{formula::FeatureModelFormula, Feature, FeatureModel},
    monitor::Monitor,
    slicer::CnfSlicer,
    structures::{
        dimacs::read_dimacs, expr::Expr, literal_set::LiteralSet, variables::Variables, CNF,
    },
    types::err::ErrorKind,
};

/// A, with optional children B and C, and B ⇒ C.
fn optional_pair() -> Arc<FeatureModelFormula> {
    let mut model = FeatureModel::default();
    let root = model.add_feature(Feature::root("A"));
    model.add_feature(Feature::child("B", root));
    model.add_feature(Feature::child("C", root));
    model.add_constraint(Expr::var("B").implies(Expr::var("C")));
    Arc::new(
        FeatureModelFormula::new(model)
            .unwrap()
            .with_config(Config::unbounded()),
    )
}

mod feature_model {
    use super::*;

    #[test]
    fn analyzer() {
        let analyzer = FeatureModelAnalyzer::new(optional_pair()).with_config(Config::unbounded());

        assert_eq!(analyzer.is_valid(), Ok(Some(true)));
        assert_eq!(analyzer.core_features(), Ok(Some(vec!["A".to_string()])));
        assert_eq!(analyzer.dead_features(), Ok(Some(vec![])));
        assert_eq!(analyzer.false_optional_features(), Ok(Some(vec![])));
        assert_eq!(analyzer.redundant_constraints(), Ok(Some(vec![])));

        let mut sets = analyzer.atomic_sets().unwrap().unwrap();
        sets.retain(|set| !set.is_empty());
        sets.sort();
        assert_eq!(sets, vec![vec!["A"], vec!["B"], vec!["C"]]);

        assert_eq!(analyzer.check_implies(&["B"], &["C"]), Ok(Some(true)));
        assert_eq!(analyzer.check_implies(&["C"], &["B"]), Ok(Some(false)));
    }

    #[test]
    fn redundant_constraints() {
        let mut model = FeatureModel::default();
        let root = model.add_feature(Feature::root("A"));
        model.add_feature(Feature::child("B", root).mandatory());
        model.add_feature(Feature::child("C", root));
        model.add_constraint(Expr::var("B"));
        model.add_constraint(Expr::var("C").implies(Expr::var("B")));
        model.add_constraint(Expr::var("C").or(Expr::var("C").not()));

        let formula = FeatureModelFormula::new(model).unwrap().with_config(Config::unbounded());
        let analyzer = FeatureModelAnalyzer::new(Arc::new(formula)).with_config(Config::unbounded());

        assert_eq!(analyzer.redundant_constraints(), Ok(Some(vec![0, 1, 2])));
        assert_eq!(analyzer.tautological_constraints(), Ok(Some(vec![2])));

        let statuses: Vec<ConstraintStatus> = analyzer
            .constraint_properties()
            .unwrap()
            .into_iter()
            .map(|properties| properties.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                ConstraintStatus::Redundant,
                ConstraintStatus::Redundant,
                ConstraintStatus::Tautology
            ]
        );
    }

    #[test]
    fn propagator() {
        let formula = optional_pair();
        let configuration = Configuration::new(formula.shared_model());
        let mut propagator =
            ConfigurationPropagator::new(formula, configuration).with_config(Config::unbounded());
        let mut monitor = Monitor::default();

        assert_eq!(propagator.number(None, &mut monitor), Ok(3));

        propagator
            .configuration_mut()
            .set_manual("B", Selection::Selected)
            .unwrap();
        let report = propagator.update(false, None, &mut monitor).unwrap();
        assert!(!report.contradiction);

        let configuration = propagator.configuration();
        assert_eq!(configuration.selected_names(), vec!["A", "B", "C"]);
        assert_eq!(configuration.feature("C").unwrap().automatic(), Selection::Selected);
        assert_eq!(propagator.is_valid(&mut monitor), Ok(Some(true)));
        assert_eq!(propagator.number(None, &mut monitor), Ok(1));
    }
}

mod unsatisfiable {
    use super::*;

    /// (A ∨ B), (¬A ∨ B), (¬B)
    fn cnf() -> CNF {
        let variables = Arc::new(Variables::new(["A", "B"]));
        CNF::from_clauses(variables, [vec![1, 2], vec![-1, 2], vec![-2]]).unwrap()
    }

    #[test]
    fn no_solution() {
        let cnf = cnf();
        let mut monitor = Monitor::default();

        let witness = run_on_cnf(&cnf, Config::unbounded(), &mut HasSolutionAnalysis::default(), &[], &mut monitor);
        assert_eq!(witness.unwrap().map(|result| result.result), Some(None));

        let count = run_on_cnf(&cnf, Config::unbounded(), &mut CountSolutionsAnalysis::default(), &[], &mut monitor);
        assert_eq!(count.unwrap().map(|result| result.result), Some(0));

        let forced = run_on_cnf(&cnf, Config::unbounded(), &mut CoreDeadAnalysis::default(), &[], &mut monitor);
        assert_eq!(forced.unwrap().and_then(|result| result.result), None);
    }

    #[test]
    fn slice() {
        let sliced = CnfSlicer::new(["A"])
            .with_config(Config::unbounded())
            .slice(&cnf(), &mut Monitor::default())
            .unwrap();
        assert_eq!(sliced.variables().names().collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(sliced.clauses(), &[LiteralSet::new([])]);
    }
}

mod jobs {
    use super::*;

    #[test]
    fn cancelled_count() {
        let variables = Arc::new(Variables::new((1..=24).map(|v| format!("v{v}"))));
        let cnf = CNF::new(variables);

        let job = LongRunningJob::spawn("count", move |monitor| {
            let count = run_on_cnf(&cnf, Config::unbounded(), &mut CountSolutionsAnalysis::default(), &[], monitor)?;
            Ok(count.map(|count| count.result))
        });
        job.cancel();
        assert_eq!(job.join(), Err(ErrorKind::Cancelled));
    }

    #[test]
    fn finished_count() {
        let variables = Arc::new(Variables::new(["A", "B", "C"]));
        let cnf = CNF::from_clauses(variables, [vec![1, 2]]).unwrap();

        let mut job = LongRunningJob::spawn("count", move |monitor| {
            let count = run_on_cnf(&cnf, Config::unbounded(), &mut CountSolutionsAnalysis::default(), &[], monitor)?;
            Ok(count.map(|count| count.result))
        });
        let mut result = None;
        while result.is_none() {
            result = job.join_timeout(Duration::from_millis(50));
        }
        assert_eq!(result, Some(Ok(Some(6))));
    }
}

mod dimacs {
    use super::*;

    #[test]
    fn named_core_dead() {
        let dimacs = b"
c 1 Car
c 2 Engine
c 3 Turbo
p cnf 3 3
 1  0
-1  2  0
-3 -2  0
";
        let cnf = read_dimacs(dimacs.as_slice()).unwrap();
        let mut monitor = Monitor::default();
        let forced = run_on_cnf(&cnf, Config::unbounded(), &mut CoreDeadAnalysis::default(), &[], &mut monitor)
            .unwrap()
            .and_then(|result| result.result)
            .unwrap();

        assert_eq!(cnf.variables().names_of(&forced, Some(true)), Ok(vec!["Car".to_string(), "Engine".to_string()]));
        assert_eq!(cnf.variables().names_of(&forced, Some(false)), Ok(vec!["Turbo".to_string()]));
    }

    #[test]
    fn slice_round_trip() {
        let dimacs = b"c 1 A\nc 2 B\nc 3 C\np cnf 3 2\n-1 2 0\n-2 3 0\n";
        let cnf = read_dimacs(dimacs.as_slice()).unwrap();
        let sliced = CnfSlicer::new(["B"]).slice(&cnf, &mut Monitor::default()).unwrap();

        let read = read_dimacs(sliced.to_string().as_bytes()).unwrap();
        assert_eq!(read, sliced);
        assert_eq!(read.variables().names().collect::<Vec<_>>(), vec!["A", "C"]);
    }
}
