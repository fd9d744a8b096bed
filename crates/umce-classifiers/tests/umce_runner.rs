use std::sync::{Arc, Mutex};

use ndarray::Array2;
use umce_classifiers::config::{ClassifierFamily, EvaluationConfig, Method};
use umce_classifiers::data_handling::{DatasetSplit, Datasets, LabelEncoding, LabeledTable};
use umce_classifiers::evaluation::{evaluate, evaluate_all};
use umce_classifiers::models::{ClassifierFactory, ClassifierModel};
use umce_classifiers::outcome::{FamilyOutcome, RunStage};
use umce_classifiers::umce::UmceRunner;

/// `n_neg` negatives near the origin, `n_pos` positives near (5, 5).
fn table(n_neg: usize, n_pos: usize) -> LabeledTable {
    let mut data = Vec::new();
    let mut labels = Vec::new();
    for i in 0..n_neg {
        data.extend_from_slice(&[(i % 10) as f64 * 0.1, (i / 10) as f64 * 0.1]);
        labels.push("negative".to_string());
    }
    for i in 0..n_pos {
        data.extend_from_slice(&[5.0 + (i % 3) as f64 * 0.1, 5.0 + (i % 4) as f64 * 0.1]);
        labels.push("positive".to_string());
    }
    LabeledTable::new(
        vec!["x".into(), "y".into()],
        "Class",
        Array2::from_shape_vec((n_neg + n_pos, 2), data).unwrap(),
        labels,
    )
    .unwrap()
}

fn datasets(splits: Vec<DatasetSplit>) -> Datasets {
    let mut datasets = Datasets::new();
    datasets.insert("toy".to_string(), splits);
    datasets
}

fn small_config() -> EvaluationConfig {
    let mut config = EvaluationConfig::default();
    config.model.random_forest.n_estimators = 10;
    config
}

/// Records `(member, rows, positives)` of every training set it sees.
#[derive(Default)]
struct RecordingFactory {
    seen: Arc<Mutex<Vec<(usize, usize, usize)>>>,
}

struct RecordingModel {
    member: usize,
    seen: Arc<Mutex<Vec<(usize, usize, usize)>>>,
}

impl ClassifierModel for RecordingModel {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> anyhow::Result<()> {
        let positives = y.iter().filter(|&&l| l == 1).count();
        self.seen.lock().unwrap().push((self.member, x.nrows(), positives));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> anyhow::Result<Vec<usize>> {
        // Positive exactly where the first feature is large.
        Ok(x.column(0).iter().map(|&v| usize::from(v > 2.5)).collect())
    }

    fn family(&self) -> ClassifierFamily {
        ClassifierFamily::DecisionTree
    }
}

impl ClassifierFactory for RecordingFactory {
    fn build(&self, _family: ClassifierFamily, member: usize) -> Box<dyn ClassifierModel> {
        Box::new(RecordingModel {
            member,
            seen: Arc::clone(&self.seen),
        })
    }
}

#[test]
fn test_ratio_ten_trains_ten_balanced_members() {
    let factory = RecordingFactory::default();
    let runner = UmceRunner::new(
        &factory,
        vec![ClassifierFamily::DecisionTree],
        LabelEncoding::default(),
        42,
    );
    let split = DatasetSplit {
        train: table(100, 10),
        test: table(20, 5),
    };

    let outcome = runner.run_split("toy", 0, &split).unwrap();

    let mut seen = factory.seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen.len(), 10);
    for (i, &(member, rows, positives)) in seen.iter().enumerate() {
        assert_eq!(member, i);
        assert_eq!(rows, 20);
        assert_eq!(positives, 10);
    }

    match &outcome[&ClassifierFamily::DecisionTree] {
        FamilyOutcome::Scored { metrics, members, .. } => {
            assert_eq!(*members, 10);
            assert_eq!(metrics.balanced_accuracy, 1.0);
            assert_eq!(metrics.classification_error, 0.0);
        }
        other => panic!("expected a scored outcome, got {:?}", other),
    }
}

#[test]
fn test_real_families_score_separable_data() {
    let config = small_config();
    let runner = UmceRunner::from_config(&config);
    let results = runner.run(&datasets(vec![
        DatasetSplit {
            train: table(60, 12),
            test: table(20, 5),
        },
        DatasetSplit {
            train: table(50, 10),
            test: table(10, 4),
        },
    ]));

    let per_family = &results["toy"];
    assert_eq!(per_family.len(), 3);
    for (family, outcomes) in per_family {
        assert_eq!(outcomes.len(), 2, "{}", family);
        for outcome in outcomes {
            let metrics = outcome.metrics().unwrap_or_else(|| panic!("{} skipped: {:?}", family, outcome));
            assert_eq!(metrics.f1_score, 1.0);
        }
    }
}

#[test]
fn test_parallel_run_matches_sequential() {
    let mut config = small_config();
    let data = datasets(vec![DatasetSplit {
        train: table(45, 9),
        test: table(15, 3),
    }]);

    let sequential = UmceRunner::from_config(&config).run(&data);
    config.parallel = true;
    let parallel = UmceRunner::from_config(&config).run(&data);
    assert_eq!(sequential, parallel);
}

#[test]
fn test_failures_are_recorded_not_fatal() {
    let config = small_config();
    let runner = UmceRunner::from_config(&config);

    let mut mismatched = table(10, 2);
    mismatched.feature_names[1] = "z".into();
    let results = runner.run(&datasets(vec![
        // No minority rows in training.
        DatasetSplit {
            train: table(30, 0),
            test: table(5, 2),
        },
        // Test set holds one class only.
        DatasetSplit {
            train: table(30, 10),
            test: table(5, 0),
        },
        DatasetSplit {
            train: table(30, 10),
            test: mismatched,
        },
        DatasetSplit {
            train: table(30, 10),
            test: table(6, 2),
        },
    ]));

    for outcomes in results["toy"].values() {
        assert_eq!(outcomes.len(), 4);
        assert!(matches!(&outcomes[0], FamilyOutcome::Skipped { stage: RunStage::PartitionFolds, .. }));
        assert!(matches!(&outcomes[1], FamilyOutcome::Skipped { stage: RunStage::ComputeMetrics, .. }));
        assert!(matches!(&outcomes[2], FamilyOutcome::Skipped { stage: RunStage::Start, .. }));
        assert!(outcomes[3].metrics().is_some());
    }
}

#[test]
fn test_sweep_reports_every_method() {
    let mut config = small_config();
    config.model.families = vec![ClassifierFamily::DecisionTree, ClassifierFamily::NaiveBayes];
    let data = datasets(vec![DatasetSplit {
        train: table(40, 8),
        test: table(10, 2),
    }]);

    let reports = evaluate_all(&data, &config);
    let methods: Vec<Method> = reports.iter().map(|r| r.method).collect();
    assert_eq!(methods, Method::ALL.to_vec());

    for report in &reports {
        let per_family = &report.results["toy"];
        assert_eq!(per_family.len(), 2, "{}", report.method);
        for outcomes in per_family.values() {
            match report.method {
                // The classes never touch, so ADASYN finds no hard rows.
                Method::Adasyn => assert!(matches!(
                    &outcomes[0],
                    FamilyOutcome::Skipped { stage: RunStage::Resample, .. }
                )),
                _ => assert_eq!(outcomes[0].metrics().unwrap().balanced_accuracy, 1.0),
            }
        }
    }

    let averaged = evaluate(Method::Umce, &data, &config).average();
    let entry = &averaged.results["toy"][&ClassifierFamily::NaiveBayes];
    assert_eq!(entry.scored_splits, 1);
}
