use ndarray::Array2;
use umce_classifiers::config::{ClassifierFamily, ModelConfig};
use umce_classifiers::models::{build_model, ClassifierFactory};

fn toy() -> (Array2<f64>, Vec<usize>) {
    let x = Array2::from_shape_vec(
        (8, 2),
        vec![
            1.0, 0.0, // positive
            0.0, 1.0, // negative
            1.0, 0.1, // positive
            0.0, 0.9, // negative
            1.1, 0.0, // positive
            0.0, 1.2, // negative
            0.9, 0.2, // positive
            0.1, 1.1, // negative
        ],
    )
    .expect("failed to create feature matrix");
    (x, vec![1, 0, 1, 0, 1, 0, 1, 0])
}

#[test]
fn test_factory_builds_and_predicts_every_family() {
    let (x, y) = toy();
    let config = ModelConfig::default();

    for family in ClassifierFamily::ALL {
        let mut model = build_model(&config, family, 0);
        assert_eq!(model.family(), family);
        assert_eq!(model.name(), family.as_str());

        model.fit(&x, &y).unwrap();
        let predictions = model.predict(&x).unwrap();
        assert_eq!(predictions.len(), x.nrows());
        assert_eq!(predictions, y, "{} misclassified the toy set", family);
    }
}

#[test]
fn test_factory_gives_fresh_models() {
    let (x, _) = toy();
    let config = ModelConfig::default();
    let model = config.build(ClassifierFamily::NaiveBayes, 3);
    assert!(model.predict(&x).is_err());
}

#[test]
fn test_member_seeds_are_offset() {
    let config = ModelConfig::new(vec![ClassifierFamily::RandomForest], Some(42));
    assert_eq!(config.member_seed(0), Some(42));
    assert_eq!(config.member_seed(5), Some(47));
    assert_eq!(ModelConfig::new(vec![], None).member_seed(1), None);
}
