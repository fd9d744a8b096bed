use crate::config::{ClassifierFamily, ModelConfig};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::decision_tree::DecisionTreeClassifier;
use crate::models::naive_bayes::NaiveBayesClassifier;
use crate::models::random_forest::RandomForestClassifier;

/// Produces fresh, unfitted classifiers.
///
/// `member` is the ensemble position (fold index) the model is built for; a
/// seeded factory derives a distinct but reproducible seed from it.
pub trait ClassifierFactory: Sync {
    fn build(&self, family: ClassifierFamily, member: usize) -> Box<dyn ClassifierModel>;
}

impl ClassifierFactory for ModelConfig {
    fn build(&self, family: ClassifierFamily, member: usize) -> Box<dyn ClassifierModel> {
        build_model(self, family, member)
    }
}

/// Build a boxed classifier model of `family` from a `ModelConfig`.
pub fn build_model(
    config: &ModelConfig,
    family: ClassifierFamily,
    member: usize,
) -> Box<dyn ClassifierModel> {
    match family {
        ClassifierFamily::RandomForest => Box::new(RandomForestClassifier::new(
            config.random_forest.clone(),
            config.member_seed(member),
        )),
        ClassifierFamily::DecisionTree => {
            Box::new(DecisionTreeClassifier::new(config.decision_tree.clone()))
        }
        ClassifierFamily::NaiveBayes => {
            Box::new(NaiveBayesClassifier::new(config.naive_bayes.clone()))
        }
    }
}
