pub mod classifier_trait;
pub mod decision_tree;
pub mod factory;
pub mod naive_bayes;
pub mod random_forest;

pub use classifier_trait::ClassifierModel;
pub use factory::{build_model, ClassifierFactory};
