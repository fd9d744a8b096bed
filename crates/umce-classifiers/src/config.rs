use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The classifier families evaluated by every method.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierFamily {
    /// Bagging ensemble of decision trees.
    RandomForest,
    DecisionTree,
    /// Gaussian naive Bayes.
    NaiveBayes,
}

impl ClassifierFamily {
    pub const ALL: [ClassifierFamily; 3] = [
        ClassifierFamily::RandomForest,
        ClassifierFamily::DecisionTree,
        ClassifierFamily::NaiveBayes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierFamily::RandomForest => "random_forest",
            ClassifierFamily::DecisionTree => "decision_tree",
            ClassifierFamily::NaiveBayes => "naive_bayes",
        }
    }
}

impl fmt::Display for ClassifierFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "random_forest" | "rf" => Ok(ClassifierFamily::RandomForest),
            "decision_tree" | "dt" => Ok(ClassifierFamily::DecisionTree),
            "naive_bayes" | "nb" => Ok(ClassifierFamily::NaiveBayes),
            _ => Err(format!(
                "Unknown classifier family: {}. Valid options are: random_forest, decision_tree, naive_bayes",
                s
            )),
        }
    }
}

/// Evaluation methods compared by a sweep.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Plain classifiers on the untouched training split.
    Baseline,
    RandomUndersampling,
    RandomOversampling,
    Smote,
    Adasyn,
    /// Balanced-fold majority-vote ensemble.
    Umce,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::Baseline,
        Method::RandomUndersampling,
        Method::RandomOversampling,
        Method::Smote,
        Method::Adasyn,
        Method::Umce,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Baseline => "baseline",
            Method::RandomUndersampling => "random_undersampling",
            Method::RandomOversampling => "random_oversampling",
            Method::Smote => "smote",
            Method::Adasyn => "adasyn",
            Method::Umce => "umce",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "baseline" => Ok(Method::Baseline),
            "random_undersampling" | "undersampling" => Ok(Method::RandomUndersampling),
            "random_oversampling" | "oversampling" => Ok(Method::RandomOversampling),
            "smote" => Ok(Method::Smote),
            "adasyn" => Ok(Method::Adasyn),
            "umce" => Ok(Method::Umce),
            _ => Err(format!(
                "Unknown method: {}. Valid options are: baseline, random_undersampling, random_oversampling, smote, adasyn, umce",
                s
            )),
        }
    }
}

/// Number of features each forest tree sees.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// Square root of the feature count, rounded down.
    Sqrt,
    All,
    Fraction(f64),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fraction(frac) => (n_features as f64 * frac).round() as usize,
        };
        n.clamp(1, n_features.max(1))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_weight_split: f32,
    pub min_weight_leaf: f32,
    /// `gini` or `entropy`.
    pub split_quality: String,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_weight_split: 2.0,
            min_weight_leaf: 1.0,
            split_quality: "gini".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    #[serde(flatten)]
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            tree: TreeParams::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct NaiveBayesParams {
    pub var_smoothing: f64,
}

impl Default for NaiveBayesParams {
    fn default() -> Self {
        Self { var_smoothing: 1e-9 }
    }
}

/// Central configuration for the classifiers in the crate.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub families: Vec<ClassifierFamily>,
    /// Seed for stochastic classifiers. Ensemble member `i` uses
    /// `random_state + i`; `None` draws from entropy.
    pub random_state: Option<u64>,
    pub random_forest: ForestParams,
    pub decision_tree: TreeParams,
    pub naive_bayes: NaiveBayesParams,
}

impl ModelConfig {
    pub fn new(families: Vec<ClassifierFamily>, random_state: Option<u64>) -> Self {
        Self {
            families,
            random_state,
            ..Self::default()
        }
    }

    /// Seed for the `member`-th model built from this configuration.
    pub fn member_seed(&self, member: usize) -> Option<u64> {
        self.random_state.map(|seed| seed.wrapping_add(member as u64))
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            families: ClassifierFamily::ALL.to_vec(),
            random_state: Some(42),
            random_forest: ForestParams::default(),
            decision_tree: TreeParams::default(),
            naive_bayes: NaiveBayesParams::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SamplingConfig {
    pub seed: u64,
    /// Neighbour count for SMOTE/ADASYN. `None` uses `min(5, n_classes - 1)`.
    pub k_neighbors: Option<usize>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            k_neighbors: None,
        }
    }
}

/// Parameters for one evaluation sweep.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct EvaluationConfig {
    pub label_column: String,
    pub positive_label: String,
    pub negative_label: String,
    /// Seed used to shuffle the majority class before fold partitioning.
    pub shuffle_seed: u64,
    /// Standardize features in the single-model pipelines.
    pub scale_features: bool,
    /// Train UMCE folds on the rayon thread pool.
    pub parallel: bool,
    pub methods: Vec<Method>,
    pub model: ModelConfig,
    pub sampling: SamplingConfig,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            label_column: "Class".to_string(),
            positive_label: "positive".to_string(),
            negative_label: "negative".to_string(),
            shuffle_seed: 42,
            scale_features: true,
            parallel: false,
            methods: Method::ALL.to_vec(),
            model: ModelConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}
