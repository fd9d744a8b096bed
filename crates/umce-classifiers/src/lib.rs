//! umce-classifiers: classifier evaluation on class-imbalanced binary data.
//!
//! The centerpiece is the UMCE balanced-fold ensemble (`umce`): the majority
//! class is split into `round(IR)` folds, each fold plus the full minority
//! class trains one member per classifier family, and the members' hard
//! labels are combined by majority vote. For comparison the crate also runs
//! single-model pipelines on the raw training table or on tables rebalanced
//! by random under/oversampling, SMOTE and ADASYN (`baseline`, `sampling`).
//!
//! Around that sit the KEEL/CSV dataset reader (`io`), the metric vector
//! (`metrics`), reports with averaging/flattening/ranking (`report`) and
//! descriptive statistics plus one-way ANOVA (`stats`).
pub mod baseline;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod metrics;
pub mod models;
pub mod outcome;
pub mod preprocessing;
pub mod report;
pub mod sampling;
pub mod stats;
pub mod umce;
