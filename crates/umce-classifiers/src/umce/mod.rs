//! Balanced-fold majority-vote ensemble (UMCE).
//!
//! The majority class of a training split is shuffled with an explicit seed
//! and cut into `k = round(IR)` near-equal folds. Each fold joined with the
//! whole minority class trains one member per classifier family, every member
//! predicts the shared test split, and the members' hard labels are reduced
//! by majority vote before scoring.
pub mod partition;
pub mod runner;
pub mod trainer;
pub mod vote;

pub use partition::{fold_count, partition, Fold};
pub use runner::UmceRunner;
pub use trainer::{EnsembleMember, EnsembleTrainer, FamilyEnsemble};
pub use vote::{aggregate, PredictionVector};
