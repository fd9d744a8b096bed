pub mod evaluate;
pub mod flatten;
pub mod rank;
pub mod stats;
