//! Sweep of every comparison method over a set of datasets.
use crate::config::{EvaluationConfig, Method};
use crate::baseline::SingleModelPipeline;
use crate::data_handling::Datasets;
use crate::report::EvaluationReport;
use crate::sampling::sampler_for;
use crate::umce::UmceRunner;

/// Evaluate one method on every split of every dataset.
///
/// Failures are recorded in the report; this never aborts part-way.
pub fn evaluate(method: Method, datasets: &Datasets, config: &EvaluationConfig) -> EvaluationReport {
    log::info!("Evaluating method {} on {} datasets", method, datasets.len());
    let results = match method {
        Method::Umce => UmceRunner::from_config(config).run(datasets),
        other => SingleModelPipeline::from_config(config, sampler_for(other, &config.sampling)).run(datasets),
    };
    EvaluationReport::new(method, results)
}

/// Evaluate every method listed in `config.methods`, in order.
pub fn evaluate_all(datasets: &Datasets, config: &EvaluationConfig) -> Vec<EvaluationReport> {
    config
        .methods
        .iter()
        .map(|&method| evaluate(method, datasets, config))
        .collect()
}
