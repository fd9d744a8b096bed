use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

use umce_classifiers::config::Method;
use umce_classifiers::report::{write_rows_csv, DEFAULT_FLAT_METRICS};
use umce_classifiers::stats::GroupBy;
use umce_cli::commands::evaluate::{
    load_evaluate_config, override_methods, run_evaluation, EvaluateConfig,
};
use umce_cli::commands::flatten::flatten_results;
use umce_cli::commands::rank::rank_results;
use umce_cli::commands::stats::stats_report;

const METRICS: [&str; 7] = [
    "accuracy",
    "balanced_accuracy",
    "precision",
    "recall",
    "f1_score",
    "classification_error",
    "auc_roc",
];

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("UMCE_LOG", "error,umce=info"))
        .init();

    let matches = Command::new("umce")
        .version(clap::crate_version!())
        .about("Imbalanced classification benchmark: UMCE ensembles against resampling baselines")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("evaluate")
                .about("Run the evaluation sweep over a directory of KEEL datasets")
                .arg(
                    Arg::new("config")
                        .help("Path to evaluation JSON configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data_dir")
                        .short('d')
                        .long("data-dir")
                        .help("Directory with one sub-directory per dataset. Overrides the config.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .help("Directory the reports are written to. Overrides the config.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("method")
                        .short('m')
                        .long("method")
                        .help("Method to run; repeat for several. Defaults to all methods.")
                        .value_parser(Method::ALL.map(|m| m.as_str()))
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("reload")
                        .long("reload")
                        .help("Re-read the data directory instead of the dataset cache.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .help("Train UMCE folds in parallel.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("flatten")
                .about("Flatten every average_*.json in a results directory into one CSV")
                .arg(
                    Arg::new("results_dir")
                        .help("Directory holding average_<method>.json files")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("CSV file to write. Defaults to <results_dir>/flatten.csv.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("metric")
                        .long("metric")
                        .help("Metric to keep; repeat for several. Defaults to f1_score, balanced_accuracy, auc_roc.")
                        .value_parser(METRICS)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("rank")
                .about("Rank classifier families per dataset")
                .arg(
                    Arg::new("results_dir")
                        .help("Directory holding average_<method>.json files")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("metric")
                        .long("metric")
                        .help("Metric to rank by.")
                        .value_parser(METRICS)
                        .default_value("balanced_accuracy"),
                ),
        )
        .subcommand(
            Command::new("stats")
                .about("Descriptive statistics and one-way ANOVA over a flattened CSV")
                .arg(
                    Arg::new("input")
                        .help("Flattened results (*.csv)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("metric")
                        .long("metric")
                        .help("Only analyse rows of this metric.")
                        .value_parser(METRICS),
                )
                .arg(
                    Arg::new("group_by")
                        .long("group-by")
                        .help("Column that forms the groups.")
                        .value_parser(["model", "method", "dataset"])
                        .default_value("model"),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("evaluate", sub_m)) => handle_evaluate(sub_m),
        Some(("flatten", sub_m)) => handle_flatten(sub_m),
        Some(("rank", sub_m)) => handle_rank(sub_m),
        Some(("stats", sub_m)) => handle_stats(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_evaluate(matches: &ArgMatches) -> Result<()> {
    let config_path = matches.get_one::<PathBuf>("config");
    let mut config = match config_path {
        Some(path) => {
            log::info!("[UMCE::Evaluate] Using config: {:?}", path);
            load_evaluate_config(path)?
        }
        None => {
            eprintln!("[UMCE::Evaluate] No config provided; using defaults.");
            EvaluateConfig::default()
        }
    };

    if let Some(dir) = matches.get_one::<PathBuf>("data_dir") {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = matches.get_one::<PathBuf>("output_dir") {
        config.output_dir = dir.clone();
    }
    if matches.get_flag("reload") {
        config.reload = true;
    }
    if matches.get_flag("parallel") {
        config.evaluation.parallel = true;
    }
    let methods = matches
        .get_many::<String>("method")
        .unwrap_or_default()
        .map(|m| Method::from_str(m).map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;
    override_methods(&mut config, methods);

    if config_path.is_none() {
        let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
        eprintln!("[UMCE::Evaluate] Default config:\n{}", default_json);
    }

    match run_evaluation(&config) {
        Ok(written) => {
            eprintln!(
                "[UMCE::Evaluate] Wrote {} reports to {}",
                written.len(),
                config.output_dir.display()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Evaluation failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn selected_metrics(matches: &ArgMatches) -> Vec<&str> {
    let metrics: Vec<&str> = matches
        .get_many::<String>("metric")
        .unwrap_or_default()
        .map(String::as_str)
        .collect();
    if metrics.is_empty() {
        DEFAULT_FLAT_METRICS.to_vec()
    } else {
        metrics
    }
}

fn handle_flatten(matches: &ArgMatches) -> Result<()> {
    let results_dir: &PathBuf = matches
        .get_one("results_dir")
        .expect("results_dir is a required argument");
    let output = matches
        .get_one::<PathBuf>("output_file")
        .cloned()
        .unwrap_or_else(|| results_dir.join("flatten.csv"));

    let rows = flatten_results(results_dir, &selected_metrics(matches))?;
    write_rows_csv(&output, &rows)?;
    eprintln!("[UMCE::Flatten] Wrote {} rows to {}", rows.len(), output.display());
    Ok(())
}

fn handle_rank(matches: &ArgMatches) -> Result<()> {
    let results_dir: &PathBuf = matches
        .get_one("results_dir")
        .expect("results_dir is a required argument");
    let metric: &String = matches.get_one("metric").expect("metric has a default");
    print!("{}", rank_results(results_dir, metric)?);
    Ok(())
}

fn handle_stats(matches: &ArgMatches) -> Result<()> {
    let input: &PathBuf = matches.get_one("input").expect("input is a required argument");
    let metric = matches.get_one::<String>("metric").map(String::as_str);
    let group_by = matches
        .get_one::<String>("group_by")
        .map(|g| GroupBy::from_str(g).map_err(anyhow::Error::msg))
        .transpose()?
        .unwrap_or(GroupBy::Model);
    print!("{}", stats_report(input, metric, group_by)?);
    Ok(())
}
