mod commands;

use clap::{Parser, Subcommand};
use tracing::info;

use lgbm_bridge::{Bridge, BridgeConfig, Parameters, PredictType};
use lgbm_core::config::default_config_path;

#[derive(Parser)]
#[command(name = "lgbm")]
#[command(about = "Train and run gradient-boosted models through the lgbm bridge")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the engine library and report where it came from
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a data file and print its shape
    Inspect {
        /// Data file (CSV, TSV, LibSVM or binary)
        #[arg(short, long)]
        data: String,

        /// Dataset to align bins with
        #[arg(short, long)]
        reference: Option<String>,

        /// Engine parameter, key=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Train a model and save it
    Train {
        /// Training data file
        #[arg(short, long)]
        data: String,

        /// Validation data file (repeatable)
        #[arg(long)]
        valid: Vec<String>,

        /// Boosting rounds
        #[arg(short = 'n', long, default_value_t = 100)]
        rounds: usize,

        /// Where to write the model
        #[arg(short, long)]
        output: String,

        /// Engine parameter, key=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score a data file with a saved model
    Predict {
        /// Model file
        #[arg(short, long)]
        model: String,

        /// Data file to score
        #[arg(short, long)]
        data: String,

        /// Where to write the predictions
        #[arg(short, long)]
        output: String,

        /// Raw scores instead of transformed output
        #[arg(long, conflicts_with = "leaf")]
        raw: bool,

        /// Leaf indices instead of scores
        #[arg(long)]
        leaf: bool,

        /// Iterations to use (0 = all)
        #[arg(long, default_value_t = 0)]
        num_iteration: i64,

        /// Data file has a header line
        #[arg(long)]
        header: bool,
    },
}

/// Validate `key=value` arguments and join them into one parameter string.
fn join_params(params: &[String]) -> anyhow::Result<String> {
    let mut joined = Parameters::new();
    for param in params {
        let (key, value) = Parameters::parse_assignment(param)?;
        joined.set(key, value);
    }
    Ok(joined.render())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = BridgeConfig::load_or_default(&config_path);
    lgbm_common::init_logging_with_default(&config.logging.filter);

    let bridge = Bridge::from_config(config)?;
    info!("engine: {}", bridge.engine().describe());

    match cli.command {
        Commands::Info { json } => {
            let engine = bridge.engine().describe();
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "engine": engine,
                        "platform": lgbm_common::platform::platform_name(),
                        "config": config_path,
                    })
                );
            } else {
                println!("engine library: {}", engine);
                println!("platform:       {}", lgbm_common::platform::platform_name());
                println!("config:         {}", config_path);
            }
        }

        Commands::Inspect {
            data,
            reference,
            params,
            json,
        } => {
            let params = join_params(&params)?;
            let report = commands::inspect(&bridge, &data, reference.as_deref(), &params)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}: {} rows, {} features", report.path, report.num_data, report.num_feature);
            }
        }

        Commands::Train {
            data,
            valid,
            rounds,
            output,
            params,
            json,
        } => {
            let params = join_params(&params)?;
            let report = commands::train(&bridge, &data, &valid, rounds, &params, &output)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("trained {} iterations, model saved to {}", report.iterations, report.model);
                for m in &report.metrics {
                    println!("  {} {}: {}", m.partition, m.metric, m.value);
                }
            }
        }

        Commands::Predict {
            model,
            data,
            output,
            raw,
            leaf,
            num_iteration,
            header,
        } => {
            let predict_type = if leaf {
                PredictType::LeafIndex
            } else if raw {
                PredictType::RawScore
            } else {
                PredictType::Normal
            };
            let iterations = commands::predict(
                &bridge,
                &model,
                &data,
                &output,
                predict_type,
                num_iteration,
                header,
            )?;
            println!("model with {} iterations, predictions written to {}", iterations, output);
        }
    }

    Ok(())
}
