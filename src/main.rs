//! Quantum Forecast
//!
//! Serves the forecasting dashboard API and runs the offline training jobs.

use anyhow::Context;
use clap::{Parser, Subcommand};
use quantum_forecast::{
    api::{start_server, AppState},
    client::YahooClient,
    config::Config,
    data::{read_price_rows, write_feature_rows, DataStore},
    features::build_feature_rows,
    inference::Predictor,
    quantum::{CircuitConfig, Entanglement},
    storage::{ArtifactStore, QUANTUM_METRICS_FILE},
    trainer::{self, QuantumBackend, TrainOptions},
    types::{ModelKind, FEATURE_COLUMNS},
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Feature row used by `predict` when no values are given
const SAMPLE_ROW: [f64; 7] = [0.0, 99.9999, 50.0, 1.7709, 0.3541, 24.8623, 1149301200.0];

#[derive(Parser)]
#[command(name = "quantum-forecast")]
#[command(about = "Stock forecasting with a classical SVM and a variational quantum classifier")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Derive indicator features from a price CSV
    Features {
        /// OHLCV input file
        input: PathBuf,
        /// Output dataset (defaults to the configured dataset path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Train the classifiers and update the metrics file
    Train {
        /// statevector | hardware
        #[arg(long, default_value = "statevector")]
        backend: QuantumBackend,
        #[arg(long)]
        skip_svm: bool,
        #[arg(long)]
        skip_vqc: bool,
    },
    /// Score one feature row with a trained model
    Predict {
        /// svm | vqc | vqc-hardware
        #[arg(short, long, default_value = "vqc")]
        model: ModelKind,
        /// Comma-separated values for sma_crossover,price_sma_ratio,rsi,macd,macd_hist,adx,obv
        #[arg(long, value_delimiter = ',', num_args = 7)]
        values: Option<Vec<f64>>,
    },
    /// Write the circuit report served by /api/quantum-metrics
    Circuit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Serve { port } => serve(config, port).await,
        Commands::Features { input, output } => derive_features(config, input, output),
        Commands::Train {
            backend,
            skip_svm,
            skip_vqc,
        } => train(
            config,
            TrainOptions {
                backend,
                skip_svm,
                skip_vqc,
            },
        ),
        Commands::Predict { model, values } => predict(config, model, values),
        Commands::Circuit => write_circuit_report(config),
    }
}

async fn serve(mut config: Config, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    let market = YahooClient::from_config(&config.market)?;
    let state = AppState::new(config, Arc::new(market));
    start_server(state).await?;
    Ok(())
}

fn derive_features(config: Config, input: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let prices = read_price_rows(&input).with_context(|| format!("reading {}", input.display()))?;
    let rows = build_feature_rows(&prices);
    let output = output.unwrap_or_else(|| config.paths.dataset_path());
    write_feature_rows(&output, &rows)?;
    tracing::info!("Wrote {} feature rows to {}", rows.len(), output.display());
    Ok(())
}

fn train(config: Config, options: TrainOptions) -> anyhow::Result<()> {
    let data = DataStore::new(config.paths.clone());
    let store = ArtifactStore::new(config.paths.models_dir());
    let frame = data.feature_frame().context("loading feature dataset")?;

    let summary = trainer::run(frame, &config.training, &store, options)?;
    println!("Selected features: {}", summary.selected.join(", "));
    for score in &summary.scores {
        println!(
            "{:<14} accuracy {:>6.2}%  precision {:>6.2}%  recall {:>6.2}%  f1 {:>6.2}%  ({} train / {} test, {:.1}s)",
            score.model,
            score.report.accuracy * 100.0,
            score.report.precision * 100.0,
            score.report.recall * 100.0,
            score.report.f1 * 100.0,
            score.train_samples,
            score.test_samples,
            score.seconds
        );
    }
    Ok(())
}

fn predict(config: Config, model: ModelKind, values: Option<Vec<f64>>) -> anyhow::Result<()> {
    let values = values.unwrap_or_else(|| SAMPLE_ROW.to_vec());
    let row: HashMap<String, f64> = FEATURE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .zip(values)
        .collect();

    let predictor = Predictor::load(&ArtifactStore::new(config.paths.models_dir()))?;
    let class = predictor.predict(model, &row)?;
    println!("{} prediction: {}", model.metrics_key(), if class == 1 { "UP" } else { "DOWN" });
    Ok(())
}

fn write_circuit_report(config: Config) -> anyhow::Result<()> {
    let vqc = &config.training.vqc;
    let circuit = CircuitConfig {
        num_qubits: config.training.num_features,
        feature_map_reps: vqc.feature_map_reps,
        ansatz_reps: vqc.ansatz_reps,
        entanglement: Entanglement::Linear,
    };
    let summary = circuit.summary();
    let store = ArtifactStore::new(config.paths.models_dir());
    let path = store.save(QUANTUM_METRICS_FILE, &summary)?;
    println!(
        "Circuit: {} qubits, depth {}, {} gates, {} trainable parameters -> {}",
        summary.qubits,
        summary.circuit_depth,
        summary.gates,
        summary.trainable_parameters,
        path.display()
    );
    Ok(())
}
