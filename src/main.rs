//! CLI entry point for the transit delay predictor.
//!
//! Provides subcommands for ingesting raw telemetry records into the CSV
//! store, predicting delays for a payload, and listing stored records.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use delay_predictor::cleaning::clean_record;
use delay_predictor::config::Settings;
use delay_predictor::features::derive_features;
use delay_predictor::model::ModelServer;
use delay_predictor::record::{PredictionResult, RawRecord, StoredRecord};
use delay_predictor::store::CsvStore;

#[derive(Parser)]
#[command(name = "delay_predictor")]
#[command(about = "Cleans transit telemetry records and predicts delays", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean one or more raw records and append them to the store
    Ingest {
        /// JSON payload: an object or array, inline or a path to a file
        #[arg(value_name = "PAYLOAD")]
        payload: String,

        /// CSV record store (defaults to STORE_PATH)
        #[arg(short, long)]
        store: Option<String>,

        /// Model artifact to predict with after storing (defaults to MODEL_PATH)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Clean a raw record, derive features, and predict its delay
    Predict {
        /// JSON payload: a single object, inline or a path to a file
        #[arg(value_name = "PAYLOAD")]
        payload: String,

        /// Model artifact path (defaults to MODEL_PATH)
        #[arg(short, long)]
        model: Option<String>,

        /// Invoke the trained artifact instead of the rule-based baseline
        #[arg(long, default_value_t = false)]
        use_model: bool,

        /// Also store the cleaned record and link its id into the result
        #[arg(long, default_value_t = false)]
        persist: bool,

        /// CSV record store (defaults to STORE_PATH)
        #[arg(short, long)]
        store: Option<String>,
    },
    /// List stored records
    Records {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        #[arg(short, long, default_value_t = 0)]
        offset: usize,

        /// CSV record store (defaults to STORE_PATH)
        #[arg(short, long)]
        store: Option<String>,
    },
}

/// Ingest outcome for one record: what was stored, and the prediction when
/// a model was available.
#[derive(Serialize)]
struct IngestOutcome {
    record: StoredRecord,
    prediction: Option<PredictionResult>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/delay_predictor.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("delay_predictor.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Commands::Ingest {
            payload,
            store,
            model,
        } => {
            let store = CsvStore::new(store.unwrap_or(settings.store_path));
            let server = ModelServer::new();
            server.load_model(&model.unwrap_or(settings.model_path))?;

            let records = read_raw_records(&payload)?;
            let outcomes = ingest_records(&records, &store, &server)?;
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        }
        Commands::Predict {
            payload,
            model,
            use_model,
            persist,
            store,
        } => {
            let store = CsvStore::new(store.unwrap_or(settings.store_path));
            let server = ModelServer::new();
            server.load_model(&model.unwrap_or(settings.model_path))?;

            let raw = read_raw_record(&payload)?;
            let result = predict_record(&raw, &store, &server, use_model, persist)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Records {
            limit,
            offset,
            store,
        } => {
            let store = CsvStore::new(store.unwrap_or(settings.store_path));
            let records = store.list(limit, offset)?;
            info!(count = records.len(), limit, offset, "Listing stored records");
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

/// Reads a payload argument as either a path to a JSON file or inline JSON.
fn read_payload(payload: &str) -> Result<serde_json::Value> {
    let content = if Path::new(payload).exists() {
        std::fs::read_to_string(payload)
            .with_context(|| format!("failed to read payload file {}", payload))?
    } else {
        payload.to_string()
    };
    serde_json::from_str(&content).context("payload is not valid JSON")
}

fn read_raw_record(payload: &str) -> Result<RawRecord> {
    let value = read_payload(payload)?;
    serde_json::from_value(value).context("payload is not a record object")
}

/// Accepts a single record object or an array of them.
fn read_raw_records(payload: &str) -> Result<Vec<RawRecord>> {
    let value = read_payload(payload)?;
    if value.is_array() {
        serde_json::from_value(value).context("payload is not an array of record objects")
    } else {
        let record = serde_json::from_value(value).context("payload is not a record object")?;
        Ok(vec![record])
    }
}

/// Cleans and stores each record, predicting with the baseline when a
/// model is loaded.
fn ingest_records(
    records: &[RawRecord],
    store: &CsvStore,
    server: &ModelServer,
) -> Result<Vec<IngestOutcome>> {
    if !server.loaded() {
        warn!("Model not loaded, ingesting without predictions");
    }

    let mut outcomes = Vec::with_capacity(records.len());
    for raw in records {
        let cleaned = clean_record(raw, store)?;
        let stored = store.append(&cleaned)?;

        let prediction = if server.loaded() {
            let features = derive_features(&cleaned);
            let predicted_delay = server.predict(&features, true)?;
            Some(PredictionResult {
                record_id: Some(stored.id),
                predicted_delay,
                model_version: server.version().unwrap_or_else(|| "v1".to_string()),
            })
        } else {
            None
        };

        info!(
            record_id = stored.id,
            route_id = %stored.route_id,
            predicted = prediction.is_some(),
            "Record ingested"
        );
        outcomes.push(IngestOutcome {
            record: stored,
            prediction,
        });
    }
    Ok(outcomes)
}

/// Full prediction path: clean, derive features, dispatch.
fn predict_record(
    raw: &RawRecord,
    store: &CsvStore,
    server: &ModelServer,
    use_model: bool,
    persist: bool,
) -> Result<PredictionResult> {
    let cleaned = clean_record(raw, store)?;
    let features = derive_features(&cleaned);
    let predicted_delay = server.predict(&features, !use_model)?;

    let record_id = if persist {
        Some(store.append(&cleaned)?.id)
    } else {
        None
    };

    info!(
        predicted_delay,
        use_model,
        record_id = ?record_id,
        "Prediction complete"
    );
    Ok(PredictionResult {
        record_id,
        predicted_delay,
        model_version: server.version().unwrap_or_else(|| "v1".to_string()),
    })
}
