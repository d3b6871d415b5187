//! Stockfusion - baseline vs. fusion price forecasts for IDX instruments
//!
//! # Usage
//! ```sh
//! cargo run -- forecast --instrument BBCA
//! cargo run -- forecast --instrument GOTO --json
//! cargo run -- overview
//! ```
//!
//! Paths and the feature layout come from the environment (see `config`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use stockfusion::application::forecasting::ForecastPipeline;
use stockfusion::application::ml::FileModelRepository;
use stockfusion::application::overview::market_overview;
use stockfusion::config::Config;
use stockfusion::domain::attribution::{sector_comparison, top_features};
use stockfusion::domain::evaluation::{DEFAULT_SIGNIFICANCE, horizon_degradation};
use stockfusion::domain::forecast::ForecastOutcome;
use stockfusion::domain::market::instrument::Instrument;
use stockfusion::domain::ports::DatasetSource;
use stockfusion::infrastructure::dataset::{CachedDatasetSource, CsvDatasetLoader, DatasetCache};
use stockfusion::infrastructure::reports;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast the next three days with both models
    Forecast {
        /// Instrument symbol (e.g. BBCA, GOTO)
        #[arg(short, long)]
        instrument: Instrument,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Latest update, top price and market sentiment index
    Overview,
    /// Diebold-Mariano results and MAPE by horizon
    Evaluation {
        /// Significance level for the DM test
        #[arg(long, default_value_t = DEFAULT_SIGNIFICANCE)]
        alpha: f64,
    },
    /// Technical vs. sentiment SHAP contribution per sector
    Attribution {
        /// Also list the top features of this instrument
        #[arg(short, long)]
        instrument: Option<Instrument>,

        #[arg(long, default_value = "5")]
        top: usize,
    },
    /// Supported instruments and their sectors
    Instruments,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // logs on stderr so --json output stays parseable
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: data={:?}, models={:?}",
        config.data.data_dir, config.models.models_dir
    );

    let dataset: Arc<dyn DatasetSource> = Arc::new(CachedDatasetSource::new(
        CsvDatasetLoader::from_config(&config.data),
        Arc::new(DatasetCache::new()),
    ));

    match cli.command {
        Commands::Forecast { instrument, json } => {
            let pipeline = ForecastPipeline::new(
                dataset,
                Arc::new(FileModelRepository::new(config.models.clone())),
                config.layout().clone(),
            );
            let outcome = pipeline
                .forecast(instrument)
                .with_context(|| format!("Forecast for {} failed", instrument))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_forecast(&outcome);
            }
        }
        Commands::Overview => {
            let data = dataset.load()?;
            match market_overview(&data) {
                Some(overview) => {
                    println!("Last update      : {}", overview.last_update);
                    println!(
                        "Highest price    : {} ({:.0})",
                        overview.top_instrument, overview.top_price
                    );
                    println!("Sentiment index  : {:.4}", overview.sentiment_index);
                    let scenarios: Vec<&str> =
                        overview.active_scenarios.iter().map(|s| s.as_str()).collect();
                    println!("Active scenarios : {}", scenarios.join(", "));
                }
                None => warn!("Dataset is empty, nothing to summarize"),
            }
        }
        Commands::Evaluation { alpha } => {
            if let Some(dm) = reports::load_dm_table(&config.data.dm_test_path())? {
                println!("{:<8} {:>12} {:>10}  Preferred", "Emiten", "DM stat", "p-value");
                for record in &dm {
                    let preferred = record
                        .preferred(alpha)
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "no significant difference".to_string());
                    println!(
                        "{:<8} {:>12.4} {:>10.4}  {}",
                        record.instrument, record.dm_statistic, record.p_value, preferred
                    );
                }
            }

            if let Some(horizon) = reports::load_horizon_table(&config.data.horizon_path())? {
                let summary = horizon_degradation(&horizon);
                println!();
                for d in &summary.degradations {
                    let path: Vec<String> = d
                        .mape_by_horizon
                        .iter()
                        .map(|(h, mape)| format!("H+{} {:.2}%", h, mape))
                        .collect();
                    println!(
                        "{:<8} {:<9} {}{}",
                        d.instrument,
                        d.scenario,
                        path.join(" -> "),
                        if d.degrades { "  (degrades)" } else { "" }
                    );
                }
                println!(
                    "Lower MAPE: baseline {} / fusion {}; degrading paths {:.0}%",
                    summary.baseline_wins,
                    summary.fusion_wins,
                    summary.degrading_share() * 100.0
                );
            }
        }
        Commands::Attribution { instrument, top } => {
            if let Some(shap) = reports::load_shap_values(&config.data.shap_path())? {
                for panel in sector_comparison(&shap, config.layout()) {
                    println!(
                        "{:<20} technical {:.5}  sentiment {:.5}  ({:.1}% sentiment)",
                        panel.panel.to_string(),
                        panel.technical,
                        panel.sentiment,
                        panel.sentiment_share() * 100.0
                    );
                }
                if let Some(instrument) = instrument {
                    println!();
                    for record in top_features(&shap, instrument, top) {
                        println!("{:<4} {:.5}", record.feature, record.mean_abs_shap);
                    }
                }
            }
        }
        Commands::Instruments => {
            for instrument in Instrument::ALL {
                println!("{:<6} {}", instrument, instrument.sector());
            }
        }
    }

    Ok(())
}

fn print_forecast(outcome: &ForecastOutcome) {
    println!("Forecast for {}", outcome.instrument);
    if let Some(next) = &outcome.next_day {
        println!(
            "Last close {:.2} on {}; H+1 baseline {:.2} ({:+.2}), fusion {:.2} ({:+.2})",
            next.last_close,
            next.last_date,
            next.baseline_price,
            next.baseline_delta,
            next.fusion_price,
            next.fusion_delta
        );
    }
    println!(
        "{:<12} {:>12} {:>12} {:>10} {:>8}",
        "Date", "Baseline", "Fusion", "Spread", "Spread%"
    );
    for row in &outcome.table.rows {
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>10.2} {:>7.2}%",
            row.date.to_string(),
            row.baseline_price,
            row.fusion_price,
            row.spread,
            row.spread_pct
        );
    }
}
