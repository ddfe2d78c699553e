use carpool_match::config::Settings;
use carpool_match::simulation;
use carpool_match::{BatchRequest, MatchEngine};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn read_request(path: &str) -> Result<BatchRequest, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))?;
    serde_json::from_str(&raw).map_err(|e| format!("cannot parse {}: {}", path, e))
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);
    info!("Starting carpool batch matcher...");

    let batch_config = settings.batch_config();
    info!("Batch configuration: {:?}", batch_config);

    let request = match std::env::args().nth(1) {
        Some(path) => {
            info!("Reading batch from {}", path);
            match read_request(&path) {
                Ok(request) => request,
                Err(e) => {
                    error!("{}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => {
            info!("No input file given, generating a synthetic pool (seed {})", settings.simulation.seed);
            simulation::generate_pool(&settings.simulation, &batch_config)
        }
    };

    let engine = MatchEngine::new(batch_config);
    let report = match engine.report(
        &request.drivers,
        &request.passengers,
        settings.matching.explain_rejections,
    ) {
        Ok(report) => report,
        Err(e) => {
            error!("Batch rejected: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stats = &report.statistics;
    info!(
        "Matched {}/{} passengers, fleet occupancy {:.1}%, revenue {:.2}",
        stats.matched_passengers,
        stats.total_passengers,
        stats.fleet_occupancy_percent,
        stats.total_revenue
    );

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}
