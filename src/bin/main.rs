use token_verdict_engine::{logging, narrative::NarrativeAdapter, EngineConfig, Orchestrator};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    logging::init();

    let input = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if input.trim().is_empty() {
        eprintln!("usage: verdict <contract address | dexscreener url | pump.fun url>");
        return ExitCode::from(2);
    }

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let orchestrator = match NarrativeAdapter::from_config(&config)
        .and_then(|narrator| Orchestrator::from_config(&config, Arc::new(narrator)))
    {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            eprintln!("Failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(input = %input, "Running analysis");

    match orchestrator.analyze_asset(&input).await {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
