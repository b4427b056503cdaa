use token_verdict_engine::{
    api::{start_server, ApiState},
    conversational::ChatResponder,
    logging,
    narrative::NarrativeAdapter,
    EngineConfig, Orchestrator,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    logging::init();

    // Load and validate configuration once
    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("⚠️  {}", e);
            eprintln!("📌 See .env.example for setup instructions");
            return Err(e.into());
        }
    };

    info!("🚀 Token Verdict Engine - API Server");
    info!("📍 Port: {}", config.api_port);
    info!("🎭 Persona: {}", config.persona.name);

    // Create components
    let narrator = Arc::new(NarrativeAdapter::from_config(&config)?);
    let orchestrator = Arc::new(Orchestrator::from_config(&config, narrator.clone())?);
    let chat = Arc::new(ChatResponder::new(narrator));

    info!("✅ Orchestrator initialized");
    info!("📡 Starting API server...");

    // Start API server
    start_server(ApiState { orchestrator, chat }, config.api_port).await?;

    Ok(())
}
