use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ticket_triage::api::{build_router, start_server, AppState};
use ticket_triage::config::HistorySettings;
use ticket_triage::core::HistorySink;
use ticket_triage::utils::{logger, validation::Validate};
use ticket_triage::{AppConfig, CliConfig, LocalStorage, Predictor, SupabaseHistory, TicketClassifier};

fn history_sink(settings: Option<&HistorySettings>) -> Option<Arc<dyn HistorySink>> {
    let Some(settings) = settings else {
        tracing::warn!("SUPABASE_URL or SUPABASE_SERVICE_KEY missing, history disabled");
        return None;
    };

    if let Err(e) = settings.validate() {
        tracing::error!("History store disabled: {}", e);
        return None;
    }

    match SupabaseHistory::new(settings) {
        Ok(sink) => {
            tracing::info!("History store ready: {}", sink.endpoint());
            Some(Arc::new(sink))
        }
        Err(e) => {
            tracing::error!("History store init failed: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    let config = AppConfig::load(&cli).context("failed to load configuration")?;

    logger::init_logger(config.log_format, config.verbose);

    tracing::info!("Starting ticket-triage {}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        return Err(e.into());
    }

    let history = history_sink(config.history.as_ref());

    // A missing or broken model is a deployment error: refuse to start.
    let storage = LocalStorage::new(config.model.dir.clone());
    let classifier = TicketClassifier::load(
        &storage,
        &config.model.model_file,
        &config.model.vectorizer_file,
    )
    .await
    .with_context(|| format!("failed to load model artifacts from {}", config.model.dir))?;
    tracing::info!("ML model + vectorizer loaded successfully");

    tracing::info!("CORS allowed origins: {:?}", config.allowed_origins);

    let predictor = Predictor::new(Arc::new(classifier)).with_history(history);
    let app = build_router(AppState { predictor }, &config.allowed_origins);

    start_server(&config.server, app).await?;
    Ok(())
}
