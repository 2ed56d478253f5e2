use pdf_reader_backend::controllers::speech::SpeechController;
use pdf_reader_backend::domain::speech::{SpeechRequestDispatcher, SpeechService};
use pdf_reader_backend::infrastructure::config::{Config, LogFormat};
use pdf_reader_backend::infrastructure::http::start_http_server;
use pdf_reader_backend::infrastructure::repositories::{
    MokaSynthesisCache, PlayAiTtsRepository, SynthesisCache, TtsRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting PDF Reader Backend on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        api_url = %config.tts_api_url,
        model = %config.tts_model,
        max_chunk_size = config.tts_max_chunk_size,
        request_timeout_secs = config.tts_request_timeout_secs,
        "TTS provider configured"
    );

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories
    tracing::info!("Instantiating repositories...");
    let tts_repo: Arc<dyn TtsRepository> = Arc::new(PlayAiTtsRepository::new(
        config.tts_api_url.clone(),
        config.tts_api_key.clone(),
        config.tts_user_id.clone(),
        config.tts_model.clone(),
    ));
    let cache: Option<Arc<dyn SynthesisCache>> = if config.tts_cache_enabled {
        tracing::info!(capacity = config.tts_cache_capacity, "Synthesis cache enabled");
        Some(Arc::new(MokaSynthesisCache::new(config.tts_cache_capacity)))
    } else {
        tracing::info!("Synthesis cache disabled");
        None
    };

    // 2. Instantiate services
    tracing::info!("Instantiating services...");
    let dispatcher = SpeechRequestDispatcher::new(
        tts_repo,
        cache,
        Duration::from_secs(config.tts_request_timeout_secs),
    );
    let speech_service = Arc::new(SpeechService::new(dispatcher, config.tts_max_chunk_size));

    // 3. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let speech_controller = Arc::new(SpeechController::new(speech_service));

    start_http_server(config, speech_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pdf_reader_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
