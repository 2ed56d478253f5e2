use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod range;
pub mod request_id;

use crate::controllers::{health, speech::SpeechController};
use crate::infrastructure::config::Config;
use request_id::{request_id_middleware, X_REQUEST_ID};

/// Build the application router with all routes and layers configured
pub fn build_router(config: Arc<Config>, speech_controller: Arc<SpeechController>) -> Router {
    let speech_routes = Router::new()
        .route("/api/pdf-to-speech", post(SpeechController::synthesize))
        .route("/api/audio/:audioId", get(SpeechController::get_audio))
        .with_state(speech_controller);

    let cors = cors_layer(&config);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(config)
        .merge(speech_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(middleware::from_fn(request_id_middleware)),
        )
}

fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
            header::HeaderName::from_static(X_REQUEST_ID),
        ]);

    if config.is_development() {
        return base.allow_origin(AllowOrigin::any());
    }

    match config
        .cors_allowed_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => base.allow_origin(AllowOrigin::exact(origin)),
        None => {
            tracing::warn!("CORS_ALLOWED_ORIGIN not set; cross-origin requests will be rejected");
            base
        }
    }
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    speech_controller: Arc<SpeechController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(config.clone(), speech_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
