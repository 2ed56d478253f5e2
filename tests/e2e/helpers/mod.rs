use axum::Router;
use pdf_reader_backend::infrastructure::config::{Config, Environment, LogFormat};
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use wiremock::MockServer;


use api_client::TestClient;

/// Small enough that a few sentences span several chunks
pub const TEST_MAX_CHUNK_SIZE: usize = 50;

pub struct TestContext {
    pub client: TestClient,
    pub base_url: String,
    pub provider: MockServer,
    #[allow(dead_code)]
    pub config: Config,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let provider = MockServer::start().await;

            let config = Config {
                host: "127.0.0.1".to_string(),
                port: 0, // Will be assigned by the OS
                environment: Environment::Development,
                log_format: LogFormat::Pretty,
                cors_allowed_origin: None,
                tts_api_url: provider.uri(),
                tts_api_key: "test-api-key".to_string(),
                tts_user_id: "test-user-id".to_string(),
                tts_model: "PlayDialog".to_string(),
                tts_max_chunk_size: TEST_MAX_CHUNK_SIZE,
                tts_request_timeout_secs: 5,
                tts_cache_enabled: true,
                tts_cache_capacity: 100,
            };

            let app = create_app(config.clone());

            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            // Wait for server to be ready
            tokio::time::sleep(Duration::from_millis(50)).await;

            Self {
                client: TestClient::new(&base_url),
                base_url,
                provider,
                config,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // The mock provider shuts down when dropped
        }
    }
}

impl TestContext {
    /// Number of calls the mock provider has received so far
    pub async fn provider_calls(&self) -> usize {
        self.provider
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

fn create_app(config: Config) -> Router {
    use pdf_reader_backend::{
        controllers::speech::SpeechController,
        domain::speech::{SpeechRequestDispatcher, SpeechService},
        infrastructure::{
            http::build_router,
            repositories::{MokaSynthesisCache, PlayAiTtsRepository, SynthesisCache, TtsRepository},
        },
    };

    let config = Arc::new(config);

    let tts_repo: Arc<dyn TtsRepository> = Arc::new(PlayAiTtsRepository::new(
        config.tts_api_url.clone(),
        config.tts_api_key.clone(),
        config.tts_user_id.clone(),
        config.tts_model.clone(),
    ));
    let cache: Option<Arc<dyn SynthesisCache>> =
        Some(Arc::new(MokaSynthesisCache::new(config.tts_cache_capacity)));

    let dispatcher = SpeechRequestDispatcher::new(
        tts_repo,
        cache,
        Duration::from_secs(config.tts_request_timeout_secs),
    );
    let speech_service = Arc::new(SpeechService::new(dispatcher, config.tts_max_chunk_size));
    let speech_controller = Arc::new(SpeechController::new(speech_service));

    build_router(config, speech_controller)
}
