use super::tts_repository::TtsRepository;
use crate::domain::speech::SynthesisParams;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

const OUTPUT_FORMAT: &str = "mp3";
const SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayAiSpeechRequest<'a> {
    model: &'a str,
    text: &'a str,
    voice: &'a str,
    output_format: &'static str,
    speed: f32,
    sample_rate: u32,
    language: &'static str,
    temperature: f32,
}

/// PlayAI implementation of TTS repository
pub struct PlayAiTtsRepository {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    user_id: String,
    model: String,
}

impl PlayAiTtsRepository {
    pub fn new(api_url: String, api_key: String, user_id: String, model: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url,
            api_key,
            user_id,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/tts", self.api_url.trim_end_matches('/'))
    }

    /// Build the provider request with URL, headers and body
    fn build_request(&self, text: &str, params: &SynthesisParams) -> reqwest::RequestBuilder {
        let body = PlayAiSpeechRequest {
            model: &self.model,
            text,
            voice: &params.voice_id,
            output_format: OUTPUT_FORMAT,
            speed: params.speed,
            sample_rate: SAMPLE_RATE,
            language: params.language.provider_name(),
            temperature: params.temperature,
        };

        self.http_client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-USER-ID", &self.user_id)
            .header("Accept", "audio/mpeg")
            .json(&body)
    }
}

/// Pull a human-readable message out of a provider error body
fn provider_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["error_message", "message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[async_trait]
impl TtsRepository for PlayAiTtsRepository {
    async fn synthesize_chunk(&self, text: &str, params: &SynthesisParams) -> Result<Bytes, String> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            model = %self.model,
            voice = %params.voice_id,
            language = %params.language,
            text_length = text.len(),
            text_preview = %text.chars().take(200).collect::<String>(),
            "Calling PlayAI TTS API"
        );

        let response = self
            .build_request(text, params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    voice = %params.voice_id,
                    text_length = text.len(),
                    "PlayAI TTS request failed"
                );
                format!("PlayAI TTS request failed: {}", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                error_body = %error_body,
                "PlayAI TTS API returned an error"
            );
            return Err(provider_error_message(&error_body)
                .unwrap_or_else(|| format!("PlayAI TTS API returned status {}", status.as_u16())));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read PlayAI TTS audio: {}", e))?;

        tracing::info!(
            provider = "playai",
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.len(),
            audio_size_bytes = audio.len(),
            "TTS chunk synthesized"
        );

        Ok(audio)
    }
}
