use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::error::ClientError;
use crate::domain::speech::{FrameDecoder, ProgressEvent, SpeechRequest};

/// Audio decoded from a successful terminal frame
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub bytes: Bytes,
    pub audio_id: Option<String>,
    pub duration_seconds: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct SpeechClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SpeechClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn audio_url(&self, audio_id: &str) -> String {
        format!("{}/api/audio/{}", self.base_url, audio_id)
    }

    /// Start a synthesis and decode the response into progress events as
    /// frames arrive
    pub async fn synthesize(
        &self,
        request: &SpeechRequest,
    ) -> Result<impl Stream<Item = Result<ProgressEvent, ClientError>> + Send + 'static, ClientError>
    {
        let url = format!("{}/api/pdf-to-speech", self.base_url);
        tracing::debug!(
            url = %url,
            voice_id = %request.voice_id,
            text_len = request.text.len(),
            "Requesting speech synthesis"
        );

        let response = self
            .http_client
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "Speech endpoint rejected request");
            return Err(ClientError::Status(status.as_u16()));
        }

        let mut body = Box::pin(response.bytes_stream());
        Ok(async_stream::stream! {
            let mut decoder = FrameDecoder::new();
            while let Some(read) = body.next().await {
                let bytes = match read {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(ClientError::Transport(e));
                        break;
                    }
                };
                for frame in decoder.push(&bytes) {
                    yield serde_json::from_str::<ProgressEvent>(&frame).map_err(ClientError::Decode);
                }
            }
            if decoder.pending() > 0 {
                tracing::warn!(pending = decoder.pending(), "Progress stream ended mid-frame");
            }
        })
    }

    /// Run a synthesis to completion, reporting intermediate progress
    pub async fn synthesize_audio<F>(
        &self,
        request: &SpeechRequest,
        mut on_progress: F,
    ) -> Result<SynthesizedAudio, ClientError>
    where
        F: FnMut(u8),
    {
        let events = self.synthesize(request).await?;
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            let event = event?;
            if !event.is_terminal() {
                on_progress(event.progress);
                continue;
            }

            if let Some(error) = event.error {
                tracing::warn!(error = %error, "Synthesis failed");
                return Err(ClientError::Synthesis(error));
            }

            let bytes = match event.decode_audio() {
                Some(decoded) => decoded?,
                None => return Err(ClientError::StreamEnded),
            };
            return Ok(SynthesizedAudio {
                bytes: Bytes::from(bytes),
                audio_id: event.audio_id,
                duration_seconds: event.duration,
            });
        }

        Err(ClientError::StreamEnded)
    }
}
