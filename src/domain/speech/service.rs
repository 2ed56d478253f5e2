use super::assembler::{assemble, AssembledAudio};
use super::chunker::chunk_text;
use super::dispatcher::{DispatchStep, SpeechRequestDispatcher};
use super::error::SpeechServiceError;
use super::fingerprint::SynthesisFingerprint;
use super::language::{build_detector, detect_language};
use super::progress::ProgressEvent;
use super::text::clean_text;
use super::{
    SpeechRequest, SynthesisParams, DEFAULT_SPEED, DEFAULT_TEMPERATURE, SPEED_RANGE,
    TEMPERATURE_RANGE,
};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use lingua::LanguageDetector;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Progress frames buffered ahead of a slow client
const PROGRESS_CHANNEL_CAPACITY: usize = 16;

pub struct SpeechService {
    dispatcher: SpeechRequestDispatcher,
    language_detector: LanguageDetector,
    max_chunk_size: usize,
}

impl SpeechService {
    pub fn new(dispatcher: SpeechRequestDispatcher, max_chunk_size: usize) -> Self {
        Self {
            dispatcher,
            language_detector: build_detector(),
            max_chunk_size,
        }
    }
}

#[async_trait]
pub trait SpeechServiceApi: Send + Sync {
    /// Start narrating the request's text
    ///
    /// This operation:
    /// - Validates the request and cleans the text
    /// - Splits it into provider-sized chunks
    /// - Spawns sequential synthesis, reporting progress on the returned channel
    ///
    /// The channel always ends with exactly one terminal event. Dropping the
    /// receiver cancels the remaining provider calls.
    fn start_synthesis(
        &self,
        request: SpeechRequest,
    ) -> Result<mpsc::Receiver<ProgressEvent>, SpeechServiceError>;

    /// Look up previously synthesized audio by its id
    async fn find_audio(&self, audio_id: &str) -> Result<Option<AssembledAudio>, SpeechServiceError>;
}

#[async_trait]
impl SpeechServiceApi for SpeechService {
    fn start_synthesis(
        &self,
        request: SpeechRequest,
    ) -> Result<mpsc::Receiver<ProgressEvent>, SpeechServiceError> {
        let (speed, temperature) = validate(&request)?;

        let cleaned_text = clean_text(&request.text);
        if cleaned_text.is_empty() {
            return Err(SpeechServiceError::Invalid("No text available".to_string()));
        }

        let language = detect_language(&self.language_detector, &cleaned_text);
        let params = SynthesisParams {
            voice_id: request.voice_id.clone(),
            speed,
            temperature,
            language,
        };

        let chunks = chunk_text(&cleaned_text, self.max_chunk_size);
        let char_count = cleaned_text.chars().count();
        let fingerprint = SynthesisFingerprint::compute(&cleaned_text, &params);

        tracing::info!(
            page_number = ?request.page_number,
            is_continuous = request.is_continuous,
            original_length = request.text.len(),
            cleaned_length = char_count,
            chunk_count = chunks.len(),
            language = %language,
            voice = %params.voice_id,
            fingerprint = %fingerprint,
            "Speech synthesis request"
        );

        let (sender, receiver) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let steps = self
            .dispatcher
            .dispatch(chunks, params, fingerprint.clone());

        tokio::spawn(
            drive_synthesis(steps, sender, fingerprint, char_count, speed).in_current_span(),
        );

        Ok(receiver)
    }

    async fn find_audio(&self, audio_id: &str) -> Result<Option<AssembledAudio>, SpeechServiceError> {
        let Some(fingerprint) = SynthesisFingerprint::parse(audio_id) else {
            return Ok(None);
        };
        let Some(cache) = self.dispatcher.cache() else {
            return Ok(None);
        };

        match cache.get(&fingerprint).await {
            Some(payloads) => assemble(&payloads).map(Some),
            None => Ok(None),
        }
    }
}

fn validate(request: &SpeechRequest) -> Result<(f32, f32), SpeechServiceError> {
    if request.text.trim().is_empty() {
        return Err(SpeechServiceError::Invalid("Text cannot be empty".to_string()));
    }
    if request.voice_id.trim().is_empty() {
        return Err(SpeechServiceError::Invalid("Voice cannot be empty".to_string()));
    }

    let speed = request.speed.unwrap_or(DEFAULT_SPEED);
    if !(SPEED_RANGE.0..=SPEED_RANGE.1).contains(&speed) {
        return Err(SpeechServiceError::Invalid(format!(
            "Speed must be between {} and {}",
            SPEED_RANGE.0, SPEED_RANGE.1
        )));
    }

    let temperature = request.temperature.unwrap_or(DEFAULT_TEMPERATURE);
    if !(TEMPERATURE_RANGE.0..=TEMPERATURE_RANGE.1).contains(&temperature) {
        return Err(SpeechServiceError::Invalid(format!(
            "Temperature must be between {} and {}",
            TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1
        )));
    }

    Ok((speed, temperature))
}

/// Pull dispatch steps and forward progress until a terminal event is sent or
/// the client goes away.
async fn drive_synthesis<S>(
    steps: S,
    sender: mpsc::Sender<ProgressEvent>,
    fingerprint: SynthesisFingerprint,
    char_count: usize,
    speed: f32,
) where
    S: Stream<Item = Result<DispatchStep, SpeechServiceError>> + Send,
{
    match forward_progress(steps, &sender).await {
        Ok(payloads) => {
            let terminal = match assemble(&payloads) {
                Ok(audio) => {
                    let audio = audio.with_duration_estimate(char_count, speed);
                    tracing::info!(
                        fingerprint = %fingerprint,
                        chunk_count = audio.chunk_count,
                        audio_size_bytes = audio.len(),
                        "Speech synthesis completed"
                    );
                    ProgressEvent::completed(&audio, fingerprint.as_str())
                }
                // non-empty text that produced no audio is the provider's fault
                Err(SpeechServiceError::EmptyAudio) => {
                    ProgressEvent::failed(SpeechServiceError::Provider("No audio returned".to_string()).to_string())
                }
                Err(e) => ProgressEvent::failed(e.to_string()),
            };
            send_terminal(&sender, terminal).await;
        }
        Err(SpeechServiceError::StreamClosed) => {
            tracing::warn!(fingerprint = %fingerprint, "Client disconnected, abandoning synthesis");
        }
        Err(e) => {
            tracing::error!(fingerprint = %fingerprint, error = %e, "Speech synthesis failed");
            send_terminal(&sender, ProgressEvent::failed(e.to_string())).await;
        }
    }
}

async fn forward_progress<S>(
    steps: S,
    sender: &mpsc::Sender<ProgressEvent>,
) -> Result<Vec<bytes::Bytes>, SpeechServiceError>
where
    S: Stream<Item = Result<DispatchStep, SpeechServiceError>> + Send,
{
    futures::pin_mut!(steps);

    sender
        .send(ProgressEvent::started())
        .await
        .map_err(|_| SpeechServiceError::StreamClosed)?;

    let mut payloads = Vec::new();
    let mut last_progress = 0;

    loop {
        let next = tokio::select! {
            next = steps.next() => next,
            _ = sender.closed() => return Err(SpeechServiceError::StreamClosed),
        };

        let Some(step) = next else {
            return Ok(payloads);
        };

        let step = step?;
        payloads.push(step.payload);
        last_progress = last_progress.max(step.progress);

        sender
            .send(ProgressEvent::in_progress(last_progress))
            .await
            .map_err(|_| SpeechServiceError::StreamClosed)?;
    }
}

async fn send_terminal(sender: &mpsc::Sender<ProgressEvent>, event: ProgressEvent) {
    if sender.send(event).await.is_err() {
        tracing::warn!("Client disconnected before the final progress frame");
    }
}
