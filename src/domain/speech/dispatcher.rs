use super::chunker::Chunk;
use super::error::SpeechServiceError;
use super::fingerprint::SynthesisFingerprint;
use super::progress::progress_percent;
use super::SynthesisParams;
use crate::infrastructure::repositories::{SynthesisCache, TtsRepository};
use bytes::Bytes;
use futures::Stream;
use std::sync::Arc;
use std::time::Duration;

/// One synthesized chunk and the overall progress after it
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchStep {
    pub chunk_index: usize,
    pub payload: Bytes,
    pub progress: u8,
}

/// Sends chunks to the provider one at a time, in order.
///
/// Dispatch is lazy: the next provider call is only issued when the consumer
/// polls for the next step, so dropping the stream abandons the remaining
/// chunks.
pub struct SpeechRequestDispatcher {
    tts_repo: Arc<dyn TtsRepository>,
    cache: Option<Arc<dyn SynthesisCache>>,
    chunk_timeout: Duration,
}

impl SpeechRequestDispatcher {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        cache: Option<Arc<dyn SynthesisCache>>,
        chunk_timeout: Duration,
    ) -> Self {
        Self {
            tts_repo,
            cache,
            chunk_timeout,
        }
    }

    pub fn cache(&self) -> Option<&Arc<dyn SynthesisCache>> {
        self.cache.as_ref()
    }

    /// Yields one step per chunk, or a single `Provider` error after which
    /// nothing else is yielded. Completed results are cached under
    /// `fingerprint`; a cached result is replayed without provider calls.
    pub fn dispatch(
        &self,
        chunks: Vec<Chunk>,
        params: SynthesisParams,
        fingerprint: SynthesisFingerprint,
    ) -> impl Stream<Item = Result<DispatchStep, SpeechServiceError>> + Send + 'static {
        let tts_repo = self.tts_repo.clone();
        let cache = self.cache.clone();
        let chunk_timeout = self.chunk_timeout;

        async_stream::stream! {
            let cached = match &cache {
                Some(cache) => cache.get(&fingerprint).await,
                None => None,
            };

            if let Some(payloads) = cached {
                tracing::info!(
                    fingerprint = %fingerprint,
                    chunk_count = payloads.len(),
                    "TTS cache hit - replaying cached audio"
                );
                let total = payloads.len();
                for (index, payload) in payloads.iter().enumerate() {
                    yield Ok(DispatchStep {
                        chunk_index: index,
                        payload: payload.clone(),
                        progress: progress_percent(index + 1, total),
                    });
                }
            } else {
                let total = chunks.len();
                let mut produced = Vec::with_capacity(total);
                let mut failed = false;

                for chunk in chunks {
                    tracing::info!(
                        chunk_index = chunk.index,
                        chunk_count = total,
                        chunk_length = chunk.char_len(),
                        "Synthesizing chunk"
                    );

                    let outcome = tokio::time::timeout(
                        chunk_timeout,
                        tts_repo.synthesize_chunk(&chunk.text, &params),
                    )
                    .await;

                    let payload = match outcome {
                        Ok(Ok(payload)) => payload,
                        Ok(Err(message)) => {
                            tracing::error!(chunk_index = chunk.index, error = %message, "Chunk synthesis failed");
                            failed = true;
                            yield Err(SpeechServiceError::Provider(message));
                            break;
                        }
                        Err(_) => {
                            tracing::error!(
                                chunk_index = chunk.index,
                                timeout_secs = chunk_timeout.as_secs_f64(),
                                "Chunk synthesis timed out"
                            );
                            failed = true;
                            yield Err(SpeechServiceError::Provider(format!(
                                "Timed out after {:?} synthesizing chunk {}",
                                chunk_timeout, chunk.index
                            )));
                            break;
                        }
                    };

                    produced.push(payload.clone());
                    yield Ok(DispatchStep {
                        chunk_index: chunk.index,
                        payload,
                        progress: progress_percent(produced.len(), total),
                    });
                }

                if !failed && !produced.is_empty() {
                    if let Some(cache) = &cache {
                        cache.insert_if_absent(fingerprint.clone(), Arc::new(produced)).await;
                        tracing::info!(fingerprint = %fingerprint, "TTS result cached");
                    }
                }
            }
        }
    }
}
