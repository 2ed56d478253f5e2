use crate::domain::speech::SynthesisParams;
use async_trait::async_trait;
use bytes::Bytes;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (PlayAI, ElevenLabs, etc.)
///
/// Implementations synthesize exactly one chunk per call. Splitting text and
/// merging audio happen upstream, so a provider never sees more than the
/// configured chunk size.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one chunk of text
    ///
    /// Returns the provider's complete binary audio for the chunk (MP3 format)
    ///
    /// # Errors
    /// Returns the provider's message when the call is rejected, or a
    /// transport description when the provider is unreachable
    async fn synthesize_chunk(&self, text: &str, params: &SynthesisParams) -> Result<Bytes, String>;
}
