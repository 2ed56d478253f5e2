use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("No text available")]
    NoText,

    #[error("Text extraction failed: {0}")]
    Source(String),
}

/// Failures of the audio output itself, retryable and distinct from
/// synthesis failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Audio could not be played: {0}")]
    Output(String),

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Speech endpoint returned status {0}")]
    Status(u16),

    #[error("Malformed progress frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Malformed audio payload: {0}")]
    InvalidAudio(#[from] base64::DecodeError),

    #[error("{0}")]
    Synthesis(String),

    #[error("Progress stream ended without a result")]
    StreamEnded,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}
