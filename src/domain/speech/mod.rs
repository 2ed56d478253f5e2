pub mod assembler;
pub mod chunker;
pub mod dispatcher;
pub mod error;
pub mod fingerprint;
pub mod language;
pub mod progress;
pub mod service;
pub mod text;

pub use assembler::{assemble, AssembledAudio};
pub use chunker::{chunk_text, Chunk};
pub use dispatcher::{DispatchStep, SpeechRequestDispatcher};
pub use error::SpeechServiceError;
pub use fingerprint::SynthesisFingerprint;
pub use language::LanguageCode;
pub use progress::{FrameDecoder, ProgressEvent};
pub use service::{SpeechService, SpeechServiceApi};

use serde::{Deserialize, Serialize};

pub const DEFAULT_SPEED: f32 = 1.0;
pub const DEFAULT_TEMPERATURE: f32 = 1.0;
pub const SPEED_RANGE: (f32, f32) = (0.5, 2.0);
pub const TEMPERATURE_RANGE: (f32, f32) = (0.5, 1.5);

/// Request for POST /api/pdf-to-speech
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub is_continuous: bool,
}

/// Everything besides the text that shapes the provider's output
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisParams {
    pub voice_id: String,
    pub speed: f32,
    pub temperature: f32,
    pub language: LanguageCode,
}
