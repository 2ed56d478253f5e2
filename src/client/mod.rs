//! Reader-side library: fetches narration from the speech endpoint, caches
//! the decoded audio per playback fingerprint and drives an audio output
//! through an explicit playback state machine.

pub mod cache;
pub mod error;
pub mod page_text;
pub mod player;
pub mod session;
pub mod speech_client;

pub use cache::{AudioHandle, DocumentId, PageRange, PlaybackCache, PlaybackFingerprint, VoiceSettings};
pub use error::{ClientError, ExtractionError, PlaybackError};
pub use page_text::{PageText, PageTextSource, StaticPageTextSource};
pub use player::{AudioOutput, PlayAction, PlaybackController, PlaybackFailure, PlaybackState};
pub use session::ReaderSession;
pub use speech_client::{SpeechClient, SynthesizedAudio};
