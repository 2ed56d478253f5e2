pub mod playai_tts_repository;
pub mod synthesis_cache;
pub mod tts_repository;

pub use playai_tts_repository::PlayAiTtsRepository;
pub use synthesis_cache::{CachedPayloads, MokaSynthesisCache, SynthesisCache};
pub use tts_repository::TtsRepository;
