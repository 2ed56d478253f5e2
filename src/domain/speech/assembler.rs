use super::error::SpeechServiceError;
use bytes::{Bytes, BytesMut};

const CHARACTERS_PER_MINUTE: f32 = 1000.0;

/// Playable audio for one synthesis request, in chunk order
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledAudio {
    pub bytes: Bytes,
    pub chunk_count: usize,
    pub duration_seconds: Option<f32>,
}

impl AssembledAudio {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Attach a duration estimate based on narrated characters and playback speed
    pub fn with_duration_estimate(mut self, char_count: usize, speed: f32) -> Self {
        self.duration_seconds = Some(estimate_duration_seconds(char_count, speed));
        self
    }
}

/// Concatenate per-chunk payloads without re-encoding.
///
/// Compressed provider frames stay independently decodable when appended, so
/// the output is simply the payloads back to back.
pub fn assemble(payloads: &[Bytes]) -> Result<AssembledAudio, SpeechServiceError> {
    if payloads.is_empty() {
        return Err(SpeechServiceError::EmptyAudio);
    }

    let total: usize = payloads.iter().map(Bytes::len).sum();
    let mut buffer = BytesMut::with_capacity(total);
    for payload in payloads {
        buffer.extend_from_slice(payload);
    }

    Ok(AssembledAudio {
        bytes: buffer.freeze(),
        chunk_count: payloads.len(),
        duration_seconds: None,
    })
}

pub fn estimate_duration_seconds(char_count: usize, speed: f32) -> f32 {
    let speed = if speed > 0.0 { speed } else { 1.0 };
    (char_count as f32 / CHARACTERS_PER_MINUTE) * 60.0 / speed
}
