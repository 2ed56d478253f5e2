use super::assembler::AssembledAudio;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

pub const COMPLETE: u8 = 100;
const MAX_IN_PROGRESS: u8 = 99;
const FRAME_DELIMITER: &[u8] = b"\n\n";

/// One frame of the synthesis progress stream.
///
/// `audio` and `error` are only ever set on the terminal frame, which always
/// reports 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    pub fn started() -> Self {
        Self::in_progress(0)
    }

    pub fn in_progress(progress: u8) -> Self {
        Self {
            progress: progress.min(MAX_IN_PROGRESS),
            audio: None,
            audio_id: None,
            duration: None,
            error: None,
        }
    }

    pub fn completed(audio: &AssembledAudio, audio_id: &str) -> Self {
        Self {
            progress: COMPLETE,
            audio: Some(STANDARD.encode(&audio.bytes)),
            audio_id: Some(audio_id.to_string()),
            duration: audio.duration_seconds,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            progress: COMPLETE,
            audio: None,
            audio_id: None,
            duration: None,
            error: Some(message.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.audio.is_some() || self.error.is_some()
    }

    /// Decode the base64 audio carried by a successful terminal frame
    pub fn decode_audio(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.audio.as_ref().map(|encoded| STANDARD.decode(encoded))
    }
}

/// `floor(min(99, completed / total * 100))`; 100 is reserved for the terminal frame
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = completed.saturating_mul(100) / total;
    percent.min(MAX_IN_PROGRESS as usize) as u8
}

/// Incremental decoder for `data: <payload>\n\n` frames.
///
/// Network reads may split a frame anywhere, including inside a UTF-8
/// sequence, so bytes are buffered until a blank-line delimiter arrives.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return the data payloads of every completed frame
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend(bytes.iter().filter(|b| **b != b'\r'));

        let mut payloads = Vec::new();
        while let Some(position) = find_delimiter(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..position + FRAME_DELIMITER.len()).collect();
            let frame = String::from_utf8_lossy(&frame[..position]);
            if let Some(payload) = frame_data(&frame) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Bytes received that do not yet form a complete frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find_delimiter(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(FRAME_DELIMITER.len())
        .position(|window| window == FRAME_DELIMITER)
}

/// Join the `data:` lines of a frame; comment-only frames (keep-alives) yield nothing
fn frame_data(frame: &str) -> Option<String> {
    let lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|line| line.strip_prefix(' ').unwrap_or(line))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
