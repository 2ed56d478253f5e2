use bytes::Bytes;
use std::collections::HashMap;
use uuid::Uuid;

/// Opaque identifier handed out by the upload collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRange {
    Page(u32),
    WholeDocument,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub voice_id: String,
    pub speed: f32,
    pub temperature: f32,
}

/// Everything that changes what the reader would hear.
///
/// Speed and temperature are keyed by bit pattern, so any change at all is a
/// different fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaybackFingerprint {
    document_id: DocumentId,
    range: PageRange,
    voice_id: String,
    speed_bits: u32,
    temperature_bits: u32,
}

impl PlaybackFingerprint {
    pub fn new(document_id: DocumentId, range: PageRange, settings: &VoiceSettings) -> Self {
        Self {
            document_id,
            range,
            voice_id: settings.voice_id.clone(),
            speed_bits: settings.speed.to_bits(),
            temperature_bits: settings.temperature.to_bits(),
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn range(&self) -> PageRange {
        self.range
    }

    pub fn has_settings(&self, settings: &VoiceSettings) -> bool {
        self.voice_id == settings.voice_id
            && self.speed_bits == settings.speed.to_bits()
            && self.temperature_bits == settings.temperature.to_bits()
    }

    /// Same document and page (or whole document), whatever the voice settings
    pub fn same_target(&self, other: &Self) -> bool {
        self.document_id == other.document_id && self.range == other.range
    }
}

/// Decoded audio ready to hand to an output. Clones share the same buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioHandle {
    id: Uuid,
    bytes: Bytes,
    duration_seconds: Option<f32>,
}

impl AudioHandle {
    pub fn new(bytes: Bytes, duration_seconds: Option<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes,
            duration_seconds,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn duration_seconds(&self) -> Option<f32> {
        self.duration_seconds
    }
}

/// Audio already fetched during the current document view.
///
/// Advisory only: a miss always means a fresh synthesis request.
#[derive(Debug, Default)]
pub struct PlaybackCache {
    entries: HashMap<PlaybackFingerprint, AudioHandle>,
}

impl PlaybackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &PlaybackFingerprint) -> Option<AudioHandle> {
        self.entries.get(fingerprint).cloned()
    }

    /// Store audio for `fingerprint`, dropping any entry for the same target
    /// that was produced under other voice settings
    pub fn put(&mut self, fingerprint: PlaybackFingerprint, audio: AudioHandle) -> AudioHandle {
        self.entries
            .retain(|existing, _| existing == &fingerprint || !existing.same_target(&fingerprint));
        self.entries.insert(fingerprint, audio.clone());
        audio
    }

    pub fn invalidate(&mut self, fingerprint: &PlaybackFingerprint) -> Option<AudioHandle> {
        self.entries.remove(fingerprint)
    }

    /// Drop every entry recorded under settings other than `settings`
    pub fn retain_settings(&mut self, settings: &VoiceSettings) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|fingerprint, _| fingerprint.has_settings(settings));
        before - self.entries.len()
    }

    /// Release everything; called when the view closes or the document changes
    pub fn clear(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        if released > 0 {
            tracing::debug!(released, "Released cached audio");
        }
        released
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
