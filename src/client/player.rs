use super::cache::{AudioHandle, PlaybackCache, PlaybackFingerprint, VoiceSettings};
use super::error::PlaybackError;

/// The device or element that actually renders audio
pub trait AudioOutput {
    fn start(&mut self, audio: &AudioHandle) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn resume(&mut self) -> Result<(), PlaybackError>;
    fn stop(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackFailure {
    /// Synthesis or text extraction failed
    Generation(String),
    /// The output could not play audio we already have
    Playback(PlaybackError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackState {
    Idle,
    Loading {
        fingerprint: PlaybackFingerprint,
        generation: u64,
        progress: u8,
    },
    Playing {
        fingerprint: PlaybackFingerprint,
        audio: AudioHandle,
    },
    Paused {
        fingerprint: PlaybackFingerprint,
        audio: AudioHandle,
    },
    Errored {
        fingerprint: PlaybackFingerprint,
        failure: PlaybackFailure,
    },
}

impl PlaybackState {
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading { .. } => "loading",
            PlaybackState::Playing { .. } => "playing",
            PlaybackState::Paused { .. } => "paused",
            PlaybackState::Errored { .. } => "errored",
        }
    }

    pub fn fingerprint(&self) -> Option<&PlaybackFingerprint> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Loading { fingerprint, .. }
            | PlaybackState::Playing { fingerprint, .. }
            | PlaybackState::Paused { fingerprint, .. }
            | PlaybackState::Errored { fingerprint, .. } => Some(fingerprint),
        }
    }
}

/// What the caller has to do after `play`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAction {
    Resumed,
    AlreadyPlaying,
    AlreadyLoading,
    PlayingCached,
    /// Request synthesis and report back with this generation
    Fetch { generation: u64 },
}

/// One playback control: at most one synthesis in flight and one audio
/// source playing.
///
/// Every fetch gets a generation number; results carrying any generation
/// other than the one currently loading are dropped.
pub struct PlaybackController<O: AudioOutput> {
    output: O,
    cache: PlaybackCache,
    state: PlaybackState,
    last_generation: u64,
}

impl<O: AudioOutput> PlaybackController<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            cache: PlaybackCache::new(),
            state: PlaybackState::Idle,
            last_generation: 0,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn cache(&self) -> &PlaybackCache {
        &self.cache
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn play(&mut self, fingerprint: PlaybackFingerprint) -> Result<PlayAction, PlaybackError> {
        match &self.state {
            PlaybackState::Paused { fingerprint: current, .. } if *current == fingerprint => {
                self.resume()?;
                return Ok(PlayAction::Resumed);
            }
            PlaybackState::Playing { fingerprint: current, .. } if *current == fingerprint => {
                return Ok(PlayAction::AlreadyPlaying);
            }
            PlaybackState::Loading { fingerprint: current, .. } if *current == fingerprint => {
                return Ok(PlayAction::AlreadyLoading);
            }
            _ => {}
        }

        self.stop_output();

        if let Some(audio) = self.cache.get(&fingerprint) {
            tracing::debug!(audio_id = %audio.id(), "Playing cached audio");
            self.start(fingerprint, audio)?;
            return Ok(PlayAction::PlayingCached);
        }

        self.last_generation += 1;
        let generation = self.last_generation;
        self.state = PlaybackState::Loading {
            fingerprint,
            generation,
            progress: 0,
        };
        Ok(PlayAction::Fetch { generation })
    }

    /// Returns false for stale generations
    pub fn on_progress(&mut self, generation: u64, value: u8) -> bool {
        match &mut self.state {
            PlaybackState::Loading {
                generation: current,
                progress,
                ..
            } if *current == generation => {
                *progress = (*progress).max(value);
                true
            }
            _ => false,
        }
    }

    /// Cache and start audio for the generation currently loading.
    /// Returns `Ok(false)` when the result is stale.
    pub fn on_ready(&mut self, generation: u64, audio: AudioHandle) -> Result<bool, PlaybackError> {
        let Some(fingerprint) = self.loading_fingerprint(generation) else {
            tracing::debug!(generation, "Ignoring stale synthesis result");
            return Ok(false);
        };

        let audio = self.cache.put(fingerprint.clone(), audio);
        self.start(fingerprint, audio)?;
        Ok(true)
    }

    pub fn on_failed(&mut self, generation: u64, message: impl Into<String>) -> bool {
        let Some(fingerprint) = self.loading_fingerprint(generation) else {
            return false;
        };

        self.state = PlaybackState::Errored {
            fingerprint,
            failure: PlaybackFailure::Generation(message.into()),
        };
        true
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        match std::mem::replace(&mut self.state, PlaybackState::Idle) {
            PlaybackState::Playing { fingerprint, audio } => {
                self.output.pause();
                self.state = PlaybackState::Paused { fingerprint, audio };
                Ok(())
            }
            other => {
                let state = other.name();
                self.state = other;
                Err(PlaybackError::InvalidTransition {
                    action: "pause",
                    state,
                })
            }
        }
    }

    pub fn resume(&mut self) -> Result<(), PlaybackError> {
        match std::mem::replace(&mut self.state, PlaybackState::Idle) {
            PlaybackState::Paused { fingerprint, audio } => match self.output.resume() {
                Ok(()) => {
                    self.state = PlaybackState::Playing { fingerprint, audio };
                    Ok(())
                }
                Err(e) => {
                    self.fail_playback(fingerprint, e.clone());
                    Err(e)
                }
            },
            other => {
                let state = other.name();
                self.state = other;
                Err(PlaybackError::InvalidTransition {
                    action: "resume",
                    state,
                })
            }
        }
    }

    pub fn on_playback_ended(&mut self) {
        if matches!(self.state, PlaybackState::Playing { .. }) {
            self.state = PlaybackState::Idle;
        }
    }

    /// The output gave up on audio it was playing. The entry is dropped so a
    /// retry fetches fresh audio.
    pub fn on_playback_error(&mut self, error: PlaybackError) {
        if let PlaybackState::Playing { fingerprint, .. } | PlaybackState::Paused { fingerprint, .. } =
            &self.state
        {
            let fingerprint = fingerprint.clone();
            self.output.stop();
            self.fail_playback(fingerprint, error);
        }
    }

    /// Apply new voice settings: stop anything produced under the old ones
    /// and forget their cached audio
    pub fn change_settings(&mut self, settings: &VoiceSettings) {
        let stale = self
            .state
            .fingerprint()
            .is_some_and(|fingerprint| !fingerprint.has_settings(settings));

        if stale {
            tracing::debug!(state = self.state.name(), "Settings changed, stopping playback");
            self.stop_output();
            self.state = PlaybackState::Idle;
        }

        let removed = self.cache.retain_settings(settings);
        if removed > 0 {
            tracing::debug!(removed, "Invalidated audio cached under previous settings");
        }
    }

    /// The view is going away: stop, forget in-flight work and release the cache
    pub fn close(&mut self) {
        self.stop_output();
        self.state = PlaybackState::Idle;
        self.cache.clear();
    }

    fn loading_fingerprint(&self, generation: u64) -> Option<PlaybackFingerprint> {
        match &self.state {
            PlaybackState::Loading {
                fingerprint,
                generation: current,
                ..
            } if *current == generation => Some(fingerprint.clone()),
            _ => None,
        }
    }

    fn start(&mut self, fingerprint: PlaybackFingerprint, audio: AudioHandle) -> Result<(), PlaybackError> {
        match self.output.start(&audio) {
            Ok(()) => {
                self.state = PlaybackState::Playing { fingerprint, audio };
                Ok(())
            }
            Err(e) => {
                self.fail_playback(fingerprint, e.clone());
                Err(e)
            }
        }
    }

    fn stop_output(&mut self) {
        if matches!(
            self.state,
            PlaybackState::Playing { .. } | PlaybackState::Paused { .. }
        ) {
            self.output.stop();
        }
    }

    fn fail_playback(&mut self, fingerprint: PlaybackFingerprint, error: PlaybackError) {
        tracing::warn!(error = %error, "Playback failed");
        self.cache.invalidate(&fingerprint);
        self.state = PlaybackState::Errored {
            fingerprint,
            failure: PlaybackFailure::Playback(error),
        };
    }
}
