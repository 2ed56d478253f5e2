use super::cache::{AudioHandle, DocumentId, PageRange, PlaybackFingerprint, VoiceSettings};
use super::error::ClientError;
use super::page_text::PageTextSource;
use super::player::{AudioOutput, PlayAction, PlaybackController, PlaybackState};
use super::speech_client::SpeechClient;
use crate::domain::speech::SpeechRequest;

/// A reader looking at one document: extracts text, requests narration and
/// plays it through a single playback control
pub struct ReaderSession<S: PageTextSource, O: AudioOutput> {
    speech_client: SpeechClient,
    pages: S,
    document: DocumentId,
    settings: VoiceSettings,
    player: PlaybackController<O>,
}

impl<S: PageTextSource, O: AudioOutput> ReaderSession<S, O> {
    pub fn new(
        speech_client: SpeechClient,
        pages: S,
        document: DocumentId,
        settings: VoiceSettings,
        output: O,
    ) -> Self {
        Self {
            speech_client,
            pages,
            document,
            settings,
            player: PlaybackController::new(output),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        self.player.state()
    }

    pub fn player(&self) -> &PlaybackController<O> {
        &self.player
    }

    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    /// Narrate a single page, replaying cached audio when nothing changed
    pub async fn play_page(&mut self, page_number: u32) -> Result<PlayAction, ClientError> {
        let fingerprint = self.fingerprint(PageRange::Page(page_number));
        let action = self.player.play(fingerprint)?;
        let PlayAction::Fetch { generation } = action else {
            return Ok(action);
        };

        let text = match self.pages.page_text(&self.document, page_number).await {
            Ok(page) => page.text,
            Err(e) => {
                tracing::warn!(page_number, error = %e, "No text to narrate");
                self.player.on_failed(generation, e.to_string());
                return Err(e.into());
            }
        };

        let request = self.request(text, Some(page_number), false);
        self.fetch(generation, request).await?;
        Ok(action)
    }

    /// Narrate every page of the document in one continuous request
    pub async fn play_document(&mut self) -> Result<PlayAction, ClientError> {
        let fingerprint = self.fingerprint(PageRange::WholeDocument);
        let action = self.player.play(fingerprint)?;
        let PlayAction::Fetch { generation } = action else {
            return Ok(action);
        };

        let text = match self.pages.document_text(&self.document).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "No text to narrate");
                self.player.on_failed(generation, e.to_string());
                return Err(e.into());
            }
        };

        let request = self.request(text, None, true);
        self.fetch(generation, request).await?;
        Ok(action)
    }

    pub fn pause(&mut self) -> Result<(), ClientError> {
        Ok(self.player.pause()?)
    }

    pub fn resume(&mut self) -> Result<(), ClientError> {
        Ok(self.player.resume()?)
    }

    pub fn set_settings(&mut self, settings: VoiceSettings) {
        self.player.change_settings(&settings);
        self.settings = settings;
    }

    /// Switch to another document, releasing everything cached for this one
    pub fn open_document(&mut self, document: DocumentId) {
        self.player.close();
        self.document = document;
    }

    pub fn close(&mut self) {
        self.player.close();
    }

    fn fingerprint(&self, range: PageRange) -> PlaybackFingerprint {
        PlaybackFingerprint::new(self.document.clone(), range, &self.settings)
    }

    fn request(&self, text: String, page_number: Option<u32>, is_continuous: bool) -> SpeechRequest {
        SpeechRequest {
            text,
            voice_id: self.settings.voice_id.clone(),
            speed: Some(self.settings.speed),
            temperature: Some(self.settings.temperature),
            page_number,
            is_continuous,
        }
    }

    async fn fetch(&mut self, generation: u64, request: SpeechRequest) -> Result<(), ClientError> {
        let player = &mut self.player;
        let result = self
            .speech_client
            .synthesize_audio(&request, |progress| {
                player.on_progress(generation, progress);
            })
            .await;

        match result {
            Ok(audio) => {
                let handle = AudioHandle::new(audio.bytes, audio.duration_seconds);
                self.player.on_ready(generation, handle)?;
                Ok(())
            }
            Err(e) => {
                self.player.on_failed(generation, e.to_string());
                Err(e)
            }
        }
    }
}
