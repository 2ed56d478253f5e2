use crate::e2e::helpers;

use helpers::provider_mocks::{audio_bytes, mount_audio, mount_failure};
use helpers::TestContext;
use pdf_reader_backend::client::{
    AudioHandle, AudioOutput, ClientError, DocumentId, ExtractionError, PageRange, PlayAction,
    PlaybackError, PlaybackFailure, PlaybackState, ReaderSession, SpeechClient,
    StaticPageTextSource, VoiceSettings,
};
use pretty_assertions::assert_eq;
use test_context::test_context;

#[derive(Default)]
struct RecordingOutput {
    started: Vec<usize>,
    stops: usize,
}

impl AudioOutput for RecordingOutput {
    fn start(&mut self, audio: &AudioHandle) -> Result<(), PlaybackError> {
        self.started.push(audio.len());
        Ok(())
    }

    fn pause(&mut self) {}

    fn resume(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

fn voice(voice_id: &str) -> VoiceSettings {
    VoiceSettings {
        voice_id: voice_id.to_string(),
        speed: 1.0,
        temperature: 1.0,
    }
}

fn session(ctx: &TestContext) -> ReaderSession<StaticPageTextSource, RecordingOutput> {
    let document = DocumentId::new("field-notes.pdf");
    let pages = StaticPageTextSource::new().with_document(
        document.clone(),
        vec![
            "Rivers carve valleys.".to_string(),
            "Glaciers move slowly.".to_string(),
        ],
    );

    ReaderSession::new(
        SpeechClient::new(&ctx.base_url),
        pages,
        document,
        voice("alice"),
        RecordingOutput::default(),
    )
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_replay_cached_page_until_voice_changes(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(16)).await;
    let mut session = session(ctx);

    assert!(matches!(
        session.play_page(1).await.unwrap(),
        PlayAction::Fetch { .. }
    ));
    assert_eq!(session.state().name(), "playing");
    assert_eq!(ctx.provider_calls().await, 1);

    // another page, then back to the first one from cache
    session.play_page(2).await.unwrap();
    assert_eq!(session.play_page(1).await.unwrap(), PlayAction::PlayingCached);
    assert_eq!(ctx.provider_calls().await, 2);

    session.set_settings(voice("bob"));
    assert_eq!(session.state(), &PlaybackState::Idle);

    assert!(matches!(
        session.play_page(1).await.unwrap(),
        PlayAction::Fetch { .. }
    ));
    assert_eq!(ctx.provider_calls().await, 3);
    assert_eq!(session.player().output().started, vec![16, 16, 16, 16]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_pause_and_resume_without_refetching(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(16)).await;
    let mut session = session(ctx);

    session.play_page(1).await.unwrap();
    session.pause().unwrap();
    assert_eq!(session.state().name(), "paused");

    assert_eq!(session.play_page(1).await.unwrap(), PlayAction::Resumed);
    assert_eq!(session.play_page(1).await.unwrap(), PlayAction::AlreadyPlaying);
    assert_eq!(ctx.provider_calls().await, 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_synthesize_pages_without_text(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(16)).await;
    let mut session = session(ctx);

    let result = session.play_page(3).await;

    assert!(matches!(
        result,
        Err(ClientError::Extraction(ExtractionError::PageOutOfRange { page: 3, page_count: 2 }))
    ));
    assert!(matches!(
        session.state(),
        PlaybackState::Errored {
            failure: PlaybackFailure::Generation(_),
            ..
        }
    ));
    assert_eq!(ctx.provider_calls().await, 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_surface_provider_failures(ctx: &TestContext) {
    mount_failure(&ctx.provider, "Voice quota exhausted").await;
    let mut session = session(ctx);

    let result = session.play_page(1).await;

    match result {
        Err(ClientError::Synthesis(message)) => assert!(message.contains("Voice quota exhausted")),
        other => panic!("expected a synthesis error, got {:?}", other),
    }
    assert_eq!(session.state().name(), "errored");
    assert!(session.player().cache().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_narrate_whole_document_in_one_request(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(16)).await;
    let mut session = session(ctx);

    session.play_document().await.unwrap();

    assert_eq!(
        session.state().fingerprint().map(|fingerprint| fingerprint.range()),
        Some(PageRange::WholeDocument)
    );

    let requests = ctx.provider.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["text"], "Rivers carve valleys. Glaciers move slowly.");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_release_cache_when_closed(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(16)).await;
    let mut session = session(ctx);

    session.play_page(1).await.unwrap();
    session.close();

    assert_eq!(session.state(), &PlaybackState::Idle);
    assert!(session.player().cache().is_empty());
    assert_eq!(session.player().output().stops, 1);

    // the server still has it cached, the client does not
    assert!(matches!(
        session.play_page(1).await.unwrap(),
        PlayAction::Fetch { .. }
    ));
    assert_eq!(ctx.provider_calls().await, 1);
}
