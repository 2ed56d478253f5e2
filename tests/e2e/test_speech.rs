use crate::e2e::helpers;

use helpers::provider_mocks::{audio_bytes, mount_audio, mount_failure_after, mount_slow_audio};
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use test_context::test_context;

/// Three sentences that never fit two to a chunk at the test chunk size
const THREE_CHUNK_TEXT: &str =
    "The first sentence is here. The second sentence is here. The third sentence is here.";

fn progress_values(events: &[pdf_reader_backend::domain::speech::ProgressEvent]) -> Vec<u8> {
    events.iter().map(|event| event.progress).collect()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stream_progress_then_audio(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(10)).await;

    let response = ctx
        .client
        .synthesize(&json!({
            "text": THREE_CHUNK_TEXT,
            "voiceId": "s3://voices/narrator.json",
            "speed": 1.0,
            "temperature": 0.9,
            "pageNumber": 1
        }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert!(response
        .header("content-type")
        .is_some_and(|value| value.starts_with("text/event-stream")));

    let events = response.events();
    assert_eq!(progress_values(&events), vec![0, 33, 66, 99, 100]);

    let terminal = events.last().unwrap();
    assert!(terminal.error.is_none());
    assert_eq!(terminal.decode_audio().unwrap().unwrap().len(), 30);
    let audio_id = terminal.audio_id.as_ref().unwrap();
    assert_eq!(audio_id.len(), 64);
    assert!(terminal.duration.is_some());

    assert_eq!(ctx.provider_calls().await, 3);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_tag_the_progress_stream_with_caller_request_id(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(10)).await;

    let response = ctx
        .client
        .synthesize_with_request_id(
            &json!({ "text": "Short page.", "voiceId": "narrator" }),
            Some("page-7"),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    response.assert_header("x-request-id", "page-7");
    assert_eq!(progress_values(&response.events()), vec![0, 99, 100]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_send_chunks_to_provider_in_order(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(10)).await;

    ctx.client
        .synthesize(&json!({
            "text": THREE_CHUNK_TEXT,
            "voiceId": "narrator",
            "speed": 1.25
        }))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let requests = ctx.provider.received_requests().await.unwrap();
    let texts: Vec<String> = requests
        .iter()
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            body["text"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        texts,
        vec![
            "The first sentence is here.",
            "The second sentence is here.",
            "The third sentence is here."
        ]
    );

    let first = &requests[0];
    assert_eq!(
        first.headers.get("authorization").and_then(|v| v.to_str().ok()),
        Some("Bearer test-api-key")
    );
    assert_eq!(
        first.headers.get("x-user-id").and_then(|v| v.to_str().ok()),
        Some("test-user-id")
    );

    let body: Value = serde_json::from_slice(&first.body).unwrap();
    assert_eq!(body["voice"], "narrator");
    assert_eq!(body["model"], "PlayDialog");
    assert_eq!(body["outputFormat"], "mp3");
    assert_eq!(body["sampleRate"], 24000);
    assert_eq!(body["speed"], 1.25);
    assert_eq!(body["language"], "english");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stop_on_first_provider_failure(ctx: &TestContext) {
    mount_failure_after(&ctx.provider, 1, audio_bytes(10), "Voice quota exhausted").await;

    let response = ctx
        .client
        .synthesize(&json!({
            "text": THREE_CHUNK_TEXT,
            "voiceId": "narrator"
        }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let events = response.events();
    assert_eq!(progress_values(&events), vec![0, 33, 100]);

    let terminal = events.last().unwrap();
    assert!(terminal.audio.is_none());
    assert!(terminal
        .error
        .as_ref()
        .is_some_and(|error| error.contains("Voice quota exhausted")));

    // the third chunk is never sent
    assert_eq!(ctx.provider_calls().await, 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stop_calling_provider_when_client_disconnects(ctx: &TestContext) {
    mount_slow_audio(&ctx.provider, audio_bytes(10), Duration::from_millis(250)).await;

    // six sentences, one chunk each
    let text = (1..=6)
        .map(|n| format!("Sentence number {} is right here.", n))
        .collect::<Vec<_>>()
        .join(" ");

    let socket = ctx
        .client
        .open_synthesis_stream(&json!({ "text": text, "voiceId": "narrator" }))
        .await
        .unwrap();
    drop(socket);

    // long enough for all six calls had the synthesis kept going
    tokio::time::sleep(Duration::from_secs(2)).await;

    let calls = ctx.provider_calls().await;
    assert!(calls <= 2, "provider called {} times after disconnect", calls);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_cache_failed_synthesis(ctx: &TestContext) {
    mount_failure_after(&ctx.provider, 1, audio_bytes(10), "Voice quota exhausted").await;
    let request = json!({ "text": THREE_CHUNK_TEXT, "voiceId": "narrator" });

    ctx.client.synthesize(&request).await.unwrap();
    let events = ctx.client.synthesize(&request).await.unwrap().events();

    assert!(events.last().unwrap().error.is_some());
    assert_eq!(ctx.provider_calls().await, 3);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_replay_cached_audio_without_provider_calls(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(10)).await;
    let request = json!({ "text": THREE_CHUNK_TEXT, "voiceId": "narrator" });

    let first = ctx.client.synthesize(&request).await.unwrap().events();
    let second = ctx.client.synthesize(&request).await.unwrap().events();

    assert_eq!(ctx.provider_calls().await, 3);
    assert_eq!(progress_values(&second), vec![0, 33, 66, 99, 100]);
    assert_eq!(first.last().unwrap().audio, second.last().unwrap().audio);
    assert_eq!(first.last().unwrap().audio_id, second.last().unwrap().audio_id);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_again_when_voice_changes(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(10)).await;

    let alice = ctx
        .client
        .synthesize(&json!({ "text": "Short page.", "voiceId": "alice" }))
        .await
        .unwrap()
        .events();
    let bob = ctx
        .client
        .synthesize(&json!({ "text": "Short page.", "voiceId": "bob" }))
        .await
        .unwrap()
        .events();

    assert_eq!(ctx.provider_calls().await, 2);
    assert_ne!(alice.last().unwrap().audio_id, bob.last().unwrap().audio_id);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_out_of_range_speed_with_one_error_frame(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(10)).await;

    let response = ctx
        .client
        .synthesize(&json!({
            "text": "Hello there.",
            "voiceId": "narrator",
            "speed": 5.0
        }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let events = response.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].progress, 100);
    assert!(events[0]
        .error
        .as_ref()
        .is_some_and(|error| error.contains("Speed must be between")));
    assert_eq!(ctx.provider_calls().await, 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_text_that_cleans_to_nothing(ctx: &TestContext) {
    mount_audio(&ctx.provider, audio_bytes(10)).await;

    for text in ["   ", "https://example.com/paper.pdf"] {
        let events = ctx
            .client
            .synthesize(&json!({ "text": text, "voiceId": "narrator" }))
            .await
            .unwrap()
            .events();

        assert_eq!(events.len(), 1);
        assert!(events[0].error.is_some());
    }

    assert_eq!(ctx.provider_calls().await, 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_json(ctx: &TestContext) {
    let response = ctx
        .client
        .synthesize(&json!({ "voiceId": "narrator" }))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(ctx.provider_calls().await, 0);
}
