use axum::{
    body::Body,
    extract::{Extension, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, BoxStream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    domain::speech::{ProgressEvent, SpeechRequest, SpeechService, SpeechServiceApi},
    error::{AppError, AppResult},
    infrastructure::http::{
        range::{parse_range, RangeRequest},
        request_id::RequestId,
    },
};

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

pub struct SpeechController {
    speech_service: Arc<SpeechService>,
}

impl SpeechController {
    pub fn new(speech_service: Arc<SpeechService>) -> Self {
        Self { speech_service }
    }

    /// POST /api/pdf-to-speech - Narrate text, streaming progress as server-sent events
    pub async fn synthesize(
        State(controller): State<Arc<SpeechController>>,
        Extension(request_id): Extension<RequestId>,
        Json(request): Json<SpeechRequest>,
    ) -> Sse<BoxStream<'static, Result<Event, Infallible>>> {
        // The synthesis task outlives the handler, so it carries its own span
        let span = tracing::info_span!("synthesis", request_id = %request_id);
        let started = span.in_scope(|| controller.speech_service.start_synthesis(request));

        let events: BoxStream<'static, ProgressEvent> = match started {
            Ok(receiver) => ReceiverStream::new(receiver).boxed(),
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Rejected speech request");
                stream::once(async move { ProgressEvent::failed(e.to_string()) }).boxed()
            }
        };

        let frames = events
            .map(|event| Ok::<_, Infallible>(to_sse_event(&event)))
            .boxed();

        Sse::new(frames).keep_alive(KeepAlive::default())
    }

    /// GET /api/audio/{audioId} - Fetch synthesized audio, honouring byte ranges
    pub async fn get_audio(
        State(controller): State<Arc<SpeechController>>,
        Path(audio_id): Path<String>,
        request_headers: HeaderMap,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let audio = controller
            .speech_service
            .find_audio(&audio_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Audio {}", audio_id)))?;

        let total = audio.len();
        let range_header = request_headers
            .get(header::RANGE)
            .and_then(|v| v.to_str().ok());

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(AUDIO_CONTENT_TYPE));
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

        match parse_range(range_header, total) {
            RangeRequest::Full => {
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(total));
                Ok((StatusCode::OK, headers, Body::from(audio.bytes)))
            }
            RangeRequest::Partial(range) => {
                headers.insert(header::CONTENT_RANGE, header_value(&range.content_range(total))?);
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(range.len()));
                let body = audio.bytes.slice(range.start..=range.end);
                Ok((StatusCode::PARTIAL_CONTENT, headers, Body::from(body)))
            }
            RangeRequest::Unsatisfiable => {
                tracing::debug!(range = ?range_header, total, "Unsatisfiable range requested");
                headers.insert(header::CONTENT_RANGE, header_value(&format!("bytes */{}", total))?);
                Ok((StatusCode::RANGE_NOT_SATISFIABLE, headers, Body::empty()))
            }
        }
    }
}

fn to_sse_event(event: &ProgressEvent) -> Event {
    Event::default().json_data(event).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to encode progress event");
        Event::default().data(r#"{"progress":100,"error":"Failed to encode progress event"}"#)
    })
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| AppError::Internal(format!("Invalid header value: {}", e)))
}
