use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum SpeechServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("TTS provider error: {0}")]
    Provider(String),
    #[error("no audio was produced")]
    EmptyAudio,
    #[error("progress stream closed by client")]
    StreamClosed,
}

impl From<SpeechServiceError> for AppError {
    fn from(err: SpeechServiceError) -> Self {
        match err {
            SpeechServiceError::Invalid(msg) => AppError::BadRequest(msg),
            SpeechServiceError::Provider(msg) => AppError::ExternalService(msg),
            SpeechServiceError::EmptyAudio => AppError::NotFound("Audio".to_string()),
            SpeechServiceError::StreamClosed => AppError::Internal(err.to_string()),
        }
    }
}
