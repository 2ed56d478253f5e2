// End-to-end tests for the PDF Reader Backend API
//
// Each test gets its own server bound to an ephemeral port and its own
// wiremock server standing in for the TTS provider, so tests run in parallel
// without sharing provider expectations or cache entries.

mod helpers;
mod test_reader_session;
mod test_speech;
