use super::SynthesisParams;
use sha2::{Digest, Sha256};

/// Content-addressed key for a synthesis result.
///
/// Hashes the full cleaned text together with every parameter that changes
/// the provider output, so two requests share a key only when they would
/// produce the same audio. Doubles as the public audio id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SynthesisFingerprint(String);

impl SynthesisFingerprint {
    pub fn compute(text: &str, params: &SynthesisParams) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(params.voice_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(params.speed.to_bits().to_be_bytes());
        hasher.update(params.temperature.to_bits().to_be_bytes());
        hasher.update(params.language.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Accept only well-formed ids (64 lowercase hex characters)
    pub fn parse(value: &str) -> Option<Self> {
        let well_formed = value.len() == 64
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        well_formed.then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SynthesisFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
