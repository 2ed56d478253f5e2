use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};

/// Languages the provider can narrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageCode {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
}

/// (code, lingua language, ISO 639-1, provider `language` value)
static SUPPORTED: [(LanguageCode, Language, &str, &str); 6] = [
    (LanguageCode::English, Language::English, "en", "english"),
    (LanguageCode::Spanish, Language::Spanish, "es", "spanish"),
    (LanguageCode::French, Language::French, "fr", "french"),
    (LanguageCode::German, Language::German, "de", "german"),
    (LanguageCode::Italian, Language::Italian, "it", "italian"),
    (LanguageCode::Portuguese, Language::Portuguese, "pt", "portuguese"),
];

impl LanguageCode {
    fn entry(&self) -> &'static (LanguageCode, Language, &'static str, &'static str) {
        SUPPORTED
            .iter()
            .find(|(code, ..)| code == self)
            .unwrap_or(&SUPPORTED[0])
    }

    /// ISO 639-1 code
    pub fn as_str(&self) -> &'static str {
        self.entry().2
    }

    pub fn provider_name(&self) -> &'static str {
        self.entry().3
    }

    pub fn from_lingua(language: Language) -> Option<Self> {
        SUPPORTED
            .iter()
            .find(|(_, lingua, ..)| *lingua == language)
            .map(|(code, ..)| *code)
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn build_detector() -> LanguageDetector {
    let languages: Vec<Language> = SUPPORTED.iter().map(|(_, lingua, ..)| *lingua).collect();
    LanguageDetectorBuilder::from_languages(&languages).build()
}

/// Detect the language of a page. Pages too short or too mixed to call are
/// narrated in English.
pub fn detect_language(detector: &LanguageDetector, text: &str) -> LanguageCode {
    match detector
        .detect_language_of(text)
        .and_then(LanguageCode::from_lingua)
    {
        Some(code) => code,
        None => {
            tracing::warn!(text_length = text.len(), "Language not detected, using English");
            LanguageCode::English
        }
    }
}
