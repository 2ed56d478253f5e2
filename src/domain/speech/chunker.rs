use regex::Regex;
use std::sync::OnceLock;

/// A contiguous piece of the cleaned text sent to the provider in one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?]+\s+").expect("valid sentence pattern"))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text into ordered chunks of at most `max_size` characters.
///
/// Sentences (terminated by `.`, `!` or `?`) are packed greedily. A sentence
/// that does not fit on its own is split on whitespace, and a single word
/// longer than `max_size` is kept whole as its own chunk.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<Chunk> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if char_len(text) <= max_size {
        return vec![Chunk {
            index: 0,
            text: text.to_string(),
        }];
    }

    let mut pieces: Vec<String> = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0;

    for sentence in split_sentences(text) {
        let sentence_len = char_len(sentence);

        if sentence_len > max_size {
            flush(&mut pieces, &mut buffer);
            buffer_len = 0;
            split_words(sentence, max_size, &mut pieces);
            continue;
        }

        // Sentences in a chunk are joined by a single space
        if buffer_len > 0 && buffer_len + 1 + sentence_len > max_size {
            flush(&mut pieces, &mut buffer);
            buffer_len = 0;
        }

        if buffer_len > 0 {
            buffer.push(' ');
            buffer_len += 1;
        }
        buffer.push_str(sentence);
        buffer_len += sentence_len;
    }
    flush(&mut pieces, &mut buffer);

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk { index, text })
        .collect()
}

/// Sentence units keep their terminator, surrounding whitespace is dropped
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for mat in sentence_pattern().find_iter(text) {
        sentences.push(text[last_end..mat.end()].trim());
        last_end = mat.end();
    }

    if last_end < text.len() {
        sentences.push(text[last_end..].trim());
    }

    sentences.retain(|sentence| !sentence.is_empty());
    sentences
}

fn split_words(sentence: &str, max_size: usize, pieces: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0;

    for word in sentence.split_whitespace() {
        let word_len = char_len(word);

        if current_len > 0 && current_len + 1 + word_len > max_size {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        pieces.push(current);
    }
}

fn flush(pieces: &mut Vec<String>, buffer: &mut String) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }
    buffer.clear();
}
