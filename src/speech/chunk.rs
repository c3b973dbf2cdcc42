//! Sentence-bounded chunking for speech.

use std::sync::LazyLock;

use regex::Regex;

/// Default maximum chunk length in characters.
pub const DEFAULT_MAX_CHUNK_LEN: usize = 500;

static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Chunking options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOptions {
    /// Maximum chunk length in characters, terminating period included
    pub max_chunk_len: usize,
}

impl ChunkOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum chunk length.
    pub fn with_max_len(mut self, max: usize) -> Self {
        self.max_chunk_len = max.max(1);
        self
    }
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
        }
    }
}

/// Split cleaned text into chunks of whole sentences.
///
/// Sentences end at runs of `.`, `!` or `?`. Sentences are joined with ". "
/// and every chunk ends with ".". A chunk never exceeds the maximum length
/// unless a single sentence alone does; such a sentence becomes a chunk of
/// its own and is never split.
pub fn create_chunks(text: &str, options: &ChunkOptions) -> Vec<String> {
    let max = options.max_chunk_len;
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in SENTENCE_END_RE.split(text) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let len = sentence.chars().count();

        let joined_len = if current.is_empty() {
            len + 1
        } else {
            current_len + 2 + len + 1
        };
        if joined_len <= max || current.is_empty() {
            if !current.is_empty() {
                current.push_str(". ");
                current_len += 2;
            }
            current.push_str(sentence);
            current_len += len;
        } else {
            current.push('.');
            chunks.push(std::mem::take(&mut current));
            current.push_str(sentence);
            current_len = len;
        }
    }

    if !current.is_empty() {
        current.push('.');
        chunks.push(current);
    }

    log::debug!("Created {} speech chunks", chunks.len());
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_short_sentences() {
        let chunks = create_chunks("Uno. Dos! Tres?", &ChunkOptions::default());
        assert_eq!(chunks, vec!["Uno. Dos. Tres."]);
    }

    #[test]
    fn test_splits_at_limit() {
        let options = ChunkOptions::new().with_max_len(12);
        let chunks = create_chunks("Hola mundo. Otra frase. Fin.", &options);
        assert_eq!(chunks, vec!["Hola mundo.", "Otra frase.", "Fin."]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
    }

    #[test]
    fn test_oversized_sentence_kept_whole() {
        let long = "palabra ".repeat(80);
        let text = format!("Corta. {}. Otra corta.", long.trim());
        let chunks = create_chunks(&text, &ChunkOptions::default());
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], format!("{}.", long.trim()));
    }

    #[test]
    fn test_exact_fit() {
        let options = ChunkOptions::new().with_max_len(10);
        // "abcd. efg." is exactly 10 characters
        assert_eq!(create_chunks("abcd. efg.", &options), vec!["abcd. efg."]);
        assert_eq!(create_chunks("abcd. efgh.", &options), vec!["abcd.", "efgh."]);
    }

    #[test]
    fn test_empty_input() {
        assert!(create_chunks("", &ChunkOptions::default()).is_empty());
        assert!(create_chunks(" . ! ?", &ChunkOptions::default()).is_empty());
    }

    #[test]
    fn test_length_counts_characters() {
        let options = ChunkOptions::new().with_max_len(6);
        assert_eq!(create_chunks("ñañá. b", &options), vec!["ñañá.", "b."]);
    }
}
