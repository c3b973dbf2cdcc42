//! Text cleaning before speech.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static PAGE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--- Página \d+ ---").unwrap());

// Word characters are ASCII only; Spanish letters are listed explicitly.
static SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^0-9A-Za-z_\s.,;:!?¿¡\-()áéíóúüñÁÉÍÓÚÜÑ]").unwrap()
});

static REPEATED_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.,;:!?]{2,}").unwrap());

static PAGE_NUMBER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\d+[ \t]*$").unwrap());

/// Prepare extracted text for the speech engine.
///
/// Removes `--- Página N ---` markers, replaces symbols the engine would
/// spell out with spaces, collapses runs of punctuation into a single period
/// and drops lines holding only a page number.
pub fn clean_text_for_speech(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    // Decomposed accents would otherwise be stripped as symbols.
    let text: String = text.nfc().collect();
    let text = PAGE_MARKER_RE.replace_all(&text, "");
    let text = SYMBOL_RE.replace_all(&text, " ");
    let text = REPEATED_PUNCT_RE.replace_all(&text, ".");
    let text = PAGE_NUMBER_LINE_RE.replace_all(&text, "");
    text.trim().to_string()
}
