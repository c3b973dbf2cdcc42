//! Reading bulletins aloud.
//!
//! Text is pulled out of a PDF, cleaned of layout noise, split into
//! sentence-aligned chunks and handed one at a time to a [`SpeechEngine`]
//! by the [`Player`] state machine.

mod chunk;
mod clean;
mod engine;
mod extract;
mod player;
mod session;

pub use chunk::{create_chunks, ChunkOptions, DEFAULT_MAX_CHUNK_LEN};
pub use clean::clean_text_for_speech;
pub use engine::{
    filter_voices, select_default_voice, SpeechEngine, SpeechEvent, Utterance, Voice,
    VoiceSettings,
};
pub use extract::{extract_pdf_text, extract_pdf_text_from_bytes};
pub use player::{
    PlaybackState, Player, PlayerTiming, ReadingState, Scheduled, SessionStats, Step, TEST_PHRASE,
};
pub use session::run_session;

/// Clean raw PDF text and split it into chunks ready for playback.
pub fn prepare_chunks(raw: &str, options: &ChunkOptions) -> Vec<String> {
    let cleaned = clean_text_for_speech(raw);
    let chunks = create_chunks(&cleaned, options);
    log::info!("Prepared {} chunks from {} characters", chunks.len(), cleaned.chars().count());
    chunks
}
