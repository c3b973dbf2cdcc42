//! Integration tests for the speech pipeline.

use std::time::Duration;

use boletin::error::{Error, Result};
use boletin::speech::{
    clean_text_for_speech, create_chunks, prepare_chunks, run_session, ChunkOptions,
    PlaybackState, Player, PlayerTiming, SpeechEngine, SpeechEvent, Step, Utterance, Voice,
};
use crossbeam_channel::{unbounded, Sender};

/// Engine that records commands and never reports back on its own.
#[derive(Default)]
struct Recorder {
    spoken: Vec<Utterance>,
    cancels: usize,
}

impl SpeechEngine for Recorder {
    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.spoken.push(utterance);
        Ok(())
    }

    fn cancel(&mut self) {
        self.cancels += 1;
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn voices(&self) -> Vec<Voice> {
        vec![
            Voice::new("Google español", "es-ES", false),
            Voice::new("Mónica", "es-ES", true),
        ]
    }
}

fn chunks(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Artículo {}.", i)).collect()
}

#[test]
fn test_stop_while_reading() {
    let mut player = Player::new(Recorder::default(), chunks(5));
    player.start(3);
    assert!(player.reading_state().is_reading);

    player.stop();
    let state = player.reading_state();
    assert!(!state.is_reading);
    assert!(!state.is_paused);
    assert_eq!(state.current_chunk, 0);
}

#[test]
fn test_stop_while_paused() {
    let mut player = Player::new(Recorder::default(), chunks(2));
    player.start(1);
    player.pause();
    player.stop();
    assert_eq!(player.state(), PlaybackState::Idle);
    assert!(!player.reading_state().is_paused);
}

#[test]
fn test_skip_forward_at_last_chunk_is_clamped() {
    let mut player = Player::new(Recorder::default(), chunks(3));
    player.start(2);
    let restart = player.skip_forward().unwrap();
    assert_eq!(restart.step, Step::Restart(2));
    assert_eq!(restart.delay, Duration::from_millis(100));

    player.fire(restart);
    assert_eq!(player.reading_state().current_chunk, 2);
    assert_eq!(player.engine().spoken.last().unwrap().text, "Artículo 3.");
}

#[test]
fn test_skip_after_stop_ignores_old_events() {
    let mut player = Player::new(Recorder::default(), chunks(3));
    player.start(0);
    let old = player.engine().spoken[0].id;

    let restart = player.skip_forward().unwrap();
    assert!(player.handle_event(SpeechEvent::Ended(old)).is_none());
    player.fire(restart);
    assert_eq!(player.engine().spoken.last().unwrap().text, "Artículo 2.");
}

#[test]
fn test_error_event_advances_after_delay() {
    let mut player = Player::new(Recorder::default(), chunks(2));
    player.start(0);
    let id = player.engine().spoken[0].id;
    let next = player
        .handle_event(SpeechEvent::Failed {
            id,
            message: "audio-busy".into(),
        })
        .unwrap();
    assert_eq!(next.delay, Duration::from_millis(500));
    player.fire(next);
    assert_eq!(player.engine().spoken.last().unwrap().text, "Artículo 2.");
}

#[test]
fn test_prefers_local_spanish_voice() {
    let mut player = Player::new(Recorder::default(), chunks(1));
    player.load_voices();
    assert_eq!(player.settings().voice.as_deref(), Some("Mónica"));
}

#[test]
fn test_chunk_length_bound() {
    let sentence = "El Concejo Deliberante sanciona con fuerza de ordenanza";
    let text = (0..40)
        .map(|i| format!("{} {}", sentence, i))
        .collect::<Vec<_>>()
        .join(". ");
    let chunks = create_chunks(&text, &ChunkOptions::default());
    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.chars().count() <= 500));
}

#[test]
fn test_oversized_sentence_is_own_chunk() {
    let long = "a".repeat(620);
    let text = format!("Breve. {} Final.", long);
    let chunks = create_chunks(&text, &ChunkOptions::default());
    assert_eq!(chunks.len(), 2);
    assert!(chunks[1].starts_with(&long));
}

#[test]
fn test_chunks_keep_every_character() {
    let raw = "--- Página 3 ---\nVISTO: el expediente Nº 12/2025; y\nCONSIDERANDO: que corresponde... ¿Procede? ¡Sí!\n\n7\nArtículo 1°) Apruébase el convenio.";
    let cleaned = clean_text_for_speech(raw);
    let chunks = create_chunks(&cleaned, &ChunkOptions::new().with_max_len(40));

    let significant = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '.' | '!' | '?'))
            .collect()
    };
    assert_eq!(significant(&chunks.concat()), significant(&cleaned));
}

#[test]
fn test_prepare_strips_layout_noise() {
    let raw = "--- Página 1 ---\nBOLETÍN OFICIAL\n\n--- Página 2 ---\n2\nDECRETO Nº 5 — designa.";
    let chunks = prepare_chunks(raw, &ChunkOptions::default());
    let joined = chunks.join(" ");
    assert!(!joined.contains("Página"));
    assert!(!joined.contains('—'));
    assert!(joined.contains("DECRETO"));
}

struct Echo {
    tx: Sender<SpeechEvent>,
}

impl SpeechEngine for Echo {
    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.tx
            .send(SpeechEvent::Ended(utterance.id))
            .map_err(|e| Error::Speech(e.to_string()))
    }

    fn cancel(&mut self) {}

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }
}

#[test]
fn test_session_reads_to_the_end() {
    let (tx, rx) = unbounded();
    let mut player =
        Player::new(Echo { tx }, chunks(4)).with_timing(PlayerTiming::immediate());
    let stats = run_session(&mut player, &rx, 0).unwrap();
    assert_eq!(stats.spoken, 4);
    assert_eq!(player.state(), PlaybackState::Idle);
}

#[test]
fn test_mobile_session_unlocks_first() {
    let (tx, rx) = unbounded();
    let mut player = Player::new(Echo { tx }, chunks(2))
        .with_timing(PlayerTiming::immediate())
        .with_mobile(true);
    let stats = run_session(&mut player, &rx, 0).unwrap();
    assert_eq!(stats.spoken, 2);
}

#[test]
fn test_session_fails_when_engine_goes_away() {
    let (tx, rx) = unbounded::<SpeechEvent>();
    drop(tx);
    let mut player = Player::new(Recorder::default(), chunks(1));
    assert!(run_session(&mut player, &rx, 0).is_err());
}
