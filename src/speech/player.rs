//! Chunk-by-chunk playback.
//!
//! [`Player`] is an explicit state machine over a [`SpeechEngine`]. Engine
//! events go in through [`Player::handle_event`]; delayed follow-ups (the
//! short pause before the next chunk, the audio unlock timeout, the restart
//! after a skip) come back out as [`Scheduled`] steps that the caller runs
//! with [`Player::fire`] once their delay has passed. Every stop or restart
//! opens a new generation, and events or steps from an older generation are
//! ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::engine::{
    filter_voices, select_default_voice, SpeechEngine, SpeechEvent, Utterance, Voice,
    VoiceSettings,
};
use crate::error::Result;

/// Sentence spoken by [`Player::test_audio`].
pub const TEST_PHRASE: &str =
    "Hola, esta es una prueba de audio. Si puedes escuchar esto, el audio funciona correctamente.";

const UNLOCK_TEXT: &str = " ";
const UNLOCK_VOLUME: f32 = 0.01;
const UNLOCK_RATE: f32 = 10.0;

/// Delays used between utterances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerTiming {
    /// Pause after a chunk ends before the next one starts
    pub advance_delay: Duration,
    /// Pause after a chunk fails before the next one starts
    pub error_delay: Duration,
    /// Longest wait for the mobile audio unlock utterance
    pub unlock_timeout: Duration,
}

impl PlayerTiming {
    /// All delays zero; useful for tests and non-interactive runs.
    pub fn immediate() -> Self {
        Self {
            advance_delay: Duration::ZERO,
            error_delay: Duration::ZERO,
            unlock_timeout: Duration::ZERO,
        }
    }
}

impl Default for PlayerTiming {
    fn default() -> Self {
        Self {
            advance_delay: Duration::from_millis(100),
            error_delay: Duration::from_millis(500),
            unlock_timeout: Duration::from_secs(1),
        }
    }
}

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing playing
    #[default]
    Idle,
    /// Speaking chunks
    Reading,
    /// Paused mid-chunk
    Paused,
}

/// Snapshot of the reading position for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadingState {
    /// A session is running (reading or paused)
    pub is_reading: bool,
    /// The session is paused
    pub is_paused: bool,
    /// Index of the current chunk
    pub current_chunk: usize,
    /// Number of chunks
    pub total_chunks: usize,
}

impl ReadingState {
    /// Position as a percentage.
    pub fn progress(&self) -> f32 {
        if self.total_chunks == 0 {
            return 0.0;
        }
        (self.current_chunk + 1) as f32 / self.total_chunks as f32 * 100.0
    }
}

/// Counters for one reading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Chunks that played to the end
    pub spoken: usize,
    /// Chunks the engine failed on
    pub failed: usize,
    /// Blank chunks passed over
    pub skipped: usize,
}

/// Follow-up work the player wants done later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Speak the chunk at this index
    Advance(usize),
    /// Start a new session at this chunk
    Restart(usize),
    /// Give up waiting for the audio unlock utterance
    FinishUnlock,
}

/// A [`Step`] to run after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    /// How long to wait before calling [`Player::fire`]
    pub delay: Duration,
    /// What to do
    pub step: Step,
    generation: u64,
}

/// Reads a list of chunks aloud through a speech engine.
pub struct Player<E: SpeechEngine> {
    engine: E,
    chunks: Vec<String>,
    settings: VoiceSettings,
    timing: PlayerTiming,
    state: PlaybackState,
    current_chunk: usize,
    mobile: bool,
    audio_unlocked: bool,
    wake_lock: bool,
    generation: u64,
    next_id: u64,
    in_flight: Option<(u64, usize)>,
    unlocking: Option<(u64, usize)>,
    stats: SessionStats,
    last_error: Option<String>,
}

impl<E: SpeechEngine> Player<E> {
    /// Create an idle player.
    pub fn new(engine: E, chunks: Vec<String>) -> Self {
        Self {
            engine,
            chunks,
            settings: VoiceSettings::default(),
            timing: PlayerTiming::default(),
            state: PlaybackState::Idle,
            current_chunk: 0,
            mobile: false,
            audio_unlocked: false,
            wake_lock: false,
            generation: 0,
            next_id: 0,
            in_flight: None,
            unlocking: None,
            stats: SessionStats::default(),
            last_error: None,
        }
    }

    /// Set the delays.
    pub fn with_timing(mut self, timing: PlayerTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set the voice settings.
    pub fn with_settings(mut self, settings: VoiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Mark the device as mobile: audio is unlocked before the first chunk
    /// and a wake lock is held while reading.
    pub fn with_mobile(mut self, mobile: bool) -> Self {
        self.mobile = mobile;
        self
    }

    /// The underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The underlying engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Chunks being read.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Replace the chunks. Any running session is stopped.
    pub fn set_chunks(&mut self, chunks: Vec<String>) {
        self.stop();
        self.chunks = chunks;
    }

    /// Current voice settings.
    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    /// Change the voice settings; they apply from the next chunk.
    pub fn set_settings(&mut self, settings: VoiceSettings) {
        self.settings = settings;
    }

    /// Playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Reading position snapshot.
    pub fn reading_state(&self) -> ReadingState {
        ReadingState {
            is_reading: self.state != PlaybackState::Idle,
            is_paused: self.state == PlaybackState::Paused,
            current_chunk: self.current_chunk,
            total_chunks: self.chunks.len(),
        }
    }

    /// True while a session is running or waiting for the audio unlock.
    pub fn is_active(&self) -> bool {
        self.state != PlaybackState::Idle || self.unlocking.is_some()
    }

    /// Counters since the player was created.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Last engine error, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Load the engine's Spanish and English voices, selecting the preferred
    /// Spanish voice when none is set yet.
    pub fn load_voices(&mut self) -> Vec<Voice> {
        let voices = filter_voices(&self.engine.voices());
        if self.settings.voice.is_none() {
            if let Some(voice) = select_default_voice(&voices) {
                log::debug!("Selected voice {} ({})", voice.name, voice.lang);
                self.settings.voice = Some(voice.name.clone());
            }
        }
        voices
    }

    /// Start reading at chunk `from`.
    ///
    /// On a mobile device whose audio is still locked, a near-silent
    /// utterance is played first and reading begins once it ends (or the
    /// unlock timeout passes).
    pub fn start(&mut self, from: usize) -> Option<Scheduled> {
        if self.chunks.is_empty() {
            log::debug!("No text to read");
            return None;
        }
        if self.mobile && !self.audio_unlocked {
            if let Some(scheduled) = self.begin_unlock(from) {
                return Some(scheduled);
            }
        }
        self.begin(from)
    }

    /// Feed an engine event.
    pub fn handle_event(&mut self, event: SpeechEvent) -> Option<Scheduled> {
        if let Some((unlock_id, _)) = self.unlocking {
            if event.id() == unlock_id {
                return match event {
                    SpeechEvent::Started(_) => None,
                    _ => self.finish_unlock(false),
                };
            }
        }

        let Some((id, chunk)) = self.in_flight.filter(|(id, _)| *id == event.id()) else {
            log::trace!("Ignoring stale speech event {:?}", event);
            return None;
        };

        match event {
            SpeechEvent::Started(_) => {
                self.current_chunk = chunk;
                None
            }
            SpeechEvent::Ended(_) => {
                log::trace!("Utterance {} (chunk {}) ended", id, chunk);
                self.in_flight = None;
                self.stats.spoken += 1;
                Some(self.schedule(self.timing.advance_delay, Step::Advance(chunk + 1)))
            }
            SpeechEvent::Failed { message, .. } => {
                log::warn!("Chunk {} failed: {}", chunk, message);
                self.in_flight = None;
                self.stats.failed += 1;
                self.last_error = Some(format!("Error en chunk {}: {}", chunk, message));
                Some(self.schedule(self.timing.error_delay, Step::Advance(chunk + 1)))
            }
        }
    }

    /// Run a scheduled step. Steps from an earlier session are ignored.
    pub fn fire(&mut self, scheduled: Scheduled) -> Option<Scheduled> {
        if scheduled.generation != self.generation {
            log::trace!("Dropping stale step {:?}", scheduled.step);
            return None;
        }
        match scheduled.step {
            Step::Advance(index) => self.advance(index),
            Step::Restart(index) => self.start(index),
            Step::FinishUnlock if self.unlocking.is_some() => {
                log::debug!("Audio unlock timed out");
                self.finish_unlock(true)
            }
            Step::FinishUnlock => None,
        }
    }

    /// Pause the current chunk.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Reading {
            self.engine.pause();
            self.state = PlaybackState::Paused;
        }
    }

    /// Resume after [`Player::pause`].
    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.engine.resume();
            self.state = PlaybackState::Reading;
        }
    }

    /// Stop reading and rewind to the first chunk.
    pub fn stop(&mut self) {
        self.engine.cancel();
        self.generation += 1;
        self.state = PlaybackState::Idle;
        self.current_chunk = 0;
        self.in_flight = None;
        self.unlocking = None;
        self.release_wake_lock();
    }

    /// Stop, then restart at the next chunk (clamped to the last one).
    pub fn skip_forward(&mut self) -> Option<Scheduled> {
        let last = self.chunks.len().checked_sub(1)?;
        let target = (self.current_chunk + 1).min(last);
        self.restart_at(target)
    }

    /// Stop, then restart at the previous chunk (clamped to the first one).
    pub fn skip_backward(&mut self) -> Option<Scheduled> {
        if self.chunks.is_empty() {
            return None;
        }
        let target = self.current_chunk.saturating_sub(1);
        self.restart_at(target)
    }

    /// Jump straight to a chunk (clamped), restarting playback there.
    pub fn seek(&mut self, chunk: usize) -> Option<Scheduled> {
        let last = self.chunks.len().checked_sub(1)?;
        self.stop();
        self.start(chunk.min(last))
    }

    /// Speak a fixed test sentence with the current settings.
    ///
    /// A running session is stopped first.
    pub fn test_audio(&mut self) -> Result<()> {
        self.stop();
        if self.mobile && !self.audio_unlocked {
            let id = self.next_utterance_id();
            let unlock = self.unlock_utterance(id);
            if let Err(e) = self.engine.speak(unlock) {
                log::warn!("Audio unlock failed, continuing: {}", e);
            }
            self.audio_unlocked = true;
            self.engine.cancel();
        }
        let id = self.next_utterance_id();
        self.engine
            .speak(Utterance::new(id, TEST_PHRASE, &self.settings))
    }

    fn restart_at(&mut self, target: usize) -> Option<Scheduled> {
        self.stop();
        Some(self.schedule(self.timing.advance_delay, Step::Restart(target)))
    }

    fn begin_unlock(&mut self, from: usize) -> Option<Scheduled> {
        let id = self.next_utterance_id();
        let unlock = self.unlock_utterance(id);
        match self.engine.speak(unlock) {
            Ok(()) => {
                self.unlocking = Some((id, from));
                Some(self.schedule(self.timing.unlock_timeout, Step::FinishUnlock))
            }
            Err(e) => {
                log::warn!("Audio unlock failed, continuing: {}", e);
                self.audio_unlocked = true;
                None
            }
        }
    }

    fn finish_unlock(&mut self, timed_out: bool) -> Option<Scheduled> {
        let (_, from) = self.unlocking.take()?;
        if timed_out {
            self.engine.cancel();
        }
        self.audio_unlocked = true;
        self.begin(from)
    }

    fn begin(&mut self, from: usize) -> Option<Scheduled> {
        if self.mobile && !self.wake_lock {
            self.wake_lock = self.engine.acquire_wake_lock();
        }
        self.engine.cancel();
        self.generation += 1;
        self.in_flight = None;
        self.state = PlaybackState::Reading;
        log::info!("Reading from chunk {} of {}", from + 1, self.chunks.len());
        self.advance(from)
    }

    fn advance(&mut self, index: usize) -> Option<Scheduled> {
        if self.state == PlaybackState::Idle {
            return None;
        }
        let Some(text) = self.chunks.get(index).cloned() else {
            self.finish();
            return None;
        };
        self.current_chunk = index;

        if text.trim().is_empty() {
            log::warn!("Chunk {} is empty, skipping", index);
            self.stats.skipped += 1;
            return Some(self.schedule(self.timing.advance_delay, Step::Advance(index + 1)));
        }

        let id = self.next_utterance_id();
        let utterance = Utterance::new(id, text, &self.settings);
        match self.engine.speak(utterance) {
            Ok(()) => {
                self.in_flight = Some((id, index));
                None
            }
            Err(e) => {
                log::warn!("Chunk {} could not be queued: {}", index, e);
                self.stats.failed += 1;
                self.last_error = Some(format!("Error en chunk {}: {}", index, e));
                Some(self.schedule(self.timing.error_delay, Step::Advance(index + 1)))
            }
        }
    }

    fn finish(&mut self) {
        log::info!("Finished reading {} chunks", self.chunks.len());
        self.state = PlaybackState::Idle;
        self.current_chunk = 0;
        self.in_flight = None;
        self.release_wake_lock();
    }

    fn release_wake_lock(&mut self) {
        if self.wake_lock {
            self.engine.release_wake_lock();
            self.wake_lock = false;
        }
    }

    fn unlock_utterance(&self, id: u64) -> Utterance {
        Utterance {
            id,
            text: UNLOCK_TEXT.to_string(),
            rate: UNLOCK_RATE,
            pitch: self.settings.pitch,
            volume: UNLOCK_VOLUME,
            voice: self.settings.voice.clone(),
        }
    }

    fn schedule(&self, delay: Duration, step: Step) -> Scheduled {
        Scheduled {
            delay,
            step,
            generation: self.generation,
        }
    }

    fn next_utterance_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[derive(Default)]
    struct FakeEngine {
        spoken: Vec<Utterance>,
        cancels: usize,
        pauses: usize,
        resumes: usize,
        fail_on: Option<String>,
        wake_locks: usize,
        releases: usize,
    }

    impl SpeechEngine for FakeEngine {
        fn speak(&mut self, utterance: Utterance) -> Result<()> {
            if self.fail_on.as_deref() == Some(utterance.text.as_str()) {
                return Err(Error::Speech("rejected".to_string()));
            }
            self.spoken.push(utterance);
            Ok(())
        }

        fn cancel(&mut self) {
            self.cancels += 1;
        }

        fn pause(&mut self) {
            self.pauses += 1;
        }

        fn resume(&mut self) {
            self.resumes += 1;
        }

        fn voices(&self) -> Vec<Voice> {
            vec![
                Voice::new("Samantha", "en-US", true),
                Voice::new("Paulina", "es-MX", true),
                Voice::new("Anna", "de-DE", true),
            ]
        }

        fn acquire_wake_lock(&mut self) -> bool {
            self.wake_locks += 1;
            true
        }

        fn release_wake_lock(&mut self) {
            self.releases += 1;
        }
    }

    fn chunks(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Frase {}.", i)).collect()
    }

    fn last_id(player: &Player<FakeEngine>) -> u64 {
        player.engine().spoken.last().unwrap().id
    }

    #[test]
    fn test_start_speaks_first_chunk() {
        let mut player = Player::new(FakeEngine::default(), chunks(3));
        assert!(player.start(0).is_none());
        assert_eq!(player.state(), PlaybackState::Reading);
        assert_eq!(player.engine().spoken[0].text, "Frase 0.");
        assert_eq!(player.engine().cancels, 1);
    }

    #[test]
    fn test_each_chunk_gets_fresh_utterance() {
        let mut player =
            Player::new(FakeEngine::default(), chunks(2)).with_timing(PlayerTiming::immediate());
        player.start(0);
        let first = last_id(&player);
        let next = player.handle_event(SpeechEvent::Ended(first)).unwrap();
        player.fire(next);
        let spoken = &player.engine().spoken;
        assert_eq!(spoken.len(), 2);
        assert_eq!(spoken[1].text, "Frase 1.");
        assert!(spoken[1].id > spoken[0].id);
        assert_eq!(player.chunks(), chunks(2).as_slice());
    }

    #[test]
    fn test_end_schedules_next_chunk() {
        let mut player = Player::new(FakeEngine::default(), chunks(2));
        player.start(0);
        let id = last_id(&player);
        let next = player.handle_event(SpeechEvent::Ended(id)).unwrap();
        assert_eq!(next.step, Step::Advance(1));
        assert_eq!(next.delay, Duration::from_millis(100));
        assert!(player.fire(next).is_none());
        assert_eq!(player.reading_state().current_chunk, 1);
    }

    #[test]
    fn test_error_still_advances() {
        let mut player = Player::new(FakeEngine::default(), chunks(2));
        player.start(0);
        let id = last_id(&player);
        let next = player
            .handle_event(SpeechEvent::Failed {
                id,
                message: "synthesis-failed".to_string(),
            })
            .unwrap();
        assert_eq!(next.delay, Duration::from_millis(500));
        assert_eq!(next.step, Step::Advance(1));
        assert_eq!(player.stats().failed, 1);
        assert!(player.last_error().unwrap().contains("synthesis-failed"));
    }

    #[test]
    fn test_natural_end_returns_to_idle() {
        let mut player = Player::new(FakeEngine::default(), chunks(1));
        player.start(0);
        let id = last_id(&player);
        let next = player.handle_event(SpeechEvent::Ended(id)).unwrap();
        assert!(player.fire(next).is_none());
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(player.reading_state().current_chunk, 0);
    }

    #[test]
    fn test_stop_resets_state() {
        let mut player = Player::new(FakeEngine::default(), chunks(3)).with_mobile(true);
        player.start(1);
        let unlock = last_id(&player);
        player.handle_event(SpeechEvent::Ended(unlock));
        assert!(player.reading_state().is_reading);

        player.stop();
        let state = player.reading_state();
        assert!(!state.is_reading);
        assert!(!state.is_paused);
        assert_eq!(state.current_chunk, 0);
        assert_eq!(player.engine().releases, 1);
    }

    #[test]
    fn test_stale_events_ignored_after_stop() {
        let mut player = Player::new(FakeEngine::default(), chunks(3));
        player.start(0);
        let id = last_id(&player);
        player.stop();
        assert!(player.handle_event(SpeechEvent::Ended(id)).is_none());
        assert_eq!(player.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_stale_schedule_ignored() {
        let mut player = Player::new(FakeEngine::default(), chunks(3));
        player.start(0);
        let next = player
            .handle_event(SpeechEvent::Ended(last_id(&player)))
            .unwrap();
        player.stop();
        assert!(player.fire(next).is_none());
        assert_eq!(player.engine().spoken.len(), 1);
    }

    #[test]
    fn test_skip_forward_clamps_at_last() {
        let mut player = Player::new(FakeEngine::default(), chunks(3));
        player.start(2);
        let restart = player.skip_forward().unwrap();
        assert_eq!(restart.step, Step::Restart(2));
        player.fire(restart);
        assert_eq!(player.reading_state().current_chunk, 2);
        assert_eq!(player.engine().spoken.last().unwrap().text, "Frase 2.");
    }

    #[test]
    fn test_skip_backward_clamps_at_first() {
        let mut player = Player::new(FakeEngine::default(), chunks(3));
        player.start(0);
        let restart = player.skip_backward().unwrap();
        assert_eq!(restart.step, Step::Restart(0));

        player.start(2);
        let restart = player.skip_backward().unwrap();
        assert_eq!(restart.step, Step::Restart(1));
    }

    #[test]
    fn test_pause_resume() {
        let mut player = Player::new(FakeEngine::default(), chunks(2));
        player.pause();
        assert_eq!(player.engine().pauses, 0);

        player.start(0);
        player.pause();
        assert!(player.reading_state().is_paused);
        player.resume();
        assert_eq!(player.state(), PlaybackState::Reading);
        assert_eq!((player.engine().pauses, player.engine().resumes), (1, 1));
    }

    #[test]
    fn test_mobile_unlock_once() {
        let mut player = Player::new(FakeEngine::default(), chunks(2)).with_mobile(true);
        let timeout = player.start(0).unwrap();
        assert_eq!(timeout.step, Step::FinishUnlock);
        let unlock = &player.engine().spoken[0];
        assert_eq!(unlock.text, " ");
        assert_eq!((unlock.volume, unlock.rate), (0.01, 10.0));

        // Timeout fires before the unlock utterance reports back.
        assert!(player.fire(timeout).is_none());
        assert_eq!(player.engine().spoken[1].text, "Frase 0.");
        assert_eq!(player.engine().wake_locks, 1);

        player.stop();
        assert!(player.start(0).is_none());
        assert_eq!(player.engine().spoken.len(), 3);
    }

    #[test]
    fn test_blank_chunk_skipped() {
        let mut player = Player::new(FakeEngine::default(), vec!["  ".into(), "Hola.".into()]);
        let next = player.start(0).unwrap();
        assert_eq!(next.step, Step::Advance(1));
        player.fire(next);
        assert_eq!(player.engine().spoken[0].text, "Hola.");
        assert_eq!(player.stats().skipped, 1);
    }

    #[test]
    fn test_speak_rejection_advances() {
        let engine = FakeEngine {
            fail_on: Some("Frase 0.".into()),
            ..Default::default()
        };
        let mut player = Player::new(engine, chunks(2));
        let next = player.start(0).unwrap();
        assert_eq!(next.step, Step::Advance(1));
        assert_eq!(player.stats().failed, 1);
    }

    #[test]
    fn test_empty_chunks() {
        let mut player = Player::new(FakeEngine::default(), Vec::new());
        assert!(player.start(0).is_none());
        assert!(player.skip_forward().is_none());
        assert_eq!(player.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_load_voices_selects_spanish() {
        let mut player = Player::new(FakeEngine::default(), chunks(1));
        let voices = player.load_voices();
        assert_eq!(voices.len(), 2);
        assert_eq!(player.settings().voice.as_deref(), Some("Paulina"));
        player.start(0);
        assert_eq!(player.engine().spoken[0].voice.as_deref(), Some("Paulina"));
    }

    #[test]
    fn test_audio_phrase() {
        let mut player = Player::new(FakeEngine::default(), chunks(1));
        player.test_audio().unwrap();
        assert_eq!(player.engine().spoken[0].text, TEST_PHRASE);
    }

    #[test]
    fn test_progress() {
        let state = ReadingState {
            is_reading: true,
            is_paused: false,
            current_chunk: 1,
            total_chunks: 4,
        };
        assert_eq!(state.progress(), 50.0);
        assert_eq!(ReadingState::default().progress(), 0.0);
    }
}
