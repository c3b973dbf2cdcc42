//! Speech engine abstraction and voice handling.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A voice offered by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Display name (e.g., "Google español")
    pub name: String,
    /// BCP 47 language tag (e.g., "es-AR")
    pub lang: String,
    /// Voice is installed locally rather than served remotely
    pub local: bool,
}

impl Voice {
    /// Create a voice description.
    pub fn new(name: impl Into<String>, lang: impl Into<String>, local: bool) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            local,
        }
    }

    fn is_spanish(&self) -> bool {
        self.lang.to_ascii_lowercase().starts_with("es")
    }
}

/// User-adjustable speech settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Speaking rate, 1.0 is normal
    pub rate: f32,
    /// Pitch, 1.0 is normal
    pub pitch: f32,
    /// Volume from 0.0 to 1.0
    pub volume: f32,
    /// Selected voice name
    pub voice: Option<String>,
}

impl VoiceSettings {
    /// Set the rate, clamped to 0.1..=10.
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate.clamp(0.1, 10.0);
        self
    }

    /// Set the pitch, clamped to 0..=2.
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch.clamp(0.0, 2.0);
        self
    }

    /// Set the volume, clamped to 0..=1.
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Select a voice by name.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        }
    }
}

/// One unit of speech handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Identifier echoed back in [`SpeechEvent`]s
    pub id: u64,
    /// Text to speak
    pub text: String,
    /// Speaking rate
    pub rate: f32,
    /// Pitch
    pub pitch: f32,
    /// Volume
    pub volume: f32,
    /// Voice name, engine default when `None`
    pub voice: Option<String>,
}

impl Utterance {
    /// Create an utterance using the given settings.
    pub fn new(id: u64, text: impl Into<String>, settings: &VoiceSettings) -> Self {
        Self {
            id,
            text: text.into(),
            rate: settings.rate,
            pitch: settings.pitch,
            volume: settings.volume,
            voice: settings.voice.clone(),
        }
    }
}

/// Notification from the engine about an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// The utterance began playing
    Started(u64),
    /// The utterance finished
    Ended(u64),
    /// The utterance could not be spoken
    Failed {
        /// Utterance id
        id: u64,
        /// Engine error description
        message: String,
    },
}

impl SpeechEvent {
    /// Id of the utterance the event refers to.
    pub fn id(&self) -> u64 {
        match self {
            SpeechEvent::Started(id) | SpeechEvent::Ended(id) => *id,
            SpeechEvent::Failed { id, .. } => *id,
        }
    }
}

/// A speech synthesis backend.
///
/// `speak` queues an utterance and returns immediately; progress is reported
/// asynchronously as [`SpeechEvent`]s, usually over a channel the engine was
/// built with.
pub trait SpeechEngine {
    /// Queue an utterance.
    fn speak(&mut self, utterance: Utterance) -> Result<()>;

    /// Drop the current and all queued utterances.
    fn cancel(&mut self);

    /// Pause playback.
    fn pause(&mut self);

    /// Resume paused playback.
    fn resume(&mut self);

    /// Voices the engine offers.
    fn voices(&self) -> Vec<Voice>;

    /// Keep the device awake while reading. Returns true when a lock is held.
    fn acquire_wake_lock(&mut self) -> bool {
        false
    }

    /// Release a held wake lock.
    fn release_wake_lock(&mut self) {}
}

/// Keep Spanish and English voices.
pub fn filter_voices(voices: &[Voice]) -> Vec<Voice> {
    voices
        .iter()
        .filter(|v| {
            let lang = v.lang.to_ascii_lowercase();
            lang.starts_with("es") || lang.starts_with("en")
        })
        .cloned()
        .collect()
}

/// Preferred voice: a local Spanish voice, else any Spanish voice.
pub fn select_default_voice(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .find(|v| v.is_spanish() && v.local)
        .or_else(|| {
            voices
                .iter()
                .find(|v| v.is_spanish() || v.name.to_lowercase().contains("spanish"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("Anna", "de-DE", true),
            Voice::new("Samantha", "en-US", true),
            Voice::new("Google español", "es-ES", false),
            Voice::new("Paulina", "es-MX", true),
        ]
    }

    #[test]
    fn test_filter_voices() {
        let filtered = filter_voices(&voices());
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|v| v.lang != "de-DE"));
    }

    #[test]
    fn test_prefers_local_spanish() {
        assert_eq!(select_default_voice(&voices()).unwrap().name, "Paulina");
    }

    #[test]
    fn test_falls_back_to_any_spanish() {
        let list = vec![
            Voice::new("Samantha", "en-US", true),
            Voice::new("Google español", "es-ES", false),
        ];
        assert_eq!(select_default_voice(&list).unwrap().name, "Google español");

        let list = vec![Voice::new("Spanish Female", "und", false)];
        assert_eq!(select_default_voice(&list).unwrap().name, "Spanish Female");

        assert!(select_default_voice(&[Voice::new("Anna", "de-DE", true)]).is_none());
    }

    #[test]
    fn test_settings_clamp() {
        let s = VoiceSettings::default()
            .with_rate(20.0)
            .with_pitch(-1.0)
            .with_volume(3.0);
        assert_eq!((s.rate, s.pitch, s.volume), (10.0, 0.0, 1.0));
    }
}
