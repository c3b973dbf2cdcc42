//! Blocking driver that runs a [`Player`] against an event channel.

use std::time::Instant;

use crossbeam_channel::{select, Receiver};

use super::engine::{SpeechEngine, SpeechEvent};
use super::player::{Player, Scheduled, SessionStats};
use crate::error::{Error, Result};

/// Read from chunk `from` until the end, feeding engine events from `events`
/// and firing scheduled steps when due.
///
/// Returns the player's counters once it is idle again. Fails if the event
/// channel disconnects while an utterance is still expected.
pub fn run_session<E: SpeechEngine>(
    player: &mut Player<E>,
    events: &Receiver<SpeechEvent>,
    from: usize,
) -> Result<SessionStats> {
    let mut pending = due(player.start(from));

    while player.is_active() || pending.is_some() {
        match pending.take() {
            Some((deadline, scheduled)) => {
                select! {
                    recv(events) -> msg => {
                        let event = msg.map_err(|_| disconnected())?;
                        pending = due(player.handle_event(event)).or(Some((deadline, scheduled)));
                    }
                    default(deadline.saturating_duration_since(Instant::now())) => {
                        pending = due(player.fire(scheduled));
                    }
                }
            }
            None => {
                let event = events.recv().map_err(|_| disconnected())?;
                pending = due(player.handle_event(event));
            }
        }
    }

    Ok(player.stats())
}

fn due(scheduled: Option<Scheduled>) -> Option<(Instant, Scheduled)> {
    scheduled.map(|s| (Instant::now() + s.delay, s))
}

fn disconnected() -> Error {
    Error::Speech("speech event channel disconnected".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::engine::{Utterance, Voice};
    use crate::speech::player::PlayerTiming;
    use crossbeam_channel::{unbounded, Sender};

    struct ChannelEngine {
        tx: Sender<SpeechEvent>,
        spoken: Vec<String>,
        fail: Option<&'static str>,
    }

    impl SpeechEngine for ChannelEngine {
        fn speak(&mut self, utterance: Utterance) -> Result<()> {
            let _ = self.tx.send(SpeechEvent::Started(utterance.id));
            if self.fail == Some(utterance.text.as_str()) {
                let _ = self.tx.send(SpeechEvent::Failed {
                    id: utterance.id,
                    message: "interrupted".to_string(),
                });
            } else {
                let _ = self.tx.send(SpeechEvent::Ended(utterance.id));
            }
            self.spoken.push(utterance.text);
            Ok(())
        }

        fn cancel(&mut self) {}

        fn pause(&mut self) {}

        fn resume(&mut self) {}

        fn voices(&self) -> Vec<Voice> {
            Vec::new()
        }
    }

    fn player(fail: Option<&'static str>) -> (Player<ChannelEngine>, Receiver<SpeechEvent>) {
        let (tx, rx) = unbounded();
        let engine = ChannelEngine {
            tx,
            spoken: Vec::new(),
            fail,
        };
        let chunks = vec!["Uno.".to_string(), "Dos.".to_string(), "Tres.".to_string()];
        let player = Player::new(engine, chunks).with_timing(PlayerTiming::immediate());
        (player, rx)
    }

    #[test]
    fn test_reads_every_chunk_in_order() {
        let (mut player, rx) = player(None);
        let stats = run_session(&mut player, &rx, 0).unwrap();
        assert_eq!(stats.spoken, 3);
        assert_eq!(player.engine().spoken, vec!["Uno.", "Dos.", "Tres."]);
    }

    #[test]
    fn test_failure_does_not_stop_session() {
        let (mut player, rx) = player(Some("Dos."));
        let stats = run_session(&mut player, &rx, 0).unwrap();
        assert_eq!((stats.spoken, stats.failed), (2, 1));
    }

    #[test]
    fn test_starts_midway() {
        let (mut player, rx) = player(None);
        run_session(&mut player, &rx, 1).unwrap();
        assert_eq!(player.engine().spoken, vec!["Dos.", "Tres."]);
    }
}
