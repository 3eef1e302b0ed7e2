//! Audio playback
//!
//! The game talks to an `AudioOut` backend through a `Playlist`, which
//! remembers what is playing so it can stop sounds by key or all at once.

use thiserror::Error;

use crate::assets::SoundAsset;

/// Handle to one started playback
pub type PlaybackId = u64;

#[derive(Debug, Error, PartialEq)]
pub enum AudioError {
    #[error("no sound loaded for `{0}`")]
    MissingSound(String),
    #[error("audio backend could not start `{key}`: {reason}")]
    Start { key: String, reason: String },
}

/// Section of a buffer to play, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    pub start: f64,
    pub end: f64,
    pub looped: bool,
}

impl PlaybackOptions {
    /// The whole buffer, once
    pub fn full(sound: &SoundAsset) -> Self {
        Self {
            start: 0.0,
            end: sound.duration,
            looped: false,
        }
    }

    pub fn looped(self) -> Self {
        Self {
            looped: true,
            ..self
        }
    }
}

/// Audio backend: decoded buffers and a context that can be suspended
pub trait AudioOut {
    fn start(&mut self, key: &str, options: PlaybackOptions) -> Result<PlaybackId, AudioError>;
    fn stop(&mut self, id: PlaybackId);
    fn suspend(&mut self);
    fn resume(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
struct PlaylistEntry {
    id: PlaybackId,
    key: String,
}

/// Sounds currently playing
#[derive(Debug, Default)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `key` unless muted; failures are logged and dropped
    pub fn playback(
        &mut self,
        audio: &mut dyn AudioOut,
        key: &str,
        sound: Option<&SoundAsset>,
        looped: bool,
        muted: bool,
    ) -> Option<PlaybackId> {
        if muted {
            return None;
        }
        let result = sound
            .ok_or_else(|| AudioError::MissingSound(key.to_string()))
            .and_then(|sound| {
                let mut options = PlaybackOptions::full(sound);
                if looped {
                    options = options.looped();
                }
                audio.start(key, options)
            });
        match result {
            Ok(id) => {
                self.entries.push(PlaylistEntry {
                    id,
                    key: key.to_string(),
                });
                Some(id)
            }
            Err(e) => {
                log::warn!("Playback failed: {}", e);
                None
            }
        }
    }

    /// Stop every playback of `key`
    pub fn stop_playback(&mut self, audio: &mut dyn AudioOut, key: &str) {
        self.entries.retain(|entry| {
            if entry.key == key {
                audio.stop(entry.id);
                false
            } else {
                true
            }
        });
    }

    /// Stop everything
    pub fn stop_playlist(&mut self, audio: &mut dyn AudioOut) {
        for entry in self.entries.drain(..) {
            audio.stop(entry.id);
        }
    }

    pub fn is_playing(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Silent backend for headless runs
#[derive(Debug, Default)]
pub struct NullAudio {
    next_id: PlaybackId,
}

impl AudioOut for NullAudio {
    fn start(&mut self, key: &str, options: PlaybackOptions) -> Result<PlaybackId, AudioError> {
        self.next_id += 1;
        log::debug!("Audio start {} (loop: {})", key, options.looped);
        Ok(self.next_id)
    }

    fn stop(&mut self, id: PlaybackId) {
        log::debug!("Audio stop #{}", id);
    }

    fn suspend(&mut self) {}

    fn resume(&mut self) {}
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    Start(String, PlaybackOptions),
    Stop(PlaybackId),
    Suspend,
    Resume,
}

/// Backend that records calls; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    calls: std::rc::Rc<std::cell::RefCell<Vec<AudioCall>>>,
    next_id: std::rc::Rc<std::cell::Cell<PlaybackId>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.borrow().clone()
    }
}

impl AudioOut for RecordingAudio {
    fn start(&mut self, key: &str, options: PlaybackOptions) -> Result<PlaybackId, AudioError> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.calls
            .borrow_mut()
            .push(AudioCall::Start(key.to_string(), options));
        Ok(id)
    }

    fn stop(&mut self, id: PlaybackId) {
        self.calls.borrow_mut().push(AudioCall::Stop(id));
    }

    fn suspend(&mut self) {
        self.calls.borrow_mut().push(AudioCall::Suspend);
    }

    fn resume(&mut self) {
        self.calls.borrow_mut().push(AudioCall::Resume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound() -> SoundAsset {
        SoundAsset { duration: 30.0 }
    }

    #[test]
    fn test_playback_skipped_when_muted() {
        let mut audio = RecordingAudio::new();
        let mut playlist = Playlist::new();
        assert_eq!(playlist.playback(&mut audio, "music", Some(&sound()), true, true), None);
        assert!(audio.calls().is_empty());
        assert!(playlist.is_empty());
    }

    #[test]
    fn test_playback_and_stop_by_key() {
        let mut audio = RecordingAudio::new();
        let mut playlist = Playlist::new();
        let music = playlist.playback(&mut audio, "music", Some(&sound()), true, false);
        playlist.playback(&mut audio, "hit", Some(&sound()), false, false);
        assert!(playlist.is_playing("music"));

        playlist.stop_playback(&mut audio, "music");
        assert!(!playlist.is_playing("music"));
        assert_eq!(playlist.len(), 1);
        assert!(audio.calls().contains(&AudioCall::Stop(music.unwrap())));
        assert_eq!(
            audio.calls()[0],
            AudioCall::Start(
                "music".into(),
                PlaybackOptions {
                    start: 0.0,
                    end: 30.0,
                    looped: true
                }
            )
        );
    }

    #[test]
    fn test_missing_sound_is_not_fatal() {
        let mut audio = RecordingAudio::new();
        let mut playlist = Playlist::new();
        assert_eq!(playlist.playback(&mut audio, "music", None, true, false), None);
        assert!(playlist.is_empty());
    }

    #[test]
    fn test_stop_playlist_stops_everything() {
        let mut audio = RecordingAudio::new();
        let mut playlist = Playlist::new();
        playlist.playback(&mut audio, "a", Some(&sound()), false, false);
        playlist.playback(&mut audio, "b", Some(&sound()), false, false);
        playlist.stop_playlist(&mut audio);
        assert!(playlist.is_empty());
        let stops = audio
            .calls()
            .iter()
            .filter(|c| matches!(c, AudioCall::Stop(_)))
            .count();
        assert_eq!(stops, 2);
    }
}
