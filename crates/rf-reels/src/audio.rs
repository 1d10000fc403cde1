//! Fire-and-forget audio cues
//!
//! The bank triggers cues on spin start, barrier and win. Playback failures
//! are logged by the caller and never reach reel logic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audio cue identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    /// Background loop while reels are moving
    SpinLoop,
    /// Win jingle
    Win,
}

impl AudioCue {
    pub fn name(&self) -> &'static str {
        match self {
            AudioCue::SpinLoop => "spin_loop",
            AudioCue::Win => "win",
        }
    }
}

/// Audio playback failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioCueError {
    #[error("Audio cue '{0}' is not loaded")]
    NotLoaded(&'static str),

    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Audio cue trigger
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioCueError>;
    fn stop(&mut self, cue: AudioCue) -> Result<(), AudioCueError>;
}

/// Silent sink
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) -> Result<(), AudioCueError> {
        Ok(())
    }

    fn stop(&mut self, _cue: AudioCue) -> Result<(), AudioCueError> {
        Ok(())
    }
}

/// Sink that logs every cue, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioCueError> {
        log::debug!("[Audio] play {}", cue.name());
        Ok(())
    }

    fn stop(&mut self, cue: AudioCue) -> Result<(), AudioCueError> {
        log::debug!("[Audio] stop {}", cue.name());
        Ok(())
    }
}
