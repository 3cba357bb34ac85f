//! Session and voice-leading configuration
//!
//! Plain data with defaults. Every field has a serde default so a partial
//! JSON file only needs to name what it changes.

use crate::error::{HarmonyError, Result};
use crate::types::note::MidiNote;

/// Search limits for the voice-leading optimizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VoicingBounds {
    /// Octaves searched above and below each previous note
    pub octave_range: u8,
    pub min_note: MidiNote,
    pub max_note: MidiNote,
}

impl VoicingBounds {
    pub fn new(octave_range: u8, min_note: MidiNote, max_note: MidiNote) -> Result<Self> {
        let bounds = VoicingBounds {
            octave_range,
            min_note,
            max_note,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_note > self.max_note {
            return Err(HarmonyError::InvalidBounds {
                min: self.min_note,
                max: self.max_note,
            });
        }
        Ok(())
    }

    pub fn contains(&self, note: i32) -> bool {
        note >= self.min_note as i32 && note <= self.max_note as i32
    }
}

impl Default for VoicingBounds {
    fn default() -> Self {
        VoicingBounds {
            octave_range: 2,
            min_note: 36,
            max_note: 96,
        }
    }
}

/// Everything a [`HarmonySession`](crate::harmony::session::HarmonySession) can be tuned with
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    pub voice_count: usize,
    /// Key centre as a pitch class
    pub key: u8,
    /// Prepend a bass note (octave 2 root) to recorded voicings
    pub bass_enabled: bool,
    pub visible_history: usize,
    pub prediction_limit: usize,
    pub substitution_limit: usize,
    pub bounds: VoicingBounds,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            voice_count: 5,
            key: 0,
            bass_enabled: false,
            visible_history: 4,
            prediction_limit: 8,
            substitution_limit: 6,
            bounds: VoicingBounds::default(),
        }
    }
}

#[cfg(feature = "serde")]
impl SessionConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let config: SessionConfig =
            serde_json::from_str(text).context("Failed to parse session config")?;
        config
            .bounds
            .validate()
            .context("Session config has unusable voicing bounds")?;
        Ok(config)
    }
}
